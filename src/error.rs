use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    // -- Construction --
    #[error("two-vector frame axes are collinear")]
    CollinearAxes,

    #[error("constant frame vector has zero length")]
    ZeroVector,

    #[error("object could not be resolved: {0}")]
    UnresolvedObject(String),

    #[error("reference frames nested too deeply ({depth} > {max})")]
    FrameTooDeep { depth: u32, max: u32 },

    #[error("phase interval is empty or reversed: [{start}, {end})")]
    InvalidPhaseInterval { start: f64, end: f64 },

    #[error("timeline phases overlap or are out of order")]
    OverlappingPhases,

    #[error("timeline has no phases")]
    EmptyTimeline,

    #[error("unknown rotation model: {0}")]
    UnknownRotationModel(String),

    #[error("provider failed: {0}")]
    Provider(String),

    #[error("required field is missing: {0}")]
    MissingField(&'static str),

    // -- Loading --
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("bad magic number in {}", .0.display())]
    BadMagic(PathBuf),

    #[error("unsupported byte order {0}")]
    UnsupportedByteOrder(u16),

    #[error("unsupported number of mantissa digits {0}")]
    UnsupportedDigits(u16),

    #[error("invalid record count {0}")]
    InvalidRecordCount(u64),

    #[error("parse error in {} at line {line}", path.display())]
    Parse { path: PathBuf, line: usize },

    #[error("no usable samples in {}", .0.display())]
    EmptySampleSet(PathBuf),

    #[error("unrecognized sample file type: {}", .0.display())]
    UnknownFileType(PathBuf),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(path: impl Into<PathBuf>, line: usize) -> Self {
        Self::Parse {
            path: path.into(),
            line,
        }
    }
}
