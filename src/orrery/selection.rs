use std::fmt;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct BodyID(pub usize);

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct StarID(pub usize);

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct DeepSkyID(pub usize);

/// A handle to any object in an [super::Orrery], or to nothing at all.
///
/// `None` stands for the universal origin wherever a position is needed.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Selection {
    None,
    Star(StarID),
    Body(BodyID),
    DeepSky(DeepSkyID),
}

impl Selection {
    pub fn body(&self) -> Option<BodyID> {
        match self {
            Selection::Body(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Selection::None)
    }
}

impl Default for Selection {
    fn default() -> Self {
        Selection::None
    }
}

impl From<BodyID> for Selection {
    fn from(id: BodyID) -> Self {
        Selection::Body(id)
    }
}

impl From<StarID> for Selection {
    fn from(id: StarID) -> Self {
        Selection::Star(id)
    }
}

impl From<DeepSkyID> for Selection {
    fn from(id: DeepSkyID) -> Self {
        Selection::DeepSky(id)
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::None => write!(f, "none"),
            Selection::Star(StarID(id)) => write!(f, "star #{}", id),
            Selection::Body(BodyID(id)) => write!(f, "body #{}", id),
            Selection::DeepSky(DeepSkyID(id)) => write!(f, "deep-sky object #{}", id),
        }
    }
}
