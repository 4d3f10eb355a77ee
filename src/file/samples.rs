//! Sampled trajectory and orientation files.
//!
//! Text files start with an optional block of `#` comment lines and then hold
//! one record per line:
//! - `.xyz`: `tdb x y z`
//! - `.xyzv`: `tdb x y z vx vy vz`
//! - `.q`: `tdb qw qx qy qz`
//!
//! Positions are in km and velocities in km/s, both z-up. Everything is
//! converted to km/day and internal axes as it is read.
//!
//! `.xyzvbin` files carry the same records as `.xyzv`, in binary, behind a
//! 24 byte header:
//!
//! | offset | type     | contents                     |
//! |--------|----------|------------------------------|
//! | 0      | `[u8;8]` | `"CELXYZV"`, NUL padded      |
//! | 8      | `u16`    | byte order, always 1234      |
//! | 10     | `u16`    | mantissa digits, always 53   |
//! | 12     | `u32`    | reserved                     |
//! | 16     | `u64`    | record count                 |
//!
//! Each record is seven little-endian `f64`s.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use nalgebra::{Quaternion, UnitQuaternion, Vector3};
use tracing::{error, info, warn};

use crate::astro::orbit::{OrientationSample, PositionSample, SamplePrecision, StateSample};
use crate::consts::SECONDS_PER_DAY;
use crate::error::{Error, Result};
use crate::math::geometry::{from_internal, to_internal};

const XYZV_MAGIC: &[u8; 8] = b"CELXYZV\0";
const XYZV_BYTE_ORDER: u16 = 1234;
const XYZV_DIGITS: u16 = 53;
const XYZV_HEADER_LEN: usize = 24;
const XYZV_RECORD_LEN: usize = 56;

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

/// Splits a text sample file into records of `N` numbers, keeping the line
/// each came from.
fn parse_records<const N: usize>(path: &Path, text: &str) -> Result<Vec<(usize, [f64; N])>> {
    let mut records = vec![];
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let line_number = idx + 1;
        let mut fields = line.split_ascii_whitespace();
        let mut record = [0.0; N];
        for slot in record.iter_mut() {
            *slot = fields
                .next()
                .and_then(|f| f.parse().ok())
                .ok_or_else(|| Error::parse(path, line_number))?;
        }
        if fields.next().is_some() {
            return Err(Error::parse(path, line_number));
        }
        records.push((line_number, record));
    }
    Ok(records)
}

/// Keeps only samples whose times strictly increase, warning once if any are
/// dropped.
fn drop_unordered<S>(path: &Path, samples: Vec<S>, time_of: impl Fn(&S) -> f64) -> Result<Vec<S>> {
    let mut kept: Vec<S> = Vec::with_capacity(samples.len());
    let mut warned = false;
    for sample in samples {
        if let Some(last) = kept.last() {
            if time_of(&sample) <= time_of(last) {
                if !warned {
                    warn!(
                        "Ignoring out of order samples in {:?}, starting at t = {}",
                        path,
                        time_of(&sample)
                    );
                    warned = true;
                }
                continue;
            }
        }
        kept.push(sample);
    }

    if kept.is_empty() {
        return Err(Error::EmptySampleSet(path.to_owned()));
    }
    Ok(kept)
}

fn logged<T>(path: &Path, result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        error!("Could not load {:?}: {}", path, e);
    }
    result
}

fn state_from_external(
    precision: SamplePrecision,
    t: f64,
    position: &Vector3<f64>,
    velocity_km_s: &Vector3<f64>,
) -> StateSample {
    StateSample {
        t,
        position: precision.round_vector(&to_internal(position)),
        velocity: precision.round_vector(&to_internal(&(velocity_km_s * SECONDS_PER_DAY))),
    }
}

pub fn load_xyz_ascii(path: &Path, precision: SamplePrecision) -> Result<Vec<PositionSample>> {
    info!("Loading trajectory: {:?}", path);
    let result = read_text(path).and_then(|text| {
        let samples = parse_records::<4>(path, &text)?
            .into_iter()
            .map(|(_, [t, x, y, z])| PositionSample {
                t,
                position: precision.round_vector(&to_internal(&Vector3::new(x, y, z))),
            })
            .collect();
        drop_unordered(path, samples, |s| s.t)
    });
    logged(path, result)
}

/// Loads a text trajectory with velocities. If a binary copy of the file
/// (the same name with `bin` appended) exists and loads, it is used instead.
pub fn load_xyzv_ascii(path: &Path, precision: SamplePrecision) -> Result<Vec<StateSample>> {
    let binary = binary_sibling(path);
    if binary.exists() {
        if let Ok(samples) = load_xyzv_binary(&binary, precision) {
            return Ok(samples);
        }
    }

    info!("Loading trajectory: {:?}", path);
    let result = read_text(path).and_then(|text| {
        let samples = parse_records::<7>(path, &text)?
            .into_iter()
            .map(|(_, [t, x, y, z, vx, vy, vz])| {
                state_from_external(
                    precision,
                    t,
                    &Vector3::new(x, y, z),
                    &Vector3::new(vx, vy, vz),
                )
            })
            .collect();
        drop_unordered(path, samples, |s| s.t)
    });
    logged(path, result)
}

fn binary_sibling(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push("bin");
    PathBuf::from(name)
}

fn le_u16(bytes: &[u8], offset: usize) -> u16 {
    let mut buf = [0u8; 2];
    buf.copy_from_slice(&bytes[offset..offset + 2]);
    u16::from_le_bytes(buf)
}

fn le_u64(bytes: &[u8], offset: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[offset..offset + 8]);
    u64::from_le_bytes(buf)
}

fn le_f64(bytes: &[u8], offset: usize) -> f64 {
    f64::from_bits(le_u64(bytes, offset))
}

/// Checks the header and returns the record count.
fn parse_binary_header(path: &Path, bytes: &[u8]) -> Result<u64> {
    if bytes.len() < XYZV_HEADER_LEN {
        let e = io::Error::new(io::ErrorKind::UnexpectedEof, "truncated header");
        return Err(Error::io(path, e));
    }
    if &bytes[..XYZV_MAGIC.len()] != XYZV_MAGIC {
        return Err(Error::BadMagic(path.to_owned()));
    }

    let byte_order = le_u16(bytes, 8);
    if byte_order != XYZV_BYTE_ORDER {
        return Err(Error::UnsupportedByteOrder(byte_order));
    }
    let digits = le_u16(bytes, 10);
    if digits != XYZV_DIGITS {
        return Err(Error::UnsupportedDigits(digits));
    }

    let count = le_u64(bytes, 16);
    let available = (bytes.len() - XYZV_HEADER_LEN) / XYZV_RECORD_LEN;
    if count == 0 || count > available as u64 {
        return Err(Error::InvalidRecordCount(count));
    }
    Ok(count)
}

pub fn load_xyzv_binary(path: &Path, precision: SamplePrecision) -> Result<Vec<StateSample>> {
    info!("Loading binary trajectory: {:?}", path);
    let result = fs::read(path)
        .map_err(|e| Error::io(path, e))
        .and_then(|bytes| {
            let count = parse_binary_header(path, &bytes)?;
            let samples = bytes[XYZV_HEADER_LEN..]
                .chunks_exact(XYZV_RECORD_LEN)
                .take(count as usize)
                .map(|record| {
                    let v = |i: usize| le_f64(record, 8 * i);
                    state_from_external(
                        precision,
                        v(0),
                        &Vector3::new(v(1), v(2), v(3)),
                        &Vector3::new(v(4), v(5), v(6)),
                    )
                })
                .collect();
            drop_unordered(path, samples, |s| s.t)
        });
    logged(path, result)
}

pub fn load_orientation_ascii(path: &Path) -> Result<Vec<OrientationSample>> {
    info!("Loading orientations: {:?}", path);
    let result = read_text(path).and_then(|text| {
        let samples = parse_records::<5>(path, &text)?
            .into_iter()
            .map(|(line, [t, w, x, y, z])| {
                UnitQuaternion::try_new(Quaternion::new(w, x, z, -y), 0.0)
                    .map(|orientation| OrientationSample { t, orientation })
                    .ok_or_else(|| Error::parse(path, line))
            })
            .collect::<Result<Vec<_>>>()?;
        drop_unordered(path, samples, |s| s.t)
    });
    logged(path, result)
}

fn save(path: &Path, write: impl FnOnce(&mut BufWriter<File>) -> io::Result<()>) -> Result<()> {
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let mut out = BufWriter::new(file);
    write(&mut out)
        .and_then(|()| out.flush())
        .map_err(|e| Error::io(path, e))
}

fn external_velocity(v: &Vector3<f64>) -> Vector3<f64> {
    from_internal(v) / SECONDS_PER_DAY
}

pub fn write_xyz_ascii(path: &Path, samples: &[PositionSample]) -> Result<()> {
    save(path, |out| {
        writeln!(out, "# tdb x y z (km)")?;
        for s in samples {
            let p = from_internal(&s.position);
            writeln!(out, "{} {} {} {}", s.t, p.x, p.y, p.z)?;
        }
        Ok(())
    })
}

pub fn write_xyzv_ascii(path: &Path, samples: &[StateSample]) -> Result<()> {
    save(path, |out| {
        writeln!(out, "# tdb x y z (km) vx vy vz (km/s)")?;
        for s in samples {
            let p = from_internal(&s.position);
            let v = external_velocity(&s.velocity);
            writeln!(
                out,
                "{} {} {} {} {} {} {}",
                s.t, p.x, p.y, p.z, v.x, v.y, v.z
            )?;
        }
        Ok(())
    })
}

pub fn write_xyzv_binary(path: &Path, samples: &[StateSample]) -> Result<()> {
    save(path, |out| {
        out.write_all(XYZV_MAGIC)?;
        out.write_all(&XYZV_BYTE_ORDER.to_le_bytes())?;
        out.write_all(&XYZV_DIGITS.to_le_bytes())?;
        out.write_all(&0u32.to_le_bytes())?;
        out.write_all(&(samples.len() as u64).to_le_bytes())?;

        for s in samples {
            let p = from_internal(&s.position);
            let v = external_velocity(&s.velocity);
            for x in [s.t, p.x, p.y, p.z, v.x, v.y, v.z].iter() {
                out.write_all(&x.to_le_bytes())?;
            }
        }
        Ok(())
    })
}

pub fn write_orientation_ascii(path: &Path, samples: &[OrientationSample]) -> Result<()> {
    save(path, |out| {
        writeln!(out, "# tdb qw qx qy qz")?;
        for s in samples {
            let q = s.orientation.quaternion();
            // Inverse of the (w, x, z, -y) map applied on load
            writeln!(out, "{} {} {} {} {}", s.t, q.w, q.i, -q.k, q.j)?;
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::math::geometry::x_rotation;

    fn write_text(dir: &Path, name: &str, text: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_xyz_comments_and_axes() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_text(
            dir.path(),
            "probe.xyz",
            "# a probe\n#  tdb x y z\n\n2451545.0 1 2 3\n  2451546.0 4 5 6\n",
        );

        let samples = load_xyz_ascii(&path, SamplePrecision::Double).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].t, 2451545.0);
        assert_eq!(samples[0].position, Vector3::new(1.0, 3.0, -2.0));
        assert_eq!(samples[1].position, Vector3::new(4.0, 6.0, -5.0));
    }

    #[test]
    fn test_unordered_samples_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_text(
            dir.path(),
            "loop.xyz",
            "1 0 0 0\n2 0 0 0\n2 9 9 9\n1.5 9 9 9\n3 0 0 0\n",
        );
        let samples = load_xyz_ascii(&path, SamplePrecision::Double).unwrap();
        let times: Vec<f64> = samples.iter().map(|s| s.t).collect();
        assert_eq!(times, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_load_failures() {
        let dir = tempfile::tempdir().unwrap();

        let empty = write_text(dir.path(), "empty.xyz", "# nothing here\n");
        assert!(matches!(
            load_xyz_ascii(&empty, SamplePrecision::Double),
            Err(Error::EmptySampleSet(_))
        ));

        let short = write_text(dir.path(), "short.xyz", "# header\n1 2 3 4\n5 6 7\n");
        assert!(matches!(
            load_xyz_ascii(&short, SamplePrecision::Double),
            Err(Error::Parse { line: 3, .. })
        ));

        let missing = dir.path().join("missing.xyz");
        assert!(matches!(
            load_xyz_ascii(&missing, SamplePrecision::Double),
            Err(Error::Io { .. })
        ));
    }

    #[test]
    fn test_xyzv_velocity_units() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_text(dir.path(), "fast.xyzv", "0 1 0 0 0 0 1\n1 2 0 0 0 0 1\n");
        let samples = load_xyzv_ascii(&path, SamplePrecision::Double).unwrap();
        assert_eq!(samples[0].velocity, Vector3::new(0.0, 86400.0, 0.0));
    }

    #[test]
    fn test_single_precision_rounds() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_text(dir.path(), "p.xyz", "0 0.1 0 0\n");
        let single = load_xyz_ascii(&path, SamplePrecision::Single).unwrap();
        let double = load_xyz_ascii(&path, SamplePrecision::Double).unwrap();
        assert_eq!(single[0].position.x, 0.1f32 as f64);
        assert_eq!(double[0].position.x, 0.1);
    }

    fn header(magic: &[u8; 8], byte_order: u16, digits: u16, count: u64) -> Vec<u8> {
        let mut bytes = magic.to_vec();
        bytes.extend_from_slice(&byte_order.to_le_bytes());
        bytes.extend_from_slice(&digits.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&count.to_le_bytes());
        bytes
    }

    #[test]
    fn test_binary_header_checks() {
        let dir = tempfile::tempdir().unwrap();
        let record = vec![0u8; XYZV_RECORD_LEN];
        let load = |name: &str, mut bytes: Vec<u8>| {
            bytes.extend_from_slice(&record);
            let path = dir.path().join(name);
            fs::write(&path, bytes).unwrap();
            load_xyzv_binary(&path, SamplePrecision::Double)
        };

        assert!(load("ok.xyzvbin", header(XYZV_MAGIC, 1234, 53, 1)).is_ok());
        assert!(matches!(
            load("magic.xyzvbin", header(b"CELXYZW\0", 1234, 53, 1)),
            Err(Error::BadMagic(_))
        ));
        assert!(matches!(
            load("order.xyzvbin", header(XYZV_MAGIC, 4321, 53, 1)),
            Err(Error::UnsupportedByteOrder(4321))
        ));
        assert!(matches!(
            load("digits.xyzvbin", header(XYZV_MAGIC, 1234, 24, 1)),
            Err(Error::UnsupportedDigits(24))
        ));
        assert!(matches!(
            load("zero.xyzvbin", header(XYZV_MAGIC, 1234, 53, 0)),
            Err(Error::InvalidRecordCount(0))
        ));
        assert!(matches!(
            load("long.xyzvbin", header(XYZV_MAGIC, 1234, 53, 2)),
            Err(Error::InvalidRecordCount(2))
        ));
    }

    #[test]
    fn test_text_prefers_binary_sibling() {
        let dir = tempfile::tempdir().unwrap();
        let text = write_text(dir.path(), "craft.xyzv", "0 1 1 1 0 0 0\n");

        let binary_samples = vec![
            StateSample {
                t: 10.0,
                position: Vector3::new(5.0, 0.0, 0.0),
                velocity: Vector3::zeros(),
            },
            StateSample {
                t: 11.0,
                position: Vector3::new(6.0, 0.0, 0.0),
                velocity: Vector3::zeros(),
            },
        ];
        write_xyzv_binary(&dir.path().join("craft.xyzvbin"), &binary_samples).unwrap();

        let loaded = load_xyzv_ascii(&text, SamplePrecision::Double).unwrap();
        assert_eq!(loaded, binary_samples);

        // A broken binary copy falls back to the text
        fs::write(dir.path().join("craft.xyzvbin"), b"junk").unwrap();
        let loaded = load_xyzv_ascii(&text, SamplePrecision::Double).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].t, 0.0);
    }

    #[test]
    fn test_orientations_normalized_and_mapped() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_text(dir.path(), "spin.q", "# keys\n0 2 0 0 0\n1 0 0 0 1\n");
        let samples = load_orientation_ascii(&path).unwrap();
        assert_eq!(samples[0].orientation, UnitQuaternion::identity());

        // A quarter turn about external z is a quarter turn about internal y
        let q = samples[1].orientation.quaternion();
        assert_relative_eq!(q.j, 1.0);

        let degenerate = write_text(dir.path(), "zero.q", "0 0 0 0 0\n");
        assert!(matches!(
            load_orientation_ascii(&degenerate),
            Err(Error::Parse { line: 1, .. })
        ));

        let written = dir.path().join("out.q");
        let keys = vec![OrientationSample {
            t: 3.0,
            orientation: x_rotation(0.3),
        }];
        write_orientation_ascii(&written, &keys).unwrap();
        let reread = load_orientation_ascii(&written).unwrap();
        assert_relative_eq!(reread[0].orientation, keys[0].orientation, epsilon = 1e-15);
    }
}
