//! Reader for plain-text system tables.
//!
//! One object per line, in whitespace-separated columns, with `#` starting a
//! comment line:
//!
//! ```text
//! # name  class   parent  radius  period  a        e      i     node   argp   M      epoch      rotation
//! Sun     star    -       695700  -       -        -      -     -      -      -      -          25.38
//! Earth   planet  Sun     6378.1  365.256 1.496e8  0.0167 0.0   348.74 114.21 358.62 2451545.0  earth-p03lp
//! ```
//!
//! - A parent of `-` makes the row a star at the origin; only its name and
//!   rotation are used.
//! - Period is in days, `a` in km, angles in degrees, epoch a TDB Julian date.
//! - The `a` column may instead name a sampled trajectory file, relative to
//!   the table. The element columns are then ignored.
//! - Rotation is a built-in model name, a uniform rotation period in days, or
//!   `-` for none.
//!
//! Every body's orbit and rotation are given in the J2000 ecliptic frame
//! centered on its parent.

use std::fs;
use std::path::Path;
use std::rc::Rc;
use std::str::SplitAsciiWhitespace;

use nalgebra::Vector3;
use tracing::{error, info};

use super::cache::{ResourceCache, SampleFileKind};
use crate::astro::orbit::{
    EllipticalOrbit, Interpolation, Orbit, OrbitalElements, SamplePrecision, SharedOrbit,
};
use crate::astro::rotation::{RotationModel, SharedRotationModel, UniformRotationModel};
use crate::error::{Error, Result};
use crate::frames::ReferenceFrame;
use crate::orrery::{BodyClass, BodyInfo, Orrery, Selection, Star};

struct Fields<'a> {
    path: &'a Path,
    line: usize,
    inner: SplitAsciiWhitespace<'a>,
}

impl<'a> Fields<'a> {
    fn next_str(&mut self) -> Result<&'a str> {
        self.inner
            .next()
            .ok_or_else(|| Error::parse(self.path, self.line))
    }

    fn next_f64(&mut self) -> Result<f64> {
        let s = self.next_str()?;
        s.parse::<f64>().map_err(|_| Error::parse(self.path, self.line))
    }

    fn parse_error(&self) -> Error {
        Error::parse(self.path, self.line)
    }
}

/// Builds an orrery from a system table, loading any files it refers to
/// through `cache`.
pub fn read_system(path: &Path, cache: &mut ResourceCache) -> Result<Orrery> {
    info!("Loading system: {:?}", path);
    read_system_inner(path, cache).map_err(|err| {
        error!("Failed to load {:?}: {}", path, err);
        err
    })
}

fn read_system_inner(path: &Path, cache: &mut ResourceCache) -> Result<Orrery> {
    let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let dir = path.parent().unwrap_or_else(|| Path::new(""));
    let mut orrery = Orrery::new();

    for (idx, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut fields = Fields {
            path,
            line: idx + 1,
            inner: trimmed.split_ascii_whitespace(),
        };

        let name = fields.next_str()?;
        let class = fields.next_str()?;
        let class = BodyClass::from_name(class).ok_or_else(|| fields.parse_error())?;
        let parent = fields.next_str()?;
        let radius = fields.next_f64()?;

        if parent == "-" {
            // Skip the orbit columns
            for _ in 0..8 {
                fields.next_str()?;
            }
            let rotation = parse_rotation(&mut fields, cache, 0.0)?;
            orrery.add_star(Star::new(name, Vector3::zeros(), rotation));
            continue;
        }

        let parent = match orrery.find(parent) {
            Selection::None => return Err(Error::UnresolvedObject(parent.to_owned())),
            selection => selection,
        };

        let (orbit, epoch) = parse_orbit(&mut fields, dir, cache)?;
        let rotation = parse_rotation(&mut fields, cache, epoch)?;

        let frame = Rc::new(ReferenceFrame::j2000_ecliptic(parent));
        let info = BodyInfo::new(name, radius).with_class(class);
        orrery.add_simple_body(info, frame.clone(), orbit, frame, rotation)?;
    }

    info!("Loaded {} bodies from {:?}", orrery.bodies().count(), path);
    Ok(orrery)
}

fn parse_orbit(
    fields: &mut Fields,
    dir: &Path,
    cache: &mut ResourceCache,
) -> Result<(SharedOrbit, f64)> {
    let period = fields.next_str()?;
    let semi_major_axis = fields.next_str()?;

    if SampleFileKind::from_path(Path::new(semi_major_axis)).is_some() {
        for _ in 0..6 {
            fields.next_str()?;
        }
        let orbit = cache.trajectory(
            &dir.join(semi_major_axis),
            Interpolation::Cubic,
            SamplePrecision::Double,
        )?;
        return Ok((orbit, 0.0));
    }

    let period: f64 = period.parse().map_err(|_| fields.parse_error())?;
    let semi_major_axis: f64 = semi_major_axis
        .parse()
        .map_err(|_| fields.parse_error())?;
    let eccentricity = fields.next_f64()?;
    let inclination = fields.next_f64()?.to_radians();
    let ascending_node = fields.next_f64()?.to_radians();
    let arg_of_pericenter = fields.next_f64()?.to_radians();
    let mean_anomaly = fields.next_f64()?.to_radians();
    let epoch = fields.next_f64()?;

    let elements = OrbitalElements {
        pericenter_distance: semi_major_axis * (1.0 - eccentricity),
        eccentricity,
        inclination,
        ascending_node,
        arg_of_pericenter,
        mean_anomaly,
        period,
        ..OrbitalElements::default()
    };
    let orbit = Orbit::elliptical(EllipticalOrbit::new(&elements, epoch));
    Ok((Rc::new(orbit), epoch))
}

fn parse_rotation(
    fields: &mut Fields,
    cache: &mut ResourceCache,
    epoch: f64,
) -> Result<SharedRotationModel> {
    let rotation = fields.next_str()?;
    if rotation == "-" {
        return Ok(Rc::new(RotationModel::identity()));
    }
    match rotation.parse::<f64>() {
        Ok(period) => {
            let model = UniformRotationModel::new(period, 0.0, epoch, 0.0, 0.0);
            Ok(Rc::new(RotationModel::Uniform(model)))
        }
        Err(_) => cache.custom_rotation(rotation),
    }
}
