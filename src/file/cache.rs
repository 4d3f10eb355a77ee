use std::collections::HashMap;
use std::hash::Hash;
use std::path::{Path, PathBuf};
use std::rc::{Rc, Weak};

use tracing::debug;

use super::samples::{load_orientation_ascii, load_xyz_ascii, load_xyzv_ascii, load_xyzv_binary};
use crate::astro::orbit::{
    Interpolation, Orbit, OrientationSample, PositionSample, SamplePrecision, SampledOrbit,
    SampledOrbitXyzv, SharedOrbit, StateSample,
};
use crate::astro::rotation::{
    custom_rotation_model, RotationModel, SampledOrientation, SharedRotationModel,
};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleFileKind {
    Xyz,
    Xyzv,
    XyzvBinary,
    Orientation,
}

impl SampleFileKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "xyz" => Some(SampleFileKind::Xyz),
            "xyzv" => Some(SampleFileKind::Xyzv),
            "xyzvbin" => Some(SampleFileKind::XyzvBinary),
            "q" => Some(SampleFileKind::Orientation),
            _ => None,
        }
    }
}

type SampleKey = (PathBuf, SamplePrecision);
type TrajectoryKey = (PathBuf, Interpolation, SamplePrecision);

/// Shares loaded sample files and rotation models between the bodies that use
/// them.
///
/// Entries are weak, so a file is only kept in memory while something still
/// refers to it. Loading it again afterwards re-reads it from disk.
#[derive(Default)]
pub struct ResourceCache {
    positions: HashMap<SampleKey, Weak<[PositionSample]>>,
    states: HashMap<SampleKey, Weak<[StateSample]>>,
    orientations: HashMap<PathBuf, Weak<[OrientationSample]>>,
    trajectories: HashMap<TrajectoryKey, Weak<Orbit>>,
    rotation_models: HashMap<String, Weak<RotationModel>>,
}

fn find_or_load<K, T, F>(map: &mut HashMap<K, Weak<T>>, key: K, load: F) -> Result<Rc<T>>
where
    K: Eq + Hash,
    T: ?Sized,
    F: FnOnce() -> Result<Rc<T>>,
{
    if let Some(cached) = map.get(&key).and_then(Weak::upgrade) {
        return Ok(cached);
    }

    match load() {
        Ok(value) => {
            map.insert(key, Rc::downgrade(&value));
            Ok(value)
        }
        Err(e) => {
            map.remove(&key);
            Err(e)
        }
    }
}

impl ResourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position_samples(
        &mut self,
        path: &Path,
        precision: SamplePrecision,
    ) -> Result<Rc<[PositionSample]>> {
        find_or_load(&mut self.positions, (path.to_owned(), precision), || {
            load_xyz_ascii(path, precision).map(Rc::from)
        })
    }

    pub fn state_samples(
        &mut self,
        path: &Path,
        precision: SamplePrecision,
    ) -> Result<Rc<[StateSample]>> {
        let kind = SampleFileKind::from_path(path);
        find_or_load(&mut self.states, (path.to_owned(), precision), || {
            let samples = match kind {
                Some(SampleFileKind::XyzvBinary) => load_xyzv_binary(path, precision)?,
                _ => load_xyzv_ascii(path, precision)?,
            };
            Ok(Rc::from(samples))
        })
    }

    pub fn orientation_samples(&mut self, path: &Path) -> Result<Rc<[OrientationSample]>> {
        find_or_load(&mut self.orientations, path.to_owned(), || {
            load_orientation_ascii(path).map(Rc::from)
        })
    }

    /// Loads a sampled trajectory, choosing the reader from the file extension.
    pub fn trajectory(
        &mut self,
        path: &Path,
        interpolation: Interpolation,
        precision: SamplePrecision,
    ) -> Result<SharedOrbit> {
        let key = (path.to_owned(), interpolation, precision);
        if let Some(orbit) = self.trajectories.get(&key).and_then(Weak::upgrade) {
            return Ok(orbit);
        }

        let orbit = match SampleFileKind::from_path(path) {
            Some(SampleFileKind::Xyz) => {
                let samples = self.position_samples(path, precision)?;
                Orbit::sampled(SampledOrbit::new(samples, interpolation))
            }
            Some(SampleFileKind::Xyzv) | Some(SampleFileKind::XyzvBinary) => {
                let samples = self.state_samples(path, precision)?;
                Orbit::sampled_with_velocity(SampledOrbitXyzv::new(samples, interpolation))
            }
            _ => return Err(Error::UnknownFileType(path.to_owned())),
        };

        let orbit = Rc::new(orbit);
        self.trajectories.insert(key, Rc::downgrade(&orbit));
        Ok(orbit)
    }

    pub fn sampled_rotation(&mut self, path: &Path) -> Result<SharedRotationModel> {
        let samples = self.orientation_samples(path)?;
        Ok(Rc::new(RotationModel::Sampled(SampledOrientation::new(
            samples,
        ))))
    }

    /// Looks up one of the built-in rotation models by name.
    pub fn custom_rotation(&mut self, name: &str) -> Result<SharedRotationModel> {
        find_or_load(&mut self.rotation_models, name.to_owned(), || {
            custom_rotation_model(name).map(Rc::new)
        })
    }

    /// Forgets entries whose resources have been dropped, returning how many
    /// were removed.
    pub fn purge(&mut self) -> usize {
        fn purge_map<K, T: ?Sized>(map: &mut HashMap<K, Weak<T>>) -> usize {
            let before = map.len();
            map.retain(|_, v| v.strong_count() > 0);
            before - map.len()
        }

        let removed = purge_map(&mut self.positions)
            + purge_map(&mut self.states)
            + purge_map(&mut self.orientations)
            + purge_map(&mut self.trajectories)
            + purge_map(&mut self.rotation_models);
        debug!("Purged {} dead cache entries", removed);
        removed
    }
}
