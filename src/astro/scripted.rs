//! Orbits and rotations computed by a script host embedded in the
//! application.

use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;

use nalgebra::{Quaternion, UnitQuaternion, Vector3};
use tracing::{error, warn};

use super::orbit::OrbitProvider;
use super::rotation::RotationProvider;
use crate::error::{Error, Result};
use crate::math::geometry::to_internal;
use crate::math::intervals::Interval;

#[derive(Debug, Clone, PartialEq)]
pub enum ScriptValue {
    Number(f64),
    Text(String),
    Bool(bool),
}

/// Parameters handed to a script's factory function.
pub type ScriptParams = BTreeMap<String, ScriptValue>;

/// Key under which the directory of the defining add-on is passed to factories.
pub const ADDON_PATH_KEY: &str = "AddonPath";

/// An object produced by a script factory, along with the properties it
/// declared.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptObject {
    pub handle: u64,
    pub bounding_radius: Option<f64>,
    pub period: Option<f64>,
    pub begin_date: Option<f64>,
    pub end_date: Option<f64>,
}

pub trait ScriptHost {
    /// Loads `module` (if any) and calls `factory` with `params`.
    fn instantiate(
        &self,
        module: Option<&str>,
        factory: &str,
        params: &ScriptParams,
    ) -> Result<ScriptObject>;

    /// Position in km, z-up.
    fn call_position(&self, object: &ScriptObject, t: f64) -> Result<Vector3<f64>>;

    /// Orientation as `(w, x, y, z)`.
    fn call_orientation(&self, object: &ScriptObject, t: f64) -> Result<[f64; 4]>;
}

pub type SharedScriptHost = Rc<dyn ScriptHost>;

/// Properties shared by scripted orbits and rotations.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ScriptTiming {
    period: f64,
    valid: Option<Interval>,
}

impl ScriptTiming {
    #[allow(clippy::float_cmp)]
    fn from_object(object: &ScriptObject) -> Result<Self> {
        let begin = object.begin_date.unwrap_or(0.0);
        let end = object.end_date.unwrap_or(0.0);
        if end < begin {
            return Err(Error::InvalidPhaseInterval { start: begin, end });
        }

        // An empty range means the script is valid at all times
        let valid = if begin == end {
            None
        } else {
            Some(Interval::new(begin, end))
        };

        Ok(Self {
            period: object.period.unwrap_or(0.0),
            valid,
        })
    }

    fn period(&self) -> f64 {
        if self.period == 0.0 {
            self.valid.map_or(0.0, |v| v.width())
        } else {
            self.period
        }
    }

    fn is_periodic(&self) -> bool {
        self.period != 0.0
    }
}

fn instantiate(
    host: &dyn ScriptHost,
    module: Option<&str>,
    factory: &str,
    params: &ScriptParams,
    addon_path: &Path,
) -> Result<ScriptObject> {
    let mut params = params.clone();
    params.insert(
        ADDON_PATH_KEY.to_owned(),
        ScriptValue::Text(addon_path.display().to_string()),
    );
    host.instantiate(module, factory, &params)
}

/// A trajectory whose positions come from a script.
pub struct ScriptedOrbit {
    host: SharedScriptHost,
    object: ScriptObject,
    bounding_radius: f64,
    timing: ScriptTiming,
}

impl ScriptedOrbit {
    pub fn new(
        host: SharedScriptHost,
        module: Option<&str>,
        factory: &str,
        params: &ScriptParams,
        addon_path: &Path,
    ) -> Result<Self> {
        Self::create(host, module, factory, params, addon_path).map_err(|e| {
            error!("Could not create scripted orbit with {}: {}", factory, e);
            e
        })
    }

    fn create(
        host: SharedScriptHost,
        module: Option<&str>,
        factory: &str,
        params: &ScriptParams,
        addon_path: &Path,
    ) -> Result<Self> {
        let object = instantiate(host.as_ref(), module, factory, params, addon_path)?;

        let bounding_radius = object
            .bounding_radius
            .ok_or(Error::MissingField("boundingRadius"))?;
        if !(bounding_radius > 0.0) {
            return Err(Error::Provider(format!(
                "bounding radius must be positive, not {}",
                bounding_radius
            )));
        }
        let timing = ScriptTiming::from_object(&object)?;

        Ok(Self {
            host,
            object,
            bounding_radius,
            timing,
        })
    }
}

impl OrbitProvider for ScriptedOrbit {
    fn compute_position(&self, t: f64) -> Vector3<f64> {
        match self.host.call_position(&self.object, t) {
            Ok(p) => to_internal(&p),
            Err(e) => {
                warn!("Scripted position failed: {}", e);
                Vector3::zeros()
            }
        }
    }

    fn period(&self) -> f64 {
        self.timing.period()
    }

    fn bounding_radius(&self) -> f64 {
        self.bounding_radius
    }

    fn is_periodic(&self) -> bool {
        self.timing.is_periodic()
    }

    fn valid_range(&self) -> Option<Interval> {
        self.timing.valid
    }
}

/// A rotation whose orientation comes from a script.
pub struct ScriptedRotation {
    host: SharedScriptHost,
    object: ScriptObject,
    timing: ScriptTiming,
}

impl ScriptedRotation {
    pub fn new(
        host: SharedScriptHost,
        module: Option<&str>,
        factory: &str,
        params: &ScriptParams,
        addon_path: &Path,
    ) -> Result<Self> {
        let created = instantiate(host.as_ref(), module, factory, params, addon_path)
            .and_then(|object| Ok((ScriptTiming::from_object(&object)?, object)));

        match created {
            Ok((timing, object)) => Ok(Self {
                host,
                object,
                timing,
            }),
            Err(e) => {
                error!("Could not create scripted rotation with {}: {}", factory, e);
                Err(e)
            }
        }
    }
}

impl RotationProvider for ScriptedRotation {
    fn compute_spin(&self, t: f64) -> UnitQuaternion<f64> {
        let q = match self.host.call_orientation(&self.object, t) {
            Ok([w, x, y, z]) => UnitQuaternion::try_new(Quaternion::new(w, x, y, z), 1e-12),
            Err(e) => {
                warn!("Scripted orientation failed: {}", e);
                None
            }
        };
        q.unwrap_or_else(UnitQuaternion::identity)
    }

    fn period(&self) -> f64 {
        self.timing.period()
    }

    fn is_periodic(&self) -> bool {
        self.timing.is_periodic()
    }

    fn valid_range(&self) -> Option<Interval> {
        self.timing.valid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::RefCell;

    use approx::assert_relative_eq;

    /// Hands back whatever properties the parameters ask for, and moves
    /// along +x at 1 km/day.
    #[derive(Default)]
    struct EchoHost {
        seen: RefCell<Vec<ScriptParams>>,
    }

    fn number(params: &ScriptParams, key: &str) -> Option<f64> {
        match params.get(key) {
            Some(ScriptValue::Number(x)) => Some(*x),
            _ => None,
        }
    }

    impl ScriptHost for EchoHost {
        fn instantiate(
            &self,
            _module: Option<&str>,
            factory: &str,
            params: &ScriptParams,
        ) -> Result<ScriptObject> {
            self.seen.borrow_mut().push(params.clone());
            if factory != "echo" {
                return Err(Error::Provider(format!("no function named {}", factory)));
            }
            Ok(ScriptObject {
                handle: 7,
                bounding_radius: number(params, "radius"),
                period: number(params, "period"),
                begin_date: number(params, "begin"),
                end_date: number(params, "end"),
            })
        }

        fn call_position(&self, _object: &ScriptObject, t: f64) -> Result<Vector3<f64>> {
            if t < 0.0 {
                return Err(Error::Provider("negative time".to_owned()));
            }
            Ok(Vector3::new(t, 2.0, 3.0))
        }

        fn call_orientation(&self, _object: &ScriptObject, t: f64) -> Result<[f64; 4]> {
            if t < 0.0 {
                Ok([0.0; 4])
            } else {
                Ok([2.0, 0.0, 0.0, 0.0])
            }
        }
    }

    fn params(entries: &[(&str, f64)]) -> ScriptParams {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), ScriptValue::Number(*v)))
            .collect()
    }

    #[test]
    fn test_scripted_orbit() {
        let host = Rc::new(EchoHost::default());
        let orbit = ScriptedOrbit::new(
            host.clone(),
            None,
            "echo",
            &params(&[("radius", 10.0), ("begin", 5.0), ("end", 15.0)]),
            Path::new("extras/probe"),
        )
        .unwrap();

        assert_eq!(orbit.compute_position(1.0), Vector3::new(1.0, 3.0, -2.0));
        assert_eq!(orbit.compute_position(-1.0), Vector3::zeros());
        assert!(!orbit.is_periodic());
        assert_relative_eq!(orbit.period(), 10.0);
        assert_eq!(orbit.valid_range(), Some(Interval::new(5.0, 15.0)));

        let seen = host.seen.borrow();
        assert_eq!(
            seen[0].get(ADDON_PATH_KEY),
            Some(&ScriptValue::Text("extras/probe".to_owned()))
        );
    }

    #[test]
    fn test_scripted_orbit_requires_radius() {
        let host = Rc::new(EchoHost::default());
        let create = |factory: &str, entries: &[(&str, f64)]| {
            ScriptedOrbit::new(host.clone(), None, factory, &params(entries), Path::new("."))
        };

        let missing = create("echo", &[]);
        assert!(matches!(missing, Err(Error::MissingField(_))));

        let negative = create("echo", &[("radius", -1.0)]);
        assert!(matches!(negative, Err(Error::Provider(_))));

        let reversed = create("echo", &[("radius", 1.0), ("begin", 5.0), ("end", 1.0)]);
        assert!(matches!(reversed, Err(Error::InvalidPhaseInterval { .. })));

        let unknown = create("nope", &[("radius", 1.0)]);
        assert!(unknown.is_err());
    }

    #[test]
    fn test_scripted_rotation() {
        let host = Rc::new(EchoHost::default());
        let rotation = ScriptedRotation::new(
            host,
            Some("rotations"),
            "echo",
            &params(&[("period", 3.0)]),
            Path::new("."),
        )
        .unwrap();

        assert!(rotation.is_periodic());
        assert_relative_eq!(rotation.period(), 3.0);
        assert_eq!(rotation.valid_range(), None);

        // Results are normalized, and degenerate ones fall back to identity
        assert_relative_eq!(rotation.compute_spin(1.0), UnitQuaternion::identity());
        assert_eq!(rotation.compute_spin(-1.0), UnitQuaternion::identity());
    }
}
