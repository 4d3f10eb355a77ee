//! Orbits and rotations read from an ephemeris kernel supplied by the host
//! application.
//!
//! The kernel speaks in seconds past J2000 and in its own named frames; the
//! providers here translate to TDB Julian days, km/day and internal axes.

use std::rc::Rc;

use nalgebra::{Matrix3, Rotation3, UnitQuaternion, Vector3};
use tracing::{error, warn};

use super::orbit::OrbitProvider;
use super::rotation::RotationProvider;
use crate::consts::{J2000, SECONDS_PER_DAY};
use crate::error::{Error, Result};
use crate::math::geometry::{rotation_to_internal, to_internal};
use crate::math::intervals::Interval;

/// Coverage windows are pulled in by this much at each end, in days.
const MILLISECOND: f64 = 0.001 / SECONDS_PER_DAY;

/// Frame used for trajectories and the default base for rotations.
pub const ECLIPTIC_J2000: &str = "eclipj2000";

fn seconds_past_j2000(t: f64) -> f64 {
    (t - J2000) * SECONDS_PER_DAY
}

fn days_from_seconds(et: f64) -> f64 {
    et / SECONDS_PER_DAY + J2000
}

/// A loaded set of ephemeris kernels.
///
/// Times are seconds past J2000 TDB, distances are kilometres and velocities
/// are km/s. Vectors are in the kernel's native z-up axes.
pub trait EphemerisKernel {
    /// Resolves an object name (or numeric string) to its integer id.
    fn naif_id(&self, name: &str) -> Option<i32>;

    /// Time windows over which `target` has trajectory data.
    fn coverage(&self, target: i32) -> Vec<(f64, f64)>;

    fn position(&self, target: i32, et: f64, frame: &str, origin: i32) -> Result<Vector3<f64>>;

    /// Position and velocity.
    fn state(
        &self,
        target: i32,
        et: f64,
        frame: &str,
        origin: i32,
    ) -> Result<(Vector3<f64>, Vector3<f64>)>;

    /// Matrix rotating vectors in `from` into `to`.
    fn rotation(&self, from: &str, to: &str, et: f64) -> Result<Matrix3<f64>>;
}

pub type SharedKernel = Rc<dyn EphemerisKernel>;

#[derive(Debug, Clone, PartialEq)]
pub struct KernelOrbitParams {
    pub target: String,
    pub origin: String,
    /// Zero for aperiodic trajectories.
    pub period: f64,
    pub bounding_radius: Option<f64>,
    pub interval: Option<Interval>,
}

/// The trajectory of one kernel object relative to another.
///
/// A provider that fails to initialize stays usable but evaluates to zero.
pub struct KernelOrbit {
    kernel: SharedKernel,
    target_name: String,
    target: i32,
    origin: i32,
    period: f64,
    bounding_radius: f64,
    valid: Interval,
    failed: bool,
}

impl KernelOrbit {
    pub fn new(kernel: SharedKernel, params: &KernelOrbitParams) -> Self {
        let mut orbit = Self {
            kernel,
            target_name: params.target.clone(),
            target: 0,
            origin: 0,
            period: params.period,
            bounding_radius: params.bounding_radius.unwrap_or(1.0),
            valid: params.interval.unwrap_or_else(|| Interval::point(0.0)),
            failed: false,
        };

        if let Err(e) = orbit.init(params) {
            error!("Kernel orbit for {} unavailable: {}", params.target, e);
            orbit.failed = true;
        }
        orbit
    }

    fn init(&mut self, params: &KernelOrbitParams) -> Result<()> {
        let unresolved = |name: &str| Error::UnresolvedObject(name.to_owned());
        self.target = self
            .kernel
            .naif_id(&params.target)
            .ok_or_else(|| unresolved(&params.target))?;
        self.origin = self
            .kernel
            .naif_id(&params.origin)
            .ok_or_else(|| unresolved(&params.origin))?;

        // The barycenter is everywhere, always
        let windows: Vec<Interval> = if self.target == 0 {
            vec![Interval::new(-1.0e50, 1.0e50)]
        } else {
            self.kernel
                .coverage(self.target)
                .into_iter()
                .map(|(lo, hi)| Interval::new(days_from_seconds(lo), days_from_seconds(hi)))
                .collect()
        };
        let first = windows.first().ok_or_else(|| {
            Error::Provider(format!("no kernel coverage for {}", params.target))
        })?;

        self.valid = match params.interval {
            None if self.target == 0 => *first,
            None => first.shrink(MILLISECOND),
            Some(interval) => {
                let interval = interval.shrink(MILLISECOND);
                if !windows.iter().any(|w| interval.is_subset_of(w)) {
                    return Err(Error::Provider(format!(
                        "interval [{}, {}] not covered for {}",
                        interval.lo(),
                        interval.hi(),
                        params.target
                    )));
                }
                interval
            }
        };

        // Make sure the kernel can actually produce a state
        self.kernel.position(
            self.target,
            seconds_past_j2000(self.valid.lo()),
            ECLIPTIC_J2000,
            self.origin,
        )?;
        Ok(())
    }

    pub fn is_failed(&self) -> bool {
        self.failed
    }
}

impl OrbitProvider for KernelOrbit {
    fn compute_position(&self, t: f64) -> Vector3<f64> {
        if self.failed {
            return Vector3::zeros();
        }

        let et = seconds_past_j2000(self.valid.clamp(t));
        match self.kernel.position(self.target, et, ECLIPTIC_J2000, self.origin) {
            Ok(p) => to_internal(&p),
            Err(e) => {
                warn!("Kernel position of {} failed: {}", self.target_name, e);
                Vector3::zeros()
            }
        }
    }

    fn compute_velocity(&self, t: f64) -> Option<Vector3<f64>> {
        if self.failed {
            return Some(Vector3::zeros());
        }

        let et = seconds_past_j2000(self.valid.clamp(t));
        let v = match self.kernel.state(self.target, et, ECLIPTIC_J2000, self.origin) {
            Ok((_, v)) => to_internal(&v) * SECONDS_PER_DAY,
            Err(e) => {
                warn!("Kernel state of {} failed: {}", self.target_name, e);
                Vector3::zeros()
            }
        };
        Some(v)
    }

    fn period(&self) -> f64 {
        if self.is_periodic() {
            self.period
        } else {
            self.valid.width()
        }
    }

    fn bounding_radius(&self) -> f64 {
        self.bounding_radius
    }

    fn is_periodic(&self) -> bool {
        self.period != 0.0
    }

    fn valid_range(&self) -> Option<Interval> {
        Some(self.valid)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KernelRotationParams {
    pub frame: String,
    pub base_frame: Option<String>,
    /// Zero for aperiodic rotations.
    pub period: f64,
    pub interval: Option<Interval>,
}

/// The orientation of a kernel frame relative to a base frame.
pub struct KernelRotation {
    kernel: SharedKernel,
    frame: String,
    base_frame: String,
    period: f64,
    valid: Option<Interval>,
}

impl KernelRotation {
    pub fn new(kernel: SharedKernel, params: &KernelRotationParams) -> Self {
        Self {
            kernel,
            frame: params.frame.clone(),
            base_frame: params
                .base_frame
                .clone()
                .unwrap_or_else(|| ECLIPTIC_J2000.to_owned()),
            period: params.period,
            valid: params.interval.map(|i| i.shrink(MILLISECOND)),
        }
    }
}

impl RotationProvider for KernelRotation {
    fn compute_spin(&self, t: f64) -> UnitQuaternion<f64> {
        let t = self.valid.map_or(t, |v| v.clamp(t));
        let et = seconds_past_j2000(t);
        match self.kernel.rotation(&self.base_frame, &self.frame, et) {
            Ok(m) => {
                let q = UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix(&m));
                rotation_to_internal(&q)
            }
            Err(e) => {
                warn!("Kernel rotation of {} failed: {}", self.frame, e);
                UnitQuaternion::identity()
            }
        }
    }

    fn period(&self) -> f64 {
        if self.is_periodic() {
            self.period
        } else {
            self.valid.map_or(0.0, |v| v.width())
        }
    }

    fn is_periodic(&self) -> bool {
        self.period != 0.0
    }

    fn valid_range(&self) -> Option<Interval> {
        self.valid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::Cell;

    use approx::assert_relative_eq;

    use crate::math::geometry::z_rotation;

    /// A body circling the origin once a day at 1000 km, covered for ten
    /// days after J2000.
    struct CircleKernel {
        calls: Cell<u32>,
    }

    impl CircleKernel {
        fn shared() -> Rc<Self> {
            Rc::new(Self {
                calls: Cell::new(0),
            })
        }

        fn state_at(et: f64) -> (Vector3<f64>, Vector3<f64>) {
            let w = 2.0 * std::f64::consts::PI / SECONDS_PER_DAY;
            let (s, c) = (w * et).sin_cos();
            (
                Vector3::new(1000.0 * c, 1000.0 * s, 0.0),
                Vector3::new(-1000.0 * w * s, 1000.0 * w * c, 0.0),
            )
        }
    }

    impl EphemerisKernel for CircleKernel {
        fn naif_id(&self, name: &str) -> Option<i32> {
            match name {
                "sun" => Some(10),
                "probe" => Some(-42),
                _ => name.parse().ok(),
            }
        }

        fn coverage(&self, target: i32) -> Vec<(f64, f64)> {
            if target == -42 {
                vec![
                    (0.0, 10.0 * SECONDS_PER_DAY),
                    (20.0 * SECONDS_PER_DAY, 30.0 * SECONDS_PER_DAY),
                ]
            } else {
                vec![]
            }
        }

        fn position(
            &self,
            target: i32,
            et: f64,
            _frame: &str,
            _origin: i32,
        ) -> Result<Vector3<f64>> {
            self.calls.set(self.calls.get() + 1);
            if target == -42 {
                Ok(Self::state_at(et).0)
            } else {
                Err(Error::Provider("no data".to_owned()))
            }
        }

        fn state(
            &self,
            _target: i32,
            et: f64,
            _frame: &str,
            _origin: i32,
        ) -> Result<(Vector3<f64>, Vector3<f64>)> {
            Ok(Self::state_at(et))
        }

        fn rotation(&self, _from: &str, to: &str, et: f64) -> Result<Matrix3<f64>> {
            match to {
                "iau_probe" => Ok(*z_rotation(et / SECONDS_PER_DAY).to_rotation_matrix().matrix()),
                _ => Err(Error::Provider(format!("unknown frame {}", to))),
            }
        }
    }

    fn params(interval: Option<Interval>) -> KernelOrbitParams {
        KernelOrbitParams {
            target: "probe".to_owned(),
            origin: "sun".to_owned(),
            period: 0.0,
            bounding_radius: Some(1000.0),
            interval,
        }
    }

    #[test]
    fn test_default_interval_is_first_window() {
        let orbit = KernelOrbit::new(CircleKernel::shared(), &params(None));
        assert!(!orbit.is_failed());

        let range = orbit.valid_range().unwrap();
        assert_relative_eq!(range.lo(), J2000 + MILLISECOND);
        assert_relative_eq!(range.hi(), J2000 + 10.0 - MILLISECOND);
        assert!(!orbit.is_periodic());
        assert_relative_eq!(orbit.period(), range.width());
    }

    #[test]
    fn test_position_in_internal_axes() {
        let orbit = KernelOrbit::new(CircleKernel::shared(), &params(None));

        // A quarter day in, the body is on the kernel's +y axis, which is
        // internal -z
        let p = orbit.compute_position(J2000 + 0.25);
        assert_relative_eq!(p, Vector3::new(0.0, 0.0, -1000.0), epsilon = 1e-6);

        let v = orbit.compute_velocity(J2000 + 0.25).unwrap();
        let speed = 2.0 * std::f64::consts::PI * 1000.0;
        assert_relative_eq!(v, Vector3::new(-speed, 0.0, 0.0), epsilon = 1e-6);

        // Times outside the window are clamped
        assert_eq!(orbit.compute_position(J2000 + 100.0), orbit.compute_position(J2000 + 10.0));
    }

    #[test]
    fn test_explicit_interval_must_be_covered() {
        let covered = KernelOrbit::new(
            CircleKernel::shared(),
            &params(Some(Interval::new(J2000 + 21.0, J2000 + 25.0))),
        );
        assert!(!covered.is_failed());

        let straddling = KernelOrbit::new(
            CircleKernel::shared(),
            &params(Some(Interval::new(J2000 + 5.0, J2000 + 25.0))),
        );
        assert!(straddling.is_failed());
        assert_eq!(straddling.compute_position(J2000 + 6.0), Vector3::zeros());
    }

    #[test]
    fn test_unknown_target_fails() {
        let kernel = CircleKernel::shared();
        let mut p = params(None);
        p.target = "nowhere".to_owned();
        let orbit = KernelOrbit::new(kernel.clone(), &p);
        assert!(orbit.is_failed());

        // Failed providers never reach the kernel again
        let calls = kernel.calls.get();
        assert_eq!(orbit.compute_position(J2000), Vector3::zeros());
        assert_eq!(orbit.compute_velocity(J2000), Some(Vector3::zeros()));
        assert_eq!(kernel.calls.get(), calls);
    }

    #[test]
    fn test_kernel_rotation() {
        let rotation = KernelRotation::new(
            CircleKernel::shared(),
            &KernelRotationParams {
                frame: "iau_probe".to_owned(),
                base_frame: None,
                period: 2.0 * std::f64::consts::PI,
                interval: None,
            },
        );
        assert!(rotation.is_periodic());
        assert_relative_eq!(
            rotation.compute_spin(J2000 + 0.5),
            rotation_to_internal(&z_rotation(0.5)),
            epsilon = 1e-12
        );

        let broken = KernelRotation::new(
            CircleKernel::shared(),
            &KernelRotationParams {
                frame: "iau_nothing".to_owned(),
                base_frame: Some("j2000".to_owned()),
                period: 0.0,
                interval: None,
            },
        );
        assert_eq!(broken.compute_spin(J2000), UnitQuaternion::identity());
    }
}
