use std::cell::Cell;

use nalgebra::{UnitQuaternion, Vector3};

use super::ANGULAR_VELOCITY_DIFF_DELTA;
use crate::math::geometry::angular_velocity_between;
use crate::orrery::Orrery;

/// Orientation of a frame whose axes are expensive to work out.
pub trait FrameOrientation {
    fn compute_orientation(&self, orrery: &Orrery, t: f64) -> UnitQuaternion<f64>;

    /// `None` means the orientation should be differentiated numerically.
    fn compute_angular_velocity(&self, _orrery: &Orrery, _t: f64) -> Option<Vector3<f64>> {
        None
    }
}

/// Remembers the orientation and angular velocity of a frame at the most
/// recently requested time.
pub struct CachingFrame<F> {
    inner: F,
    last_time: Cell<f64>,
    orientation: Cell<Option<UnitQuaternion<f64>>>,
    angular_velocity: Cell<Option<Vector3<f64>>>,
    evaluations: Cell<u64>,
}

impl<F: FrameOrientation> CachingFrame<F> {
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            last_time: Cell::new(f64::NAN),
            orientation: Cell::new(None),
            angular_velocity: Cell::new(None),
            evaluations: Cell::new(0),
        }
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }

    /// Number of times the wrapped frame has been evaluated.
    pub fn evaluations(&self) -> u64 {
        self.evaluations.get()
    }

    #[allow(clippy::float_cmp)]
    fn move_to(&self, t: f64) {
        if self.last_time.get() != t {
            self.last_time.set(t);
            self.orientation.set(None);
            self.angular_velocity.set(None);
        }
    }

    pub fn orientation(&self, orrery: &Orrery, t: f64) -> UnitQuaternion<f64> {
        self.move_to(t);
        if let Some(q) = self.orientation.get() {
            return q;
        }

        self.evaluations.set(self.evaluations.get() + 1);
        let q = self.inner.compute_orientation(orrery, t);
        self.orientation.set(Some(q));
        q
    }

    pub fn angular_velocity(&self, orrery: &Orrery, t: f64) -> Vector3<f64> {
        self.move_to(t);
        if let Some(w) = self.angular_velocity.get() {
            return w;
        }

        let w = match self.inner.compute_angular_velocity(orrery, t) {
            Some(w) => {
                self.evaluations.set(self.evaluations.get() + 1);
                w
            }
            None => {
                // The second orientation bypasses the cache so the first stays put
                let q0 = self.orientation(orrery, t);
                let dt = ANGULAR_VELOCITY_DIFF_DELTA;
                let q1 = self.inner.compute_orientation(orrery, t + dt);
                angular_velocity_between(&q1, &q0, dt)
            }
        };
        self.angular_velocity.set(Some(w));
        w
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::f64::consts::PI;

    use approx::assert_relative_eq;

    use crate::math::geometry::y_rotation;

    struct Turntable;

    impl FrameOrientation for Turntable {
        fn compute_orientation(&self, _orrery: &Orrery, t: f64) -> UnitQuaternion<f64> {
            // One turn per day about +y
            y_rotation(-2.0 * PI * t)
        }
    }

    #[test]
    fn test_repeated_time_not_recomputed() {
        let orrery = Orrery::new();
        let frame = CachingFrame::new(Turntable);

        let q = frame.orientation(&orrery, 0.3);
        assert_eq!(frame.orientation(&orrery, 0.3), q);
        assert_eq!(frame.evaluations(), 1);

        frame.orientation(&orrery, 0.4);
        assert_eq!(frame.evaluations(), 2);
    }

    #[test]
    fn test_numeric_angular_velocity() {
        let orrery = Orrery::new();
        let frame = CachingFrame::new(Turntable);

        let w = frame.angular_velocity(&orrery, 0.25);
        assert_relative_eq!(w, Vector3::new(0.0, 2.0 * PI, 0.0), epsilon = 1e-6);

        // The orientation at 0.25 was cached on the way, and survives
        let evaluations = frame.evaluations();
        frame.orientation(&orrery, 0.25);
        assert_eq!(frame.angular_velocity(&orrery, 0.25), w);
        assert_eq!(frame.evaluations(), evaluations);
    }
}
