use std::cell::Cell;

use nalgebra::{UnitQuaternion, Vector3};

use super::differentiation_step;
use crate::math::geometry::angular_velocity_between;
use crate::math::intervals::Interval;

/// A source of orientation for a body.
///
/// Only the spin is required; everything else has a sensible default.
pub trait RotationProvider {
    fn compute_spin(&self, t: f64) -> UnitQuaternion<f64>;

    fn compute_equator_orientation(&self, _t: f64) -> UnitQuaternion<f64> {
        UnitQuaternion::identity()
    }

    /// `None` means the caller should differentiate the orientation itself.
    fn compute_angular_velocity(&self, _t: f64) -> Option<Vector3<f64>> {
        None
    }

    fn period(&self) -> f64;

    fn is_periodic(&self) -> bool {
        true
    }

    fn valid_range(&self) -> Option<Interval> {
        None
    }
}

impl<P: RotationProvider + ?Sized> RotationProvider for Box<P> {
    fn compute_spin(&self, t: f64) -> UnitQuaternion<f64> {
        (**self).compute_spin(t)
    }

    fn compute_equator_orientation(&self, t: f64) -> UnitQuaternion<f64> {
        (**self).compute_equator_orientation(t)
    }

    fn compute_angular_velocity(&self, t: f64) -> Option<Vector3<f64>> {
        (**self).compute_angular_velocity(t)
    }

    fn period(&self) -> f64 {
        (**self).period()
    }

    fn is_periodic(&self) -> bool {
        (**self).is_periodic()
    }

    fn valid_range(&self) -> Option<Interval> {
        (**self).valid_range()
    }
}

/// Remembers the most recent spin, equator orientation and angular velocity,
/// so that repeated queries at the same time don't redo expensive series
/// evaluations.
pub struct CachingRotationModel<R> {
    inner: R,
    last_time: Cell<f64>,
    spin: Cell<Option<UnitQuaternion<f64>>>,
    equator: Cell<Option<UnitQuaternion<f64>>>,
    angular_velocity: Cell<Option<Vector3<f64>>>,
    evaluations: Cell<u64>,
}

impl<R: RotationProvider> CachingRotationModel<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            last_time: Cell::new(f64::NAN),
            spin: Cell::new(None),
            equator: Cell::new(None),
            angular_velocity: Cell::new(None),
            evaluations: Cell::new(0),
        }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    /// Number of times the wrapped model has actually been evaluated.
    pub fn evaluations(&self) -> u64 {
        self.evaluations.get()
    }

    #[allow(clippy::float_cmp)]
    fn move_to(&self, t: f64) {
        if self.last_time.get() != t {
            self.last_time.set(t);
            self.spin.set(None);
            self.equator.set(None);
            self.angular_velocity.set(None);
        }
    }

    fn bump(&self) {
        self.evaluations.set(self.evaluations.get() + 1);
    }

    pub fn spin(&self, t: f64) -> UnitQuaternion<f64> {
        self.move_to(t);
        if let Some(q) = self.spin.get() {
            return q;
        }
        self.bump();
        let q = self.inner.compute_spin(t);
        self.spin.set(Some(q));
        q
    }

    pub fn equator_orientation(&self, t: f64) -> UnitQuaternion<f64> {
        self.move_to(t);
        if let Some(q) = self.equator.get() {
            return q;
        }
        self.bump();
        let q = self.inner.compute_equator_orientation(t);
        self.equator.set(Some(q));
        q
    }

    pub fn angular_velocity(&self, t: f64) -> Vector3<f64> {
        self.move_to(t);
        if let Some(w) = self.angular_velocity.get() {
            return w;
        }

        let w = match self.inner.compute_angular_velocity(t) {
            Some(w) => w,
            None => {
                // The later sample is evaluated directly so that the cache
                // keeps holding the values for t
                let dt = differentiation_step(self.inner.is_periodic(), self.inner.period());
                let q0 = self.spin(t) * self.equator_orientation(t);
                let q1 =
                    self.inner.compute_spin(t + dt) * self.inner.compute_equator_orientation(t + dt);
                angular_velocity_between(&q1, &q0, dt)
            }
        };
        self.bump();
        self.angular_velocity.set(Some(w));
        w
    }
}

impl<R: RotationProvider> RotationProvider for CachingRotationModel<R> {
    fn compute_spin(&self, t: f64) -> UnitQuaternion<f64> {
        self.spin(t)
    }

    fn compute_equator_orientation(&self, t: f64) -> UnitQuaternion<f64> {
        self.equator_orientation(t)
    }

    fn compute_angular_velocity(&self, t: f64) -> Option<Vector3<f64>> {
        Some(self.angular_velocity(t))
    }

    fn period(&self) -> f64 {
        self.inner.period()
    }

    fn is_periodic(&self) -> bool {
        self.inner.is_periodic()
    }

    fn valid_range(&self) -> Option<Interval> {
        self.inner.valid_range()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    use crate::math::geometry::{x_rotation, y_rotation};

    /// Spins once a day about a tilted axis, without knowing its own angular
    /// velocity.
    struct Spinner;

    impl RotationProvider for Spinner {
        fn compute_spin(&self, t: f64) -> UnitQuaternion<f64> {
            y_rotation(-2.0 * PI * t)
        }

        fn compute_equator_orientation(&self, _t: f64) -> UnitQuaternion<f64> {
            x_rotation(0.5)
        }

        fn period(&self) -> f64 {
            1.0
        }
    }

    #[test]
    fn test_repeated_queries_hit_cache() {
        let model = CachingRotationModel::new(Spinner);
        let q = model.spin(0.25);
        assert_eq!(model.spin(0.25), q);
        assert_eq!(model.evaluations(), 1);

        model.equator_orientation(0.25);
        model.equator_orientation(0.25);
        assert_eq!(model.evaluations(), 2);

        // Moving to a new time invalidates everything
        model.spin(0.5);
        model.spin(0.25);
        assert_eq!(model.evaluations(), 4);
    }

    #[test]
    fn test_numeric_angular_velocity() {
        let model = CachingRotationModel::new(Spinner);
        let w = model.angular_velocity(0.1);

        // Angular velocity points along the tilted pole
        let pole = x_rotation(0.5).inverse_transform_vector(&Vector3::y());
        assert_relative_eq!(w.norm(), 2.0 * PI, max_relative = 1e-6);
        assert_relative_eq!(w.normalize(), pole, epsilon = 1e-6);

        // and the cached spin is still the one for t = 0.1
        let evaluations = model.evaluations();
        assert_eq!(model.spin(0.1), y_rotation(-0.2 * PI));
        assert_eq!(model.angular_velocity(0.1), w);
        assert_eq!(model.evaluations(), evaluations);
    }
}
