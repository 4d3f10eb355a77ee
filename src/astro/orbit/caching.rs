use std::cell::Cell;

use nalgebra::Vector3;

use super::VELOCITY_DIFF_DELTA;
use crate::math::intervals::Interval;

/// Something that can compute positions along a trajectory.
///
/// All of the analytic and sampled orbits implement this, as do orbits whose
/// positions come from outside the crate (ephemeris kernels, scripts). Results
/// are memoized by wrapping the provider in a [CachingOrbit].
pub trait OrbitProvider {
    fn compute_position(&self, t: f64) -> Vector3<f64>;

    /// `None` means the velocity should be found by differencing positions.
    fn compute_velocity(&self, _t: f64) -> Option<Vector3<f64>> {
        None
    }

    fn period(&self) -> f64;

    fn bounding_radius(&self) -> f64;

    fn is_periodic(&self) -> bool {
        true
    }

    fn valid_range(&self) -> Option<Interval> {
        None
    }
}

impl<P: OrbitProvider + ?Sized> OrbitProvider for Box<P> {
    fn compute_position(&self, t: f64) -> Vector3<f64> {
        (**self).compute_position(t)
    }

    fn compute_velocity(&self, t: f64) -> Option<Vector3<f64>> {
        (**self).compute_velocity(t)
    }

    fn period(&self) -> f64 {
        (**self).period()
    }

    fn bounding_radius(&self) -> f64 {
        (**self).bounding_radius()
    }

    fn is_periodic(&self) -> bool {
        (**self).is_periodic()
    }

    fn valid_range(&self) -> Option<Interval> {
        (**self).valid_range()
    }
}

/// Remembers the most recently computed position and velocity.
///
/// Both share a single cached time; asking for either at a new time discards
/// the other.
pub struct CachingOrbit<P> {
    inner: P,
    last_time: Cell<f64>,
    position: Cell<Option<Vector3<f64>>>,
    velocity: Cell<Option<Vector3<f64>>>,
    evaluations: Cell<u64>,
}

impl<P: OrbitProvider> CachingOrbit<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            last_time: Cell::new(f64::NAN),
            position: Cell::new(None),
            velocity: Cell::new(None),
            evaluations: Cell::new(0),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Number of times the wrapped provider has been asked for a position or
    /// velocity.
    pub fn evaluations(&self) -> u64 {
        self.evaluations.get()
    }

    pub fn position(&self, t: f64) -> Vector3<f64> {
        self.move_to(t);
        if let Some(p) = self.position.get() {
            return p;
        }

        let p = self.compute_position(t);
        self.position.set(Some(p));
        p
    }

    pub fn velocity(&self, t: f64) -> Vector3<f64> {
        self.move_to(t);
        if let Some(v) = self.velocity.get() {
            return v;
        }

        self.bump();
        let v = match self.inner.compute_velocity(t) {
            Some(v) => v,
            None => {
                // The second point bypasses the cache so it doesn't evict t
                let p0 = self.position(t);
                let p1 = self.compute_position(t + VELOCITY_DIFF_DELTA);
                (p1 - p0) / VELOCITY_DIFF_DELTA
            }
        };
        self.velocity.set(Some(v));
        v
    }

    #[allow(clippy::float_cmp)]
    fn move_to(&self, t: f64) {
        if t != self.last_time.get() {
            self.last_time.set(t);
            self.position.set(None);
            self.velocity.set(None);
        }
    }

    fn compute_position(&self, t: f64) -> Vector3<f64> {
        self.bump();
        self.inner.compute_position(t)
    }

    fn bump(&self) {
        self.evaluations.set(self.evaluations.get() + 1);
    }
}
