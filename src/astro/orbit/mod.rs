use std::rc::Rc;

use nalgebra::Vector3;

use crate::config::SamplingConfig;
use crate::math::intervals::Interval;

mod caching;
mod elliptical;
mod fixed;
mod mixed;
mod sampled;
mod sampler;

pub use caching::{CachingOrbit, OrbitProvider};
pub use elliptical::{EllipticalOrbit, OrbitalElements};
pub use fixed::{FixedOrbit, SynchronousOrbit};
pub use mixed::MixedOrbit;
pub use sampled::{
    Interpolation, OrientationSample, PositionSample, SamplePrecision, SampledOrbit,
    SampledOrbitXyzv, StateSample,
};
pub use sampler::{adaptive_sample, StepParameters};

/// Step used when a velocity is found by differencing positions, in days.
pub const VELOCITY_DIFF_DELTA: f64 = 1.0 / 1440.0;

pub type SharedOrbit = Rc<Orbit>;

/// Receives points along an orbit path, in increasing time order.
pub trait OrbitSampleProc {
    fn sample(&mut self, t: f64, position: &Vector3<f64>, velocity: &Vector3<f64>);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitSample {
    pub t: f64,
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
}

impl OrbitSampleProc for Vec<OrbitSample> {
    fn sample(&mut self, t: f64, position: &Vector3<f64>, velocity: &Vector3<f64>) {
        self.push(OrbitSample {
            t,
            position: *position,
            velocity: *velocity,
        });
    }
}

/// The motion of a body relative to the center of its orbit frame.
///
/// Positions are in km and velocities in km/day, both in the frame's internal
/// (y-up) coordinates.
pub enum Orbit {
    Elliptical(CachingOrbit<EllipticalOrbit>),
    Sampled(CachingOrbit<SampledOrbit>),
    SampledWithVelocity(CachingOrbit<SampledOrbitXyzv>),
    Mixed(MixedOrbit),
    Fixed(FixedOrbit),
    Synchronous(SynchronousOrbit),
    Provider(CachingOrbit<Box<dyn OrbitProvider>>),
}

impl Orbit {
    pub fn elliptical(orbit: EllipticalOrbit) -> Self {
        Orbit::Elliptical(CachingOrbit::new(orbit))
    }

    pub fn sampled(orbit: SampledOrbit) -> Self {
        Orbit::Sampled(CachingOrbit::new(orbit))
    }

    pub fn sampled_with_velocity(orbit: SampledOrbitXyzv) -> Self {
        Orbit::SampledWithVelocity(CachingOrbit::new(orbit))
    }

    pub fn provider(provider: impl OrbitProvider + 'static) -> Self {
        Orbit::Provider(CachingOrbit::new(Box::new(provider)))
    }

    pub fn position(&self, t: f64) -> Vector3<f64> {
        match self {
            Orbit::Elliptical(o) => o.position(t),
            Orbit::Sampled(o) => o.position(t),
            Orbit::SampledWithVelocity(o) => o.position(t),
            Orbit::Mixed(o) => o.position(t),
            Orbit::Fixed(o) => o.position(),
            Orbit::Synchronous(o) => o.position(t),
            Orbit::Provider(o) => o.position(t),
        }
    }

    pub fn velocity(&self, t: f64) -> Vector3<f64> {
        match self {
            Orbit::Elliptical(o) => o.velocity(t),
            Orbit::Sampled(o) => o.velocity(t),
            Orbit::SampledWithVelocity(o) => o.velocity(t),
            Orbit::Mixed(o) => o.velocity(t),
            Orbit::Fixed(_) => Vector3::zeros(),
            Orbit::Synchronous(o) => {
                let p0 = o.position(t);
                let p1 = o.position(t + VELOCITY_DIFF_DELTA);
                (p1 - p0) / VELOCITY_DIFF_DELTA
            }
            Orbit::Provider(o) => o.velocity(t),
        }
    }

    /// Orbital period in days. Aperiodic orbits report the length of time they
    /// are meaningful over.
    pub fn period(&self) -> f64 {
        match self {
            Orbit::Elliptical(o) => o.inner().period(),
            Orbit::Sampled(o) => o.inner().period(),
            Orbit::SampledWithVelocity(o) => o.inner().period(),
            Orbit::Mixed(o) => o.period(),
            Orbit::Fixed(o) => o.period(),
            Orbit::Synchronous(o) => o.period(),
            Orbit::Provider(o) => o.inner().period(),
        }
    }

    /// Radius of a sphere about the frame center that contains the whole orbit.
    pub fn bounding_radius(&self) -> f64 {
        match self {
            Orbit::Elliptical(o) => o.inner().bounding_radius(),
            Orbit::Sampled(o) => o.inner().bounding_radius(),
            Orbit::SampledWithVelocity(o) => o.inner().bounding_radius(),
            Orbit::Mixed(o) => o.bounding_radius(),
            Orbit::Fixed(o) => o.bounding_radius(),
            Orbit::Synchronous(o) => o.bounding_radius(),
            Orbit::Provider(o) => o.inner().bounding_radius(),
        }
    }

    pub fn is_periodic(&self) -> bool {
        match self {
            Orbit::Elliptical(o) => o.inner().is_periodic(),
            Orbit::Sampled(o) => o.inner().is_periodic(),
            Orbit::SampledWithVelocity(o) => o.inner().is_periodic(),
            Orbit::Mixed(_) => true,
            Orbit::Fixed(_) => false,
            Orbit::Synchronous(_) => true,
            Orbit::Provider(o) => o.inner().is_periodic(),
        }
    }

    /// The time range outside of which the orbit is clamped or extrapolated.
    /// `None` means the orbit is valid for all time.
    pub fn valid_range(&self) -> Option<Interval> {
        match self {
            Orbit::Elliptical(o) => o.inner().valid_range(),
            Orbit::Sampled(o) => o.inner().valid_range(),
            Orbit::SampledWithVelocity(o) => o.inner().valid_range(),
            Orbit::Provider(o) => o.inner().valid_range(),
            Orbit::Mixed(_) | Orbit::Fixed(_) | Orbit::Synchronous(_) => None,
        }
    }

    pub fn sample(&self, start: f64, end: f64, proc: &mut dyn OrbitSampleProc) {
        self.sample_with_config(start, end, proc, &SamplingConfig::default());
    }

    /// Emits points along the orbit between `start` and `end`.
    ///
    /// Sampled trajectories emit their stored samples, fixed and synchronous
    /// orbits emit nothing, and everything else is sampled adaptively with steps
    /// scaled to the orbit's period (or valid span).
    pub fn sample_with_config(
        &self,
        start: f64,
        end: f64,
        proc: &mut dyn OrbitSampleProc,
        config: &SamplingConfig,
    ) {
        match self {
            Orbit::Sampled(o) => o.inner().emit_samples(proc),
            Orbit::SampledWithVelocity(o) => o.inner().emit_samples(proc),
            Orbit::Fixed(_) | Orbit::Synchronous(_) => {}
            Orbit::Mixed(o) => o
                .orbit_at(start)
                .sample_with_config(start, end, proc, config),
            Orbit::Elliptical(_) | Orbit::Provider(_) => {
                let params = StepParameters::from_config(config, self.sampling_span(start, end));
                adaptive_sample(self, start, end, proc, &params);
            }
        }
    }

    fn sampling_span(&self, start: f64, end: f64) -> f64 {
        if self.is_periodic() {
            self.period()
        } else {
            match self.valid_range() {
                Some(range) => range.width(),
                None => end - start,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::consts::testing::{EARTH_ORBIT_RADIUS, EARTH_PERIOD};

    fn earth_like() -> Orbit {
        Orbit::elliptical(EllipticalOrbit::new(
            &OrbitalElements {
                pericenter_distance: EARTH_ORBIT_RADIUS,
                period: EARTH_PERIOD,
                ..OrbitalElements::default()
            },
            0.0,
        ))
    }

    #[test]
    fn test_adaptive_sampling_covers_range() {
        let orbit = earth_like();
        let mut samples: Vec<OrbitSample> = vec![];
        orbit.sample(0.0, EARTH_PERIOD, &mut samples);

        assert!(samples.len() > 10);
        assert_eq!(samples[0].t, 0.0);
        assert_relative_eq!(samples.last().unwrap().t, EARTH_PERIOD, epsilon = 1e-9);
        assert!(samples.windows(2).all(|w| w[0].t < w[1].t));

        // No step is longer than a hundredth of the period
        let max_step = samples
            .windows(2)
            .map(|w| w[1].t - w[0].t)
            .fold(0.0, f64::max);
        assert!(max_step <= EARTH_PERIOD / 100.0 + 1e-9);

        for s in samples.iter() {
            assert_relative_eq!(s.position, orbit.position(s.t));
            assert_relative_eq!(s.position.norm(), EARTH_ORBIT_RADIUS, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_fixed_orbits_emit_nothing() {
        let orbit = Orbit::Fixed(FixedOrbit::new(Vector3::new(1.0, 2.0, 3.0)));
        let mut samples: Vec<OrbitSample> = vec![];
        orbit.sample(0.0, 10.0, &mut samples);
        assert!(samples.is_empty());
        assert_eq!(orbit.velocity(3.0), Vector3::zeros());
        assert!(!orbit.is_periodic());
    }

    #[test]
    fn test_hyperbolic_sampling_uses_valid_span() {
        let orbit = Orbit::elliptical(EllipticalOrbit::new(
            &OrbitalElements {
                pericenter_distance: 1e8,
                eccentricity: 1.5,
                period: 1000.0,
                ..OrbitalElements::default()
            },
            0.0,
        ));
        let range = orbit.valid_range().unwrap();
        assert!(!orbit.is_periodic());
        assert_relative_eq!(orbit.period(), range.width());

        let mut samples: Vec<OrbitSample> = vec![];
        orbit.sample(-10.0, 10.0, &mut samples);
        let max_step = samples
            .windows(2)
            .map(|w| w[1].t - w[0].t)
            .fold(0.0, f64::max);
        assert!(max_step <= range.width() / 100.0 + 1e-9);
        assert!(samples.iter().all(|s| s.position.norm() >= 1e8 * (1.0 - 1e-9)));
        assert_relative_eq!(samples.last().unwrap().t, 10.0, epsilon = 1e-9);
    }
}
