use std::rc::Rc;

use nalgebra::{UnitQuaternion, Vector3};

use crate::math::geometry::angular_velocity_between;
use crate::math::intervals::Interval;

mod caching;
mod earth;
mod iau;
mod sampled;
mod uniform;

pub use caching::{CachingRotationModel, RotationProvider};
pub use earth::EarthRotationModel;
pub use iau::{custom_rotation_model, custom_rotation_names, IauBody, IauPrecessingElements, IauRotationModel};
pub use sampled::SampledOrientation;
pub use uniform::{ConstantOrientation, PrecessingRotationModel, UniformRotationModel};

pub type SharedRotationModel = Rc<RotationModel>;

/// The orientation of a body relative to its body frame.
///
/// Orientation is split into a spin about the body's pole and the
/// orientation of its equator: `orientation(t) = spin(t) * equator(t)`.
pub enum RotationModel {
    Constant(ConstantOrientation),
    Uniform(UniformRotationModel),
    Precessing(PrecessingRotationModel),
    Iau(CachingRotationModel<IauRotationModel>),
    Earth(CachingRotationModel<EarthRotationModel>),
    Sampled(SampledOrientation),
    Provider(CachingRotationModel<Box<dyn RotationProvider>>),
}

/// Step used to differentiate orientation when nothing better is known.
pub fn differentiation_step(is_periodic: bool, period: f64) -> f64 {
    if is_periodic {
        period / 10000.0
    } else {
        1.0 / 1440.0
    }
}

impl RotationModel {
    pub fn identity() -> Self {
        RotationModel::Constant(ConstantOrientation::new(UnitQuaternion::identity()))
    }

    pub fn iau(model: IauRotationModel) -> Self {
        RotationModel::Iau(CachingRotationModel::new(model))
    }

    pub fn earth() -> Self {
        RotationModel::Earth(CachingRotationModel::new(EarthRotationModel))
    }

    pub fn provider(provider: impl RotationProvider + 'static) -> Self {
        RotationModel::Provider(CachingRotationModel::new(Box::new(provider)))
    }

    fn model(&self) -> &dyn RotationProvider {
        match self {
            RotationModel::Constant(m) => m,
            RotationModel::Uniform(m) => m,
            RotationModel::Precessing(m) => m,
            RotationModel::Iau(m) => m,
            RotationModel::Earth(m) => m,
            RotationModel::Sampled(m) => m,
            RotationModel::Provider(m) => m,
        }
    }

    /// Rotation about the body's pole.
    pub fn spin(&self, t: f64) -> UnitQuaternion<f64> {
        self.model().compute_spin(t)
    }

    /// Orientation of the body's equator within its body frame.
    pub fn equator_orientation(&self, t: f64) -> UnitQuaternion<f64> {
        self.model().compute_equator_orientation(t)
    }

    pub fn orientation(&self, t: f64) -> UnitQuaternion<f64> {
        let model = self.model();
        model.compute_spin(t) * model.compute_equator_orientation(t)
    }

    /// Angular velocity in rad/day.
    pub fn angular_velocity(&self, t: f64) -> Vector3<f64> {
        let model = self.model();
        if let Some(w) = model.compute_angular_velocity(t) {
            return w;
        }

        let dt = differentiation_step(model.is_periodic(), model.period());
        let q0 = self.orientation(t);
        let q1 = self.orientation(t + dt);
        angular_velocity_between(&q1, &q0, dt)
    }

    /// Rotation period in days. Aperiodic models report the span of time they
    /// cover.
    pub fn period(&self) -> f64 {
        self.model().period()
    }

    pub fn is_periodic(&self) -> bool {
        self.model().is_periodic()
    }

    pub fn valid_range(&self) -> Option<Interval> {
        self.model().valid_range()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_orientation_composes_spin_and_equator() {
        let model = RotationModel::Uniform(UniformRotationModel::new(2.0, 0.3, 10.0, 0.4, 1.2));
        for &t in &[10.0, 10.7, 13.1] {
            assert_relative_eq!(
                model.orientation(t),
                model.spin(t) * model.equator_orientation(t),
                epsilon = 1e-15
            );
        }
    }

    #[test]
    fn test_numeric_angular_velocity_matches_uniform() {
        let uniform = UniformRotationModel::new(2.0, 0.3, 10.0, 0.4, 1.2);
        let closed_form = RotationModel::Uniform(uniform.clone());

        // A precessing model with no precession rotates the same way, but has
        // to differentiate numerically
        let numeric = RotationModel::Precessing(PrecessingRotationModel::new(
            2.0, 0.3, 10.0, 0.4, 1.2, 0.0,
        ));

        for &t in &[10.0, 11.3, 17.9] {
            assert_relative_eq!(
                numeric.orientation(t),
                closed_form.orientation(t),
                epsilon = 1e-12
            );
            let w = closed_form.angular_velocity(t);
            assert_relative_eq!(w.norm(), PI, epsilon = 1e-12);
            assert_relative_eq!(numeric.angular_velocity(t), w, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_identity_does_not_rotate() {
        let model = RotationModel::identity();
        assert_eq!(model.orientation(123.0), UnitQuaternion::identity());
        assert_eq!(model.angular_velocity(123.0), Vector3::zeros());
    }
}
