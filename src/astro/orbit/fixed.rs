use nalgebra::Vector3;

use crate::astro::rotation::SharedRotationModel;

/// A body that doesn't move relative to its frame center.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedOrbit {
    position: Vector3<f64>,
}

impl FixedOrbit {
    pub fn new(position: Vector3<f64>) -> Self {
        Self { position }
    }

    pub fn position(&self) -> Vector3<f64> {
        self.position
    }

    pub fn period(&self) -> f64 {
        1.0
    }

    pub fn bounding_radius(&self) -> f64 {
        self.position.norm() * 1.1
    }
}

/// A point held fixed relative to a rotating body's surface, such as a
/// geostationary satellite or a surface feature.
pub struct SynchronousOrbit {
    rotation_model: SharedRotationModel,
    position: Vector3<f64>,
}

impl SynchronousOrbit {
    pub fn new(rotation_model: SharedRotationModel, position: Vector3<f64>) -> Self {
        Self {
            rotation_model,
            position,
        }
    }

    pub fn position(&self, t: f64) -> Vector3<f64> {
        self.rotation_model.spin(t).inverse_transform_vector(&self.position)
    }

    pub fn period(&self) -> f64 {
        self.rotation_model.period()
    }

    pub fn bounding_radius(&self) -> f64 {
        self.position.norm()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::rc::Rc;

    use approx::assert_relative_eq;

    use crate::astro::rotation::{RotationModel, UniformRotationModel};

    #[test]
    fn test_synchronous_follows_spin() {
        let model = Rc::new(RotationModel::Uniform(UniformRotationModel::new(
            1.0, 0.0, 0.0, 0.0, 0.0,
        )));
        let orbit = SynchronousOrbit::new(model, Vector3::new(42164.0, 0.0, 0.0));

        assert_relative_eq!(orbit.period(), 1.0);
        assert_relative_eq!(orbit.bounding_radius(), 42164.0);

        // A full day later the point is back where it started
        assert_relative_eq!(orbit.position(0.25), orbit.position(1.25), epsilon = 1e-6);
        for &t in &[0.0, 0.3, 0.8] {
            assert_relative_eq!(orbit.position(t).norm(), 42164.0, max_relative = 1e-12);
            assert_relative_eq!(orbit.position(t).y, 0.0, epsilon = 1e-9);
        }
        assert!((orbit.position(0.0) - orbit.position(0.5)).norm() > 80000.0);
    }
}
