use std::f64::consts::PI;

use nalgebra::{UnitQuaternion, Vector3};

use super::RotationProvider;
use crate::math::geometry::{x_rotation, y_rotation};

/// Spin angle for a body turning once per `period`, measured from `epoch`.
///
/// Zero longitude sits in the middle of planetary texture maps, so the spin
/// starts half a turn in.
fn uniform_spin(t: f64, period: f64, offset: f64, epoch: f64) -> UnitQuaternion<f64> {
    let rotations = (t - epoch) / period;
    let remainder = rotations - rotations.floor() + 0.5;
    y_rotation(-remainder * 2.0 * PI - offset)
}

fn equator(inclination: f64, node: f64) -> UnitQuaternion<f64> {
    x_rotation(-inclination) * y_rotation(-node)
}

/// An orientation that never changes.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantOrientation {
    orientation: UnitQuaternion<f64>,
}

impl ConstantOrientation {
    pub fn new(orientation: UnitQuaternion<f64>) -> Self {
        Self { orientation }
    }
}

impl RotationProvider for ConstantOrientation {
    fn compute_spin(&self, _t: f64) -> UnitQuaternion<f64> {
        self.orientation
    }

    fn compute_angular_velocity(&self, _t: f64) -> Option<Vector3<f64>> {
        Some(Vector3::zeros())
    }

    fn period(&self) -> f64 {
        0.0
    }

    fn is_periodic(&self) -> bool {
        false
    }
}

/// Constant-rate rotation about a fixed, possibly tilted, axis. All angles
/// are in radians and times in days.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformRotationModel {
    period: f64,
    offset: f64,
    epoch: f64,
    inclination: f64,
    ascending_node: f64,
}

impl UniformRotationModel {
    pub fn new(period: f64, offset: f64, epoch: f64, inclination: f64, ascending_node: f64) -> Self {
        Self {
            period,
            offset,
            epoch,
            inclination,
            ascending_node,
        }
    }
}

impl RotationProvider for UniformRotationModel {
    fn compute_spin(&self, t: f64) -> UnitQuaternion<f64> {
        uniform_spin(t, self.period, self.offset, self.epoch)
    }

    fn compute_equator_orientation(&self, _t: f64) -> UnitQuaternion<f64> {
        equator(self.inclination, self.ascending_node)
    }

    fn compute_angular_velocity(&self, t: f64) -> Option<Vector3<f64>> {
        let axis = self
            .compute_equator_orientation(t)
            .inverse_transform_vector(&Vector3::y());
        Some(axis * (2.0 * PI / self.period))
    }

    fn period(&self) -> f64 {
        self.period
    }
}

/// Uniform rotation whose axis precesses, sweeping the ascending node
/// backwards once every `precession_period` days. A precession period of zero
/// means no precession.
#[derive(Debug, Clone, PartialEq)]
pub struct PrecessingRotationModel {
    period: f64,
    offset: f64,
    epoch: f64,
    inclination: f64,
    ascending_node: f64,
    precession_period: f64,
}

impl PrecessingRotationModel {
    pub fn new(
        period: f64,
        offset: f64,
        epoch: f64,
        inclination: f64,
        ascending_node: f64,
        precession_period: f64,
    ) -> Self {
        Self {
            period,
            offset,
            epoch,
            inclination,
            ascending_node,
            precession_period,
        }
    }

    fn node_of_date(&self, t: f64) -> f64 {
        if self.precession_period == 0.0 {
            self.ascending_node
        } else {
            self.ascending_node - (2.0 * PI / self.precession_period) * (t - self.epoch)
        }
    }
}

impl RotationProvider for PrecessingRotationModel {
    fn compute_spin(&self, t: f64) -> UnitQuaternion<f64> {
        uniform_spin(t, self.period, self.offset, self.epoch)
    }

    fn compute_equator_orientation(&self, t: f64) -> UnitQuaternion<f64> {
        equator(self.inclination, self.node_of_date(t))
    }

    fn period(&self) -> f64 {
        self.period
    }
}
