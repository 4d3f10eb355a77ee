use nalgebra::{UnitQuaternion, Vector3};

use super::{frame_depth, FrameRole};
use crate::math::geometry::y_rot_180;
use crate::orrery::{Orrery, Selection};

/// A frame that rotates along with an object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyFixedFrame {
    pub center: Selection,
    pub object: Selection,
}

impl BodyFixedFrame {
    pub fn new(center: Selection, object: Selection) -> Self {
        Self { center, object }
    }

    pub fn orientation(&self, orrery: &Orrery, t: f64) -> UnitQuaternion<f64> {
        let q = match self.object {
            Selection::Body(id) => orrery.body_orientation(id, t),
            Selection::Star(id) => orrery.star(id).rotation_model().orientation(t),
            Selection::None | Selection::DeepSky(_) => UnitQuaternion::identity(),
        };
        y_rot_180() * q
    }

    pub fn angular_velocity(&self, orrery: &Orrery, t: f64) -> Vector3<f64> {
        match self.object {
            Selection::Body(id) => orrery.body_angular_velocity(id, t),
            Selection::Star(id) => orrery.star(id).rotation_model().angular_velocity(t),
            Selection::None | Selection::DeepSky(_) => Vector3::zeros(),
        }
    }

    pub fn nesting_depth(&self, orrery: &Orrery, depth: u32, max_depth: u32) -> u32 {
        let n = frame_depth(orrery, self.center, depth, max_depth, FrameRole::Position);
        if n > max_depth {
            return n;
        }
        let m = frame_depth(orrery, self.object, depth, max_depth, FrameRole::Orientation);
        n.max(m)
    }
}

/// A frame aligned with an object's mean equator, optionally frozen at one
/// instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyMeanEquatorFrame {
    pub center: Selection,
    pub object: Selection,
    pub freeze_epoch: Option<f64>,
}

impl BodyMeanEquatorFrame {
    pub fn new(center: Selection, object: Selection) -> Self {
        Self {
            center,
            object,
            freeze_epoch: None,
        }
    }

    pub fn frozen(center: Selection, object: Selection, epoch: f64) -> Self {
        Self {
            center,
            object,
            freeze_epoch: Some(epoch),
        }
    }

    pub fn orientation(&self, orrery: &Orrery, t: f64) -> UnitQuaternion<f64> {
        let t = self.freeze_epoch.unwrap_or(t);
        match self.object {
            Selection::Body(id) => orrery.body_equator_orientation(id, t),
            Selection::Star(id) => orrery.star(id).rotation_model().equator_orientation(t),
            Selection::None | Selection::DeepSky(_) => UnitQuaternion::identity(),
        }
    }

    pub fn angular_velocity(&self, orrery: &Orrery, t: f64) -> Vector3<f64> {
        if self.freeze_epoch.is_some() {
            return Vector3::zeros();
        }
        match self.object {
            Selection::Body(id) => orrery.body(id).body_frame(t).angular_velocity(orrery, t),
            _ => Vector3::zeros(),
        }
    }

    pub fn is_inertial(&self, orrery: &Orrery) -> bool {
        match (self.freeze_epoch, self.object) {
            (None, Selection::Body(id)) => orrery.body(id).body_frame(0.0).is_inertial(orrery),
            _ => true,
        }
    }

    pub fn nesting_depth(&self, orrery: &Orrery, depth: u32, max_depth: u32) -> u32 {
        let n = frame_depth(orrery, self.center, depth, max_depth, FrameRole::Position);
        if n > max_depth {
            return n;
        }
        let m = frame_depth(orrery, self.object, depth, max_depth, FrameRole::Orientation);
        n.max(m)
    }
}
