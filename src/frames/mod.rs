//! Reference frames: time-varying coordinate systems attached to objects.
//!
//! A frame has a center (an object in the [Orrery]) and an orientation `q(t)`,
//! which takes universal vectors into frame coordinates:
//! `local = q * (universal - center)`.
//!
//! Frames refer to other objects by [Selection] handle, so evaluating one needs
//! the orrery those handles belong to.

use std::rc::Rc;

use nalgebra::{Point3, UnitQuaternion, Vector3};

use crate::consts::j2000_obliquity;
use crate::math::frame::FrameTransform;
use crate::math::geometry::{angular_velocity_between, x_rotation};
use crate::orrery::{BodyID, Orrery, Selection};

mod caching;
mod fixed;
mod two_vector;

pub use caching::{CachingFrame, FrameOrientation};
pub use fixed::{BodyFixedFrame, BodyMeanEquatorFrame};
pub use two_vector::{Axis, FrameVector, TwoVectorFrame};

/// Step used to differentiate frame orientations, in days.
pub const ANGULAR_VELOCITY_DIFF_DELTA: f64 = 1.0 / 1440.0;

pub type SharedFrame = Rc<ReferenceFrame>;

pub enum ReferenceFrame {
    /// Axes of the J2000 ecliptic.
    J2000Ecliptic { center: Selection },
    /// Axes of the J2000 Earth equator.
    J2000Equator { center: Selection },
    BodyFixed(BodyFixedFrame),
    BodyMeanEquator(BodyMeanEquatorFrame),
    TwoVector(CachingFrame<TwoVectorFrame>),
}

/// Which of a body's frames a nesting check follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameRole {
    /// The frame its orbit is given in
    Position,
    /// The frame its rotation is given in
    Orientation,
}

/// Depth of the chain of frames needed to place (or orient) `selection`,
/// starting from `depth`. Stops descending as soon as `max_depth` is exceeded.
pub fn frame_depth(
    orrery: &Orrery,
    selection: Selection,
    depth: u32,
    max_depth: u32,
    role: FrameRole,
) -> u32 {
    if depth > max_depth {
        return depth;
    }

    let body = match selection {
        Selection::Body(id) => match orrery.get_body(id) {
            Some(body) => body,
            None => return depth,
        },
        _ => return depth,
    };

    let frame = match role {
        FrameRole::Position => body.orbit_frame(0.0),
        FrameRole::Orientation => body.body_frame(0.0),
    };
    frame.nesting_depth(orrery, depth + 1, max_depth).max(depth)
}

impl ReferenceFrame {
    pub fn j2000_ecliptic(center: Selection) -> Self {
        ReferenceFrame::J2000Ecliptic { center }
    }

    pub fn j2000_equator(center: Selection) -> Self {
        ReferenceFrame::J2000Equator { center }
    }

    pub fn body_fixed(center: Selection, object: Selection) -> Self {
        ReferenceFrame::BodyFixed(BodyFixedFrame::new(center, object))
    }

    pub fn mean_equator(center: Selection, object: Selection) -> Self {
        ReferenceFrame::BodyMeanEquator(BodyMeanEquatorFrame::new(center, object))
    }

    pub fn frozen_mean_equator(center: Selection, object: Selection, epoch: f64) -> Self {
        ReferenceFrame::BodyMeanEquator(BodyMeanEquatorFrame::frozen(center, object, epoch))
    }

    pub fn two_vector(frame: TwoVectorFrame) -> Self {
        ReferenceFrame::TwoVector(CachingFrame::new(frame))
    }

    pub fn center(&self) -> Selection {
        match self {
            ReferenceFrame::J2000Ecliptic { center } | ReferenceFrame::J2000Equator { center } => {
                *center
            }
            ReferenceFrame::BodyFixed(f) => f.center,
            ReferenceFrame::BodyMeanEquator(f) => f.center,
            ReferenceFrame::TwoVector(f) => f.inner().center(),
        }
    }

    pub fn orientation(&self, orrery: &Orrery, t: f64) -> UnitQuaternion<f64> {
        match self {
            ReferenceFrame::J2000Ecliptic { .. } => UnitQuaternion::identity(),
            ReferenceFrame::J2000Equator { .. } => x_rotation(j2000_obliquity()),
            ReferenceFrame::BodyFixed(f) => f.orientation(orrery, t),
            ReferenceFrame::BodyMeanEquator(f) => f.orientation(orrery, t),
            ReferenceFrame::TwoVector(f) => f.orientation(orrery, t),
        }
    }

    /// Angular velocity of the frame axes in universal coordinates, rad/day.
    pub fn angular_velocity(&self, orrery: &Orrery, t: f64) -> Vector3<f64> {
        match self {
            ReferenceFrame::J2000Ecliptic { .. } | ReferenceFrame::J2000Equator { .. } => {
                Vector3::zeros()
            }
            ReferenceFrame::BodyFixed(f) => f.angular_velocity(orrery, t),
            ReferenceFrame::BodyMeanEquator(f) => f.angular_velocity(orrery, t),
            ReferenceFrame::TwoVector(f) => f.angular_velocity(orrery, t),
        }
    }

    /// Numerical angular velocity, for frames that don't know their own.
    pub fn differentiate_orientation(&self, orrery: &Orrery, t: f64) -> Vector3<f64> {
        let dt = ANGULAR_VELOCITY_DIFF_DELTA;
        let q0 = self.orientation(orrery, t);
        let q1 = self.orientation(orrery, t + dt);
        angular_velocity_between(&q1, &q0, dt)
    }

    pub fn is_inertial(&self, orrery: &Orrery) -> bool {
        match self {
            ReferenceFrame::BodyFixed(_) => false,
            ReferenceFrame::BodyMeanEquator(f) => f.is_inertial(orrery),
            // Two-vector frames are all treated as inertial, even when their
            // vectors rotate
            ReferenceFrame::J2000Ecliptic { .. }
            | ReferenceFrame::J2000Equator { .. }
            | ReferenceFrame::TwoVector(_) => true,
        }
    }

    /// Length of the chain of frames this one depends on, counting from
    /// `depth`. Results above `max_depth` mean the chain is too deep or cyclic.
    pub fn nesting_depth(&self, orrery: &Orrery, depth: u32, max_depth: u32) -> u32 {
        match self {
            ReferenceFrame::J2000Ecliptic { center } | ReferenceFrame::J2000Equator { center } => {
                frame_depth(orrery, *center, depth, max_depth, FrameRole::Position)
            }
            ReferenceFrame::BodyFixed(f) => f.nesting_depth(orrery, depth, max_depth),
            ReferenceFrame::BodyMeanEquator(f) => f.nesting_depth(orrery, depth, max_depth),
            ReferenceFrame::TwoVector(f) => f.inner().nesting_depth(orrery, depth, max_depth),
        }
    }

    /// Every object this frame refers to, directly or through sub-frames.
    pub fn selections(&self) -> Vec<Selection> {
        let mut out = vec![];
        self.collect_selections(&mut out);
        out
    }

    fn collect_selections(&self, out: &mut Vec<Selection>) {
        match self {
            ReferenceFrame::J2000Ecliptic { center } | ReferenceFrame::J2000Equator { center } => {
                out.push(*center)
            }
            ReferenceFrame::BodyFixed(BodyFixedFrame { center, object })
            | ReferenceFrame::BodyMeanEquator(BodyMeanEquatorFrame { center, object, .. }) => {
                out.push(*center);
                out.push(*object);
            }
            ReferenceFrame::TwoVector(f) => f.inner().collect_selections(out),
        }
    }

    pub fn to_universal(&self, orrery: &Orrery, local: &Vector3<f64>, t: f64) -> Vector3<f64> {
        orrery.position(self.center(), t) + self.orientation(orrery, t).inverse_transform_vector(local)
    }

    pub fn from_universal(
        &self,
        orrery: &Orrery,
        universal: &Vector3<f64>,
        t: f64,
    ) -> Vector3<f64> {
        let offset = universal - orrery.position(self.center(), t);
        self.orientation(orrery, t).transform_vector(&offset)
    }

    /// Turns an orientation relative to this frame into a universal one.
    pub fn orientation_to_universal(
        &self,
        orrery: &Orrery,
        local: &UnitQuaternion<f64>,
        t: f64,
    ) -> UnitQuaternion<f64> {
        local * self.orientation(orrery, t)
    }

    pub fn orientation_from_universal(
        &self,
        orrery: &Orrery,
        universal: &UnitQuaternion<f64>,
        t: f64,
    ) -> UnitQuaternion<f64> {
        universal * self.orientation(orrery, t).inverse()
    }

    /// The full universal-to-local transform at `t`, including the motion of
    /// the center and, for non-inertial frames, the rotation of the axes.
    pub fn transform(&self, orrery: &Orrery, t: f64) -> FrameTransform<f64> {
        let center = self.center();
        let angular_velocity = if self.is_inertial(orrery) {
            Vector3::zeros()
        } else {
            self.angular_velocity(orrery, t)
        };

        FrameTransform::new(
            Point3::from(orrery.position(center, t)),
            orrery.velocity(center, t),
            self.orientation(orrery, t),
            angular_velocity,
        )
    }

    /// Position and velocity of `id` in this frame's coordinates.
    pub fn body_state(
        &self,
        orrery: &Orrery,
        id: BodyID,
        t: f64,
    ) -> (Point3<f64>, Vector3<f64>) {
        let transform = self.transform(orrery, t);
        let position = Point3::from(orrery.body_position(id, t));
        let velocity = orrery.body_velocity(id, t);
        (
            transform.to_local(&position),
            transform.velocity_to_local(&position, &velocity),
        )
    }
}
