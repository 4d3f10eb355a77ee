use nalgebra::{Matrix3, Rotation3, UnitQuaternion, Vector3};

use super::caching::FrameOrientation;
use super::{frame_depth, FrameRole, SharedFrame};
use crate::error::{Error, Result};
use crate::orrery::{Orrery, Selection};

// Below this the two directions are treated as parallel
const COLLINEAR_TOLERANCE: f64 = 1.0e-6;

/// A frame axis, named in the usual z-up convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    PosX,
    PosY,
    PosZ,
    NegX,
    NegY,
    NegZ,
}

impl Axis {
    /// One-based index of the matching internal axis, negative for negative
    /// directions. External y is internal -z and external z is internal y.
    fn internal_index(self) -> i32 {
        match self {
            Axis::PosX => 1,
            Axis::PosY => -3,
            Axis::PosZ => 2,
            Axis::NegX => -1,
            Axis::NegY => 3,
            Axis::NegZ => -2,
        }
    }
}

/// A direction that varies with time, used to pin down the axes of a
/// [TwoVectorFrame].
#[derive(Clone)]
pub enum FrameVector {
    /// From `observer` towards `target`.
    RelativePosition { observer: Selection, target: Selection },
    /// Velocity of `target` relative to `observer`.
    RelativeVelocity { observer: Selection, target: Selection },
    /// A fixed direction in `frame`, or in universal coordinates if there is no
    /// frame.
    ConstantVector {
        vector: Vector3<f64>,
        frame: Option<SharedFrame>,
    },
}

impl FrameVector {
    pub fn direction(&self, orrery: &Orrery, t: f64) -> Vector3<f64> {
        match self {
            FrameVector::RelativePosition { observer, target } => {
                orrery.position(*target, t) - orrery.position(*observer, t)
            }
            FrameVector::RelativeVelocity { observer, target } => {
                orrery.velocity(*target, t) - orrery.velocity(*observer, t)
            }
            FrameVector::ConstantVector { vector, frame } => match frame {
                Some(frame) => frame
                    .orientation(orrery, t)
                    .inverse_transform_vector(vector),
                None => *vector,
            },
        }
    }

    pub fn nesting_depth(&self, orrery: &Orrery, depth: u32, max_depth: u32) -> u32 {
        match self {
            FrameVector::RelativePosition { observer, target }
            | FrameVector::RelativeVelocity { observer, target } => {
                let n = frame_depth(orrery, *observer, depth, max_depth, FrameRole::Position);
                if n > max_depth {
                    return n;
                }
                let m = frame_depth(orrery, *target, depth, max_depth, FrameRole::Position);
                n.max(m)
            }
            FrameVector::ConstantVector { frame, .. } => match frame {
                _ if depth > max_depth => depth,
                Some(frame) => frame.nesting_depth(orrery, depth + 1, max_depth),
                None => depth,
            },
        }
    }

    pub(super) fn collect_selections(&self, out: &mut Vec<Selection>) {
        match self {
            FrameVector::RelativePosition { observer, target }
            | FrameVector::RelativeVelocity { observer, target } => {
                out.push(*observer);
                out.push(*target);
            }
            FrameVector::ConstantVector { frame, .. } => {
                if let Some(frame) = frame {
                    frame.collect_selections(out);
                }
            }
        }
    }

    fn with_default_observer(self, center: Selection) -> Self {
        match self {
            FrameVector::RelativePosition {
                observer: Selection::None,
                target,
            } => FrameVector::RelativePosition {
                observer: center,
                target,
            },
            FrameVector::RelativeVelocity {
                observer: Selection::None,
                target,
            } => FrameVector::RelativeVelocity {
                observer: center,
                target,
            },
            other => other,
        }
    }
}

/// A frame whose axes follow two directions: the primary axis points exactly
/// along the primary vector, and the secondary axis lies in the plane of the
/// two vectors.
pub struct TwoVectorFrame {
    center: Selection,
    primary: FrameVector,
    primary_axis: i32,
    secondary: FrameVector,
    secondary_axis: i32,
    tertiary_axis: i32,
}

impl TwoVectorFrame {
    /// Relative vectors with no observer are measured from `center`.
    pub fn new(
        center: Selection,
        primary: FrameVector,
        primary_axis: Axis,
        secondary: FrameVector,
        secondary_axis: Axis,
    ) -> Result<Self> {
        let primary_axis = primary_axis.internal_index();
        let secondary_axis = secondary_axis.internal_index();
        if primary_axis.abs() == secondary_axis.abs() {
            return Err(Error::CollinearAxes);
        }

        for v in [&primary, &secondary].iter() {
            if let FrameVector::ConstantVector { vector, .. } = v {
                if vector.norm() == 0.0 {
                    return Err(Error::ZeroVector);
                }
            }
        }

        let tertiary_axis = 6 - primary_axis.abs() - secondary_axis.abs();

        Ok(Self {
            center,
            primary: primary.with_default_observer(center),
            primary_axis,
            secondary: secondary.with_default_observer(center),
            secondary_axis,
            tertiary_axis,
        })
    }

    pub fn center(&self) -> Selection {
        self.center
    }

    pub fn primary(&self) -> &FrameVector {
        &self.primary
    }

    pub fn secondary(&self) -> &FrameVector {
        &self.secondary
    }

    pub fn nesting_depth(&self, orrery: &Orrery, depth: u32, max_depth: u32) -> u32 {
        let n = frame_depth(orrery, self.center, depth, max_depth, FrameRole::Position);
        if n > max_depth {
            return n;
        }
        let n = n.max(self.primary.nesting_depth(orrery, depth, max_depth));
        if n > max_depth {
            return n;
        }
        n.max(self.secondary.nesting_depth(orrery, depth, max_depth))
    }

    pub(super) fn collect_selections(&self, out: &mut Vec<Selection>) {
        out.push(self.center);
        self.primary.collect_selections(out);
        self.secondary.collect_selections(out);
    }
}

impl FrameOrientation for TwoVectorFrame {
    fn compute_orientation(&self, orrery: &Orrery, t: f64) -> UnitQuaternion<f64> {
        let mut v0 = self.primary.direction(orrery, t).normalize();
        let mut v1 = self.secondary.direction(orrery, t).normalize();
        if self.primary_axis < 0 {
            v0 = -v0;
        }
        if self.secondary_axis < 0 {
            v1 = -v1;
        }

        // Degenerate at this instant; a zero direction also ends up here
        let v2 = v0.cross(&v1);
        let length = v2.norm();
        if !(length >= COLLINEAR_TOLERANCE) {
            return UnitQuaternion::identity();
        }
        let v2 = v2 / length;

        let primary_row = (self.primary_axis.abs() - 1) as usize;
        let secondary_row = (self.secondary_axis.abs() - 1) as usize;
        let tertiary_row = (self.tertiary_axis - 1) as usize;
        let right_handed = self.primary_axis.abs() % 3 + 1 == self.secondary_axis.abs();

        let mut m = Matrix3::zeros();
        m.set_row(primary_row, &v0.transpose());
        if right_handed {
            m.set_row(secondary_row, &v2.cross(&v0).transpose());
            m.set_row(tertiary_row, &v2.transpose());
        } else {
            m.set_row(secondary_row, &v0.cross(&-v2).transpose());
            m.set_row(tertiary_row, &(-v2).transpose());
        }

        UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(m))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::math::geometry::to_internal;

    fn constant(x: f64, y: f64, z: f64) -> FrameVector {
        FrameVector::ConstantVector {
            vector: to_internal(&Vector3::new(x, y, z)),
            frame: None,
        }
    }

    #[test]
    fn test_aligned_axes_give_identity() {
        let orrery = Orrery::new();
        let frame = TwoVectorFrame::new(
            Selection::None,
            constant(1.0, 0.0, 0.0),
            Axis::PosX,
            constant(0.0, 1.0, 0.0),
            Axis::PosY,
        )
        .unwrap();
        assert_relative_eq!(
            frame.compute_orientation(&orrery, 0.0),
            UnitQuaternion::identity(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_primary_axis_follows_primary_vector() {
        let orrery = Orrery::new();
        let primary = Vector3::new(1.0, 2.0, -0.5);
        let axis_pairs = [
            (Axis::PosX, Axis::PosY),
            (Axis::PosX, Axis::NegZ),
            (Axis::NegY, Axis::PosX),
            (Axis::PosZ, Axis::PosY),
            (Axis::NegZ, Axis::NegX),
        ];

        for &(primary_axis, secondary_axis) in axis_pairs.iter() {
            let frame = TwoVectorFrame::new(
                Selection::None,
                FrameVector::ConstantVector {
                    vector: primary,
                    frame: None,
                },
                primary_axis,
                constant(0.0, 0.0, 1.0),
                secondary_axis,
            )
            .unwrap();
            let q = frame.compute_orientation(&orrery, 0.0);

            // The primary direction lands on the primary axis in local
            // coordinates, and the frame is a proper rotation
            let local = q.transform_vector(&primary.normalize());
            let index = primary_axis.internal_index();
            let mut expected = Vector3::zeros();
            expected[(index.abs() - 1) as usize] = index.signum() as f64;
            assert_relative_eq!(local, expected, epsilon = 1e-12);
            assert_relative_eq!(q.to_rotation_matrix().matrix().determinant(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_construction_errors() {
        let same_axis = TwoVectorFrame::new(
            Selection::None,
            constant(1.0, 0.0, 0.0),
            Axis::PosX,
            constant(0.0, 1.0, 0.0),
            Axis::NegX,
        );
        assert!(matches!(same_axis, Err(Error::CollinearAxes)));

        let zero = TwoVectorFrame::new(
            Selection::None,
            constant(0.0, 0.0, 0.0),
            Axis::PosX,
            constant(0.0, 1.0, 0.0),
            Axis::PosY,
        );
        assert!(matches!(zero, Err(Error::ZeroVector)));
    }

    #[test]
    fn test_collinear_vectors_give_identity() {
        let orrery = Orrery::new();
        let frame = TwoVectorFrame::new(
            Selection::None,
            constant(1.0, 1.0, 0.0),
            Axis::PosX,
            constant(-2.0, -2.0, 0.0),
            Axis::PosY,
        )
        .unwrap();
        assert_eq!(
            frame.compute_orientation(&orrery, 0.0),
            UnitQuaternion::identity()
        );
    }
}
