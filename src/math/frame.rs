use nalgebra::{Point3, UnitQuaternion, Vector3};
use simba::scalar::RealField;

/// Where a reference frame is, and how it moves, at one instant.
///
/// Coordinates follow the frame convention `local = q * (base - center)`, where
/// `base` is whatever coordinates the transform was built against, usually
/// universal ones. The center's velocity and the spin of the axes are kept so
/// velocities convert with the `ω × r` term.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameTransform<T: RealField> {
    center: Point3<T>,
    center_velocity: Vector3<T>,
    /// `q`, taking base offsets to local coordinates
    orientation: UnitQuaternion<T>,
    /// Spin of the local axes, in base coordinates
    angular_velocity: Vector3<T>,
}

impl<T: RealField> FrameTransform<T> {
    pub fn new(
        center: Point3<T>,
        center_velocity: Vector3<T>,
        orientation: UnitQuaternion<T>,
        angular_velocity: Vector3<T>,
    ) -> Self {
        FrameTransform {
            center,
            center_velocity,
            orientation,
            angular_velocity,
        }
    }

    /// The base coordinates themselves.
    pub fn identity() -> Self {
        FrameTransform::new(
            Point3::origin(),
            Vector3::zeros(),
            UnitQuaternion::identity(),
            Vector3::zeros(),
        )
    }

    pub fn center(&self) -> &Point3<T> {
        &self.center
    }

    pub fn center_velocity(&self) -> &Vector3<T> {
        &self.center_velocity
    }

    pub fn orientation(&self) -> &UnitQuaternion<T> {
        &self.orientation
    }

    pub fn angular_velocity(&self) -> &Vector3<T> {
        &self.angular_velocity
    }

    pub fn to_local(&self, base: &Point3<T>) -> Point3<T> {
        Point3::from(self.orientation.transform_vector(&(base - &self.center)))
    }

    pub fn to_base(&self, local: &Point3<T>) -> Point3<T> {
        &self.center + self.orientation.inverse_transform_vector(&local.coords)
    }

    /// Velocity of something at `position`, both in base coordinates, as seen
    /// by an observer riding along with the local axes.
    pub fn velocity_to_local(&self, position: &Point3<T>, velocity: &Vector3<T>) -> Vector3<T> {
        let offset = position - &self.center;
        let relative = velocity - &self.center_velocity - self.angular_velocity.cross(&offset);
        self.orientation.transform_vector(&relative)
    }

    /// Inverse of [`velocity_to_local`](Self::velocity_to_local); both
    /// arguments are in local coordinates.
    pub fn velocity_to_base(&self, position: &Point3<T>, velocity: &Vector3<T>) -> Vector3<T> {
        let offset = self.orientation.inverse_transform_vector(&position.coords);
        let carried = self.orientation.inverse_transform_vector(velocity);
        carried + &self.center_velocity + self.angular_velocity.cross(&offset)
    }

    /// The base coordinates as seen from this frame.
    pub fn inverse(&self) -> Self {
        let origin = Point3::origin();
        FrameTransform {
            center: self.to_local(&origin),
            center_velocity: self.velocity_to_local(&origin, &Vector3::zeros()),
            orientation: self.orientation.inverse(),
            angular_velocity: -self.orientation.transform_vector(&self.angular_velocity),
        }
    }

    /// Re-expresses this frame against `base`, when both were built against
    /// the same coordinates. The result takes `base`-local coordinates to
    /// `self`-local ones.
    pub fn relative_to(&self, base: &Self) -> Self {
        FrameTransform {
            center: base.to_local(&self.center),
            center_velocity: base.velocity_to_local(&self.center, &self.center_velocity),
            orientation: &self.orientation * base.orientation.inverse(),
            angular_velocity: base
                .orientation
                .transform_vector(&(&self.angular_velocity - &base.angular_velocity)),
        }
    }
}
