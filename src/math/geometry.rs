use nalgebra::{Rotation3, UnitQuaternion, Vector3};

use std::f64::consts::PI;

pub fn reject(u: &Vector3<f64>, v: &Vector3<f64>) -> Vector3<f64> {
    // Computes the vector rejection of u from v. v must be non-zero.
    let u_proj_v = u.dot(v) * v / v.norm_squared();
    u - u_proj_v
}

/// Returns a rotation R that sends the z- and x- axes to point in the specified directions.
/// The orthogonality of new_z and new_x is not checked.
///
/// If either vector is shorter than `tolerance`, a semi-canonical replacement is made:
/// - small new_z: R(z) is the most-z-like vector perpendicular to new_x, or y if
///   new_x is itself along z
/// - small new_x: R(x) is the most-x-like vector perpendicular to new_z, or -y if
///   new_z is itself along x
/// - both small: identity
///
/// Circular orbits have no periapsis and equatorial ones no ascending node, so
/// state vectors routinely land in these cases.
pub fn always_find_rotation(
    new_z: &Vector3<f64>,
    new_x: &Vector3<f64>,
    tolerance: f64,
) -> Rotation3<f64> {
    let z_large_enough = new_z.norm() >= tolerance;
    let x_large_enough = new_x.norm() >= tolerance;

    let (new_z, new_x) = match (z_large_enough, x_large_enough) {
        (true, true) => (*new_z, *new_x),
        (false, true) => {
            let mut best_new_z = reject(&Vector3::z(), new_x);
            if best_new_z.norm() < tolerance {
                best_new_z = Vector3::y();
            };
            (best_new_z, *new_x)
        }
        (true, false) => {
            let mut best_new_x = reject(&Vector3::x(), new_z);
            if best_new_x.norm() < tolerance {
                best_new_x = -Vector3::y();
            };
            (*new_z, best_new_x)
        }
        (false, false) => return Rotation3::identity(),
    };

    // face_towards takes new-z and new-y, so follow it with a quarter turn about z
    let mut rotation = Rotation3::face_towards(&new_z, &new_x);
    rotation *= Rotation3::from_axis_angle(&Vector3::z_axis(), PI / 2.0);
    rotation.renormalize();
    rotation
}

// -- Axis rotations --

pub fn x_rotation(angle: f64) -> UnitQuaternion<f64> {
    UnitQuaternion::from_axis_angle(&Vector3::x_axis(), angle)
}

pub fn y_rotation(angle: f64) -> UnitQuaternion<f64> {
    UnitQuaternion::from_axis_angle(&Vector3::y_axis(), angle)
}

pub fn z_rotation(angle: f64) -> UnitQuaternion<f64> {
    UnitQuaternion::from_axis_angle(&Vector3::z_axis(), angle)
}

pub fn x_rot_90() -> UnitQuaternion<f64> {
    x_rotation(PI / 2.0)
}

pub fn x_rot_180() -> UnitQuaternion<f64> {
    x_rotation(PI)
}

pub fn y_rot_180() -> UnitQuaternion<f64> {
    y_rotation(PI)
}

// -- Axis conventions --
//
// Internally the ecliptic is the x-z plane and +y points to ecliptic north.
// Orbital elements, sample files and external providers all use z-up.

/// Maps a z-up vector into internal coordinates.
pub fn to_internal(v: &Vector3<f64>) -> Vector3<f64> {
    Vector3::new(v.x, v.z, -v.y)
}

/// Maps an internal vector back to z-up coordinates.
pub fn from_internal(v: &Vector3<f64>) -> Vector3<f64> {
    Vector3::new(v.x, -v.z, v.y)
}

/// Re-expresses a rotation given about z-up axes in internal axes.
pub fn rotation_to_internal(q: &UnitQuaternion<f64>) -> UnitQuaternion<f64> {
    x_rot_90() * q * x_rot_90().conjugate()
}

/// Rate of rotation that takes `q0` to `q1` over `dt`, as an axis scaled by angular
/// speed. The axis is in the coordinates where `dq = q0⁻¹ q1` acts.
pub fn angular_velocity_between(
    q0: &UnitQuaternion<f64>,
    q1: &UnitQuaternion<f64>,
    dt: f64,
) -> Vector3<f64> {
    let dq = q0.conjugate() * q1;
    let w = dq.quaternion().w;
    if w.abs() > 0.99999999 {
        return Vector3::zeros();
    }

    let axis = dq.quaternion().imag();
    match axis.try_normalize(0.0) {
        Some(axis) => axis * (2.0 * w.acos() / dt),
        None => Vector3::zeros(),
    }
}
