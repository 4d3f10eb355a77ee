use std::f64::consts::PI;

use nalgebra::{UnitQuaternion, Vector3};

use super::OrbitProvider;
use crate::consts::KM_PER_AU;
use crate::math::anomaly::true_to_mean;
use crate::math::geometry::{
    always_find_rotation, from_internal, to_internal, x_rotation, z_rotation,
};
use crate::math::intervals::Interval;
use crate::math::kepler::eccentric_anomaly;

// Hyperbolic trajectories are followed out to at least this distance
const HYPERBOLIC_MIN_BOUNDING_RADIUS: f64 = 1000.0 * KM_PER_AU;

/// Classical elements of a conic orbit. Angles are in radians, distances in km
/// and times in days.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OrbitalElements {
    pub pericenter_distance: f64,
    pub eccentricity: f64,
    pub inclination: f64,
    pub ascending_node: f64,
    pub arg_of_pericenter: f64,
    pub mean_anomaly: f64,
    /// For open orbits this only sets the mean motion.
    pub period: f64,
    /// Period of the ascending node's precession; zero for none.
    pub nodal_period: f64,
    /// Period of the pericenter's precession; zero for none.
    pub apsidal_period: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Precession {
    inclination: f64,
    ascending_node: f64,
    arg_of_pericenter: f64,
    nodal_rate: f64,
    apsidal_rate: f64,
}

/// A Keplerian orbit of any eccentricity.
///
/// Closed orbits may have their node and pericenter precess uniformly. Open
/// orbits are only meaningful while inside their bounding radius, which fixes
/// their valid range.
#[derive(Debug, Clone, PartialEq)]
pub struct EllipticalOrbit {
    eccentricity: f64,
    pericenter_distance: f64,
    /// Negative for open orbits
    semimajor_axis: f64,
    semiminor_axis: f64,
    mean_anomaly_at_epoch: f64,
    mean_motion: f64,
    period: f64,
    epoch: f64,
    /// Takes the z-up orbital plane, with pericenter along x, to its place in
    /// the frame.
    rotation: UnitQuaternion<f64>,
    precession: Option<Precession>,
    valid_range: Option<Interval>,
}

fn plane_rotation(
    inclination: f64,
    ascending_node: f64,
    arg_of_pericenter: f64,
) -> UnitQuaternion<f64> {
    z_rotation(ascending_node) * x_rotation(inclination) * z_rotation(arg_of_pericenter)
}

fn rate_from_period(period: f64) -> f64 {
    if period == 0.0 {
        0.0
    } else {
        2.0 * PI / period
    }
}

impl EllipticalOrbit {
    pub fn new(elements: &OrbitalElements, epoch: f64) -> Self {
        let rotation = plane_rotation(
            elements.inclination,
            elements.ascending_node,
            elements.arg_of_pericenter,
        );

        let mut orbit = Self::from_rotation(
            elements.pericenter_distance,
            elements.eccentricity,
            rotation,
            elements.mean_anomaly,
            elements.period,
            epoch,
        );

        let precesses = elements.nodal_period != 0.0 || elements.apsidal_period != 0.0;
        if precesses && orbit.eccentricity < 1.0 {
            orbit.precession = Some(Precession {
                inclination: elements.inclination,
                ascending_node: elements.ascending_node,
                arg_of_pericenter: elements.arg_of_pericenter,
                nodal_rate: rate_from_period(elements.nodal_period),
                apsidal_rate: rate_from_period(elements.apsidal_period),
            });
        }

        orbit
    }

    fn from_rotation(
        pericenter_distance: f64,
        eccentricity: f64,
        rotation: UnitQuaternion<f64>,
        mean_anomaly: f64,
        period: f64,
        epoch: f64,
    ) -> Self {
        let e = eccentricity;
        let a = pericenter_distance / (1.0 - e);
        let b = if e < 1.0 {
            a * (1.0 - e * e).sqrt()
        } else {
            a * (e * e - 1.0).sqrt()
        };

        let mut orbit = Self {
            eccentricity: e,
            pericenter_distance,
            semimajor_axis: a,
            semiminor_axis: b,
            mean_anomaly_at_epoch: mean_anomaly,
            mean_motion: 2.0 * PI / period,
            period,
            epoch,
            rotation,
            precession: None,
            valid_range: None,
        };

        if e >= 1.0 {
            orbit.valid_range = Some(orbit.open_orbit_range());
        }
        orbit
    }

    /// Fits an orbit to a position and velocity (internal axes, km and km/day)
    /// about a primary with gravitational parameter `gm` (km^3/day^2).
    ///
    /// Circular and equatorial orbits have no natural pericenter or node; a
    /// canonical choice is made for them, which only shifts where the anomaly
    /// is measured from.
    pub fn from_state_vector(
        position: &Vector3<f64>,
        velocity: &Vector3<f64>,
        gm: f64,
        epoch: f64,
    ) -> Self {
        let r = from_internal(position);
        let v = from_internal(velocity);
        let r_norm = r.norm();

        let ang_mom = r.cross(&v);
        let energy = v.norm_squared() / 2.0 - gm / r_norm;

        // LRL vector = v x h / mu - r/|r|
        let lrl = v.cross(&ang_mom) / gm - r / r_norm;
        let eccentricity = lrl.norm();

        let rotation = always_find_rotation(&ang_mom, &lrl, 1e-20);
        let in_plane = rotation.inverse_transform_vector(&r);
        let true_anomaly = in_plane.y.atan2(in_plane.x);

        let slr = ang_mom.norm_squared() / gm;
        let alpha = -2.0 * energy / gm;
        let mean_motion = (gm * alpha.abs().powi(3)).sqrt();

        Self::from_rotation(
            slr / (1.0 + eccentricity),
            eccentricity,
            UnitQuaternion::from_rotation_matrix(&rotation),
            true_to_mean(true_anomaly, eccentricity),
            2.0 * PI / mean_motion,
            epoch,
        )
    }

    pub fn eccentricity(&self) -> f64 {
        self.eccentricity
    }

    pub fn pericenter_distance(&self) -> f64 {
        self.pericenter_distance
    }

    pub fn semimajor_axis(&self) -> f64 {
        self.semimajor_axis
    }

    pub fn epoch(&self) -> f64 {
        self.epoch
    }

    // The span over which an open orbit stays within its bounding radius
    fn open_orbit_range(&self) -> Interval {
        let e = self.eccentricity;
        let radius = self.bounding_radius();
        let cos_true_anomaly = (self.pericenter_distance * (1.0 + e) / radius - 1.0) / e;
        let ecc_anomaly = ((e + cos_true_anomaly) / (1.0 + e * cos_true_anomaly)).acosh();
        let mean_anomaly = e * ecc_anomaly.sinh() - ecc_anomaly;
        let dt = (mean_anomaly / self.mean_motion).abs();
        Interval::around(self.epoch, dt)
    }

    // Mean anomaly and orbital plane at time t
    fn state_at(&self, t: f64) -> (f64, UnitQuaternion<f64>) {
        let dt = t - self.epoch;
        match &self.precession {
            None => (self.mean_anomaly_at_epoch + dt * self.mean_motion, self.rotation),
            Some(p) => {
                let mean_anomaly = self.mean_anomaly_at_epoch
                    + dt * (self.mean_motion - p.apsidal_rate - p.nodal_rate);
                let node = p.ascending_node + dt * p.nodal_rate;
                let argp = p.arg_of_pericenter + dt * (p.apsidal_rate - p.nodal_rate);
                (mean_anomaly, plane_rotation(p.inclination, node, argp))
            }
        }
    }

    fn offset_at(&self, ecc_anomaly: f64) -> Vector3<f64> {
        let (a, b, e) = (self.semimajor_axis, self.semiminor_axis, self.eccentricity);
        if e < 1.0 {
            Vector3::new(a * (ecc_anomaly.cos() - e), b * ecc_anomaly.sin(), 0.0)
        } else if e > 1.0 {
            Vector3::new(-a * (e - ecc_anomaly.cosh()), -b * ecc_anomaly.sinh(), 0.0)
        } else {
            // Parabolic orbits aren't handled
            Vector3::zeros()
        }
    }
}

impl OrbitProvider for EllipticalOrbit {
    fn compute_position(&self, t: f64) -> Vector3<f64> {
        let (mean_anomaly, rotation) = self.state_at(t);
        let ecc_anomaly = eccentric_anomaly(mean_anomaly, self.eccentricity);
        to_internal(&(rotation * self.offset_at(ecc_anomaly)))
    }

    fn compute_velocity(&self, t: f64) -> Option<Vector3<f64>> {
        if self.eccentricity >= 1.0 {
            return None;
        }

        let (mean_anomaly, rotation) = self.state_at(t);
        let ecc_anomaly = eccentric_anomaly(mean_anomaly, self.eccentricity);

        let (sin_e, cos_e) = ecc_anomaly.sin_cos();
        let edot = self.mean_motion / (1.0 - self.eccentricity * cos_e);
        let planar = Vector3::new(
            -self.semimajor_axis * sin_e * edot,
            self.semiminor_axis * cos_e * edot,
            0.0,
        );
        Some(to_internal(&(rotation * planar)))
    }

    fn period(&self) -> f64 {
        match self.valid_range {
            Some(range) => range.width(),
            None => self.period,
        }
    }

    fn bounding_radius(&self) -> f64 {
        if self.eccentricity < 1.0 {
            self.semimajor_axis * (1.0 + self.eccentricity)
        } else {
            (2.0 * self.pericenter_distance).max(HYPERBOLIC_MIN_BOUNDING_RADIUS)
        }
    }

    fn is_periodic(&self) -> bool {
        self.eccentricity < 1.0
    }

    fn valid_range(&self) -> Option<Interval> {
        self.valid_range
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use itertools::iproduct;

    use crate::consts::gm_from_mass;
    use crate::consts::testing::{EARTH_ORBIT_RADIUS, EARTH_PERIOD, SOLAR_MASS};

    fn numeric_velocity(orbit: &EllipticalOrbit, t: f64) -> Vector3<f64> {
        let h = 1e-4;
        (orbit.compute_position(t + h) - orbit.compute_position(t - h)) / (2.0 * h)
    }

    #[test]
    fn test_circular_orbit_keeps_radius() {
        let orbit = EllipticalOrbit::new(
            &OrbitalElements {
                pericenter_distance: EARTH_ORBIT_RADIUS,
                inclination: 0.3,
                ascending_node: 1.1,
                period: EARTH_PERIOD,
                ..OrbitalElements::default()
            },
            0.0,
        );

        for i in 0..50 {
            let t = EARTH_PERIOD * (i as f64) / 37.0;
            let r = orbit.compute_position(t).norm();
            assert_relative_eq!(r, EARTH_ORBIT_RADIUS, max_relative = 1e-12);
        }
        assert_relative_eq!(orbit.bounding_radius(), EARTH_ORBIT_RADIUS);
    }

    #[test]
    fn test_apsides_and_axes() {
        // Pericenter along +x (z-up), which is also +x internally
        let orbit = EllipticalOrbit::new(
            &OrbitalElements {
                pericenter_distance: 4.0,
                eccentricity: 0.6,
                period: 10.0,
                ..OrbitalElements::default()
            },
            100.0,
        );
        assert_relative_eq!(orbit.semimajor_axis(), 10.0);
        assert_relative_eq!(orbit.compute_position(100.0), Vector3::new(4.0, 0.0, 0.0));
        assert_relative_eq!(
            orbit.compute_position(105.0),
            Vector3::new(-16.0, 0.0, 0.0),
            epsilon = 1e-9
        );
        assert_relative_eq!(orbit.bounding_radius(), 16.0);

        // Counterclockwise about z-up means towards -z internally at first
        assert!(orbit.compute_position(100.5).z < 0.0);
    }

    #[test]
    fn test_closed_form_velocity() {
        for (&e, &t) in iproduct!(&[0.0, 0.3, 0.95], &[0.0, 1.7, 4.2, 9.9]) {
            let orbit = EllipticalOrbit::new(
                &OrbitalElements {
                    pericenter_distance: 1000.0,
                    eccentricity: e,
                    inclination: 0.4,
                    ascending_node: 2.0,
                    arg_of_pericenter: 0.7,
                    mean_anomaly: 0.2,
                    period: 10.0,
                    ..OrbitalElements::default()
                },
                0.0,
            );
            let v = orbit.compute_velocity(t).unwrap();
            assert_relative_eq!(v, numeric_velocity(&orbit, t), max_relative = 1e-6);
        }
    }

    #[test]
    fn test_from_state_vector() {
        let gm = gm_from_mass(SOLAR_MASS);
        let cases = [
            // Circular, equatorial
            (Vector3::new(1.5e8, 0.0, 0.0), Vector3::new(0.0, 0.0, -2.5e6)),
            // Inclined, eccentric
            (Vector3::new(1.0e8, 2.0e7, -3.0e7), Vector3::new(1.0e5, 3.0e5, -2.6e6)),
            // Hyperbolic
            (Vector3::new(1.0e8, 0.0, 1.0e7), Vector3::new(1.0e6, 2.0e6, -5.0e6)),
        ];

        for (p, v) in cases.iter() {
            let orbit = EllipticalOrbit::from_state_vector(p, v, gm, 2451545.0);
            assert_relative_eq!(
                orbit.compute_position(2451545.0),
                *p,
                epsilon = 1e-6,
                max_relative = 1e-8
            );

            let v_fit = orbit
                .compute_velocity(2451545.0)
                .unwrap_or_else(|| numeric_velocity(&orbit, 2451545.0));
            assert_relative_eq!(v_fit, *v, epsilon = 1e-3, max_relative = 1e-5);
        }
    }

    #[test]
    fn test_hyperbolic_range() {
        let orbit = EllipticalOrbit::new(
            &OrbitalElements {
                pericenter_distance: 1e8,
                eccentricity: 1.2,
                period: 2000.0,
                ..OrbitalElements::default()
            },
            50.0,
        );
        assert!(!orbit.is_periodic());
        assert_eq!(orbit.compute_velocity(50.0), None);

        let range = orbit.valid_range().unwrap();
        assert_relative_eq!(range.midpoint(), 50.0, epsilon = 1e-6);
        assert_relative_eq!(orbit.period(), range.width());

        let radius = orbit.bounding_radius();
        assert_relative_eq!(radius, HYPERBOLIC_MIN_BOUNDING_RADIUS);
        assert_relative_eq!(orbit.compute_position(range.lo()).norm(), radius, max_relative = 1e-6);
        assert_relative_eq!(orbit.compute_position(range.hi()).norm(), radius, max_relative = 1e-6);
        assert_relative_eq!(orbit.compute_position(50.0).norm(), 1e8, max_relative = 1e-12);
    }

    #[test]
    fn test_parabolic_is_degenerate() {
        let orbit = EllipticalOrbit::new(
            &OrbitalElements {
                pericenter_distance: 1e8,
                eccentricity: 1.0,
                period: 100.0,
                ..OrbitalElements::default()
            },
            0.0,
        );
        assert_eq!(orbit.compute_position(3.0), Vector3::zeros());
    }

    #[test]
    fn test_nodal_precession() {
        let node0 = 0.5;
        let orbit = EllipticalOrbit::new(
            &OrbitalElements {
                pericenter_distance: 1e4,
                inclination: 0.3,
                ascending_node: node0,
                period: 1.0,
                nodal_period: 100.0,
                ..OrbitalElements::default()
            },
            0.0,
        );

        for &t in &[0.0, 10.0, 25.0, 40.0] {
            let p = from_internal(&orbit.compute_position(t));
            let v = from_internal(&orbit.compute_velocity(t).unwrap());
            let normal = p.cross(&v);
            let node = Vector3::z().cross(&normal);
            let node_angle = node.y.atan2(node.x).rem_euclid(2.0 * PI);

            let expected = (node0 + 2.0 * PI * t / 100.0).rem_euclid(2.0 * PI);
            assert_relative_eq!(node_angle, expected, epsilon = 1e-9);
            assert_relative_eq!(normal.angle(&Vector3::z()), 0.3, epsilon = 1e-9);
        }
    }
}
