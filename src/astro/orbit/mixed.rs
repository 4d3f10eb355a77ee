use std::rc::Rc;

use nalgebra::Vector3;

use super::{EllipticalOrbit, Orbit, SharedOrbit, VELOCITY_DIFF_DELTA};
use crate::consts::gm_from_mass;
use crate::error::{Error, Result};

/// An orbit that is only trusted between `begin` and `end`, and is extended on
/// either side by Keplerian orbits fitted to its state at those times.
pub struct MixedOrbit {
    primary: SharedOrbit,
    begin: f64,
    end: f64,
    before: SharedOrbit,
    after: SharedOrbit,
    bounding_radius: f64,
}

impl MixedOrbit {
    /// `mass` is the mass of the central body in kg.
    pub fn new(primary: SharedOrbit, begin: f64, end: f64, mass: f64) -> Result<Self> {
        if !(end > begin) {
            return Err(Error::InvalidPhaseInterval { start: begin, end });
        }

        let gm = gm_from_mass(mass);
        let fit = |t: f64| {
            let p0 = primary.position(t);
            let p1 = primary.position(t + VELOCITY_DIFF_DELTA);
            let v = (p1 - p0) / VELOCITY_DIFF_DELTA;
            Rc::new(Orbit::elliptical(EllipticalOrbit::from_state_vector(
                &p0, &v, gm, t,
            )))
        };
        let before = fit(begin);
        let after = fit(end);

        let bounding_radius = before
            .bounding_radius()
            .max(primary.bounding_radius())
            .max(after.bounding_radius());

        Ok(Self {
            primary,
            begin,
            end,
            before,
            after,
            bounding_radius,
        })
    }

    /// The orbit in effect at `t`.
    pub fn orbit_at(&self, t: f64) -> &Orbit {
        if t < self.begin {
            self.before.as_ref()
        } else if t < self.end {
            self.primary.as_ref()
        } else {
            self.after.as_ref()
        }
    }

    pub fn position(&self, t: f64) -> Vector3<f64> {
        self.orbit_at(t).position(t)
    }

    pub fn velocity(&self, t: f64) -> Vector3<f64> {
        self.orbit_at(t).velocity(t)
    }

    pub fn period(&self) -> f64 {
        self.primary.period()
    }

    pub fn bounding_radius(&self) -> f64 {
        self.bounding_radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::astro::orbit::OrbitalElements;
    use crate::consts::testing::{EARTH_ORBIT_RADIUS, EARTH_PERIOD, SOLAR_MASS};

    fn kepler_primary() -> SharedOrbit {
        Rc::new(Orbit::elliptical(EllipticalOrbit::new(
            &OrbitalElements {
                pericenter_distance: EARTH_ORBIT_RADIUS,
                eccentricity: 0.0167,
                inclination: 0.01,
                period: EARTH_PERIOD,
                ..OrbitalElements::default()
            },
            0.0,
        )))
    }

    #[test]
    fn test_rejects_empty_interval() {
        assert!(MixedOrbit::new(kepler_primary(), 10.0, 10.0, SOLAR_MASS).is_err());
        assert!(MixedOrbit::new(kepler_primary(), 10.0, 5.0, SOLAR_MASS).is_err());
    }

    #[test]
    fn test_continuous_at_boundaries() {
        let primary = kepler_primary();
        let orbit = MixedOrbit::new(primary.clone(), 0.0, 100.0, SOLAR_MASS).unwrap();

        // Position is continuous across both joins, to within the error of
        // the one-minute velocity estimate
        for &t in &[0.0, 100.0] {
            let eps = 1e-9;
            let before = orbit.position(t - eps);
            let after = orbit.position(t);
            assert!((before - after).norm() < 10.0, "jump at {}", t);
        }

        assert_eq!(orbit.position(50.0), primary.position(50.0));
        assert_relative_eq!(orbit.period(), EARTH_PERIOD);
        assert!(orbit.bounding_radius() >= primary.bounding_radius());
    }
}
