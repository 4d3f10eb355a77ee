// Julian date of the J2000.0 epoch, TDB
pub const J2000: f64 = 2451545.0;

pub const DAYS_PER_CENTURY: f64 = 36525.0;
pub const SECONDS_PER_DAY: f64 = 86400.0;

// Obliquity of the ecliptic at J2000, in degrees
pub const J2000_OBLIQUITY_DEG: f64 = 23.4392911;

pub const KM_PER_AU: f64 = 149_597_870.7;

// Newton's gravitational constant, in N m^2 / kg^2
pub const NEWTON_G: f64 = 6.672e-11;

/// Converts a mass in kilograms to a gravitational parameter in km^3/day^2.
pub fn gm_from_mass(mass_kg: f64) -> f64 {
    NEWTON_G * mass_kg * SECONDS_PER_DAY * SECONDS_PER_DAY * 1e-9
}

pub fn j2000_obliquity() -> f64 {
    J2000_OBLIQUITY_DEG.to_radians()
}

#[cfg(test)]
pub mod testing {
    // Roughly the Sun's mass and the Earth's orbit; handy for tests.
    pub const SOLAR_MASS: f64 = 1.989e30;
    pub const EARTH_ORBIT_RADIUS: f64 = 149_597_870.7;
    pub const EARTH_PERIOD: f64 = 365.256;
}
