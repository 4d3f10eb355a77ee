//! Earth rotation with the long-period extension of the P03 precession model
//! (Vondrák 2006), valid for a few hundred thousand years around J2000.

use std::f64::consts::PI;

use nalgebra::UnitQuaternion;

use super::RotationProvider;
use crate::consts::{DAYS_PER_CENTURY, J2000};
use crate::math::geometry::{rotation_to_internal, x_rotation, y_rotation, z_rotation};

const P03LP_VALID_CENTURIES: f64 = 5000.0;

const SIDEREAL_DAY_HOURS: f64 = 23.9344694;

const ARCSEC_PER_TURN: f64 = 1_296_000.0;

/// `(Pc, Qc, Ps, Qs, period)`, with amplitudes in arcseconds and periods in
/// centuries.
const ECLIPTIC_PRECESSION_TERMS: [[f64; 5]; 6] = [
    [486.230527, 2559.065245, -2578.462809, 485.116645, 2308.98],
    [-963.825784, 247.582718, -237.405076, -971.375498, 1831.25],
    [-1868.737098, -957.399054, 1007.593090, -1930.464338, 687.52],
    [-1589.172175, 493.021354, -423.035168, -1634.905683, 729.97],
    [429.442489, -328.301413, 337.266785, 429.594383, 492.21],
    [-2244.742029, -339.969833, 221.240093, -2131.745072, 708.13],
];

/// `(pc, epsc, ps, epss, period)`, as above.
const PRECESSION_TERMS: [[f64; 5]; 10] = [
    [-6180.062400, 807.904635, -2434.845716, -2056.455197, 409.90],
    [-2721.869299, -177.959383, 538.034071, -912.727303, 396.15],
    [1460.746498, 371.942696, -1245.689351, 447.710000, 536.91],
    [-1838.488899, -176.029134, 529.220775, -611.297411, 402.90],
    [949.518077, -89.154030, 277.195375, 315.900626, 417.15],
    [32.701460, -336.048179, 945.979710, 12.390157, 288.92],
    [598.054819, -17.415730, -955.163661, -15.922155, 4042.97],
    [-293.145284, -28.084479, 93.894079, -102.870153, 304.90],
    [66.354942, 21.456146, 0.671968, 24.123484, 281.46],
    [18.894136, 30.917011, -184.663935, 2.512708, 204.38],
];

/// Position of the ecliptic pole, in arcseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EclipticPole {
    pub p: f64,
    pub q: f64,
}

/// General precession in longitude and obliquity of the ecliptic, in
/// arcseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrecessionAngles {
    pub precession: f64,
    pub obliquity: f64,
}

/// `t` is in Julian centuries from J2000.
pub fn ecliptic_precession(t: f64) -> EclipticPole {
    let (t2, t3) = (t * t, t * t * t);
    let mut pole = EclipticPole {
        p: 5750.804069 + 0.1948311 * t - 0.00016739 * t2 - 4.8e-8 * t3,
        q: -1673.999018 + 0.3474459 * t + 0.00011243 * t2 - 6.4e-8 * t3,
    };

    for &[pc, qc, ps, qs, period] in ECLIPTIC_PRECESSION_TERMS.iter() {
        let (s, c) = (2.0 * PI * t / period).sin_cos();
        pole.p += pc * c + ps * s;
        pole.q += qc * c + qs * s;
    }
    pole
}

/// `t` is in Julian centuries from J2000.
pub fn precession_obliquity(t: f64) -> PrecessionAngles {
    let (t2, t3) = (t * t, t * t * t);
    let mut angles = PrecessionAngles {
        precession: 7907.295950 + 5044.374034 * t - 0.00713473 * t2 + 6e-9 * t3,
        obliquity: 83973.876448 - 0.0425899 * t - 0.00000113 * t2,
    };

    for &[pc, epsc, ps, epss, period] in PRECESSION_TERMS.iter() {
        let (s, c) = (2.0 * PI * t / period).sin_cos();
        angles.precession += pc * c + ps * s;
        angles.obliquity += epsc * c + epss * s;
    }
    angles
}

/// The rotation of the Earth in the J2000 ecliptic frame, including
/// precession of its axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EarthRotationModel;

impl RotationProvider for EarthRotationModel {
    fn compute_spin(&self, t: f64) -> UnitQuaternion<f64> {
        let d = t - J2000;
        let theta = 2.0 * PI * (d * 24.0 / SIDEREAL_DAY_HOURS - 259.853 / 360.0);
        y_rotation(-theta)
    }

    fn compute_equator_orientation(&self, t: f64) -> UnitQuaternion<f64> {
        let t = ((t - J2000) / DAYS_PER_CENTURY)
            .clamp(-P03LP_VALID_CENTURIES, P03LP_VALID_CENTURIES);

        let angles = precession_obliquity(t);
        let pole = ecliptic_precession(t);

        let obliquity = (angles.obliquity / 3600.0).to_radians();
        let precession = (angles.precession / 3600.0).to_radians();

        // Inclination and node of the ecliptic of date on the J2000 ecliptic
        let p = pole.p * 2.0 * PI / ARCSEC_PER_TURN;
        let q = pole.q * 2.0 * PI / ARCSEC_PER_TURN;
        let inclination = (p * p + q * q).sqrt().asin();
        let node = p.atan2(q);

        let node_rotation = z_rotation(node);
        let ecliptic = node_rotation.inverse() * x_rotation(inclination) * node_rotation;
        let q = x_rotation(obliquity) * z_rotation(-precession) * ecliptic.inverse();
        rotation_to_internal(&q)
    }

    fn period(&self) -> f64 {
        SIDEREAL_DAY_HOURS / 24.0
    }
}
