//! Rotation models from the reports of the IAU Working Group on Cartographic
//! Coordinates and Rotational Elements.
//!
//! Each model gives the right ascension and declination of the body's north
//! pole and the location of its prime meridian, all in degrees, relative to
//! the J2000 Earth equator. Times are measured in days from J2000 (`d`) or in
//! Julian centuries from J2000 (`T`).

use nalgebra::UnitQuaternion;

use super::{RotationModel, RotationProvider};
use crate::consts::{DAYS_PER_CENTURY, J2000};
use crate::error::{Error, Result};
use crate::math::geometry::{x_rot_180, x_rotation, y_rotation};

/// Secular terms are only trusted this many centuries either side of J2000.
const SECULAR_TERM_VALID_CENTURIES: f64 = 50.0;

fn clamp_centuries(t: f64) -> f64 {
    t.clamp(-SECULAR_TERM_VALID_CENTURIES, SECULAR_TERM_VALID_CENTURIES)
}

fn sind(deg: f64) -> f64 {
    deg.to_radians().sin()
}

fn cosd(deg: f64) -> f64 {
    deg.to_radians().cos()
}

/// Bodies with their own periodic terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IauBody {
    Mercury,
    Mars,
    Jupiter,
    Neptune,
    Moon,
    Phobos,
    Deimos,
    Amalthea,
    Thebe,
    Io,
    Europa,
    Ganymede,
    Callisto,
    Mimas,
    Tethys,
    Rhea,
    Miranda,
    Ariel,
    Umbriel,
    Titania,
    Oberon,
}

impl IauBody {
    /// Mean rotation rate in degrees per day, used for the period.
    fn rotation_rate(self) -> f64 {
        match self {
            IauBody::Mercury => 6.1385108,
            IauBody::Mars => 350.891982443297,
            IauBody::Jupiter => 870.5360000,
            IauBody::Neptune => 536.3128492,
            IauBody::Moon => 13.17635815,
            IauBody::Phobos => 1128.84475928,
            IauBody::Deimos => 285.16188899,
            IauBody::Amalthea => 722.6314560,
            IauBody::Thebe => 533.7004100,
            IauBody::Io => 203.4889538,
            IauBody::Europa => 101.3747235,
            IauBody::Ganymede => 50.3176081,
            IauBody::Callisto => 21.5710715,
            IauBody::Mimas => 381.9945550,
            IauBody::Tethys => 190.6979085,
            IauBody::Rhea => 79.6900478,
            IauBody::Miranda => 254.6906892,
            IauBody::Ariel => 142.8356681,
            IauBody::Umbriel => 86.8688923,
            IauBody::Titania => 41.351431,
            IauBody::Oberon => 26.7394932,
        }
    }

    /// The Uranian satellites rotate retrograde.
    fn is_flipped(self) -> bool {
        matches!(
            self,
            IauBody::Miranda | IauBody::Ariel | IauBody::Umbriel | IauBody::Titania | IauBody::Oberon
        )
    }

    fn pole(self, d: f64) -> (f64, f64) {
        let t = d / DAYS_PER_CENTURY;

        match self {
            IauBody::Mercury => {
                let t = clamp_centuries(t);
                (281.0103 - 0.0328 * t, 61.4155 - 0.0049 * t)
            }
            IauBody::Mars => {
                let t = clamp_centuries(t);
                let ra = 317.269202 - 0.10927547 * t
                    + 0.000068 * sind(198.991226 + 19139.4819985 * t)
                    + 0.000238 * sind(226.292679 + 38280.8511281 * t)
                    + 0.000052 * sind(249.663391 + 57420.7251593 * t)
                    + 0.000009 * sind(266.183510 + 76560.6367950 * t)
                    + 0.419057 * sind(79.398797 + 0.5042615 * t);
                let dec = 54.432516 - 0.05827105 * t
                    + 0.000051 * cosd(122.433576 + 19139.9407476 * t)
                    + 0.000141 * cosd(43.058401 + 38280.8753272 * t)
                    + 0.000031 * cosd(57.663379 + 57420.7517205 * t)
                    + 0.000005 * cosd(79.476401 + 76560.6495004 * t)
                    + 1.591274 * cosd(166.325722 + 0.5042615 * t);
                (ra, dec)
            }
            IauBody::Jupiter => {
                let ja = 99.360714 + 4850.4046 * t;
                let jb = 175.895369 + 1191.9605 * t;
                let jc = 300.323162 + 262.5475 * t;
                let jd = 114.012305 + 6070.2476 * t;
                let je = 49.511251 + 64.3000 * t;
                let t = clamp_centuries(t);
                let ra = 268.056595 - 0.006499 * t
                    + 0.000117 * sind(ja)
                    + 0.000938 * sind(jb)
                    + 0.001432 * sind(jc)
                    + 0.000030 * sind(jd)
                    + 0.002150 * sind(je);
                let dec = 64.495303 + 0.002413 * t
                    + 0.000050 * cosd(ja)
                    + 0.000404 * cosd(jb)
                    + 0.000617 * cosd(jc)
                    - 0.000013 * cosd(jd)
                    + 0.000926 * cosd(je);
                (ra, dec)
            }
            IauBody::Neptune => {
                let n = 357.85 + 52.316 * t;
                (299.36 + 0.70 * sind(n), 43.46 - 0.51 * cosd(n))
            }
            IauBody::Moon => {
                let e = lunar_arguments(d);
                let t = clamp_centuries(t);
                let ra = 269.9949 + 0.0031 * t - 3.8787 * e[1].sin() - 0.1204 * e[2].sin()
                    + 0.0700 * e[3].sin()
                    - 0.0172 * e[4].sin()
                    + 0.0072 * e[6].sin()
                    - 0.0052 * e[10].sin()
                    + 0.0043 * e[13].sin();
                let dec = 66.5392 + 0.0130 * t + 1.5419 * e[1].cos() + 0.0239 * e[2].cos()
                    - 0.0278 * e[3].cos()
                    + 0.0068 * e[4].cos()
                    - 0.0029 * e[6].cos()
                    + 0.0009 * e[7].cos()
                    + 0.0008 * e[10].cos()
                    - 0.0009 * e[13].cos();
                (ra, dec)
            }
            IauBody::Phobos => {
                let [m1, m2, m3, m4] = phobos_arguments(t);
                let t = clamp_centuries(t);
                let ra = 317.67071657 - 0.10844326 * t - 1.78428399 * sind(m1)
                    + 0.02212824 * sind(m2)
                    - 0.01028251 * sind(m3)
                    - 0.00475595 * sind(m4);
                let dec = 52.88627266 - 0.06134706 * t - 1.07516537 * cosd(m1)
                    + 0.00668626 * cosd(m2)
                    - 0.00648740 * cosd(m3)
                    + 0.00281576 * cosd(m4);
                (ra, dec)
            }
            IauBody::Deimos => {
                let [m6, m7, m8, m9, m10] = deimos_arguments(t);
                let t = clamp_centuries(t);
                let ra = 316.65705808 - 0.10518014 * t
                    + 3.09217726 * sind(m6)
                    + 0.22980637 * sind(m7)
                    + 0.06418655 * sind(m8)
                    + 0.02533537 * sind(m9)
                    + 0.00778695 * sind(m10);
                let dec = 53.50992033 - 0.05979094 * t
                    + 1.83936004 * cosd(m6)
                    + 0.14325320 * cosd(m7)
                    + 0.01911409 * cosd(m8)
                    - 0.01482590 * cosd(m9)
                    + 0.00192430 * cosd(m10);
                (ra, dec)
            }

            // -- Galilean and inner satellites of Jupiter --
            IauBody::Amalthea => {
                let j1 = 73.32 + 91472.9 * t;
                let t = clamp_centuries(t);
                let ra = 268.05 - 0.009 * t - 0.84 * sind(j1) + 0.01 * sind(2.0 * j1);
                let dec = 64.49 + 0.003 * t - 0.36 * cosd(j1);
                (ra, dec)
            }
            IauBody::Thebe => {
                let j2 = 24.62 + 45137.2 * t;
                let t = clamp_centuries(t);
                let ra = 268.05 - 0.009 * t - 2.11 * sind(j2) + 0.04 * sind(2.0 * j2);
                let dec = 64.49 + 0.003 * t - 0.91 * cosd(j2) + 0.01 * cosd(2.0 * j2);
                (ra, dec)
            }
            IauBody::Io => {
                let j = jovian_arguments(t);
                let t = clamp_centuries(t);
                let ra = 268.05 - 0.009 * t + 0.094 * sind(j.j3) + 0.024 * sind(j.j4);
                let dec = 64.50 + 0.003 * t + 0.040 * cosd(j.j3) + 0.011 * cosd(j.j4);
                (ra, dec)
            }
            IauBody::Europa => {
                let j = jovian_arguments(t);
                let t = clamp_centuries(t);
                let ra = 268.08 - 0.009 * t
                    + 1.086 * sind(j.j4)
                    + 0.060 * sind(j.j5)
                    + 0.015 * sind(j.j6)
                    + 0.009 * sind(j.j7);
                let dec = 64.51 + 0.003 * t
                    + 0.468 * cosd(j.j4)
                    + 0.026 * cosd(j.j5)
                    + 0.007 * cosd(j.j6)
                    + 0.002 * cosd(j.j7);
                (ra, dec)
            }
            IauBody::Ganymede => {
                let j = jovian_arguments(t);
                let t = clamp_centuries(t);
                let ra = 268.20 - 0.009 * t - 0.037 * sind(j.j4)
                    + 0.431 * sind(j.j5)
                    + 0.091 * sind(j.j6);
                let dec = 64.57 + 0.003 * t - 0.016 * cosd(j.j4)
                    + 0.186 * cosd(j.j5)
                    + 0.039 * cosd(j.j6);
                (ra, dec)
            }
            IauBody::Callisto => {
                let j = jovian_arguments(t);
                let t = clamp_centuries(t);
                let ra = 268.72 - 0.009 * t - 0.068 * sind(j.j5)
                    + 0.590 * sind(j.j6)
                    + 0.010 * sind(j.j8);
                let dec = 64.83 + 0.003 * t - 0.029 * cosd(j.j5) + 0.254 * cosd(j.j6)
                    - 0.004 * cosd(j.j8);
                (ra, dec)
            }

            // -- Satellites of Saturn --
            IauBody::Mimas => {
                let s3 = 177.40 - 36505.5 * t;
                let t = clamp_centuries(t);
                (40.66 - 0.036 * t + 13.56 * sind(s3), 83.52 - 0.004 * t - 1.53 * cosd(s3))
            }
            IauBody::Tethys => {
                let s4 = 300.00 - 7225.9 * t;
                let t = clamp_centuries(t);
                (40.66 - 0.036 * t + 9.66 * sind(s4), 83.52 - 0.004 * t - 1.09 * cosd(s4))
            }
            IauBody::Rhea => {
                let s6 = 345.20 - 1016.3 * t;
                let t = clamp_centuries(t);
                (40.38 - 0.036 * t + 3.10 * sind(s6), 83.55 - 0.004 * t - 0.35 * cosd(s6))
            }

            // -- Satellites of Uranus --
            IauBody::Miranda => {
                let u11 = 102.23 - 2024.22 * t;
                let ra = 257.43 + 4.41 * sind(u11) - 0.04 * sind(2.0 * u11);
                let dec = -15.08 + 4.25 * cosd(u11) - 0.02 * cosd(2.0 * u11);
                (ra, dec)
            }
            IauBody::Ariel => {
                let u13 = 304.01 - 51.94 * t;
                (257.43 + 0.29 * sind(u13), -15.10 + 0.28 * cosd(u13))
            }
            IauBody::Umbriel => {
                let u14 = 308.71 - 93.17 * t;
                (257.43 + 0.21 * sind(u14), -15.10 + 0.20 * cosd(u14))
            }
            IauBody::Titania => {
                let u15 = 340.82 - 75.32 * t;
                (257.43 + 0.29 * sind(u15), -15.10 + 0.28 * cosd(u15))
            }
            IauBody::Oberon => {
                let u16 = 259.14 - 504.81 * t;
                (257.43 + 0.16 * sind(u16), -15.10 + 0.16 * cosd(u16))
            }
        }
    }

    fn meridian(self, d: f64) -> f64 {
        let t = d / DAYS_PER_CENTURY;

        match self {
            IauBody::Mercury => {
                let m1 = 174.7910857 + 4.092335 * d;
                let m2 = 349.5821714 + 8.184670 * d;
                let m3 = 164.3732571 + 12.277005 * d;
                let m4 = 339.1643429 + 16.369340 * d;
                let m5 = 153.9554286 + 20.461675 * d;
                329.5988 + 6.1385108 * d + 0.01067257 * sind(m1)
                    - 0.00112309 * sind(m2)
                    - 0.00011040 * sind(m3)
                    - 0.00002539 * sind(m4)
                    - 0.00000571 * sind(m5)
            }
            IauBody::Mars => {
                176.049863
                    + 350.891982443297 * d
                    + 0.000145 * sind(129.071773 + 19140.0328244 * t)
                    + 0.000157 * sind(36.352167 + 38281.0473591 * t)
                    + 0.000040 * sind(56.668646 + 57420.9295360 * t)
                    + 0.000001 * sind(67.364003 + 76560.2552215 * t)
                    + 0.000001 * sind(104.792680 + 95700.4387578 * t)
                    + 0.584542 * sind(95.391654 + 0.5042615 * t)
            }
            IauBody::Jupiter => 284.95 + 870.5360000 * d,
            IauBody::Neptune => 253.18 + 536.3128492 * d - 0.48 * sind(357.85 + 52.316 * t),
            IauBody::Moon => {
                let e = lunar_arguments(d);
                38.3213 + 13.17635815 * d - 1.4e-12 * d * d
                    + 3.5610 * e[1].sin()
                    + 0.1208 * e[2].sin()
                    - 0.0642 * e[3].sin()
                    + 0.0158 * e[4].sin()
                    + 0.0252 * e[5].sin()
                    - 0.0066 * e[6].sin()
                    - 0.0047 * e[7].sin()
                    - 0.0046 * e[8].sin()
                    + 0.0028 * e[9].sin()
                    + 0.0052 * e[10].sin()
                    + 0.0040 * e[11].sin()
                    + 0.0019 * e[12].sin()
                    - 0.0044 * e[13].sin()
            }
            IauBody::Phobos => {
                let [m1, m2, m3, m4] = phobos_arguments(t);
                let m5 = 189.63271560 + 41215158.18420050 * t + 12.71192322 * t * t;
                35.18774440 + 1128.84475928 * d + 12.72192797 * t * t + 1.42421769 * sind(m1)
                    - 0.02273783 * sind(m2)
                    + 0.00410711 * sind(m3)
                    + 0.00631964 * sind(m4)
                    - 1.143 * sind(m5)
            }
            IauBody::Deimos => {
                let [m6, m7, m8, m9, m10] = deimos_arguments(t);
                79.39932954 + 285.16188899 * d
                    - 2.73954829 * sind(m6)
                    - 0.39968606 * sind(m7)
                    - 0.06563259 * sind(m8)
                    - 0.02912940 * sind(m9)
                    + 0.01699160 * sind(m10)
            }
            IauBody::Amalthea => {
                let j1 = 73.32 + 91472.9 * t;
                231.67 + 722.6314560 * d + 0.76 * sind(j1) - 0.01 * sind(2.0 * j1)
            }
            IauBody::Thebe => {
                let j2 = 24.62 + 45137.2 * t;
                8.56 + 533.7004100 * d + 1.91 * sind(j2) - 0.04 * sind(2.0 * j2)
            }
            IauBody::Io => {
                let j = jovian_arguments(t);
                200.39 + 203.4889538 * d - 0.085 * sind(j.j3) - 0.022 * sind(j.j4)
            }
            IauBody::Europa => {
                let j = jovian_arguments(t);
                36.022 + 101.3747235 * d
                    - 0.980 * sind(j.j4)
                    - 0.054 * sind(j.j5)
                    - 0.014 * sind(j.j6)
                    - 0.008 * sind(j.j7)
            }
            IauBody::Ganymede => {
                let j = jovian_arguments(t);
                44.064 + 50.3176081 * d + 0.033 * sind(j.j4)
                    - 0.389 * sind(j.j5)
                    - 0.082 * sind(j.j6)
            }
            IauBody::Callisto => {
                let j = jovian_arguments(t);
                259.51 + 21.5710715 * d + 0.061 * sind(j.j5)
                    - 0.533 * sind(j.j6)
                    - 0.009 * sind(j.j8)
            }
            IauBody::Mimas => {
                let s3 = 177.40 - 36505.5 * t;
                let s5 = 316.45 + 506.2 * t;
                333.46 + 381.9945550 * d - 13.48 * sind(s3) - 44.85 * sind(s5)
            }
            IauBody::Tethys => {
                let s4 = 300.00 - 7225.9 * t;
                let s5 = 316.45 + 506.2 * t;
                8.95 + 190.6979085 * d - 9.60 * sind(s4) + 2.23 * sind(s5)
            }
            IauBody::Rhea => 235.16 + 79.6900478 * d - 3.08 * sind(345.20 - 1016.3 * t),
            IauBody::Miranda => {
                let u11 = 102.23 - 2024.22 * t;
                let u12 = 316.41 + 2863.96 * t;
                30.70 - 254.6906892 * d - 1.27 * sind(u12) + 0.15 * sind(2.0 * u12)
                    + 1.15 * sind(u11)
                    - 0.09 * sind(2.0 * u11)
            }
            IauBody::Ariel => {
                let u12 = 316.41 + 2863.96 * t;
                let u13 = 304.01 - 51.94 * t;
                156.22 - 142.8356681 * d + 0.05 * sind(u12) + 0.08 * sind(u13)
            }
            IauBody::Umbriel => {
                let u12 = 316.41 + 2863.96 * t;
                let u14 = 308.71 - 93.17 * t;
                108.05 - 86.8688923 * d - 0.09 * sind(u12) + 0.06 * sind(u14)
            }
            IauBody::Titania => 77.74 - 41.3514316 * d + 0.08 * sind(340.82 - 75.32 * t),
            IauBody::Oberon => 6.77 - 26.7394932 * d + 0.04 * sind(259.14 - 504.81 * t),
        }
    }
}

/// Fundamental arguments for the Moon, in radians, indexed from 1.
fn lunar_arguments(d: f64) -> [f64; 14] {
    let deg = [
        0.0,
        125.045 - 0.0529921 * d,
        250.089 - 0.1059842 * d,
        260.008 + 13.0120009 * d,
        176.625 + 13.3407154 * d,
        357.529 + 0.9856003 * d,
        311.589 + 26.4057084 * d,
        134.963 + 13.0649930 * d,
        276.617 + 0.3287146 * d,
        34.226 + 1.7484877 * d,
        15.134 - 0.1589763 * d,
        119.743 + 0.0036096 * d,
        239.961 + 0.1643573 * d,
        25.053 + 12.9590088 * d,
    ];
    let mut e = [0.0; 14];
    for (arg, deg) in e.iter_mut().zip(deg.iter()).skip(1) {
        *arg = deg.to_radians();
    }
    e
}

fn phobos_arguments(t: f64) -> [f64; 4] {
    [
        190.72646643 + 15917.10818695 * t,
        21.46892470 + 31834.27934054 * t,
        332.86082793 + 19139.89694742 * t,
        394.93256437 + 38280.79631835 * t,
    ]
}

fn deimos_arguments(t: f64) -> [f64; 5] {
    [
        121.46893664 + 660.22803474 * t,
        231.05028581 + 660.99123540 * t,
        251.37314025 + 1320.50145245 * t,
        217.98635955 + 38279.96125550 * t,
        196.19729402 + 19139.83628608 * t,
    ]
}

struct JovianArguments {
    j3: f64,
    j4: f64,
    j5: f64,
    j6: f64,
    j7: f64,
    j8: f64,
}

fn jovian_arguments(t: f64) -> JovianArguments {
    JovianArguments {
        j3: 283.90 + 4850.7 * t,
        j4: 355.80 + 1191.3 * t,
        j5: 119.90 + 262.1 * t,
        j6: 229.80 + 64.3 * t,
        j7: 352.25 + 2382.6 * t,
        j8: 113.35 + 6070.0 * t,
    }
}

/// Uniform rotation about a pole that drifts linearly in right ascension and
/// declination. Rates are in degrees per century for the pole and degrees per
/// day for the meridian.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IauPrecessingElements {
    pub pole_ra: f64,
    pub pole_ra_rate: f64,
    pub pole_dec: f64,
    pub pole_dec_rate: f64,
    pub meridian_at_epoch: f64,
    pub rotation_rate: f64,
}

impl IauPrecessingElements {
    const fn new(
        pole_ra: f64,
        pole_ra_rate: f64,
        pole_dec: f64,
        pole_dec_rate: f64,
        meridian_at_epoch: f64,
        rotation_rate: f64,
    ) -> Self {
        Self {
            pole_ra,
            pole_ra_rate,
            pole_dec,
            pole_dec_rate,
            meridian_at_epoch,
            rotation_rate,
        }
    }

    fn pole(&self, d: f64) -> (f64, f64) {
        let t = clamp_centuries(d / DAYS_PER_CENTURY);
        (
            self.pole_ra + self.pole_ra_rate * t,
            self.pole_dec + self.pole_dec_rate * t,
        )
    }

    fn meridian(&self, d: f64) -> f64 {
        self.meridian_at_epoch + self.rotation_rate * d
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Series {
    Body(IauBody),
    Precessing(IauPrecessingElements),
}

#[derive(Debug, Clone, PartialEq)]
pub struct IauRotationModel {
    series: Series,
    period: f64,
    flipped: bool,
}

impl IauRotationModel {
    pub fn body(body: IauBody) -> Self {
        Self {
            series: Series::Body(body),
            period: 360.0 / body.rotation_rate(),
            flipped: body.is_flipped(),
        }
    }

    pub fn precessing(elements: IauPrecessingElements) -> Self {
        Self {
            series: Series::Precessing(elements),
            period: (360.0 / elements.rotation_rate).abs(),
            flipped: elements.rotation_rate < 0.0,
        }
    }

    /// Right ascension and declination of the north pole in degrees, `d`
    /// days after J2000.
    pub fn pole(&self, d: f64) -> (f64, f64) {
        match &self.series {
            Series::Body(body) => body.pole(d),
            Series::Precessing(elements) => elements.pole(d),
        }
    }

    /// Longitude of the prime meridian in degrees, `d` days after J2000.
    pub fn meridian(&self, d: f64) -> f64 {
        match &self.series {
            Series::Body(body) => body.meridian(d),
            Series::Precessing(elements) => elements.meridian(d),
        }
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }
}

impl RotationProvider for IauRotationModel {
    fn compute_spin(&self, t: f64) -> UnitQuaternion<f64> {
        let w = (180.0 + self.meridian(t - J2000)).to_radians();
        if self.flipped {
            y_rotation(w)
        } else {
            y_rotation(-w)
        }
    }

    fn compute_equator_orientation(&self, t: f64) -> UnitQuaternion<f64> {
        let (ra, dec) = self.pole(t - J2000);
        let node = ra + 90.0;
        let inclination = 90.0 - dec;

        let q = x_rotation((-inclination).to_radians()) * y_rotation((-node).to_radians());
        if self.flipped {
            x_rot_180() * q
        } else {
            q
        }
    }

    fn period(&self) -> f64 {
        self.period
    }
}

// -- Named models --

#[derive(Clone, Copy)]
enum Custom {
    Earth,
    Body(IauBody),
    Precessing(IauPrecessingElements),
}

const fn precessing(ra: f64, ra_rate: f64, dec: f64, dec_rate: f64, w0: f64, rate: f64) -> Custom {
    Custom::Precessing(IauPrecessingElements::new(
        ra, ra_rate, dec, dec_rate, w0, rate,
    ))
}

const CUSTOM_ROTATIONS: &[(&str, Custom)] = &[
    ("earth-p03lp", Custom::Earth),
    ("iau-mercury", Custom::Body(IauBody::Mercury)),
    ("iau-venus", precessing(272.76, 0.0, 67.16, 0.0, 160.20, -1.4813688)),
    ("iau-mars", Custom::Body(IauBody::Mars)),
    ("iau-jupiter", Custom::Body(IauBody::Jupiter)),
    ("iau-saturn", precessing(40.589, -0.036, 83.537, -0.004, 38.90, 810.7939024)),
    ("iau-uranus", precessing(257.311, 0.0, -15.175, 0.0, 203.81, -501.1600928)),
    ("iau-neptune", Custom::Body(IauBody::Neptune)),
    ("iau-pluto", precessing(313.02, 0.0, 9.09, 0.0, 236.77, -56.3623195)),
    ("iau-moon", Custom::Body(IauBody::Moon)),
    ("iau-phobos", Custom::Body(IauBody::Phobos)),
    ("iau-deimos", Custom::Body(IauBody::Deimos)),
    ("iau-metis", precessing(268.05, -0.009, 64.49, 0.003, 346.09, 1221.2547301)),
    ("iau-adrastea", precessing(268.05, -0.009, 64.49, 0.003, 33.29, 1206.9986602)),
    ("iau-amalthea", Custom::Body(IauBody::Amalthea)),
    ("iau-thebe", Custom::Body(IauBody::Thebe)),
    ("iau-io", Custom::Body(IauBody::Io)),
    ("iau-europa", Custom::Body(IauBody::Europa)),
    ("iau-ganymede", Custom::Body(IauBody::Ganymede)),
    ("iau-callisto", Custom::Body(IauBody::Callisto)),
    ("iau-pan", precessing(40.6, -0.036, 83.5, -0.004, 48.8, 626.0440000)),
    ("iau-atlas", precessing(40.58, -0.036, 83.53, -0.004, 137.88, 598.3060000)),
    ("iau-prometheus", precessing(40.58, -0.036, 83.53, -0.004, 296.14, 587.289000)),
    ("iau-pandora", precessing(40.58, -0.036, 83.53, -0.004, 162.92, 572.7891000)),
    ("iau-mimas", Custom::Body(IauBody::Mimas)),
    ("iau-enceladus", precessing(40.66, -0.036, 83.52, -0.004, 6.32, 262.7318996)),
    ("iau-tethys", Custom::Body(IauBody::Tethys)),
    ("iau-telesto", precessing(50.51, -0.036, 84.06, -0.004, 56.88, 190.6979332)),
    ("iau-calypso", precessing(36.41, -0.036, 85.04, -0.004, 153.51, 190.6742373)),
    ("iau-dione", precessing(40.66, -0.036, 83.52, -0.004, 357.6, 131.5349316)),
    ("iau-helene", precessing(40.85, -0.036, 83.34, -0.004, 245.12, 131.6174056)),
    ("iau-rhea", Custom::Body(IauBody::Rhea)),
    ("iau-titan", precessing(39.4827, 0.0, 83.4279, 0.0, 186.5855, 22.5769768)),
    ("iau-iapetus", precessing(318.16, -3.949, 75.03, -1.143, 355.2, 4.5379572)),
    ("iau-phoebe", precessing(356.90, 0.0, 77.80, 0.0, 178.58, 931.639)),
    ("iau-miranda", Custom::Body(IauBody::Miranda)),
    ("iau-ariel", Custom::Body(IauBody::Ariel)),
    ("iau-umbriel", Custom::Body(IauBody::Umbriel)),
    ("iau-titania", Custom::Body(IauBody::Titania)),
    ("iau-oberon", Custom::Body(IauBody::Oberon)),
];

/// Names accepted by [custom_rotation_model].
pub fn custom_rotation_names() -> impl Iterator<Item = &'static str> {
    CUSTOM_ROTATIONS.iter().map(|(name, _)| *name)
}

/// Builds one of the built-in rotation models by name, e.g. `"iau-mars"`.
pub fn custom_rotation_model(name: &str) -> Result<RotationModel> {
    let custom = CUSTOM_ROTATIONS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, custom)| *custom)
        .ok_or_else(|| Error::UnknownRotationModel(name.to_owned()))?;

    let model = match custom {
        Custom::Earth => RotationModel::earth(),
        Custom::Body(body) => RotationModel::iau(IauRotationModel::body(body)),
        Custom::Precessing(elements) => RotationModel::iau(IauRotationModel::precessing(elements)),
    };
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    use crate::math::geometry::from_internal;

    fn pole_direction(ra: f64, dec: f64) -> Vector3<f64> {
        let (ra, dec) = (ra.to_radians(), dec.to_radians());
        Vector3::new(dec.cos() * ra.cos(), dec.cos() * ra.sin(), dec.sin())
    }

    #[test]
    fn test_every_name_resolves() {
        let names: Vec<_> = custom_rotation_names().collect();
        assert_eq!(names.len(), 40);
        for name in names {
            let model = custom_rotation_model(name).unwrap();
            assert!(model.period() > 0.0, "{}", name);
            assert!(model.is_periodic(), "{}", name);
        }

        match custom_rotation_model("iau-vulcan") {
            Err(Error::UnknownRotationModel(name)) => assert_eq!(name, "iau-vulcan"),
            _ => panic!("expected an unknown model error"),
        }
    }

    #[test]
    fn test_periods() {
        let mars = IauRotationModel::body(IauBody::Mars);
        assert_relative_eq!(mars.period(), 1.025957, epsilon = 1e-6);

        let venus = IauRotationModel::precessing(IauPrecessingElements::new(
            272.76, 0.0, 67.16, 0.0, 160.20, -1.4813688,
        ));
        assert_relative_eq!(venus.period(), 243.0185, epsilon = 1e-3);
        assert!(venus.is_flipped());

        assert!(IauRotationModel::body(IauBody::Titania).is_flipped());
        assert!(!IauRotationModel::body(IauBody::Neptune).is_flipped());
    }

    #[test]
    fn test_equator_pole_points_at_ra_dec() {
        // The body's +y axis, carried back to J2000 equatorial coordinates,
        // should point at the pole.
        for &body in &[IauBody::Mars, IauBody::Jupiter, IauBody::Moon, IauBody::Io] {
            let model = IauRotationModel::body(body);
            for &d in &[0.0, 1234.5, -40000.0] {
                let q = model.compute_equator_orientation(J2000 + d);
                let pole = from_internal(&q.inverse_transform_vector(&Vector3::y()));
                let (ra, dec) = model.pole(d);
                assert_relative_eq!(pole, pole_direction(ra, dec), epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_flipped_pole_points_south() {
        let model = IauRotationModel::body(IauBody::Miranda);
        let q = model.compute_equator_orientation(J2000);
        let pole = from_internal(&q.inverse_transform_vector(&Vector3::y()));
        let (ra, dec) = model.pole(0.0);
        assert_relative_eq!(pole, -pole_direction(ra, dec), epsilon = 1e-12);
    }

    #[test]
    fn test_secular_terms_are_clamped() {
        let saturn = IauRotationModel::precessing(IauPrecessingElements::new(
            40.589, -0.036, 83.537, -0.004, 38.90, 810.7939024,
        ));
        let limit = 50.0 * DAYS_PER_CENTURY;
        assert_eq!(saturn.pole(limit), saturn.pole(2.0 * limit));
        assert_eq!(saturn.pole(-limit), saturn.pole(-3.0 * limit));
        assert_ne!(saturn.pole(0.0), saturn.pole(limit));

        // The meridian keeps advancing
        assert_relative_eq!(
            saturn.meridian(2.0 * limit) - saturn.meridian(limit),
            810.7939024 * limit,
            max_relative = 1e-12
        );

        // Neptune has no secular terms to clamp, so its pole keeps moving
        let neptune = IauRotationModel::body(IauBody::Neptune);
        assert_ne!(neptune.pole(limit), neptune.pole(1.5 * limit));
    }

    #[test]
    fn test_meridian_at_epoch() {
        assert_relative_eq!(IauRotationModel::body(IauBody::Jupiter).meridian(0.0), 284.95);

        // At J2000, W = 284.95, so the spin is a rotation by -(180 + W)
        let model = IauRotationModel::body(IauBody::Jupiter);
        assert_relative_eq!(
            model.compute_spin(J2000),
            y_rotation(-(464.95f64).to_radians()),
            epsilon = 1e-12
        );
    }
}
