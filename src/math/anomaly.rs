// Conversions between true, eccentric/hyperbolic and mean anomaly.

#[inline]
fn eccentric_factor(e: f64) -> f64 {
    ((1.0 - e) / (1.0 + e)).sqrt()
}

#[inline]
fn hyperbolic_factor(e: f64) -> f64 {
    ((e - 1.0) / (e + 1.0)).sqrt()
}

pub fn eccentric_to_mean(eccentric_anomaly: f64, e: f64) -> f64 {
    eccentric_anomaly - e * eccentric_anomaly.sin()
}

pub fn hyperbolic_to_mean(hyperbolic_anomaly: f64, e: f64) -> f64 {
    e * hyperbolic_anomaly.sinh() - hyperbolic_anomaly
}

pub fn eccentric_to_true(eccentric_anomaly: f64, e: f64) -> f64 {
    // tan(E/2) = sqrt((1-e)/(1+e)) * tan(theta/2)
    let tan_half_theta = (eccentric_anomaly / 2.0).tan() / eccentric_factor(e);
    2.0 * tan_half_theta.atan()
}

pub fn true_to_eccentric(true_anomaly: f64, e: f64) -> f64 {
    let tan_half_ecc = (true_anomaly / 2.0).tan() * eccentric_factor(e);
    2.0 * tan_half_ecc.atan()
}

pub fn true_to_hyperbolic(true_anomaly: f64, e: f64) -> f64 {
    // tanh(H/2) = sqrt((e-1)/(e+1)) tan(theta/2)
    let tanh_half_hyp = (true_anomaly / 2.0).tan() * hyperbolic_factor(e);
    2.0 * tanh_half_hyp.atanh()
}

/// Mean anomaly for a given true anomaly, valid on either side of e = 1.
/// Parabolic orbits have no mean anomaly in this sense and get zero.
pub fn true_to_mean(true_anomaly: f64, e: f64) -> f64 {
    if e < 1.0 {
        eccentric_to_mean(true_to_eccentric(true_anomaly, e), e)
    } else if e > 1.0 {
        hyperbolic_to_mean(true_to_hyperbolic(true_anomaly, e), e)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    use crate::math::kepler::eccentric_anomaly;

    #[test]
    fn test_round_trip_through_kepler() {
        for &e in &[0.3, 0.6, 0.95] {
            for &theta in &[-2.5, -1.0, 0.2, 1.4, 3.0] {
                let m = true_to_mean(theta, e);
                let ecc = eccentric_anomaly(m, e);
                assert_relative_eq!(eccentric_to_true(ecc, e), theta, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_apsides() {
        assert_relative_eq!(true_to_mean(0.0, 0.4), 0.0);
        assert_relative_eq!(true_to_mean(PI - 1e-12, 0.4), PI, epsilon = 1e-9);
        assert_relative_eq!(true_to_mean(0.0, 1.7), 0.0);
    }
}
