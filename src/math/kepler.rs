//! Solvers for Kepler's equation.
//!
//! Each eccentricity regime gets a fixed iteration count and no convergence test.
//! The low-eccentricity fixed-point regime is only accurate to roughly e^6.

/// Returns the eccentric anomaly E satisfying `M = E - e sin E` (elliptic),
/// or the hyperbolic anomaly H satisfying `M = e sinh H - H` (hyperbolic).
///
/// Parabolic orbits (`e == 1`) are not solved: the mean anomaly is returned as-is.
#[allow(clippy::float_cmp)]
pub fn eccentric_anomaly(mean_anomaly: f64, e: f64) -> f64 {
    let m = mean_anomaly;
    if e == 0.0 {
        m
    } else if e < 0.2 {
        // Fixed-point iteration converges quickly for small e
        fixed_point(|x| m + e * x.sin(), m, 5)
    } else if e < 0.9 {
        fixed_point(|x| x + (m + e * x.sin() - x) / (1.0 - e * x.cos()), m, 6)
    } else if e < 1.0 {
        // Laguerre-Conway, seeded as suggested by Danby
        let seed = m + 0.85 * e * sign(m.sin());
        fixed_point(|x| laguerre_conway_step(x, e, m), seed, 8)
    } else if e == 1.0 {
        m
    } else {
        hyperbolic_anomaly(m, e)
    }
}

fn hyperbolic_anomaly(m: f64, e: f64) -> f64 {
    if m == 0.0 {
        return 0.0;
    }

    // Solve with |M| and restore the sign; the equation is odd in M
    let m_abs = m.abs();
    let seed = (2.0 * m_abs / e + 1.85).ln();
    let h = fixed_point(|x| laguerre_conway_hyperbolic_step(x, e, m_abs), seed, 30);
    h.copysign(m)
}

fn laguerre_conway_step(x: f64, e: f64, m: f64) -> f64 {
    let (s, c) = x.sin_cos();
    let f = x - e * s - m;
    let f1 = 1.0 - e * c;
    let f2 = e * s;
    x - 5.0 * f / (f1 + sign(f1) * (16.0 * f1 * f1 - 20.0 * f * f2).abs().sqrt())
}

fn laguerre_conway_hyperbolic_step(x: f64, e: f64, m: f64) -> f64 {
    let f = e * x.sinh() - x - m;
    let f1 = e * x.cosh() - 1.0;
    let f2 = e * x.sinh();
    x - 5.0 * f / (f1 + sign(f1) * (16.0 * f1 * f1 - 20.0 * f * f2).abs().sqrt())
}

fn fixed_point(step: impl Fn(f64) -> f64, seed: f64, iterations: usize) -> f64 {
    (0..iterations).fold(seed, |x, _| step(x))
}

// Like f64::signum, except zero maps to zero
fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}
