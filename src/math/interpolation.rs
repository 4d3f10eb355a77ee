use std::cell::Cell;

use nalgebra::Vector3;

/// Cubic Hermite interpolation on the unit interval. Velocities must already be
/// scaled by the length of the interval.
pub fn cubic_interpolate(
    p0: &Vector3<f64>,
    v0: &Vector3<f64>,
    p1: &Vector3<f64>,
    v1: &Vector3<f64>,
    t: f64,
) -> Vector3<f64> {
    let (a, b) = hermite_coefficients(p0, v0, p1, v1);
    p0 + a * (t * t * t) + b * (t * t) + v0 * t
}

/// Derivative of [`cubic_interpolate`] with respect to `t`. Divide by the interval
/// length to get a rate per unit time.
pub fn cubic_interpolate_velocity(
    p0: &Vector3<f64>,
    v0: &Vector3<f64>,
    p1: &Vector3<f64>,
    v1: &Vector3<f64>,
    t: f64,
) -> Vector3<f64> {
    let (a, b) = hermite_coefficients(p0, v0, p1, v1);
    a * (3.0 * t * t) + b * (2.0 * t) + v0
}

fn hermite_coefficients(
    p0: &Vector3<f64>,
    v0: &Vector3<f64>,
    p1: &Vector3<f64>,
    v1: &Vector3<f64>,
) -> (Vector3<f64>, Vector3<f64>) {
    let a = 2.0 * (p0 - p1) + v1 + v0;
    let b = 3.0 * (p1 - p0) - 2.0 * v0 - v1;
    (a, b)
}

/// Returns the index of the first sample whose time is not less than `t`
/// (so `0` before the first sample and `samples.len()` after the last).
///
/// Evaluation usually walks forward in small steps, so the previous answer is
/// checked, along with its successor, before falling back to a binary search.
pub fn sample_index<S>(
    samples: &[S],
    time_of: impl Fn(&S) -> f64,
    t: f64,
    hint: &Cell<usize>,
) -> usize {
    let brackets = |n: usize| -> bool {
        n > 0 && n < samples.len() && time_of(&samples[n - 1]) < t && t <= time_of(&samples[n])
    };

    let guess = hint.get();
    let n = if brackets(guess) {
        guess
    } else if brackets(guess + 1) {
        guess + 1
    } else {
        samples.partition_point(|s| time_of(s) < t)
    };

    hint.set(n);
    n
}
