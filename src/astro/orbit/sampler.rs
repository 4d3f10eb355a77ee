use nalgebra::Vector3;

use super::{Orbit, OrbitSampleProc};
use crate::config::SamplingConfig;
use crate::math::interpolation::cubic_interpolate;

/// Step sizes for [adaptive_sample], in days, and the midpoint error
/// tolerance, in km.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepParameters {
    pub tolerance: f64,
    pub start_step: f64,
    pub min_step: f64,
    pub max_step: f64,
    pub step_factor: f64,
}

impl StepParameters {
    pub fn from_config(config: &SamplingConfig, span: f64) -> Self {
        Self {
            tolerance: config.tolerance,
            start_step: span / config.start_step_divisor,
            min_step: span / config.min_step_divisor,
            max_step: span / config.max_step_divisor,
            step_factor: config.step_factor,
        }
    }
}

/// Walks from `start` to `end`, choosing each step so that a cubic through the
/// step's endpoints predicts its midpoint to within the tolerance.
///
/// The step grows while the prediction stays good and shrinks while it is bad,
/// always within `[min_step, max_step]` and never past `end`.
pub fn adaptive_sample(
    orbit: &Orbit,
    start: f64,
    end: f64,
    proc: &mut dyn OrbitSampleProc,
    params: &StepParameters,
) {
    let mut t = start;
    let mut last_p = orbit.position(t);
    let mut last_v = orbit.velocity(t);
    proc.sample(t, &last_p, &last_v);

    // Zero or NaN spans would never advance
    if !(params.max_step > 0.0 && params.min_step > 0.0) {
        return;
    }

    let mut max_step = params.max_step;
    let midpoint_error = |t: f64, dt: f64, last_p: &Vector3<f64>, last_v: Vector3<f64>| {
        let p1 = orbit.position(t + dt);
        let v1 = orbit.velocity(t + dt);
        let p_test = orbit.position(t + dt / 2.0);
        let p_interp = cubic_interpolate(last_p, &(last_v * dt), &p1, &(v1 * dt), 0.5);
        ((p_interp - p_test).norm(), p1, v1)
    };

    while t < end {
        max_step = max_step.min(end - t);
        let mut dt = max_step.min(params.start_step * 2.0);
        let (mut error, mut p1, mut v1) = midpoint_error(t, dt, &last_p, last_v);

        if error > params.tolerance {
            while error > params.tolerance && dt > params.min_step {
                dt /= params.step_factor;
                let (e, p, v) = midpoint_error(t, dt, &last_p, last_v);
                error = e;
                p1 = p;
                v1 = v;
            }
        } else {
            while error < params.tolerance && dt < max_step {
                dt = (dt * params.step_factor).min(max_step);
                let (e, p, v) = midpoint_error(t, dt, &last_p, last_v);
                error = e;
                p1 = p;
                v1 = v;
            }
        }

        t += dt;
        last_p = p1;
        last_v = v1;
        proc.sample(t, &last_p, &last_v);
    }
}
