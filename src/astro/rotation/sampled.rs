use std::cell::Cell;
use std::rc::Rc;

use nalgebra::UnitQuaternion;

use super::RotationProvider;
use crate::astro::orbit::OrientationSample;
use crate::math::interpolation::sample_index;
use crate::math::intervals::Interval;

/// Orientation interpolated between keyframes.
#[derive(Debug, Clone)]
pub struct SampledOrientation {
    samples: Rc<[OrientationSample]>,
    last_index: Cell<usize>,
}

impl SampledOrientation {
    pub fn new(samples: Rc<[OrientationSample]>) -> Self {
        Self {
            samples,
            last_index: Cell::new(0),
        }
    }

    pub fn samples(&self) -> &[OrientationSample] {
        &self.samples
    }
}

impl RotationProvider for SampledOrientation {
    fn compute_spin(&self, t: f64) -> UnitQuaternion<f64> {
        let s = &self.samples;
        match s.len() {
            0 => return UnitQuaternion::identity(),
            1 => return s[0].orientation,
            _ => {}
        }

        let n = sample_index(&self.samples[..], |s| s.t, t, &self.last_index);
        if n == 0 {
            s[0].orientation
        } else if n == s.len() {
            s[n - 1].orientation
        } else {
            let (a, b) = (&s[n - 1], &s[n]);
            let u = (t - a.t) / (b.t - a.t);
            a.orientation
                .try_slerp(&b.orientation, u, f64::EPSILON)
                .unwrap_or(a.orientation)
        }
    }

    fn period(&self) -> f64 {
        self.valid_range().map_or(0.0, |r| r.width())
    }

    fn is_periodic(&self) -> bool {
        false
    }

    fn valid_range(&self) -> Option<Interval> {
        let first = self.samples.first()?;
        let last = self.samples.last()?;
        Some(Interval::new(first.t, last.t))
    }
}
