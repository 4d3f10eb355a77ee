use std::cell::Cell;
use std::rc::Rc;

use nalgebra::{UnitQuaternion, Vector3};

use super::{OrbitProvider, OrbitSampleProc};
use crate::math::interpolation::{cubic_interpolate, cubic_interpolate_velocity, sample_index};
use crate::math::intervals::Interval;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interpolation {
    Linear,
    Cubic,
}

/// Storage precision of loaded samples. Single precision values are rounded
/// to `f32` as they are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SamplePrecision {
    Single,
    Double,
}

impl SamplePrecision {
    pub fn round(self, x: f64) -> f64 {
        match self {
            SamplePrecision::Single => x as f32 as f64,
            SamplePrecision::Double => x,
        }
    }

    pub fn round_vector(self, v: &Vector3<f64>) -> Vector3<f64> {
        v.map(|x| self.round(x))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSample {
    pub t: f64,
    pub position: Vector3<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateSample {
    pub t: f64,
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientationSample {
    pub t: f64,
    pub orientation: UnitQuaternion<f64>,
}

// One interval of a cubic Hermite spline, with tangents scaled to its length
struct Segment {
    p0: Vector3<f64>,
    v0: Vector3<f64>,
    p1: Vector3<f64>,
    v1: Vector3<f64>,
    u: f64,
    h: f64,
}

impl Segment {
    fn position(&self) -> Vector3<f64> {
        cubic_interpolate(&self.p0, &self.v0, &self.p1, &self.v1, self.u)
    }

    fn velocity(&self) -> Vector3<f64> {
        cubic_interpolate_velocity(&self.p0, &self.v0, &self.p1, &self.v1, self.u) / self.h
    }
}

fn time_span(first: Option<f64>, last: Option<f64>) -> Option<Interval> {
    Some(Interval::new(first?, last?))
}

/// A trajectory interpolated from a table of positions.
///
/// Outside the table the position is held at the first or last sample and the
/// velocity is zero.
#[derive(Debug, Clone)]
pub struct SampledOrbit {
    samples: Rc<[PositionSample]>,
    interpolation: Interpolation,
    bounding_radius: f64,
    last_index: Cell<usize>,
}

impl SampledOrbit {
    pub fn new(samples: Rc<[PositionSample]>, interpolation: Interpolation) -> Self {
        let bounding_radius = samples
            .iter()
            .map(|s| s.position.norm())
            .fold(0.0, f64::max);
        Self {
            samples,
            interpolation,
            bounding_radius,
            last_index: Cell::new(0),
        }
    }

    pub fn samples(&self) -> &[PositionSample] {
        &self.samples
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    fn index(&self, t: f64) -> usize {
        sample_index(&self.samples[..], |s| s.t, t, &self.last_index)
    }

    // Tangents at interior samples average the slopes of the neighbouring
    // intervals; the end intervals fall back to their own slope.
    fn segment(&self, t: f64, n2: usize) -> Segment {
        let s = &self.samples;
        let n_max = s.len() - 1;
        let n0 = n2.max(2) - 2;
        let n1 = n2 - 1;
        let n3 = (n2 + 1).min(n_max);

        let h = s[n2].t - s[n1].t;
        let p0 = s[n1].position;
        let p1 = s[n2].position;
        let v10 = p0 - s[n0].position;
        let v21 = p1 - p0;
        let v32 = s[n3].position - p1;

        let v0 = if n2 > 1 {
            (v10 * (0.5 / (s[n1].t - s[n0].t)) + v21 * (0.5 / h)) * h
        } else {
            v21
        };
        let v1 = if n2 < n_max {
            (v21 * (0.5 / h) + v32 * (0.5 / (s[n3].t - s[n2].t))) * h
        } else {
            v21
        };

        Segment {
            p0,
            v0,
            p1,
            v1,
            u: (t - s[n1].t) / h,
            h,
        }
    }

    /// Emits every stored sample, with velocities estimated from the
    /// neighbouring samples.
    pub fn emit_samples(&self, proc: &mut dyn OrbitSampleProc) {
        let s = &self.samples;
        let slope = |i: usize| (s[i + 1].position - s[i].position) / (s[i + 1].t - s[i].t);

        for (i, sample) in s.iter().enumerate() {
            let v = if s.len() == 1 {
                Vector3::zeros()
            } else if i == 0 {
                slope(0)
            } else if i == s.len() - 1 {
                slope(i - 1)
            } else {
                (slope(i - 1) + slope(i)) * 0.5
            };
            proc.sample(sample.t, &sample.position, &v);
        }
    }
}

impl OrbitProvider for SampledOrbit {
    fn compute_position(&self, t: f64) -> Vector3<f64> {
        let s = &self.samples;
        match s.len() {
            0 => return Vector3::zeros(),
            1 => return s[0].position,
            _ => {}
        }

        let n = self.index(t);
        if n == 0 {
            return s[0].position;
        }
        if n == s.len() {
            return s[n - 1].position;
        }
        if s[n].t == t {
            return s[n].position;
        }

        match self.interpolation {
            Interpolation::Linear => {
                let u = (t - s[n - 1].t) / (s[n].t - s[n - 1].t);
                s[n - 1].position.lerp(&s[n].position, u)
            }
            Interpolation::Cubic => self.segment(t, n).position(),
        }
    }

    fn compute_velocity(&self, t: f64) -> Option<Vector3<f64>> {
        let s = &self.samples;
        if s.len() < 2 {
            return Some(Vector3::zeros());
        }

        let n = self.index(t);
        if n == 0 || n == s.len() {
            return Some(Vector3::zeros());
        }

        let v = match self.interpolation {
            Interpolation::Linear => (s[n].position - s[n - 1].position) / (s[n].t - s[n - 1].t),
            Interpolation::Cubic => self.segment(t, n).velocity(),
        };
        Some(v)
    }

    fn period(&self) -> f64 {
        self.valid_range().map_or(0.0, |r| r.width())
    }

    fn bounding_radius(&self) -> f64 {
        self.bounding_radius
    }

    fn is_periodic(&self) -> bool {
        false
    }

    fn valid_range(&self) -> Option<Interval> {
        time_span(
            self.samples.first().map(|s| s.t),
            self.samples.last().map(|s| s.t),
        )
    }
}

/// A trajectory interpolated from a table of positions and velocities.
#[derive(Debug, Clone)]
pub struct SampledOrbitXyzv {
    samples: Rc<[StateSample]>,
    interpolation: Interpolation,
    bounding_radius: f64,
    last_index: Cell<usize>,
}

impl SampledOrbitXyzv {
    pub fn new(samples: Rc<[StateSample]>, interpolation: Interpolation) -> Self {
        let bounding_radius = samples
            .iter()
            .map(|s| s.position.norm())
            .fold(0.0, f64::max);
        Self {
            samples,
            interpolation,
            bounding_radius,
            last_index: Cell::new(0),
        }
    }

    pub fn samples(&self) -> &[StateSample] {
        &self.samples
    }

    fn index(&self, t: f64) -> usize {
        sample_index(&self.samples[..], |s| s.t, t, &self.last_index)
    }

    fn segment(&self, t: f64, n: usize) -> Segment {
        let (a, b) = (&self.samples[n - 1], &self.samples[n]);
        let h = b.t - a.t;
        Segment {
            p0: a.position,
            v0: a.velocity * h,
            p1: b.position,
            v1: b.velocity * h,
            u: (t - a.t) / h,
            h,
        }
    }

    pub fn emit_samples(&self, proc: &mut dyn OrbitSampleProc) {
        for s in self.samples.iter() {
            proc.sample(s.t, &s.position, &s.velocity);
        }
    }
}

impl OrbitProvider for SampledOrbitXyzv {
    fn compute_position(&self, t: f64) -> Vector3<f64> {
        let s = &self.samples;
        match s.len() {
            0 => return Vector3::zeros(),
            1 => return s[0].position,
            _ => {}
        }

        let n = self.index(t);
        if n == 0 {
            return s[0].position;
        }
        if n == s.len() {
            return s[n - 1].position;
        }
        if s[n].t == t {
            return s[n].position;
        }

        match self.interpolation {
            Interpolation::Linear => {
                let u = (t - s[n - 1].t) / (s[n].t - s[n - 1].t);
                s[n - 1].position.lerp(&s[n].position, u)
            }
            Interpolation::Cubic => self.segment(t, n).position(),
        }
    }

    fn compute_velocity(&self, t: f64) -> Option<Vector3<f64>> {
        let s = &self.samples;
        if s.len() < 2 {
            return Some(Vector3::zeros());
        }

        let n = self.index(t);
        if n == 0 || n == s.len() {
            return Some(Vector3::zeros());
        }

        let v = match self.interpolation {
            Interpolation::Linear => (s[n].position - s[n - 1].position) / (s[n].t - s[n - 1].t),
            Interpolation::Cubic => self.segment(t, n).velocity(),
        };
        Some(v)
    }

    fn period(&self) -> f64 {
        self.valid_range().map_or(0.0, |r| r.width())
    }

    fn bounding_radius(&self) -> f64 {
        self.bounding_radius
    }

    fn is_periodic(&self) -> bool {
        false
    }

    fn valid_range(&self) -> Option<Interval> {
        time_span(
            self.samples.first().map(|s| s.t),
            self.samples.last().map(|s| s.t),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use itertools::Itertools;

    use crate::astro::orbit::OrbitSample;

    fn wobbly(t: f64) -> Vector3<f64> {
        Vector3::new(t * t, (t * 0.7).sin() * 10.0, 3.0 - t)
    }

    fn position_samples() -> Rc<[PositionSample]> {
        [0.0, 1.0, 2.5, 3.0, 4.5, 6.0]
            .iter()
            .map(|&t| PositionSample {
                t,
                position: wobbly(t),
            })
            .collect()
    }

    #[test]
    fn test_exact_at_samples() {
        for &interp in &[Interpolation::Linear, Interpolation::Cubic] {
            let orbit = SampledOrbit::new(position_samples(), interp);
            for s in orbit.samples().iter() {
                assert_eq!(orbit.compute_position(s.t), s.position);
            }
        }
    }

    #[test]
    fn test_clamps_outside_range() {
        let orbit = SampledOrbit::new(position_samples(), Interpolation::Cubic);
        assert_eq!(orbit.compute_position(-5.0), wobbly(0.0));
        assert_eq!(orbit.compute_position(100.0), wobbly(6.0));
        assert_eq!(orbit.compute_velocity(-5.0), Some(Vector3::zeros()));
        assert_eq!(orbit.compute_velocity(100.0), Some(Vector3::zeros()));

        assert!(!orbit.is_periodic());
        assert_eq!(orbit.period(), 6.0);
        assert_eq!(orbit.valid_range(), Some(Interval::new(0.0, 6.0)));
        assert_relative_eq!(orbit.bounding_radius(), wobbly(6.0).norm());
    }

    #[test]
    fn test_linear_interpolation() {
        let orbit = SampledOrbit::new(position_samples(), Interpolation::Linear);
        let expected = (wobbly(1.0) + wobbly(2.5)) / 2.0;
        assert_relative_eq!(orbit.compute_position(1.75), expected, epsilon = 1e-12);
        assert_relative_eq!(
            orbit.compute_velocity(1.75).unwrap(),
            (wobbly(2.5) - wobbly(1.0)) / 1.5,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_cubic_velocity_is_derivative() {
        let orbit = SampledOrbit::new(position_samples(), Interpolation::Cubic);
        let h = 1e-6;
        for &t in &[0.5, 1.2, 2.9, 4.0, 5.9] {
            let numeric = (orbit.compute_position(t + h) - orbit.compute_position(t - h)) / (2.0 * h);
            assert_relative_eq!(orbit.compute_velocity(t).unwrap(), numeric, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_single_sample_is_constant() {
        let samples: Rc<[PositionSample]> = Rc::from(vec![PositionSample {
            t: 5.0,
            position: Vector3::new(1.0, 2.0, 3.0),
        }]);
        let orbit = SampledOrbit::new(samples, Interpolation::Cubic);
        assert_eq!(orbit.compute_position(0.0), Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(orbit.compute_position(9.0), Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(orbit.compute_velocity(5.0), Some(Vector3::zeros()));
    }

    #[test]
    fn test_xyzv_uses_stored_velocities() {
        // A cubic with exact derivatives is reproduced exactly
        let p = |t: f64| Vector3::new(t * t * t, -t, 2.0 * t * t);
        let v = |t: f64| Vector3::new(3.0 * t * t, -1.0, 4.0 * t);
        let samples: Rc<[StateSample]> = [0.0, 2.0, 3.0]
            .iter()
            .map(|&t| StateSample {
                t,
                position: p(t),
                velocity: v(t),
            })
            .collect();
        let orbit = SampledOrbitXyzv::new(samples, Interpolation::Cubic);

        for &t in &[0.3, 1.0, 2.0, 2.2, 2.9] {
            assert_relative_eq!(orbit.compute_position(t), p(t), epsilon = 1e-10);
            assert_relative_eq!(orbit.compute_velocity(t).unwrap(), v(t), epsilon = 1e-10);
        }
    }

    #[test]
    fn test_emitted_samples() {
        let orbit = SampledOrbit::new(position_samples(), Interpolation::Linear);
        let mut emitted: Vec<OrbitSample> = vec![];
        orbit.emit_samples(&mut emitted);

        assert_eq!(emitted.len(), 6);
        for (s, e) in orbit.samples().iter().zip_eq(emitted.iter()) {
            assert_eq!(s.t, e.t);
            assert_eq!(s.position, e.position);
        }

        // Interior velocity is the average of the two adjoining slopes
        let left = (wobbly(1.0) - wobbly(0.0)) / 1.0;
        let right = (wobbly(2.5) - wobbly(1.0)) / 1.5;
        assert_relative_eq!(emitted[1].velocity, (left + right) / 2.0, epsilon = 1e-12);
        assert_relative_eq!(emitted[0].velocity, left, epsilon = 1e-12);
    }
}
