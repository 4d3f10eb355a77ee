use std::fmt::Display;

/// A closed time interval, in TDB Julian days.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    lo: f64,
    hi: f64,
}

impl Interval {
    pub fn new(lo: f64, hi: f64) -> Interval {
        if lo <= hi {
            Self { lo, hi }
        } else {
            Self { lo: hi, hi: lo }
        }
    }

    pub fn point(val: f64) -> Self {
        Self { lo: val, hi: val }
    }

    /// An interval symmetric about `center`.
    pub fn around(center: f64, half_width: f64) -> Self {
        Self::new(center - half_width.abs(), center + half_width.abs())
    }

    pub fn lo(&self) -> f64 {
        self.lo
    }

    pub fn hi(&self) -> f64 {
        self.hi
    }

    pub fn width(&self) -> f64 {
        self.hi - self.lo
    }

    pub fn midpoint(&self) -> f64 {
        (self.lo + self.hi) / 2.0
    }

    pub fn contains(&self, value: f64) -> bool {
        self.lo <= value && value <= self.hi
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.lo).min(self.hi)
    }

    pub fn is_subset_of(&self, other: &Self) -> bool {
        other.lo <= self.lo && self.hi <= other.hi
    }

    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let new_lo = self.lo.max(other.lo);
        let new_hi = self.hi.min(other.hi);
        if new_lo <= new_hi {
            Some(Self {
                lo: new_lo,
                hi: new_hi,
            })
        } else {
            None
        }
    }

    /// Pulls both ends inward by `amount`, collapsing to the midpoint if the
    /// interval is too narrow.
    pub fn shrink(&self, amount: f64) -> Self {
        if self.width() > 2.0 * amount {
            Self {
                lo: self.lo + amount,
                hi: self.hi - amount,
            }
        } else {
            Self::point(self.midpoint())
        }
    }

    pub fn monotone_map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self::new(f(self.lo), f(self.hi))
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.lo, self.hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_ops() {
        let i = Interval::new(5.0, 1.0);
        assert_eq!(i.lo(), 1.0);
        assert_eq!(i.hi(), 5.0);
        assert_eq!(i.clamp(7.0), 5.0);
        assert_eq!(i.clamp(-7.0), 1.0);
        assert_eq!(i.clamp(2.0), 2.0);
        assert!(Interval::new(2.0, 3.0).is_subset_of(&i));
        assert_eq!(
            i.intersect(&Interval::new(4.0, 9.0)),
            Some(Interval::new(4.0, 5.0))
        );
        assert_eq!(i.intersect(&Interval::new(6.0, 9.0)), None);
    }

    #[test]
    fn test_shrink() {
        assert_eq!(Interval::new(0.0, 10.0).shrink(1.0), Interval::new(1.0, 9.0));
        assert_eq!(Interval::new(0.0, 1.0).shrink(1.0), Interval::point(0.5));
    }
}
