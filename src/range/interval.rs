//! Contiguous stretches of the version line.
//!
//! Every comparator set in a range collapses to one `Interval`; a whole
//! range is a union of them.

use super::version::Version;
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bound {
    Unbounded,
    Included(Version),
    Excluded(Version),
}

impl Bound {
    fn version(&self) -> Option<&Version> {
        match self {
            Bound::Unbounded => None,
            Bound::Included(v) | Bound::Excluded(v) => Some(v),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interval {
    pub lower: Bound,
    pub upper: Bound,
}

impl Interval {
    pub fn full() -> Self {
        Self {
            lower: Bound::Unbounded,
            upper: Bound::Unbounded,
        }
    }

    /// Canonical interval containing nothing.
    pub fn empty() -> Self {
        Self {
            lower: Bound::Excluded(Version::new(0, 0, 0)),
            upper: Bound::Excluded(Version::new(0, 0, 0)),
        }
    }

    pub fn at_least(v: Version) -> Self {
        Self {
            lower: Bound::Included(v),
            upper: Bound::Unbounded,
        }
    }

    pub fn greater_than(v: Version) -> Self {
        Self {
            lower: Bound::Excluded(v),
            upper: Bound::Unbounded,
        }
    }

    pub fn below(v: Version) -> Self {
        Self {
            lower: Bound::Unbounded,
            upper: Bound::Excluded(v),
        }
    }

    pub fn at_most(v: Version) -> Self {
        Self {
            lower: Bound::Unbounded,
            upper: Bound::Included(v),
        }
    }

    pub fn exactly(v: Version) -> Self {
        Self {
            lower: Bound::Included(v.clone()),
            upper: Bound::Included(v),
        }
    }

    /// Half-open `[lower, upper)`.
    pub fn between(lower: Version, upper: Version) -> Self {
        Self {
            lower: Bound::Included(lower),
            upper: Bound::Excluded(upper),
        }
    }

    pub fn intersect(&self, other: &Interval) -> Interval {
        Interval {
            lower: tighter_lower(&self.lower, &other.lower),
            upper: tighter_upper(&self.upper, &other.upper),
        }
    }

    pub fn is_empty(&self) -> bool {
        match (&self.lower, &self.upper) {
            (Bound::Unbounded, _) | (_, Bound::Unbounded) => false,
            (Bound::Included(lo), Bound::Included(hi)) => lo > hi,
            (lo, hi) => match (lo.version(), hi.version()) {
                (Some(lo), Some(hi)) => lo >= hi,
                _ => false,
            },
        }
    }

    pub fn overlaps(&self, other: &Interval) -> bool {
        !self.intersect(other).is_empty()
    }

    pub fn contains(&self, v: &Version) -> bool {
        let above = match &self.lower {
            Bound::Unbounded => true,
            Bound::Included(lo) => v >= lo,
            Bound::Excluded(lo) => v > lo,
        };
        let below = match &self.upper {
            Bound::Unbounded => true,
            Bound::Included(hi) => v <= hi,
            Bound::Excluded(hi) => v < hi,
        };
        above && below
    }
}

fn tighter_lower(a: &Bound, b: &Bound) -> Bound {
    match (a.version(), b.version()) {
        (None, _) => b.clone(),
        (_, None) => a.clone(),
        (Some(va), Some(vb)) => match va.cmp(vb) {
            Ordering::Greater => a.clone(),
            Ordering::Less => b.clone(),
            Ordering::Equal if matches!(a, Bound::Excluded(_)) => a.clone(),
            Ordering::Equal => b.clone(),
        },
    }
}

fn tighter_upper(a: &Bound, b: &Bound) -> Bound {
    match (a.version(), b.version()) {
        (None, _) => b.clone(),
        (_, None) => a.clone(),
        (Some(va), Some(vb)) => match va.cmp(vb) {
            Ordering::Less => a.clone(),
            Ordering::Greater => b.clone(),
            Ordering::Equal if matches!(a, Bound::Excluded(_)) => a.clone(),
            Ordering::Equal => b.clone(),
        },
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "<0.0.0-0");
        }
        let lower = match &self.lower {
            Bound::Unbounded => None,
            Bound::Included(v) => Some(format!(">={}", v)),
            Bound::Excluded(v) => Some(format!(">{}", v)),
        };
        let upper = match &self.upper {
            Bound::Unbounded => None,
            Bound::Included(v) => Some(format!("<={}", v)),
            Bound::Excluded(v) => Some(format!("<{}", v)),
        };
        match (lower, upper) {
            (None, None) => write!(f, "*"),
            (Some(lo), None) => write!(f, "{}", lo),
            (None, Some(hi)) => write!(f, "{}", hi),
            (Some(lo), Some(hi)) => write!(f, "{} {}", lo, hi),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_touching_bounds() {
        // [10, 12) and [12, inf) share no version
        assert!(!Interval::between(v("10"), v("12")).overlaps(&Interval::at_least(v("12"))));
        // [10, 12] and [12, inf) share 12.0.0
        let closed = Interval {
            lower: Bound::Included(v("10")),
            upper: Bound::Included(v("12")),
        };
        assert!(closed.overlaps(&Interval::at_least(v("12"))));
    }

    #[test]
    fn test_exclusive_point_is_empty() {
        let i = Interval {
            lower: Bound::Included(v("1.2.3")),
            upper: Bound::Excluded(v("1.2.3")),
        };
        assert!(i.is_empty());
        assert!(!Interval::exactly(v("1.2.3")).is_empty());
        assert!(Interval::empty().is_empty());
    }

    #[test]
    fn test_intersect_picks_tighter_bounds() {
        let a = Interval::at_least(v("10"));
        let b = Interval::below(v("14"));
        let both = a.intersect(&b);
        assert_eq!(both, Interval::between(v("10"), v("14")));
        assert_eq!(both.to_string(), ">=10.0.0 <14.0.0");
    }

    #[test]
    fn test_exclusive_wins_ties() {
        let a = Interval::at_least(v("2"));
        let b = Interval::greater_than(v("2"));
        assert_eq!(a.intersect(&b).lower, Bound::Excluded(v("2")));
        assert_eq!(b.intersect(&a).lower, Bound::Excluded(v("2")));
    }

    #[test]
    fn test_contains() {
        let i = Interval::between(v("1.2.0"), v("1.3.0"));
        assert!(i.contains(&v("1.2.0")));
        assert!(i.contains(&v("1.2.9")));
        assert!(!i.contains(&v("1.3.0")));
        assert!(Interval::full().contains(&v("0.0.1")));
    }
}
