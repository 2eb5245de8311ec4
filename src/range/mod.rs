//! Version range arithmetic for `engines.node` style ranges
//!
//! Ranges follow the node-semver grammar. Each comparator set becomes one
//! interval on the version line, so overlap testing reduces to pairwise
//! interval intersection.

pub mod interval;
mod parse;
pub mod version;

pub use interval::{Bound, Interval};
pub use version::{Partial, Prerelease, Version};

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    #[error("'{0}' is not a valid version")]
    InvalidVersion(String),

    #[error("'{input}' is not a valid semver range: {reason}")]
    InvalidRange { input: String, reason: String },
}

impl RangeError {
    pub(crate) fn invalid(input: &str, reason: impl Into<String>) -> Self {
        RangeError::InvalidRange {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

/// A parsed range expression, keeping the text it was written as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    raw: String,
    intervals: Vec<Interval>,
}

impl VersionRange {
    pub fn parse(input: &str) -> Result<Self, RangeError> {
        let intervals = parse::parse_range(input)?;
        Ok(Self {
            raw: input.trim().to_string(),
            intervals,
        })
    }

    /// Every version strictly below `version`.
    pub fn below(version: &str) -> Result<Self, RangeError> {
        let floor = Version::parse(version)?;
        Ok(Self {
            raw: format!("<{}", version.trim()),
            intervals: vec![Interval::below(floor)],
        })
    }

    /// True when some version satisfies both ranges.
    pub fn intersects(&self, other: &VersionRange) -> bool {
        self.intervals
            .iter()
            .any(|a| other.intervals.iter().any(|b| a.overlaps(b)))
    }

    pub fn satisfies(&self, version: &Version) -> bool {
        self.intervals.iter().any(|i| i.contains(version))
    }

    /// Syntactically valid but matches nothing, e.g. `>2 <1`.
    pub fn is_empty(&self) -> bool {
        self.intervals.iter().all(Interval::is_empty)
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl FromStr for VersionRange {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VersionRange::parse(s)
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Range operations the compatibility engine depends on.
///
/// Implementations must agree with standard version-range set semantics;
/// `NodeSemver` is the one used for `engines.node`.
pub trait RangeArithmetic: Send + Sync {
    fn is_valid(&self, range: &str) -> bool;

    /// Whether `version` names a single (possibly zero-filled) version.
    fn is_valid_version(&self, version: &str) -> bool;

    fn intersects(&self, a: &str, b: &str) -> Result<bool, RangeError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NodeSemver;

impl RangeArithmetic for NodeSemver {
    fn is_valid(&self, range: &str) -> bool {
        VersionRange::parse(range).is_ok()
    }

    fn is_valid_version(&self, version: &str) -> bool {
        Version::parse(version).is_ok()
    }

    fn intersects(&self, a: &str, b: &str) -> Result<bool, RangeError> {
        Ok(VersionRange::parse(a)?.intersects(&VersionRange::parse(b)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(s: &str) -> VersionRange {
        VersionRange::parse(s).unwrap()
    }

    #[test]
    fn test_below_is_exclusive() {
        let below = VersionRange::below("12").unwrap();
        assert_eq!(below.as_str(), "<12");
        assert!(below.satisfies(&Version::new(11, 99, 0)));
        assert!(!below.satisfies(&Version::new(12, 0, 0)));
    }

    #[test]
    fn test_below_rejects_ranges() {
        assert!(VersionRange::below(">=12").is_err());
        assert!(VersionRange::below("12 || 3").is_err());
        assert!(VersionRange::below("12.x").is_err());
        assert!(VersionRange::below("").is_err());
    }

    #[test]
    fn test_intersects() {
        assert!(range(">=10").intersects(&range("<12")));
        assert!(!range(">=14").intersects(&range("<12")));
        assert!(range(">=10 <12").intersects(&range("<14")));
        assert!(!range(">=12").intersects(&range("<12")));
        assert!(range(">=10 <14 || >=16").intersects(&range("<11")));
        assert!(!range("^14 || ^16").intersects(&range("<14")));
    }

    #[test]
    fn test_empty_set_intersects_nothing() {
        let nothing = range(">2 <1");
        assert!(nothing.is_empty());
        assert!(!nothing.intersects(&range("*")));
    }

    #[test]
    fn test_trait_object() {
        let ranges: &dyn RangeArithmetic = &NodeSemver;
        assert!(ranges.is_valid(">=8.9.0"));
        assert!(!ranges.is_valid("latest"));
        assert!(ranges.is_valid_version("7.6"));
        assert!(!ranges.is_valid_version("^7"));
        assert_eq!(ranges.intersects(">=10", "<12"), Ok(true));
        assert!(ranges.intersects("nope", "<12").is_err());
    }

    #[test]
    fn test_display_keeps_source_text() {
        assert_eq!(range("  >=10 <14 ").to_string(), ">=10 <14");
    }
}
