//! Semantic versions and the partial versions that appear inside ranges.

use super::RangeError;
use std::cmp::Ordering;
use std::fmt;

/// One dot-separated prerelease identifier.
///
/// Variant order matters: numeric identifiers sort before alphanumeric ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Prerelease {
    Numeric(u64),
    Alpha(String),
}

impl fmt::Display for Prerelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prerelease::Numeric(n) => write!(f, "{}", n),
            Prerelease::Alpha(s) => write!(f, "{}", s),
        }
    }
}

/// A fully specified version, ordered by semver 2.0 precedence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre: Vec<Prerelease>,
}

impl Version {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            pre: Vec::new(),
        }
    }

    /// Parse a concrete version; partial versions like `12` or `7.6` are
    /// zero-filled, wildcards are rejected.
    pub fn parse(input: &str) -> Result<Self, RangeError> {
        let partial = Partial::parse(input)?;
        if !partial.is_concrete() {
            return Err(RangeError::InvalidVersion(input.to_string()));
        }
        partial
            .floor()
            .ok_or_else(|| RangeError::InvalidVersion(input.to_string()))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.patch.cmp(&other.patch))
            .then_with(|| match (self.pre.is_empty(), other.pre.is_empty()) {
                (true, true) => Ordering::Equal,
                // A release outranks any of its prereleases
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => self.pre.cmp(&other.pre),
            })
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if !self.pre.is_empty() {
            let pre: Vec<String> = self.pre.iter().map(|p| p.to_string()).collect();
            write!(f, "-{}", pre.join("."))?;
        }
        Ok(())
    }
}

/// A version as written in a range: trailing components may be missing
/// or wildcards (`x`, `X`, `*`). Once a component is a wildcard, every
/// component after it is too.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partial {
    pub major: Option<u64>,
    pub minor: Option<u64>,
    pub patch: Option<u64>,
    pub pre: Vec<Prerelease>,
    /// Some component was written as `x`, `X` or `*` rather than omitted.
    pub wildcard: bool,
}

impl Partial {
    pub fn parse(input: &str) -> Result<Self, RangeError> {
        let invalid = || RangeError::InvalidVersion(input.to_string());

        let text = input.trim();
        let text = text
            .strip_prefix('v')
            .or_else(|| text.strip_prefix('V'))
            .unwrap_or(text);
        if text.is_empty() {
            return Err(invalid());
        }

        // Build metadata never affects precedence
        let text = match text.split_once('+') {
            Some((head, build)) => {
                if !valid_identifiers(build) {
                    return Err(invalid());
                }
                head
            }
            None => text,
        };

        let (core, pre) = match text.split_once('-') {
            Some((core, pre)) => {
                if !valid_identifiers(pre) {
                    return Err(invalid());
                }
                (core, Some(pre))
            }
            None => (text, None),
        };

        let parts: Vec<&str> = core.split('.').collect();
        if parts.len() > 3 {
            return Err(invalid());
        }

        let mut components = [None; 3];
        let mut wildcard_seen = false;
        for (slot, part) in components.iter_mut().zip(&parts) {
            let value = match *part {
                "x" | "X" | "*" => None,
                digits if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => {
                    Some(digits.parse::<u64>().map_err(|_| invalid())?)
                }
                _ => return Err(invalid()),
            };
            if value.is_none() {
                wildcard_seen = true;
            }
            *slot = if wildcard_seen { None } else { value };
        }

        let [major, minor, patch] = components;
        let pre = match pre {
            Some(pre) => {
                // Prerelease tags only make sense on a complete version
                if patch.is_none() {
                    return Err(invalid());
                }
                pre.split('.')
                    .map(|id| match id.parse::<u64>() {
                        Ok(n) if id.bytes().all(|b| b.is_ascii_digit()) => Prerelease::Numeric(n),
                        _ => Prerelease::Alpha(id.to_string()),
                    })
                    .collect()
            }
            None => Vec::new(),
        };

        Ok(Self {
            major,
            minor,
            patch,
            pre,
            wildcard: wildcard_seen,
        })
    }

    /// The bare wildcard (`*`, `x`) matching every version.
    pub fn is_any(&self) -> bool {
        self.major.is_none()
    }

    /// All three components present.
    pub fn is_full(&self) -> bool {
        self.patch.is_some()
    }

    /// No wildcard anywhere; omitted trailing components are fine.
    pub fn is_concrete(&self) -> bool {
        self.major.is_some() && !self.wildcard
    }

    /// Lowest version the partial can denote, zero-filling missing parts.
    pub fn floor(&self) -> Option<Version> {
        let major = self.major?;
        Some(Version {
            major,
            minor: self.minor.unwrap_or(0),
            patch: self.patch.unwrap_or(0),
            pre: self.pre.clone(),
        })
    }

    /// First version past everything the partial denotes as an X-range:
    /// `1` gives `2.0.0`, `1.2` gives `1.3.0`. Full versions have no ceiling.
    pub fn ceiling(&self) -> Option<Version> {
        let major = self.major?;
        match (self.minor, self.patch) {
            (None, _) => Some(Version::new(major.saturating_add(1), 0, 0)),
            (Some(minor), None) => Some(Version::new(major, minor.saturating_add(1), 0)),
            (Some(_), Some(_)) => None,
        }
    }
}

fn valid_identifiers(text: &str) -> bool {
    text.split('.').all(|id| {
        !id.is_empty() && id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_parse_partial_versions() {
        assert_eq!(v("12"), Version::new(12, 0, 0));
        assert_eq!(v("7.6"), Version::new(7, 6, 0));
        assert_eq!(v("v16.11.1"), Version::new(16, 11, 1));
    }

    #[test]
    fn test_wildcards_are_not_versions() {
        assert!(Version::parse("*").is_err());
        assert!(Version::parse("x").is_err());
        assert!(Version::parse("12.x").is_err());
        assert!(Version::parse("").is_err());
        assert!(Version::parse("1.2.3.4").is_err());
        assert!(Version::parse("1.a").is_err());
        assert!(Version::parse(">=1").is_err());
    }

    #[test]
    fn test_ordering() {
        assert!(v("1.2.3") < v("1.2.4"));
        assert!(v("1.10.0") > v("1.9.9"));
        assert!(v("1.0.0-alpha") < v("1.0.0"));
        assert!(v("1.0.0-alpha") < v("1.0.0-alpha.1"));
        assert!(v("1.0.0-alpha.1") < v("1.0.0-alpha.beta"));
        assert!(v("1.0.0-beta.2") < v("1.0.0-beta.11"));
        assert_eq!(v("1.0.0+build.5"), v("1.0.0"));
    }

    #[test]
    fn test_wildcard_swallows_rest() {
        let p = Partial::parse("1.x.3").unwrap();
        assert_eq!(p.major, Some(1));
        assert_eq!(p.minor, None);
        assert_eq!(p.patch, None);
    }

    #[test]
    fn test_prerelease_requires_full_version() {
        assert!(Partial::parse("1.2-beta").is_err());
        assert!(Partial::parse("1.2.3-beta..1").is_err());
        assert!(Partial::parse("1.2.3-rc.1").is_ok());
    }

    #[test]
    fn test_floor_and_ceiling() {
        let p = Partial::parse("1.2").unwrap();
        assert_eq!(p.floor(), Some(Version::new(1, 2, 0)));
        assert_eq!(p.ceiling(), Some(Version::new(1, 3, 0)));

        let p = Partial::parse("4").unwrap();
        assert_eq!(p.ceiling(), Some(Version::new(5, 0, 0)));

        assert_eq!(Partial::parse("1.2.3").unwrap().ceiling(), None);
        assert_eq!(Partial::parse("*").unwrap().floor(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(v("1.2.3-rc.1").to_string(), "1.2.3-rc.1");
        assert_eq!(v("14").to_string(), "14.0.0");
    }
}
