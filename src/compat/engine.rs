//! Compatibility decision engine
//!
//! A usage requiring version `v` is incompatible when the declared range
//! shares at least one version with `<v`: some version the project claims
//! to support lacks the feature. The engine holds no state and does no
//! I/O, so the same range and usages always give the same result.

use super::report::AuditResult;
use super::usage::{FeatureUsage, Verdict};
use crate::error::AuditError;
use crate::range::{NodeSemver, RangeArithmetic};
use std::collections::HashMap;
use tracing::trace;

#[derive(Debug, Default, Clone)]
pub struct CompatEngine<R = NodeSemver> {
    ranges: R,
}

impl CompatEngine<NodeSemver> {
    pub fn new() -> Self {
        Self { ranges: NodeSemver }
    }
}

impl<R: RangeArithmetic> CompatEngine<R> {
    pub fn with_ranges(ranges: R) -> Self {
        Self { ranges }
    }

    /// Fail fast on a declared range that does not parse.
    pub fn validate_declared(&self, declared: &str) -> Result<(), AuditError> {
        if self.ranges.is_valid(declared) {
            Ok(())
        } else {
            Err(AuditError::InvalidRange {
                range: declared.to_string(),
                source: None,
            })
        }
    }

    /// Judge a single usage. `declared` must already be valid.
    pub fn check(&self, declared: &str, usage: &FeatureUsage) -> Result<Verdict, AuditError> {
        let compatible = !self.deficient_overlap(declared, usage)?;
        Ok(Verdict::new(usage.clone(), compatible))
    }

    /// Judge every usage against `declared`.
    ///
    /// An invalid declared range aborts before any usage is looked at; an
    /// unparseable required version aborts the evaluation as a data error.
    pub fn evaluate<I>(&self, declared: &str, usages: I) -> Result<AuditResult, AuditError>
    where
        I: IntoIterator<Item = FeatureUsage>,
    {
        self.validate_declared(declared)?;

        // Outcome depends only on the required version, so cache per version
        let mut decided: HashMap<String, bool> = HashMap::new();
        let mut verdicts = Vec::new();
        for usage in usages {
            let overlap = match decided.get(&usage.required_version) {
                Some(&overlap) => overlap,
                None => {
                    let overlap = self.deficient_overlap(declared, &usage)?;
                    decided.insert(usage.required_version.clone(), overlap);
                    overlap
                }
            };
            trace!(feature = %usage.name, required = %usage.required_version, compatible = !overlap);
            verdicts.push(Verdict::new(usage, !overlap));
        }

        Ok(AuditResult::from_verdicts(declared, verdicts))
    }

    fn deficient_overlap(&self, declared: &str, usage: &FeatureUsage) -> Result<bool, AuditError> {
        let invalid = || AuditError::InvalidRequiredVersion {
            file: usage.file.clone(),
            feature: usage.name.clone(),
            version: usage.required_version.clone(),
        };

        let version = usage.required_version.trim();
        if !self.ranges.is_valid_version(version) {
            return Err(invalid());
        }
        let deficient = format!("<{}", version);
        self.ranges
            .intersects(declared, &deficient)
            .map_err(|_| invalid())
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::range::{Version, VersionRange};
    use proptest::prelude::*;

    fn arb_version() -> impl Strategy<Value = (u64, u64, u64)> {
        (0u64..20, 0u64..4, 0u64..4)
    }

    fn arb_comparator() -> impl Strategy<Value = String> {
        (
            prop_oneof![
                Just(""),
                Just(">="),
                Just(">"),
                Just("<"),
                Just("<="),
                Just("^"),
                Just("~")
            ],
            arb_version(),
            0usize..3,
        )
            .prop_map(|(op, (major, minor, patch), parts)| match parts {
                0 => format!("{}{}", op, major),
                1 => format!("{}{}.{}", op, major, minor),
                _ => format!("{}{}.{}.{}", op, major, minor, patch),
            })
    }

    fn arb_range() -> impl Strategy<Value = String> {
        prop::collection::vec(prop::collection::vec(arb_comparator(), 1..3), 1..3).prop_map(
            |sets| {
                sets.iter()
                    .map(|set| set.join(" "))
                    .collect::<Vec<_>>()
                    .join(" || ")
            },
        )
    }

    fn arb_usages() -> impl Strategy<Value = Vec<FeatureUsage>> {
        prop::collection::vec(
            (0usize..4, arb_version()).prop_map(|(file, (major, minor, patch))| {
                FeatureUsage::new(
                    format!("feature-{}", major % 5),
                    format!("{}.{}.{}", major, minor, patch),
                    format!("src/{}.js", file),
                )
            }),
            0..12,
        )
    }

    /// Brute-force search for a release in the declared range that sits
    /// below the requirement.
    fn reference_incompatible(declared: &VersionRange, required: &Version) -> bool {
        for major in 0..22u64 {
            for minor in 0..6u64 {
                for patch in 0..6u64 {
                    let probe = Version::new(major, minor, patch);
                    if probe < *required && declared.satisfies(&probe) {
                        return true;
                    }
                }
            }
        }
        false
    }

    proptest! {
        #[test]
        fn incompatible_iff_declared_meets_deficient(
            declared in arb_range(),
            (major, minor, patch) in arb_version(),
        ) {
            let required = format!("{}.{}.{}", major, minor, patch);
            let verdict = CompatEngine::new()
                .check(&declared, &FeatureUsage::new("f", required.clone(), "a.js"))
                .unwrap();
            let range = VersionRange::parse(&declared).unwrap();
            let deficient = VersionRange::below(&required).unwrap();
            prop_assert_eq!(!verdict.compatible, range.intersects(&deficient));
            // A concrete deficient release in range always condemns the usage
            if reference_incompatible(&range, &Version::new(major, minor, patch)) {
                prop_assert!(!verdict.compatible);
            }
        }

        #[test]
        fn evaluation_is_idempotent(declared in arb_range(), usages in arb_usages()) {
            let engine = CompatEngine::new();
            let first = engine.evaluate(&declared, usages.clone()).unwrap();
            let second = engine.evaluate(&declared, usages).unwrap();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn evaluation_ignores_usage_order(declared in arb_range(), usages in arb_usages()) {
            let engine = CompatEngine::new();
            let forward = engine.evaluate(&declared, usages.clone()).unwrap();
            let mut reversed = usages;
            reversed.reverse();
            let backward = engine.evaluate(&declared, reversed).unwrap();

            prop_assert_eq!(forward.overall_compatible, backward.overall_compatible);
            let mut a: Vec<_> = forward.incompatible.iter().map(|v| v.feature.clone()).collect();
            let mut b: Vec<_> = backward.incompatible.iter().map(|v| v.feature.clone()).collect();
            a.sort_by(|x, y| (&x.file, &x.name, &x.required_version).cmp(&(&y.file, &y.name, &y.required_version)));
            b.sort_by(|x, y| (&x.file, &x.name, &x.required_version).cmp(&(&y.file, &y.name, &y.required_version)));
            prop_assert_eq!(a, b);
        }

        #[test]
        fn floor_of_plain_lower_bound_is_compatible((major, minor, patch) in arb_version()) {
            let version = format!("{}.{}.{}", major, minor, patch);
            let declared = format!(">={}", version);
            prop_assert!(CompatEngine::new()
                .check(&declared, &FeatureUsage::new("f", version, "a.js"))
                .unwrap()
                .compatible);
        }
    }
}
