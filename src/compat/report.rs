//! Audit result
//!
//! Aggregates per-usage verdicts into the outcome of a run, and groups
//! repeated incompatibilities for display.

use super::usage::Verdict;
use crate::error::{EXIT_COMPATIBLE, EXIT_INCOMPATIBLE};
use crate::range::Version;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// Outcome of evaluating every usage against a declared range
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditResult {
    /// The range the verdicts were computed against
    pub declared_range: String,
    /// True iff no usage was incompatible
    pub overall_compatible: bool,
    /// Incompatible verdicts, in the order the usages were supplied
    pub incompatible: Vec<Verdict>,
    /// Total usages evaluated, compatible or not
    pub usages_checked: usize,
}

/// Incompatibilities sharing a file, feature and required version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncompatibilityGroup {
    pub file: PathBuf,
    pub feature: String,
    pub required_version: String,
    /// Known line numbers, ascending
    pub lines: Vec<usize>,
    /// Occurrences, including those without a line
    pub occurrences: usize,
}

impl IncompatibilityGroup {
    pub fn remediation(&self) -> String {
        format!(">={}", self.required_version.trim())
    }
}

impl AuditResult {
    pub fn from_verdicts<I>(declared_range: &str, verdicts: I) -> Self
    where
        I: IntoIterator<Item = Verdict>,
    {
        let mut usages_checked = 0;
        let incompatible: Vec<Verdict> = verdicts
            .into_iter()
            .inspect(|_| usages_checked += 1)
            .filter(|v| !v.compatible)
            .collect();

        Self {
            declared_range: declared_range.trim().to_string(),
            overall_compatible: incompatible.is_empty(),
            incompatible,
            usages_checked,
        }
    }

    pub fn exit_code(&self) -> i32 {
        if self.overall_compatible {
            EXIT_COMPATIBLE
        } else {
            EXIT_INCOMPATIBLE
        }
    }

    /// Number of distinct files with at least one incompatibility
    pub fn files_affected(&self) -> usize {
        let mut files: Vec<&PathBuf> = self.incompatible.iter().map(|v| &v.file).collect();
        files.sort();
        files.dedup();
        files.len()
    }

    /// The narrowest `>=` range that would clear every incompatibility:
    /// the highest required version among them.
    pub fn suggested_range(&self) -> Option<String> {
        self.incompatible
            .iter()
            .filter_map(|v| {
                let raw = v.feature.required_version.trim();
                Version::parse(raw).ok().map(|parsed| (parsed, raw))
            })
            .max_by(|a, b| a.0.cmp(&b.0))
            .map(|(_, raw)| format!(">={}", raw))
    }

    /// Collapse duplicate (file, feature, version) incompatibilities,
    /// keeping the order in which each group was first seen.
    pub fn grouped(&self) -> Vec<IncompatibilityGroup> {
        let mut groups: Vec<IncompatibilityGroup> = Vec::new();
        let mut index: HashMap<(&PathBuf, &str, &str), usize> = HashMap::new();

        for verdict in &self.incompatible {
            let usage = &verdict.feature;
            let key = (
                &verdict.file,
                usage.name.as_str(),
                usage.required_version.as_str(),
            );
            let slot = *index.entry(key).or_insert_with(|| {
                groups.push(IncompatibilityGroup {
                    file: verdict.file.clone(),
                    feature: usage.name.clone(),
                    required_version: usage.required_version.clone(),
                    lines: Vec::new(),
                    occurrences: 0,
                });
                groups.len() - 1
            });

            let group = &mut groups[slot];
            group.occurrences += 1;
            if let Some(line) = usage.line {
                group.lines.push(line);
            }
        }

        for group in &mut groups {
            group.lines.sort_unstable();
            group.lines.dedup();
        }
        groups
    }
}
