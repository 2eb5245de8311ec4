//! Feature usages and per-usage verdicts

use crate::detect::DetectedFeature;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// One observed use of a feature in one file.
///
/// Many usages may share a name and version; each is judged on its own.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureUsage {
    pub name: String,
    pub required_version: String,
    pub file: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl FeatureUsage {
    pub fn new(
        name: impl Into<String>,
        required_version: impl Into<String>,
        file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            required_version: required_version.into(),
            file: file.into(),
            line: None,
        }
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Attach a detector's finding to the file it came from.
    pub fn from_detected(file: &Path, detected: DetectedFeature) -> Self {
        Self {
            name: detected.name,
            required_version: detected.required_version,
            file: file.to_path_buf(),
            line: detected.line,
        }
    }
}

/// Outcome for a single usage against the declared range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub file: PathBuf,
    pub feature: FeatureUsage,
    pub compatible: bool,
}

impl Verdict {
    pub fn new(feature: FeatureUsage, compatible: bool) -> Self {
        Self {
            file: feature.file.clone(),
            feature,
            compatible,
        }
    }

    /// Smallest range that would make this usage legal.
    pub fn remediation(&self) -> String {
        format!(">={}", self.feature.required_version.trim())
    }
}
