//! Error types and exit codes for engine-audit
//!
//! Every failure that stops a run is an `AuditError`. Each variant has a
//! stable error code and maps to a process exit code, and can be rendered
//! as text or as JSON.

use crate::range::RangeError;
use serde::Serialize;
use std::path::PathBuf;

/// Every declared version supports every feature used.
pub const EXIT_COMPATIBLE: i32 = 0;
/// At least one feature is not supported across the declared range.
pub const EXIT_INCOMPATIBLE: i32 = 1;
/// The declared range is missing, unreadable or malformed.
pub const EXIT_CONFIGURATION: i32 = 2;
/// A detector reported a required version that is not a version.
pub const EXIT_DATA: i32 = 3;
/// Nothing incompatible was found, but some files could not be analyzed.
pub const EXIT_ANALYSIS: i32 = 4;

/// Broad class of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Data,
}

#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("Could not read {}: {source}", path.display())]
    ManifestNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not valid JSON: {source}", path.display())]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("No engines field in package.json")]
    MissingEngines,

    #[error("No node property of engines field")]
    MissingNodeEngine,

    #[error("'{range}' is not a valid semver range")]
    InvalidRange {
        range: String,
        #[source]
        source: Option<RangeError>,
    },

    #[error("{} uses {feature}, whose required version '{version}' is not a valid version", file.display())]
    InvalidRequiredVersion {
        file: PathBuf,
        feature: String,
        version: String,
    },

    #[error("Invalid glob pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

#[derive(Serialize)]
struct ErrorJson<'a> {
    error_code: &'a str,
    message: String,
    exit_code: i32,
}

impl AuditError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuditError::InvalidRequiredVersion { .. } => ErrorKind::Data,
            _ => ErrorKind::Configuration,
        }
    }

    /// Stable identifier for scripts and JSON consumers.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuditError::ManifestNotFound { .. } => "MANIFEST_NOT_FOUND",
            AuditError::ManifestParse { .. } => "MANIFEST_PARSE",
            AuditError::MissingEngines => "MISSING_ENGINES",
            AuditError::MissingNodeEngine => "MISSING_NODE_ENGINE",
            AuditError::InvalidRange { .. } => "INVALID_RANGE",
            AuditError::InvalidRequiredVersion { .. } => "INVALID_REQUIRED_VERSION",
            AuditError::InvalidPattern { .. } => "INVALID_PATTERN",
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::Configuration => EXIT_CONFIGURATION,
            ErrorKind::Data => EXIT_DATA,
        }
    }

    pub fn to_json(&self) -> String {
        let payload = ErrorJson {
            error_code: self.error_code(),
            message: self.to_string(),
            exit_code: self.exit_code(),
        };
        serde_json::to_string(&payload).unwrap_or_else(|_| {
            format!(
                r#"{{"error_code":"{}","exit_code":{}}}"#,
                self.error_code(),
                self.exit_code()
            )
        })
    }
}
