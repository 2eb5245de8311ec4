//! Feature extraction
//!
//! A detector turns a file's source text into the language features it
//! uses, each tagged with the minimum Node.js version that supports it.
//! The mapping from feature to version belongs entirely to the detector,
//! so swapping or updating one never touches the compatibility engine.
//!
//! - `BuiltinDetector`: token-pattern rules compiled into the binary
//! - `CommandDetector`: delegates to an external program speaking JSON

pub mod builtin;
pub mod external;
pub mod lexer;

pub use builtin::BuiltinDetector;
pub use external::CommandDetector;

use serde::{Deserialize, Serialize};

/// One feature occurrence reported by a detector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedFeature {
    pub name: String,
    pub required_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

#[derive(Debug, thiserror::Error)]
pub enum DetectError {
    #[error("failed to run detector '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("detector '{command}' exited with status {status}: {stderr}")]
    Failed {
        command: String,
        status: i32,
        stderr: String,
    },

    #[error("detector '{command}' produced invalid output: {source}")]
    Output {
        command: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Extracts feature usages from source text.
///
/// Implementations must be pure with respect to the source: the same text
/// always yields the same features. Failure is scoped to the one file.
pub trait FeatureDetector: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    fn detect(&self, source: &str) -> Result<Vec<DetectedFeature>, DetectError>;
}

impl<D: FeatureDetector + ?Sized> FeatureDetector for Box<D> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn detect(&self, source: &str) -> Result<Vec<DetectedFeature>, DetectError> {
        (**self).detect(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detected_feature_json_shape() {
        let parsed: Vec<DetectedFeature> =
            serde_json::from_str(r#"[{"name":"optional chaining","requiredVersion":"14.0.0"}]"#)
                .unwrap();
        assert_eq!(parsed[0].required_version, "14.0.0");
        assert_eq!(parsed[0].line, None);

        let json = serde_json::to_string(&parsed[0]).unwrap();
        assert!(json.contains("requiredVersion"));
        assert!(!json.contains("line"));
    }

    #[test]
    fn test_boxed_detector() {
        let detector: Box<dyn FeatureDetector> = Box::new(BuiltinDetector::new());
        assert_eq!(detector.name(), "builtin");
        assert!(!detector.detect("a => a").unwrap().is_empty());
    }
}
