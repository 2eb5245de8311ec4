// Library interface for engine-audit
// Lets integration tests and benchmarks drive the pipeline directly

pub mod audit;
pub mod compat;
pub mod config;
pub mod detect;
pub mod error;
pub mod files;
pub mod output;
pub mod range;

pub use audit::{AuditRun, Auditor, FileError};
pub use compat::{AuditResult, CompatEngine, FeatureUsage, Verdict};
pub use detect::{BuiltinDetector, CommandDetector, DetectedFeature, FeatureDetector};
pub use error::AuditError;
pub use range::{NodeSemver, RangeArithmetic, VersionRange};
