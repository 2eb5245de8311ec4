//! Engine compatibility checking
//!
//! Decides, for each feature usage, whether every Node.js version allowed
//! by the declared `engines.node` range supports it:
//! - `usage`: feature usages and their verdicts
//! - `engine`: the decision rule
//! - `report`: aggregation and grouping for display

pub mod engine;
pub mod report;
pub mod usage;

pub use engine::CompatEngine;
pub use report::{AuditResult, IncompatibilityGroup};
pub use usage::{FeatureUsage, Verdict};
