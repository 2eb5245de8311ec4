//! Project configuration
//!
//! Resolves the declared engine range from `package.json` (or a command
//! line override) together with the file selection settings:
//! - `engines` absent: `MissingEngines`
//! - `engines.node` absent: `MissingNodeEngine`
//! - `engines.node` not a valid range: `InvalidRange`, before any file is read

use crate::error::AuditError;
use crate::range::VersionRange;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_MANIFEST: &str = "package.json";
pub const DEFAULT_PATTERN: &str = "**/*.js";
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &["node_modules"];

/// The parts of `package.json` we care about; everything else is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub engines: Option<Engines>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Engines {
    /// Kept untyped so a non-string value reports as a bad range rather
    /// than a broken manifest.
    #[serde(default)]
    pub node: Option<serde_json::Value>,
}

impl Manifest {
    pub fn parse(path: &Path, content: &str) -> Result<Self, AuditError> {
        serde_json::from_str(content).map_err(|source| AuditError::ManifestParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

pub fn load_manifest(path: &Path) -> Result<Manifest, AuditError> {
    let content = fs::read_to_string(path).map_err(|source| AuditError::ManifestNotFound {
        path: path.to_path_buf(),
        source,
    })?;
    Manifest::parse(path, &content)
}

/// Extract and validate `engines.node`.
pub fn declared_range(manifest: &Manifest) -> Result<VersionRange, AuditError> {
    let engines = manifest.engines.as_ref().ok_or(AuditError::MissingEngines)?;
    match engines.node.as_ref() {
        None | Some(serde_json::Value::Null) => Err(AuditError::MissingNodeEngine),
        Some(serde_json::Value::String(range)) => validate_range(range),
        Some(other) => Err(AuditError::InvalidRange {
            range: other.to_string(),
            source: None,
        }),
    }
}

pub fn validate_range(range: &str) -> Result<VersionRange, AuditError> {
    VersionRange::parse(range).map_err(|e| AuditError::InvalidRange {
        range: range.to_string(),
        source: Some(e),
    })
}

/// Settings gathered from the command line.
#[derive(Debug, Clone)]
pub struct CliOptions {
    /// Project root; relative manifest and pattern paths resolve against it
    pub cwd: PathBuf,
    pub manifest: Option<PathBuf>,
    /// Used in place of `engines.node` when set
    pub range: Option<String>,
    pub pattern: String,
    pub exclude: Option<String>,
}

impl Default for CliOptions {
    fn default() -> Self {
        Self {
            cwd: PathBuf::from("."),
            manifest: None,
            range: None,
            pattern: DEFAULT_PATTERN.to_string(),
            exclude: None,
        }
    }
}

/// Everything a run needs to know before touching source files.
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    pub root: PathBuf,
    pub declared_range: VersionRange,
    pub include: String,
    pub exclude: Option<String>,
    pub excluded_dirs: Vec<String>,
}

impl ProjectConfig {
    pub fn resolve(options: &CliOptions) -> Result<Self, AuditError> {
        let declared_range = match &options.range {
            Some(range) => {
                debug!(range = %range, "using declared range from command line");
                validate_range(range)?
            }
            None => {
                let path = options
                    .cwd
                    .join(options.manifest.as_deref().unwrap_or(Path::new(DEFAULT_MANIFEST)));
                debug!(manifest = %path.display(), "reading declared range");
                declared_range(&load_manifest(&path)?)?
            }
        };

        Ok(Self {
            root: options.cwd.clone(),
            declared_range,
            include: options.pattern.clone(),
            exclude: options.exclude.clone(),
            excluded_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(|d| d.to_string()).collect(),
        })
    }
}
