//! Source file selection
//!
//! Expands the include glob under the project root, then drops:
//! - directories
//! - paths matching the exclude glob (matched against the root-relative path)
//! - anything inside an excluded directory such as `node_modules`
//!
//! The result is sorted and de-duplicated so the same tree always yields
//! the same file list. Matching nothing is not an error.

use crate::error::AuditError;
use glob::{glob_with, MatchOptions, Pattern};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FileSetError {
    #[error("Invalid glob pattern '{pattern}': {reason}")]
    Pattern { pattern: String, reason: String },
}

impl From<FileSetError> for AuditError {
    fn from(err: FileSetError) -> Self {
        match err {
            FileSetError::Pattern { pattern, reason } => {
                AuditError::InvalidPattern { pattern, reason }
            }
        }
    }
}

fn match_options() -> MatchOptions {
    MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        // `*` should not pick up dotfiles such as `.eslintrc.js`
        require_literal_leading_dot: true,
    }
}

/// Resolve the files to analyze, as paths relative to `root`.
pub fn resolve(
    root: &Path,
    include: &str,
    exclude: Option<&str>,
    excluded_dirs: &[String],
) -> Result<Vec<PathBuf>, FileSetError> {
    let exclude = exclude
        .map(|pattern| {
            Pattern::new(pattern).map_err(|e| FileSetError::Pattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })
        })
        .transpose()?;

    let absolute_pattern = if Path::new(include).is_absolute() {
        include.to_string()
    } else {
        let root = Pattern::escape(&root.to_string_lossy());
        Path::new(&root).join(include).to_string_lossy().to_string()
    };

    let mut files: Vec<PathBuf> = glob_with(&absolute_pattern, match_options())
        .map_err(|e| FileSetError::Pattern {
            pattern: include.to_string(),
            reason: e.to_string(),
        })?
        .filter_map(Result::ok)
        .filter(|path| !path.is_dir())
        .map(|path| match path.strip_prefix(root) {
            Ok(relative) => relative.to_path_buf(),
            Err(_) => path,
        })
        .filter(|path| !in_excluded_dir(path, excluded_dirs))
        .filter(|path| match &exclude {
            Some(pattern) => !pattern.matches_path_with(path, match_options()),
            None => true,
        })
        .collect();

    files.sort();
    files.dedup();
    debug!(pattern = include, count = files.len(), "resolved files");
    Ok(files)
}

fn in_excluded_dir(path: &Path, excluded_dirs: &[String]) -> bool {
    path.components().any(|component| match component {
        Component::Normal(name) => excluded_dirs.iter().any(|dir| name == dir.as_str()),
        _ => false,
    })
}
