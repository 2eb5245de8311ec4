//! Audit pipeline
//!
//! Reads each selected file, runs the detector over it and hands every
//! detected usage to the compatibility engine. Files are analyzed on a
//! small pool of scoped threads; results are put back in file order
//! before evaluation so a run is reproducible.
//!
//! A file that cannot be read or analyzed is recorded as a `FileError`
//! and the run carries on with the rest.

use crate::compat::{AuditResult, CompatEngine, FeatureUsage};
use crate::detect::FeatureDetector;
use crate::error::{AuditError, EXIT_ANALYSIS, EXIT_COMPATIBLE, EXIT_INCOMPATIBLE};
use crate::range::VersionRange;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Upper bound on worker threads when none is requested.
pub const MAX_DEFAULT_JOBS: usize = 8;

/// A file that could not be analyzed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileError {
    pub file: PathBuf,
    pub message: String,
}

/// Everything a run produced.
#[derive(Debug, Clone)]
pub struct AuditRun {
    pub result: AuditResult,
    pub file_errors: Vec<FileError>,
    pub files_scanned: usize,
    pub usages_seen: usize,
}

impl AuditRun {
    /// Incompatibilities win over file errors; file errors turn an
    /// otherwise clean run into an analysis failure.
    pub fn exit_code(&self) -> i32 {
        if !self.result.overall_compatible {
            EXIT_INCOMPATIBLE
        } else if !self.file_errors.is_empty() {
            EXIT_ANALYSIS
        } else {
            EXIT_COMPATIBLE
        }
    }
}

pub struct Auditor<D> {
    declared: VersionRange,
    detector: D,
    engine: CompatEngine,
    jobs: usize,
}

impl<D: FeatureDetector> Auditor<D> {
    pub fn new(declared: VersionRange, detector: D) -> Self {
        Self {
            declared,
            detector,
            engine: CompatEngine::new(),
            jobs: num_cpus::get().clamp(1, MAX_DEFAULT_JOBS),
        }
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub fn declared(&self) -> &VersionRange {
        &self.declared
    }

    /// Analyze `files` (relative to `root`) and evaluate every usage.
    pub fn run(&self, root: &Path, files: &[PathBuf]) -> Result<AuditRun, AuditError> {
        info!(
            files = files.len(),
            range = %self.declared,
            detector = self.detector.name(),
            "starting audit"
        );

        let mut usages = Vec::new();
        let mut file_errors = Vec::new();
        for outcome in self.analyze_all(root, files) {
            match outcome {
                Ok(found) => usages.extend(found),
                Err(e) => {
                    warn!(file = %e.file.display(), error = %e.message, "skipping file");
                    file_errors.push(e);
                }
            }
        }

        let usages_seen = usages.len();
        let result = self.engine.evaluate(self.declared.as_str(), usages)?;
        debug!(
            usages = usages_seen,
            incompatible = result.incompatible.len(),
            "evaluation finished"
        );

        Ok(AuditRun {
            result,
            file_errors,
            files_scanned: files.len(),
            usages_seen,
        })
    }

    fn analyze_all(
        &self,
        root: &Path,
        files: &[PathBuf],
    ) -> Vec<Result<Vec<FeatureUsage>, FileError>> {
        let jobs = self.jobs.min(files.len());
        if jobs <= 1 {
            return files.iter().map(|f| self.analyze_file(root, f)).collect();
        }

        // Contiguous chunks keep reassembly a plain concatenation
        let chunk_size = files.len().div_ceil(jobs);
        std::thread::scope(|scope| {
            let workers: Vec<_> = files
                .chunks(chunk_size)
                .map(|chunk| {
                    scope.spawn(move || {
                        chunk
                            .iter()
                            .map(|f| self.analyze_file(root, f))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            workers
                .into_iter()
                .flat_map(|worker| match worker.join() {
                    Ok(outcomes) => outcomes,
                    Err(panic) => std::panic::resume_unwind(panic),
                })
                .collect()
        })
    }

    fn analyze_file(&self, root: &Path, file: &Path) -> Result<Vec<FeatureUsage>, FileError> {
        let fail = |message: String| FileError {
            file: file.to_path_buf(),
            message,
        };

        let source = fs::read_to_string(root.join(file)).map_err(|e| fail(e.to_string()))?;
        let detected = self
            .detector
            .detect(&source)
            .map_err(|e| fail(e.to_string()))?;
        debug!(file = %file.display(), features = detected.len(), "analyzed");

        Ok(detected
            .into_iter()
            .map(|d| FeatureUsage::from_detected(file, d))
            .collect())
    }
}
