//! External detector process
//!
//! Runs a command once per file with the source on stdin. The command
//! must print a JSON array of `{"name", "requiredVersion", "line"?}`
//! objects on stdout, the shape `js-features-used` produces.

use super::{DetectError, DetectedFeature, FeatureDetector};
use std::io::Write;
use std::process::{Command, Stdio};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct CommandDetector {
    program: String,
    args: Vec<String>,
    display: String,
}

impl CommandDetector {
    /// Build from a command line; arguments are split on whitespace.
    /// Returns `None` for a blank command.
    pub fn from_command_line(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
            display: command_line.trim().to_string(),
        })
    }

    fn spawn_error(&self, source: std::io::Error) -> DetectError {
        DetectError::Spawn {
            command: self.display.clone(),
            source,
        }
    }
}

impl FeatureDetector for CommandDetector {
    fn name(&self) -> &str {
        &self.display
    }

    fn detect(&self, source: &str) -> Result<Vec<DetectedFeature>, DetectError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        // Feed stdin from a separate thread so a chatty child cannot
        // deadlock on a full stdout pipe.
        let stdin = child.stdin.take();
        let output = std::thread::scope(|scope| {
            let writer = scope.spawn(move || match stdin {
                Some(mut stdin) => stdin.write_all(source.as_bytes()),
                None => Ok(()),
            });
            let output = child.wait_with_output();
            let written = writer
                .join()
                .unwrap_or_else(|_| Err(std::io::Error::other("stdin writer panicked")));
            output.and_then(|output| {
                // A child that exits without reading its input is fine
                match written {
                    Err(e) if e.kind() != std::io::ErrorKind::BrokenPipe => Err(e),
                    _ => Ok(output),
                }
            })
        })
        .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(DetectError::Failed {
                command: self.display.clone(),
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let features: Vec<DetectedFeature> =
            serde_json::from_slice(&output.stdout).map_err(|source| DetectError::Output {
                command: self.display.clone(),
                source,
            })?;
        debug!(command = %self.display, count = features.len(), "external detector finished");
        Ok(features)
    }
}
