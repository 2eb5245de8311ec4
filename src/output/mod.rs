//! Report rendering (text and JSON)
//!
//! Text output uses the log symbols ✔ ✖ ⚠ ℹ, colored when stdout is a
//! terminal and `NO_COLOR` is unset, and wraps to the terminal width.
//! JSON output is a single object on one line.

use crate::audit::{AuditRun, FileError};
use crate::compat::IncompatibilityGroup;
use crate::error::AuditError;
use nu_ansi_term::Color;
use serde::Serialize;
use std::path::{Path, PathBuf};

const SUCCESS: &str = "✔";
const ERROR: &str = "✖";
const WARNING: &str = "⚠";
const INFO: &str = "ℹ";

/// Continuation lines and hints sit under the text, past the symbol
const INDENT: &str = "  ";

pub struct OutputFormatter {
    json_mode: bool,
    use_colors: bool,
    max_width: Option<usize>,
}

impl Default for OutputFormatter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport<'a> {
    declared_range: &'a str,
    compatible: bool,
    files_scanned: usize,
    usages_checked: usize,
    suggested_range: Option<String>,
    incompatibilities: Vec<JsonIncompatibility<'a>>,
    file_errors: Vec<JsonFileError<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonIncompatibility<'a> {
    file: String,
    feature: &'a str,
    required_version: &'a str,
    line: Option<usize>,
    suggested_range: String,
}

#[derive(Serialize)]
struct JsonFileError<'a> {
    file: String,
    message: &'a str,
}

impl OutputFormatter {
    pub fn new() -> Self {
        let is_tty = atty::is(atty::Stream::Stdout);
        let use_colors = is_tty && std::env::var_os("NO_COLOR").is_none();

        // Piped output is never wrapped
        let max_width = if is_tty {
            terminal_size::terminal_size().map(|(w, _)| w.0 as usize)
        } else {
            None
        };

        Self {
            json_mode: false,
            use_colors,
            max_width,
        }
    }

    pub fn set_json_mode(&mut self, enabled: bool) {
        self.json_mode = enabled;
    }

    pub fn with_colors(mut self, enabled: bool) -> Self {
        self.use_colors = enabled;
        self
    }

    pub fn with_width(mut self, width: Option<usize>) -> Self {
        self.max_width = width;
        self
    }

    pub fn is_json(&self) -> bool {
        self.json_mode
    }

    /// The `--verbose` preamble listing the files about to be checked
    pub fn file_list(&self, files: &[PathBuf]) -> String {
        let noun = if files.len() == 1 { "file" } else { "files" };
        let mut output = self.line(INFO, Color::Blue, &format!("Checking {} {}", files.len(), noun));
        for file in files {
            output.push_str(INDENT);
            output.push_str(&display_path(file));
            output.push('\n');
        }
        output
    }

    pub fn report(&self, run: &AuditRun) -> String {
        if self.json_mode {
            self.json_report(run)
        } else {
            self.text_report(run)
        }
    }

    pub fn error(&self, err: &AuditError) -> String {
        if self.json_mode {
            let mut json = err.to_json();
            json.push('\n');
            json
        } else {
            self.line(ERROR, Color::Red, &err.to_string())
        }
    }

    fn text_report(&self, run: &AuditRun) -> String {
        let result = &run.result;
        let mut output = String::new();

        for group in result.grouped() {
            output.push_str(&self.line(ERROR, Color::Red, &incompatibility_message(&group, &result.declared_range)));
            output.push_str(&self.hint(&format!(
                "Remove the use of {} or change the engine field to {}",
                group.feature,
                group.remediation()
            )));
        }

        for file_error in &run.file_errors {
            output.push_str(&self.line(WARNING, Color::Yellow, &file_error_message(file_error)));
        }

        if result.overall_compatible {
            output.push_str(&self.line(SUCCESS, Color::Green, "No incompatibilities found"));
        } else {
            if let Some(range) = result.suggested_range() {
                output.push_str(&self.line(
                    INFO,
                    Color::Blue,
                    &format!("The smallest engine range that supports every feature used is {}", range),
                ));
            }
            let count = result.incompatible.len();
            let files = result.files_affected();
            output.push_str(&self.line(
                ERROR,
                Color::Red,
                &format!(
                    "Found {} {} in {} {}",
                    count,
                    if count == 1 { "incompatibility" } else { "incompatibilities" },
                    files,
                    if files == 1 { "file" } else { "files" }
                ),
            ));
        }

        output
    }

    fn json_report(&self, run: &AuditRun) -> String {
        let result = &run.result;
        let report = JsonReport {
            declared_range: &result.declared_range,
            compatible: result.overall_compatible,
            files_scanned: run.files_scanned,
            usages_checked: result.usages_checked,
            suggested_range: result.suggested_range(),
            incompatibilities: result
                .incompatible
                .iter()
                .map(|v| JsonIncompatibility {
                    file: display_path(&v.file),
                    feature: &v.feature.name,
                    required_version: &v.feature.required_version,
                    line: v.feature.line,
                    suggested_range: v.remediation(),
                })
                .collect(),
            file_errors: run
                .file_errors
                .iter()
                .map(|e| JsonFileError {
                    file: display_path(&e.file),
                    message: &e.message,
                })
                .collect(),
        };

        let mut json = serde_json::to_string(&report).unwrap_or_else(|e| {
            format!(r#"{{"error_code":"SERIALIZATION","message":"{}"}}"#, e)
        });
        json.push('\n');
        json
    }

    /// One symbol-prefixed message, wrapped with continuation lines
    /// indented under the text.
    fn line(&self, symbol: &str, color: Color, text: &str) -> String {
        let symbol = if self.use_colors {
            color.paint(symbol).to_string()
        } else {
            symbol.to_string()
        };
        let mut output = String::new();
        for (i, chunk) in self.wrap(text, INDENT.len()).iter().enumerate() {
            if i == 0 {
                output.push_str(&symbol);
                output.push(' ');
            } else {
                output.push_str(INDENT);
            }
            output.push_str(chunk);
            output.push('\n');
        }
        output
    }

    fn hint(&self, text: &str) -> String {
        let mut output = String::new();
        for chunk in self.wrap(text, INDENT.len() * 2) {
            output.push_str(INDENT);
            output.push_str(INDENT);
            if self.use_colors {
                output.push_str(&Color::DarkGray.paint(chunk).to_string());
            } else {
                output.push_str(&chunk);
            }
            output.push('\n');
        }
        output
    }

    /// Greedy word wrap; words longer than the line are left whole.
    fn wrap(&self, text: &str, indent: usize) -> Vec<String> {
        let width = match self.max_width {
            Some(width) if width > indent + 20 => width - indent,
            _ => return vec![text.to_string()],
        };

        let mut lines = Vec::new();
        let mut current = String::new();
        let mut current_len = 0;
        for word in text.split_whitespace() {
            let word_len = word.chars().count();
            if current_len > 0 && current_len + 1 + word_len > width {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.push_str(word);
            current_len += word_len;
        }
        if !current.is_empty() || lines.is_empty() {
            lines.push(current);
        }
        lines
    }
}

fn display_path(path: &Path) -> String {
    if path.is_absolute() {
        path.display().to_string()
    } else {
        format!("./{}", path.display())
    }
}

fn incompatibility_message(group: &IncompatibilityGroup, range: &str) -> String {
    let mut message = format!(
        "{} uses {} which is not supported on all versions in the range {}",
        display_path(&group.file),
        group.feature,
        range
    );

    let lines = group
        .lines
        .iter()
        .map(|l| l.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    match (group.occurrences, group.lines.len()) {
        (1, 0) => {}
        (1, _) => message.push_str(&format!(" (line {})", lines)),
        (n, 0) => message.push_str(&format!(" ({} occurrences)", n)),
        (n, 1) => message.push_str(&format!(" ({} occurrences, line {})", n, lines)),
        (n, _) => message.push_str(&format!(" ({} occurrences, lines {})", n, lines)),
    }
    message
}

fn file_error_message(error: &FileError) -> String {
    format!(
        "{} could not be analyzed: {}",
        display_path(&error.file),
        error.message
    )
}
