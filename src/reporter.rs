//! Diagnostic reporting: human-readable console output and JSON

use crate::{Diagnostic, TransformOutcome};
use colored::Colorize;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Per-file report for programmatic consumers
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReport {
    pub file_path: PathBuf,
    pub changed: bool,
    pub failed: bool,
    pub diagnostics: Vec<Diagnostic>,
}

impl FileReport {
    pub fn new(path: &Path, source: &str, outcome: &TransformOutcome) -> Self {
        Self {
            file_path: path.to_path_buf(),
            changed: outcome.changed(source),
            failed: outcome.output.is_none(),
            diagnostics: outcome.diagnostics.clone(),
        }
    }
}

/// Human-readable console reporter
pub struct ConsoleReporter {
    quiet: bool,
}

impl ConsoleReporter {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    /// Print one file's outcome to stderr (stdout carries transformed source)
    pub fn report(&self, report: &FileReport) {
        if report.failed {
            eprintln!(
                "{} {}",
                "failed".red().bold(),
                report.file_path.display()
            );
        } else if !self.quiet {
            let status = if report.changed {
                "rewrote".green().bold()
            } else {
                "unchanged".dimmed()
            };
            eprintln!("{} {}", status, report.file_path.display());
        }
        for diagnostic in &report.diagnostics {
            let tag = if diagnostic.category.is_hard() {
                diagnostic.category.to_string().red().bold()
            } else {
                diagnostic.category.to_string().yellow()
            };
            eprintln!(
                "  {}:{}:{} [{}] {}",
                report.file_path.display(),
                diagnostic.location.line,
                diagnostic.location.column,
                tag,
                diagnostic.message
            );
        }
    }

    /// Print the run summary
    pub fn summary(&self, reports: &[FileReport]) {
        if self.quiet {
            return;
        }
        let changed = reports.iter().filter(|r| r.changed).count();
        let failed = reports.iter().filter(|r| r.failed).count();
        let annotations: usize = reports
            .iter()
            .flat_map(|r| r.diagnostics.iter())
            .filter(|d| !d.category.is_hard())
            .count();
        eprintln!(
            "{} file(s), {} rewritten, {} annotation(s), {} failed",
            reports.len(),
            changed,
            annotations,
            failed
        );
    }
}

/// Render all reports as a JSON array
pub fn render_json(reports: &[FileReport]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Category, Diagnostic, Location};

    fn sample_outcome() -> TransformOutcome {
        TransformOutcome {
            output: Some("after".to_string()),
            diagnostics: vec![Diagnostic {
                category: Category::UnconvertibleParametrize,
                location: Location::new(3, 1),
                message: "no direct equivalent".to_string(),
            }],
        }
    }

    #[test]
    fn report_tracks_change_and_failure() {
        let outcome = sample_outcome();
        let report = FileReport::new(Path::new("test_x.py"), "before", &outcome);
        assert!(report.changed);
        assert!(!report.failed);
        assert_eq!(report.diagnostics.len(), 1);
    }

    #[test]
    fn json_report_is_valid_and_wire_faithful() {
        let outcome = sample_outcome();
        let report = FileReport::new(Path::new("test_x.py"), "before", &outcome);
        let json = render_json(&[report]).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(
            parsed[0]["diagnostics"][0]["category"],
            "UNCONVERTIBLE-PARAMETRIZE"
        );
        assert_eq!(parsed[0]["diagnostics"][0]["location"]["line"], 3);
        assert_eq!(parsed[0]["changed"], true);
    }
}
