//! Report rendering
//!
//! Rendering is a pure function of the result list plus a timestamp: the same
//! results always produce the same text apart from the `Timestamp:` line.
//! Persisting the text as a `verification_report_*.txt` artifact is a side
//! effect of [`Reporter::render`].

use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use std::path::Path;
use tracing::info;

use crate::checks::{Status, VerificationResult};
use crate::evidence::{EvidenceRef, EvidenceStore};

/// Evidence kind for persisted reports
pub const REPORT_KIND: &str = "verification_report";

const RULE_WIDTH: usize = 60;
const TIMESTAMP_PREFIX: &str = "Timestamp: ";

/// A rendered and persisted report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub text: String,
    pub passed: usize,
    pub total: usize,
    pub overall: Status,
    pub evidence: EvidenceRef,
}

impl Report {
    pub fn path(&self) -> &Path {
        &self.evidence.path
    }

    pub fn is_pass(&self) -> bool {
        self.overall.is_pass()
    }
}

/// Overall status: PASS iff every result passed. No check is weighted.
pub fn overall_status(results: &[VerificationResult]) -> Status {
    Status::from_passed(results.iter().all(|r| r.is_pass()))
}

/// `"<passed>/<total> checks passed"`
pub fn summary_line(results: &[VerificationResult]) -> String {
    let passed = results.iter().filter(|r| r.is_pass()).count();
    format!("{}/{} checks passed", passed, results.len())
}

fn glyph(status: Status) -> &'static str {
    match status {
        Status::Pass => "✓",
        Status::Fail => "✗",
    }
}

/// Drop the timestamp line, leaving the deterministic part of a report.
pub fn without_timestamp(text: &str) -> String {
    text.lines()
        .filter(|line| !line.starts_with(TIMESTAMP_PREFIX))
        .collect::<Vec<_>>()
        .join("\n")
}

pub struct Reporter {
    project_name: String,
    phase: String,
}

impl Reporter {
    pub fn new(project_name: impl Into<String>, phase: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            phase: phase.into(),
        }
    }

    /// Render `results` as of `at` without touching the filesystem.
    pub fn render_text(&self, results: &[VerificationResult], at: DateTime<Utc>) -> String {
        let rule = "=".repeat(RULE_WIDTH);
        let mut lines = vec![
            rule.clone(),
            "VERIFICATION REPORT".to_string(),
            rule.clone(),
            format!(
                "{TIMESTAMP_PREFIX}{}",
                at.to_rfc3339_opts(SecondsFormat::Secs, true)
            ),
            format!("Project: {}", self.project_name),
            format!("Phase: {}", self.phase),
            String::new(),
        ];

        for result in results {
            lines.push(format!(
                "{} {}: {}",
                glyph(result.status()),
                result.component(),
                result.status()
            ));
            lines.push(format!("   Details: {}", result.details()));
            if let Some(evidence) = result.evidence() {
                lines.push(format!("   Evidence: {}", evidence.display()));
            }
            lines.push(String::new());
        }

        lines.push(rule.clone());
        lines.push(format!("SUMMARY: {}", summary_line(results)));
        lines.push(format!("OVERALL STATUS: {}", overall_status(results)));
        lines.push(rule);

        let mut text = lines.join("\n");
        text.push('\n');
        text
    }

    /// Render `results` and persist the text to the evidence directory.
    pub fn render(&self, results: &[VerificationResult], store: &EvidenceStore) -> Result<Report> {
        let text = self.render_text(results, Utc::now());
        let evidence = store.write_text(REPORT_KIND, &text)?;
        let overall = overall_status(results);
        let passed = results.iter().filter(|r| r.is_pass()).count();

        info!(
            path = %evidence.path.display(),
            passed,
            total = results.len(),
            overall = %overall,
            "report written"
        );

        Ok(Report {
            text,
            passed,
            total: results.len(),
            overall,
            evidence,
        })
    }
}
