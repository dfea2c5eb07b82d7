//! Verdict produced by a single check execution

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::evidence::EvidenceRef;

/// Pass/fail verdict of a check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Pass,
    Fail,
}

impl Status {
    pub fn from_passed(passed: bool) -> Self {
        if passed {
            Self::Pass
        } else {
            Self::Fail
        }
    }

    pub fn is_pass(self) -> bool {
        self == Self::Pass
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one check invocation. Fields are read-only once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    component: String,
    status: Status,
    details: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    evidence: Option<EvidenceRef>,
    timestamp: DateTime<Utc>,
}

impl VerificationResult {
    pub fn new(
        component: impl Into<String>,
        status: Status,
        details: impl Into<String>,
        evidence: Option<EvidenceRef>,
    ) -> Self {
        Self {
            component: component.into(),
            status,
            details: details.into(),
            evidence,
            timestamp: Utc::now(),
        }
    }

    pub fn passed(
        component: impl Into<String>,
        details: impl Into<String>,
        evidence: Option<EvidenceRef>,
    ) -> Self {
        Self::new(component, Status::Pass, details, evidence)
    }

    pub fn failed(
        component: impl Into<String>,
        details: impl Into<String>,
        evidence: Option<EvidenceRef>,
    ) -> Self {
        Self::new(component, Status::Fail, details, evidence)
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_pass(&self) -> bool {
        self.status.is_pass()
    }

    pub fn details(&self) -> &str {
        &self.details
    }

    /// Path of the artifact written for this result
    pub fn evidence(&self) -> Option<&Path> {
        self.evidence.as_ref().map(|e| e.path.as_path())
    }

    /// Artifact with the digest taken when it was written
    pub fn evidence_ref(&self) -> Option<&EvidenceRef> {
        self.evidence.as_ref()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
