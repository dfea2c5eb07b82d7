//! Pluggable deliverable checks
//!
//! Each check probes one aspect of the system under test and returns a
//! [`VerificationResult`], writing exactly one evidence artifact on the way.
//! Expected failures (missing file, missing table, unreachable endpoint) are
//! reported as `Status::Fail`. Only infrastructure failures, such as an
//! unwritable evidence directory, come back as `Err`.

pub mod api_endpoints;
pub mod database_schema;
pub mod file_structure;
pub mod result;

use anyhow::Result;
use chrono::Utc;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::Specification;
use crate::evidence::{EvidenceRef, EvidenceStore};

pub use api_endpoints::ApiEndpointCheck;
pub use database_schema::DatabaseSchemaCheck;
pub use file_structure::FileStructureCheck;
pub use result::{Status, VerificationResult};

/// Per-request timeout for endpoint probes (10 seconds)
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Concurrent endpoint probes per API check
pub const DEFAULT_API_WORKERS: usize = 4;

/// Which probe a check performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckKind {
    FileStructure,
    DatabaseSchema,
    ApiEndpoints,
}

impl CheckKind {
    /// Name shown in reports
    pub fn component(self) -> &'static str {
        match self {
            Self::FileStructure => "File Structure",
            Self::DatabaseSchema => "Database Schema",
            Self::ApiEndpoints => "API Endpoints",
        }
    }

    /// Evidence kind and `check_type` field
    pub fn evidence_kind(self) -> &'static str {
        match self {
            Self::FileStructure => "file_structure",
            Self::DatabaseSchema => "database_schema",
            Self::ApiEndpoints => "api_endpoints",
        }
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.component())
    }
}

/// Everything a check needs besides the specification.
///
/// Passed explicitly so checks can be built in isolation (tests point `root`
/// and the evidence store at temp directories).
#[derive(Debug)]
pub struct CheckContext<'a> {
    /// Directory that relative paths in the specification resolve against
    pub root: PathBuf,
    pub evidence: &'a EvidenceStore,
    /// Identifies the run in every artifact
    pub run_id: String,
    pub request_timeout: Duration,
    pub api_workers: usize,
}

impl<'a> CheckContext<'a> {
    pub fn new(root: impl Into<PathBuf>, evidence: &'a EvidenceStore, run_id: &str) -> Self {
        Self {
            root: root.into(),
            evidence,
            run_id: run_id.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            api_workers: DEFAULT_API_WORKERS,
        }
    }

    /// Resolve a specification path against the project root.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let candidate = Path::new(path);
        if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.root.join(candidate)
        }
    }

    /// Write an artifact, stamping the common header fields first.
    pub fn record(
        &self,
        kind: &str,
        check_type: &str,
        mut document: serde_json::Value,
    ) -> Result<EvidenceRef> {
        if let Some(map) = document.as_object_mut() {
            map.insert("timestamp".into(), Utc::now().to_rfc3339().into());
            map.insert("check_type".into(), check_type.into());
            map.insert("run_id".into(), self.run_id.clone().into());
        }
        self.evidence.write_json(kind, &document)
    }

    /// Write an error-category artifact for a check that could not complete.
    pub fn record_error(
        &self,
        kind: &str,
        check_type: &str,
        error_type: &str,
        error: &str,
    ) -> Result<EvidenceRef> {
        self.record(
            kind,
            check_type,
            serde_json::json!({
                "error": error,
                "error_type": error_type,
            }),
        )
    }
}

/// A single probe against the system under test
pub trait Check: Send + Sync {
    fn kind(&self) -> CheckKind;

    /// Probe, write one evidence artifact, and return the verdict.
    fn execute(&self, spec: &Specification, ctx: &CheckContext<'_>)
        -> Result<VerificationResult>;
}

/// The fixed pipeline: file structure, then database, then API.
pub fn default_pipeline() -> Vec<Box<dyn Check>> {
    vec![
        Box::new(FileStructureCheck),
        Box::new(DatabaseSchemaCheck),
        Box::new(ApiEndpointCheck),
    ]
}
