//! Run manifests: one record per run tying results to artifact digests
//!
//! A manifest lists every artifact a run produced together with its SHA-256.
//! Re-hashing the listed files later shows whether any evidence was altered or
//! removed after the fact.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::{sha256_hex, EvidenceRef, EvidenceStore};
use crate::checks::{Status, VerificationResult};

/// Evidence kind used for manifest files
pub const MANIFEST_KIND: &str = "run";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: String,
    pub phase: String,
    pub project_name: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub overall: Status,
    pub results: Vec<VerificationResult>,
    pub artifacts: Vec<EvidenceRef>,
}

impl RunManifest {
    /// Assemble a manifest from the artifacts referenced by `results` plus the
    /// rendered report. Digests are the ones taken when each file was written;
    /// paths are kept relative to the evidence directory.
    pub fn build(
        run_id: &str,
        phase: &str,
        project_name: &str,
        started_at: DateTime<Utc>,
        results: &[VerificationResult],
        report: &EvidenceRef,
    ) -> Self {
        let artifacts = results
            .iter()
            .filter_map(VerificationResult::evidence_ref)
            .chain(std::iter::once(report))
            .map(|artifact| EvidenceRef {
                path: artifact
                    .path
                    .file_name()
                    .map(PathBuf::from)
                    .unwrap_or_else(|| artifact.path.clone()),
                ..artifact.clone()
            })
            .collect();

        Self {
            run_id: run_id.to_string(),
            phase: phase.to_string(),
            project_name: project_name.to_string(),
            started_at,
            finished_at: Utc::now(),
            overall: Status::from_passed(results.iter().all(|r| r.is_pass())),
            results: results.to_vec(),
            artifacts,
        }
    }

    pub fn persist(&self, store: &EvidenceStore) -> Result<EvidenceRef> {
        let document =
            serde_json::to_value(self).context("Failed to serialize run manifest")?;
        store.write_json(MANIFEST_KIND, &document)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read run manifest: {}", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse run manifest: {}", path.display()))
    }
}

/// Integrity state of one artifact listed in a manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactState {
    Intact,
    Modified { actual_sha256: String },
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactCheck {
    pub path: PathBuf,
    pub state: ArtifactState,
}

impl ArtifactCheck {
    pub fn is_intact(&self) -> bool {
        self.state == ArtifactState::Intact
    }
}

/// Re-hash every artifact listed in the manifest at `path`.
///
/// Relative artifact paths resolve against the manifest's own directory, so
/// the result does not depend on the working directory.
pub fn verify_manifest(path: &Path) -> Result<Vec<ArtifactCheck>> {
    let manifest = RunManifest::load(path)?;
    let base = path.parent().unwrap_or_else(|| Path::new(""));

    Ok(manifest
        .artifacts
        .iter()
        .map(|artifact| {
            let state = match fs::read(base.join(&artifact.path)) {
                Ok(content) => {
                    let actual = sha256_hex(&content);
                    if actual == artifact.sha256 {
                        ArtifactState::Intact
                    } else {
                        ArtifactState::Modified {
                            actual_sha256: actual,
                        }
                    }
                }
                Err(_) => ArtifactState::Missing,
            };
            ArtifactCheck {
                path: artifact.path.clone(),
                state,
            }
        })
        .collect())
}
