//! Append-only evidence directory
//!
//! Every check writes one JSON artifact here before returning its verdict, and
//! every report render writes one text file. Files are never rewritten: names
//! combine a second-resolution timestamp with a per-store sequence number, and
//! creation uses create-new semantics so a name already taken (by another
//! process, or an earlier store over the same directory) is skipped rather than
//! overwritten.

pub mod manifest;
pub mod naming;

#[cfg(test)]
mod tests;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

pub use manifest::{verify_manifest, ArtifactCheck, ArtifactState, RunManifest};
pub use naming::artifact_file_name;

/// Default evidence directory, relative to the working directory
pub const DEFAULT_EVIDENCE_DIR: &str = "verification_evidence";

/// Name of the appended log file inside the evidence directory
pub const LOG_FILE_NAME: &str = "verification.log";

/// Give up after this many consecutive name collisions
const MAX_NAME_ATTEMPTS: u32 = 10_000;

/// Pointer to a written artifact plus its content digest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceRef {
    pub path: PathBuf,
    pub sha256: String,
    pub bytes: u64,
}

/// Entry returned by [`EvidenceStore::list`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvidenceFile {
    pub name: String,
    pub bytes: u64,
}

/// Handle on the evidence directory, shared by reference across checks.
#[derive(Debug)]
pub struct EvidenceStore {
    dir: PathBuf,
    sequence: AtomicU64,
}

impl EvidenceStore {
    /// Open (creating if needed) the evidence directory.
    ///
    /// Failing to create the directory is the one evidence failure that is
    /// fatal to a run.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).with_context(|| {
            format!("Failed to create evidence directory: {}", dir.display())
        })?;
        Ok(Self {
            dir,
            sequence: AtomicU64::new(0),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn log_path(&self) -> PathBuf {
        self.dir.join(LOG_FILE_NAME)
    }

    /// Write a pretty-printed JSON artifact of the given kind.
    pub fn write_json(&self, kind: &str, document: &serde_json::Value) -> Result<EvidenceRef> {
        let mut json = serde_json::to_string_pretty(document)
            .with_context(|| format!("Failed to serialize {kind} evidence"))?;
        json.push('\n');
        self.write_new(kind, "json", json.as_bytes())
    }

    /// Write a plain-text artifact (reports).
    pub fn write_text(&self, kind: &str, text: &str) -> Result<EvidenceRef> {
        self.write_new(kind, "txt", text.as_bytes())
    }

    fn write_new(&self, kind: &str, extension: &str, content: &[u8]) -> Result<EvidenceRef> {
        let now = Utc::now();

        for _ in 0..MAX_NAME_ATTEMPTS {
            let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);
            let path = self
                .dir
                .join(artifact_file_name(kind, now, sequence, extension));

            let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => file,
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(e).with_context(|| {
                        format!("Failed to create evidence file: {}", path.display())
                    })
                }
            };

            file.write_all(content)
                .and_then(|()| file.sync_all())
                .with_context(|| format!("Failed to write evidence file: {}", path.display()))?;

            debug!(path = %path.display(), bytes = content.len(), "evidence written");

            return Ok(EvidenceRef {
                path,
                sha256: sha256_hex(content),
                bytes: content.len() as u64,
            });
        }

        bail!(
            "Could not find a free evidence file name for '{kind}' in {}",
            self.dir.display()
        )
    }

    /// All files in the evidence directory, sorted by name.
    pub fn list(&self) -> Result<Vec<EvidenceFile>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to read {}", self.dir.display()))?
        {
            let entry = entry?;
            let metadata = entry.metadata()?;
            if metadata.is_file() {
                files.push(EvidenceFile {
                    name: entry.file_name().to_string_lossy().to_string(),
                    bytes: metadata.len(),
                });
            }
        }
        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }
}

/// Lowercase hex SHA-256 of `bytes`
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
