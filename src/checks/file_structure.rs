//! File structure check - required files and directories must exist

use anyhow::{Context, Result};
use serde_json::json;
use std::fs;
use std::path::Path;
use tracing::info;

use super::{Check, CheckContext, CheckKind, VerificationResult};
use crate::config::Specification;

pub struct FileStructureCheck;

/// Split `paths` into (existing, missing) by probing under the project root.
fn partition<'a>(
    paths: impl IntoIterator<Item = &'a String>,
    ctx: &CheckContext<'_>,
) -> (Vec<String>, Vec<String>) {
    paths
        .into_iter()
        .cloned()
        .partition(|p| ctx.resolve(p).exists())
}

fn directory_listing(root: &Path) -> Result<Vec<String>> {
    let mut names = fs::read_dir(root)
        .with_context(|| format!("Failed to list {}", root.display()))?
        .map(|entry| entry.map(|e| e.file_name().to_string_lossy().to_string()))
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("Failed to list {}", root.display()))?;
    names.sort();
    Ok(names)
}

impl Check for FileStructureCheck {
    fn kind(&self) -> CheckKind {
        CheckKind::FileStructure
    }

    fn execute(&self, spec: &Specification, ctx: &CheckContext<'_>) -> Result<VerificationResult> {
        info!(check = %self.kind(), root = %ctx.root.display(), "checking file structure");

        let required = &spec.file_structure;
        let (existing_files, missing_files) = partition(&required.required_files, ctx);
        let (existing_dirs, missing_dirs) = partition(&required.required_dirs, ctx);

        let evidence = ctx.record(
            self.kind().evidence_kind(),
            self.kind().evidence_kind(),
            json!({
                "root": ctx.root.display().to_string(),
                "checked_files": required.required_files,
                "checked_dirs": required.required_dirs,
                "existing_files": existing_files,
                "existing_dirs": existing_dirs,
                "missing_files": missing_files,
                "missing_dirs": missing_dirs,
                "current_directory_contents": directory_listing(&ctx.root)?,
                "total_files_checked": required.required_files.len(),
                "total_dirs_checked": required.required_dirs.len(),
                "files_found": existing_files.len(),
                "dirs_found": existing_dirs.len(),
            }),
        )?;

        let component = self.kind().component();
        let evidence = Some(evidence);

        if !missing_files.is_empty() || !missing_dirs.is_empty() {
            let mut details = format!(
                "Missing {} files and {} directories",
                missing_files.len(),
                missing_dirs.len()
            );
            let missing: Vec<&str> = missing_files
                .iter()
                .chain(&missing_dirs)
                .map(String::as_str)
                .collect();
            details.push_str(&format!(": {}", missing.join(", ")));
            return Ok(VerificationResult::failed(component, details, evidence));
        }

        let details = if existing_files.is_empty() && existing_dirs.is_empty() {
            "No required files or directories declared (nothing to check)".to_string()
        } else {
            format!(
                "All {} files and {} directories found",
                existing_files.len(),
                existing_dirs.len()
            )
        };
        Ok(VerificationResult::passed(component, details, evidence))
    }
}
