//! Evidence commands - list artifacts and verify run manifests

use anyhow::{bail, Result};
use colored::Colorize;
use std::path::Path;

use crate::evidence::{verify_manifest, ArtifactState, EvidenceStore, RunManifest};

/// Print every file in the evidence directory with its size.
pub fn list(dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        bail!("Evidence directory not found: {}", dir.display());
    }
    let store = EvidenceStore::open(dir)?;
    let files = store.list()?;

    if files.is_empty() {
        println!("{} No evidence files found", "─".dimmed());
        return Ok(());
    }

    println!(
        "{} {} evidence files in {}",
        "→".cyan().bold(),
        files.len(),
        dir.display()
    );
    for file in files {
        println!("  {:<48} {}", file.name, format!("({} bytes)", file.bytes).dimmed());
    }
    Ok(())
}

/// Re-hash the artifacts a manifest lists. Returns whether all are intact.
pub fn verify(manifest_path: &Path) -> Result<bool> {
    let manifest = RunManifest::load(manifest_path)?;
    let checks = verify_manifest(manifest_path)?;

    println!(
        "{} Run {} ({}, {})",
        "→".cyan().bold(),
        manifest.run_id,
        manifest.phase,
        manifest.overall
    );

    let mut intact = true;
    for check in &checks {
        let path = check.path.display().to_string();
        match &check.state {
            ArtifactState::Intact => println!("  {} {}", "✓".green().bold(), path),
            ArtifactState::Modified { actual_sha256 } => {
                intact = false;
                println!(
                    "  {} {} {}",
                    "✗".red().bold(),
                    path,
                    format!("modified (sha256 {actual_sha256})").red()
                );
            }
            ArtifactState::Missing => {
                intact = false;
                println!("  {} {} {}", "✗".red().bold(), path, "missing".red());
            }
        }
    }

    if intact {
        println!("{} {} artifacts intact", "✓".green().bold(), checks.len());
    }
    Ok(intact)
}
