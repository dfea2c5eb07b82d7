//! Init command - write the default specification file

use anyhow::{bail, Result};
use colored::Colorize;
use std::path::Path;

use crate::config::{self, EnvOverrides};

/// Write the default specification to `path`.
///
/// Refuses to replace an existing file unless `force` is set.
pub fn execute(path: &Path, force: bool) -> Result<()> {
    execute_with_overrides(path, force, &EnvOverrides::from_env())
}

pub fn execute_with_overrides(path: &Path, force: bool, overrides: &EnvOverrides) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "Specification already exists: {} (use --force to overwrite)",
            path.display()
        );
    }

    let spec = overrides.default_specification();
    config::write(path, &spec)?;

    println!(
        "{} Specification written {}",
        "✓".green().bold(),
        path.display().to_string().dimmed()
    );
    println!(
        "  {} files, {} directories, {} tables, {} endpoints",
        spec.file_structure.required_files.len(),
        spec.file_structure.required_dirs.len(),
        spec.database.required_tables.len(),
        spec.api.endpoints.len()
    );
    if !spec.has_bot_token() {
        println!(
            "  {} Bot token not configured (set {})",
            "─".dimmed(),
            config::ENV_BOT_TOKEN
        );
    }
    Ok(())
}
