//! Doctor command - check verification prerequisites

use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use super::EngineArgs;
use crate::checks::database_schema::sqlite_path;
use crate::config;

/// One prerequisite row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prerequisite {
    pub name: String,
    pub ok: bool,
    /// Missing optional prerequisites do not fail the doctor
    pub required: bool,
}

impl Prerequisite {
    fn new(name: impl Into<String>, ok: bool, required: bool) -> Self {
        Self {
            name: name.into(),
            ok,
            required,
        }
    }
}

/// Evaluate prerequisites without printing.
pub fn check(args: &EngineArgs) -> Vec<Prerequisite> {
    let mut rows = vec![
        Prerequisite::new(
            format!("project root {}", args.root.display()),
            args.root.is_dir(),
            true,
        ),
        Prerequisite::new(
            format!("specification {}", args.config.display()),
            args.config.is_file(),
            true,
        ),
    ];

    let evidence_ok = args.evidence_dir.is_dir() || writable_parent(&args.evidence_dir);
    rows.push(Prerequisite::new(
        format!("evidence directory {}", args.evidence_dir.display()),
        evidence_ok,
        true,
    ));

    // The rest needs a readable specification
    let Ok(spec) = config::read(&args.config) else {
        return rows;
    };

    let database = sqlite_path(&spec.database.connector)
        .map(|p| {
            let path = Path::new(p);
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                args.root.join(path)
            }
        });
    rows.push(Prerequisite::new(
        format!("database {}", spec.database.connector),
        database.is_some_and(|p| p.is_file()),
        false,
    ));
    rows.push(Prerequisite::new(
        "bot token configured",
        spec.has_bot_token(),
        false,
    ));
    rows
}

fn writable_parent(dir: &Path) -> bool {
    match dir.parent() {
        Some(parent) if parent.as_os_str().is_empty() => true,
        Some(parent) => parent.is_dir(),
        None => false,
    }
}

/// Print the prerequisite table. Returns false if a required one is missing.
pub fn execute(args: &EngineArgs) -> Result<bool> {
    println!("\n{}", "Prerequisites".bold());
    println!("{}", "─".repeat(40).dimmed());

    let rows = check(args);
    for row in &rows {
        let status = match (row.ok, row.required) {
            (true, _) => "✓ PASS".green().bold(),
            (false, true) => "✗ FAIL".red().bold(),
            (false, false) => "─ MISSING".yellow(),
        };
        println!("  {:<50} {}", row.name, status);
    }

    let ready = rows.iter().all(|r| r.ok || !r.required);
    println!();
    if ready {
        println!("{} Ready to verify", "✓".green().bold());
    } else {
        println!("{} Required prerequisites missing", "✗".red().bold());
    }
    Ok(ready)
}
