//! Test helper functions for E2E tests

use anyhow::{Context, Result};
use attest::config::{self, Specification};
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// A temp project root with a specification file and evidence directory path
pub struct Project {
    pub dir: TempDir,
}

impl Project {
    pub fn new() -> Result<Self> {
        Ok(Self {
            dir: TempDir::new().context("Failed to create temp directory")?,
        })
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.root().join("verification_config.json")
    }

    pub fn evidence_dir(&self) -> PathBuf {
        self.root().join("verification_evidence")
    }

    pub fn write_file(&self, relative: &str, content: &str) -> Result<()> {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))
    }

    pub fn create_dir(&self, relative: &str) -> Result<()> {
        fs::create_dir_all(self.root().join(relative)).context("Failed to create directory")
    }

    /// Create a SQLite database holding the given tables.
    pub fn create_database(&self, relative: &str, tables: &[&str]) -> Result<PathBuf> {
        let path = self.root().join(relative);
        let conn = Connection::open(&path).context("Failed to create database")?;
        for table in tables {
            conn.execute_batch(&format!(
                "CREATE TABLE \"{table}\" (id INTEGER PRIMARY KEY, name TEXT NOT NULL);"
            ))?;
        }
        Ok(path)
    }

    pub fn write_spec(&self, spec: &Specification) -> Result<()> {
        config::write(&self.config_path(), spec)?;
        Ok(())
    }

    /// Evidence file names currently present, sorted
    pub fn evidence_files(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.evidence_dir())
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .map(|e| e.file_name().to_string_lossy().to_string())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }
}

/// Specification with nothing declared, so each test adds only what it needs
pub fn empty_spec(project_name: &str) -> Specification {
    let mut spec = Specification::default();
    spec.project_name = project_name.to_string();
    spec.bot_token = None;
    spec.file_structure = Default::default();
    spec.database.required_tables.clear();
    spec.api.endpoints.clear();
    spec
}

/// Run the compiled binary inside `dir`.
pub fn run_attest(dir: &Path, args: &[&str]) -> Result<Output> {
    Command::new(env!("CARGO_BIN_EXE_attest"))
        .args(args)
        .current_dir(dir)
        .env_remove("TELEGRAM_BOT_TOKEN")
        .env_remove("API_BASE_URL")
        .env_remove("DATABASE_PATH")
        .env("NO_COLOR", "1")
        .output()
        .context("Failed to run attest binary")
}
