//! CLI command implementations
//!
//! Each command prints with `colored` decorations and returns plain data
//! (`bool` for commands whose outcome sets the exit code) so `main` owns
//! process exit.

pub mod chat;
pub mod completions;
pub mod doctor;
pub mod evidence;
pub mod init;
pub mod run;
pub mod welcome;

use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

use crate::checks::{DEFAULT_API_WORKERS, DEFAULT_REQUEST_TIMEOUT};
use crate::config::DEFAULT_CONFIG_FILE;
use crate::engine::RunOptions;
use crate::evidence::DEFAULT_EVIDENCE_DIR;

/// Options shared by every command that drives the engine
#[derive(Debug, Clone, Args)]
pub struct EngineArgs {
    /// Specification file (JSON, or TOML by extension)
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Directory evidence artifacts are written to
    #[arg(long, default_value = DEFAULT_EVIDENCE_DIR)]
    pub evidence_dir: PathBuf,

    /// Project root that relative specification paths resolve against
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Run checks one after another instead of concurrently
    #[arg(long)]
    pub sequential: bool,

    /// Concurrent endpoint probes (default: 4)
    #[arg(short, long, default_value_t = DEFAULT_API_WORKERS)]
    pub workers: usize,

    /// Per-request timeout in seconds (default: 10)
    #[arg(short, long, default_value_t = DEFAULT_REQUEST_TIMEOUT.as_secs())]
    pub timeout: u64,
}

impl Default for EngineArgs {
    fn default() -> Self {
        Self {
            config: PathBuf::from(DEFAULT_CONFIG_FILE),
            evidence_dir: PathBuf::from(DEFAULT_EVIDENCE_DIR),
            root: PathBuf::from("."),
            sequential: false,
            workers: DEFAULT_API_WORKERS,
            timeout: DEFAULT_REQUEST_TIMEOUT.as_secs(),
        }
    }
}

impl EngineArgs {
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            root: self.root.clone(),
            evidence_dir: self.evidence_dir.clone(),
            parallel: !self.sequential,
            api_workers: self.workers.max(1),
            request_timeout: Duration::from_secs(self.timeout.max(1)),
        }
    }
}
