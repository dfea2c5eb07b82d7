//! Verification engine: the command surface drivers call into
//!
//! Only configuration errors and failure to create the evidence directory
//! escape from here. Everything a check runs into is folded into its result.

use anyhow::Result;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use crate::checks::{CheckContext, VerificationResult, DEFAULT_API_WORKERS, DEFAULT_REQUEST_TIMEOUT};
use crate::config::{self, EnvOverrides, Specification};
use crate::evidence::{EvidenceStore, RunManifest, DEFAULT_EVIDENCE_DIR};
use crate::report::{Report, Reporter};
use crate::runner::VerificationRunner;

/// Phase verified when a driver does not name one
pub const DEFAULT_PHASE: &str = "phase2";

/// Runtime options that are not part of the specification
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Directory relative specification paths resolve against
    pub root: PathBuf,
    pub evidence_dir: PathBuf,
    pub parallel: bool,
    pub api_workers: usize,
    pub request_timeout: Duration,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            evidence_dir: PathBuf::from(DEFAULT_EVIDENCE_DIR),
            parallel: true,
            api_workers: DEFAULT_API_WORKERS,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl RunOptions {
    /// Options rooted at `root`, with evidence kept under it.
    pub fn rooted_at(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            evidence_dir: root.join(DEFAULT_EVIDENCE_DIR),
            root,
            ..Self::default()
        }
    }
}

pub struct Engine {
    spec: Specification,
    options: RunOptions,
    store: EvidenceStore,
    runner: VerificationRunner,
    last_phase: String,
}

impl Engine {
    /// Build an engine over an already loaded specification.
    pub fn new(spec: Specification, options: RunOptions) -> Result<Self> {
        let store = EvidenceStore::open(&options.evidence_dir)?;
        let runner = VerificationRunner::default().with_parallel(options.parallel);
        Ok(Self {
            spec,
            options,
            store,
            runner,
            last_phase: DEFAULT_PHASE.to_string(),
        })
    }

    /// Load (or create) the specification at `config_path`, then build.
    pub fn from_config(config_path: &Path, options: RunOptions) -> Result<Self> {
        let spec = config::load_with_overrides(config_path, &EnvOverrides::from_env())?;
        Self::new(spec, options)
    }

    /// Replace the check pipeline (tests, custom drivers).
    pub fn with_runner(mut self, runner: VerificationRunner) -> Self {
        self.runner = runner.with_parallel(self.options.parallel);
        self
    }

    pub fn specification(&self) -> &Specification {
        &self.spec
    }

    pub fn evidence(&self) -> &EvidenceStore {
        &self.store
    }

    /// Results of the most recent run
    pub fn results(&self) -> &[VerificationResult] {
        self.runner.results()
    }

    /// Run every check, persist the report and the run manifest.
    pub fn run_verification(&mut self, phase: &str) -> Result<Report> {
        let run_id = Uuid::new_v4().to_string();
        let started_at = Utc::now();
        info!(run_id = %run_id, phase, project = %self.spec.project_name, "run started");

        let mut ctx = CheckContext::new(&self.options.root, &self.store, &run_id);
        ctx.request_timeout = self.options.request_timeout;
        ctx.api_workers = self.options.api_workers.max(1);

        let results = self.runner.run(phase, &self.spec, &ctx);
        self.last_phase = phase.to_string();

        let report = Reporter::new(&self.spec.project_name, phase).render(results, &self.store)?;

        let manifest = RunManifest::build(
            &run_id,
            phase,
            &self.spec.project_name,
            started_at,
            results,
            &report.evidence,
        );
        match manifest.persist(&self.store) {
            Ok(manifest_ref) => info!(
                run_id = %run_id,
                overall = %report.overall,
                manifest = %manifest_ref.path.display(),
                "run finished"
            ),
            Err(e) => warn!(
                run_id = %run_id,
                overall = %report.overall,
                error = %format!("{e:#}"),
                "run finished without a manifest"
            ),
        }
        Ok(report)
    }

    /// Re-render the most recent results as a new persisted report.
    ///
    /// Before any run this renders an empty result list.
    pub fn generate_report(&self) -> Result<String> {
        let reporter = Reporter::new(&self.spec.project_name, &self.last_phase);
        Ok(reporter.render(self.runner.results(), &self.store)?.text)
    }
}
