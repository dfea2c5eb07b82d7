//! Run orchestration: execute the check pipeline and collect results
//!
//! Checks are independent: a failing or erroring check never prevents the
//! others from running. A check that returns `Err` (or panics) is recorded as
//! FAIL with a `<kind>_error` artifact, so every run yields one result per
//! registered check, in pipeline order.

use anyhow::anyhow;
use std::panic::{self, AssertUnwindSafe};
use std::thread;
use tracing::{error, info, warn};

use crate::checks::{default_pipeline, Check, CheckContext, VerificationResult};
use crate::config::Specification;

pub struct VerificationRunner {
    checks: Vec<Box<dyn Check>>,
    parallel: bool,
    results: Vec<VerificationResult>,
}

impl Default for VerificationRunner {
    fn default() -> Self {
        Self::new(default_pipeline())
    }
}

impl VerificationRunner {
    /// Runner over a custom check list; concurrent by default.
    pub fn new(checks: Vec<Box<dyn Check>>) -> Self {
        Self {
            checks,
            parallel: true,
            results: Vec::new(),
        }
    }

    /// Run checks on scoped threads (`true`) or one after another.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// Results of the most recent run
    pub fn results(&self) -> &[VerificationResult] {
        &self.results
    }

    /// Execute every registered check against `spec`.
    ///
    /// Clears the previous run's results first. All checks are joined before
    /// this returns.
    pub fn run(
        &mut self,
        phase: &str,
        spec: &Specification,
        ctx: &CheckContext<'_>,
    ) -> &[VerificationResult] {
        info!(phase, checks = self.checks.len(), parallel = self.parallel, "starting verification");
        self.results.clear();

        for section in spec.vacuous_sections() {
            warn!(section, "nothing declared; check will pass vacuously");
        }

        let results: Vec<VerificationResult> = if self.parallel {
            thread::scope(|scope| {
                let handles: Vec<_> = self
                    .checks
                    .iter()
                    .map(|check| (check, scope.spawn(move || guarded(check.as_ref(), spec, ctx))))
                    .collect();

                handles
                    .into_iter()
                    .map(|(check, handle)| {
                        let outcome = handle
                            .join()
                            .unwrap_or_else(|_| Err(anyhow!("check panicked")));
                        settle(check.as_ref(), outcome, ctx)
                    })
                    .collect()
            })
        } else {
            self.checks
                .iter()
                .map(|check| settle(check.as_ref(), guarded(check.as_ref(), spec, ctx), ctx))
                .collect()
        };

        let passed = results.iter().filter(|r| r.is_pass()).count();
        info!(phase, passed, total = results.len(), "verification finished");

        self.results = results;
        &self.results
    }
}

/// Execute one check, turning a panic into an error.
fn guarded(
    check: &dyn Check,
    spec: &Specification,
    ctx: &CheckContext<'_>,
) -> anyhow::Result<VerificationResult> {
    panic::catch_unwind(AssertUnwindSafe(|| check.execute(spec, ctx)))
        .unwrap_or_else(|_| Err(anyhow!("check panicked")))
}

/// Turn a check outcome into a result, recovering infrastructure errors.
fn settle(
    check: &dyn Check,
    outcome: anyhow::Result<VerificationResult>,
    ctx: &CheckContext<'_>,
) -> VerificationResult {
    let kind = check.kind();
    match outcome {
        Ok(result) => {
            info!(check = %kind, status = %result.status(), "check completed");
            result
        }
        Err(e) => {
            error!(check = %kind, error = %format!("{e:#}"), "check could not complete");
            let details = format!("Check could not complete: {e:#}");
            let error_kind = format!("{}_error", kind.evidence_kind());
            let evidence = match ctx.record_error(
                &error_kind,
                kind.evidence_kind(),
                "InfrastructureError",
                &format!("{e:#}"),
            ) {
                Ok(evidence) => Some(evidence),
                Err(write_err) => {
                    error!(check = %kind, error = %format!("{write_err:#}"), "failed to record error evidence");
                    None
                }
            };
            VerificationResult::failed(kind.component(), details, evidence)
        }
    }
}
