//! Path verifier
//!
//! One compile + solve cycle per path. Every call gets a fresh compiler, so
//! results never depend on earlier calls. Failures of any kind come back as
//! an `Unknown` verdict; nothing propagates past `verify_path_exploitability`.

use super::compiler::ConstraintCompiler;
use super::solvers::{default_backend, SolverBackend, SolverLimits, SolverResult};
use crate::config::VerificationConfig;
use crate::features::smt::domain::{
    PolicyStatement, ProofResult, VerificationError, VerificationResult, VerificationSummary,
};
use crate::shared::models::{AttackPath, ExecutionContext};
use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

pub struct PathVerifier {
    backend: Arc<dyn SolverBackend>,
    limits: SolverLimits,
    parallel_batch: bool,
    worker_threads: usize,
}

impl Default for PathVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl PathVerifier {
    /// Built-in solver with the default verification settings
    pub fn new() -> Self {
        Self::from_config(&VerificationConfig::default())
    }

    pub fn from_config(config: &VerificationConfig) -> Self {
        Self {
            backend: default_backend(),
            limits: SolverLimits::new(config.timeout(), config.max_search_nodes),
            parallel_batch: config.parallel_batch,
            worker_threads: config.effective_workers(),
        }
    }

    /// Swap the solver backend
    pub fn with_backend(mut self, backend: Arc<dyn SolverBackend>) -> Self {
        self.backend = backend;
        self
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn limits(&self) -> &SolverLimits {
        &self.limits
    }

    /// Verify one path against `policies` under `context`
    ///
    /// An empty `policies` slice asserts nothing and is trivially
    /// exploitable; callers wanting a default set substitute it first.
    pub fn verify_path_exploitability(
        &self,
        path: &AttackPath,
        policies: &[PolicyStatement],
        context: &ExecutionContext,
        timeout_ms: u64,
    ) -> ProofResult {
        let start = Instant::now();
        let limits = self.limits.with_timeout_ms(timeout_ms);
        let mut compiler = ConstraintCompiler::new();

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            compiler.add_policy_constraints(policies)?;
            compiler.add_execution_context(context);
            compiler.verify_satisfiable(self.backend.as_ref(), &limits)
        }))
        .unwrap_or_else(|panic| Err(VerificationError::Internal(panic_message(panic))));

        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        let proof = match outcome {
            Ok(result) => self.package(path, &compiler, result, elapsed_ms),
            Err(err) => {
                tracing::error!("Verification failed for {}: {}", path, err);
                ProofResult {
                    result: VerificationResult::Unknown,
                    path: path.clone(),
                    constraints_satisfied: None,
                    num_constraints: 0,
                    solver_time_ms: elapsed_ms,
                    model: None,
                    counterexample: None,
                    explanation: format!("Verification error: {}", err),
                    constraints_used: Vec::new(),
                }
            }
        };

        tracing::debug!(
            "Verified {} with {} ({} constraints): {}",
            path,
            self.backend.name(),
            proof.num_constraints,
            proof.result
        );
        proof
    }

    fn package(
        &self,
        path: &AttackPath,
        compiler: &ConstraintCompiler,
        result: SolverResult,
        elapsed_ms: f64,
    ) -> ProofResult {
        let verdict = result.to_verdict();
        let (constraints_satisfied, model, counterexample, explanation) = match result {
            SolverResult::Sat(model) => (
                Some(true),
                model,
                None,
                format!(
                    "Path {} is EXPLOITABLE under the given constraints. \
                     Solver found satisfying assignment in {:.1}ms.",
                    path, elapsed_ms
                ),
            ),
            SolverResult::Unsat => (
                Some(false),
                None,
                Some(BTreeMap::from([(
                    "reason".to_string(),
                    "All constraints unsatisfiable".to_string(),
                )])),
                format!(
                    "Path {} is BLOCKED. No satisfying assignment exists (UNSAT in {:.1}ms).",
                    path, elapsed_ms
                ),
            ),
            SolverResult::Unknown => (
                None,
                None,
                None,
                format!(
                    "Verification result UNKNOWN (solver returned unknown after {:.1}ms) for path {}.",
                    elapsed_ms, path
                ),
            ),
        };

        ProofResult {
            result: verdict,
            path: path.clone(),
            constraints_satisfied,
            num_constraints: compiler.num_constraints(),
            solver_time_ms: elapsed_ms,
            model,
            counterexample,
            explanation,
            constraints_used: compiler.constraint_names(),
        }
    }

    /// Verify each path independently; results line up with `paths`
    pub fn batch_verify_paths(
        &self,
        paths: &[AttackPath],
        policies: &[PolicyStatement],
        context: &ExecutionContext,
    ) -> Vec<ProofResult> {
        let timeout_ms = u64::try_from(self.limits.timeout.as_millis()).unwrap_or(u64::MAX);
        let verify = |path: &AttackPath| {
            self.verify_path_exploitability(path, policies, context, timeout_ms)
        };

        let results: Vec<ProofResult> = if self.parallel_batch && paths.len() > 1 {
            self.verify_parallel(paths, &verify)
        } else {
            paths.iter().map(verify).collect()
        };

        let summary = VerificationSummary::from_results(&results);
        tracing::info!(
            "Verified {} paths: {} exploitable, {} blocked, {} unknown",
            summary.total,
            summary.exploitable,
            summary.blocked,
            summary.unknown
        );
        results
    }

    #[cfg(feature = "parallel")]
    fn verify_parallel<F>(&self, paths: &[AttackPath], verify: &F) -> Vec<ProofResult>
    where
        F: Fn(&AttackPath) -> ProofResult + Sync,
    {
        use rayon::prelude::*;

        match rayon::ThreadPoolBuilder::new()
            .num_threads(self.worker_threads)
            .build()
        {
            Ok(pool) => pool.install(|| paths.par_iter().map(verify).collect()),
            Err(err) => {
                tracing::warn!("Verification pool unavailable ({}); verifying sequentially", err);
                paths.iter().map(verify).collect()
            }
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn verify_parallel<F>(&self, paths: &[AttackPath], verify: &F) -> Vec<ProofResult>
    where
        F: Fn(&AttackPath) -> ProofResult + Sync,
    {
        paths.iter().map(verify).collect()
    }
}

fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "solver panicked".to_string()
    }
}
