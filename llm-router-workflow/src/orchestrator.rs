//! Drives a task through its model chain.
//!
//! Phases run strictly in order: planning, context (when the chain has a
//! context backend), execution with sequential fallback, and review (only for
//! quality-priority tasks whose execution succeeded). Planning and context
//! failures abort the chain; an execution that still fails after every
//! fallback is carried in the results; a review failure is recorded and
//! otherwise ignored.

use llm_router_core::{
    BackendInput, ModelChain, ModelMetrics, ModelOutput, ModelRegistry, ModelResult,
    OrchestratorConfig, Phase, PhaseResult, Priority, Task,
};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use validator::Validate;

use crate::error::{OrchestratorError, PhaseSummary, Result};
use crate::retry::execute_with_retries;

/// Phases attempted so far by one `execute_chain` call.
struct ChainRun {
    current: Phase,
    results: Vec<ModelResult>,
}

impl ChainRun {
    fn new() -> Self {
        Self {
            current: Phase::Planning,
            results: Vec::new(),
        }
    }

    fn enter(&mut self, phase: Phase) {
        info!(%phase, "Entering phase");
        self.current = phase;
    }

    fn summaries(&self) -> Vec<PhaseSummary> {
        self.results
            .iter()
            .map(|r| PhaseSummary {
                phase: r.phase.unwrap_or(Phase::Execution),
                success: r.success,
                metrics: r.metrics.clone(),
            })
            .collect()
    }
}

pub struct TaskOrchestrator {
    registry: Arc<dyn ModelRegistry>,
    config: OrchestratorConfig,
}

impl TaskOrchestrator {
    pub fn new(registry: Arc<dyn ModelRegistry>) -> Self {
        Self::with_config(registry, OrchestratorConfig::default())
    }

    pub fn with_config(registry: Arc<dyn ModelRegistry>, config: OrchestratorConfig) -> Self {
        Self { registry, config }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Runs `task` end to end. Every failure comes back wrapped in
    /// [`OrchestratorError::TaskHandling`].
    #[instrument(skip(self, task), fields(task_id = %task.id, task_type = %task.task_type))]
    pub async fn handle_task(&self, task: &Task) -> Result<ModelResult> {
        match self.run_task(task).await {
            Ok(result) => {
                info!(
                    used_fallback = result.used_fallback,
                    phases = result.phases.len(),
                    "Task completed"
                );
                Ok(result)
            }
            Err(err) => {
                error!(error = %err, "Task failed");
                Err(OrchestratorError::TaskHandling {
                    task_id: task.id,
                    source: Box::new(err),
                })
            }
        }
    }

    async fn run_task(&self, task: &Task) -> Result<ModelResult> {
        task.validate()
            .map_err(|e| OrchestratorError::InvalidTask(e.into()))?;

        let chain = self
            .registry
            .get_model_chain(&task.requirements)
            .await
            .map_err(OrchestratorError::Registry)?;
        info!(?chain, "Model chain selected");

        let results = self.execute_chain(task, &chain).await?;
        aggregate_results(results)
    }

    /// Runs every phase of `chain` and returns the result of each phase in
    /// order. Fatal failures are reported as
    /// [`OrchestratorError::ChainExecution`] with the phase reached and a
    /// summary of the phases attempted.
    pub async fn execute_chain(&self, task: &Task, chain: &ModelChain) -> Result<Vec<ModelResult>> {
        let mut run = ChainRun::new();
        match self.run_phases(task, chain, &mut run).await {
            Ok(()) => Ok(run.results),
            Err(source) => Err(OrchestratorError::ChainExecution {
                phase: run.current,
                phases: run.summaries(),
                source: Box::new(source),
            }),
        }
    }

    async fn run_phases(&self, task: &Task, chain: &ModelChain, run: &mut ChainRun) -> Result<()> {
        run.enter(Phase::Planning);
        let plan = self.plan(task, chain, run).await?;

        let context = match &chain.context {
            Some(backend) => {
                run.enter(Phase::Context);
                let input = BackendInput::Context {
                    task: task.clone(),
                    plan: plan.clone(),
                };
                let result = self
                    .attempt(Phase::Context, backend.as_ref(), input)
                    .await
                    .map_err(|e| OrchestratorError::Context { source: Box::new(e) })?;
                run.results.push(result.clone());
                if !result.success {
                    return Err(OrchestratorError::Context {
                        source: Box::new(phase_failed(Phase::Context, &result)),
                    });
                }
                Some(result.output)
            }
            None => None,
        };

        run.enter(Phase::Execution);
        let execution = self.execute(task, chain, plan, context.clone()).await?;
        let executed = execution.success;
        let execution_output = execution.output.clone();
        run.results.push(execution);

        if !executed || task.requirements.priority != Priority::Quality {
            return Ok(());
        }
        if let Some(reviewer) = &chain.reviewer {
            run.enter(Phase::Review);
            let input = BackendInput::Review {
                task: task.clone(),
                result: execution_output,
                context,
            };
            let review = match self.attempt(Phase::Review, reviewer.as_ref(), input).await {
                Ok(result) => result,
                Err(err) => {
                    warn!(error = %err, "Review failed, keeping execution result");
                    ModelResult::failure(err.to_string()).with_phase(Phase::Review)
                }
            };
            run.results.push(review);
        }

        Ok(())
    }

    async fn plan(&self, task: &Task, chain: &ModelChain, run: &mut ChainRun) -> Result<ModelOutput> {
        let input = BackendInput::Planning { task: task.clone() };
        let result = self
            .attempt(Phase::Planning, chain.planner.as_ref(), input)
            .await
            .map_err(|e| OrchestratorError::Planning { source: Box::new(e) })?;
        run.results.push(result.clone());

        if !result.success {
            return Err(OrchestratorError::Planning {
                source: Box::new(phase_failed(Phase::Planning, &result)),
            });
        }
        Ok(result.output)
    }

    /// Primary executor first, then each fallback in order until one
    /// succeeds. Fallbacks that error are skipped.
    async fn execute(
        &self,
        task: &Task,
        chain: &ModelChain,
        plan: ModelOutput,
        context: Option<ModelOutput>,
    ) -> Result<ModelResult> {
        let input = BackendInput::Execution {
            task: task.clone(),
            plan,
            context,
        };

        let mut result = self
            .attempt(Phase::Execution, chain.executor.as_ref(), input.clone())
            .await?;
        if result.success {
            return Ok(result);
        }

        for fallback in &chain.fallback {
            warn!(
                executor = chain.executor.id(),
                fallback = fallback.id(),
                "Execution failed, trying fallback"
            );
            match self
                .attempt(Phase::Execution, fallback.as_ref(), input.clone())
                .await
            {
                Ok(mut attempt) => {
                    attempt.used_fallback = true;
                    result = attempt;
                    if result.success {
                        info!(fallback = fallback.id(), "Fallback succeeded");
                        break;
                    }
                }
                Err(err) => {
                    warn!(fallback = fallback.id(), error = %err, "Fallback errored, skipping");
                }
            }
        }

        Ok(result)
    }

    async fn attempt(
        &self,
        phase: Phase,
        backend: &dyn llm_router_core::ModelBackend,
        input: BackendInput,
    ) -> Result<ModelResult> {
        execute_with_retries(&self.config, phase, Some(backend), move || {
            backend.process(input.clone())
        })
        .await
    }
}

fn phase_failed(phase: Phase, result: &ModelResult) -> OrchestratorError {
    OrchestratorError::PhaseFailed {
        phase,
        reason: result
            .error
            .clone()
            .unwrap_or_else(|| "backend reported failure".to_string()),
    }
}

/// Folds the per-phase results of a chain into the task's result.
///
/// The output comes from the last successful execution or review result;
/// planning and context outputs only feed later phases. Metrics are summed
/// over every phase, failed ones included.
pub fn aggregate_results(results: Vec<ModelResult>) -> Result<ModelResult> {
    let authoritative = results
        .iter()
        .rev()
        .find(|r| {
            r.success && matches!(r.phase, None | Some(Phase::Execution) | Some(Phase::Review))
        })
        .ok_or(OrchestratorError::NoSuccessfulResults)?;

    let output = authoritative.output.clone();
    let phase = authoritative.phase.or(Some(Phase::Execution));
    let used_fallback = results.iter().any(|r| r.used_fallback);
    let metrics = ModelMetrics::aggregate(results.iter().map(|r| &r.metrics));
    let phases = results
        .into_iter()
        .map(|r| PhaseResult::new(r.phase_name(), r))
        .collect();

    Ok(ModelResult {
        success: true,
        output,
        phase,
        phases,
        metrics,
        used_fallback,
        error: None,
    })
}
