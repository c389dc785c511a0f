use anyhow::{Context, Result};
use llm_router_core::{ModelRegistry, Task};
use llm_router_synthesis::{FormattedResult, ResultSynthesizer};
use llm_router_workflow::TaskOrchestrator;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::config::RouterConfig;

/// Orchestrates a task, then combines and formats its phase results.
pub struct Router {
    orchestrator: TaskOrchestrator,
    synthesizer: ResultSynthesizer,
}

impl Router {
    pub fn new(config: &RouterConfig, registry: Arc<dyn ModelRegistry>) -> Self {
        Self::from_parts(
            TaskOrchestrator::with_config(registry, config.orchestrator.clone()),
            ResultSynthesizer::new(config.synthesizer.clone()),
        )
    }

    pub fn from_parts(orchestrator: TaskOrchestrator, synthesizer: ResultSynthesizer) -> Self {
        Self {
            orchestrator,
            synthesizer,
        }
    }

    pub fn orchestrator(&self) -> &TaskOrchestrator {
        &self.orchestrator
    }

    pub fn synthesizer(&self) -> &ResultSynthesizer {
        &self.synthesizer
    }

    #[instrument(skip(self, task), fields(task_id = %task.id))]
    pub async fn route(&self, task: &Task) -> Result<FormattedResult> {
        let result = self
            .orchestrator
            .handle_task(task)
            .await
            .with_context(|| format!("task {} could not be executed", task.id))?;

        let mut combined = self
            .synthesizer
            .combine_phases(result.phases)
            .context("failed to combine phase results")?;
        // A failed review is recorded in the phases but does not fail the task.
        combined.success = result.success;
        let formatted = self
            .synthesizer
            .format(&combined)
            .context("failed to format combined result")?;

        info!(format = %formatted.format, success = formatted.result.success, "Task routed");
        Ok(formatted)
    }
}
