use llm_router_core::{CoreError, ModelMetrics, Phase};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// How far one phase got, for diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhaseSummary {
    pub phase: Phase,
    pub success: bool,
    pub metrics: ModelMetrics,
}

fn summarize(phases: &[PhaseSummary]) -> String {
    if phases.is_empty() {
        return "none".to_string();
    }
    phases
        .iter()
        .map(|p| format!("{}={}", p.phase, if p.success { "ok" } else { "failed" }))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Planning phase failed")]
    Planning {
        #[source]
        source: Box<OrchestratorError>,
    },

    #[error("Context phase failed")]
    Context {
        #[source]
        source: Box<OrchestratorError>,
    },

    #[error("{phase} phase reported failure: {reason}")]
    PhaseFailed { phase: Phase, reason: String },

    #[error("{phase} phase failed after {attempts} attempts")]
    RetryExhausted {
        phase: Phase,
        attempts: usize,
        #[source]
        source: CoreError,
    },

    #[error("Chain execution failed during {phase} phase (phases: {})", summarize(.phases))]
    ChainExecution {
        phase: Phase,
        phases: Vec<PhaseSummary>,
        #[source]
        source: Box<OrchestratorError>,
    },

    #[error("No phase produced a successful result")]
    NoSuccessfulResults,

    #[error("Failed to obtain a model chain")]
    Registry(#[source] CoreError),

    #[error("Invalid task")]
    InvalidTask(#[source] CoreError),

    #[error("Failed to handle task {task_id}")]
    TaskHandling {
        task_id: Uuid,
        #[source]
        source: Box<OrchestratorError>,
    },
}

impl OrchestratorError {
    /// Innermost orchestrator error below the wrapping layers.
    pub fn innermost(&self) -> &OrchestratorError {
        match self {
            OrchestratorError::Planning { source }
            | OrchestratorError::Context { source }
            | OrchestratorError::ChainExecution { source, .. }
            | OrchestratorError::TaskHandling { source, .. } => source.innermost(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;
