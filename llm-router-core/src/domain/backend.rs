use serde::{Deserialize, Serialize};

use super::output::ModelOutput;
use super::result::Phase;
use super::task::Task;

/// Request handed to a backend, tagged by the phase it serves.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BackendInput {
    Planning {
        task: Task,
    },
    Context {
        task: Task,
        plan: ModelOutput,
    },
    Execution {
        task: Task,
        plan: ModelOutput,
        context: Option<ModelOutput>,
    },
    Review {
        task: Task,
        result: ModelOutput,
        context: Option<ModelOutput>,
    },
}

impl BackendInput {
    pub fn phase(&self) -> Phase {
        match self {
            BackendInput::Planning { .. } => Phase::Planning,
            BackendInput::Context { .. } => Phase::Context,
            BackendInput::Execution { .. } => Phase::Execution,
            BackendInput::Review { .. } => Phase::Review,
        }
    }

    pub fn task(&self) -> &Task {
        match self {
            BackendInput::Planning { task }
            | BackendInput::Context { task, .. }
            | BackendInput::Execution { task, .. }
            | BackendInput::Review { task, .. } => task,
        }
    }
}

/// Self-reported resource figures of a backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ResourceMetrics {
    pub memory_usage: f64,
    /// Normalised to [0, 1].
    pub cpu_usage: f64,
    pub average_latency: f64,
    pub tokens_processed: Option<u64>,
    pub total_processing_time: Option<f64>,
    pub peak_memory_usage: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenStats {
    pub total: u64,
    pub prompt: Option<u64>,
    pub completion: Option<u64>,
}

impl TokenStats {
    pub fn new(total: u64) -> Self {
        Self {
            total,
            prompt: None,
            completion: None,
        }
    }
}
