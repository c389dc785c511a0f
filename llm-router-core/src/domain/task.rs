use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Speed,
    #[default]
    Quality,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct TaskRequirements {
    #[validate(length(min = 1, max = 255))]
    pub primary_capability: String,
    pub secondary_capabilities: Vec<String>,
    /// Capability tag -> lowest acceptable score in [0, 1].
    #[validate(custom(function = "validate_min_scores"))]
    pub min_scores: HashMap<String, f64>,
    pub context_size: usize,
    pub priority: Priority,
}

impl TaskRequirements {
    pub fn new(primary_capability: impl Into<String>) -> Self {
        Self {
            primary_capability: primary_capability.into(),
            secondary_capabilities: vec![],
            min_scores: HashMap::new(),
            context_size: 0,
            priority: Priority::default(),
        }
    }

    pub fn with_secondary(mut self, capabilities: Vec<String>) -> Self {
        self.secondary_capabilities = capabilities;
        self
    }

    pub fn with_min_score(mut self, capability: impl Into<String>, score: f64) -> Self {
        self.min_scores.insert(capability.into(), score);
        self
    }

    pub fn with_context_size(mut self, context_size: usize) -> Self {
        self.context_size = context_size;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Primary capability followed by the secondary ones.
    pub fn capabilities(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary_capability.as_str())
            .chain(self.secondary_capabilities.iter().map(String::as_str))
    }
}

fn validate_min_scores(scores: &HashMap<String, f64>) -> Result<(), ValidationError> {
    if scores.values().all(|s| (0.0..=1.0).contains(s)) {
        Ok(())
    } else {
        Err(ValidationError::new("min_score_out_of_range"))
    }
}

/// A unit of work submitted to the orchestrator. Not mutated after submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct Task {
    pub id: Uuid,
    #[validate(length(min = 1, max = 255))]
    pub task_type: String,
    pub description: String,
    pub input: serde_json::Value,
    #[validate(nested)]
    pub requirements: TaskRequirements,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Task {
    pub fn new(
        task_type: String,
        description: String,
        input: serde_json::Value,
        requirements: TaskRequirements,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            task_type,
            description,
            input,
            requirements,
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}
