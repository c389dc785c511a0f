use chrono::{DateTime, Utc};
use llm_router_core::{ModelMetrics, ModelOutput, OutputFormat, PhaseResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SynthesisMetadata {
    pub timestamp: DateTime<Utc>,
    pub result_count: usize,
    pub success_count: usize,
    pub failure_count: usize,
}

/// Phase outputs of a chain merged into one result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SynthesizedResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<ModelOutput>,
    pub phases: Vec<PhaseResult>,
    pub metrics: ModelMetrics,
    pub metadata: SynthesisMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FormattedResult {
    #[serde(flatten)]
    pub result: SynthesizedResult,
    pub format: OutputFormat,
    /// Descriptive shape of the output; not a JSON Schema document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<serde_json::Value>,
}
