use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use validator::Validate;

// ===== Orchestrator Configuration =====

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Attempts per phase, including the first one.
    #[validate(range(min = 1, max = 16))]
    pub max_retries: usize,
    /// Backoff after a failed attempt n (1-based) is `backoff_base_ms * 2^n`.
    pub backoff_base_ms: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_base_ms: 1000,
        }
    }
}

impl OrchestratorConfig {
    pub fn backoff_delay(&self, attempt: usize) -> Duration {
        let factor = 1u64.checked_shl(attempt as u32).unwrap_or(u64::MAX);
        Duration::from_millis(self.backoff_base_ms.saturating_mul(factor))
    }
}

// ===== Scoring Configuration =====

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[serde(default)]
pub struct WeightFactors {
    #[validate(range(min = 0.0))]
    pub success_rate: f64,
    #[validate(range(min = 0.0))]
    pub latency: f64,
    #[validate(range(min = 0.0))]
    pub resource_usage: f64,
}

impl Default for WeightFactors {
    fn default() -> Self {
        Self {
            success_rate: 0.3,
            latency: 0.5,
            resource_usage: 0.2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[serde(default)]
pub struct ScoringConfig {
    /// Multiplicative weight lost per day of record age.
    #[validate(range(exclusive_min = 0.0, max = 1.0))]
    pub decay_factor: f64,
    /// Records older than this are ignored.
    #[validate(range(min = 1))]
    pub time_window_ms: u64,
    /// Below this many in-window records the score is 0.
    #[validate(range(min = 1))]
    pub min_samples: usize,
    /// Latency at which the latency term reaches zero.
    #[validate(range(exclusive_min = 0.0))]
    pub latency_norm_ms: f64,
    #[validate(nested)]
    pub weight_factors: WeightFactors,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            decay_factor: 0.95,
            time_window_ms: 7 * 24 * 60 * 60 * 1000,
            min_samples: 5,
            latency_norm_ms: 1000.0,
            weight_factors: WeightFactors::default(),
        }
    }
}

impl ScoringConfig {
    pub fn time_window(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.time_window_ms.min(i64::MAX as u64) as i64)
    }
}

// ===== Synthesizer Configuration =====

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Text,
    Code,
    Structured,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OutputFormat::Json => "json",
            OutputFormat::Text => "text",
            OutputFormat::Code => "code",
            OutputFormat::Structured => "structured",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[serde(default)]
pub struct SynthesizerConfig {
    /// Overall success needs every phase completed instead of any.
    pub require_all_phases: bool,
    /// Reject inputs whose metrics are negative or not finite.
    pub validate_results: bool,
    pub include_schema: bool,
    /// Overrides format inference when set.
    pub preferred_format: Option<OutputFormat>,
    #[validate(range(max = 16))]
    pub indent_width: usize,
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self {
            require_all_phases: true,
            validate_results: true,
            include_schema: true,
            preferred_format: None,
            indent_width: 2,
        }
    }
}
