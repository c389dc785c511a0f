use serde::{Deserialize, Serialize};
use std::fmt;

use super::backend::{ResourceMetrics, TokenStats};
use super::output::ModelOutput;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Planning,
    Context,
    Execution,
    Review,
}

impl Phase {
    pub const ORDER: [Phase; 4] = [Phase::Planning, Phase::Context, Phase::Execution, Phase::Review];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Planning => "planning",
            Phase::Context => "context",
            Phase::Execution => "execution",
            Phase::Review => "review",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    Completed,
    Failed,
    Skipped,
}

impl PhaseStatus {
    pub fn from_success(success: bool) -> Self {
        if success {
            PhaseStatus::Completed
        } else {
            PhaseStatus::Failed
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhaseResult {
    pub name: String,
    pub status: PhaseStatus,
    pub result: ModelResult,
}

impl PhaseResult {
    pub fn new(name: impl Into<String>, result: ModelResult) -> Self {
        Self {
            name: name.into(),
            status: PhaseStatus::from_success(result.success),
            result,
        }
    }
}

/// Resource accounting for one invocation plus running totals.
///
/// Times are milliseconds, memory is bytes. Totals only grow and
/// `peak_memory_usage` is the largest peak observed so far.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ModelMetrics {
    pub execution_time: f64,
    pub memory_used: f64,
    pub tokens_used: u64,
    pub total_execution_time: f64,
    pub total_memory_used: f64,
    pub total_tokens_used: u64,
    pub peak_memory_usage: f64,
}

impl ModelMetrics {
    /// Every floating point field is finite and non-negative.
    pub fn is_well_formed(&self) -> bool {
        [
            self.execution_time,
            self.memory_used,
            self.total_execution_time,
            self.total_memory_used,
            self.peak_memory_usage,
        ]
        .iter()
        .all(|v| v.is_finite() && *v >= 0.0)
    }

    /// Folds another result's metrics into the running totals.
    ///
    /// An invocation contributes whichever is larger of its own figure and
    /// the total it already carries, so pre-aggregated results are not
    /// undercounted.
    pub fn absorb(&mut self, other: &ModelMetrics) {
        self.total_execution_time += other.execution_time.max(other.total_execution_time);
        self.total_memory_used += other.memory_used.max(other.total_memory_used);
        self.total_tokens_used += other.tokens_used.max(other.total_tokens_used);
        self.peak_memory_usage = self
            .peak_memory_usage
            .max(other.peak_memory_usage)
            .max(other.memory_used);

        self.execution_time = self.total_execution_time;
        self.memory_used = self.total_memory_used;
        self.tokens_used = self.total_tokens_used;
    }

    pub fn aggregate<'a>(metrics: impl IntoIterator<Item = &'a ModelMetrics>) -> Self {
        let mut total = ModelMetrics::default();
        for m in metrics {
            total.absorb(m);
        }
        total
    }

    /// Merges what a backend reports about itself after a successful call.
    pub fn merge_backend_stats(&mut self, resources: Option<&ResourceMetrics>, tokens: Option<&TokenStats>) {
        if let Some(resources) = resources {
            if resources.memory_usage.is_finite() && resources.memory_usage >= 0.0 {
                self.memory_used = self.memory_used.max(resources.memory_usage);
            }
            if self.execution_time <= 0.0 {
                if let Some(total) = resources.total_processing_time {
                    self.execution_time = total.max(0.0);
                }
            }
            let peak = resources.peak_memory_usage.unwrap_or(resources.memory_usage);
            if peak.is_finite() {
                self.peak_memory_usage = self.peak_memory_usage.max(peak);
            }
        }
        if let Some(tokens) = tokens {
            self.tokens_used = self.tokens_used.max(tokens.total);
        }

        self.total_execution_time = self.total_execution_time.max(self.execution_time);
        self.total_memory_used = self.total_memory_used.max(self.memory_used);
        self.total_tokens_used = self.total_tokens_used.max(self.tokens_used);
        self.peak_memory_usage = self.peak_memory_usage.max(self.memory_used);
    }
}

/// Outcome of a single backend invocation, or of a whole chain once the
/// orchestrator has aggregated its phases.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ModelResult {
    pub success: bool,
    pub output: ModelOutput,
    pub phase: Option<Phase>,
    #[serde(default)]
    pub phases: Vec<PhaseResult>,
    #[serde(default)]
    pub metrics: ModelMetrics,
    #[serde(default)]
    pub used_fallback: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ModelResult {
    pub fn success(output: impl Into<ModelOutput>) -> Self {
        Self {
            success: true,
            output: output.into(),
            ..Default::default()
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }

    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phase = Some(phase);
        self
    }

    pub fn with_metrics(mut self, metrics: ModelMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_output(mut self, output: impl Into<ModelOutput>) -> Self {
        self.output = output.into();
        self
    }

    /// Name used when listing this result as a phase.
    pub fn phase_name(&self) -> &'static str {
        self.phase.unwrap_or(Phase::Execution).as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(time: f64, memory: f64, tokens: u64) -> ModelMetrics {
        ModelMetrics {
            execution_time: time,
            memory_used: memory,
            tokens_used: tokens,
            peak_memory_usage: memory,
            ..Default::default()
        }
    }

    #[test]
    fn aggregate_sums_and_tracks_peak() {
        let a = metrics(10.0, 100.0, 5);
        let b = metrics(20.0, 300.0, 7);
        let total = ModelMetrics::aggregate([&a, &b]);

        assert_eq!(total.total_execution_time, 30.0);
        assert_eq!(total.total_memory_used, 400.0);
        assert_eq!(total.total_tokens_used, 12);
        assert_eq!(total.peak_memory_usage, 300.0);
    }

    #[test]
    fn negative_or_nan_metrics_are_not_well_formed() {
        assert!(metrics(1.0, 1.0, 1).is_well_formed());
        assert!(!metrics(-1.0, 1.0, 1).is_well_formed());
        assert!(!metrics(f64::NAN, 1.0, 1).is_well_formed());
    }

    #[test]
    fn backend_stats_never_lower_peak() {
        let mut m = metrics(5.0, 50.0, 0);
        m.peak_memory_usage = 500.0;
        let resources = ResourceMetrics {
            memory_usage: 80.0,
            cpu_usage: 0.2,
            average_latency: 5.0,
            tokens_processed: None,
            total_processing_time: None,
            peak_memory_usage: Some(90.0),
        };
        m.merge_backend_stats(Some(&resources), Some(&TokenStats::new(12)));

        assert_eq!(m.memory_used, 80.0);
        assert_eq!(m.tokens_used, 12);
        assert_eq!(m.peak_memory_usage, 500.0);
        assert_eq!(m.total_tokens_used, 12);
    }
}
