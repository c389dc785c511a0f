use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::BTreeMap;

use crate::records::PerformanceRecord;

/// Aggregate figures over every retained record of a backend, regardless of
/// capability.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PerformanceMetrics {
    pub success_rate: f64,
    /// Mean latency in milliseconds.
    pub latency: f64,
    /// Mean normalised resource usage.
    pub resource_usage: f64,
    pub sample_count: usize,
}

impl PerformanceMetrics {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a PerformanceRecord>) -> Self {
        let records: Vec<&PerformanceRecord> = records.into_iter().collect();
        if records.is_empty() {
            return Self::default();
        }

        let successes = records.iter().filter(|r| r.success).count();
        let latencies: Vec<f64> = records.iter().map(|r| r.latency).collect();
        let usage: Vec<f64> = records.iter().map(|r| r.resource_usage).collect();

        Self {
            success_rate: successes as f64 / records.len() as f64,
            latency: latencies.as_slice().mean(),
            resource_usage: usage.as_slice().mean(),
            sample_count: records.len(),
        }
    }
}

/// Current scores of one backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ModelCapabilityData {
    pub model_id: String,
    /// Capability tag -> score in [0, 1].
    pub capabilities: BTreeMap<String, f64>,
    pub performance_metrics: PerformanceMetrics,
}

impl ModelCapabilityData {
    pub fn score(&self, capability: &str) -> f64 {
        self.capabilities.get(capability).copied().unwrap_or(0.0)
    }
}
