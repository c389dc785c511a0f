use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// Observed outcome of one backend invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerformanceRecord {
    pub timestamp: DateTime<Utc>,
    /// Milliseconds.
    pub latency: f64,
    /// Normalised to [0, 1].
    pub resource_usage: f64,
    pub success: bool,
}

/// Measurements reported alongside a success or failure.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct PerformanceSample {
    pub latency: f64,
    pub resource_usage: f64,
}

impl PerformanceSample {
    pub fn new(latency: f64, resource_usage: f64) -> Self {
        Self {
            latency,
            resource_usage,
        }
    }

    /// Latency floored at zero and resource usage clamped into [0, 1].
    /// Non-finite values become zero.
    pub fn sanitized(self) -> Self {
        let finite = |v: f64| if v.is_finite() { v } else { 0.0 };
        Self {
            latency: finite(self.latency).max(0.0),
            resource_usage: finite(self.resource_usage).clamp(0.0, 1.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordKey {
    pub backend_id: String,
    pub capability: String,
}

impl RecordKey {
    pub fn new(backend_id: impl Into<String>, capability: impl Into<String>) -> Self {
        Self {
            backend_id: backend_id.into(),
            capability: capability.into(),
        }
    }
}

/// Append-only performance logs, one per (backend, capability).
///
/// Appends and snapshots of a key run under that key's shard lock, so a
/// reader sees either the whole record or none of it.
#[derive(Debug, Default)]
pub struct RecordStore {
    logs: DashMap<RecordKey, Vec<PerformanceRecord>>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `record`, dropping entries of the same log older than `cutoff`.
    pub fn append(&self, key: RecordKey, record: PerformanceRecord, cutoff: DateTime<Utc>) {
        let mut log = self.logs.entry(key).or_default();
        log.retain(|r| r.timestamp >= cutoff);
        log.push(record);
    }

    pub fn snapshot(&self, key: &RecordKey) -> Vec<PerformanceRecord> {
        self.logs
            .get(key)
            .map(|log| log.value().clone())
            .unwrap_or_default()
    }

    /// Every log of a backend, keyed by capability and sorted by capability.
    pub fn snapshot_backend(&self, backend_id: &str) -> Vec<(String, Vec<PerformanceRecord>)> {
        let mut logs: Vec<_> = self
            .logs
            .iter()
            .filter(|entry| entry.key().backend_id == backend_id)
            .map(|entry| (entry.key().capability.clone(), entry.value().clone()))
            .collect();
        logs.sort_by(|a, b| a.0.cmp(&b.0));
        logs
    }

    /// Drops records older than `cutoff` from every log and returns how many
    /// were removed. Keys stay known even when their log empties.
    pub fn prune(&self, cutoff: DateTime<Utc>) -> usize {
        let mut removed = 0;
        for mut log in self.logs.iter_mut() {
            let before = log.len();
            log.retain(|r| r.timestamp >= cutoff);
            removed += before - log.len();
        }
        removed
    }

    pub fn len(&self, key: &RecordKey) -> usize {
        self.logs.get(key).map(|log| log.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.logs.iter().all(|log| log.is_empty())
    }
}
