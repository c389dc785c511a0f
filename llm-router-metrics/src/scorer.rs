//! Capability scoring with time decay.
//!
//! Every backend invocation is recorded against a (backend, capability) pair.
//! A score is the decay-scaled mean quality of the records inside the
//! configured time window:
//!
//! ```text
//! quality = w_s * success + w_l * max(0, 1 - latency / latency_norm)
//!         + w_r * max(0, 1 - resource_usage)
//! score   = sum(decay^age_days * quality) / n
//! ```
//!
//! Dividing by the sample count rather than by the weight sum means stale
//! evidence loses influence in absolute terms, so a score never rises just
//! because its records got older. Fewer than `min_samples` records in the
//! window yield a score of exactly 0.

use chrono::{DateTime, Utc};
use llm_router_core::{Clock, Result, ScoringConfig, SystemClock};
use std::sync::Arc;
use tracing::{debug, warn};
use validator::Validate;

use crate::aggregators::{ModelCapabilityData, PerformanceMetrics};
use crate::records::{PerformanceRecord, PerformanceSample, RecordKey, RecordStore};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

pub struct CapabilityScorer {
    config: ScoringConfig,
    store: RecordStore,
    clock: Arc<dyn Clock>,
}

impl CapabilityScorer {
    pub fn new(config: ScoringConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: ScoringConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            store: RecordStore::new(),
            clock,
        })
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn record_success(&self, backend_id: &str, capability: &str, sample: PerformanceSample) {
        self.record(backend_id, capability, sample, true);
    }

    pub fn record_failure(&self, backend_id: &str, capability: &str, sample: PerformanceSample) {
        self.record(backend_id, capability, sample, false);
    }

    fn record(&self, backend_id: &str, capability: &str, sample: PerformanceSample, success: bool) {
        let clean = sample.sanitized();
        if clean != sample {
            warn!(
                backend_id,
                capability,
                latency = sample.latency,
                resource_usage = sample.resource_usage,
                "Clamped out-of-range performance sample"
            );
        }

        let now = self.clock.now();
        let record = PerformanceRecord {
            timestamp: now,
            latency: clean.latency,
            resource_usage: clean.resource_usage,
            success,
        };
        self.store.append(
            RecordKey::new(backend_id, capability),
            record,
            self.cutoff(now),
        );
    }

    /// Score in [0, 1] of `backend_id` for `capability`.
    pub fn get_capability_score(&self, backend_id: &str, capability: &str) -> f64 {
        let records = self.store.snapshot(&RecordKey::new(backend_id, capability));
        let score = self.score_records(&records, self.clock.now());
        debug!(backend_id, capability, score, "Computed capability score");
        score
    }

    /// Every capability ever recorded for `backend_id` with its current score,
    /// plus aggregate metrics over all of the backend's in-window records.
    pub fn get_model_scores(&self, backend_id: &str) -> ModelCapabilityData {
        let now = self.clock.now();
        let cutoff = self.cutoff(now);
        let logs = self.store.snapshot_backend(backend_id);

        let capabilities = logs
            .iter()
            .map(|(capability, records)| (capability.clone(), self.score_records(records, now)))
            .collect();

        let performance_metrics = PerformanceMetrics::from_records(
            logs.iter()
                .flat_map(|(_, records)| records.iter())
                .filter(|r| r.timestamp >= cutoff),
        );

        ModelCapabilityData {
            model_id: backend_id.to_string(),
            capabilities,
            performance_metrics,
        }
    }

    /// Candidates ordered by descending score for `capability`. Ties keep
    /// their input order.
    pub fn rank_models<S: AsRef<str>>(&self, capability: &str, candidates: &[S]) -> Vec<(String, f64)> {
        let mut ranked: Vec<(String, f64)> = candidates
            .iter()
            .map(|id| {
                let id = id.as_ref();
                (id.to_string(), self.get_capability_score(id, capability))
            })
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }

    /// Drops records that fell out of the time window.
    pub fn prune_expired(&self) -> usize {
        let removed = self.store.prune(self.cutoff(self.clock.now()));
        if removed > 0 {
            debug!(removed, "Pruned expired performance records");
        }
        removed
    }

    /// Windows reaching past the earliest representable instant keep everything.
    fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_signed(self.config.time_window())
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    fn score_records(&self, records: &[PerformanceRecord], now: DateTime<Utc>) -> f64 {
        let cutoff = self.cutoff(now);
        let in_window: Vec<&PerformanceRecord> =
            records.iter().filter(|r| r.timestamp >= cutoff).collect();

        if in_window.len() < self.config.min_samples {
            return 0.0;
        }

        let weighted: f64 = in_window
            .iter()
            .map(|r| self.decay_weight(r, now) * self.quality(r))
            .sum();

        (weighted / in_window.len() as f64).clamp(0.0, 1.0)
    }

    fn quality(&self, record: &PerformanceRecord) -> f64 {
        let w = &self.config.weight_factors;
        let success = if record.success { 1.0 } else { 0.0 };
        let latency = (1.0 - record.latency / self.config.latency_norm_ms).max(0.0);
        let resources = (1.0 - record.resource_usage).max(0.0);

        w.success_rate * success + w.latency * latency + w.resource_usage * resources
    }

    fn decay_weight(&self, record: &PerformanceRecord, now: DateTime<Utc>) -> f64 {
        let age_days = ((now - record.timestamp).num_milliseconds() as f64 / MILLIS_PER_DAY).max(0.0);
        self.config.decay_factor.powf(age_days)
    }
}
