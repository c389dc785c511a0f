#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use llm_router::*;
use llm_router_core::{ManualClock, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Behaviour {
    Succeed,
    Fail,
    Error,
}

/// Backend answering every call the same way.
pub struct StubBackend {
    id: String,
    output: ModelOutput,
    behaviour: Behaviour,
    cpu_usage: Option<f64>,
    delay: Duration,
    calls: AtomicUsize,
}

impl StubBackend {
    pub fn new(id: &str, output: impl Into<ModelOutput>) -> Self {
        Self {
            id: id.to_string(),
            output: output.into(),
            behaviour: Behaviour::Succeed,
            cpu_usage: Some(0.25),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn behaving(mut self, behaviour: Behaviour) -> Self {
        self.behaviour = behaviour;
        self
    }

    pub fn with_cpu_usage(mut self, cpu_usage: Option<f64>) -> Self {
        self.cpu_usage = cpu_usage;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelBackend for StubBackend {
    fn id(&self) -> &str {
        &self.id
    }

    async fn process(&self, _input: BackendInput) -> Result<ModelResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let metrics = ModelMetrics {
            execution_time: 5.0,
            memory_used: 64.0,
            ..Default::default()
        };
        match self.behaviour {
            Behaviour::Succeed => Ok(ModelResult::success(self.output.clone()).with_metrics(metrics)),
            Behaviour::Fail => Ok(ModelResult::failure(format!("{} gave up", self.id)).with_metrics(metrics)),
            Behaviour::Error => Err(CoreError::Backend(format!("{} is offline", self.id))),
        }
    }

    async fn resource_metrics(&self) -> Result<ResourceMetrics> {
        match self.cpu_usage {
            Some(cpu_usage) => Ok(ResourceMetrics {
                memory_usage: 128.0,
                cpu_usage,
                average_latency: 5.0,
                ..Default::default()
            }),
            None => Err(CoreError::Backend("no metrics".to_string())),
        }
    }

    async fn token_stats(&self) -> Result<TokenStats> {
        Ok(TokenStats::new(16))
    }
}

pub fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()))
}

pub fn scorer(clock: &Arc<ManualClock>) -> Arc<CapabilityScorer> {
    Arc::new(CapabilityScorer::with_clock(ScoringConfig::default(), clock.clone()).unwrap())
}

/// Records `count` identical samples for `backend_id` under `capability`.
pub fn seed(scorer: &CapabilityScorer, backend_id: &str, capability: &str, count: usize, success: bool, latency: f64, usage: f64) {
    for _ in 0..count {
        let sample = PerformanceSample::new(latency, usage);
        if success {
            scorer.record_success(backend_id, capability, sample);
        } else {
            scorer.record_failure(backend_id, capability, sample);
        }
    }
}

pub fn code_task(priority: Priority) -> Task {
    Task::new(
        "codegen".to_string(),
        "Implement a parser".to_string(),
        serde_json::json!({"language": "rust"}),
        TaskRequirements::new("code").with_priority(priority),
    )
}
