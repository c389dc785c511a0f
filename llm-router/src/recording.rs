use async_trait::async_trait;
use llm_router_core::{BackendInput, ModelBackend, ModelResult, ResourceMetrics, Result, TokenStats};
use llm_router_metrics::{CapabilityScorer, PerformanceSample};
use std::sync::Arc;
use tokio::time::Instant;
use tracing::debug;

/// Wraps a backend and records every `process` call into a scorer under the
/// task's primary capability.
///
/// Latency is measured around the call. Resource usage is the backend's
/// reported CPU usage, or 0 when the backend cannot report it.
pub struct RecordingBackend {
    inner: Arc<dyn ModelBackend>,
    scorer: Arc<CapabilityScorer>,
}

impl RecordingBackend {
    pub fn new(inner: Arc<dyn ModelBackend>, scorer: Arc<CapabilityScorer>) -> Self {
        Self { inner, scorer }
    }

    pub fn wrap(inner: Arc<dyn ModelBackend>, scorer: Arc<CapabilityScorer>) -> Arc<dyn ModelBackend> {
        Arc::new(Self::new(inner, scorer))
    }

    pub fn inner(&self) -> &Arc<dyn ModelBackend> {
        &self.inner
    }
}

#[async_trait]
impl ModelBackend for RecordingBackend {
    fn id(&self) -> &str {
        self.inner.id()
    }

    async fn process(&self, input: BackendInput) -> Result<ModelResult> {
        let capability = input.task().requirements.primary_capability.clone();
        let phase = input.phase();

        let started = Instant::now();
        let outcome = self.inner.process(input).await;
        let latency = started.elapsed().as_secs_f64() * 1000.0;

        let resource_usage = self
            .inner
            .resource_metrics()
            .await
            .map(|m| m.cpu_usage)
            .unwrap_or(0.0);
        let sample = PerformanceSample::new(latency, resource_usage);

        let succeeded = matches!(&outcome, Ok(result) if result.success);
        if succeeded {
            self.scorer.record_success(self.id(), &capability, sample);
        } else {
            self.scorer.record_failure(self.id(), &capability, sample);
        }
        debug!(
            backend = self.id(),
            %capability,
            %phase,
            latency,
            succeeded,
            "Recorded backend call"
        );

        outcome
    }

    async fn resource_metrics(&self) -> Result<ResourceMetrics> {
        self.inner.resource_metrics().await
    }

    async fn token_stats(&self) -> Result<TokenStats> {
        self.inner.token_stats().await
    }
}
