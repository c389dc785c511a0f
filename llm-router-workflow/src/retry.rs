use futures::join;
use llm_router_core::{ModelBackend, ModelResult, OrchestratorConfig, Phase};
use std::future::Future;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::error::{OrchestratorError, Result};

/// Runs `operation` up to `config.max_retries` times.
///
/// - A returned result with `success: false` uses up an attempt and is retried
///   at once; after the last attempt it is handed back as-is.
/// - An error uses up an attempt and is retried after
///   `config.backoff_delay(attempt)`; after the last attempt it surfaces as
///   [`OrchestratorError::RetryExhausted`].
/// - A successful result is tagged with `phase`, timed, and, when `backend`
///   is given, enriched with the backend's resource and token figures.
pub async fn execute_with_retries<F, Fut>(
    config: &OrchestratorConfig,
    phase: Phase,
    backend: Option<&dyn ModelBackend>,
    mut operation: F,
) -> Result<ModelResult>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = llm_router_core::Result<ModelResult>>,
{
    let max_attempts = config.max_retries.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        let started = Instant::now();
        let outcome = operation().await;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        match outcome {
            Ok(mut result) => {
                result.phase = Some(phase);
                if result.metrics.execution_time <= 0.0 {
                    result.metrics.execution_time = elapsed_ms;
                }

                if result.success {
                    if let Some(backend) = backend {
                        enrich_metrics(&mut result, backend).await;
                    }
                    debug!(%phase, attempt, "Phase attempt succeeded");
                    return Ok(result);
                }

                warn!(
                    %phase,
                    attempt,
                    max_attempts,
                    error = result.error.as_deref().unwrap_or("unspecified"),
                    "Phase attempt reported failure"
                );
                if attempt >= max_attempts {
                    return Ok(result);
                }
            }
            Err(err) => {
                if attempt >= max_attempts {
                    return Err(OrchestratorError::RetryExhausted {
                        phase,
                        attempts: attempt,
                        source: err,
                    });
                }
                let delay = config.backoff_delay(attempt);
                warn!(
                    %phase,
                    attempt,
                    max_attempts,
                    error = %err,
                    delay_ms = delay.as_millis() as u64,
                    "Phase attempt errored, backing off"
                );
                sleep(delay).await;
            }
        }
    }
}

async fn enrich_metrics(result: &mut ModelResult, backend: &dyn ModelBackend) {
    let (resources, tokens) = join!(backend.resource_metrics(), backend.token_stats());

    let resources = resources
        .map_err(|e| warn!(backend = backend.id(), error = %e, "Resource metrics unavailable"))
        .ok();
    let tokens = tokens
        .map_err(|e| warn!(backend = backend.id(), error = %e, "Token stats unavailable"))
        .ok();

    result
        .metrics
        .merge_backend_stats(resources.as_ref(), tokens.as_ref());
}
