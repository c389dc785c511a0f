#![allow(dead_code)]

use async_trait::async_trait;
use llm_router_core::*;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// What a scripted backend does on one call.
#[derive(Debug, Clone)]
pub enum Step {
    Succeed(ModelOutput),
    Fail(String),
    Error(String),
}

/// Backend that replays a script, then repeats a default step.
pub struct ScriptedBackend {
    id: String,
    script: Mutex<VecDeque<Step>>,
    default: Step,
    calls: AtomicUsize,
    inputs: Mutex<Vec<BackendInput>>,
    memory: f64,
    tokens: u64,
    metrics_fail: bool,
}

impl ScriptedBackend {
    fn build(id: &str, script: Vec<Step>, default: Step, metrics_fail: bool) -> Self {
        Self {
            id: id.to_string(),
            script: Mutex::new(script.into()),
            default,
            calls: AtomicUsize::new(0),
            inputs: Mutex::new(Vec::new()),
            memory: 256.0,
            tokens: 42,
            metrics_fail,
        }
    }

    pub fn new(id: &str, script: Vec<Step>, default: Step) -> Arc<Self> {
        Arc::new(Self::build(id, script, default, false))
    }

    pub fn ok(id: &str, output: impl Into<ModelOutput>) -> Arc<Self> {
        Self::new(id, vec![], Step::Succeed(output.into()))
    }

    pub fn failing(id: &str) -> Arc<Self> {
        Self::new(id, vec![], Step::Fail(format!("{id} could not complete")))
    }

    pub fn erroring(id: &str) -> Arc<Self> {
        Self::new(id, vec![], Step::Error(format!("{id} is unreachable")))
    }

    pub fn without_metrics(id: &str, output: impl Into<ModelOutput>) -> Arc<Self> {
        Arc::new(Self::build(id, vec![], Step::Succeed(output.into()), true))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn inputs(&self) -> Vec<BackendInput> {
        self.inputs.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelBackend for ScriptedBackend {
    fn id(&self) -> &str {
        &self.id
    }

    async fn process(&self, input: BackendInput) -> Result<ModelResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inputs.lock().unwrap().push(input);

        let step = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.default.clone());

        let metrics = ModelMetrics {
            execution_time: 10.0,
            memory_used: 100.0,
            peak_memory_usage: 100.0,
            ..Default::default()
        };

        match step {
            Step::Succeed(output) => Ok(ModelResult::success(output).with_metrics(metrics)),
            Step::Fail(reason) => Ok(ModelResult::failure(reason).with_metrics(metrics)),
            Step::Error(reason) => Err(CoreError::Backend(reason)),
        }
    }

    async fn resource_metrics(&self) -> Result<ResourceMetrics> {
        if self.metrics_fail {
            return Err(CoreError::Backend("metrics endpoint down".to_string()));
        }
        Ok(ResourceMetrics {
            memory_usage: self.memory,
            cpu_usage: 0.25,
            average_latency: 10.0,
            tokens_processed: Some(self.tokens),
            total_processing_time: None,
            peak_memory_usage: Some(self.memory * 2.0),
        })
    }

    async fn token_stats(&self) -> Result<TokenStats> {
        if self.metrics_fail {
            return Err(CoreError::Backend("metrics endpoint down".to_string()));
        }
        Ok(TokenStats::new(self.tokens))
    }
}

/// Registry that always hands out the same chain.
pub struct StaticRegistry {
    chain: ModelChain,
    pub requests: AtomicUsize,
}

impl StaticRegistry {
    pub fn new(chain: ModelChain) -> Arc<Self> {
        Arc::new(Self {
            chain,
            requests: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ModelRegistry for StaticRegistry {
    async fn get_model_chain(&self, _requirements: &TaskRequirements) -> Result<ModelChain> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        Ok(self.chain.clone())
    }
}

pub fn task(priority: Priority) -> Task {
    Task::new(
        "codegen".to_string(),
        "Write a function".to_string(),
        serde_json::json!({"language": "rust"}),
        TaskRequirements::new("code").with_priority(priority),
    )
}

pub fn shared(backend: &Arc<ScriptedBackend>) -> Arc<dyn ModelBackend> {
    backend.clone()
}
