//! Capability-scored routing of tasks through chains of model backends.
//!
//! This crate wires the subsystems together:
//! - [`RouterConfig`] loads every subsystem's settings from files and the
//!   environment.
//! - [`init_tracing`] installs the log subscriber.
//! - [`ScoredModelRegistry`] builds chains from registered backends using
//!   their recorded scores.
//! - [`RecordingBackend`] feeds every backend call back into the scorer.
//! - [`Router`] runs a task through the orchestrator and synthesizes the
//!   phase results.

pub mod config;
pub mod recording;
pub mod registry;
pub mod router;
pub mod telemetry;

pub use config::RouterConfig;
pub use recording::RecordingBackend;
pub use registry::{Role, ScoredModelRegistry};
pub use router::Router;
pub use telemetry::{init_tracing, LogConfig, LogFormat};

pub use llm_router_core::{
    BackendInput, Clock, CoreError, ModelBackend, ModelChain, ModelMetrics, ModelOutput,
    ModelRegistry, ModelResult, OrchestratorConfig, OutputFormat, Phase, PhaseResult, PhaseStatus,
    Priority, ResourceMetrics, ScoringConfig, SynthesizerConfig, SystemClock, Task,
    TaskRequirements, TokenStats, WeightFactors,
};
pub use llm_router_metrics::{CapabilityScorer, ModelCapabilityData, PerformanceMetrics, PerformanceSample};
pub use llm_router_synthesis::{FormattedResult, ResultSynthesizer, SynthesisError, SynthesizedResult};
pub use llm_router_workflow::{OrchestratorError, TaskOrchestrator};
