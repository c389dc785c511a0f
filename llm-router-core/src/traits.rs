use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::RwLock;

use crate::domain::{BackendInput, ModelChain, ModelResult, ResourceMetrics, TaskRequirements, TokenStats};
use crate::error::Result;

/// A model backend able to serve any role in a chain.
///
/// Planner, context, executor and reviewer backends all share this shape; the
/// role is carried by the [`BackendInput`] variant, not by the type.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Stable identifier used for scoring and diagnostics.
    fn id(&self) -> &str;

    async fn process(&self, input: BackendInput) -> Result<ModelResult>;

    async fn resource_metrics(&self) -> Result<ResourceMetrics>;

    async fn token_stats(&self) -> Result<TokenStats>;
}

/// Builds the chain of backends for a set of task requirements.
#[async_trait]
pub trait ModelRegistry: Send + Sync {
    async fn get_model_chain(&self, requirements: &TaskRequirements) -> Result<ModelChain>;
}

/// Source of wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: RwLock<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.write().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.write().unwrap_or_else(|e| e.into_inner()) = to;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read().unwrap_or_else(|e| e.into_inner())
    }
}
