use std::fmt;
use std::sync::Arc;

use crate::traits::ModelBackend;

/// Backends selected for one task. Built by a registry, consumed by the
/// orchestrator.
#[derive(Clone)]
pub struct ModelChain {
    pub planner: Arc<dyn ModelBackend>,
    pub executor: Arc<dyn ModelBackend>,
    pub context: Option<Arc<dyn ModelBackend>>,
    pub reviewer: Option<Arc<dyn ModelBackend>>,
    /// Alternate executors, tried in order.
    pub fallback: Vec<Arc<dyn ModelBackend>>,
}

impl ModelChain {
    pub fn new(planner: Arc<dyn ModelBackend>, executor: Arc<dyn ModelBackend>) -> Self {
        Self {
            planner,
            executor,
            context: None,
            reviewer: None,
            fallback: vec![],
        }
    }

    pub fn with_context(mut self, context: Arc<dyn ModelBackend>) -> Self {
        self.context = Some(context);
        self
    }

    pub fn with_reviewer(mut self, reviewer: Arc<dyn ModelBackend>) -> Self {
        self.reviewer = Some(reviewer);
        self
    }

    pub fn with_fallback(mut self, fallback: Vec<Arc<dyn ModelBackend>>) -> Self {
        self.fallback = fallback;
        self
    }
}

impl fmt::Debug for ModelChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelChain")
            .field("planner", &self.planner.id())
            .field("executor", &self.executor.id())
            .field("context", &self.context.as_ref().map(|b| b.id()))
            .field("reviewer", &self.reviewer.as_ref().map(|b| b.id()))
            .field(
                "fallback",
                &self.fallback.iter().map(|b| b.id()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
