//! A [`ModelRegistry`] that picks executors by their recorded performance.

use async_trait::async_trait;
use llm_router_core::{
    CoreError, ModelBackend, ModelChain, ModelRegistry, Priority, Result, TaskRequirements,
};
use llm_router_metrics::CapabilityScorer;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Positions a backend can fill in a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Planner,
    Context,
    Executor,
    Reviewer,
}

struct Registration {
    backend: Arc<dyn ModelBackend>,
    roles: HashSet<Role>,
    capabilities: HashSet<String>,
}

impl Registration {
    fn serves(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

pub struct ScoredModelRegistry {
    scorer: Arc<CapabilityScorer>,
    backends: RwLock<Vec<Registration>>,
}

impl ScoredModelRegistry {
    pub fn new(scorer: Arc<CapabilityScorer>) -> Self {
        Self {
            scorer,
            backends: RwLock::new(Vec::new()),
        }
    }

    pub fn scorer(&self) -> &Arc<CapabilityScorer> {
        &self.scorer
    }

    /// Adds `backend`, replacing any earlier registration with the same id.
    /// Registration order breaks ties between equally ranked backends.
    pub async fn register<I, C>(&self, backend: Arc<dyn ModelBackend>, roles: I, capabilities: C)
    where
        I: IntoIterator<Item = Role>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let registration = Registration {
            roles: roles.into_iter().collect(),
            capabilities: capabilities.into_iter().map(Into::into).collect(),
            backend,
        };
        info!(
            backend = registration.backend.id(),
            roles = ?registration.roles,
            "Registered backend"
        );

        let mut backends = self.backends.write().await;
        match backends
            .iter_mut()
            .find(|r| r.backend.id() == registration.backend.id())
        {
            Some(existing) => *existing = registration,
            None => backends.push(registration),
        }
    }

    pub async fn backend_ids(&self, role: Role) -> Vec<String> {
        self.backends
            .read()
            .await
            .iter()
            .filter(|r| r.serves(role))
            .map(|r| r.backend.id().to_string())
            .collect()
    }

    /// Executors offering the primary capability, best first.
    ///
    /// Quality tasks rank by capability score, speed tasks by mean observed
    /// latency with unmeasured backends last. Candidates below any
    /// `min_scores` floor are dropped unless none would remain.
    pub async fn rank_executors(&self, requirements: &TaskRequirements) -> Vec<Arc<dyn ModelBackend>> {
        let capability = requirements.primary_capability.as_str();
        let candidates: Vec<Arc<dyn ModelBackend>> = self
            .backends
            .read()
            .await
            .iter()
            .filter(|r| r.serves(Role::Executor) && r.capabilities.contains(capability))
            .map(|r| Arc::clone(&r.backend))
            .collect();

        let ranked = match requirements.priority {
            Priority::Quality => self.rank_by_score(capability, candidates),
            Priority::Speed => self.rank_by_latency(candidates),
        };

        let qualified: Vec<Arc<dyn ModelBackend>> = ranked
            .iter()
            .filter(|backend| self.meets_floors(backend.id(), requirements))
            .cloned()
            .collect();

        if qualified.is_empty() && !ranked.is_empty() {
            warn!(
                capability,
                candidates = ranked.len(),
                "No executor meets the minimum scores, ignoring them"
            );
            return ranked;
        }
        qualified
    }

    fn rank_by_score(
        &self,
        capability: &str,
        candidates: Vec<Arc<dyn ModelBackend>>,
    ) -> Vec<Arc<dyn ModelBackend>> {
        let ids: Vec<&str> = candidates.iter().map(|b| b.id()).collect();
        let ranking = self.scorer.rank_models(capability, &ids);
        debug!(capability, ?ranking, "Ranked executors by score");

        ranking
            .iter()
            .filter_map(|(id, _)| candidates.iter().find(|b| b.id() == id.as_str()).cloned())
            .collect()
    }

    fn rank_by_latency(&self, candidates: Vec<Arc<dyn ModelBackend>>) -> Vec<Arc<dyn ModelBackend>> {
        let mut measured: Vec<(Option<f64>, Arc<dyn ModelBackend>)> = candidates
            .into_iter()
            .map(|backend| {
                let metrics = self.scorer.get_model_scores(backend.id()).performance_metrics;
                let latency = (metrics.sample_count > 0).then_some(metrics.latency);
                (latency, backend)
            })
            .collect();

        measured.sort_by(|(a, _), (b, _)| match (a, b) {
            (Some(a), Some(b)) => a.total_cmp(b),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        measured.into_iter().map(|(_, backend)| backend).collect()
    }

    fn meets_floors(&self, backend_id: &str, requirements: &TaskRequirements) -> bool {
        requirements
            .min_scores
            .iter()
            .all(|(capability, floor)| self.scorer.get_capability_score(backend_id, capability) >= *floor)
    }

    async fn first_with_role(&self, role: Role) -> Option<Arc<dyn ModelBackend>> {
        self.backends
            .read()
            .await
            .iter()
            .find(|r| r.serves(role))
            .map(|r| Arc::clone(&r.backend))
    }
}

#[async_trait]
impl ModelRegistry for ScoredModelRegistry {
    async fn get_model_chain(&self, requirements: &TaskRequirements) -> Result<ModelChain> {
        let planner = self
            .first_with_role(Role::Planner)
            .await
            .ok_or_else(|| CoreError::NotFound("no planner registered".to_string()))?;

        let mut executors = self.rank_executors(requirements).await.into_iter();
        let executor = executors.next().ok_or_else(|| {
            CoreError::NotFound(format!(
                "no executor offers capability '{}'",
                requirements.primary_capability
            ))
        })?;

        let mut chain = ModelChain::new(planner, executor).with_fallback(executors.collect());

        if requirements.context_size > 0 {
            match self.first_with_role(Role::Context).await {
                Some(context) => chain = chain.with_context(context),
                None => warn!(
                    context_size = requirements.context_size,
                    "Context requested but no context backend registered"
                ),
            }
        }
        if let Some(reviewer) = self.first_with_role(Role::Reviewer).await {
            chain = chain.with_reviewer(reviewer);
        }

        debug!(?chain, "Built model chain");
        Ok(chain)
    }
}
