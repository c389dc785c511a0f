use anyhow::{Context, Result};
use config::{Config as ConfigLoader, Environment, File};
use llm_router_core::{OrchestratorConfig, ScoringConfig, SynthesizerConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

use crate::telemetry::LogConfig;

pub const ENV_PREFIX: &str = "LLM_ROUTER";

/// Settings for every subsystem.
///
/// Sources, later ones winning: `<dir>/default.*`, `<dir>/local.*` (both
/// optional, any format the `config` crate knows), then environment
/// variables such as `LLM_ROUTER__ORCHESTRATOR__MAX_RETRIES=5`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RouterConfig {
    pub orchestrator: OrchestratorConfig,
    pub scoring: ScoringConfig,
    pub synthesizer: SynthesizerConfig,
    pub logging: LogConfig,
}

impl RouterConfig {
    pub fn load() -> Result<Self> {
        Self::load_from("config")
    }

    pub fn load_from(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let config = ConfigLoader::builder()
            .add_source(File::from(dir.join("default")).required(false))
            .add_source(File::from(dir.join("local")).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("failed to read router configuration")?;

        let config: Self = config
            .try_deserialize()
            .context("malformed router configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.orchestrator
            .validate()
            .context("invalid orchestrator configuration")?;
        self.scoring.validate().context("invalid scoring configuration")?;
        self.synthesizer
            .validate()
            .context("invalid synthesizer configuration")?;
        Ok(())
    }
}
