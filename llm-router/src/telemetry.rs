use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_TARGET: &str = "llm_router";

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    /// Level applied to the router's own crates.
    pub level: String,
    /// Full filter directive; overrides `level` and `RUST_LOG`.
    pub filter: Option<String>,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            filter: None,
            format: LogFormat::Compact,
        }
    }
}

impl LogConfig {
    /// Explicit filter first, then `RUST_LOG`, then `llm_router=<level>`.
    pub fn env_filter(&self) -> Result<EnvFilter> {
        if let Some(filter) = &self.filter {
            return EnvFilter::try_new(filter)
                .with_context(|| format!("invalid log filter `{filter}`"));
        }
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => EnvFilter::try_new(format!("{DEFAULT_TARGET}={}", self.level))
                .with_context(|| format!("invalid log level `{}`", self.level)),
        }
    }
}

/// Installs the global subscriber. Fails if one is already installed.
pub fn init_tracing(config: &LogConfig) -> Result<()> {
    let env_filter = config.env_filter()?;

    match config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_filter(env_filter),
            )
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(fmt::layer().pretty().with_filter(env_filter))
            .try_init(),
        LogFormat::Compact => tracing_subscriber::registry()
            .with(fmt::layer().compact().with_filter(env_filter))
            .try_init(),
    }
    .context("failed to install tracing subscriber")?;

    info!(format = ?config.format, "Tracing initialized");
    Ok(())
}
