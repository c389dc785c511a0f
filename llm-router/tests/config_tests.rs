use llm_router::*;
use pretty_assertions::assert_eq;
use serial_test::serial;
use std::fs;
use tempfile::TempDir;

const ENV_VARS: [&str; 3] = [
    "LLM_ROUTER__ORCHESTRATOR__MAX_RETRIES",
    "LLM_ROUTER__SCORING__WEIGHT_FACTORS__LATENCY",
    "LLM_ROUTER__LOGGING__FORMAT",
];

struct EnvGuard;

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
    }
}

fn config_dir(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (name, contents) in files {
        fs::write(dir.path().join(name), contents).unwrap();
    }
    dir
}

// ===== Defaults =====

#[test]
#[serial]
fn test_defaults_without_sources() {
    let _guard = EnvGuard;
    let dir = config_dir(&[]);

    let config = RouterConfig::load_from(dir.path()).unwrap();

    assert_eq!(config, RouterConfig::default());
    assert_eq!(config.orchestrator.max_retries, 3);
    assert_eq!(config.orchestrator.backoff_base_ms, 1000);
    assert_eq!(config.scoring.min_samples, 5);
    assert_eq!(config.logging.format, LogFormat::Compact);
}

// ===== File Sources =====

#[test]
#[serial]
fn test_default_file_overrides_builtins() {
    let _guard = EnvGuard;
    let dir = config_dir(&[(
        "default.toml",
        r#"
[orchestrator]
max_retries = 5

[scoring]
decay_factor = 0.9

[synthesizer]
preferred_format = "json"
include_schema = false

[logging]
format = "json"
"#,
    )]);

    let config = RouterConfig::load_from(dir.path()).unwrap();

    assert_eq!(config.orchestrator.max_retries, 5);
    assert_eq!(config.orchestrator.backoff_base_ms, 1000);
    assert_eq!(config.scoring.decay_factor, 0.9);
    assert_eq!(config.scoring.min_samples, 5);
    assert_eq!(config.synthesizer.preferred_format, Some(OutputFormat::Json));
    assert!(!config.synthesizer.include_schema);
    assert_eq!(config.logging.format, LogFormat::Json);
}

#[test]
#[serial]
fn test_local_file_overrides_default_file() {
    let _guard = EnvGuard;
    let dir = config_dir(&[
        ("default.toml", "[orchestrator]\nmax_retries = 5\nbackoff_base_ms = 250\n"),
        ("local.json", r#"{"orchestrator": {"max_retries": 7}}"#),
    ]);

    let config = RouterConfig::load_from(dir.path()).unwrap();

    assert_eq!(config.orchestrator.max_retries, 7);
    assert_eq!(config.orchestrator.backoff_base_ms, 250);
}

// ===== Environment =====

#[test]
#[serial]
fn test_environment_overrides_files() {
    let _guard = EnvGuard;
    let dir = config_dir(&[("default.toml", "[orchestrator]\nmax_retries = 5\n")]);
    std::env::set_var("LLM_ROUTER__ORCHESTRATOR__MAX_RETRIES", "9");
    std::env::set_var("LLM_ROUTER__SCORING__WEIGHT_FACTORS__LATENCY", "0.6");
    std::env::set_var("LLM_ROUTER__LOGGING__FORMAT", "pretty");

    let config = RouterConfig::load_from(dir.path()).unwrap();

    assert_eq!(config.orchestrator.max_retries, 9);
    assert_eq!(config.scoring.weight_factors.latency, 0.6);
    assert_eq!(config.scoring.weight_factors.success_rate, 0.3);
    assert_eq!(config.logging.format, LogFormat::Pretty);
}

// ===== Validation =====

#[test]
#[serial]
fn test_rejects_zero_retries() {
    let _guard = EnvGuard;
    let dir = config_dir(&[("default.toml", "[orchestrator]\nmax_retries = 0\n")]);

    let err = RouterConfig::load_from(dir.path()).unwrap_err();

    assert!(err.to_string().contains("orchestrator"), "{err:#}");
}

#[test]
#[serial]
fn test_rejects_decay_above_one() {
    let _guard = EnvGuard;
    let dir = config_dir(&[("default.toml", "[scoring]\ndecay_factor = 1.5\n")]);

    assert!(RouterConfig::load_from(dir.path()).is_err());
}

#[test]
#[serial]
fn test_rejects_unknown_format() {
    let _guard = EnvGuard;
    let dir = config_dir(&[("default.toml", "[synthesizer]\npreferred_format = \"yaml\"\n")]);

    let err = RouterConfig::load_from(dir.path()).unwrap_err();

    assert!(format!("{err:#}").contains("malformed"));
}
