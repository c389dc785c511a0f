use llm_router_core::*;
use rstest::rstest;
use std::time::Duration;
use validator::Validate;

// ===== OrchestratorConfig Tests =====

#[test]
fn test_orchestrator_config_default() {
    let config = OrchestratorConfig::default();
    assert_eq!(config.max_retries, 3);
    assert_eq!(config.backoff_base_ms, 1000);
    assert!(config.validate().is_ok());
}

#[rstest]
#[case(1, Duration::from_secs(2))]
#[case(2, Duration::from_secs(4))]
#[case(3, Duration::from_secs(8))]
fn test_backoff_is_exponential(#[case] attempt: usize, #[case] expected: Duration) {
    assert_eq!(OrchestratorConfig::default().backoff_delay(attempt), expected);
}

#[test]
fn test_backoff_saturates() {
    let config = OrchestratorConfig::default();
    assert_eq!(config.backoff_delay(200), Duration::from_millis(u64::MAX));
}

#[test]
fn test_orchestrator_config_rejects_zero_retries() {
    let config = OrchestratorConfig {
        max_retries: 0,
        ..Default::default()
    };
    assert!(config.validate().is_err());
}

// ===== ScoringConfig Tests =====

#[test]
fn test_scoring_config_default() {
    let config = ScoringConfig::default();
    assert_eq!(config.decay_factor, 0.95);
    assert_eq!(config.min_samples, 5);
    assert_eq!(config.latency_norm_ms, 1000.0);
    assert_eq!(config.time_window(), chrono::Duration::days(7));
    assert!(config.validate().is_ok());
}

#[rstest]
#[case(0.0)]
#[case(1.5)]
#[case(-0.1)]
fn test_scoring_config_rejects_bad_decay(#[case] decay_factor: f64) {
    let config = ScoringConfig {
        decay_factor,
        ..Default::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_scoring_config_rejects_negative_weight() {
    let mut config = ScoringConfig::default();
    config.weight_factors.latency = -1.0;
    assert!(config.validate().is_err());
}

#[test]
fn test_scoring_config_partial_deserialization() {
    let config: ScoringConfig = serde_json::from_str(r#"{"min_samples": 2}"#).unwrap();
    assert_eq!(config.min_samples, 2);
    assert_eq!(config.decay_factor, 0.95);
}

// ===== SynthesizerConfig Tests =====

#[test]
fn test_synthesizer_config_default() {
    let config = SynthesizerConfig::default();
    assert!(config.require_all_phases);
    assert!(config.validate_results);
    assert!(config.include_schema);
    assert_eq!(config.preferred_format, None);
    assert_eq!(config.indent_width, 2);
}

#[test]
fn test_output_format_serialization() {
    let format: OutputFormat = serde_json::from_str("\"structured\"").unwrap();
    assert_eq!(format, OutputFormat::Structured);
    assert_eq!(OutputFormat::Code.to_string(), "code");
}
