use llm_router::*;

#[test]
fn test_tracing_installs_once() {
    let config = LogConfig {
        filter: Some("llm_router=debug".to_string()),
        format: LogFormat::Json,
        ..Default::default()
    };

    init_tracing(&config).unwrap();
    tracing::info!("subscriber installed");

    let err = init_tracing(&LogConfig::default()).unwrap_err();
    assert!(err.to_string().contains("tracing subscriber"));
}
