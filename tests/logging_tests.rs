use tariff_store::config::LoggingConfig;
use tariff_store::logging::{LogContext, get_logger, get_logger_with_context, init_logging, parse_log_level};
use tracing::Level;

#[test]
fn init_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let config = LoggingConfig {
        level: "debug".to_string(),
        file: dir.path().join("tariff_store.log").to_string_lossy().to_string(),
        console_output: false,
        ..Default::default()
    };
    init_logging(&config).unwrap();
    init_logging(&config).unwrap();
    get_logger("logging_test").info("initialized twice");
}

#[test]
fn loggers_carry_their_component() {
    let logger = get_logger_with_context(
        LogContext::new("store").with_field("key", "solis_tariff_groups".to_string()),
    );
    assert_eq!(logger.component(), "store");
}

#[test]
fn level_names() {
    assert_eq!(parse_log_level("TRACE").unwrap(), Level::TRACE);
    assert_eq!(parse_log_level("warn").unwrap(), Level::WARN);
    assert!(parse_log_level("verbose").is_err());
}
