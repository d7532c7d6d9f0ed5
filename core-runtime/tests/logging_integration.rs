//! Integration tests for logging system
//!
//! Each integration test binary is its own process, so the global subscriber
//! can be installed here exactly once.

use bridge_traits::time::LogLevel;
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use core_runtime::Error;

#[test]
fn test_logging_initializes_once_per_process() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Debug)
        .ignore_env()
        .with_span_events(true);

    init_logging(config.clone()).unwrap();
    let span = tracing::info_span!("reconcile", playlist_id = "p1");
    span.in_scope(|| tracing::info!(tracks_added = 2, "Logging from an integration test"));

    let err = init_logging(config).unwrap_err();
    assert!(matches!(err, Error::Config(msg) if msg.contains("Failed to initialize logging")));
}

#[test]
fn test_invalid_filter_is_rejected_before_install() {
    let config = LoggingConfig::default().with_filter("core_sync=loudest");

    let err = init_logging(config).unwrap_err();
    assert!(matches!(err, Error::Config(msg) if msg.contains("Invalid log filter")));
}

#[test]
fn test_config_chaining() {
    let config = LoggingConfig::default()
        .with_format("json".parse().unwrap())
        .with_level(LogLevel::Warn)
        .with_target(false)
        .with_thread(true)
        .ignore_env();

    assert_eq!(config.format, LogFormat::Json);
    assert_eq!(config.level, LogLevel::Warn);
    assert!(!config.display_target);
    assert!(config.display_thread);
    assert!(!config.respect_env);
    assert!(config.filter.is_none());
}
