//! Unit tests for log.rs
//!
//! Tests LogSeverity, LogEntry formatting, DefaultLogger and MemoryLogger.

use crate::log::{DefaultLogger, LogEntry, LogSeverity, Logger, MemoryLogger};
use crate::engine::Engine;
use serial_test::serial;
use std::time::SystemTime;

fn entry(severity: LogSeverity, message: &str) -> LogEntry {
    LogEntry {
        severity,
        timestamp: SystemTime::now(),
        source: "ember3d::tests".to_string(),
        message: message.to_string(),
        file: None,
        line: None,
    }
}

// ============================================================================
// LOG SEVERITY TESTS
// ============================================================================

#[test]
fn test_log_severity_ordering() {
    assert!(LogSeverity::Trace < LogSeverity::Debug);
    assert!(LogSeverity::Debug < LogSeverity::Info);
    assert!(LogSeverity::Info < LogSeverity::Warn);
    assert!(LogSeverity::Warn < LogSeverity::Error);
}

#[test]
fn test_log_severity_labels_are_fixed_width() {
    for severity in [
        LogSeverity::Trace,
        LogSeverity::Debug,
        LogSeverity::Info,
        LogSeverity::Warn,
        LogSeverity::Error,
    ] {
        assert_eq!(severity.label().len(), 5);
    }
}

// ============================================================================
// DEFAULT LOGGER
// ============================================================================

#[test]
fn test_format_plain_without_location() {
    let line = DefaultLogger::format_plain(&entry(LogSeverity::Info, "ready"));
    assert!(line.contains("[INFO ]"));
    assert!(line.contains("[ember3d::tests] ready"));
    assert!(!line.contains("("));
}

#[test]
fn test_format_plain_with_location() {
    let mut e = entry(LogSeverity::Error, "broken");
    e.file = Some("context.rs");
    e.line = Some(42);
    let line = DefaultLogger::format_plain(&e);
    assert!(line.contains("[ERROR]"));
    assert!(line.ends_with("broken (context.rs:42)"));
}

#[test]
fn test_default_logger_threshold() {
    let logger = DefaultLogger::with_min_severity(LogSeverity::Warn);
    assert_eq!(logger.min_severity, LogSeverity::Warn);
    // Below threshold: silently dropped
    logger.log(&entry(LogSeverity::Debug, "hidden"));
    assert_eq!(DefaultLogger::default().min_severity, LogSeverity::Trace);
}

// ============================================================================
// MEMORY LOGGER
// ============================================================================

#[test]
fn test_memory_logger_records_entries() {
    let logger = MemoryLogger::new();
    logger.log(&entry(LogSeverity::Warn, "uniform 'u_time' not found"));
    logger.log(&entry(LogSeverity::Info, "loaded"));

    assert_eq!(logger.entries().len(), 2);
    assert_eq!(logger.count(LogSeverity::Warn), 1);
    assert!(logger.contains(LogSeverity::Warn, "u_time"));
    assert!(!logger.contains(LogSeverity::Error, "u_time"));

    logger.clear();
    assert!(logger.entries().is_empty());
}

#[test]
fn test_memory_logger_clones_share_entries() {
    let logger = MemoryLogger::new();
    let observer = logger.clone();
    logger.log(&entry(LogSeverity::Error, "boom"));
    assert_eq!(observer.count(LogSeverity::Error), 1);
}

// ============================================================================
// GLOBAL LOGGER
// ============================================================================

#[test]
#[serial]
fn test_macros_route_to_installed_logger() {
    let logger = MemoryLogger::new();
    Engine::set_logger(logger.clone());

    crate::engine_info!("ember3d::tests", "value = {}", 7);
    crate::engine_error!("ember3d::tests", "failure {}", "here");

    let entries: Vec<_> = logger
        .entries()
        .into_iter()
        .filter(|entry| entry.source == "ember3d::tests")
        .collect();
    Engine::reset_logger();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].message, "value = 7");
    assert!(entries[0].file.is_none());
    assert_eq!(entries[1].severity, LogSeverity::Error);
    assert!(entries[1].file.is_some());
    assert!(entries[1].line.is_some());
}
