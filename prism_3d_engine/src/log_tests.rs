//! Unit tests for log.rs
//!
//! Tests Logger trait, LogEntry, LogSeverity, DefaultLogger and the error macros.

use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
use serial_test::serial;
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

/// Logger capturing the entries of this test module
///
/// Other tests may log concurrently; only `prism3d::test` entries are kept.
struct CaptureLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl CaptureLogger {
    fn install() -> Arc<Mutex<Vec<LogEntry>>> {
        let entries = Arc::new(Mutex::new(Vec::new()));
        Engine::set_logger(CaptureLogger { entries: entries.clone() });
        entries
    }
}

impl Logger for CaptureLogger {
    fn log(&self, entry: &LogEntry) {
        if entry.source != "prism3d::test" {
            return;
        }
        self.entries.lock().unwrap().push(entry.clone());
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
// DEFAULT LOGGER FORMAT
// ============================================================================

#[test]
fn test_format_plain_without_location() {
    let entry = LogEntry {
        severity: LogSeverity::Info,
        timestamp: SystemTime::now(),
        source: "prism3d::renderer".to_string(),
        message: "Resources initialized".to_string(),
        file: None,
        line: None,
    };

    let text = DefaultLogger::format_plain(&entry);
    assert!(text.contains("[INFO ]"));
    assert!(text.contains("[prism3d::renderer]"));
    assert!(text.ends_with("Resources initialized"));
}

#[test]
fn test_format_plain_with_location() {
    let entry = LogEntry {
        severity: LogSeverity::Error,
        timestamp: SystemTime::now(),
        source: "prism3d::transfer".to_string(),
        message: "Staging allocation failed".to_string(),
        file: Some("transfer.rs"),
        line: Some(42),
    };

    let text = DefaultLogger::format_plain(&entry);
    assert!(text.contains("[ERROR]"));
    assert!(text.ends_with("Staging allocation failed (transfer.rs:42)"));
}

// ============================================================================
// MACROS THROUGH THE GLOBAL LOGGER
// ============================================================================

#[test]
#[serial]
fn test_macros_route_to_custom_logger() {
    let entries = CaptureLogger::install();

    crate::engine_debug!("prism3d::test", "debug {}", 1);
    crate::engine_info!("prism3d::test", "info {}", 2);
    crate::engine_warn!("prism3d::test", "warn {}", 3);
    crate::engine_error!("prism3d::test", "error {}", 4);

    {
        let entries = entries.lock().unwrap();
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0].severity, LogSeverity::Debug);
        assert_eq!(entries[1].message, "info 2");
        assert_eq!(entries[2].severity, LogSeverity::Warn);
        assert_eq!(entries[3].severity, LogSeverity::Error);
        assert!(entries[3].file.is_some());
        assert!(entries[3].line.is_some());
        assert!(entries[0].file.is_none());
    }

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_engine_err_logs_and_builds_backend_error() {
    let entries = CaptureLogger::install();

    let err = crate::engine_err!("prism3d::test", "vkCreateBuffer returned {}", -2);
    assert!(matches!(err, Error::BackendError(ref msg) if msg == "vkCreateBuffer returned -2"));

    {
        let entries = entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].severity, LogSeverity::Error);
        assert_eq!(entries[0].source, "prism3d::test");
    }

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_engine_bail_returns_early() {
    let entries = CaptureLogger::install();

    fn fails(flag: bool) -> Result<u32> {
        if flag {
            crate::engine_bail!("prism3d::test", "bail with flag {}", flag);
        }
        Ok(7)
    }

    assert_eq!(fails(false).unwrap(), 7);
    assert!(matches!(fails(true), Err(Error::BackendError(_))));
    assert_eq!(entries.lock().unwrap().len(), 1);

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_engine_bail_warn_is_warn_level_invalid_resource() {
    let entries = CaptureLogger::install();

    fn soft() -> Result<()> {
        crate::engine_bail_warn!("prism3d::test", "blob size {} not aligned", 5);
    }

    assert!(matches!(soft(), Err(Error::InvalidResource(_))));
    assert_eq!(entries.lock().unwrap()[0].severity, LogSeverity::Warn);

    Engine::reset_logger();
}
