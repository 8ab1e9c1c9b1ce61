//! Tests for [`relay_core::init_tracing`].

use relay_core::init_tracing;

/// **Test: init_tracing creates the log file (and missing parent dirs) and refuses a second install.**
#[test]
fn test_init_tracing_creates_log_file_once() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("logs").join("relay.log");
    let path_str = path.to_str().expect("temp path is utf-8");

    init_tracing(path_str).expect("first init should succeed");
    tracing::info!(component = "logger_test", "hello from the test");

    assert!(path.exists());
    assert!(init_tracing(path_str).is_err());
}
