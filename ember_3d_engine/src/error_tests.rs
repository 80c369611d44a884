//! Unit tests for error.rs
//!
//! Tests all Error variants, their Display output and the error macros.

use crate::error::{Error, Result};
use crate::{engine_bail, engine_err};

// ============================================================================
// ERROR DISPLAY TESTS
// ============================================================================

#[test]
fn test_backend_error_display() {
    let err = Error::BackendError("context lost".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Backend error"));
    assert!(display.contains("context lost"));
}

#[test]
fn test_out_of_memory_display() {
    assert_eq!(format!("{}", Error::OutOfMemory), "Out of GPU memory");
}

#[test]
fn test_invalid_resource_display() {
    let err = Error::InvalidResource("Texture not found".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Invalid resource"));
    assert!(display.contains("Texture not found"));
}

#[test]
fn test_io_display_names_path() {
    let err = Error::Io {
        path: "res/missing.nbr".to_string(),
        message: "No such file".to_string(),
    };
    let display = format!("{}", err);
    assert!(display.contains("res/missing.nbr"));
    assert!(display.contains("No such file"));
}

#[test]
fn test_type_mismatch_display() {
    let err = Error::ResourceTypeMismatch {
        expected: "Texture".to_string(),
        found: "Shader".to_string(),
    };
    assert_eq!(
        format!("{}", err),
        "Resource type mismatch: expected Texture, found Shader"
    );
}

#[test]
fn test_malformed_container_display() {
    let err = Error::MalformedContainer("truncated body".to_string());
    assert!(format!("{}", err).contains("truncated body"));
}

// ============================================================================
// ERROR TRAIT IMPLEMENTATIONS
// ============================================================================

#[test]
fn test_error_is_std_error() {
    let err = Error::OutOfMemory;
    let _: &dyn std::error::Error = &err;
}

#[test]
fn test_error_clone_and_eq() {
    let err = Error::InitializationFailed("backend 3.3".to_string());
    assert_eq!(err.clone(), err);
    assert_ne!(err, Error::OutOfMemory);
}

// ============================================================================
// MACROS
// ============================================================================

fn failing(value: u32) -> Result<u32> {
    if value == 0 {
        engine_bail!("ember3d::tests", "value {} rejected", value);
    }
    Ok(value * 2)
}

#[test]
fn test_engine_bail_returns_invalid_resource() {
    assert_eq!(failing(3), Ok(6));
    assert_eq!(
        failing(0),
        Err(Error::InvalidResource("value 0 rejected".to_string()))
    );
}

#[test]
fn test_engine_err_builds_error() {
    let err = engine_err!("ember3d::tests", "missing {}", "shader");
    assert_eq!(err, Error::InvalidResource("missing shader".to_string()));
}
