//! Error types for the Ember3D engine
//!
//! Every fallible engine operation returns [`Result`]. Failures that the
//! engine considers fatal (backend too old, container tag mismatch, pipeline
//! without a vertex buffer) are logged at ERROR level before being returned,
//! so callers only need to propagate them with `?`.

use std::fmt;

/// Result type for Ember3D engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ember3D engine errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Backend-specific error (GL driver, headless backend, etc.)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (texture, buffer, shader, etc.)
    InvalidResource(String),

    /// Initialization failed (context, storage manager, subsystems)
    InitializationFailed(String),

    /// A resource file could not be read
    Io {
        path: String,
        message: String,
    },

    /// A resource container holds a different kind of resource than requested
    ResourceTypeMismatch {
        expected: String,
        found: String,
    },

    /// A resource container is truncated or carries an unknown header
    MalformedContainer(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::Io { path, message } => write!(f, "I/O error on '{}': {}", path, message),
            Error::ResourceTypeMismatch { expected, found } => {
                write!(f, "Resource type mismatch: expected {}, found {}", expected, found)
            }
            Error::MalformedContainer(msg) => write!(f, "Malformed resource container: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Log an ERROR message and build an [`Error::InvalidResource`] from it
///
/// # Example
///
/// ```no_run
/// # use ember_3d_engine::engine_err;
/// let err = engine_err!("ember3d::Material", "Unknown shader {:?}", 42);
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::ember3d::Error::InvalidResource(message)
    }};
}

/// Log an ERROR message and return early with an [`Error::InvalidResource`]
///
/// # Example
///
/// ```no_run
/// # use ember_3d_engine::engine_bail;
/// # fn check(size: usize) -> ember_3d_engine::ember3d::Result<()> {
/// if size == 0 {
///     engine_bail!("ember3d::Buffer", "Buffer size must be non-zero");
/// }
/// # Ok(())
/// # }
/// ```
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
