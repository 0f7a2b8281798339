//! Error types for the toolpath crate.
//!
//! Generation itself is infallible for a validated configuration; these
//! errors cover arithmetic preconditions and failures of the output sink.

use std::io;
use thiserror::Error;

/// Errors that can occur while generating a calibration program.
#[derive(Error, Debug)]
pub enum ToolpathError {
    /// A parameter ramp cannot be built from the given bounds.
    #[error("Invalid ramp: {segments} segment(s), at least 2 are required")]
    InvalidRamp { segments: u32 },

    /// A geometry precondition does not hold.
    #[error("Geometry error: {0}")]
    Geometry(String),

    /// The output sink rejected a line.
    #[error("Output error: {0}")]
    Sink(#[from] io::Error),
}

/// Result type alias for toolpath operations.
pub type ToolpathResult<T> = Result<T, ToolpathError>;

impl From<ToolpathError> for calikit_core::Error {
    fn from(err: ToolpathError) -> Self {
        match err {
            ToolpathError::Sink(e) => calikit_core::Error::Io(e),
            other => calikit_core::Error::other(other.to_string()),
        }
    }
}
