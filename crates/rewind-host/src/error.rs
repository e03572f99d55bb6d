//! Error types for rewind-host

use thiserror::Error;

/// Host error type
#[derive(Debug, Error)]
pub enum Error {
    /// Error raised by the time manager
    #[error("Core error: {0}")]
    Core(#[from] rewind_core::Error),

    /// `init` called twice
    #[error("Host already initialized")]
    AlreadyInitialized,

    /// Host driven before `init` or after `teardown`
    #[error("Host not initialized")]
    NotInitialized,

    /// Negative or non-finite frame time
    #[error("Invalid frame step: {0}")]
    InvalidStep(f64),

    /// Sequence script failed to parse
    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// Result type for host operations
pub type Result<T> = std::result::Result<T, Error>;
