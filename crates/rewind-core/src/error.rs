//! Error types for rewind-core

use crate::{SuspensionHandle, Time, TimeObjectId};
use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("Timed object '{0}' has no recorders or observers attached")]
    NoComponents(String),

    #[error("Invalid time value: {0}")]
    InvalidTime(Time),

    #[error("Timed object not found: {0}")]
    ObjectNotFound(TimeObjectId),

    #[error("Unknown or already cancelled suspension: {0}")]
    UnknownSuspension(SuspensionHandle),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
