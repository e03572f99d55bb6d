//! Identity types for timed objects and suspension requests

use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle for a timed object registered with the clock
///
/// Assigned by `GlobalTimeManager::add_time_object` in registration order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TimeObjectId(pub u64);

impl TimeObjectId {
    /// Create a new object ID
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw ID value
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimeObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "object:{}", self.0)
    }
}

/// Opaque token returned by a suspension request
///
/// Only the exact handle handed out by a request can cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SuspensionHandle(pub(crate) u64);

impl SuspensionHandle {
    /// Get the raw handle value
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SuspensionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "suspension:{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_id() {
        let id = TimeObjectId::new(7);
        assert_eq!(id.raw(), 7);
        assert_eq!(format!("{}", id), "object:7");
    }

    #[test]
    fn test_suspension_handle_display() {
        let handle = SuspensionHandle(3);
        assert_eq!(handle.raw(), 3);
        assert_eq!(handle.to_string(), "suspension:3");
    }
}
