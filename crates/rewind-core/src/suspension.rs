//! Reference-counted, handle-based suspension of recording
//!
//! Used both per object (`TimedObject`) and globally (`GlobalTimeManager`).
//! Every request hands out a fresh handle; recording stays suspended until
//! every outstanding handle has been cancelled.

use crate::error::{Error, Result};
use crate::SuspensionHandle;
use std::collections::HashSet;

/// Outstanding suspension requests
#[derive(Debug, Clone, Default)]
pub struct SuspensionSet {
    outstanding: HashSet<SuspensionHandle>,
    next_handle: u64,
}

impl SuspensionSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a request and return its handle
    pub fn request(&mut self) -> SuspensionHandle {
        let handle = SuspensionHandle(self.next_handle);
        self.next_handle += 1;
        self.outstanding.insert(handle);
        handle
    }

    /// Cancel a request
    ///
    /// Unknown or already-cancelled handles are rejected and leave the count
    /// untouched.
    pub fn cancel(&mut self, handle: SuspensionHandle) -> Result<()> {
        if self.outstanding.remove(&handle) {
            Ok(())
        } else {
            Err(Error::UnknownSuspension(handle))
        }
    }

    /// Number of outstanding requests
    pub fn count(&self) -> usize {
        self.outstanding.len()
    }

    pub fn is_suspended(&self) -> bool {
        !self.outstanding.is_empty()
    }

    pub fn contains(&self, handle: SuspensionHandle) -> bool {
        self.outstanding.contains(&handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_counting() {
        let mut set = SuspensionSet::new();
        let a = set.request();
        let b = set.request();
        assert_ne!(a, b);
        assert_eq!(set.count(), 2);

        set.cancel(a).unwrap();
        assert!(set.is_suspended());

        set.cancel(b).unwrap();
        assert!(!set.is_suspended());
    }

    #[test]
    fn test_double_cancel_rejected() {
        let mut set = SuspensionSet::new();
        let a = set.request();
        let _b = set.request();

        set.cancel(a).unwrap();
        assert!(matches!(set.cancel(a), Err(Error::UnknownSuspension(h)) if h == a));
        assert_eq!(set.count(), 1);
    }

    #[test]
    fn test_foreign_handle_rejected() {
        let mut other = SuspensionSet::new();
        let mut set = SuspensionSet::new();
        let _ = other.request();
        let foreign = other.request();

        assert!(set.cancel(foreign).is_err());
        assert_eq!(set.count(), 0);
    }
}
