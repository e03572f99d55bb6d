//! Explicit lifecycle hooks driven by the host

use crate::Result;
use rewind_core::{GlobalTimeManager, Time};

/// Something the host drives alongside the clock
///
/// `init` runs once before the first tick, `tick` once per fixed step after
/// the clock has moved, `teardown` once when the host shuts down.
pub trait Lifecycle {
    fn init(&mut self, _manager: &mut GlobalTimeManager) -> Result<()> {
        Ok(())
    }

    /// Called after every fixed step
    ///
    /// `time` is the clock time after the step. `delta` is the host time the
    /// step covered, which keeps moving while the clock itself is paused.
    fn tick(&mut self, manager: &mut GlobalTimeManager, time: Time, delta: Time) -> Result<()>;

    fn teardown(&mut self, _manager: &mut GlobalTimeManager) {}
}
