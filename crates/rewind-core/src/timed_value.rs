//! Plain values that follow the global clock
//!
//! A `TimedValue` is a shared cell registered with the `GlobalTimeManager`.
//! While the clock records, every change is stored with the time it was
//! observed at; while the clock replays, the value snaps back to whatever it
//! was at the current time. This covers simple state (a score, a door flag)
//! that doesn't warrant a full recorder.
//!
//! ```rust
//! use rewind_core::{ClockConfig, GlobalTimeManager, TimedValue};
//!
//! let mut manager = GlobalTimeManager::new(ClockConfig::default());
//! let score = TimedValue::new(0u32);
//! manager.add_timed_value(score.clone());
//!
//! manager.tick();
//! score.set(10);
//! manager.tick();
//!
//! let pause = manager.request_should_not_record();
//! manager.set_time(0.0);
//! assert_eq!(score.get(), 0);
//! manager.cancel_should_not_record_request(pause).unwrap();
//! ```

use crate::{ClockState, Time};
use std::cell::RefCell;
use std::rc::Rc;

/// Anything the manager updates after all timed objects
pub trait TimedSlot {
    fn set_to_time(&mut self, clock: &ClockState);
}

#[derive(Debug)]
struct History<T> {
    initial: T,
    current: T,
    /// (time, value) pairs sorted by time
    changes: Vec<(Time, T)>,
}

impl<T: Clone + PartialEq> History<T> {
    fn value_at(&self, time: Time) -> &T {
        let index = self.changes.partition_point(|(t, _)| *t <= time);
        match index {
            0 => &self.initial,
            i => &self.changes[i - 1].1,
        }
    }

    fn record(&mut self, time: Time) {
        let keep = self.changes.partition_point(|(t, _)| *t <= time);
        self.changes.truncate(keep);

        if let Some((last_time, last_value)) = self.changes.last_mut() {
            if *last_time == time {
                *last_value = self.current.clone();
                return;
            }
        }
        if *self.value_at(time) != self.current {
            self.changes.push((time, self.current.clone()));
        }
    }
}

/// A shared value with per-time history
///
/// Clones share the same underlying value.
#[derive(Debug)]
pub struct TimedValue<T> {
    inner: Rc<RefCell<History<T>>>,
}

impl<T: Clone + PartialEq> TimedValue<T> {
    pub fn new(initial: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(History {
                initial: initial.clone(),
                current: initial,
                changes: Vec::new(),
            })),
        }
    }

    pub fn get(&self) -> T {
        self.inner.borrow().current.clone()
    }

    /// Change the value; it is stored in history on the next recording tick
    pub fn set(&self, value: T) {
        self.inner.borrow_mut().current = value;
    }

    /// The value as recorded at `time`
    pub fn value_at(&self, time: Time) -> T {
        self.inner.borrow().value_at(time).clone()
    }

    /// Number of recorded changes
    pub fn change_count(&self) -> usize {
        self.inner.borrow().changes.len()
    }
}

impl<T> Clone for TimedValue<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + PartialEq> TimedSlot for TimedValue<T> {
    fn set_to_time(&mut self, clock: &ClockState) {
        let mut history = self.inner.borrow_mut();
        if clock.should_record {
            history.record(clock.cur_time);
        } else {
            let value = history.value_at(clock.cur_time).clone();
            history.current = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock(time: Time, should_record: bool) -> ClockState {
        ClockState {
            cur_time: time,
            should_record,
            ..ClockState::default()
        }
    }

    #[test]
    fn test_records_only_changes() {
        let value = TimedValue::new(1);
        let mut slot = value.clone();

        slot.set_to_time(&clock(0.0, true));
        assert_eq!(value.change_count(), 0);

        value.set(2);
        slot.set_to_time(&clock(1.0, true));
        slot.set_to_time(&clock(2.0, true));
        assert_eq!(value.change_count(), 1);
        assert_eq!(value.value_at(0.5), 1);
        assert_eq!(value.value_at(1.0), 2);
    }

    #[test]
    fn test_replay_restores_past_value() {
        let value = TimedValue::new("closed");
        let mut slot = value.clone();

        value.set("open");
        slot.set_to_time(&clock(1.0, true));

        slot.set_to_time(&clock(0.5, false));
        assert_eq!(value.get(), "closed");

        slot.set_to_time(&clock(1.5, false));
        assert_eq!(value.get(), "open");
    }

    #[test]
    fn test_recording_after_rewind_drops_future() {
        let value = TimedValue::new(0);
        let mut slot = value.clone();

        value.set(1);
        slot.set_to_time(&clock(1.0, true));
        value.set(2);
        slot.set_to_time(&clock(2.0, true));

        slot.set_to_time(&clock(1.0, false));
        assert_eq!(value.get(), 1);

        value.set(5);
        slot.set_to_time(&clock(1.5, true));
        assert_eq!(value.value_at(3.0), 5);
        assert_eq!(value.change_count(), 2);
    }
}
