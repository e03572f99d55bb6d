//! Time values, intervals and the global clock state
//!
//! - `Time` - Seconds on the global timeline
//! - `TimeFrame` - Interval with configurable boundary inclusivity
//! - `ClockState` - Read-only view of the authoritative clock

use serde::{Deserialize, Serialize};
use std::fmt;

/// A point on the global timeline, in seconds
pub type Time = f64;

/// Which boundaries of a `TimeFrame` count as inside
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ContainsMode {
    /// `start <= t <= end`
    #[default]
    Inclusive,
    /// `start < t < end`
    Exclusive,
    /// `start < t <= end`
    StartExclusive,
    /// `start <= t < end`
    EndExclusive,
}

/// An interval of time with a start and an end
///
/// The end may be `Time::INFINITY` for a window that never closes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeFrame {
    start: Time,
    end: Time,
}

impl TimeFrame {
    /// Create a frame from `start` to `end`
    pub fn new(start: Time, end: Time) -> Self {
        Self { start, end }
    }

    /// Create a frame starting at `start` that never ends
    pub fn open_ended(start: Time) -> Self {
        Self {
            start,
            end: Time::INFINITY,
        }
    }

    pub fn start(&self) -> Time {
        self.start
    }

    pub fn end(&self) -> Time {
        self.end
    }

    /// Length of the frame (infinite for open-ended frames)
    pub fn duration(&self) -> Time {
        self.end - self.start
    }

    pub fn is_open_ended(&self) -> bool {
        self.end == Time::INFINITY
    }

    /// Check whether `time` falls inside the frame under the given mode
    pub fn contains_time(&self, time: Time, mode: ContainsMode) -> bool {
        match mode {
            ContainsMode::Inclusive => self.start <= time && time <= self.end,
            ContainsMode::Exclusive => self.start < time && time < self.end,
            ContainsMode::StartExclusive => self.start < time && time <= self.end,
            ContainsMode::EndExclusive => self.start <= time && time < self.end,
        }
    }

    /// Check whether two frames share at least one point (boundaries included)
    pub fn has_overlap(&self, other: &TimeFrame) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.3}, {:.3}]", self.start, self.end)
    }
}

/// Snapshot of the authoritative clock
///
/// Only `GlobalTimeManager` mutates this; everything else receives a copy
/// or a shared reference for the duration of a tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClockState {
    /// Current global time
    pub cur_time: Time,
    /// Global time before the last update
    pub prev_time: Time,
    /// Greatest time ever reached while recording
    pub farthest_time: Time,
    /// `cur_time - prev_time` of the last update
    pub delta_time: Time,
    /// Multiplier applied to the fixed step
    pub time_scale: f64,
    /// Length of one fixed tick in seconds
    pub fixed_delta_time: Time,
    /// False while any global should-not-record request is outstanding
    pub should_record: bool,
}

impl ClockState {
    /// Create a clock at `start_time` with the given fixed step
    pub fn new(start_time: Time, fixed_delta_time: Time, time_scale: f64) -> Self {
        Self {
            cur_time: start_time,
            prev_time: start_time,
            farthest_time: start_time,
            delta_time: 0.0,
            time_scale,
            fixed_delta_time,
            should_record: true,
        }
    }

    /// The time the next recording tick would move to
    pub fn next_tick_time(&self) -> Time {
        (self.cur_time + self.time_scale * self.fixed_delta_time).max(0.0)
    }

    /// Whether the clock is currently behind its farthest recorded time
    pub fn is_rewound(&self) -> bool {
        self.cur_time < self.farthest_time
    }
}

impl Default for ClockState {
    fn default() -> Self {
        Self::new(0.0, 0.02, 1.0)
    }
}
