//! Rewind Core - Record/replay engine for rewindable game entities
//!
//! This crate provides the pieces needed to pause, rewind, fast-forward or
//! advance many independent entities from one authoritative clock, while
//! each entity rebuilds its own past state without re-simulating:
//! - `TimeFrame` - Time intervals with configurable boundary inclusivity
//! - `Moment` / `MomentAlbum` - Timestamped commands in a sorted timeline
//! - `Recorder` / `Observer` - The protocol components implement to rewind
//! - `MomentRecorder` - Recorder built on a moment album
//! - `TimedObject` - Per-entity activation and record/replay state machine
//! - `GlobalTimeManager` - The clock that drives every timed object
//!
//! ## Tick Order
//!
//! Each tick the clock moves first, then every registered object is updated
//! in registration order, so a component may rely on state another object
//! changed earlier in the same tick.
//!
//! ## Logging
//!
//! The crate logs through `tracing` and never installs a subscriber.

mod config;
mod error;
mod identity;
mod manager;
pub mod moment;
pub mod recorder;
mod suspension;
pub mod time;
mod timed_object;
mod timed_value;

pub use config::{ClockConfig, TimedObjectConfig};
pub use error::{Error, Result};
pub use identity::{SuspensionHandle, TimeObjectId};
pub use manager::GlobalTimeManager;
pub use moment::{Moment, MomentAlbum};
pub use recorder::{MomentRecorder, Observer, Recorder, TimeCommand, TimeContext};
pub use suspension::SuspensionSet;
pub use time::{ClockState, ContainsMode, Time, TimeFrame};
pub use timed_object::{TimeMode, TimedObject, TimedObjectBuilder};
pub use timed_value::{TimedSlot, TimedValue};
