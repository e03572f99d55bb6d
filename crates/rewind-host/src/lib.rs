//! Rewind Host - Fixed-step host loop and scripted sequences
//!
//! Engine integrations drive a `GlobalTimeManager` through this crate:
//! - **Host**: owns the manager, accumulates frame time and runs fixed steps
//! - **Lifecycle**: explicit `init` / `tick` / `teardown` hooks
//! - **Sequence**: scripted waits, rewinds and recording pauses
//!
//! # Example
//!
//! ```rust
//! use rewind_core::ClockConfig;
//! use rewind_host::{Host, Sequence, Step};
//!
//! let config = ClockConfig {
//!     fixed_delta_time: 1.0,
//!     max_frame_time: 1.0,
//!     ..ClockConfig::default()
//! };
//! let mut host = Host::new(config).unwrap();
//! host.add_lifecycle(Sequence::new(vec![
//!     Step::Wait(3.0),
//!     Step::RewindTo { target: 1.0, speed: 2.0 },
//! ]))
//! .unwrap();
//!
//! host.init().unwrap();
//! for _ in 0..5 {
//!     host.advance(1.0).unwrap();
//! }
//! assert_eq!(host.manager().cur_time(), 1.0);
//! assert_eq!(host.manager().farthest_time(), 4.0);
//! host.teardown().unwrap();
//! ```

mod error;
mod host;
mod lifecycle;
mod sequence;

pub use error::{Error, Result};
pub use host::{Host, HostState};
pub use lifecycle::Lifecycle;
pub use sequence::{Sequence, SequenceState, Step};
