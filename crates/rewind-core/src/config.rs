//! Clock and timed object configuration
//!
//! Both structs deserialize from RON with every field optional:
//!
//! ```rust
//! use rewind_core::ClockConfig;
//!
//! let config = ClockConfig::from_ron_str("(fixed_delta_time: 0.01)").unwrap();
//! assert_eq!(config.fixed_delta_time, 0.01);
//! assert_eq!(config.time_scale, 1.0);
//! ```

use crate::error::{Error, Result};
use crate::{ClockState, Time};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Settings for the global clock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Length of one fixed tick in seconds
    pub fixed_delta_time: Time,
    /// Initial time scale (negative runs the clock backwards)
    pub time_scale: f64,
    /// Time the clock starts at
    pub start_time: Time,
    /// Longest frame a host loop will feed into the fixed-step accumulator
    pub max_frame_time: Time,
}

impl ClockConfig {
    /// Parse a configuration from a RON string
    pub fn from_ron_str(content: &str) -> Result<Self> {
        let config: Self = ron::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a RON file
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_ron_str(&content)
    }

    /// Check that the values describe a usable clock
    pub fn validate(&self) -> Result<()> {
        if !(self.fixed_delta_time.is_finite() && self.fixed_delta_time > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "fixed_delta_time must be positive, got {}",
                self.fixed_delta_time
            )));
        }
        if !self.time_scale.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "time_scale must be finite, got {}",
                self.time_scale
            )));
        }
        if !(self.start_time.is_finite() && self.start_time >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "start_time must be a non-negative number, got {}",
                self.start_time
            )));
        }
        if self.max_frame_time < self.fixed_delta_time {
            return Err(Error::InvalidConfig(format!(
                "max_frame_time ({}) is shorter than one tick ({})",
                self.max_frame_time, self.fixed_delta_time
            )));
        }
        Ok(())
    }

    /// The clock state this configuration starts from
    pub fn initial_state(&self) -> ClockState {
        ClockState::new(self.start_time, self.fixed_delta_time, self.time_scale)
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            fixed_delta_time: 0.02,
            time_scale: 1.0,
            start_time: 0.0,
            max_frame_time: 0.25,
        }
    }
}

/// Recording behaviour of a single timed object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimedObjectConfig {
    /// Whether the object records at all
    pub should_record: bool,
    /// Record whenever allowed, even at or before the object's farthest time
    ///
    /// When false the object only records strictly beyond the farthest time
    /// it has already seen.
    pub always_record_when_should: bool,
}

impl TimedObjectConfig {
    /// Parse a configuration from a RON string
    pub fn from_ron_str(content: &str) -> Result<Self> {
        Ok(ron::from_str(content)?)
    }

    /// An object that never records and only replays what it is given
    pub fn replay_only() -> Self {
        Self {
            should_record: false,
            always_record_when_should: false,
        }
    }
}

impl Default for TimedObjectConfig {
    fn default() -> Self {
        Self {
            should_record: true,
            always_record_when_should: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_defaults() {
        let config = ClockConfig::default();
        assert!(config.validate().is_ok());
        let state = config.initial_state();
        assert_eq!(state.cur_time, 0.0);
        assert_eq!(state.fixed_delta_time, 0.02);
        assert!(state.should_record);
    }

    #[test]
    fn test_clock_from_ron() {
        let config = ClockConfig::from_ron_str(
            "(fixed_delta_time: 0.05, time_scale: -1.0, start_time: 2.0)",
        )
        .unwrap();
        assert_eq!(config.fixed_delta_time, 0.05);
        assert_eq!(config.time_scale, -1.0);
        assert_eq!(config.initial_state().farthest_time, 2.0);
        assert_eq!(config.max_frame_time, 0.25);
    }

    #[test]
    fn test_clock_rejects_bad_values() {
        assert!(matches!(
            ClockConfig::from_ron_str("(fixed_delta_time: 0.0)"),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            ClockConfig::from_ron_str("(start_time: -1.0)"),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            ClockConfig::from_ron_str("(fixed_delta_time: "),
            Err(Error::Ron(_))
        ));
    }

    #[test]
    fn test_object_config_from_ron() {
        let config = TimedObjectConfig::from_ron_str("(always_record_when_should: false)").unwrap();
        assert!(config.should_record);
        assert!(!config.always_record_when_should);
        assert!(!TimedObjectConfig::replay_only().should_record);
    }
}
