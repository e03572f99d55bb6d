//! Per-object activation and record/replay state machine
//!
//! Every tick a `TimedObject` works out from the global time whether it
//! exists at all, whether it is laying down new history or replaying old
//! history, and then drives its observers and recorders in a fixed order:
//!
//! 1. observers (`timed_update`, recording only)
//! 2. `trim_data_after` when recording overwrites a recorded future
//! 3. `on_recording_resume` / `on_recording_stop` on mode switches
//! 4. `set_to_time`, always last

use crate::error::{Error, Result};
use crate::recorder::{Observer, Recorder, TimeCommand, TimeContext};
use crate::suspension::SuspensionSet;
use crate::{ClockState, SuspensionHandle, Time, TimeObjectId, TimedObjectConfig};
use std::fmt;

/// What an object is doing at the current time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeMode {
    /// Before spawn, or past the recorded future without permission to record
    Inactive,
    /// Laying down new history
    Recording,
    /// Reconstructing previously recorded history
    Replaying,
}

/// A game entity taking part in rewind
pub struct TimedObject {
    id: TimeObjectId,
    name: String,
    config: TimedObjectConfig,
    spawn_time: Time,
    farthest_time: Time,
    spawn_on_register: bool,
    active: bool,
    is_recording: bool,
    was_recording: bool,
    suspensions: SuspensionSet,
    recorders: Vec<Box<dyn Recorder>>,
    observers: Vec<Box<dyn Observer>>,
}

impl TimedObject {
    /// Start building an object
    pub fn builder(name: impl Into<String>) -> TimedObjectBuilder {
        TimedObjectBuilder::new(name)
    }

    /// Update the object to the clock's current time
    ///
    /// Structural changes requested by components are pushed to `commands`.
    pub fn set_to_time(&mut self, clock: &ClockState, commands: &mut Vec<TimeCommand>) {
        let time = clock.cur_time;
        let previous_mode = self.mode();

        self.active = self.compute_active(time);
        if !self.active {
            self.log_mode_change(previous_mode, time);
            return;
        }

        self.was_recording = self.is_recording;
        self.is_recording = self.compute_recording(time, clock);
        self.log_mode_change(previous_mode, time);

        let delta = time - clock.prev_time;
        let mut ctx = TimeContext::new(
            clock,
            self.id,
            self.spawn_time,
            self.farthest_time,
            self.is_recording,
            commands,
        );

        if self.is_recording {
            for observer in &mut self.observers {
                observer.timed_update(delta, &mut ctx);
            }

            if time <= self.farthest_time {
                for recorder in &mut self.recorders {
                    recorder.trim_data_after(time, &mut ctx);
                }
            }
            self.farthest_time = time;
            ctx.set_farthest_time(time);
        }

        if self.is_recording && !self.was_recording {
            for recorder in &mut self.recorders {
                recorder.on_recording_resume(time, &mut ctx);
            }
        } else if !self.is_recording && self.was_recording {
            for recorder in &mut self.recorders {
                recorder.on_recording_stop(time, &mut ctx);
            }
        }

        for recorder in &mut self.recorders {
            recorder.set_to_time(time, &mut ctx);
        }
    }

    /// Suspend recording until the returned handle is cancelled
    ///
    /// Activation is re-evaluated against the clock right away.
    pub fn request_suspend_recording(&mut self, clock: &ClockState) -> SuspensionHandle {
        let handle = self.suspensions.request();
        tracing::debug!(
            object = %self.id,
            %handle,
            count = self.suspensions.count(),
            "recording suspended"
        );
        self.refresh_activation(clock.cur_time);
        handle
    }

    /// Cancel a suspension obtained from `request_suspend_recording`
    pub fn cancel_suspend_recording_request(
        &mut self,
        handle: SuspensionHandle,
        clock: &ClockState,
    ) -> Result<()> {
        if let Err(err) = self.suspensions.cancel(handle) {
            tracing::warn!(object = %self.id, %handle, "cancelling unknown suspension");
            return Err(err);
        }
        tracing::debug!(
            object = %self.id,
            %handle,
            count = self.suspensions.count(),
            "suspension cancelled"
        );
        self.refresh_activation(clock.cur_time);
        Ok(())
    }

    /// Overwrite the spawn and farthest times
    ///
    /// A farthest time before the spawn time is raised to the spawn time.
    pub fn force_set_time_bounds(&mut self, spawn_time: Time, farthest_time: Time) -> Result<()> {
        if spawn_time.is_nan() {
            return Err(Error::InvalidTime(spawn_time));
        }
        if farthest_time.is_nan() {
            return Err(Error::InvalidTime(farthest_time));
        }

        if spawn_time > farthest_time {
            tracing::warn!(
                object = %self.id,
                spawn_time,
                farthest_time,
                "spawn time after farthest time, clamping"
            );
        }
        self.spawn_time = spawn_time;
        self.farthest_time = farthest_time.max(spawn_time);
        self.spawn_on_register = false;
        Ok(())
    }

    /// Cut all recorded history after `time`, whatever the current mode
    ///
    /// Recorders trim at `time`; the farthest time never drops below the
    /// spawn time.
    pub fn trim_data_after(
        &mut self,
        time: Time,
        clock: &ClockState,
        commands: &mut Vec<TimeCommand>,
    ) {
        tracing::debug!(object = %self.id, time, "forced trim");
        let mut ctx = TimeContext::new(
            clock,
            self.id,
            self.spawn_time,
            time,
            self.is_recording,
            commands,
        );
        for recorder in &mut self.recorders {
            recorder.trim_data_after(time, &mut ctx);
        }

        if time < self.spawn_time {
            tracing::warn!(
                object = %self.id,
                time,
                spawn_time = self.spawn_time,
                "trim before spawn time, clamping farthest time"
            );
        }
        self.farthest_time = time.max(self.spawn_time);
    }

    pub fn id(&self) -> TimeObjectId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &TimedObjectConfig {
        &self.config
    }

    pub fn spawn_time(&self) -> Time {
        self.spawn_time
    }

    pub fn farthest_time(&self) -> Time {
        self.farthest_time
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether the object is active and laying down new history
    pub fn is_recording(&self) -> bool {
        self.active && self.is_recording
    }

    pub fn was_recording(&self) -> bool {
        self.was_recording
    }

    pub fn mode(&self) -> TimeMode {
        if !self.active {
            TimeMode::Inactive
        } else if self.is_recording {
            TimeMode::Recording
        } else {
            TimeMode::Replaying
        }
    }

    pub fn should_record(&self) -> bool {
        self.config.should_record
    }

    /// Change whether the object records; takes effect on the next update
    pub fn set_should_record(&mut self, should_record: bool) {
        self.config.should_record = should_record;
    }

    pub fn is_suspended(&self) -> bool {
        self.suspensions.is_suspended()
    }

    pub fn suspension_count(&self) -> usize {
        self.suspensions.count()
    }

    pub fn recorder_count(&self) -> usize {
        self.recorders.len()
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Assign the registration handle and, if requested, spawn at `now`
    pub(crate) fn register(&mut self, id: TimeObjectId, now: Time) {
        self.id = id;
        if self.spawn_on_register {
            self.spawn_time = now;
            self.farthest_time = now;
            self.spawn_on_register = false;
        }
    }

    fn should_record_with_suspensions(&self) -> bool {
        self.config.should_record && !self.suspensions.is_suspended()
    }

    fn compute_active(&self, time: Time) -> bool {
        !(time < self.spawn_time
            || (time >= self.farthest_time && !self.should_record_with_suspensions()))
    }

    fn compute_recording(&self, time: Time, clock: &ClockState) -> bool {
        if !clock.should_record || self.suspensions.is_suspended() {
            false
        } else if self.config.always_record_when_should {
            self.config.should_record
        } else {
            time > self.farthest_time && self.config.should_record
        }
    }

    fn refresh_activation(&mut self, time: Time) {
        let previous_mode = self.mode();
        self.active = self.compute_active(time);
        self.log_mode_change(previous_mode, time);
    }

    fn log_mode_change(&self, previous: TimeMode, time: Time) {
        let mode = self.mode();
        if mode != previous {
            tracing::debug!(object = %self.id, name = %self.name, time, ?previous, ?mode, "mode changed");
        }
    }
}

impl fmt::Debug for TimedObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimedObject")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("mode", &self.mode())
            .field("spawn_time", &self.spawn_time)
            .field("farthest_time", &self.farthest_time)
            .field("suspensions", &self.suspensions.count())
            .field("recorders", &self.recorders.len())
            .field("observers", &self.observers.len())
            .finish()
    }
}

/// Builder registering an object's recorders and observers up front
pub struct TimedObjectBuilder {
    name: String,
    config: TimedObjectConfig,
    spawn_time: Option<Time>,
    recorders: Vec<Box<dyn Recorder>>,
    observers: Vec<Box<dyn Observer>>,
}

impl TimedObjectBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: TimedObjectConfig::default(),
            spawn_time: None,
            recorders: Vec::new(),
            observers: Vec::new(),
        }
    }

    pub fn config(mut self, config: TimedObjectConfig) -> Self {
        self.config = config;
        self
    }

    /// Spawn at a fixed time instead of the clock time at registration
    pub fn spawn_at(mut self, time: Time) -> Self {
        self.spawn_time = Some(time);
        self
    }

    pub fn recorder(mut self, recorder: impl Recorder + 'static) -> Self {
        self.recorders.push(Box::new(recorder));
        self
    }

    pub fn observer(mut self, observer: impl Observer + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    /// Finish the object
    ///
    /// Fails when nothing is attached or the spawn time is not a valid time.
    pub fn build(self) -> Result<TimedObject> {
        if self.recorders.is_empty() && self.observers.is_empty() {
            return Err(Error::NoComponents(self.name));
        }
        if let Some(time) = self.spawn_time {
            if !(time.is_finite() && time >= 0.0) {
                return Err(Error::InvalidTime(time));
            }
        }

        let spawn_time = self.spawn_time.unwrap_or(0.0);
        Ok(TimedObject {
            id: TimeObjectId::default(),
            name: self.name,
            config: self.config,
            spawn_time,
            farthest_time: spawn_time,
            spawn_on_register: self.spawn_time.is_none(),
            active: false,
            is_recording: false,
            was_recording: false,
            suspensions: SuspensionSet::new(),
            recorders: self.recorders,
            observers: self.observers,
        })
    }
}
