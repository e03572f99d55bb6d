//! The authoritative clock
//!
//! `GlobalTimeManager` owns the clock state and every registered
//! `TimedObject`. Each fixed tick it moves the clock, then updates the
//! objects strictly in registration order, then the registered timed values.
//! Objects added or removed by components during a tick are queued and
//! applied once the whole broadcast has finished.
//!
//! # Example
//!
//! ```rust
//! use rewind_core::{ClockConfig, GlobalTimeManager};
//!
//! let mut manager = GlobalTimeManager::new(ClockConfig::default());
//! for _ in 0..10 {
//!     manager.tick();
//! }
//! assert!((manager.cur_time() - 0.2).abs() < 1e-9);
//!
//! // Scripted rewind: pause recording, move the clock, resume
//! let pause = manager.request_should_not_record();
//! manager.set_time(0.1);
//! assert!((manager.farthest_time() - 0.2).abs() < 1e-9);
//! manager.cancel_should_not_record_request(pause).unwrap();
//! ```

use crate::error::{Error, Result};
use crate::recorder::TimeCommand;
use crate::suspension::SuspensionSet;
use crate::timed_value::TimedSlot;
use crate::{ClockConfig, ClockState, SuspensionHandle, Time, TimeObjectId, TimedObject};
use indexmap::IndexMap;

/// Process-wide clock driving every timed object
pub struct GlobalTimeManager {
    config: ClockConfig,
    clock: ClockState,
    suspensions: SuspensionSet,
    objects: IndexMap<TimeObjectId, TimedObject>,
    timed_values: Vec<Box<dyn TimedSlot>>,
    next_id: u64,
}

impl GlobalTimeManager {
    /// Create a manager from a clock configuration
    pub fn new(config: ClockConfig) -> Self {
        let clock = config.initial_state();
        Self {
            config,
            clock,
            suspensions: SuspensionSet::new(),
            objects: IndexMap::new(),
            timed_values: Vec::new(),
            next_id: 0,
        }
    }

    /// Advance one fixed step
    ///
    /// Does nothing while a should-not-record request is outstanding.
    pub fn tick(&mut self) {
        if !self.clock.should_record {
            tracing::trace!(time = self.clock.cur_time, "clock paused");
            return;
        }

        let new_time = self.clock.next_tick_time();
        if new_time > self.clock.farthest_time {
            self.clock.farthest_time = new_time;
        }
        self.update_to_time(new_time);
    }

    /// Jump the clock to `time` (clamped to zero) without extending the
    /// farthest time
    pub fn set_time(&mut self, time: Time) {
        self.update_to_time(time.max(0.0));
    }

    fn update_to_time(&mut self, time: Time) {
        self.clock.prev_time = self.clock.cur_time;
        self.clock.cur_time = time;
        self.clock.delta_time = self.clock.cur_time - self.clock.prev_time;
        tracing::trace!(
            time,
            delta = self.clock.delta_time,
            objects = self.objects.len(),
            "clock update"
        );

        let mut commands = Vec::new();
        for object in self.objects.values_mut() {
            object.set_to_time(&self.clock, &mut commands);
        }
        for value in &mut self.timed_values {
            value.set_to_time(&self.clock);
        }

        self.apply_commands(commands);
    }

    /// Register an object; it is synced to the current time before it joins
    /// the broadcast
    ///
    /// Objects built without an explicit spawn time spawn now.
    pub fn add_time_object(&mut self, mut object: TimedObject) -> TimeObjectId {
        let id = TimeObjectId::new(self.next_id);
        self.next_id += 1;

        object.register(id, self.clock.cur_time);
        let mut commands = Vec::new();
        object.set_to_time(&self.clock, &mut commands);

        tracing::debug!(
            object = %id,
            name = object.name(),
            spawn_time = object.spawn_time(),
            mode = ?object.mode(),
            "registered timed object"
        );
        self.objects.insert(id, object);
        self.apply_commands(commands);
        id
    }

    /// Unregister an object and hand it back
    pub fn remove_time_object(&mut self, id: TimeObjectId) -> Result<TimedObject> {
        let object = self
            .objects
            .shift_remove(&id)
            .ok_or(Error::ObjectNotFound(id))?;
        tracing::debug!(object = %id, name = object.name(), "removed timed object");
        Ok(object)
    }

    /// Register a value updated after every object on each clock update
    pub fn add_timed_value(&mut self, value: impl TimedSlot + 'static) {
        let mut value = value;
        value.set_to_time(&self.clock);
        self.timed_values.push(Box::new(value));
    }

    /// Pause recording globally until the handle is cancelled
    ///
    /// The clock is pinned at the current time while any request is
    /// outstanding.
    pub fn request_should_not_record(&mut self) -> SuspensionHandle {
        let handle = self.suspensions.request();
        self.clock.should_record = false;
        tracing::debug!(%handle, count = self.suspensions.count(), "global recording paused");
        self.set_time(self.clock.cur_time);
        handle
    }

    /// Cancel a request from `request_should_not_record`
    pub fn cancel_should_not_record_request(&mut self, handle: SuspensionHandle) -> Result<()> {
        if let Err(err) = self.suspensions.cancel(handle) {
            tracing::warn!(%handle, "cancelling unknown global suspension");
            return Err(err);
        }
        if !self.suspensions.is_suspended() {
            self.clock.should_record = true;
            tracing::debug!(time = self.clock.cur_time, "global recording resumed");
        }
        Ok(())
    }

    /// Suspend recording of one object
    pub fn request_suspend_recording(&mut self, id: TimeObjectId) -> Result<SuspensionHandle> {
        let object = self.objects.get_mut(&id).ok_or(Error::ObjectNotFound(id))?;
        Ok(object.request_suspend_recording(&self.clock))
    }

    /// Cancel one object's suspension request
    pub fn cancel_suspend_recording_request(
        &mut self,
        id: TimeObjectId,
        handle: SuspensionHandle,
    ) -> Result<()> {
        let object = self.objects.get_mut(&id).ok_or(Error::ObjectNotFound(id))?;
        object.cancel_suspend_recording_request(handle, &self.clock)
    }

    /// Overwrite one object's spawn and farthest times
    pub fn force_set_time_bounds(
        &mut self,
        id: TimeObjectId,
        spawn_time: Time,
        farthest_time: Time,
    ) -> Result<()> {
        let object = self.objects.get_mut(&id).ok_or(Error::ObjectNotFound(id))?;
        object.force_set_time_bounds(spawn_time, farthest_time)
    }

    /// Cut one object's history after `time`, whatever its mode
    pub fn trim_object_after(&mut self, id: TimeObjectId, time: Time) -> Result<()> {
        let object = self.objects.get_mut(&id).ok_or(Error::ObjectNotFound(id))?;
        let mut commands = Vec::new();
        object.trim_data_after(time, &self.clock, &mut commands);
        self.apply_commands(commands);
        Ok(())
    }

    /// Drop every object and timed value
    pub fn clear(&mut self) {
        tracing::debug!(objects = self.objects.len(), "clearing time manager");
        self.objects.clear();
        self.timed_values.clear();
    }

    pub fn object(&self, id: TimeObjectId) -> Option<&TimedObject> {
        self.objects.get(&id)
    }

    pub fn object_mut(&mut self, id: TimeObjectId) -> Option<&mut TimedObject> {
        self.objects.get_mut(&id)
    }

    /// Registered objects in registration order
    pub fn objects(&self) -> impl Iterator<Item = &TimedObject> {
        self.objects.values()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn clock(&self) -> &ClockState {
        &self.clock
    }

    pub fn config(&self) -> &ClockConfig {
        &self.config
    }

    pub fn cur_time(&self) -> Time {
        self.clock.cur_time
    }

    pub fn prev_time(&self) -> Time {
        self.clock.prev_time
    }

    pub fn farthest_time(&self) -> Time {
        self.clock.farthest_time
    }

    pub fn delta_time(&self) -> Time {
        self.clock.delta_time
    }

    pub fn fixed_delta_time(&self) -> Time {
        self.clock.fixed_delta_time
    }

    pub fn time_scale(&self) -> f64 {
        self.clock.time_scale
    }

    pub fn set_time_scale(&mut self, time_scale: f64) {
        tracing::debug!(time_scale, "time scale changed");
        self.clock.time_scale = time_scale;
    }

    pub fn should_record(&self) -> bool {
        self.clock.should_record
    }

    fn apply_commands(&mut self, commands: Vec<TimeCommand>) {
        for command in commands {
            match command {
                TimeCommand::Spawn(object) => {
                    self.add_time_object(*object);
                }
                TimeCommand::Despawn(id) => {
                    if self.remove_time_object(id).is_err() {
                        tracing::warn!(object = %id, "despawn requested for unknown object");
                    }
                }
            }
        }
    }
}

impl Default for GlobalTimeManager {
    fn default() -> Self {
        Self::new(ClockConfig::default())
    }
}

impl std::fmt::Debug for GlobalTimeManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalTimeManager")
            .field("clock", &self.clock)
            .field("suspensions", &self.suspensions.count())
            .field("objects", &self.objects.len())
            .field("timed_values", &self.timed_values.len())
            .finish()
    }
}
