//! The timed recorder protocol
//!
//! Gameplay components take part in rewind by implementing:
//! - `Recorder` - stores its own history and restores it on demand
//! - `Observer` - reacts to elapsed time while its object is recording
//!
//! Every call receives a `TimeContext` holding the clock and the owning
//! object's timing state as they are at that point of the tick.

use crate::{ClockState, Moment, MomentAlbum, Time, TimeObjectId, TimedObject};

/// Structural change requested from inside a tick
///
/// The manager applies queued commands after every object has been updated,
/// in the order they were pushed.
pub enum TimeCommand {
    /// Register a new object
    Spawn(Box<TimedObject>),
    /// Unregister an object
    Despawn(TimeObjectId),
}

impl std::fmt::Debug for TimeCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeCommand::Spawn(obj) => f.debug_tuple("Spawn").field(&obj.name()).finish(),
            TimeCommand::Despawn(id) => f.debug_tuple("Despawn").field(id).finish(),
        }
    }
}

/// Read-only timing state handed to recorders and observers
pub struct TimeContext<'a> {
    clock: &'a ClockState,
    object: TimeObjectId,
    spawn_time: Time,
    farthest_time: Time,
    is_recording: bool,
    commands: &'a mut Vec<TimeCommand>,
}

impl<'a> TimeContext<'a> {
    pub(crate) fn new(
        clock: &'a ClockState,
        object: TimeObjectId,
        spawn_time: Time,
        farthest_time: Time,
        is_recording: bool,
        commands: &'a mut Vec<TimeCommand>,
    ) -> Self {
        Self {
            clock,
            object,
            spawn_time,
            farthest_time,
            is_recording,
            commands,
        }
    }

    pub(crate) fn set_farthest_time(&mut self, time: Time) {
        self.farthest_time = time;
    }

    /// The global clock
    pub fn clock(&self) -> &ClockState {
        self.clock
    }

    pub fn cur_time(&self) -> Time {
        self.clock.cur_time
    }

    pub fn delta_time(&self) -> Time {
        self.clock.delta_time
    }

    pub fn time_scale(&self) -> f64 {
        self.clock.time_scale
    }

    /// The object being updated
    pub fn object(&self) -> TimeObjectId {
        self.object
    }

    pub fn spawn_time(&self) -> Time {
        self.spawn_time
    }

    pub fn farthest_time(&self) -> Time {
        self.farthest_time
    }

    /// Whether the owning object is laying down new history this tick
    pub fn is_recording(&self) -> bool {
        self.is_recording
    }

    /// Queue a new object for registration once the tick finishes
    pub fn spawn(&mut self, object: TimedObject) {
        self.commands.push(TimeCommand::Spawn(Box::new(object)));
    }

    /// Queue an object for removal once the tick finishes
    pub fn despawn(&mut self, id: TimeObjectId) {
        self.commands.push(TimeCommand::Despawn(id));
    }

    /// Queue the owning object for removal once the tick finishes
    pub fn despawn_self(&mut self) {
        let id = self.object;
        self.despawn(id);
    }
}

/// A component that records and replays its own state
pub trait Recorder {
    /// Bring the component in line with `time`
    ///
    /// Called on every active tick, recording or not, after every other
    /// contract call of that tick.
    fn set_to_time(&mut self, time: Time, ctx: &mut TimeContext<'_>);

    /// Recording switched on this tick
    fn on_recording_resume(&mut self, _time: Time, _ctx: &mut TimeContext<'_>) {}

    /// Recording switched off this tick
    fn on_recording_stop(&mut self, _time: Time, _ctx: &mut TimeContext<'_>) {}

    /// Discard everything stored after `time`
    fn trim_data_after(&mut self, time: Time, ctx: &mut TimeContext<'_>);
}

/// A component that only reacts to time passing while recording
pub trait Observer {
    /// Called once per recording tick with the tick's delta
    fn timed_update(&mut self, delta: Time, ctx: &mut TimeContext<'_>);
}

/// Recorder built on a `MomentAlbum`
///
/// While recording, gameplay code calls `record` to apply a moment and keep
/// it. While replaying, `set_to_time` applies moments crossed going forward
/// and undoes moments crossed going backward. Both directions walk the
/// crossed moments in ascending time order.
#[derive(Debug)]
pub struct MomentRecorder<M: Moment> {
    album: MomentAlbum<M>,
    target: M::Target,
    prev_time: Time,
}

impl<M: Moment> MomentRecorder<M> {
    /// Create a recorder driving `target`
    pub fn new(target: M::Target) -> Self {
        Self::starting_at(target, 0.0)
    }

    /// Create a recorder whose last known time is `time`
    pub fn starting_at(target: M::Target, time: Time) -> Self {
        Self {
            album: MomentAlbum::new(),
            target,
            prev_time: time,
        }
    }

    /// Apply a moment to the target and keep it in the album
    pub fn record(&mut self, moment: M) {
        moment.apply(&mut self.target);
        self.album.add_moment(moment);
    }

    /// Replay or rewind the target from the last known time to `time`
    pub fn replay_to(&mut self, time: Time) {
        if time > self.prev_time {
            for moment in self.album.get(self.prev_time, time) {
                moment.apply(&mut self.target);
            }
        } else if time < self.prev_time {
            for moment in self.album.get(time, self.prev_time) {
                moment.undo(&mut self.target);
            }
        }
        self.prev_time = time;
    }

    pub fn album(&self) -> &MomentAlbum<M> {
        &self.album
    }

    pub fn target(&self) -> &M::Target {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut M::Target {
        &mut self.target
    }

    /// The time of the last `set_to_time`
    pub fn prev_time(&self) -> Time {
        self.prev_time
    }
}

impl<M: Moment> Recorder for MomentRecorder<M> {
    fn set_to_time(&mut self, time: Time, ctx: &mut TimeContext<'_>) {
        if ctx.is_recording() {
            self.prev_time = time;
        } else {
            self.replay_to(time);
        }
    }

    // Moments past the last replayed time were never re-applied to the
    // target, so they can't stay in the new branch
    fn on_recording_resume(&mut self, time: Time, _ctx: &mut TimeContext<'_>) {
        let removed = self.album.remove_moments_after(self.prev_time);
        if removed > 0 {
            tracing::trace!(time, from = self.prev_time, removed, "dropped unreplayed moments");
        }
    }

    fn trim_data_after(&mut self, time: Time, _ctx: &mut TimeContext<'_>) {
        let removed = self.album.remove_moments_after(time);
        if removed > 0 {
            tracing::trace!(time, removed, "trimmed moments");
        }
    }
}

// Dropping the recorder (object despawned or manager cleared) destroys
// every moment still held
impl<M: Moment> Drop for MomentRecorder<M> {
    fn drop(&mut self) {
        self.album.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone)]
    struct Tagged(Time);

    #[derive(Debug, Default)]
    struct Log {
        applied: Vec<Time>,
        undone: Vec<Time>,
    }

    impl Moment for Tagged {
        type Target = Log;

        fn time(&self) -> Time {
            self.0
        }

        fn apply(&self, target: &mut Log) {
            target.applied.push(self.0);
        }

        fn undo(&self, target: &mut Log) {
            target.undone.push(self.0);
        }
    }

    fn ctx<'a>(
        clock: &'a ClockState,
        recording: bool,
        commands: &'a mut Vec<TimeCommand>,
    ) -> TimeContext<'a> {
        TimeContext::new(clock, TimeObjectId(0), 0.0, 5.0, recording, commands)
    }

    fn recorder_with(times: &[Time]) -> MomentRecorder<Tagged> {
        let mut recorder = MomentRecorder::new(Log::default());
        for t in times {
            recorder.record(Tagged(*t));
        }
        recorder.target_mut().applied.clear();
        recorder
    }

    #[test]
    fn test_rewind_undoes_in_ascending_order() {
        let clock = ClockState::default();
        let mut commands = Vec::new();
        let mut recorder = recorder_with(&[2.0, 4.0]);

        recorder.set_to_time(5.0, &mut ctx(&clock, true, &mut commands));
        recorder.set_to_time(1.0, &mut ctx(&clock, false, &mut commands));

        assert_eq!(recorder.target().undone, vec![2.0, 4.0]);
        assert!(recorder.target().applied.is_empty());
        assert_eq!(recorder.prev_time(), 1.0);
    }

    #[test]
    fn test_replay_forward_applies_half_open_range() {
        let clock = ClockState::default();
        let mut commands = Vec::new();
        let mut recorder = recorder_with(&[1.0, 2.0, 3.0]);

        recorder.set_to_time(1.0, &mut ctx(&clock, false, &mut commands));
        recorder.target_mut().undone.clear();
        recorder.set_to_time(3.0, &mut ctx(&clock, false, &mut commands));

        assert_eq!(recorder.target().applied, vec![1.0, 2.0]);
    }

    #[test]
    fn test_recording_only_tracks_time() {
        let clock = ClockState::default();
        let mut commands = Vec::new();
        let mut recorder = recorder_with(&[1.0]);

        recorder.set_to_time(3.0, &mut ctx(&clock, true, &mut commands));
        assert!(recorder.target().applied.is_empty());
        assert_eq!(recorder.prev_time(), 3.0);
    }

    #[test]
    fn test_trim_delegates_to_album() {
        let clock = ClockState::default();
        let mut commands = Vec::new();
        let mut recorder = recorder_with(&[1.0, 2.0, 3.0]);

        recorder.trim_data_after(1.5, &mut ctx(&clock, true, &mut commands));
        assert_eq!(recorder.album().len(), 1);
        assert_eq!(recorder.album().latest_time(), Some(1.0));
    }

    #[test]
    fn test_resume_drops_unreplayed_moments() {
        let clock = ClockState::default();
        let mut commands = Vec::new();
        let mut recorder = recorder_with(&[1.5, 2.5, 3.5]);

        recorder.set_to_time(4.0, &mut ctx(&clock, true, &mut commands));
        recorder.set_to_time(2.0, &mut ctx(&clock, false, &mut commands));
        assert_eq!(recorder.target().undone, vec![2.5, 3.5]);

        recorder.on_recording_resume(3.0, &mut ctx(&clock, true, &mut commands));
        assert_eq!(recorder.album().latest_time(), Some(1.5));
    }

    #[derive(Debug, Clone)]
    struct Owned {
        time: Time,
        released: Rc<RefCell<Vec<Time>>>,
    }

    impl Moment for Owned {
        type Target = ();

        fn time(&self) -> Time {
            self.time
        }

        fn apply(&self, _target: &mut ()) {}

        fn undo(&self, _target: &mut ()) {}

        fn destroy(self, time: Time) {
            self.released.borrow_mut().push(time);
        }
    }

    #[test]
    fn test_drop_destroys_held_moments() {
        let released = Rc::new(RefCell::new(Vec::new()));
        let mut recorder = MomentRecorder::new(());
        for time in [2.0, 1.0] {
            recorder.record(Owned {
                time,
                released: released.clone(),
            });
        }
        assert!(released.borrow().is_empty());

        drop(recorder);
        assert_eq!(*released.borrow(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_context_queues_despawn() {
        let clock = ClockState::default();
        let mut commands = Vec::new();
        {
            let mut context = ctx(&clock, true, &mut commands);
            context.despawn_self();
        }
        assert!(matches!(commands.as_slice(), [TimeCommand::Despawn(TimeObjectId(0))]));
    }
}
