//! Scripted sequences over the clock
//!
//! A `Sequence` is a list of `Step`s run one after another on the host's
//! fixed step. Instant steps (time scale, jumps, suspension, trims) run back
//! to back within a single tick; `Wait` and `RewindTo` span ticks.
//!
//! # Example
//!
//! ```rust
//! use rewind_host::{Sequence, Step};
//!
//! let script = r#"[
//!     Wait(2.0),
//!     RewindTo(target: 0.5, speed: 2.0),
//!     SetTimeScale(1.0),
//! ]"#;
//! let sequence = Sequence::from_ron_str(script).unwrap();
//! assert_eq!(sequence.steps().len(), 3);
//! assert_eq!(sequence.steps()[0], Step::Wait(2.0));
//! ```

use crate::lifecycle::Lifecycle;
use crate::Result;
use rewind_core::{GlobalTimeManager, SuspensionHandle, Time, TimeObjectId};
use serde::{Deserialize, Serialize};

/// One instruction of a sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Step {
    /// Let the given amount of host time pass
    Wait(Time),
    SetTimeScale(f64),
    /// Jump the clock
    SetTime(Time),
    /// Move the clock to `target` at `speed` clock seconds per host second
    /// with recording paused; a non-positive speed jumps in one tick
    RewindTo { target: Time, speed: f64 },
    /// Pause global recording until a matching `ResumeRecording`
    SuspendRecording,
    /// Cancel the most recent `SuspendRecording`
    ResumeRecording,
    /// Cut one object's history after `time`
    TrimObject { id: TimeObjectId, time: Time },
}

/// State of a sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceState {
    /// Not started
    Idle,
    /// Currently running steps
    Running,
    /// Every step done, or torn down
    Finished,
}

/// Scripted state machine driven by the host tick
#[derive(Debug, Clone)]
pub struct Sequence {
    steps: Vec<Step>,
    state: SequenceState,
    index: usize,
    elapsed: Time,
    rewind: Option<SuspensionHandle>,
    held: Vec<SuspensionHandle>,
}

impl Sequence {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps,
            state: SequenceState::Idle,
            index: 0,
            elapsed: 0.0,
            rewind: None,
            held: Vec::new(),
        }
    }

    /// Parse a sequence from a RON list of steps
    pub fn from_ron_str(content: &str) -> Result<Self> {
        let steps: Vec<Step> = ron::from_str(content)?;
        Ok(Self::new(steps))
    }

    /// Append a step
    pub fn then(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn state(&self) -> SequenceState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state == SequenceState::Finished
    }

    /// The step currently running, if any
    pub fn current_step(&self) -> Option<&Step> {
        match self.state {
            SequenceState::Running => self.steps.get(self.index),
            SequenceState::Idle | SequenceState::Finished => None,
        }
    }

    /// Suspension handles the sequence currently holds
    pub fn held_suspensions(&self) -> usize {
        self.held.len() + usize::from(self.rewind.is_some())
    }

    /// Start running from the first step
    pub fn start(&mut self) {
        self.state = SequenceState::Running;
        self.index = 0;
        self.elapsed = 0.0;
        tracing::debug!(steps = self.steps.len(), "sequence started");
    }

    /// Run the sequence for one fixed step of `delta` host seconds
    pub fn advance(&mut self, manager: &mut GlobalTimeManager, delta: Time) -> Result<()> {
        if self.state != SequenceState::Running {
            return Ok(());
        }

        while let Some(step) = self.steps.get(self.index).cloned() {
            match step {
                Step::Wait(seconds) => {
                    self.elapsed += delta;
                    if self.elapsed + 1e-9 >= seconds {
                        self.next_step();
                    }
                    break;
                }
                Step::RewindTo { target, speed } => {
                    if self.rewind_toward(manager, target, speed, delta)? {
                        self.next_step();
                    }
                    break;
                }
                Step::SetTimeScale(scale) => manager.set_time_scale(scale),
                Step::SetTime(time) => manager.set_time(time),
                Step::SuspendRecording => self.held.push(manager.request_should_not_record()),
                Step::ResumeRecording => match self.held.pop() {
                    Some(handle) => manager.cancel_should_not_record_request(handle)?,
                    None => tracing::warn!("resume without a matching suspend in sequence"),
                },
                Step::TrimObject { id, time } => manager.trim_object_after(id, time)?,
            }
            self.next_step();
        }

        if self.index >= self.steps.len() {
            self.finish(manager)?;
        }
        Ok(())
    }

    /// Give back every held suspension and stop
    pub fn finish(&mut self, manager: &mut GlobalTimeManager) -> Result<()> {
        if let Some(handle) = self.rewind.take() {
            manager.cancel_should_not_record_request(handle)?;
        }
        for handle in self.held.drain(..) {
            manager.cancel_should_not_record_request(handle)?;
        }
        if self.state != SequenceState::Finished {
            tracing::debug!(step = self.index, "sequence finished");
        }
        self.state = SequenceState::Finished;
        Ok(())
    }

    fn next_step(&mut self) {
        self.index += 1;
        self.elapsed = 0.0;
    }

    // Returns true once the clock sits on the target
    fn rewind_toward(
        &mut self,
        manager: &mut GlobalTimeManager,
        target: Time,
        speed: f64,
        delta: Time,
    ) -> Result<bool> {
        if self.rewind.is_none() {
            tracing::debug!(from = manager.cur_time(), target, speed, "rewind started");
            self.rewind = Some(manager.request_should_not_record());
        }

        let target = target.max(0.0);
        let cur = manager.cur_time();
        let next = if speed <= 0.0 || !speed.is_finite() {
            target
        } else if cur > target {
            (cur - speed * delta).max(target)
        } else {
            (cur + speed * delta).min(target)
        };
        manager.set_time(next);

        if next != target {
            return Ok(false);
        }
        if let Some(handle) = self.rewind.take() {
            manager.cancel_should_not_record_request(handle)?;
        }
        tracing::debug!(time = next, "rewind reached target");
        Ok(true)
    }
}

impl Lifecycle for Sequence {
    fn init(&mut self, _manager: &mut GlobalTimeManager) -> Result<()> {
        self.start();
        Ok(())
    }

    fn tick(&mut self, manager: &mut GlobalTimeManager, _time: Time, delta: Time) -> Result<()> {
        self.advance(manager, delta)
    }

    fn teardown(&mut self, manager: &mut GlobalTimeManager) {
        if let Err(err) = self.finish(manager) {
            tracing::warn!(%err, "sequence teardown could not release suspensions");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rewind_core::ClockConfig;

    fn manager() -> GlobalTimeManager {
        GlobalTimeManager::new(ClockConfig {
            fixed_delta_time: 1.0,
            max_frame_time: 1.0,
            ..ClockConfig::default()
        })
    }

    fn run(sequence: &mut Sequence, manager: &mut GlobalTimeManager) {
        manager.tick();
        sequence.advance(manager, 1.0).unwrap();
    }

    #[test]
    fn test_wait_spans_ticks() {
        let mut manager = manager();
        let mut sequence = Sequence::new(vec![Step::Wait(2.0), Step::SetTimeScale(0.5)]);
        sequence.start();

        run(&mut sequence, &mut manager);
        assert_eq!(sequence.current_step(), Some(&Step::Wait(2.0)));
        run(&mut sequence, &mut manager);
        assert_eq!(sequence.current_step(), Some(&Step::SetTimeScale(0.5)));
        assert_eq!(manager.time_scale(), 1.0);

        run(&mut sequence, &mut manager);
        assert_eq!(manager.time_scale(), 0.5);
        assert!(sequence.is_finished());
    }

    #[test]
    fn test_instant_steps_share_a_tick() {
        let mut manager = manager();
        let mut sequence = Sequence::new(Vec::new())
            .then(Step::SetTimeScale(2.0))
            .then(Step::SetTime(4.0));
        sequence.start();

        sequence.advance(&mut manager, 1.0).unwrap();
        assert_eq!(manager.time_scale(), 2.0);
        assert_eq!(manager.cur_time(), 4.0);
        assert!(sequence.is_finished());
    }

    #[test]
    fn test_rewind_moves_at_speed_then_resumes() {
        let mut manager = manager();
        for _ in 0..4 {
            manager.tick();
        }
        let mut sequence = Sequence::new(vec![Step::RewindTo {
            target: 1.0,
            speed: 2.0,
        }]);
        sequence.start();

        run(&mut sequence, &mut manager);
        assert_eq!(manager.cur_time(), 3.0);
        assert!(!manager.should_record());
        assert_eq!(sequence.held_suspensions(), 1);

        run(&mut sequence, &mut manager);
        assert_eq!(manager.cur_time(), 1.0);
        assert!(manager.should_record());
        assert_eq!(manager.farthest_time(), 5.0);
        assert!(sequence.is_finished());
        assert_eq!(sequence.held_suspensions(), 0);
    }

    #[test]
    fn test_rewind_without_speed_jumps() {
        let mut manager = manager();
        manager.tick();
        manager.tick();
        let mut sequence = Sequence::new(vec![Step::RewindTo {
            target: -3.0,
            speed: 0.0,
        }]);
        sequence.start();

        sequence.advance(&mut manager, 1.0).unwrap();
        assert_eq!(manager.cur_time(), 0.0);
        assert!(manager.should_record());
    }

    #[test]
    fn test_finish_releases_held_suspensions() {
        let mut manager = manager();
        let mut sequence = Sequence::new(vec![
            Step::SuspendRecording,
            Step::SuspendRecording,
            Step::ResumeRecording,
        ]);
        sequence.start();

        sequence.advance(&mut manager, 1.0).unwrap();
        assert!(sequence.is_finished());
        assert!(manager.should_record());
    }

    #[test]
    fn test_teardown_mid_wait_releases() {
        let mut manager = manager();
        let mut sequence = Sequence::new(vec![Step::SuspendRecording, Step::Wait(10.0)]);
        sequence.init(&mut manager).unwrap();
        sequence.tick(&mut manager, 0.0, 1.0).unwrap();
        assert!(!manager.should_record());

        sequence.teardown(&mut manager);
        assert!(manager.should_record());
        assert_eq!(sequence.state(), SequenceState::Finished);
    }

    #[test]
    fn test_trim_unknown_object_errors() {
        let mut manager = manager();
        let mut sequence = Sequence::new(vec![Step::TrimObject {
            id: TimeObjectId::new(9),
            time: 0.0,
        }]);
        sequence.start();

        assert!(matches!(
            sequence.advance(&mut manager, 1.0),
            Err(crate::Error::Core(rewind_core::Error::ObjectNotFound(_)))
        ));
    }

    #[test]
    fn test_idle_sequence_does_nothing() {
        let mut manager = manager();
        let mut sequence = Sequence::new(vec![Step::SetTime(3.0)]);
        sequence.advance(&mut manager, 1.0).unwrap();
        assert_eq!(manager.cur_time(), 0.0);
        assert_eq!(sequence.state(), SequenceState::Idle);
    }
}
