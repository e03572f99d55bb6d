//! Rewind Demo
//!
//! Records a runner and a score for a few seconds, rewinds with a scripted
//! sequence, then lets the world record a new branch.
//!
//! Run with `RUST_LOG=rewind_core=debug` to see mode changes.

use rewind_core::{
    ClockConfig, Moment, MomentRecorder, Observer, Recorder, Time, TimeContext, TimeObjectId,
    TimedObject, TimedValue,
};
use rewind_host::{Host, Lifecycle, Sequence, Step};
use std::cell::Cell;
use std::rc::Rc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type Position = Rc<Cell<f64>>;

/// A stride taken during the step ending just after `time`
#[derive(Debug, Clone)]
struct Stride {
    time: Time,
    length: f64,
}

impl Moment for Stride {
    type Target = Position;

    fn time(&self) -> Time {
        self.time
    }

    fn apply(&self, target: &mut Position) {
        target.set(target.get() + self.length);
    }

    fn undo(&self, target: &mut Position) {
        target.set(target.get() - self.length);
    }
}

/// Runs at a fixed speed while recording
struct Runner {
    speed: f64,
    strides: MomentRecorder<Stride>,
}

impl Recorder for Runner {
    fn set_to_time(&mut self, time: Time, ctx: &mut TimeContext<'_>) {
        let delta = ctx.delta_time();
        if ctx.is_recording() && delta > 0.0 {
            self.strides.record(Stride {
                time: time - delta / 2.0,
                length: self.speed * delta,
            });
        }
        self.strides.set_to_time(time, ctx);
    }

    fn on_recording_resume(&mut self, time: Time, ctx: &mut TimeContext<'_>) {
        self.strides.on_recording_resume(time, ctx);
    }

    fn trim_data_after(&mut self, time: Time, ctx: &mut TimeContext<'_>) {
        self.strides.trim_data_after(time, ctx);
    }
}

/// Scores a point every recorded second
struct Scorer {
    score: TimedValue<u32>,
    since_last: Time,
}

impl Observer for Scorer {
    fn timed_update(&mut self, delta: Time, _ctx: &mut TimeContext<'_>) {
        self.since_last += delta.max(0.0);
        if self.since_last >= 1.0 {
            self.since_last -= 1.0;
            self.score.set(self.score.get() + 1);
        }
    }
}

/// Prints the world every half second of host time
struct Reporter {
    runner: TimeObjectId,
    position: Position,
    score: TimedValue<u32>,
    elapsed: Time,
}

impl Lifecycle for Reporter {
    fn tick(
        &mut self,
        manager: &mut rewind_core::GlobalTimeManager,
        time: Time,
        delta: Time,
    ) -> rewind_host::Result<()> {
        self.elapsed += delta;
        if self.elapsed + 1e-9 < 0.5 {
            return Ok(());
        }
        self.elapsed = 0.0;

        let mode = manager
            .object(self.runner)
            .map(|runner| format!("{:?}", runner.mode()))
            .unwrap_or_else(|| "Gone".to_string());
        println!(
            "  t={:>5.2}  farthest={:>5.2}  runner={:>6.2}  score={}  mode={}",
            time,
            manager.farthest_time(),
            self.position.get(),
            self.score.get(),
            mode,
        );
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== Rewind Demo ===\n");

    let config = ClockConfig {
        fixed_delta_time: 0.1,
        max_frame_time: 0.25,
        ..ClockConfig::default()
    };
    let mut host = Host::new(config)?;

    let position = Position::default();
    let score = TimedValue::new(0u32);
    host.manager_mut().add_timed_value(score.clone());

    let runner = host.manager_mut().add_time_object(
        TimedObject::builder("runner")
            .recorder(Runner {
                speed: 2.0,
                strides: MomentRecorder::new(position.clone()),
            })
            .observer(Scorer {
                score: score.clone(),
                since_last: 0.0,
            })
            .build()?,
    );

    let script = Sequence::new(vec![
        Step::Wait(3.0),
        Step::RewindTo {
            target: 1.0,
            speed: 4.0,
        },
        Step::SuspendRecording,
        Step::Wait(1.0),
        Step::ResumeRecording,
        Step::SetTimeScale(0.5),
        Step::Wait(2.0),
    ]);

    host.add_lifecycle(script)?;
    host.add_lifecycle(Reporter {
        runner,
        position: position.clone(),
        score: score.clone(),
        elapsed: 0.0,
    })?;

    host.init()?;
    tracing::info!(
        lifecycles = host.lifecycle_count(),
        "recording for 3s, rewinding to 1s at 4x, holding, then half speed"
    );

    // Feed the host 60 Hz frames
    let frame = 1.0 / 60.0;
    for _ in 0..(60 * 7) {
        host.advance(frame)?;
    }
    host.teardown()?;

    tracing::info!(
        steps = host.steps(),
        time = host.manager().cur_time(),
        runner = position.get(),
        score = score.get(),
        "demo finished"
    );
    Ok(())
}
