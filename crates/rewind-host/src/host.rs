//! Fixed-step host loop
//!
//! `Host` owns the `GlobalTimeManager` and every `Lifecycle`. Frame time fed
//! to `advance` goes into an accumulator; each whole fixed step drains one
//! `fixed_delta_time` from it, ticks the clock and then every lifecycle in
//! registration order.

use crate::error::{Error, Result};
use crate::lifecycle::Lifecycle;
use rewind_core::{ClockConfig, GlobalTimeManager, Time};

/// Slack when comparing the accumulator against the fixed step
const STEP_EPSILON: f64 = 1e-9;

/// State of the host loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostState {
    /// Created, `init` not called yet
    Idle,
    /// Initialized and accepting frames
    Running,
    /// `teardown` has run
    Stopped,
}

/// Drives a time manager and its lifecycles at a fixed step
pub struct Host {
    manager: GlobalTimeManager,
    lifecycles: Vec<Box<dyn Lifecycle>>,
    accumulator: Time,
    steps: u64,
    state: HostState,
}

impl Host {
    /// Create a host with a fresh manager
    pub fn new(config: ClockConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_manager(GlobalTimeManager::new(config)))
    }

    /// Create a host around an existing manager
    pub fn with_manager(manager: GlobalTimeManager) -> Self {
        Self {
            manager,
            lifecycles: Vec::new(),
            accumulator: 0.0,
            steps: 0,
            state: HostState::Idle,
        }
    }

    /// Add a lifecycle; it is initialized immediately when the host runs
    pub fn add_lifecycle(&mut self, lifecycle: impl Lifecycle + 'static) -> Result<()> {
        let mut lifecycle: Box<dyn Lifecycle> = Box::new(lifecycle);
        if self.state == HostState::Running {
            lifecycle.init(&mut self.manager)?;
        }
        self.lifecycles.push(lifecycle);
        Ok(())
    }

    /// Initialize every lifecycle in registration order
    pub fn init(&mut self) -> Result<()> {
        if self.state != HostState::Idle {
            return Err(Error::AlreadyInitialized);
        }
        for lifecycle in &mut self.lifecycles {
            lifecycle.init(&mut self.manager)?;
        }
        self.state = HostState::Running;
        tracing::debug!(
            lifecycles = self.lifecycles.len(),
            fixed_delta_time = self.manager.fixed_delta_time(),
            "host initialized"
        );
        Ok(())
    }

    /// Feed one frame of wall time and run every fixed step it covers
    ///
    /// Frame time above `max_frame_time` is clamped. Returns the number of
    /// steps run.
    pub fn advance(&mut self, frame_seconds: Time) -> Result<usize> {
        self.ensure_running()?;
        if !frame_seconds.is_finite() || frame_seconds < 0.0 {
            return Err(Error::InvalidStep(frame_seconds));
        }

        let max_frame = self.manager.config().max_frame_time;
        if frame_seconds > max_frame {
            tracing::warn!(frame_seconds, max_frame, "frame time clamped");
        }
        self.accumulator += frame_seconds.min(max_frame);

        let step = self.manager.fixed_delta_time();
        let mut count = 0;
        while self.accumulator + STEP_EPSILON >= step {
            self.accumulator = (self.accumulator - step).max(0.0);
            self.run_step()?;
            count += 1;
        }
        Ok(count)
    }

    /// Run exactly one fixed step regardless of the accumulator
    pub fn step(&mut self) -> Result<()> {
        self.ensure_running()?;
        self.run_step()
    }

    /// Tear down every lifecycle in reverse registration order
    pub fn teardown(&mut self) -> Result<()> {
        self.ensure_running()?;
        for lifecycle in self.lifecycles.iter_mut().rev() {
            lifecycle.teardown(&mut self.manager);
        }
        self.state = HostState::Stopped;
        tracing::debug!(steps = self.steps, "host stopped");
        Ok(())
    }

    pub fn manager(&self) -> &GlobalTimeManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut GlobalTimeManager {
        &mut self.manager
    }

    pub fn state(&self) -> HostState {
        self.state
    }

    /// Fixed steps run since `init`
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Frame time not yet consumed by a step
    pub fn accumulator(&self) -> Time {
        self.accumulator
    }

    pub fn lifecycle_count(&self) -> usize {
        self.lifecycles.len()
    }

    fn ensure_running(&self) -> Result<()> {
        match self.state {
            HostState::Running => Ok(()),
            HostState::Idle | HostState::Stopped => Err(Error::NotInitialized),
        }
    }

    fn run_step(&mut self) -> Result<()> {
        self.manager.tick();
        let time = self.manager.cur_time();
        let delta = self.manager.fixed_delta_time();
        for lifecycle in &mut self.lifecycles {
            lifecycle.tick(&mut self.manager, time, delta)?;
        }
        self.steps += 1;
        Ok(())
    }
}

impl std::fmt::Debug for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host")
            .field("manager", &self.manager)
            .field("lifecycles", &self.lifecycles.len())
            .field("accumulator", &self.accumulator)
            .field("steps", &self.steps)
            .field("state", &self.state)
            .finish()
    }
}
