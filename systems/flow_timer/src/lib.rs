#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tick scheduler that decides when water advances.
//!
//! [`FlowTimer`] is a pure state machine: every call to [`FlowTimer::tick`]
//! stands for one elapsed time unit. Wall-clock pacing lives in [`Clock`],
//! which beats on a background thread and lets the caller decide what a beat
//! does.

mod clock;

use std::num::NonZeroU32;

use pipeflow_core::Handlers;
use tracing::debug;

pub use clock::{Clock, ClockControl};

/// Lifecycle of a flow timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerState {
    /// Created but not started.
    Idle,
    /// Ticking.
    Running,
    /// Suspended; ticks are ignored.
    Paused,
    /// Terminal; the timer never fires again.
    Stopped,
}

/// Outcome of a tick that reached a running timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerFire {
    /// Tick count after this tick, starting at 1.
    pub ticks_elapsed: u32,
    /// Whether water advances on this tick.
    pub flow: bool,
}

/// Counts ticks and reports when flow is due.
///
/// Flow fires on tick `t` when `t >= delay` and `(t - delay)` is a multiple
/// of the flow period.
#[derive(Debug)]
pub struct FlowTimer {
    ticks_elapsed: u32,
    delay: u32,
    flow_period: NonZeroU32,
    state: TimerState,
    tick_handlers: Handlers<u32>,
    flow_handlers: Handlers<u32>,
}

impl FlowTimer {
    /// Creates an idle timer.
    #[must_use]
    pub fn new(delay: u32, flow_period: NonZeroU32) -> Self {
        Self {
            ticks_elapsed: 0,
            delay,
            flow_period,
            state: TimerState::Idle,
            tick_handlers: Handlers::new(),
            flow_handlers: Handlers::new(),
        }
    }

    /// Ticks before the first flow.
    #[must_use]
    pub const fn delay(&self) -> u32 {
        self.delay
    }

    /// Ticks between consecutive flows.
    #[must_use]
    pub const fn flow_period(&self) -> NonZeroU32 {
        self.flow_period
    }

    /// Ticks counted while running.
    #[must_use]
    pub const fn ticks_elapsed(&self) -> u32 {
        self.ticks_elapsed
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> TimerState {
        self.state
    }

    /// Whether flow is due on tick `ticks_elapsed`.
    #[must_use]
    pub const fn flow_due(&self, ticks_elapsed: u32) -> bool {
        match ticks_elapsed.checked_sub(self.delay) {
            Some(since_delay) => since_delay % self.flow_period.get() == 0,
            None => false,
        }
    }

    /// Registers a handler invoked with the tick count on every tick.
    pub fn on_tick<F>(&mut self, handler: F)
    where
        F: FnMut(&u32) + Send + 'static,
    {
        self.tick_handlers.subscribe(handler);
    }

    /// Registers a handler invoked with the tick count whenever flow is due.
    pub fn on_flow<F>(&mut self, handler: F)
    where
        F: FnMut(&u32) + Send + 'static,
    {
        self.flow_handlers.subscribe(handler);
    }

    /// Moves an idle timer to running.
    pub fn start(&mut self) -> bool {
        self.transition(TimerState::Idle, TimerState::Running)
    }

    /// Suspends a running timer without resetting its tick count.
    pub fn pause(&mut self) -> bool {
        self.transition(TimerState::Running, TimerState::Paused)
    }

    /// Resumes a paused timer.
    pub fn resume(&mut self) -> bool {
        self.transition(TimerState::Paused, TimerState::Running)
    }

    /// Stops the timer for good. Returns `false` if it was already stopped.
    pub fn stop(&mut self) -> bool {
        if self.state == TimerState::Stopped {
            return false;
        }
        debug!(from = ?self.state, ticks_elapsed = self.ticks_elapsed, "flow timer stopped");
        self.state = TimerState::Stopped;
        true
    }

    /// Advances a running timer by one tick.
    ///
    /// Returns `None` without invoking handlers unless the timer is running.
    pub fn tick(&mut self) -> Option<TimerFire> {
        if self.state != TimerState::Running {
            return None;
        }

        self.ticks_elapsed = self.ticks_elapsed.saturating_add(1);
        let ticks_elapsed = self.ticks_elapsed;
        self.tick_handlers.emit(&ticks_elapsed);

        let flow = self.flow_due(ticks_elapsed);
        if flow {
            self.flow_handlers.emit(&ticks_elapsed);
        }

        Some(TimerFire {
            ticks_elapsed,
            flow,
        })
    }

    fn transition(&mut self, from: TimerState, to: TimerState) -> bool {
        if self.state != from {
            return false;
        }
        debug!(?from, ?to, "flow timer transition");
        self.state = to;
        true
    }
}
