#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Game session orchestration for Pipeflow.
//!
//! A [`Session`] owns the grid, the pipe queue, the placement history and the
//! flow timer of one game. Player actions mutate it synchronously; timer
//! ticks arrive through [`Session::tick`]. Every state change is described by
//! [`Event`] values that are appended to the caller's buffer by [`apply`] and
//! broadcast to subscribers in order.
//!
//! Hosts that tick from a background thread wrap the session in a
//! [`SharedSession`] and attach a clock with [`drive`]. Beats and player
//! actions then serialise through the same lock.

mod settings;

use std::{
    io,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use pipeflow_core::{
    Command, Coordinate, Event, Handlers, Level, LevelError, LossReason, PlacementError,
    Replacement,
};
use pipeflow_system_flow_timer::{Clock, ClockControl, FlowTimer, TimerState};
use pipeflow_system_generation::{generate, GenerationError};
use pipeflow_system_history::{CellStack, PlacedPipe};
use pipeflow_system_pipe_queue::PipeQueue;
use pipeflow_world::Grid;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::{debug, info};

pub use settings::{GameSettings, SettingsError};

/// Name given to randomly generated boards.
pub const GENERATED_LEVEL_NAME: &str = "Generated";

/// Reasons a session cannot be created.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The level data is malformed or unplayable.
    #[error("invalid level: {0}")]
    Level(#[from] LevelError),
    /// Board generation failed.
    #[error("board generation failed: {0}")]
    Generation(#[from] GenerationError),
    /// The settings are out of range.
    #[error("invalid settings: {0}")]
    Settings(#[from] SettingsError),
}

/// Whether the session has been decided.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Still being played.
    InProgress,
    /// Source and sink were connected.
    Won,
    /// The session was lost.
    Lost(LossReason),
}

/// Observable counters of a session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionStats {
    /// Display name of the level.
    pub level_name: String,
    /// Ticks counted since the countdown started.
    pub ticks_elapsed: u32,
    /// Ticks left before the countdown runs out, if one is configured.
    pub remaining_ticks: Option<u32>,
    /// Placements minus successful undos.
    pub steps: u32,
    /// Successful undos.
    pub undo_count: u32,
}

/// Session shared between a clock thread and the player.
pub type SharedSession = Arc<Mutex<Session>>;

/// One game on one board.
#[derive(Debug)]
pub struct Session {
    level_name: String,
    grid: Grid,
    queue: PipeQueue,
    history: CellStack,
    timer: FlowTimer,
    next_distance: u32,
    steps: u32,
    outcome: Outcome,
    time_limit: Option<u32>,
    subscribers: Handlers<Event>,
}

impl Session {
    /// Creates a session for an authored level.
    ///
    /// The level must have a delay of at least one tick, a structurally valid
    /// layout and a source that walls do not seal off from the sink. The
    /// queue starts with the level's pipes, if any, and draws further pipes
    /// from `rng`.
    pub fn from_level(
        level_name: impl Into<String>,
        level: &Level,
        settings: &GameSettings,
        rng: ChaCha8Rng,
    ) -> Result<Self, SessionError> {
        let flow_period = settings.nonzero_flow_period()?;
        let queue_length = settings.nonzero_queue_length()?;
        if settings.time_limit == Some(0) {
            return Err(SettingsError::ZeroTimeLimit.into());
        }
        if level.delay == 0 {
            return Err(LevelError::InvalidDelay.into());
        }

        let grid = Grid::from_level(level)?;
        if !grid.check_reachable() {
            return Err(LevelError::Unreachable.into());
        }

        let seeded = level.pipes.clone().unwrap_or_default();
        let level_name = level_name.into();
        debug!(
            level = %level_name,
            rows = level.rows,
            cols = level.cols,
            delay = level.delay,
            seeded_pipes = seeded.len(),
            "session created"
        );

        Ok(Self {
            level_name,
            grid,
            queue: PipeQueue::with_pipes(queue_length, seeded, rng),
            history: CellStack::new(),
            timer: FlowTimer::new(level.delay, flow_period),
            next_distance: 0,
            steps: 0,
            outcome: Outcome::InProgress,
            time_limit: settings.time_limit,
            subscribers: Handlers::new(),
        })
    }

    /// Creates a session on a freshly generated board.
    ///
    /// Uses the configured seed when present, entropy otherwise.
    pub fn generated(settings: &GameSettings) -> Result<Self, SessionError> {
        settings.validate()?;
        let mut rng = match settings.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let level = generate(settings.rows, settings.cols, settings.delay, &mut rng)?;
        Self::from_level(GENERATED_LEVEL_NAME, &level, settings, rng)
    }

    /// Registers a handler that receives every event in order.
    pub fn subscribe<F>(&mut self, handler: F)
    where
        F: FnMut(&Event) + Send + 'static,
    {
        self.subscribers.subscribe(handler);
    }

    /// Read-only view of the board.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Read-only view of the pipe queue.
    #[must_use]
    pub const fn queue(&self) -> &PipeQueue {
        &self.queue
    }

    /// Current outcome.
    #[must_use]
    pub const fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Lifecycle state of the flow timer.
    #[must_use]
    pub const fn timer_state(&self) -> TimerState {
        self.timer.state()
    }

    /// Display name of the level.
    #[must_use]
    pub fn level_name(&self) -> &str {
        &self.level_name
    }

    /// Snapshot of the observable counters.
    #[must_use]
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            level_name: self.level_name.clone(),
            ticks_elapsed: self.timer.ticks_elapsed(),
            remaining_ticks: self.remaining_ticks(),
            steps: self.steps,
            undo_count: self.history.undo_count(),
        }
    }

    /// Ticks left in countdown mode.
    #[must_use]
    pub fn remaining_ticks(&self) -> Option<u32> {
        self.time_limit
            .map(|limit| limit.saturating_sub(self.timer.ticks_elapsed()))
    }

    /// Whether the source has been connected to the sink.
    #[must_use]
    pub const fn has_won(&self) -> bool {
        matches!(self.outcome, Outcome::Won)
    }

    /// Whether the session was lost.
    #[must_use]
    pub const fn has_lost(&self) -> bool {
        matches!(self.outcome, Outcome::Lost(_))
    }

    /// Whether a cross placement at `coord` would spend the replacement.
    ///
    /// # Panics
    ///
    /// Panics when `coord` lies outside the board.
    #[must_use]
    pub fn can_replace_pipe(&self, coord: Coordinate) -> bool {
        self.outcome == Outcome::InProgress
            && self.queue.replace_available()
            && self.grid.accepts_pipe(coord)
    }

    /// Places the head of the queue at `coord`.
    ///
    /// With [`Replacement::Cross`] the head first turns into a cross when the
    /// replacement is still available and the cell accepts a pipe.
    ///
    /// # Panics
    ///
    /// Panics when `coord` lies outside the board.
    pub fn place_pipe(
        &mut self,
        coord: Coordinate,
        replacement: Replacement,
    ) -> Result<(), PlacementError> {
        let mut events = Vec::new();
        let result = self.place_pipe_into(coord, replacement, &mut events);
        self.publish(&events);
        result
    }

    /// Discards the head of the queue. Returns `false` once decided or paused.
    pub fn skip_pipe(&mut self) -> bool {
        let mut events = Vec::new();
        let skipped = self.skip_pipe_into(&mut events);
        self.publish(&events);
        skipped
    }

    /// Reverts the most recent placement if water has not reached it.
    ///
    /// A filled or missing top entry leaves every counter and the history
    /// untouched.
    pub fn undo_step(&mut self) -> Option<PlacedPipe> {
        let mut events = Vec::new();
        let undone = self.undo_step_into(&mut events);
        self.publish(&events);
        undone
    }

    /// Starts the flow timer. Returns `false` unless the timer was idle.
    pub fn start_countdown(&mut self) -> bool {
        let started = self.outcome == Outcome::InProgress && self.timer.start();
        if started {
            self.next_distance = 0;
            info!(level = %self.level_name, "countdown started");
        }
        started
    }

    /// Stops the flow timer for good.
    ///
    /// Once this returns no further tick or flow is processed.
    pub fn stop_countdown(&mut self) -> bool {
        self.timer.stop()
    }

    /// Suspends the flow timer.
    pub fn pause_game(&mut self) -> bool {
        let mut events = Vec::new();
        let paused = self.pause_into(&mut events);
        self.publish(&events);
        paused
    }

    /// Resumes a suspended flow timer.
    pub fn resume_game(&mut self) -> bool {
        let mut events = Vec::new();
        let resumed = self.resume_into(&mut events);
        self.publish(&events);
        resumed
    }

    /// Fills every pipe water can reach and returns how many changed.
    pub fn fill_all_pipes(&mut self) -> usize {
        self.grid.fill_all()
    }

    /// Processes one clock beat.
    ///
    /// Does nothing unless the timer is running. Otherwise counts the tick,
    /// advances water when flow is due and decides a loss when the flow has
    /// stalled or the countdown ran out.
    pub fn tick(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        self.tick_into(&mut events);
        self.publish(&events);
        events
    }

    fn place_pipe_into(
        &mut self,
        coord: Coordinate,
        replacement: Replacement,
        out_events: &mut Vec<Event>,
    ) -> Result<(), PlacementError> {
        let verdict = self.admit_placement(coord, replacement, out_events);
        if let Err(reason) = verdict {
            debug!(%coord, %reason, "placement rejected");
            out_events.push(Event::PlacementRejected { coord, reason });
        }
        verdict
    }

    fn admit_placement(
        &mut self,
        coord: Coordinate,
        replacement: Replacement,
        out_events: &mut Vec<Event>,
    ) -> Result<(), PlacementError> {
        if self.outcome != Outcome::InProgress {
            return Err(PlacementError::SessionOver);
        }
        if self.timer.state() == TimerState::Paused {
            return Err(PlacementError::Paused);
        }

        if replacement == Replacement::Cross
            && self.can_replace_pipe(coord)
            && self.queue.try_replace_head_with_cross()
        {
            out_events.push(Event::CrossSubstituted);
        }

        let pipe = self.queue.peek();
        self.grid.place_pipe(coord, pipe)?;

        let _ = self.queue.consume();
        self.history.push(coord, pipe);
        self.steps = self.steps.saturating_add(1);
        out_events.push(Event::PipePlaced {
            coord,
            shape: pipe.shape(),
        });

        if self.grid.check_path() {
            self.win(out_events);
        }
        Ok(())
    }

    fn skip_pipe_into(&mut self, out_events: &mut Vec<Event>) -> bool {
        if self.outcome != Outcome::InProgress || self.timer.state() == TimerState::Paused {
            return false;
        }
        let skipped = self.queue.consume();
        debug!(shape = ?skipped.shape(), "pipe skipped");
        out_events.push(Event::PipeSkipped {
            shape: skipped.shape(),
        });
        true
    }

    fn undo_step_into(&mut self, out_events: &mut Vec<Event>) -> Option<PlacedPipe> {
        let undone = self.revert_last_placement();
        match undone {
            Some(entry) => out_events.push(Event::StepUndone {
                coord: entry.coord(),
                shape: entry.pipe().shape(),
            }),
            None => out_events.push(Event::UndoRejected),
        }
        undone
    }

    fn revert_last_placement(&mut self) -> Option<PlacedPipe> {
        if self.outcome != Outcome::InProgress || self.timer.state() == TimerState::Paused {
            return None;
        }

        let top = self.history.peek()?;
        let pipe = self.grid.undo(top.coord())?;
        let entry = self.history.pop()?;
        self.queue.undo(pipe);
        self.steps = self.steps.saturating_sub(1);
        debug!(coord = %entry.coord(), shape = ?pipe.shape(), "step undone");
        Some(entry)
    }

    fn pause_into(&mut self, out_events: &mut Vec<Event>) -> bool {
        let paused = self.timer.pause();
        if paused {
            out_events.push(Event::Paused);
        }
        paused
    }

    fn resume_into(&mut self, out_events: &mut Vec<Event>) -> bool {
        let resumed = self.timer.resume();
        if resumed {
            out_events.push(Event::Resumed);
        }
        resumed
    }

    fn tick_into(&mut self, out_events: &mut Vec<Event>) {
        let Some(fire) = self.timer.tick() else {
            return;
        };
        out_events.push(Event::Ticked {
            ticks_elapsed: fire.ticks_elapsed,
        });

        if fire.flow {
            let distance = self.next_distance;
            let filled = self.grid.fill_tiles(distance);
            self.next_distance = self.next_distance.saturating_add(1);
            out_events.push(Event::FlowAdvanced { distance, filled });

            if self.grid.has_lost() {
                self.lose(LossReason::FlowStalled, out_events);
                return;
            }
        }

        if self.remaining_ticks() == Some(0) {
            self.lose(LossReason::TimeUp, out_events);
        }
    }

    fn win(&mut self, out_events: &mut Vec<Event>) {
        self.outcome = Outcome::Won;
        let _ = self.grid.fill_all();
        let _ = self.timer.stop();
        info!(level = %self.level_name, steps = self.steps, "session won");
        out_events.push(Event::Won);
    }

    fn lose(&mut self, reason: LossReason, out_events: &mut Vec<Event>) {
        self.outcome = Outcome::Lost(reason);
        let _ = self.timer.stop();
        info!(level = %self.level_name, ?reason, "session lost");
        out_events.push(Event::Lost { reason });
    }

    fn publish(&mut self, events: &[Event]) {
        for event in events {
            self.subscribers.emit(event);
        }
    }
}

/// Applies a player command and appends the resulting events.
///
/// The new events are also broadcast to the session's subscribers.
pub fn apply(session: &mut Session, command: Command, out_events: &mut Vec<Event>) {
    let first_new = out_events.len();
    match command {
        Command::PlacePipe { coord, replacement } => {
            let _ = session.place_pipe_into(coord, replacement, out_events);
        }
        Command::SkipPipe => {
            let _ = session.skip_pipe_into(out_events);
        }
        Command::UndoStep => {
            let _ = session.undo_step_into(out_events);
        }
        Command::Pause => {
            let _ = session.pause_into(out_events);
        }
        Command::Resume => {
            let _ = session.resume_into(out_events);
        }
    }
    session.publish(&out_events[first_new..]);
}

/// Wraps a session so a clock thread and the player can share it.
#[must_use]
pub fn share(session: Session) -> SharedSession {
    Arc::new(Mutex::new(session))
}

/// Attaches a background clock that ticks `session` every `interval`.
///
/// Each beat ticks the session under its lock. The clock ends itself once
/// the session's timer has stopped.
pub fn drive(session: &SharedSession, interval: Duration) -> io::Result<Clock> {
    let session = Arc::clone(session);
    Clock::spawn(interval, move || {
        let mut session = session.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = session.tick();
        if session.timer_state() == TimerState::Stopped {
            ClockControl::Break
        } else {
            ClockControl::Continue
        }
    })
}
