//! Text rendering of a running session.

use std::fmt::Write as _;

use pipeflow_core::{Event, ImageKind, LossReason};
use pipeflow_session::{Outcome, Session};
use pipeflow_world::query;

const FILLED_MARK: char = '~';

/// Draws the board with row and column indices, followed by the queue and
/// the session counters. Filled pipes carry a trailing `~`.
pub(crate) fn render(session: &Session) -> String {
    let grid = session.grid();
    let mut out = String::from("   ");
    for col in 0..grid.cols() {
        let _ = write!(out, "{:<2}", col % 100);
    }
    out.push('\n');

    for (row, cells) in query::rows(grid).enumerate() {
        let _ = write!(out, "{row:>2} ");
        for cell in cells {
            let filled = matches!(cell.image().kind(), ImageKind::Pipe { filled: true, .. });
            out.push(cell.to_char());
            out.push(if filled { FILLED_MARK } else { ' ' });
        }
        out.push('\n');
    }

    let upcoming: Vec<String> = session
        .queue()
        .visible()
        .map(|pipe| pipe.shape().glyph().to_string())
        .collect();
    let _ = writeln!(out, "next: {}", upcoming.join(" "));

    let stats = session.stats();
    let _ = write!(
        out,
        "ticks {}  steps {}  undos {}",
        stats.ticks_elapsed, stats.steps, stats.undo_count
    );
    if let Some(remaining) = stats.remaining_ticks {
        let _ = write!(out, "  remaining {remaining}");
    }
    if session.queue().replace_available() {
        out.push_str("  cross available");
    }
    out
}

/// One-line summary of the outcome.
pub(crate) fn outcome_line(session: &Session) -> String {
    match session.outcome() {
        Outcome::InProgress => "game abandoned".to_owned(),
        Outcome::Won => format!(
            "{}: connected in {} steps",
            session.level_name(),
            session.stats().steps
        ),
        Outcome::Lost(reason) => format!("{}: {}", session.level_name(), loss_text(reason)),
    }
}

/// Player-facing description of an event. Plain ticks are not reported.
pub(crate) fn describe(event: &Event) -> Option<String> {
    let text = match event {
        Event::Ticked { .. } => return None,
        Event::FlowAdvanced { distance, filled } => {
            format!("water reached distance {distance} ({filled} pipes)")
        }
        Event::PipePlaced { coord, shape } => format!("placed {} at {coord}", shape.glyph()),
        Event::PlacementRejected { coord, reason } => format!("cannot place at {coord}: {reason}"),
        Event::PipeSkipped { shape } => format!("skipped {}", shape.glyph()),
        Event::StepUndone { coord, shape } => format!("removed {} from {coord}", shape.glyph()),
        Event::UndoRejected => "nothing to undo".to_owned(),
        Event::CrossSubstituted => "next pipe replaced by a cross".to_owned(),
        Event::Paused => "paused".to_owned(),
        Event::Resumed => "resumed".to_owned(),
        Event::Won => "the source is connected to the sink".to_owned(),
        Event::Lost { reason } => loss_text(*reason).to_owned(),
    };
    Some(text)
}

/// Whether the event changes what the board shows.
pub(crate) const fn redraws(event: &Event) -> bool {
    matches!(
        event,
        Event::PipePlaced { .. }
            | Event::StepUndone { .. }
            | Event::PipeSkipped { .. }
            | Event::FlowAdvanced { .. }
    )
}

/// Whether the event decides the session.
pub(crate) const fn is_final(event: &Event) -> bool {
    matches!(event, Event::Won | Event::Lost { .. })
}

const fn loss_text(reason: LossReason) -> &'static str {
    match reason {
        LossReason::FlowStalled => "water spilled before reaching the sink",
        LossReason::TimeUp => "time is up",
    }
}
