#![forbid(unsafe_code)]

//! Input sources that drive a drag.
//!
//! Two vocabularies reach the engine: native pointer drag-and-drop
//! ([`PointerInput`]) and raw touch ([`TouchInput`]). Each has its own
//! [`GestureSource`] that turns host events into calls on one shared
//! [`DragSink`], so both paths end in the same drag controller and the same
//! commit.
//!
//! Every call returns a [`GestureDispatch`] describing what happened, whether
//! the host should suppress the platform default (scrolling, native drag
//! ghost), and whether a long-press timer needs arming or clearing.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Result |
//! |---------|-------|--------|
//! | Move/drop/end without a start | Out-of-order or duplicated host events | `Ignored(NoActiveGesture)` |
//! | Start while another gesture runs | Second finger, or touch during a pointer drag | `Ignored(GestureInProgress)` |
//! | Sink refuses the drag | Card no longer exists, or a drag is active | `Ignored(DragRejected)` |

mod pointer;
mod touch;

pub use pointer::{DropZone, PointerDragSource, PointerInput};
pub use touch::{TouchDragSource, TouchInput};

use trainboard_core::Point;
use web_time::Instant;

use crate::drag::DropOutcome;
use crate::grid::{DayId, Slot};
use crate::measure::CardAddress;

/// Receiver of gesture-level drag calls.
///
/// [`crate::builder::ScheduleBuilder`] is the production implementation. It
/// resolves cards and geometry and forwards to the drag controller.
pub trait DragSink {
    /// Start dragging `card`, grabbed at `point`. `false` when refused.
    fn begin_drag(&mut self, card: &CardAddress, point: Point) -> bool;

    /// Pointer is over `day` at `point`; recompute the preview.
    fn drag_over(&mut self, day: DayId, point: Point) -> Option<Slot>;

    /// Pointer entered the gap before card `index` of `day`.
    fn enter_slot(&mut self, day: DayId, index: usize) -> Option<Slot>;

    /// Commit into `day` at `target_index` (append when `None`).
    fn complete_drop(&mut self, day: DayId, target_index: Option<usize>) -> DropOutcome;

    /// Abandon the drag. Returns whether one was active.
    fn cancel_drag(&mut self) -> bool;

    fn drop_preview(&self) -> Option<Slot>;

    fn is_dragging(&self) -> bool;

    /// Day column under `point`, from the last measured layout.
    fn day_at(&self, point: Point) -> Option<DayId>;
}

/// A host input vocabulary mapped onto a [`DragSink`].
pub trait GestureSource {
    type Input;

    /// Handle one host event.
    fn handle<S: DragSink + ?Sized>(&mut self, input: Self::Input, sink: &mut S)
    -> GestureDispatch;

    /// Drop all source state, e.g. when the view unmounts. A drag this source
    /// started is cancelled.
    fn teardown<S: DragSink + ?Sized>(&mut self, sink: &mut S) -> GestureDispatch;

    /// Whether this source currently owns a drag.
    fn is_engaged(&self) -> bool;
}

/// Why a gesture event did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureIgnoredReason {
    NoActiveGesture,
    GestureInProgress,
    DragRejected,
}

/// What one dispatch did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureOutcome {
    /// Event accepted, nothing observable changed.
    Nothing,
    /// A touch press is pending.
    Armed,
    /// A pending press turned into a scroll or was cancelled.
    PressCancelled,
    /// A pending press ended before the deadline (a tap).
    PressReleased,
    DragStarted,
    PreviewUpdated(Option<Slot>),
    Dropped(DropOutcome),
    /// The drag ended without a commit.
    Cancelled,
    Ignored(GestureIgnoredReason),
}

/// Host timer instruction for long-press detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCommand {
    /// Fire `TimerFired` at `deadline`.
    Arm { deadline: Instant },
    /// Cancel any armed timer.
    Clear,
}

/// Result of one gesture event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GestureDispatch {
    pub outcome: GestureOutcome,
    pub timer: Option<TimerCommand>,
    /// The host should call `preventDefault()` on the originating event.
    pub prevent_default: bool,
}

impl GestureDispatch {
    #[must_use]
    pub const fn new(outcome: GestureOutcome) -> Self {
        Self {
            outcome,
            timer: None,
            prevent_default: false,
        }
    }

    #[must_use]
    pub const fn ignored(reason: GestureIgnoredReason) -> Self {
        Self::new(GestureOutcome::Ignored(reason))
    }

    #[must_use]
    pub const fn nothing() -> Self {
        Self::new(GestureOutcome::Nothing)
    }

    #[must_use]
    pub const fn with_timer(mut self, timer: TimerCommand) -> Self {
        self.timer = Some(timer);
        self
    }

    #[must_use]
    pub const fn prevent_default(mut self) -> Self {
        self.prevent_default = true;
        self
    }

    /// The drop outcome, if this dispatch committed or attempted a drop.
    #[must_use]
    pub fn drop_outcome(&self) -> Option<&DropOutcome> {
        match &self.outcome {
            GestureOutcome::Dropped(outcome) => Some(outcome),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_ignored(&self) -> bool {
        matches!(self.outcome, GestureOutcome::Ignored(_))
    }
}

/// Target index for a drop into `day`: the preview index when the preview is
/// on that day, otherwise append.
pub(crate) fn preview_target<S: DragSink + ?Sized>(sink: &S, day: DayId) -> Option<usize> {
    sink.drop_preview()
        .filter(|preview| preview.day == day)
        .map(|preview| preview.index)
}
