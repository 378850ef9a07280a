#![forbid(unsafe_code)]

//! Native pointer drag-and-drop.
//!
//! Browsers deliver `dragstart`, a stream of `dragover` / `dragenter`, then
//! `drop` on the target (if any) and finally `dragend` on the source. A
//! `dragend` that arrives without a preceding `drop` means the drag was
//! abandoned, so it cancels.

use tracing::trace;
use trainboard_core::Point;

use super::{
    DragSink, GestureDispatch, GestureIgnoredReason, GestureOutcome, GestureSource,
    preview_target,
};
use crate::grid::DayId;
use crate::measure::CardAddress;

/// Where inside a day column a drop landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DropZone {
    /// Over the card list; commits at the preview index.
    #[default]
    Column,
    /// The empty strip after the last card; always appends.
    Tail,
}

/// Native drag-and-drop events.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerInput {
    DragStart { card: CardAddress, point: Point },
    DragOver { day: DayId, point: Point },
    DragEnterSlot { day: DayId, index: usize },
    Drop { day: DayId, zone: DropZone },
    DragEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum PointerPhase {
    #[default]
    Idle,
    Dragging,
    /// `drop` was seen; waiting for the trailing `dragend`.
    Dropped,
}

/// [`GestureSource`] for native pointer drags.
#[derive(Debug, Clone, Default)]
pub struct PointerDragSource {
    phase: PointerPhase,
}

impl PointerDragSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl GestureSource for PointerDragSource {
    type Input = PointerInput;

    fn handle<S: DragSink + ?Sized>(
        &mut self,
        input: PointerInput,
        sink: &mut S,
    ) -> GestureDispatch {
        match (self.phase, input) {
            (PointerPhase::Dragging, PointerInput::DragStart { .. }) => {
                GestureDispatch::ignored(GestureIgnoredReason::GestureInProgress)
            }
            (_, PointerInput::DragStart { card, point }) => {
                if !sink.begin_drag(&card, point) {
                    trace!(?card, "pointer drag refused");
                    self.phase = PointerPhase::Idle;
                    return GestureDispatch::ignored(GestureIgnoredReason::DragRejected);
                }
                self.phase = PointerPhase::Dragging;
                GestureDispatch::new(GestureOutcome::DragStarted)
            }
            (PointerPhase::Dragging, PointerInput::DragOver { day, point }) => {
                let preview = sink.drag_over(day, point);
                GestureDispatch::new(GestureOutcome::PreviewUpdated(preview)).prevent_default()
            }
            (PointerPhase::Dragging, PointerInput::DragEnterSlot { day, index }) => {
                let preview = sink.enter_slot(day, index);
                GestureDispatch::new(GestureOutcome::PreviewUpdated(preview)).prevent_default()
            }
            (PointerPhase::Dragging, PointerInput::Drop { day, zone }) => {
                let target = match zone {
                    DropZone::Column => preview_target(sink, day),
                    DropZone::Tail => None,
                };
                let outcome = sink.complete_drop(day, target);
                self.phase = PointerPhase::Dropped;
                GestureDispatch::new(GestureOutcome::Dropped(outcome)).prevent_default()
            }
            (PointerPhase::Dragging, PointerInput::DragEnd) => {
                self.phase = PointerPhase::Idle;
                sink.cancel_drag();
                GestureDispatch::new(GestureOutcome::Cancelled)
            }
            (PointerPhase::Dropped, PointerInput::DragEnd) => {
                self.phase = PointerPhase::Idle;
                GestureDispatch::nothing()
            }
            (phase, input) => {
                trace!(?phase, ?input, "pointer event outside a drag");
                GestureDispatch::ignored(GestureIgnoredReason::NoActiveGesture)
            }
        }
    }

    fn teardown<S: DragSink + ?Sized>(&mut self, sink: &mut S) -> GestureDispatch {
        let phase = std::mem::take(&mut self.phase);
        if phase == PointerPhase::Dragging && sink.cancel_drag() {
            return GestureDispatch::new(GestureOutcome::Cancelled);
        }
        GestureDispatch::nothing()
    }

    fn is_engaged(&self) -> bool {
        self.phase == PointerPhase::Dragging
    }
}
