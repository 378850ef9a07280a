#![forbid(unsafe_code)]

//! Touch input: long-press to drag.
//!
//! A finger on a card first becomes a pending press. Held still past the
//! long-press deadline it becomes a drag; moved past the tolerance first it is
//! a scroll and the press is dropped; lifted early it is a tap.
//!
//! # State Machine
//!
//! ```text
//!   Idle ──Start──▶ Pending ──TimerFired / late event──▶ Dragging
//!                     │                                    │
//!                     ├─Move > tolerance─▶ Idle            ├─End over a day─▶ commit, Idle
//!                     └─End / Cancel────▶ Idle             └─End elsewhere / Cancel─▶ cancel, Idle
//! ```
//!
//! # Invariants
//!
//! 1. At most one drag is begun per press.
//! 2. Every terminal event and [`GestureSource::teardown`] leave the source
//!    idle with no card, no position and no pending deadline.
//! 3. Moves while dragging ask the host to suppress scrolling.

use tracing::{debug, trace};
use trainboard_core::{Point, PressConfig, PressPhase, PressTracker, PressVerdict};
use web_time::Instant;

use super::{
    DragSink, GestureDispatch, GestureIgnoredReason, GestureOutcome, GestureSource, TimerCommand,
    preview_target,
};
use crate::measure::CardAddress;

/// Raw touch events for one finger.
#[derive(Debug, Clone, PartialEq)]
pub enum TouchInput {
    Start {
        card: CardAddress,
        point: Point,
        at: Instant,
    },
    Move {
        point: Point,
        at: Instant,
    },
    End {
        at: Instant,
    },
    Cancel,
    /// The timer armed by a previous dispatch fired.
    TimerFired {
        at: Instant,
    },
}

/// [`GestureSource`] for touch long-press drags.
#[derive(Debug, Clone)]
pub struct TouchDragSource {
    tracker: PressTracker,
    card: Option<CardAddress>,
    last_point: Option<Point>,
}

impl Default for TouchDragSource {
    fn default() -> Self {
        Self::new(PressConfig::default())
    }
}

impl TouchDragSource {
    #[must_use]
    pub fn new(config: PressConfig) -> Self {
        Self {
            tracker: PressTracker::new(config),
            card: None,
            last_point: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> &PressConfig {
        self.tracker.config()
    }

    /// Card under the current press, if any.
    #[must_use]
    pub fn card(&self) -> Option<&CardAddress> {
        self.card.as_ref()
    }

    #[must_use]
    pub fn phase(&self) -> PressPhase {
        self.tracker.phase()
    }

    fn clear(&mut self) {
        self.tracker.reset();
        self.card = None;
        self.last_point = None;
    }

    /// The press just engaged: begin exactly one drag from the press origin.
    fn engage<S: DragSink + ?Sized>(&mut self, sink: &mut S) -> bool {
        let (Some(card), Some(origin)) = (self.card.clone(), self.tracker.origin()) else {
            self.clear();
            return false;
        };
        if sink.begin_drag(&card, origin) {
            debug!(?card, "touch drag engaged");
            return true;
        }
        trace!(?card, "touch drag refused by sink");
        self.clear();
        false
    }

    /// Route a finger position while dragging.
    fn route<S: DragSink + ?Sized>(sink: &mut S, point: Point) -> GestureDispatch {
        let dispatch = match sink.day_at(point) {
            Some(day) => {
                GestureDispatch::new(GestureOutcome::PreviewUpdated(sink.drag_over(day, point)))
            }
            None => GestureDispatch::nothing(),
        };
        dispatch.prevent_default()
    }

    /// Finish an engaged drag at the last known finger position.
    fn finish<S: DragSink + ?Sized>(&mut self, sink: &mut S) -> GestureDispatch {
        let point = self.last_point.or_else(|| self.tracker.origin());
        self.clear();
        let dispatch = match point.and_then(|point| sink.day_at(point)) {
            Some(day) => {
                let target = preview_target(sink, day);
                GestureDispatch::new(GestureOutcome::Dropped(sink.complete_drop(day, target)))
            }
            None => {
                sink.cancel_drag();
                GestureDispatch::new(GestureOutcome::Cancelled)
            }
        };
        dispatch.with_timer(TimerCommand::Clear).prevent_default()
    }

    fn started<S: DragSink + ?Sized>(&mut self, sink: &mut S) -> GestureDispatch {
        if self.engage(sink) {
            GestureDispatch::new(GestureOutcome::DragStarted)
                .with_timer(TimerCommand::Clear)
                .prevent_default()
        } else {
            GestureDispatch::ignored(GestureIgnoredReason::DragRejected)
                .with_timer(TimerCommand::Clear)
        }
    }
}

impl GestureSource for TouchDragSource {
    type Input = TouchInput;

    fn handle<S: DragSink + ?Sized>(&mut self, input: TouchInput, sink: &mut S) -> GestureDispatch {
        match input {
            TouchInput::Start { card, point, at } => {
                if self.tracker.phase() != PressPhase::Idle || sink.is_dragging() {
                    return GestureDispatch::ignored(GestureIgnoredReason::GestureInProgress);
                }
                match self.tracker.press(point, at) {
                    PressVerdict::Armed { deadline } => {
                        trace!(?card, "touch press armed");
                        self.card = Some(card);
                        self.last_point = Some(point);
                        GestureDispatch::new(GestureOutcome::Armed)
                            .with_timer(TimerCommand::Arm { deadline })
                    }
                    _ => GestureDispatch::ignored(GestureIgnoredReason::GestureInProgress),
                }
            }
            TouchInput::Move { point, at } => {
                let verdict = self.tracker.moved(point, at);
                match verdict {
                    PressVerdict::Ignored => {
                        GestureDispatch::ignored(GestureIgnoredReason::NoActiveGesture)
                    }
                    PressVerdict::Cancelled => {
                        self.clear();
                        GestureDispatch::new(GestureOutcome::PressCancelled)
                            .with_timer(TimerCommand::Clear)
                    }
                    PressVerdict::Engaged => {
                        self.last_point = Some(point);
                        let dispatch = self.started(sink);
                        if dispatch.outcome == GestureOutcome::DragStarted {
                            // Late engagement: the finger has already moved,
                            // so place the preview where it is now.
                            Self::route(sink, point);
                        }
                        dispatch
                    }
                    PressVerdict::None | PressVerdict::Armed { .. } => {
                        self.last_point = Some(point);
                        if self.tracker.phase() == PressPhase::Engaged {
                            Self::route(sink, point)
                        } else {
                            GestureDispatch::nothing()
                        }
                    }
                }
            }
            TouchInput::TimerFired { at } => match self.tracker.poll(at) {
                PressVerdict::Engaged => self.started(sink),
                PressVerdict::Ignored => {
                    GestureDispatch::ignored(GestureIgnoredReason::NoActiveGesture)
                }
                _ => match self.tracker.deadline() {
                    // Fired early: ask for another timer at the real deadline.
                    Some(deadline) => {
                        GestureDispatch::nothing().with_timer(TimerCommand::Arm { deadline })
                    }
                    None => GestureDispatch::nothing(),
                },
            },
            TouchInput::End { at } => {
                if self.tracker.poll(at) == PressVerdict::Engaged && !self.engage(sink) {
                    return GestureDispatch::ignored(GestureIgnoredReason::DragRejected)
                        .with_timer(TimerCommand::Clear);
                }
                match self.tracker.phase() {
                    PressPhase::Idle => {
                        GestureDispatch::ignored(GestureIgnoredReason::NoActiveGesture)
                    }
                    PressPhase::Pending => {
                        self.clear();
                        GestureDispatch::new(GestureOutcome::PressReleased)
                            .with_timer(TimerCommand::Clear)
                    }
                    PressPhase::Engaged => self.finish(sink),
                }
            }
            TouchInput::Cancel => {
                let phase = self.tracker.phase();
                self.clear();
                match phase {
                    PressPhase::Idle => {
                        GestureDispatch::ignored(GestureIgnoredReason::NoActiveGesture)
                    }
                    PressPhase::Pending => GestureDispatch::new(GestureOutcome::PressCancelled)
                        .with_timer(TimerCommand::Clear),
                    PressPhase::Engaged => {
                        sink.cancel_drag();
                        GestureDispatch::new(GestureOutcome::Cancelled)
                            .with_timer(TimerCommand::Clear)
                    }
                }
            }
        }
    }

    fn teardown<S: DragSink + ?Sized>(&mut self, sink: &mut S) -> GestureDispatch {
        let engaged = self.tracker.phase() == PressPhase::Engaged;
        self.clear();
        let outcome = if engaged && sink.cancel_drag() {
            GestureOutcome::Cancelled
        } else {
            GestureOutcome::Nothing
        };
        GestureDispatch::new(outcome).with_timer(TimerCommand::Clear)
    }

    fn is_engaged(&self) -> bool {
        self.tracker.phase() == PressPhase::Engaged
    }
}
