#![forbid(unsafe_code)]

//! Host-facing session that routes parsed events into the engine.
//!
//! A [`WebSession`] owns one [`ScheduleBuilder`] and both gesture sources.
//! The host feeds it JSON (see [`crate::input`]) and gets back a
//! [`HostResponse`] telling it whether to `preventDefault()`, whether to arm
//! or clear the long-press timer, and what the drop indicator should show.

use serde::Serialize;
use tracing::{debug, trace};
use trainboard_schedule::gesture::{
    DragSink, GestureDispatch, GestureOutcome, GestureSource, PointerDragSource, TimerCommand,
    TouchDragSource,
};
use trainboard_schedule::{
    BuilderConfig, DayId, DropOutcome, ModuleLibrary, ScheduleBuilder, Slot,
};
use web_time::Instant;

use crate::input::{HostClock, HostEvent, InputParseError, parse_host_event};

/// Timer instruction in host milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum HostTimer {
    Arm { at_ms: f64 },
    Clear,
}

/// Drop indicator position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PreviewView {
    pub day: DayId,
    pub index: usize,
}

impl From<Slot> for PreviewView {
    fn from(slot: Slot) -> Self {
        Self {
            day: slot.day,
            index: slot.index,
        }
    }
}

/// What the host should do after one event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostResponse {
    /// Short outcome label, e.g. `"drag_started"` or `"dropped"`.
    pub outcome: &'static str,
    pub prevent_default: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timer: Option<HostTimer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<PreviewView>,
    /// The schedule changed; re-render the day columns.
    pub schedule_changed: bool,
}

impl HostResponse {
    fn from_dispatch(dispatch: &GestureDispatch, clock: &HostClock, preview: Option<Slot>) -> Self {
        let outcome = match &dispatch.outcome {
            GestureOutcome::Nothing => "nothing",
            GestureOutcome::Armed => "armed",
            GestureOutcome::PressCancelled => "press_cancelled",
            GestureOutcome::PressReleased => "press_released",
            GestureOutcome::DragStarted => "drag_started",
            GestureOutcome::PreviewUpdated(_) => "preview_updated",
            GestureOutcome::Dropped(DropOutcome::Ignored(_)) => "drop_ignored",
            GestureOutcome::Dropped(_) => "dropped",
            GestureOutcome::Cancelled => "cancelled",
            GestureOutcome::Ignored(_) => "ignored",
        };
        let timer = dispatch.timer.map(|timer| match timer {
            TimerCommand::Arm { deadline } => HostTimer::Arm {
                at_ms: clock.host_ms(deadline),
            },
            TimerCommand::Clear => HostTimer::Clear,
        });
        Self {
            outcome,
            prevent_default: dispatch.prevent_default,
            timer,
            preview: preview.map(PreviewView::from),
            schedule_changed: dispatch
                .drop_outcome()
                .is_some_and(DropOutcome::is_committed),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// One browser-hosted schedule builder.
#[derive(Debug)]
pub struct WebSession {
    builder: ScheduleBuilder,
    pointer: PointerDragSource,
    touch: TouchDragSource,
    clock: HostClock,
}

impl WebSession {
    /// Start a session. `epoch` is the instant matching host time zero.
    #[must_use]
    pub fn new(library: ModuleLibrary, config: BuilderConfig, epoch: Instant) -> Self {
        Self {
            builder: ScheduleBuilder::new(library, config),
            pointer: PointerDragSource::new(),
            touch: TouchDragSource::new(config.press),
            clock: HostClock::new(epoch),
        }
    }

    #[must_use]
    pub fn builder(&self) -> &ScheduleBuilder {
        &self.builder
    }

    pub fn builder_mut(&mut self) -> &mut ScheduleBuilder {
        &mut self.builder
    }

    #[must_use]
    pub fn clock(&self) -> &HostClock {
        &self.clock
    }

    /// Parse and handle one JSON event. `Ok(None)` for kinds the session
    /// does not consume.
    pub fn handle_json(&mut self, json: &str) -> Result<Option<HostResponse>, InputParseError> {
        let Some(event) = parse_host_event(json, &self.clock)? else {
            trace!("host event kind not handled");
            return Ok(None);
        };
        Ok(Some(self.handle(event)))
    }

    /// Handle one parsed event.
    pub fn handle(&mut self, event: HostEvent) -> HostResponse {
        let dispatch = match event {
            HostEvent::Pointer(input) => self.pointer.handle(input, &mut self.builder),
            HostEvent::Touch(input) => self.touch.handle(input, &mut self.builder),
            HostEvent::Layout(layout) => {
                layout.apply(self.builder.measure_mut());
                GestureDispatch::nothing()
            }
            HostEvent::Unmount => self.teardown(),
        };
        HostResponse::from_dispatch(&dispatch, &self.clock, self.builder.drop_preview())
    }

    /// Tear down both gesture sources.
    pub fn teardown(&mut self) -> GestureDispatch {
        let pointer = self.pointer.teardown(&mut self.builder);
        let touch = self.touch.teardown(&mut self.builder);
        debug!("gesture sources torn down");
        if pointer.outcome == GestureOutcome::Cancelled {
            return pointer.with_timer(TimerCommand::Clear);
        }
        touch
    }

    /// The current week as JSON, for rendering or persistence.
    pub fn schedule_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self.builder.schedule())
    }
}
