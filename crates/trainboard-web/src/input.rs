#![forbid(unsafe_code)]

//! JSON host-event parser.
//!
//! The browser host serializes each DOM event it cares about into one JSON
//! object and hands it to [`parse_host_event`]. Examples:
//!
//! ```json
//! {"kind":"pointer","phase":"dragstart","card":{"library":"T1"},"x":810,"y":12}
//! {"kind":"pointer","phase":"dragover","day":"tue","x":150,"y":64}
//! {"kind":"pointer","phase":"drop","day":"tue","zone":"tail"}
//! {"kind":"touch","phase":"start","card":{"day":"mon","index":2},"x":40,"y":110,"t":1200.5}
//! {"kind":"touch","phase":"timer","t":1700.5}
//! {"kind":"layout","days":{"mon":{"column":[0,0,100,600],"cards":[[0,0,100,40]]}},"library":{"T1":[800,0,100,40]}}
//! {"kind":"unmount"}
//! ```
//!
//! Rects are `[x, y, width, height]` in CSS pixels. Touch timestamps `t` are
//! host milliseconds (`performance.now()`), converted through a
//! [`HostClock`].
//!
//! Unknown `kind`s return `Ok(None)` so hosts can send events this crate does
//! not consume yet (keyboard, focus) through the same channel.

use std::collections::BTreeMap;

use serde::Deserialize;
use trainboard_core::{Point, Rect};
use trainboard_schedule::gesture::{DropZone, PointerInput, TouchInput};
use trainboard_schedule::{CardAddress, DayId, LayoutCache, TemplateId};
use web_time::{Duration, Instant};

/// Errors from parsing host event JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputParseError {
    /// Malformed JSON.
    Json(String),
    /// Missing required field.
    MissingField(&'static str),
    /// Unknown phase for a known kind.
    UnknownPhase(String),
    /// Day key that is not one of the seven days.
    UnknownDay(String),
    /// Drop zone other than `column` or `tail`.
    UnknownZone(String),
}

impl core::fmt::Display for InputParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Json(msg) => write!(f, "JSON parse error: {msg}"),
            Self::MissingField(field) => write!(f, "missing required field: {field}"),
            Self::UnknownPhase(phase) => write!(f, "unknown phase: {phase}"),
            Self::UnknownDay(day) => write!(f, "unknown day: {day}"),
            Self::UnknownZone(zone) => write!(f, "unknown drop zone: {zone}"),
        }
    }
}

impl std::error::Error for InputParseError {}

/// Maps host millisecond timestamps onto [`Instant`]s and back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostClock {
    epoch: Instant,
}

impl HostClock {
    /// Host time `0.0` corresponds to `epoch`.
    #[must_use]
    pub fn new(epoch: Instant) -> Self {
        Self { epoch }
    }

    /// Instant for host time `ms`, at nanosecond resolution. Negative,
    /// non-finite or unrepresentable values clamp to the epoch.
    #[must_use]
    pub fn instant(&self, ms: f64) -> Instant {
        let nanos = (ms * 1_000_000.0).round();
        if !(0.0..u64::MAX as f64).contains(&nanos) {
            return self.epoch;
        }
        self.epoch
            .checked_add(Duration::from_nanos(nanos as u64))
            .unwrap_or(self.epoch)
    }

    /// Host milliseconds for `instant`.
    #[must_use]
    pub fn host_ms(&self, instant: Instant) -> f64 {
        instant.saturating_duration_since(self.epoch).as_nanos() as f64 / 1_000_000.0
    }
}

/// A parsed host event.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    Pointer(PointerInput),
    Touch(TouchInput),
    Layout(LayoutSnapshot),
    /// The schedule view is going away; tear down gesture state.
    Unmount,
}

/// One frame's worth of measurements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutSnapshot {
    pub columns: Vec<(DayId, Rect)>,
    pub day_cards: Vec<(DayId, Vec<Rect>)>,
    pub library: Vec<(TemplateId, Rect)>,
}

impl LayoutSnapshot {
    /// Replace the contents of `cache` with this snapshot.
    pub fn apply(self, cache: &mut LayoutCache) {
        cache.clear();
        for (day, rect) in self.columns {
            cache.set_day_column(day, rect);
        }
        for (day, cards) in self.day_cards {
            cache.set_day_cards(day, cards);
        }
        for (id, rect) in self.library {
            cache.set_library_card(id, rect);
        }
    }
}

type RawRect = [f32; 4];

fn rect(raw: RawRect) -> Rect {
    Rect::new(raw[0], raw[1], raw[2], raw[3])
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawCard {
    Library { library: String },
    Schedule { day: String, index: usize },
}

#[derive(Debug, Default, Deserialize)]
struct RawDayLayout {
    #[serde(default)]
    column: Option<RawRect>,
    #[serde(default)]
    cards: Vec<RawRect>,
}

/// Internal deserialization target for every event kind.
#[derive(Debug, Deserialize)]
struct RawEvent {
    kind: String,
    #[serde(default)]
    phase: Option<String>,
    #[serde(default)]
    card: Option<RawCard>,
    #[serde(default)]
    day: Option<String>,
    #[serde(default)]
    index: Option<usize>,
    #[serde(default)]
    zone: Option<String>,
    #[serde(default)]
    x: Option<f32>,
    #[serde(default)]
    y: Option<f32>,
    #[serde(default)]
    t: Option<f64>,
    #[serde(default)]
    days: BTreeMap<String, RawDayLayout>,
    #[serde(default)]
    library: BTreeMap<String, RawRect>,
}

/// Parse one JSON-encoded host event.
///
/// Returns `Ok(None)` for kinds with no mapping. Returns `Err` for malformed
/// JSON, missing fields, or unknown phases/days/zones.
pub fn parse_host_event(json: &str, clock: &HostClock) -> Result<Option<HostEvent>, InputParseError> {
    let raw: RawEvent =
        serde_json::from_str(json).map_err(|e| InputParseError::Json(e.to_string()))?;

    match raw.kind.as_str() {
        "pointer" => parse_pointer(&raw).map(|input| Some(HostEvent::Pointer(input))),
        "touch" => parse_touch(&raw, clock).map(|input| Some(HostEvent::Touch(input))),
        "layout" => parse_layout(&raw).map(|layout| Some(HostEvent::Layout(layout))),
        "unmount" => Ok(Some(HostEvent::Unmount)),
        _ => Ok(None),
    }
}

fn phase(raw: &RawEvent) -> Result<&str, InputParseError> {
    raw.phase
        .as_deref()
        .ok_or(InputParseError::MissingField("phase"))
}

fn parse_day(key: &str) -> Result<DayId, InputParseError> {
    key.parse::<DayId>()
        .map_err(|_| InputParseError::UnknownDay(key.to_owned()))
}

fn day(raw: &RawEvent) -> Result<DayId, InputParseError> {
    parse_day(raw.day.as_deref().ok_or(InputParseError::MissingField("day"))?)
}

fn point(raw: &RawEvent) -> Result<Point, InputParseError> {
    let x = raw.x.ok_or(InputParseError::MissingField("x"))?;
    let y = raw.y.ok_or(InputParseError::MissingField("y"))?;
    Ok(Point::new(x, y))
}

fn card(raw: &RawEvent) -> Result<CardAddress, InputParseError> {
    match raw.card.as_ref().ok_or(InputParseError::MissingField("card"))? {
        RawCard::Library { library } => Ok(CardAddress::Library(TemplateId::new(library.as_str()))),
        RawCard::Schedule { day, index } => Ok(CardAddress::Schedule {
            day: parse_day(day)?,
            index: *index,
        }),
    }
}

fn at(raw: &RawEvent, clock: &HostClock) -> Result<Instant, InputParseError> {
    raw.t
        .map(|ms| clock.instant(ms))
        .ok_or(InputParseError::MissingField("t"))
}

fn parse_pointer(raw: &RawEvent) -> Result<PointerInput, InputParseError> {
    match phase(raw)? {
        "dragstart" => Ok(PointerInput::DragStart {
            card: card(raw)?,
            point: point(raw)?,
        }),
        "dragover" => Ok(PointerInput::DragOver {
            day: day(raw)?,
            point: point(raw)?,
        }),
        "dragenter" => Ok(PointerInput::DragEnterSlot {
            day: day(raw)?,
            index: raw.index.ok_or(InputParseError::MissingField("index"))?,
        }),
        "drop" => {
            let zone = match raw.zone.as_deref() {
                None | Some("column") => DropZone::Column,
                Some("tail") => DropZone::Tail,
                Some(other) => return Err(InputParseError::UnknownZone(other.to_owned())),
            };
            Ok(PointerInput::Drop {
                day: day(raw)?,
                zone,
            })
        }
        "dragend" => Ok(PointerInput::DragEnd),
        other => Err(InputParseError::UnknownPhase(other.to_owned())),
    }
}

fn parse_touch(raw: &RawEvent, clock: &HostClock) -> Result<TouchInput, InputParseError> {
    match phase(raw)? {
        "start" => Ok(TouchInput::Start {
            card: card(raw)?,
            point: point(raw)?,
            at: at(raw, clock)?,
        }),
        "move" => Ok(TouchInput::Move {
            point: point(raw)?,
            at: at(raw, clock)?,
        }),
        "end" => Ok(TouchInput::End {
            at: at(raw, clock)?,
        }),
        "cancel" => Ok(TouchInput::Cancel),
        "timer" => Ok(TouchInput::TimerFired {
            at: at(raw, clock)?,
        }),
        other => Err(InputParseError::UnknownPhase(other.to_owned())),
    }
}

fn parse_layout(raw: &RawEvent) -> Result<LayoutSnapshot, InputParseError> {
    let mut layout = LayoutSnapshot::default();
    for (key, day_layout) in &raw.days {
        let day = parse_day(key)?;
        if let Some(column) = day_layout.column {
            layout.columns.push((day, rect(column)));
        }
        layout
            .day_cards
            .push((day, day_layout.cards.iter().copied().map(rect).collect()));
    }
    layout.library = raw
        .library
        .iter()
        .map(|(id, raw_rect)| (TemplateId::new(id.as_str()), rect(*raw_rect)))
        .collect();
    Ok(layout)
}
