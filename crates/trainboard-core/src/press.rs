#![forbid(unsafe_code)]

//! Long-press detection for touch input.
//!
//! Touch screens have no native drag gesture that coexists with scrolling, so
//! a drag only starts after the finger has been held roughly still for a
//! while. [`PressTracker`] decides, for one finger on one card, whether the
//! gesture is a drag-start, a scroll, or a tap.
//!
//! # State Machine
//!
//! ```text
//!   Idle ──press──▶ Pending ──deadline reached──▶ Engaged
//!                     │                              │
//!                     └─moved > tolerance─▶ Idle     └─release/reset─▶ Idle
//! ```
//!
//! # Invariants
//!
//! 1. [`PressVerdict::Engaged`] is returned at most once per press.
//! 2. A press that moved beyond the tolerance before its deadline never
//!    engages.
//! 3. After [`PressTracker::release`] or [`PressTracker::reset`] the tracker is
//!    `Idle` and holds no position or deadline.
//!
//! The tracker owns no clock. Callers pass `now` into every call; the host is
//! expected to arm a real timer for the returned deadline and call
//! [`PressTracker::poll`] when it fires.

use web_time::{Duration, Instant};

use crate::geometry::Point;

/// Default hold time before a press turns into a drag.
pub const DEFAULT_LONG_PRESS: Duration = Duration::from_millis(500);

/// Default vertical movement (px) that turns a pending press into a scroll.
pub const DEFAULT_MOVE_TOLERANCE: f32 = 10.0;

/// Thresholds for long-press detection.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PressConfig {
    /// Hold duration before a stationary press engages (default: 500ms).
    #[cfg_attr(feature = "serde", serde(with = "millis"))]
    pub long_press: Duration,
    /// Vertical travel in pixels that cancels a pending press (default: 10).
    pub move_tolerance: f32,
}

impl Default for PressConfig {
    fn default() -> Self {
        Self {
            long_press: DEFAULT_LONG_PRESS,
            move_tolerance: DEFAULT_MOVE_TOLERANCE,
        }
    }
}

impl PressConfig {
    /// Set the hold duration.
    #[must_use]
    pub fn with_long_press(mut self, long_press: Duration) -> Self {
        self.long_press = long_press;
        self
    }

    /// Set the movement tolerance.
    #[must_use]
    pub fn with_move_tolerance(mut self, px: f32) -> Self {
        self.move_tolerance = px;
        self
    }

    /// Check the thresholds are usable.
    pub fn validate(&self) -> Result<(), PressConfigError> {
        if self.long_press.is_zero() {
            return Err(PressConfigError::ZeroLongPress);
        }
        if !self.move_tolerance.is_finite() || self.move_tolerance < 0.0 {
            return Err(PressConfigError::InvalidTolerance(self.move_tolerance));
        }
        Ok(())
    }
}

/// Rejected [`PressConfig`] values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PressConfigError {
    /// A zero hold time would turn every tap into a drag.
    ZeroLongPress,
    /// Tolerance must be a finite, non-negative pixel count.
    InvalidTolerance(f32),
}

impl core::fmt::Display for PressConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ZeroLongPress => write!(f, "long-press duration must be greater than zero"),
            Self::InvalidTolerance(px) => {
                write!(f, "move tolerance must be finite and non-negative, got {px}")
            }
        }
    }
}

impl std::error::Error for PressConfigError {}

/// Observable phase of a [`PressTracker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PressPhase {
    /// No finger down.
    #[default]
    Idle,
    /// Finger down, waiting for the deadline.
    Pending,
    /// Deadline reached without excess movement; the gesture is a drag.
    Engaged,
}

/// What a tracker call decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressVerdict {
    /// Nothing changed.
    None,
    /// A press started; the host should fire a timer at `deadline`.
    Armed { deadline: Instant },
    /// The pending press moved too far and was dropped. Any armed timer can
    /// be cleared.
    Cancelled,
    /// The press turned into a drag. Emitted once per press.
    Engaged,
    /// The call did not apply to the current phase.
    Ignored,
}

#[derive(Debug, Clone, Copy)]
struct ActivePress {
    origin: Point,
    deadline: Instant,
    engaged: bool,
}

/// Long-press state machine for one touch gesture.
#[derive(Debug, Clone, Default)]
pub struct PressTracker {
    config: PressConfig,
    active: Option<ActivePress>,
}

impl PressTracker {
    /// Create a tracker with the given thresholds.
    #[must_use]
    pub fn new(config: PressConfig) -> Self {
        Self {
            config,
            active: None,
        }
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> PressPhase {
        match self.active {
            None => PressPhase::Idle,
            Some(press) if press.engaged => PressPhase::Engaged,
            Some(_) => PressPhase::Pending,
        }
    }

    /// Where the press started, while one is in progress.
    #[must_use]
    pub fn origin(&self) -> Option<Point> {
        self.active.map(|press| press.origin)
    }

    /// Deadline of the pending press, if it has not engaged yet.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.active
            .filter(|press| !press.engaged)
            .map(|press| press.deadline)
    }

    /// Finger down at `at`.
    ///
    /// A press while another is in progress is ignored; the first finger owns
    /// the gesture.
    pub fn press(&mut self, at: Point, now: Instant) -> PressVerdict {
        if self.active.is_some() {
            return PressVerdict::Ignored;
        }
        let deadline = now + self.config.long_press;
        self.active = Some(ActivePress {
            origin: at,
            deadline,
            engaged: false,
        });
        PressVerdict::Armed { deadline }
    }

    /// Finger moved to `to`.
    ///
    /// A pending press whose deadline has already passed engages first: the
    /// host timer may simply not have been delivered before this move.
    pub fn moved(&mut self, to: Point, now: Instant) -> PressVerdict {
        let Some(press) = self.active else {
            return PressVerdict::Ignored;
        };
        if press.engaged {
            return PressVerdict::None;
        }
        if now >= press.deadline {
            return self.engage();
        }
        if press.origin.vertical_distance(to) > self.config.move_tolerance {
            self.active = None;
            #[cfg(feature = "tracing")]
            tracing::trace!(
                travel = press.origin.vertical_distance(to),
                "pending press cancelled by movement"
            );
            return PressVerdict::Cancelled;
        }
        PressVerdict::None
    }

    /// Check the deadline. Call when the host timer fires.
    pub fn poll(&mut self, now: Instant) -> PressVerdict {
        match self.active {
            None => PressVerdict::Ignored,
            Some(press) if press.engaged => PressVerdict::None,
            Some(press) if now >= press.deadline => self.engage(),
            Some(_) => PressVerdict::None,
        }
    }

    /// Finger lifted or gesture cancelled. Returns the phase it ended in.
    pub fn release(&mut self) -> PressPhase {
        let phase = self.phase();
        self.active = None;
        phase
    }

    /// Drop all state unconditionally.
    pub fn reset(&mut self) {
        self.active = None;
    }

    /// Current configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &PressConfig {
        &self.config
    }

    /// Replace the configuration. Takes effect from the next press.
    pub fn set_config(&mut self, config: PressConfig) {
        self.config = config;
    }

    fn engage(&mut self) -> PressVerdict {
        if let Some(press) = self.active.as_mut() {
            press.engaged = true;
            #[cfg(feature = "tracing")]
            tracing::trace!(y = press.origin.y, "long press engaged");
            return PressVerdict::Engaged;
        }
        PressVerdict::Ignored
    }
}

#[cfg(feature = "serde")]
mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use web_time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
