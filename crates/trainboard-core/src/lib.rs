#![forbid(unsafe_code)]

//! Core: geometry and touch press detection for the schedule builder.
//!
//! # Role in trainboard
//! `trainboard-core` is the input-geometry layer. It knows nothing about
//! modules, days, or schedules; it only answers "where is this card" and
//! "has this finger been held long enough to count as a drag".
//!
//! # Primary responsibilities
//! - **Geometry**: [`geometry::Point`] and [`geometry::Rect`] in CSS pixels.
//! - **Press detection**: [`press::PressTracker`], the long-press state
//!   machine that separates a drag-start from a tap or a scroll.
//!
//! # How it fits in the system
//! `trainboard-schedule` feeds host coordinates through these types and turns
//! the press tracker's verdicts into drag controller calls.

pub mod geometry;
pub mod press;

pub use geometry::{Point, Rect};
pub use press::{PressConfig, PressPhase, PressTracker, PressVerdict};
