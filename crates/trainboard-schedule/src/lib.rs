#![forbid(unsafe_code)]

//! Schedule-builder engine: templates, the weekly grid, and drag-and-drop.
//!
//! # Role in trainboard
//! `trainboard-schedule` holds every rule about what a coach's week looks
//! like and how it changes. Rendering and event delivery live in the host;
//! this crate only receives gestures and measurements and mutates state.
//!
//! # Primary responsibilities
//! - **Data model**: [`ModuleTemplate`] (library) vs [`ScheduleInstance`]
//!   (placed copy with its own [`InstanceId`]), and the seven-day
//!   [`DaySchedule`].
//! - **Drag and drop**: [`DragController`] owns the active drag and drop
//!   preview and performs the commit; [`drop_preview::insertion_index`]
//!   turns geometry into an insertion index.
//! - **Gestures**: [`gesture::PointerDragSource`] and
//!   [`gesture::TouchDragSource`] map the two host input vocabularies onto
//!   one [`gesture::DragSink`].
//! - **Editing**: [`EditingCoordinator`] edits a template or one placement,
//!   never both.
//! - **Session**: [`ScheduleBuilder`] composes all of the above.
//!
//! # How it fits in the system
//! `trainboard-web` parses host events into this crate's gesture inputs and
//! owns a [`ScheduleBuilder`]. Geometry types come from `trainboard-core`.

pub mod builder;
pub mod config;
pub mod drag;
pub mod drop_preview;
pub mod editing;
pub mod error;
pub mod factory;
pub mod gesture;
pub mod grid;
pub mod library;
pub mod measure;
pub mod module;
pub mod persistence;

pub use builder::ScheduleBuilder;
pub use config::BuilderConfig;
pub use drag::{
    ActiveDrag, DragController, DropIgnoredReason, DropOutcome, DropPreviewLocation,
};
pub use editing::{EditSession, EditingContext, EditingCoordinator, FormField, ModuleForm};
pub use error::{
    ConfigError, EditError, FormError, LibraryError, Result, ScheduleError, StoreError,
};
pub use factory::InstanceFactory;
pub use grid::{DayId, DaySchedule, Slot};
pub use library::ModuleLibrary;
pub use measure::{CardAddress, LayoutCache, MeasurementProvider};
pub use module::{
    InstanceId, ModuleFields, ModuleTemplate, ScheduleInstance, TemplateId, TrainingAttributes,
};
pub use persistence::{AssignmentPayload, InMemoryStore, ScheduleSink, TemplateStore};
