#![forbid(unsafe_code)]

//! Trainboard public facade crate.
//!
//! Re-exports the engine types a host needs and offers a prelude. With the
//! default `web` feature it also exposes [`open_session`], which builds a
//! [`WebSession`] from the JSON a host already has on hand.

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use trainboard_core::{PressConfig, PressPhase, PressTracker, PressVerdict, Point, Rect};

// --- Schedule re-exports ---------------------------------------------------

pub use trainboard_schedule::gesture::{
    DragSink, GestureDispatch, GestureOutcome, GestureSource, PointerDragSource, PointerInput,
    TimerCommand, TouchDragSource, TouchInput,
};
pub use trainboard_schedule::{
    AssignmentPayload, BuilderConfig, CardAddress, DayId, DaySchedule, DragController,
    DropOutcome, EditingContext, EditingCoordinator, InMemoryStore, InstanceFactory, InstanceId,
    LayoutCache, ModuleFields, ModuleForm, ModuleLibrary, ModuleTemplate, ScheduleBuilder,
    ScheduleInstance, ScheduleSink, Slot, TemplateId, TemplateStore,
};

// --- Web re-exports --------------------------------------------------------

#[cfg(feature = "web")]
pub use trainboard_web::{HostClock, HostEvent, HostResponse, HostTimer, WebSession};

// --- Errors ---------------------------------------------------------------

/// Top-level error for facade helpers.
#[derive(Debug)]
pub enum Error {
    /// Malformed library or config JSON.
    Json(serde_json::Error),
    /// Invalid configuration values.
    Config(trainboard_schedule::ConfigError),
    /// The initial library load was rejected.
    Library(trainboard_schedule::LibraryError),
    /// A builder operation failed.
    Schedule(trainboard_schedule::ScheduleError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid JSON: {err}"),
            Self::Config(err) => write!(f, "invalid config: {err}"),
            Self::Library(err) => write!(f, "{err}"),
            Self::Schedule(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::Config(err) => Some(err),
            Self::Library(err) => Some(err),
            Self::Schedule(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl From<trainboard_schedule::ConfigError> for Error {
    fn from(err: trainboard_schedule::ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<trainboard_schedule::LibraryError> for Error {
    fn from(err: trainboard_schedule::LibraryError) -> Self {
        Self::Library(err)
    }
}

impl From<trainboard_schedule::ScheduleError> for Error {
    fn from(err: trainboard_schedule::ScheduleError) -> Self {
        Self::Schedule(err)
    }
}

/// Standard result type for facade helpers.
pub type Result<T> = std::result::Result<T, Error>;

/// Parse a JSON array of templates into a library.
pub fn library_from_json(json: &str) -> Result<ModuleLibrary> {
    let templates: Vec<ModuleTemplate> = serde_json::from_str(json)?;
    Ok(ModuleLibrary::from_templates(templates)?)
}

/// Open a host session from library JSON and optional config JSON.
///
/// `epoch` is the instant matching host time zero.
#[cfg(feature = "web")]
pub fn open_session(
    library_json: &str,
    config_json: Option<&str>,
    epoch: web_time::Instant,
) -> Result<WebSession> {
    let library = library_from_json(library_json)?;
    let config = match config_json {
        Some(json) => BuilderConfig::from_json(json)?,
        None => BuilderConfig::default(),
    };
    Ok(WebSession::new(library, config, epoch))
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        BuilderConfig, DayId, DaySchedule, DropOutcome, Error, GestureOutcome, ModuleFields,
        ModuleLibrary, ModuleTemplate, Point, Rect, Result, ScheduleBuilder, ScheduleInstance,
        Slot,
    };

    #[cfg(feature = "web")]
    pub use crate::{HostResponse, WebSession, open_session};

    pub use crate::{core, schedule};
    #[cfg(feature = "web")]
    pub use crate::web;
}

pub use trainboard_core as core;
pub use trainboard_schedule as schedule;
#[cfg(feature = "web")]
pub use trainboard_web as web;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const LIBRARY: &str = r#"[
        {"id":"T1","title":"Threshold Run","description":"3x10min","category":"run"},
        {"id":"T2","title":"Squats","description":"5x5","category":"strength","weight":80}
    ]"#;

    #[test]
    fn library_loads_from_json() {
        let library = library_from_json(LIBRARY).unwrap();
        assert_eq!(library.len(), 2);
        let squats = library.get(&TemplateId::new("T2")).unwrap();
        assert_eq!(squats.fields.training.weight, Some(80.0));
    }

    #[test]
    fn duplicate_ids_are_a_library_error() {
        let json = r#"[
            {"id":"T1","title":"a","description":"","category":"run"},
            {"id":"T1","title":"b","description":"","category":"run"}
        ]"#;
        assert!(matches!(library_from_json(json), Err(Error::Library(_))));
    }

    #[cfg(feature = "web")]
    #[test]
    fn open_session_applies_config() {
        let session = open_session(
            LIBRARY,
            Some(r#"{"press":{"long_press":300,"move_tolerance":8.0}}"#),
            web_time::Instant::now(),
        )
        .unwrap();
        assert_eq!(session.builder().config().press.move_tolerance, 8.0);
        assert!(session.builder().schedule().is_empty());
    }

    #[cfg(feature = "web")]
    #[test]
    fn invalid_config_is_reported() {
        let err = open_session(
            LIBRARY,
            Some(r#"{"press":{"long_press":0,"move_tolerance":10.0}}"#),
            web_time::Instant::now(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)), "{err}");
    }
}
