#![forbid(unsafe_code)]

//! Error types.
//!
//! Gesture handling never produces these: a drag that cannot complete is
//! reported as an ignored outcome, not an error. Errors here come from forms,
//! library bookkeeping, collaborators, and configuration.

use thiserror::Error;

use crate::editing::FormField;
use crate::grid::DayId;
use crate::module::{InstanceId, TemplateId};

pub type Result<T> = std::result::Result<T, ScheduleError>;

/// Library bookkeeping failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LibraryError {
    #[error("template {0} already exists")]
    Duplicate(TemplateId),

    #[error("unknown template: {0}")]
    Unknown(TemplateId),

    #[error("invalid template id {0:?}: ids must be non-blank and must not contain '#'")]
    InvalidId(TemplateId),
}

/// A field-level validation failure. `Display` is the message shown next to
/// the form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("{0} is required")]
    Required(FormField),

    #[error("{field} must be a number, got {value:?}")]
    NotANumber { field: FormField, value: String },

    #[error("{0} cannot be negative")]
    Negative(FormField),

    #[error("seconds must be less than 60")]
    SecondsOutOfRange,
}

impl FormError {
    /// The field the message belongs to.
    #[must_use]
    pub fn field(&self) -> FormField {
        match self {
            Self::Required(field) | Self::Negative(field) => *field,
            Self::NotANumber { field, .. } => *field,
            Self::SecondsOutOfRange => FormField::DurationSeconds,
        }
    }
}

/// Edit-session failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("no edit session is open")]
    NoSession,

    #[error(transparent)]
    Invalid(#[from] FormError),

    #[error("template {0} no longer exists")]
    UnknownTemplate(TemplateId),

    #[error("the module at {day}[{index}] changed since editing started")]
    StaleTarget { day: DayId, index: usize },
}

/// Failures reported by external collaborators (template store, schedule
/// sink).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{operation} rejected: {message}")]
    Rejected {
        operation: &'static str,
        message: String,
    },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Configuration failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Press(#[from] trainboard_core::press::PressConfigError),
}

/// Umbrella error for [`crate::builder::ScheduleBuilder`] operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error(transparent)]
    Library(#[from] LibraryError),

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("a drag is in progress")]
    DragInProgress,

    #[error("instance {0} appears more than once in the loaded schedule")]
    DuplicateInstance(InstanceId),
}

impl From<FormError> for ScheduleError {
    fn from(error: FormError) -> Self {
        Self::Edit(EditError::Invalid(error))
    }
}
