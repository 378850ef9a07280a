#![forbid(unsafe_code)]

//! Collaborator seams: template CRUD and schedule assignment.
//!
//! The engine never talks to a backend directly. Library-scoped changes go
//! through a [`TemplateStore`]; a finished week goes out through a
//! [`ScheduleSink`] as an [`AssignmentPayload`]. Both are synchronous from the
//! engine's point of view: the host decides how to queue the real request.

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::grid::DaySchedule;
use crate::module::{ModuleTemplate, TemplateId};

/// Template create/update/delete.
pub trait TemplateStore {
    fn create(&mut self, template: &ModuleTemplate) -> Result<(), StoreError>;
    fn update(&mut self, template: &ModuleTemplate) -> Result<(), StoreError>;
    fn delete(&mut self, id: &TemplateId) -> Result<(), StoreError>;
}

/// Receives a finished schedule for one athlete and week.
pub trait ScheduleSink {
    fn assign(&mut self, payload: &AssignmentPayload) -> Result<(), StoreError>;
}

/// What gets sent when a coach assigns a week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentPayload {
    pub athlete_id: String,
    /// Week label as chosen by the host (e.g. `"2026-W42"`).
    pub week: String,
    pub schedule: DaySchedule,
}

impl AssignmentPayload {
    #[must_use]
    pub fn new(athlete_id: impl Into<String>, week: impl Into<String>, schedule: DaySchedule) -> Self {
        Self {
            athlete_id: athlete_id.into(),
            week: week.into(),
            schedule,
        }
    }

    /// Serialize to the JSON body a host would post.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Store that keeps everything in memory.
///
/// Useful for hosts without a backend and for tests. `fail_next` makes the
/// next call return [`StoreError::Unavailable`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    templates: Vec<ModuleTemplate>,
    assignments: Vec<AssignmentPayload>,
    fail_next: Option<String>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn templates(&self) -> &[ModuleTemplate] {
        &self.templates
    }

    #[must_use]
    pub fn assignments(&self) -> &[AssignmentPayload] {
        &self.assignments
    }

    /// Fail the next operation with `message`.
    pub fn fail_next(&mut self, message: impl Into<String>) {
        self.fail_next = Some(message.into());
    }

    fn check(&mut self) -> Result<(), StoreError> {
        match self.fail_next.take() {
            Some(message) => Err(StoreError::Unavailable(message)),
            None => Ok(()),
        }
    }

    fn position(&self, id: &TemplateId) -> Option<usize> {
        self.templates.iter().position(|template| &template.id == id)
    }
}

impl TemplateStore for InMemoryStore {
    fn create(&mut self, template: &ModuleTemplate) -> Result<(), StoreError> {
        self.check()?;
        if self.position(&template.id).is_some() {
            return Err(StoreError::Rejected {
                operation: "create",
                message: format!("template {} already exists", template.id),
            });
        }
        self.templates.push(template.clone());
        Ok(())
    }

    fn update(&mut self, template: &ModuleTemplate) -> Result<(), StoreError> {
        self.check()?;
        let Some(index) = self.position(&template.id) else {
            return Err(StoreError::Rejected {
                operation: "update",
                message: format!("template {} not found", template.id),
            });
        };
        self.templates[index] = template.clone();
        Ok(())
    }

    fn delete(&mut self, id: &TemplateId) -> Result<(), StoreError> {
        self.check()?;
        let Some(index) = self.position(id) else {
            return Err(StoreError::Rejected {
                operation: "delete",
                message: format!("template {id} not found"),
            });
        };
        self.templates.remove(index);
        Ok(())
    }
}

impl ScheduleSink for InMemoryStore {
    fn assign(&mut self, payload: &AssignmentPayload) -> Result<(), StoreError> {
        self.check()?;
        self.assignments.push(payload.clone());
        Ok(())
    }
}
