#![forbid(unsafe_code)]

//! Edit sessions for templates and placed instances.
//!
//! An edit session holds a [`ModuleForm`] snapshot (raw strings, as typed)
//! and an [`EditingContext`] saying which collection the form writes back
//! to. Templates and instances are edited independently: saving a placement
//! never touches its template or any sibling placement, and saving a
//! template never touches existing placements.
//!
//! Saving is all-or-nothing. A form that fails validation leaves the
//! library and schedule exactly as they were and keeps the session open
//! with the error attached.

use std::fmt;

use tracing::debug;

use crate::error::{EditError, FormError};
use crate::grid::{DayId, DaySchedule};
use crate::library::ModuleLibrary;
use crate::module::{InstanceId, ModuleFields, ModuleTemplate, TemplateId, TrainingAttributes};

/// Which collection an edit writes back to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditingContext {
    Library {
        module_id: TemplateId,
    },
    Schedule {
        module_id: InstanceId,
        day: DayId,
        index: usize,
    },
}

/// Form inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Title,
    Description,
    Category,
    Subcategory,
    Distance,
    DurationMinutes,
    DurationSeconds,
    Weight,
}

impl FormField {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Category => "category",
            Self::Subcategory => "subcategory",
            Self::Distance => "distance",
            Self::DurationMinutes => "minutes",
            Self::DurationSeconds => "seconds",
            Self::Weight => "weight",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Editable snapshot of a module's fields.
///
/// Numeric fields are kept as text so a half-typed value survives until
/// save; an empty string means "not set".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModuleForm {
    pub title: String,
    pub description: String,
    pub category: String,
    pub subcategory: String,
    pub distance: String,
    pub duration_minutes: String,
    pub duration_seconds: String,
    pub weight: String,
}

impl ModuleForm {
    /// Snapshot `fields` for editing.
    #[must_use]
    pub fn from_fields(fields: &ModuleFields) -> Self {
        let number = |value: Option<f64>| value.map(|v| v.to_string()).unwrap_or_default();
        Self {
            title: fields.title.clone(),
            description: fields.description.clone(),
            category: fields.category.clone(),
            subcategory: fields.subcategory.clone().unwrap_or_default(),
            distance: number(fields.training.distance),
            duration_minutes: number(fields.training.duration_minutes),
            duration_seconds: number(fields.training.duration_seconds),
            weight: number(fields.training.weight),
        }
    }

    /// Mutable access to one text input.
    pub fn field_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Title => &mut self.title,
            FormField::Description => &mut self.description,
            FormField::Category => &mut self.category,
            FormField::Subcategory => &mut self.subcategory,
            FormField::Distance => &mut self.distance,
            FormField::DurationMinutes => &mut self.duration_minutes,
            FormField::DurationSeconds => &mut self.duration_seconds,
            FormField::Weight => &mut self.weight,
        }
    }

    /// Builder-style setter, mostly for tests and seeding.
    #[must_use]
    pub fn with(mut self, field: FormField, value: impl Into<String>) -> Self {
        *self.field_mut(field) = value.into();
        self
    }

    /// Validate and convert. Checks run in field order; the first failure
    /// is returned.
    pub fn validate(&self) -> Result<ModuleFields, FormError> {
        let title = required(FormField::Title, &self.title)?;
        let description = required(FormField::Description, &self.description)?;
        let category = required(FormField::Category, &self.category)?;
        let subcategory = Some(self.subcategory.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_owned);

        let distance = non_negative(FormField::Distance, &self.distance)?;
        let duration_minutes = non_negative(FormField::DurationMinutes, &self.duration_minutes)?;
        let duration_seconds = non_negative(FormField::DurationSeconds, &self.duration_seconds)?;
        if duration_seconds.is_some_and(|seconds| seconds >= 60.0) {
            return Err(FormError::SecondsOutOfRange);
        }
        let weight = non_negative(FormField::Weight, &self.weight)?;

        Ok(ModuleFields {
            title,
            description,
            category,
            subcategory,
            training: TrainingAttributes {
                distance,
                duration_minutes,
                duration_seconds,
                weight,
            },
        })
    }
}

fn required(field: FormField, value: &str) -> Result<String, FormError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FormError::Required(field));
    }
    Ok(trimmed.to_owned())
}

fn non_negative(field: FormField, value: &str) -> Result<Option<f64>, FormError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let parsed = trimmed
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| FormError::NotANumber {
            field,
            value: trimmed.to_owned(),
        })?;
    if parsed < 0.0 {
        return Err(FormError::Negative(field));
    }
    Ok(Some(parsed))
}

/// An open edit.
#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    pub context: EditingContext,
    pub form: ModuleForm,
    /// Message from the last failed save, if any.
    pub error: Option<FormError>,
}

/// A validated edit, ready to be written back.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedEdit {
    pub context: EditingContext,
    pub fields: ModuleFields,
}

impl PreparedEdit {
    /// The template this edit would store, for library-scoped edits.
    #[must_use]
    pub fn as_template(&self) -> Option<ModuleTemplate> {
        match &self.context {
            EditingContext::Library { module_id } => {
                Some(ModuleTemplate::new(module_id.clone(), self.fields.clone()))
            }
            EditingContext::Schedule { .. } => None,
        }
    }
}

/// Opens, validates and saves edit forms.
#[derive(Debug, Clone, Default)]
pub struct EditingCoordinator {
    session: Option<EditSession>,
}

impl EditingCoordinator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a form on `fields`, replacing any open session.
    pub fn start_editing(&mut self, fields: &ModuleFields, context: EditingContext) {
        debug!(?context, "edit session opened");
        self.session = Some(EditSession {
            context,
            form: ModuleForm::from_fields(fields),
            error: None,
        });
    }

    #[must_use]
    pub fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    #[must_use]
    pub fn context(&self) -> Option<&EditingContext> {
        self.session.as_ref().map(|session| &session.context)
    }

    pub fn form_mut(&mut self) -> Option<&mut ModuleForm> {
        self.session.as_mut().map(|session| &mut session.form)
    }

    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.session.is_some()
    }

    /// Validate the open form. On failure the error is recorded on the
    /// session, which stays open.
    pub fn prepare(&mut self) -> Result<PreparedEdit, EditError> {
        let session = self.session.as_mut().ok_or(EditError::NoSession)?;
        match session.form.validate() {
            Ok(fields) => {
                session.error = None;
                Ok(PreparedEdit {
                    context: session.context.clone(),
                    fields,
                })
            }
            Err(error) => {
                debug!(field = %error.field(), %error, "edit rejected");
                session.error = Some(error.clone());
                Err(error.into())
            }
        }
    }

    /// Write a prepared edit back and close the session.
    ///
    /// A schedule edit only lands if `(day, index)` still holds the instance
    /// the session was opened on; the instance keeps its id.
    pub fn commit(
        &mut self,
        edit: PreparedEdit,
        library: &mut ModuleLibrary,
        schedule: &mut DaySchedule,
    ) -> Result<EditingContext, EditError> {
        match &edit.context {
            EditingContext::Library { module_id } => {
                library
                    .replace(ModuleTemplate::new(module_id.clone(), edit.fields))
                    .map_err(|_| EditError::UnknownTemplate(module_id.clone()))?;
            }
            EditingContext::Schedule {
                module_id,
                day,
                index,
            } => {
                let instance = schedule
                    .get_mut(*day, *index)
                    .filter(|instance| &instance.id == module_id)
                    .ok_or(EditError::StaleTarget {
                        day: *day,
                        index: *index,
                    })?;
                instance.fields = edit.fields;
            }
        }
        debug!(context = ?edit.context, "edit saved");
        self.session = None;
        Ok(edit.context)
    }

    /// Validate and write back in one step.
    pub fn save(
        &mut self,
        library: &mut ModuleLibrary,
        schedule: &mut DaySchedule,
    ) -> Result<EditingContext, EditError> {
        let edit = self.prepare()?;
        self.commit(edit, library, schedule)
    }

    /// Close the session without writing.
    pub fn cancel(&mut self) -> bool {
        self.session.take().is_some()
    }

    /// Delete a template; closes the session if it was editing that template.
    pub fn remove_library_module(
        &mut self,
        library: &mut ModuleLibrary,
        id: &TemplateId,
    ) -> Option<ModuleTemplate> {
        let targets_removed = matches!(
            self.context(),
            Some(EditingContext::Library { module_id }) if module_id == id
        );
        if targets_removed {
            debug!(template = %id, "closing edit session for deleted template");
            self.session = None;
        }
        library.remove(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::InstanceFactory;

    fn fields() -> ModuleFields {
        ModuleFields::new("Threshold Run", "3x10min", "run")
    }

    fn valid_form() -> ModuleForm {
        ModuleForm::from_fields(&fields())
    }

    #[test]
    fn form_round_trips_numbers() {
        let f = fields().with_training(TrainingAttributes {
            distance: Some(12.5),
            duration_minutes: Some(45.0),
            duration_seconds: Some(30.0),
            weight: None,
        });
        let form = ModuleForm::from_fields(&f);
        assert_eq!(form.distance, "12.5");
        assert_eq!(form.weight, "");
        assert_eq!(form.validate(), Ok(f));
    }

    #[test]
    fn required_fields_are_trimmed_and_checked() {
        let form = valid_form().with(FormField::Description, "   ");
        assert_eq!(
            form.validate(),
            Err(FormError::Required(FormField::Description))
        );
        let padded = valid_form().with(FormField::Title, "  Tempo  ");
        assert_eq!(padded.validate().unwrap().title, "Tempo");
    }

    #[test]
    fn numeric_validation() {
        assert_eq!(
            valid_form().with(FormField::Distance, "ten").validate(),
            Err(FormError::NotANumber {
                field: FormField::Distance,
                value: "ten".into()
            })
        );
        assert_eq!(
            valid_form().with(FormField::Weight, "-2").validate(),
            Err(FormError::Negative(FormField::Weight))
        );
        assert!(matches!(
            valid_form().with(FormField::DurationMinutes, "inf").validate(),
            Err(FormError::NotANumber { .. })
        ));
        assert_eq!(
            valid_form().with(FormField::DurationSeconds, "60").validate(),
            Err(FormError::SecondsOutOfRange)
        );
        assert!(
            valid_form()
                .with(FormField::DurationSeconds, "59.5")
                .validate()
                .is_ok()
        );
        assert_eq!(
            valid_form()
                .with(FormField::Weight, "0")
                .validate()
                .unwrap()
                .training
                .weight,
            Some(0.0)
        );
    }

    #[test]
    fn blank_subcategory_is_none() {
        let form = valid_form().with(FormField::Subcategory, "  ");
        assert_eq!(form.validate().unwrap().subcategory, None);
    }

    #[test]
    fn failed_save_keeps_session_and_state() {
        let mut library =
            ModuleLibrary::from_templates([ModuleTemplate::new("T1", fields())]).unwrap();
        let mut schedule = DaySchedule::new();
        let library_before = library.clone();

        let mut ec = EditingCoordinator::new();
        ec.start_editing(
            &fields(),
            EditingContext::Library {
                module_id: TemplateId::new("T1"),
            },
        );
        let form = ec.form_mut().unwrap();
        form.title = "Renamed".into();
        form.duration_seconds = "75".into();

        let err = ec.save(&mut library, &mut schedule).unwrap_err();
        assert_eq!(err, EditError::Invalid(FormError::SecondsOutOfRange));
        assert_eq!(library, library_before);
        let session = ec.session().unwrap();
        assert_eq!(session.error, Some(FormError::SecondsOutOfRange));
        assert_eq!(session.form.title, "Renamed");
    }

    #[test]
    fn library_save_replaces_template_only() {
        let mut library =
            ModuleLibrary::from_templates([ModuleTemplate::new("T1", fields())]).unwrap();
        let mut schedule = DaySchedule::new();
        let mut factory = InstanceFactory::new();
        let placed = factory.instantiate(library.get(&TemplateId::new("T1")).unwrap());
        schedule.push(DayId::Mon, placed.clone());

        let mut ec = EditingCoordinator::new();
        ec.start_editing(
            &fields(),
            EditingContext::Library {
                module_id: TemplateId::new("T1"),
            },
        );
        ec.form_mut().unwrap().title = "Threshold Run v2".into();
        ec.save(&mut library, &mut schedule).unwrap();

        assert_eq!(
            library.get(&TemplateId::new("T1")).unwrap().fields.title,
            "Threshold Run v2"
        );
        assert_eq!(schedule.get(DayId::Mon, 0), Some(&placed));
        assert!(!ec.is_editing());
    }

    #[test]
    fn schedule_save_replaces_one_placement_and_keeps_id() {
        let template = ModuleTemplate::new("T1", fields());
        let mut library = ModuleLibrary::from_templates([template.clone()]).unwrap();
        let mut schedule = DaySchedule::new();
        let mut factory = InstanceFactory::new();
        schedule.push(DayId::Tue, factory.instantiate(&template));
        schedule.push(DayId::Tue, factory.instantiate(&template));
        let target = schedule.get(DayId::Tue, 1).unwrap().clone();

        let mut ec = EditingCoordinator::new();
        ec.start_editing(
            &target.fields,
            EditingContext::Schedule {
                module_id: target.id.clone(),
                day: DayId::Tue,
                index: 1,
            },
        );
        ec.form_mut().unwrap().title = "Short Threshold".into();
        ec.save(&mut library, &mut schedule).unwrap();

        let edited = schedule.get(DayId::Tue, 1).unwrap();
        assert_eq!(edited.id, target.id);
        assert_eq!(edited.fields.title, "Short Threshold");
        assert_eq!(schedule.get(DayId::Tue, 0).unwrap().fields.title, "Threshold Run");
        assert_eq!(library.get(&template.id), Some(&template));
    }

    #[test]
    fn schedule_save_against_moved_instance_is_stale() {
        let template = ModuleTemplate::new("T1", fields());
        let mut library = ModuleLibrary::from_templates([template.clone()]).unwrap();
        let mut schedule = DaySchedule::new();
        let mut factory = InstanceFactory::new();
        schedule.push(DayId::Tue, factory.instantiate(&template));
        let target = schedule.get(DayId::Tue, 0).unwrap().clone();

        let mut ec = EditingCoordinator::new();
        ec.start_editing(
            &target.fields,
            EditingContext::Schedule {
                module_id: target.id.clone(),
                day: DayId::Tue,
                index: 0,
            },
        );
        schedule.insert(DayId::Tue, 0, factory.instantiate(&template));
        let before = schedule.clone();

        assert_eq!(
            ec.save(&mut library, &mut schedule),
            Err(EditError::StaleTarget {
                day: DayId::Tue,
                index: 0
            })
        );
        assert_eq!(schedule, before);
    }

    #[test]
    fn removing_edited_template_closes_session() {
        let mut library = ModuleLibrary::from_templates([
            ModuleTemplate::new("T1", fields()),
            ModuleTemplate::new("T2", fields()),
        ])
        .unwrap();
        let mut ec = EditingCoordinator::new();
        ec.start_editing(
            &fields(),
            EditingContext::Library {
                module_id: TemplateId::new("T1"),
            },
        );

        ec.remove_library_module(&mut library, &TemplateId::new("T2"));
        assert!(ec.is_editing());

        ec.remove_library_module(&mut library, &TemplateId::new("T1"));
        assert_eq!(ec.context(), None);
        assert!(library.is_empty());
    }

    #[test]
    fn save_without_session() {
        let mut ec = EditingCoordinator::new();
        assert_eq!(
            ec.save(&mut ModuleLibrary::new(), &mut DaySchedule::new()),
            Err(EditError::NoSession)
        );
        assert!(!ec.cancel());
    }
}
