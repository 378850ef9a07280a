#![forbid(unsafe_code)]

//! The schedule-builder session.
//!
//! [`ScheduleBuilder`] owns one coach's working state: the template library,
//! the week being built, the instance factory, the drag controller, the edit
//! session, and the last measured layout. It implements [`DragSink`], so the
//! pointer and touch sources both drive it directly.
//!
//! Library-scoped changes are written through a [`TemplateStore`] first and
//! applied locally only if the store accepts them.

use tracing::{debug, info, warn};
use trainboard_core::{Point, Rect};

use crate::config::BuilderConfig;
use crate::drag::{ActiveDrag, DragController, DropOutcome, DropPreviewLocation};
use crate::editing::{EditSession, EditingContext, EditingCoordinator, ModuleForm};
use crate::error::{LibraryError, Result, ScheduleError};
use crate::factory::InstanceFactory;
use crate::gesture::DragSink;
use crate::grid::{DayId, DaySchedule, Slot};
use crate::library::ModuleLibrary;
use crate::measure::{CardAddress, LayoutCache, MeasurementProvider};
use crate::module::{ModuleTemplate, ScheduleInstance, TemplateId};
use crate::persistence::{AssignmentPayload, ScheduleSink, TemplateStore};

/// One schedule-building session.
#[derive(Debug, Clone)]
pub struct ScheduleBuilder<M: MeasurementProvider = LayoutCache> {
    library: ModuleLibrary,
    schedule: DaySchedule,
    factory: InstanceFactory,
    drag: DragController,
    editing: EditingCoordinator,
    measure: M,
    config: BuilderConfig,
}

impl<M: MeasurementProvider + Default> ScheduleBuilder<M> {
    /// Empty week over `library`.
    #[must_use]
    pub fn new(library: ModuleLibrary, config: BuilderConfig) -> Self {
        Self::with_measure(library, M::default(), config)
    }
}

impl<M: MeasurementProvider> ScheduleBuilder<M> {
    #[must_use]
    pub fn with_measure(library: ModuleLibrary, measure: M, config: BuilderConfig) -> Self {
        Self {
            library,
            schedule: DaySchedule::new(),
            factory: InstanceFactory::new(),
            drag: DragController::new(),
            editing: EditingCoordinator::new(),
            measure,
            config,
        }
    }

    /// Replace the week with a previously saved one.
    ///
    /// Rejects a week that holds the same instance id twice. Instance
    /// numbering continues past the highest sequence in the loaded week.
    pub fn load_schedule(&mut self, schedule: DaySchedule) -> Result<()> {
        if self.drag.is_dragging() {
            return Err(ScheduleError::DragInProgress);
        }
        if let Some(id) = schedule.first_duplicate() {
            warn!(instance = %id, "loaded schedule repeats an instance id");
            return Err(ScheduleError::DuplicateInstance(id.clone()));
        }
        self.factory.resume_after(&schedule);
        info!(
            modules = schedule.total(),
            next_seq = self.factory.peek_next(),
            "schedule loaded"
        );
        self.schedule = schedule;
        self.editing.cancel();
        Ok(())
    }

    #[must_use]
    pub fn library(&self) -> &ModuleLibrary {
        &self.library
    }

    #[must_use]
    pub fn schedule(&self) -> &DaySchedule {
        &self.schedule
    }

    #[must_use]
    pub fn factory(&self) -> &InstanceFactory {
        &self.factory
    }

    #[must_use]
    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    #[must_use]
    pub fn active_drag(&self) -> Option<&ActiveDrag> {
        self.drag.active_drag()
    }

    #[must_use]
    pub fn editing(&self) -> Option<&EditSession> {
        self.editing.session()
    }

    #[must_use]
    pub fn measure(&self) -> &M {
        &self.measure
    }

    /// Renderer access for writing fresh measurements.
    pub fn measure_mut(&mut self) -> &mut M {
        &mut self.measure
    }

    /// Library templates matching `query`.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&ModuleTemplate> {
        self.library.search(query)
    }

    /// Open the edit form for a card (double-click / double-tap). Returns
    /// `false` when the card does not exist.
    pub fn open_editor(&mut self, card: &CardAddress) -> bool {
        match card {
            CardAddress::Library(id) => {
                let Some(template) = self.library.get(id) else {
                    return false;
                };
                self.editing.start_editing(
                    &template.fields,
                    EditingContext::Library {
                        module_id: id.clone(),
                    },
                );
            }
            CardAddress::Schedule { day, index } => {
                let Some(instance) = self.schedule.get(*day, *index) else {
                    return false;
                };
                self.editing.start_editing(
                    &instance.fields,
                    EditingContext::Schedule {
                        module_id: instance.id.clone(),
                        day: *day,
                        index: *index,
                    },
                );
            }
        }
        true
    }

    /// The open form, for the renderer to write typed input into.
    pub fn form_mut(&mut self) -> Option<&mut ModuleForm> {
        self.editing.form_mut()
    }

    /// Save the open form. Template edits go through `store` first.
    pub fn save_edit(&mut self, store: &mut dyn TemplateStore) -> Result<EditingContext> {
        let edit = self.editing.prepare()?;
        if let Some(template) = edit.as_template() {
            if !self.library.contains(&template.id) {
                return Err(LibraryError::Unknown(template.id).into());
            }
            store.update(&template).inspect_err(|error| {
                warn!(template = %template.id, %error, "template update failed");
            })?;
        }
        Ok(self
            .editing
            .commit(edit, &mut self.library, &mut self.schedule)?)
    }

    pub fn cancel_edit(&mut self) -> bool {
        self.editing.cancel()
    }

    /// Validate `form` and add it to the library as `id`.
    pub fn create_template(
        &mut self,
        id: impl Into<TemplateId>,
        form: &ModuleForm,
        store: &mut dyn TemplateStore,
    ) -> Result<TemplateId> {
        let id = id.into();
        let fields = form.validate()?;
        if !id.is_well_formed() {
            return Err(LibraryError::InvalidId(id).into());
        }
        if self.library.contains(&id) {
            return Err(LibraryError::Duplicate(id).into());
        }
        let template = ModuleTemplate::new(id.clone(), fields);
        store.create(&template).inspect_err(|error| {
            warn!(template = %id, %error, "template create failed");
        })?;
        self.library.insert(template)?;
        debug!(template = %id, "template created");
        Ok(id)
    }

    /// Delete a template. Placed instances are independent copies and stay.
    pub fn delete_template(
        &mut self,
        id: &TemplateId,
        store: &mut dyn TemplateStore,
    ) -> Result<ModuleTemplate> {
        if !self.library.contains(id) {
            return Err(LibraryError::Unknown(id.clone()).into());
        }
        store.delete(id).inspect_err(|error| {
            warn!(template = %id, %error, "template delete failed");
        })?;
        self.editing
            .remove_library_module(&mut self.library, id)
            .ok_or_else(|| LibraryError::Unknown(id.clone()).into())
    }

    /// Remove one placed instance. Closes an edit session open on it.
    pub fn remove_instance(&mut self, day: DayId, index: usize) -> Result<Option<ScheduleInstance>> {
        if self.drag.is_dragging() {
            return Err(ScheduleError::DragInProgress);
        }
        let removed = self.schedule.remove(day, index);
        if let Some(instance) = &removed {
            let editing_it = matches!(
                self.editing.context(),
                Some(EditingContext::Schedule { module_id, .. }) if module_id == &instance.id
            );
            if editing_it {
                self.editing.cancel();
            }
            debug!(%day, index, instance = %instance.id, "instance removed");
        }
        Ok(removed)
    }

    /// Send the week to `sink` for `athlete_id`.
    pub fn assign(
        &self,
        sink: &mut dyn ScheduleSink,
        athlete_id: &str,
        week: &str,
    ) -> Result<AssignmentPayload> {
        if self.drag.is_dragging() {
            return Err(ScheduleError::DragInProgress);
        }
        let payload = AssignmentPayload::new(athlete_id, week, self.schedule.clone());
        sink.assign(&payload).inspect_err(|error| {
            warn!(athlete = athlete_id, week, %error, "assignment failed");
        })?;
        info!(
            athlete = athlete_id,
            week,
            modules = self.schedule.total(),
            "schedule assigned"
        );
        Ok(payload)
    }

    fn resolve(&self, card: &CardAddress) -> Option<ActiveDrag> {
        match card {
            CardAddress::Library(id) => self.library.get(id).map(|module| ActiveDrag::Library {
                module: module.clone(),
            }),
            CardAddress::Schedule { day, index } => {
                self.schedule
                    .get(*day, *index)
                    .map(|module| ActiveDrag::Schedule {
                        day: *day,
                        index: *index,
                        module: module.clone(),
                    })
            }
        }
    }
}

impl<M: MeasurementProvider> DragSink for ScheduleBuilder<M> {
    fn begin_drag(&mut self, card: &CardAddress, point: Point) -> bool {
        if self.drag.is_dragging() {
            return false;
        }
        let Some(drag) = self.resolve(card) else {
            debug!(?card, "drag source not found");
            return false;
        };
        let rect = self.measure.card_rect(card).unwrap_or_else(|| {
            debug!(?card, "card not measured; using zero grab offset");
            Rect::new(point.x, point.y, 0.0, 0.0)
        });
        self.drag.begin_drag(drag, point.y, rect)
    }

    fn drag_over(&mut self, day: DayId, point: Point) -> Option<Slot> {
        let drag_top = self.drag.project_drag_top(point.y)?;
        self.drag
            .update_drop_preview(day, drag_top, self.measure.day_cards(day))
    }

    fn enter_slot(&mut self, day: DayId, index: usize) -> Option<Slot> {
        let index = index.min(self.schedule.len(day));
        self.drag.enter_slot(day, index)
    }

    fn complete_drop(&mut self, day: DayId, target_index: Option<usize>) -> DropOutcome {
        self.drag
            .complete_drop(&mut self.schedule, &mut self.factory, day, target_index)
    }

    fn cancel_drag(&mut self) -> bool {
        self.drag.cancel_drag()
    }

    fn drop_preview(&self) -> Option<DropPreviewLocation> {
        self.drag.drop_preview()
    }

    fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    fn day_at(&self, point: Point) -> Option<DayId> {
        self.measure.day_at(point)
    }
}
