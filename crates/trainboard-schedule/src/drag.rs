#![forbid(unsafe_code)]

//! Drag state machine and the drop commit.
//!
//! [`DragController`] owns the two pieces of transient drag state, the
//! [`ActiveDrag`] and the [`DropPreviewLocation`], plus the grab offset
//! measured at drag start. Every input path (native pointer drag, touch
//! long-press) ends in the same [`DragController::complete_drop`].
//!
//! # Invariants
//!
//! 1. A drop preview only exists while a drag is active.
//! 2. At most one drag is active; `begin_drag` during a drag is refused.
//! 3. `complete_drop` and `cancel_drag` always leave the controller idle.
//! 4. Moving an instance never duplicates or loses it: it is removed from its
//!    source list before insertion, and a same-day move past its own position
//!    is shifted down by one to account for the removal.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Result |
//! |---------|-------|--------|
//! | Drop with no active drag | Out-of-order host events | `Ignored(NoActiveDrag)` |
//! | Source slot no longer holds the instance | Schedule changed mid-drag | `Ignored(StaleSource)`, schedule untouched |
//! | Target index past the end | Stale preview | Clamped to append |

use tracing::{debug, trace, warn};
use trainboard_core::Rect;

use crate::drop_preview::insertion_index;
use crate::factory::InstanceFactory;
use crate::grid::{DayId, DaySchedule, Slot};
use crate::module::{InstanceId, ModuleTemplate, ScheduleInstance};

/// The highlighted insertion slot while dragging.
pub type DropPreviewLocation = Slot;

/// What is being dragged.
#[derive(Debug, Clone, PartialEq)]
pub enum ActiveDrag {
    /// A template from the library. Dropping creates a new instance.
    Library { module: ModuleTemplate },
    /// A placed instance at `(day, index)`. Dropping moves it.
    Schedule {
        day: DayId,
        index: usize,
        module: ScheduleInstance,
    },
}

impl ActiveDrag {
    /// `(day, index)` of the dragged instance, for schedule drags.
    #[must_use]
    pub fn source_slot(&self) -> Option<Slot> {
        match self {
            Self::Library { .. } => None,
            Self::Schedule { day, index, .. } => Some(Slot::new(*day, *index)),
        }
    }

    #[must_use]
    pub fn is_from_library(&self) -> bool {
        matches!(self, Self::Library { .. })
    }
}

/// Why a drop did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropIgnoredReason {
    NoActiveDrag,
    StaleSource,
}

/// Result of [`DragController::complete_drop`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// A library template was instantiated at `slot`.
    Placed { slot: Slot, instance: InstanceId },
    /// An existing instance moved from `from` to `to`.
    Moved {
        from: Slot,
        to: Slot,
        instance: InstanceId,
    },
    Ignored(DropIgnoredReason),
}

impl DropOutcome {
    /// Where the dropped instance ended up, if anywhere.
    #[must_use]
    pub fn landed_at(&self) -> Option<Slot> {
        match self {
            Self::Placed { slot, .. } => Some(*slot),
            Self::Moved { to, .. } => Some(*to),
            Self::Ignored(_) => None,
        }
    }

    #[must_use]
    pub fn is_committed(&self) -> bool {
        !matches!(self, Self::Ignored(_))
    }
}

/// Grab measurement captured at drag start.
#[derive(Debug, Clone, Copy, PartialEq)]
struct GrabOffset {
    /// Pointer Y minus the card's top edge.
    dy: f32,
}

/// Owner of transient drag state and the commit algorithm.
#[derive(Debug, Clone, Default)]
pub struct DragController {
    active: Option<ActiveDrag>,
    preview: Option<DropPreviewLocation>,
    grab: Option<GrabOffset>,
}

impl DragController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn active_drag(&self) -> Option<&ActiveDrag> {
        self.active.as_ref()
    }

    #[must_use]
    pub fn drop_preview(&self) -> Option<DropPreviewLocation> {
        self.preview
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    /// Vertical distance between the pointer and the card top at drag start.
    #[must_use]
    pub fn grab_offset(&self) -> Option<f32> {
        self.grab.map(|grab| grab.dy)
    }

    /// Start a drag. Returns `false` (and changes nothing) if one is already
    /// active.
    pub fn begin_drag(&mut self, drag: ActiveDrag, pointer_y: f32, card_rect: Rect) -> bool {
        if self.active.is_some() {
            trace!("begin_drag refused: drag already active");
            return false;
        }
        let dy = pointer_y - card_rect.top();
        debug!(
            source = ?drag.source_slot(),
            library = drag.is_from_library(),
            grab_offset = dy,
            "drag started"
        );
        self.active = Some(drag);
        self.preview = None;
        self.grab = Some(GrabOffset { dy });
        true
    }

    /// Where the dragged card's top edge is when the pointer is at
    /// `pointer_y`. `None` when no drag is active.
    #[must_use]
    pub fn project_drag_top(&self, pointer_y: f32) -> Option<f32> {
        self.grab.map(|grab| pointer_y - grab.dy)
    }

    /// Recompute the preview for `day` from its rendered `cards`.
    pub fn update_drop_preview(
        &mut self,
        day: DayId,
        drag_top: f32,
        cards: &[Rect],
    ) -> Option<DropPreviewLocation> {
        if self.active.is_none() {
            return None;
        }
        let preview = Slot::new(day, insertion_index(cards, drag_top));
        if self.preview != Some(preview) {
            trace!(%day, index = preview.index, "drop preview moved");
        }
        self.preview = Some(preview);
        self.preview
    }

    /// Pointer entered the gap before card `index` of `day` (or the trailing
    /// gap when `index` equals the day length).
    pub fn enter_slot(&mut self, day: DayId, index: usize) -> Option<DropPreviewLocation> {
        if self.active.is_none() {
            return None;
        }
        self.preview = Some(Slot::new(day, index));
        self.preview
    }

    /// Preview index if the current preview targets `day`.
    #[must_use]
    pub fn preview_index_for(&self, day: DayId) -> Option<usize> {
        self.preview
            .filter(|preview| preview.day == day)
            .map(|preview| preview.index)
    }

    /// Commit the active drag into `day` at `target_index` (append when
    /// `None` or past the end).
    pub fn complete_drop(
        &mut self,
        schedule: &mut DaySchedule,
        factory: &mut InstanceFactory,
        day: DayId,
        target_index: Option<usize>,
    ) -> DropOutcome {
        let Some(drag) = self.take() else {
            trace!(%day, "drop without active drag");
            return DropOutcome::Ignored(DropIgnoredReason::NoActiveDrag);
        };

        let dest_len = schedule.len(day);
        let insert_at = target_index.map_or(dest_len, |index| index.min(dest_len));

        match drag {
            ActiveDrag::Library { module } => {
                let instance = factory.instantiate(&module);
                let id = instance.id.clone();
                let index = schedule.insert(day, insert_at, instance);
                debug!(%day, index, instance = %id, "placed from library");
                DropOutcome::Placed {
                    slot: Slot::new(day, index),
                    instance: id,
                }
            }
            ActiveDrag::Schedule {
                day: source_day,
                index: source_index,
                module,
            } => {
                let still_there = schedule
                    .get(source_day, source_index)
                    .is_some_and(|instance| instance.id == module.id);
                if !still_there {
                    warn!(
                        %source_day,
                        source_index,
                        instance = %module.id,
                        "drop source is stale; schedule left unchanged"
                    );
                    return DropOutcome::Ignored(DropIgnoredReason::StaleSource);
                }
                let Some(instance) = schedule.remove(source_day, source_index) else {
                    return DropOutcome::Ignored(DropIgnoredReason::StaleSource);
                };

                let adjusted = if source_day == day && source_index < insert_at {
                    insert_at.saturating_sub(1)
                } else {
                    insert_at
                };

                let id = instance.id.clone();
                let index = schedule.insert(day, adjusted, instance);
                debug!(
                    from_day = %source_day,
                    from_index = source_index,
                    to_day = %day,
                    to_index = index,
                    instance = %id,
                    "moved instance"
                );
                DropOutcome::Moved {
                    from: Slot::new(source_day, source_index),
                    to: Slot::new(day, index),
                    instance: id,
                }
            }
        }
    }

    /// Abandon the drag without touching the schedule. Returns whether a
    /// drag was active.
    pub fn cancel_drag(&mut self) -> bool {
        let cancelled = self.take().is_some();
        if cancelled {
            debug!("drag cancelled");
        }
        cancelled
    }

    fn take(&mut self) -> Option<ActiveDrag> {
        self.preview = None;
        self.grab = None;
        self.active.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{ModuleFields, TemplateId};

    fn template(id: &str) -> ModuleTemplate {
        ModuleTemplate::new(id, ModuleFields::new(id, "desc", "run"))
    }

    fn card() -> Rect {
        Rect::new(0.0, 100.0, 200.0, 40.0)
    }

    /// `tue = [A, B, C]` built from three templates.
    fn abc() -> (DaySchedule, InstanceFactory) {
        let mut schedule = DaySchedule::new();
        let mut factory = InstanceFactory::new();
        for id in ["A", "B", "C"] {
            let instance = factory.instantiate(&template(id));
            schedule.push(DayId::Tue, instance);
        }
        (schedule, factory)
    }

    fn titles(schedule: &DaySchedule, day: DayId) -> Vec<&str> {
        schedule
            .day(day)
            .iter()
            .map(|instance| instance.fields.title.as_str())
            .collect()
    }

    fn drag_from(schedule: &DaySchedule, day: DayId, index: usize) -> ActiveDrag {
        ActiveDrag::Schedule {
            day,
            index,
            module: schedule.get(day, index).unwrap().clone(),
        }
    }

    #[test]
    fn begin_records_grab_offset() {
        let mut dc = DragController::new();
        assert!(dc.begin_drag(
            ActiveDrag::Library {
                module: template("T1")
            },
            115.0,
            card()
        ));
        assert_eq!(dc.grab_offset(), Some(15.0));
        assert_eq!(dc.project_drag_top(215.0), Some(200.0));
    }

    #[test]
    fn second_begin_is_refused() {
        let mut dc = DragController::new();
        let drag = ActiveDrag::Library {
            module: template("T1"),
        };
        assert!(dc.begin_drag(drag.clone(), 110.0, card()));
        assert!(!dc.begin_drag(
            ActiveDrag::Library {
                module: template("T2")
            },
            300.0,
            card()
        ));
        assert_eq!(dc.active_drag(), Some(&drag));
        assert_eq!(dc.grab_offset(), Some(10.0));
    }

    #[test]
    fn preview_requires_active_drag() {
        let mut dc = DragController::new();
        assert_eq!(dc.update_drop_preview(DayId::Mon, 0.0, &[]), None);
        assert_eq!(dc.enter_slot(DayId::Mon, 0), None);
        assert_eq!(dc.drop_preview(), None);
    }

    #[test]
    fn preview_uses_calculator() {
        let mut dc = DragController::new();
        dc.begin_drag(
            ActiveDrag::Library {
                module: template("T1"),
            },
            100.0,
            card(),
        );
        let cards = [
            Rect::new(0.0, 0.0, 10.0, 40.0),
            Rect::new(0.0, 50.0, 10.0, 40.0),
        ];
        assert_eq!(
            dc.update_drop_preview(DayId::Wed, 30.0, &cards),
            Some(Slot::new(DayId::Wed, 1))
        );
        assert_eq!(dc.preview_index_for(DayId::Wed), Some(1));
        assert_eq!(dc.preview_index_for(DayId::Thu), None);
    }

    #[test]
    fn same_day_reorder_forward() {
        // Preview index 2 means "before C". Removing A gives [B, C]; the
        // adjusted index 2 - 1 = 1 lands A between B and C.
        let (mut schedule, mut factory) = abc();
        let mut dc = DragController::new();
        dc.begin_drag(drag_from(&schedule, DayId::Tue, 0), 100.0, card());
        let outcome = dc.complete_drop(&mut schedule, &mut factory, DayId::Tue, Some(2));
        assert_eq!(titles(&schedule, DayId::Tue), ["B", "A", "C"]);
        assert_eq!(outcome.landed_at(), Some(Slot::new(DayId::Tue, 1)));
    }

    #[test]
    fn same_day_reorder_to_end() {
        // [B, C, A] needs preview 3, the trailing slot after C. Preview 2
        // stops short at [B, A, C] (see above).
        let (mut schedule, mut factory) = abc();
        let mut dc = DragController::new();
        dc.begin_drag(drag_from(&schedule, DayId::Tue, 0), 100.0, card());
        dc.complete_drop(&mut schedule, &mut factory, DayId::Tue, Some(3));
        assert_eq!(titles(&schedule, DayId::Tue), ["B", "C", "A"]);
    }

    #[test]
    fn same_day_reorder_backward_needs_no_adjustment() {
        let (mut schedule, mut factory) = abc();
        let mut dc = DragController::new();
        dc.begin_drag(drag_from(&schedule, DayId::Tue, 2), 100.0, card());
        dc.complete_drop(&mut schedule, &mut factory, DayId::Tue, Some(0));
        assert_eq!(titles(&schedule, DayId::Tue), ["C", "A", "B"]);
    }

    #[test]
    fn dropping_onto_own_slot_is_identity() {
        for target in [1, 2] {
            let (mut schedule, mut factory) = abc();
            let before = schedule.clone();
            let mut dc = DragController::new();
            dc.begin_drag(drag_from(&schedule, DayId::Tue, 1), 100.0, card());
            dc.complete_drop(&mut schedule, &mut factory, DayId::Tue, Some(target));
            assert_eq!(schedule, before, "target {target}");
        }
    }

    #[test]
    fn cross_day_move_preserves_identity() {
        let (mut schedule, mut factory) = abc();
        let moving = schedule.get(DayId::Tue, 1).unwrap().id.clone();
        let mut dc = DragController::new();
        dc.begin_drag(drag_from(&schedule, DayId::Tue, 1), 100.0, card());
        let outcome = dc.complete_drop(&mut schedule, &mut factory, DayId::Fri, None);
        assert_eq!(titles(&schedule, DayId::Tue), ["A", "C"]);
        assert_eq!(schedule.day(DayId::Fri)[0].id, moving);
        assert_eq!(
            outcome,
            DropOutcome::Moved {
                from: Slot::new(DayId::Tue, 1),
                to: Slot::new(DayId::Fri, 0),
                instance: moving,
            }
        );
        assert_eq!(factory.peek_next(), 4, "a move must not mint an id");
    }

    #[test]
    fn library_drop_inserts_new_instance() {
        let (mut schedule, mut factory) = abc();
        let mut dc = DragController::new();
        let t = template("T1");
        dc.begin_drag(ActiveDrag::Library { module: t.clone() }, 100.0, card());
        let outcome = dc.complete_drop(&mut schedule, &mut factory, DayId::Tue, Some(1));
        assert_eq!(titles(&schedule, DayId::Tue), ["A", "T1", "B", "C"]);
        let DropOutcome::Placed { slot, instance } = outcome else {
            panic!("expected placement, got {outcome:?}");
        };
        assert_eq!(slot, Slot::new(DayId::Tue, 1));
        assert_eq!(instance.template(), &TemplateId::new("T1"));
        assert_eq!(t.fields.title, "T1");
    }

    #[test]
    fn target_past_end_is_clamped() {
        let (mut schedule, mut factory) = abc();
        let mut dc = DragController::new();
        dc.begin_drag(
            ActiveDrag::Library {
                module: template("Z"),
            },
            100.0,
            card(),
        );
        dc.complete_drop(&mut schedule, &mut factory, DayId::Tue, Some(99));
        assert_eq!(titles(&schedule, DayId::Tue), ["A", "B", "C", "Z"]);
    }

    #[test]
    fn drop_without_drag_is_ignored() {
        let (mut schedule, mut factory) = abc();
        let before = schedule.clone();
        let mut dc = DragController::new();
        let outcome = dc.complete_drop(&mut schedule, &mut factory, DayId::Tue, Some(0));
        assert_eq!(outcome, DropOutcome::Ignored(DropIgnoredReason::NoActiveDrag));
        assert_eq!(schedule, before);
    }

    #[test]
    fn stale_source_leaves_schedule_untouched() {
        let (mut schedule, mut factory) = abc();
        let mut dc = DragController::new();
        dc.begin_drag(drag_from(&schedule, DayId::Tue, 0), 100.0, card());
        schedule.remove(DayId::Tue, 0);
        let before = schedule.clone();
        let outcome = dc.complete_drop(&mut schedule, &mut factory, DayId::Wed, None);
        assert_eq!(outcome, DropOutcome::Ignored(DropIgnoredReason::StaleSource));
        assert_eq!(schedule, before);
        assert!(!dc.is_dragging());
    }

    #[test]
    fn cancel_clears_everything_and_reports() {
        let (schedule, _) = abc();
        let before = schedule.clone();
        let mut dc = DragController::new();
        dc.begin_drag(drag_from(&schedule, DayId::Tue, 0), 100.0, card());
        dc.enter_slot(DayId::Tue, 3);
        assert!(dc.cancel_drag());
        assert!(!dc.cancel_drag());
        assert_eq!(dc.active_drag(), None);
        assert_eq!(dc.drop_preview(), None);
        assert_eq!(dc.grab_offset(), None);
        assert_eq!(schedule, before);
    }

    #[test]
    fn commit_clears_transient_state() {
        let (mut schedule, mut factory) = abc();
        let mut dc = DragController::new();
        dc.begin_drag(drag_from(&schedule, DayId::Tue, 0), 100.0, card());
        dc.enter_slot(DayId::Mon, 0);
        dc.complete_drop(&mut schedule, &mut factory, DayId::Mon, Some(0));
        assert!(!dc.is_dragging());
        assert_eq!(dc.drop_preview(), None);
        assert_eq!(dc.grab_offset(), None);
    }
}
