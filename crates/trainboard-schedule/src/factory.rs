#![forbid(unsafe_code)]

//! Template → instance cloning.

use crate::grid::DaySchedule;
use crate::module::{InstanceId, ModuleTemplate, ScheduleInstance};

/// Clones templates into schedule instances with fresh identities.
///
/// The sequence counter is shared by all templates and only ever grows, so
/// dropping the same template twice yields two distinct ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceFactory {
    next_seq: u64,
}

impl Default for InstanceFactory {
    fn default() -> Self {
        Self { next_seq: 1 }
    }
}

impl InstanceFactory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start numbering at `first_seq` (clamped to at least 1).
    #[must_use]
    pub fn starting_at(first_seq: u64) -> Self {
        Self {
            next_seq: first_seq.max(1),
        }
    }

    /// Sequence number the next instance will get.
    #[must_use]
    pub fn peek_next(&self) -> u64 {
        self.next_seq
    }

    /// Copy `template`'s fields by value under a new [`InstanceId`].
    pub fn instantiate(&mut self, template: &ModuleTemplate) -> ScheduleInstance {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.saturating_add(1);
        ScheduleInstance {
            id: InstanceId::new(template.id.clone(), seq),
            fields: template.fields.clone(),
        }
    }

    /// Move the counter past every sequence already used in `schedule`.
    pub fn resume_after(&mut self, schedule: &DaySchedule) {
        if let Some(max) = schedule.max_sequence() {
            self.next_seq = self.next_seq.max(max.saturating_add(1));
        }
    }
}
