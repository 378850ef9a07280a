#![forbid(unsafe_code)]

//! The weekly day grid.
//!
//! [`DaySchedule`] maps each of the seven [`DayId`]s to an ordered list of
//! [`ScheduleInstance`]s. All seven days always exist; an empty day is an
//! empty list, never a missing key. Order within a day is execution order.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::module::{InstanceId, ScheduleInstance};

/// Day column identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayId {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl DayId {
    /// All days in week order.
    pub const ALL: [Self; 7] = [
        Self::Mon,
        Self::Tue,
        Self::Wed,
        Self::Thu,
        Self::Fri,
        Self::Sat,
        Self::Sun,
    ];

    /// Short key used by hosts and in serialized schedules.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Mon => "mon",
            Self::Tue => "tue",
            Self::Wed => "wed",
            Self::Thu => "thu",
            Self::Fri => "fri",
            Self::Sat => "sat",
            Self::Sun => "sun",
        }
    }

    /// Position in the week, Monday = 0.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Mon => 0,
            Self::Tue => 1,
            Self::Wed => 2,
            Self::Thu => 3,
            Self::Fri => 4,
            Self::Sat => 5,
            Self::Sun => 6,
        }
    }
}

impl fmt::Display for DayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Unknown day key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown day: {0:?}")]
pub struct UnknownDay(pub String);

impl FromStr for DayId {
    type Err = UnknownDay;

    /// Accepts short keys (`tue`) and full English names (`Tuesday`),
    /// case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let day = match lower.as_str() {
            "mon" | "monday" => Self::Mon,
            "tue" | "tuesday" => Self::Tue,
            "wed" | "wednesday" => Self::Wed,
            "thu" | "thursday" => Self::Thu,
            "fri" | "friday" => Self::Fri,
            "sat" | "saturday" => Self::Sat,
            "sun" | "sunday" => Self::Sun,
            _ => return Err(UnknownDay(s.to_owned())),
        };
        Ok(day)
    }
}

/// A `(day, index)` position in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot {
    pub day: DayId,
    pub index: usize,
}

impl Slot {
    #[must_use]
    pub const fn new(day: DayId, index: usize) -> Self {
        Self { day, index }
    }
}

type DayMap = BTreeMap<DayId, Vec<ScheduleInstance>>;

/// Seven ordered day lists.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "DayMap", into = "DayMap")]
pub struct DaySchedule {
    days: [Vec<ScheduleInstance>; 7],
}

impl DaySchedule {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Instances placed on `day`, in order.
    #[must_use]
    pub fn day(&self, day: DayId) -> &[ScheduleInstance] {
        &self.days[day.index()]
    }

    #[must_use]
    pub fn len(&self, day: DayId) -> usize {
        self.days[day.index()].len()
    }

    /// Instance count across the whole week.
    #[must_use]
    pub fn total(&self) -> usize {
        self.days.iter().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.days.iter().all(Vec::is_empty)
    }

    #[must_use]
    pub fn get(&self, day: DayId, index: usize) -> Option<&ScheduleInstance> {
        self.days[day.index()].get(index)
    }

    pub fn get_mut(&mut self, day: DayId, index: usize) -> Option<&mut ScheduleInstance> {
        self.days[day.index()].get_mut(index)
    }

    /// Insert at `index`, clamped to the end of the day. Returns the index
    /// the instance actually landed at.
    pub fn insert(&mut self, day: DayId, index: usize, instance: ScheduleInstance) -> usize {
        let list = &mut self.days[day.index()];
        let at = index.min(list.len());
        list.insert(at, instance);
        at
    }

    /// Append to the end of `day`. Returns the new index.
    pub fn push(&mut self, day: DayId, instance: ScheduleInstance) -> usize {
        let list = &mut self.days[day.index()];
        list.push(instance);
        list.len() - 1
    }

    /// Remove and return the instance at `index`, if any.
    pub fn remove(&mut self, day: DayId, index: usize) -> Option<ScheduleInstance> {
        let list = &mut self.days[day.index()];
        (index < list.len()).then(|| list.remove(index))
    }

    /// Empty one day, returning what it held.
    pub fn clear_day(&mut self, day: DayId) -> Vec<ScheduleInstance> {
        std::mem::take(&mut self.days[day.index()])
    }

    /// Locate an instance by id.
    #[must_use]
    pub fn find(&self, id: &InstanceId) -> Option<Slot> {
        self.iter().find_map(|(day, list)| {
            list.iter()
                .position(|instance| &instance.id == id)
                .map(|index| Slot::new(day, index))
        })
    }

    /// Days in week order with their lists.
    pub fn iter(&self) -> impl Iterator<Item = (DayId, &[ScheduleInstance])> {
        DayId::ALL
            .into_iter()
            .map(move |day| (day, self.days[day.index()].as_slice()))
    }

    /// First id that appears more than once, scanning in week order.
    #[must_use]
    pub fn first_duplicate(&self) -> Option<&InstanceId> {
        let mut seen = HashSet::new();
        self.days
            .iter()
            .flatten()
            .map(|instance| &instance.id)
            .find(|id| !seen.insert(*id))
    }

    /// Highest instance sequence number present, if any.
    #[must_use]
    pub fn max_sequence(&self) -> Option<u64> {
        self.days
            .iter()
            .flatten()
            .map(|instance| instance.id.seq())
            .max()
    }
}

impl From<DayMap> for DaySchedule {
    fn from(mut map: DayMap) -> Self {
        let mut schedule = Self::default();
        for day in DayId::ALL {
            if let Some(list) = map.remove(&day) {
                schedule.days[day.index()] = list;
            }
        }
        schedule
    }
}

impl From<DaySchedule> for DayMap {
    fn from(schedule: DaySchedule) -> Self {
        DayId::ALL.into_iter().zip(schedule.days).collect()
    }
}
