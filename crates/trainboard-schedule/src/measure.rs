#![forbid(unsafe_code)]

//! Rendered geometry, kept apart from drag state.
//!
//! The renderer measures cards and day columns after each layout and writes
//! them into a [`MeasurementProvider`]. The engine only reads from it, so
//! tests can supply geometry without a DOM.

use std::collections::HashMap;

use trainboard_core::{Point, Rect};

use crate::grid::DayId;
use crate::module::TemplateId;

/// Reference to a rendered card: a library tile or a placed instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CardAddress {
    Library(TemplateId),
    Schedule { day: DayId, index: usize },
}

/// Read-only access to the last measured layout.
pub trait MeasurementProvider {
    /// Bounding rect of one card.
    fn card_rect(&self, card: &CardAddress) -> Option<Rect>;

    /// Rects of the cards rendered in `day`, in display order.
    fn day_cards(&self, day: DayId) -> &[Rect];

    /// The day column containing `point`, if any.
    fn day_at(&self, point: Point) -> Option<DayId>;
}

#[derive(Debug, Clone, Default)]
struct DayLayout {
    column: Option<Rect>,
    cards: Vec<Rect>,
}

/// Renderer-filled measurement cache.
#[derive(Debug, Clone, Default)]
pub struct LayoutCache {
    library: HashMap<TemplateId, Rect>,
    days: [DayLayout; 7],
}

impl LayoutCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_library_card(&mut self, id: TemplateId, rect: Rect) {
        self.library.insert(id, rect);
    }

    pub fn set_day_column(&mut self, day: DayId, rect: Rect) {
        self.days[day.index()].column = Some(rect);
    }

    /// Replace the card rects of one day (display order).
    pub fn set_day_cards(&mut self, day: DayId, cards: Vec<Rect>) {
        self.days[day.index()].cards = cards;
    }

    /// Forget everything, e.g. after the view unmounts.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl MeasurementProvider for LayoutCache {
    fn card_rect(&self, card: &CardAddress) -> Option<Rect> {
        match card {
            CardAddress::Library(id) => self.library.get(id).copied(),
            CardAddress::Schedule { day, index } => {
                self.days[day.index()].cards.get(*index).copied()
            }
        }
    }

    fn day_cards(&self, day: DayId) -> &[Rect] {
        &self.days[day.index()].cards
    }

    fn day_at(&self, point: Point) -> Option<DayId> {
        DayId::ALL.into_iter().find(|day| {
            self.days[day.index()]
                .column
                .is_some_and(|column| column.contains(point))
        })
    }
}
