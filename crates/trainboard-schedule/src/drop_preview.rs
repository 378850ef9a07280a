#![forbid(unsafe_code)]

//! Insertion-index calculation from card geometry.
//!
//! The dragged card is tracked by its projected top edge (`drag_top`, the
//! pointer Y minus the grab offset), so the answer does not depend on where
//! on the card the user grabbed it.
//!
//! # Tie-break
//!
//! A card qualifies when `top + height / 2 > drag_top`, strictly. A
//! `drag_top` sitting exactly on a midpoint therefore inserts *after* that
//! card.

use trainboard_core::Rect;

/// Index at which a card whose top edge is at `drag_top` would be inserted
/// into a day rendered as `cards` (display order).
///
/// Returns the position of the first card whose vertical midpoint exceeds
/// `drag_top`, or `cards.len()` (append) when none does. A non-finite
/// `drag_top` compares false against every midpoint and appends.
#[must_use]
pub fn insertion_index(cards: &[Rect], drag_top: f32) -> usize {
    cards
        .iter()
        .position(|card| card.mid_y() > drag_top)
        .unwrap_or(cards.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Three 40px cards with 10px gaps starting at y=100.
    /// Midpoints: 120, 170, 220.
    fn column() -> Vec<Rect> {
        vec![
            Rect::new(0.0, 100.0, 200.0, 40.0),
            Rect::new(0.0, 150.0, 200.0, 40.0),
            Rect::new(0.0, 200.0, 200.0, 40.0),
        ]
    }

    #[test]
    fn empty_day_inserts_at_zero() {
        assert_eq!(insertion_index(&[], 123.0), 0);
    }

    #[test]
    fn above_first_midpoint_inserts_first() {
        assert_eq!(insertion_index(&column(), 0.0), 0);
        assert_eq!(insertion_index(&column(), 119.9), 0);
    }

    #[test]
    fn between_midpoints_inserts_between() {
        assert_eq!(insertion_index(&column(), 121.0), 1);
        assert_eq!(insertion_index(&column(), 169.0), 1);
        assert_eq!(insertion_index(&column(), 171.0), 2);
    }

    #[test]
    fn past_last_midpoint_appends() {
        assert_eq!(insertion_index(&column(), 221.0), 3);
        assert_eq!(insertion_index(&column(), 10_000.0), 3);
    }

    // Fixtures pinning the boundary convention at the first and last slot.

    #[test]
    fn exactly_on_first_midpoint_inserts_after_first_card() {
        assert_eq!(insertion_index(&column(), 120.0), 1);
    }

    #[test]
    fn exactly_on_last_midpoint_appends() {
        assert_eq!(insertion_index(&column(), 220.0), 3);
    }

    #[test]
    fn single_card_boundary() {
        let one = [Rect::new(0.0, 0.0, 10.0, 20.0)];
        assert_eq!(insertion_index(&one, 9.99), 0);
        assert_eq!(insertion_index(&one, 10.0), 1);
    }

    #[test]
    fn nan_drag_top_appends() {
        assert_eq!(insertion_index(&column(), f32::NAN), 3);
    }

    #[test]
    fn scan_follows_display_order_not_geometry() {
        // A stale measurement where the second card reports a smaller top than
        // the first still resolves to the first qualifying card in order.
        let cards = [
            Rect::new(0.0, 300.0, 10.0, 40.0),
            Rect::new(0.0, 100.0, 10.0, 40.0),
        ];
        assert_eq!(insertion_index(&cards, 200.0), 0);
    }
}
