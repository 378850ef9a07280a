//! Property-based invariant tests for the long-press tracker.
//!
//! 1. A press that travels past the tolerance before the deadline never engages
//! 2. A press that stays within the tolerance engages exactly once
//! 3. Release always returns the tracker to Idle

use proptest::prelude::*;
use trainboard_core::{Point, PressConfig, PressPhase, PressTracker, PressVerdict};
use web_time::{Duration, Instant};

/// A finger sample: milliseconds after touchstart and vertical offset from the origin.
fn sample_strategy(max_offset: f32) -> impl Strategy<Value = (u64, f32)> {
    (0u64..499, -max_offset..=max_offset)
}

proptest! {
    #[test]
    fn moving_past_tolerance_never_engages(
        early in prop::collection::vec(sample_strategy(10.0), 0..8),
        escape in 10.01f32..400.0,
        escape_at in 0u64..499,
        late in prop::collection::vec((500u64..2000, -400.0f32..400.0), 0..8),
    ) {
        let mut pt = PressTracker::new(PressConfig::default());
        let t = Instant::now();
        let origin = Point::new(50.0, 200.0);
        pt.press(origin, t);

        let mut early = early;
        early.sort_by_key(|(ms, _)| *ms);
        for (ms, dy) in early.iter().filter(|(ms, _)| *ms < escape_at) {
            let verdict = pt.moved(Point::new(50.0, 200.0 + dy), t + Duration::from_millis(*ms));
            prop_assert_eq!(verdict, PressVerdict::None);
        }
        let verdict = pt.moved(Point::new(50.0, 200.0 + escape), t + Duration::from_millis(escape_at));
        prop_assert_eq!(verdict, PressVerdict::Cancelled);

        for (ms, dy) in late {
            let at = t + Duration::from_millis(ms);
            prop_assert_ne!(pt.moved(Point::new(50.0, 200.0 + dy), at), PressVerdict::Engaged);
            prop_assert_ne!(pt.poll(at), PressVerdict::Engaged);
        }
        prop_assert_eq!(pt.phase(), PressPhase::Idle);
    }

    #[test]
    fn staying_within_tolerance_engages_exactly_once(
        samples in prop::collection::vec(sample_strategy(10.0), 0..16),
        polls in prop::collection::vec(500u64..3000, 1..6),
    ) {
        let mut pt = PressTracker::new(PressConfig::default());
        let t = Instant::now();
        pt.press(Point::new(50.0, 200.0), t);

        let mut samples = samples;
        samples.sort_by_key(|(ms, _)| *ms);
        for (ms, dy) in samples {
            pt.moved(Point::new(50.0, 200.0 + dy), t + Duration::from_millis(ms));
        }

        let mut polls = polls;
        polls.sort_unstable();
        let engaged = polls
            .into_iter()
            .filter(|ms| pt.poll(t + Duration::from_millis(*ms)) == PressVerdict::Engaged)
            .count();
        prop_assert_eq!(engaged, 1);
        prop_assert_eq!(pt.phase(), PressPhase::Engaged);
    }

    #[test]
    fn release_always_returns_to_idle(engage in any::<bool>()) {
        let mut pt = PressTracker::new(PressConfig::default());
        let t = Instant::now();
        pt.press(Point::new(0.0, 0.0), t);
        if engage {
            pt.poll(t + Duration::from_millis(500));
        }
        pt.release();
        prop_assert_eq!(pt.phase(), PressPhase::Idle);
        prop_assert_eq!(pt.origin(), None);
        prop_assert_eq!(pt.deadline(), None);
    }
}
