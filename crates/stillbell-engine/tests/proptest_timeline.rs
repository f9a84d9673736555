//! Property-based tests for scheduling, chunking and loop placement.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p stillbell-engine --test proptest_timeline
//! ```

use proptest::prelude::*;

use stillbell_engine::envelope::{Envelope, EnvelopeScheduler};
use stillbell_engine::stitch::LoopStitcher;
use stillbell_engine::timeline::TimelinePlanner;
use stillbell_engine::EngineConfig;

// ============================================================================
// 1. Bell schedule
// ============================================================================

proptest! {
    /// Bell times are strictly increasing, inside the track, and at least a minute in.
    #[test]
    fn bell_times_ordered_and_in_range(minutes in 0.0f64..600.0) {
        let schedule = TimelinePlanner::compute_bell_timestamps(minutes);
        let total = minutes * 60.0;

        prop_assert!(schedule.len() <= 2);
        prop_assert!(schedule.times().windows(2).all(|w| w[0] < w[1]));
        for &t in schedule.times() {
            prop_assert!(t >= 60.0);
            prop_assert!(t < total);
        }
    }

    /// Arbitrary input never panics.
    #[test]
    fn bell_schedule_never_panics(minutes in any::<f64>()) {
        let _ = TimelinePlanner::compute_bell_timestamps(minutes);
    }
}

// ============================================================================
// 2. Chunk plan
// ============================================================================

proptest! {
    /// Windows tile the track exactly, respect the cap, and own every bell once.
    #[test]
    fn chunks_tile_track(
        minutes in 2.0f64..240.0,
        max_chunk in 1.0f64..900.0,
        bell_seconds in 0.5f64..8.0,
    ) {
        let total = minutes * 60.0;
        let schedule = TimelinePlanner::compute_bell_timestamps(minutes);
        let chunks = TimelinePlanner::compute_chunk_plan(total, max_chunk, &schedule, bell_seconds);

        prop_assert!(!chunks.is_empty());
        prop_assert_eq!(chunks[0].start_seconds, 0.0);
        prop_assert_eq!(chunks[chunks.len() - 1].end_seconds, total);
        for pair in chunks.windows(2) {
            prop_assert_eq!(pair[0].end_seconds, pair[1].start_seconds);
        }
        for (i, chunk) in chunks.iter().enumerate() {
            prop_assert_eq!(chunk.index, i);
            prop_assert!(chunk.duration_seconds() > 0.0);
            prop_assert!(chunk.duration_seconds() <= max_chunk + 1e-6);
            for bell in &chunk.bells {
                prop_assert!(bell.local_seconds >= 0.0);
            }
            for bell in &chunk.carried_bells {
                prop_assert!(bell.local_seconds < 0.0);
                prop_assert!(bell.local_seconds + bell_seconds > 0.0);
            }
        }

        let owned: usize = chunks.iter().map(|c| c.bells.len()).sum();
        prop_assert_eq!(owned, schedule.len());
    }
}

// ============================================================================
// 3. Envelopes
// ============================================================================

proptest! {
    /// The background envelope stays within [0, 1] and scoping preserves it.
    #[test]
    fn background_envelope_bounded_and_scopable(
        minutes in 3.0f64..120.0,
        start_fraction in 0.0f64..1.0,
        span in 1.0f64..600.0,
    ) {
        let config = EngineConfig::default();
        let total = minutes * 60.0;
        let schedule = TimelinePlanner::compute_bell_timestamps(minutes);
        let env = EnvelopeScheduler::new(&config)
            .background_envelope(&schedule, total)
            .unwrap();

        let start = start_fraction * total;
        let end = (start + span).min(total);
        prop_assume!(end > start);
        let scoped = env.scoped(start, end);

        for i in 0..=64 {
            let t = start + (end - start) * i as f64 / 64.0;
            let global = env.value_at(t);
            prop_assert!((0.0..=1.0).contains(&global));
            prop_assert!((scoped.value_at(t - start) - global).abs() < 1e-9);
        }
    }

    /// Unordered breakpoints are always rejected.
    #[test]
    fn envelope_rejects_non_increasing(a in 0.0f64..100.0, b in 0.0f64..100.0) {
        use stillbell_engine::envelope::GainBreakpoint;
        let result = Envelope::new(
            "test",
            vec![GainBreakpoint::new(a, 0.0), GainBreakpoint::new(b, 1.0)],
        );
        prop_assert_eq!(result.is_ok(), b > a);
    }
}

// ============================================================================
// 4. Loop placement
// ============================================================================

proptest! {
    /// Placements cover a window exactly once, in order, within the sample.
    #[test]
    fn placements_cover_window(
        sample_frames in 1usize..5000,
        window_start in 0usize..100_000,
        window_frames in 0usize..20_000,
    ) {
        let stitcher = LoopStitcher::new(sample_frames, 0).unwrap();
        let placements = stitcher.placements(window_start, window_frames);

        let mut expected_offset = 0;
        for p in &placements {
            prop_assert_eq!(p.window_offset, expected_offset);
            prop_assert!(p.length > 0);
            prop_assert!(p.source_start + p.length <= sample_frames);
            prop_assert_eq!(
                p.loop_index * sample_frames + p.source_start,
                window_start + p.window_offset
            );
            expected_offset += p.length;
        }
        prop_assert_eq!(expected_offset, window_frames);
    }

    /// A window from the track start needs one placement per started loop.
    #[test]
    fn placements_from_start_count_loops(
        sample_frames in 1usize..5000,
        window_frames in 1usize..20_000,
    ) {
        let stitcher = LoopStitcher::new(sample_frames, 0).unwrap();
        let placements = stitcher.placements(0, window_frames);

        prop_assert_eq!(placements.len(), window_frames.div_ceil(sample_frames));
        if let Some(last) = placements.last() {
            prop_assert_eq!(last.loop_index, placements.len() - 1);
        }
    }
}
