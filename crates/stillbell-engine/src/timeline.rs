//! Bell scheduling and chunk partitioning.
//!
//! Bells follow the minute-based two-bell rule: one strike halfway through the
//! track (minus its final minute) and one strike a minute before the end. Each
//! strike is only placed if it lands at least one minute in.

use serde::Serialize;

/// Ordered bell start times, in seconds from the start of the track.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BellSchedule {
    times: Vec<f64>,
}

impl BellSchedule {
    /// Start times, sorted and strictly increasing.
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Number of bells.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Returns true if no bells are scheduled.
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

/// A bell as seen from one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScheduledBell {
    /// Start time on the track timeline.
    pub global_seconds: f64,
    /// Start time relative to the chunk start. Negative for carried bells.
    pub local_seconds: f64,
}

/// One render window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChunkPlan {
    /// Position of this chunk in the track.
    pub index: usize,
    /// Inclusive window start on the track timeline.
    pub start_seconds: f64,
    /// Exclusive window end on the track timeline.
    pub end_seconds: f64,
    /// Bells that start inside this window.
    pub bells: Vec<ScheduledBell>,
    /// Bells that started in an earlier window and are still ringing at `start_seconds`.
    pub carried_bells: Vec<ScheduledBell>,
}

impl ChunkPlan {
    /// Window length in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.end_seconds - self.start_seconds
    }

    /// Owned bells followed by carried bells.
    pub fn sounding_bells(&self) -> impl Iterator<Item = &ScheduledBell> {
        self.carried_bells.iter().chain(self.bells.iter())
    }
}

/// Computes bell times and chunk windows.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimelinePlanner;

impl TimelinePlanner {
    /// Bell start times for a track of `total_minutes`.
    pub fn compute_bell_timestamps(total_minutes: f64) -> BellSchedule {
        let mut times = Vec::with_capacity(2);
        if !total_minutes.is_finite() {
            return BellSchedule { times };
        }

        let end_minute = total_minutes - 1.0;
        let mid_minute = end_minute / 2.0;

        if mid_minute >= 1.0 {
            times.push(mid_minute * 60.0);
        }
        if end_minute >= 1.0 {
            times.push(end_minute * 60.0);
        }

        times.sort_by(f64::total_cmp);
        times.dedup();
        BellSchedule { times }
    }

    /// Partitions `[0, total_seconds)` into windows of at most `max_chunk_seconds`.
    ///
    /// Bells are assigned to the window containing their start. A bell whose
    /// `bell_duration_seconds` tail crosses into later windows is listed there
    /// as carried.
    pub fn compute_chunk_plan(
        total_seconds: f64,
        max_chunk_seconds: f64,
        schedule: &BellSchedule,
        bell_duration_seconds: f64,
    ) -> Vec<ChunkPlan> {
        let mut chunks = Vec::new();
        let usable = |v: f64| v.is_finite() && v > 0.0;
        if !usable(total_seconds) || !usable(max_chunk_seconds) {
            return chunks;
        }

        let mut index = 0usize;
        loop {
            let start = index as f64 * max_chunk_seconds;
            if start >= total_seconds {
                break;
            }
            let end = ((index + 1) as f64 * max_chunk_seconds).min(total_seconds);

            let local = |t: f64| ScheduledBell {
                global_seconds: t,
                local_seconds: t - start,
            };
            let bells = schedule
                .times()
                .iter()
                .copied()
                .filter(|&t| t >= start && t < end)
                .map(local)
                .collect();
            let carried_bells = schedule
                .times()
                .iter()
                .copied()
                .filter(|&t| t < start && t + bell_duration_seconds > start)
                .map(local)
                .collect();

            chunks.push(ChunkPlan {
                index,
                start_seconds: start,
                end_seconds: end,
                bells,
                carried_bells,
            });
            index += 1;
        }

        chunks
    }
}
