//! Render progress reporting.

use serde::Serialize;

/// Pipeline stage a [`Progress`] event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Bell times, chunk windows and envelopes are ready.
    Scheduled,
    /// A chunk is about to be rendered.
    ChunkStarted {
        /// Chunk index.
        index: usize,
        /// Total number of chunks.
        total: usize,
    },
    /// A chunk has been rendered.
    ChunkFinished {
        /// Chunk index.
        index: usize,
        /// Total number of chunks.
        total: usize,
    },
    /// All chunks are concatenated.
    Merged,
    /// The WAV file is written.
    Encoded,
}

impl Phase {
    /// Short human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Scheduled => "scheduling",
            Phase::ChunkStarted { .. } => "rendering",
            Phase::ChunkFinished { .. } => "rendered",
            Phase::Merged => "merging",
            Phase::Encoded => "encoding",
        }
    }
}

/// A progress event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Progress {
    /// Overall completion, 0 to 100. Never decreases within a request.
    pub percentage: u8,
    /// Stage the event refers to.
    pub phase: Phase,
    /// Free-form detail for display.
    pub detail: String,
}

impl Progress {
    pub(crate) const SCHEDULED: u8 = 10;
    pub(crate) const MERGED: u8 = 90;
    pub(crate) const ENCODED: u8 = 100;
    const CHUNKS_START: f64 = 10.0;
    const CHUNKS_END: f64 = 85.0;

    /// Creates an event.
    pub fn new(percentage: u8, phase: Phase, detail: impl Into<String>) -> Self {
        Self {
            percentage,
            phase,
            detail: detail.into(),
        }
    }

    /// Percentage after `done` of `total` chunks have been handled.
    pub(crate) fn chunk_percentage(done: usize, total: usize) -> u8 {
        if total == 0 {
            return Self::CHUNKS_END as u8;
        }
        let span = Self::CHUNKS_END - Self::CHUNKS_START;
        (Self::CHUNKS_START + span * done as f64 / total as f64).floor() as u8
    }
}

/// Receives progress events.
pub trait ProgressSink {
    /// Called once per event, in order.
    fn report(&mut self, progress: Progress);
}

impl<F> ProgressSink for F
where
    F: FnMut(Progress),
{
    fn report(&mut self, progress: Progress) {
        self(progress)
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _progress: Progress) {}
}
