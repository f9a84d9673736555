//! The synthesis pipeline.
//!
//! Validates a request, plans the bell schedule and chunk windows, renders
//! each chunk, merges them and encodes the result.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::envelope::EnvelopeScheduler;
use crate::error::{SampleRole, SynthesisError, SynthesisResult};
use crate::merge::merge_chunks;
use crate::progress::{Phase, Progress, ProgressSink};
use crate::render::{bell_frames, ChunkRenderer, MixInstructions};
use crate::sample::{BackgroundKind, OutputTrack, RenderedChunk, SampleSource};
use crate::stitch::{CrossfadeMode, LoopStitcher};
use crate::timeline::{BellSchedule, ChunkPlan, TimelinePlanner};
use crate::wav::WavResult;

/// What to render.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SynthesisRequest {
    /// Ambience bed to loop.
    pub background: BackgroundKind,
    /// Track length in seconds.
    pub duration_seconds: f64,
}

impl SynthesisRequest {
    /// Creates a request for a track of `duration_seconds`.
    pub fn new(background: BackgroundKind, duration_seconds: f64) -> Self {
        Self {
            background,
            duration_seconds,
        }
    }

    /// Creates a request for a track of `minutes` minutes.
    pub fn from_minutes(background: BackgroundKind, minutes: f64) -> Self {
        Self::new(background, minutes * 60.0)
    }
}

/// Bell schedule and chunk windows for a track.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timeline {
    /// Track length in seconds.
    pub duration_seconds: f64,
    /// Audible length of each bell strike.
    pub bell_duration_seconds: f64,
    /// Bell start times.
    pub schedule: BellSchedule,
    /// Render windows, in track order.
    pub chunks: Vec<ChunkPlan>,
}

impl Timeline {
    /// Seam crossfade mode used for this timeline.
    pub fn crossfade_mode(&self) -> CrossfadeMode {
        if self.chunks.len() > 1 {
            CrossfadeMode::Streaming
        } else {
            CrossfadeMode::Full
        }
    }
}

/// Offline track synthesizer.
///
/// Holds only configuration; every call is independent.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    /// Creates an engine.
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// The engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Rejects durations that are not finite, not positive or below the minimum.
    ///
    /// The minimum is never shorter than the background fade-in plus fade-out.
    pub fn validate_duration(&self, duration_seconds: f64) -> SynthesisResult<()> {
        let minimum_seconds = self.config.shortest_track_seconds();
        if !duration_seconds.is_finite()
            || duration_seconds <= 0.0
            || duration_seconds < minimum_seconds
        {
            return Err(SynthesisError::InvalidDuration {
                duration_seconds,
                minimum_seconds,
            });
        }
        Ok(())
    }

    /// Plans a track without rendering it.
    ///
    /// `bell_length_seconds` is the bell sample's natural length; it is capped
    /// at the configured maximum strike length.
    pub fn plan(
        &self,
        duration_seconds: f64,
        bell_length_seconds: f64,
    ) -> SynthesisResult<Timeline> {
        self.validate_duration(duration_seconds)?;

        let bell_duration_seconds = bell_length_seconds.min(self.config.bell.max_duration_seconds);
        let schedule = TimelinePlanner::compute_bell_timestamps(duration_seconds / 60.0);
        let chunks = TimelinePlanner::compute_chunk_plan(
            duration_seconds,
            self.config.max_chunk_seconds,
            &schedule,
            bell_duration_seconds,
        );
        if chunks.is_empty() {
            return Err(SynthesisError::render("track produced no chunks"));
        }

        Ok(Timeline {
            duration_seconds,
            bell_duration_seconds,
            schedule,
            chunks,
        })
    }

    /// Renders a track to PCM.
    pub fn render_track<S, P>(
        &self,
        request: &SynthesisRequest,
        sources: &S,
        progress: &mut P,
    ) -> SynthesisResult<OutputTrack>
    where
        S: SampleSource + ?Sized,
        P: ProgressSink + ?Sized,
    {
        self.validate_duration(request.duration_seconds)?;

        let background =
            sources
                .background(request.background)
                .ok_or(SynthesisError::MissingSample {
                    role: SampleRole::Background(request.background),
                })?;
        let bell = sources.bell().ok_or(SynthesisError::MissingSample {
            role: SampleRole::Bell,
        })?;
        background.ensure_same_format(bell, "bell sample")?;
        if background.is_empty() {
            return Err(SynthesisError::render("background sample has no frames"));
        }
        if bell.is_empty() {
            return Err(SynthesisError::render("bell sample has no frames"));
        }

        let rate = background.sample_rate();
        let strike_frames = bell_frames(bell, self.config.bell.max_duration_seconds);
        let strike_seconds = strike_frames as f64 / rate as f64;
        let timeline = self.plan(request.duration_seconds, strike_seconds)?;

        let scheduler = EnvelopeScheduler::new(&self.config);
        let background_envelope =
            scheduler.background_envelope(&timeline.schedule, timeline.duration_seconds)?;
        let bell_envelope = scheduler.bell_envelope(strike_seconds)?;

        let mode = timeline.crossfade_mode();
        let stitcher = LoopStitcher::for_sample(background, mode, &self.config.crossfade)?;
        let renderer = ChunkRenderer::new(background, bell, stitcher, bell_envelope, &self.config)?;

        let total = timeline.chunks.len();
        progress.report(Progress::new(
            Progress::SCHEDULED,
            Phase::Scheduled,
            format!(
                "{} bell(s), {} chunk(s), {} Hz / {} ch",
                timeline.schedule.len(),
                total,
                rate,
                background.channel_count()
            ),
        ));

        let instructions: Vec<MixInstructions> = timeline
            .chunks
            .iter()
            .map(|chunk| {
                MixInstructions::for_chunk(chunk, rate, &stitcher, mode, &background_envelope)
            })
            .collect();

        let rendered = if self.config.parallel_chunks && total > 1 {
            self.render_parallel(&renderer, &timeline.chunks, &instructions, progress)?
        } else {
            self.render_sequential(&renderer, &timeline.chunks, &instructions, progress)?
        };

        let track = merge_chunks(rendered)?;
        progress.report(Progress::new(
            Progress::MERGED,
            Phase::Merged,
            format!("{} frames", track.frames()),
        ));

        Ok(track)
    }

    /// Renders a track and encodes it as WAV.
    pub fn synthesize<S, P>(
        &self,
        request: &SynthesisRequest,
        sources: &S,
        progress: &mut P,
    ) -> SynthesisResult<WavResult>
    where
        S: SampleSource + ?Sized,
        P: ProgressSink + ?Sized,
    {
        let track = self.render_track(request, sources, progress)?;
        let result = WavResult::from_track(&track)?;
        progress.report(Progress::new(
            Progress::ENCODED,
            Phase::Encoded,
            format!("{} bytes", result.wav_data.len()),
        ));
        Ok(result)
    }

    fn render_sequential<P>(
        &self,
        renderer: &ChunkRenderer<'_>,
        chunks: &[ChunkPlan],
        instructions: &[MixInstructions],
        progress: &mut P,
    ) -> SynthesisResult<Vec<RenderedChunk>>
    where
        P: ProgressSink + ?Sized,
    {
        let total = chunks.len();
        let mut rendered = Vec::with_capacity(total);
        for (chunk, mix) in chunks.iter().zip(instructions) {
            progress.report(chunk_started(chunk, total));
            rendered.push(renderer.render(mix)?);
            progress.report(chunk_finished(chunk, total));
        }
        Ok(rendered)
    }

    fn render_parallel<P>(
        &self,
        renderer: &ChunkRenderer<'_>,
        chunks: &[ChunkPlan],
        instructions: &[MixInstructions],
        progress: &mut P,
    ) -> SynthesisResult<Vec<RenderedChunk>>
    where
        P: ProgressSink + ?Sized,
    {
        let rendered = instructions
            .par_iter()
            .map(|mix| renderer.render(mix))
            .collect::<SynthesisResult<Vec<_>>>()?;

        let total = chunks.len();
        for chunk in chunks {
            progress.report(chunk_started(chunk, total));
            progress.report(chunk_finished(chunk, total));
        }
        Ok(rendered)
    }
}

fn chunk_started(chunk: &ChunkPlan, total: usize) -> Progress {
    Progress::new(
        Progress::chunk_percentage(chunk.index, total),
        Phase::ChunkStarted {
            index: chunk.index,
            total,
        },
        format!(
            "chunk {}/{} ({:.1}s - {:.1}s)",
            chunk.index + 1,
            total,
            chunk.start_seconds,
            chunk.end_seconds
        ),
    )
}

fn chunk_finished(chunk: &ChunkPlan, total: usize) -> Progress {
    Progress::new(
        Progress::chunk_percentage(chunk.index + 1, total),
        Phase::ChunkFinished {
            index: chunk.index,
            total,
        },
        format!("chunk {}/{} done", chunk.index + 1, total),
    )
}
