//! Chunk rendering.

use crate::config::EngineConfig;
use crate::envelope::Envelope;
use crate::error::{SynthesisError, SynthesisResult};
use crate::sample::{AudioSample, RenderedChunk};
use crate::stitch::{CrossfadeMode, LoopPlacement, LoopStitcher};
use crate::timeline::ChunkPlan;

/// Converts a track time to a frame index.
#[inline]
pub fn seconds_to_frames(seconds: f64, sample_rate: u32) -> usize {
    (seconds * sample_rate as f64).round().max(0.0) as usize
}

/// A bell strike positioned inside a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BellInstance {
    /// Frame of the strike relative to the chunk start. Negative when the strike
    /// began in an earlier chunk.
    pub offset_frames: i64,
}

/// Everything the renderer needs for one chunk.
#[derive(Debug, Clone)]
pub struct MixInstructions {
    /// Chunk position in the track.
    pub index: usize,
    /// First track frame of the window.
    pub start_frame: usize,
    /// Window length in frames.
    pub frames: usize,
    /// Seam crossfade mode in use.
    pub mode: CrossfadeMode,
    /// Loop runs covering the window.
    pub placements: Vec<LoopPlacement>,
    /// Background gain, in chunk-local seconds.
    pub background_envelope: Envelope,
    /// Strikes audible in the window.
    pub bells: Vec<BellInstance>,
}

impl MixInstructions {
    /// Derives frame-level instructions from a chunk plan.
    ///
    /// Window frames are taken as the difference of the rounded boundaries, so
    /// consecutive chunks tile the track without gaps or overlaps.
    pub fn for_chunk(
        plan: &ChunkPlan,
        sample_rate: u32,
        stitcher: &LoopStitcher,
        mode: CrossfadeMode,
        background_envelope: &Envelope,
    ) -> Self {
        let start_frame = seconds_to_frames(plan.start_seconds, sample_rate);
        let end_frame = seconds_to_frames(plan.end_seconds, sample_rate);
        let frames = end_frame.saturating_sub(start_frame);

        let bells = plan
            .sounding_bells()
            .map(|bell| BellInstance {
                offset_frames: seconds_to_frames(bell.global_seconds, sample_rate) as i64
                    - start_frame as i64,
            })
            .collect();

        Self {
            index: plan.index,
            start_frame,
            frames,
            mode,
            placements: stitcher.placements(start_frame, frames),
            background_envelope: background_envelope.scoped(plan.start_seconds, plan.end_seconds),
            bells,
        }
    }
}

/// Mixes the ambience bed and bell strikes for one window.
#[derive(Debug)]
pub struct ChunkRenderer<'a> {
    background: &'a AudioSample,
    bell: &'a AudioSample,
    stitcher: LoopStitcher,
    bell_envelope: Envelope,
    bell_frames: usize,
    background_gain: f32,
    bell_gain: f32,
}

impl<'a> ChunkRenderer<'a> {
    /// Creates a renderer. The bell must share the background's format.
    pub fn new(
        background: &'a AudioSample,
        bell: &'a AudioSample,
        stitcher: LoopStitcher,
        bell_envelope: Envelope,
        config: &EngineConfig,
    ) -> SynthesisResult<Self> {
        background.ensure_same_format(bell, "bell sample")?;
        if stitcher.sample_frames() != background.frames() {
            return Err(SynthesisError::render(format!(
                "stitcher expects {} frames, background has {}",
                stitcher.sample_frames(),
                background.frames()
            )));
        }

        Ok(Self {
            background,
            bell,
            stitcher,
            bell_envelope,
            bell_frames: bell_frames(bell, config.bell.max_duration_seconds),
            background_gain: config.background.gain as f32,
            bell_gain: config.bell.gain as f32,
        })
    }

    /// Frames of the bell sample that are played per strike.
    pub fn bell_frames(&self) -> usize {
        self.bell_frames
    }

    /// Renders one chunk.
    pub fn render(&self, instructions: &MixInstructions) -> SynthesisResult<RenderedChunk> {
        let rate = self.background.sample_rate();
        let mut chunk =
            RenderedChunk::silent(rate, self.background.channel_count(), instructions.frames)?;
        let output = chunk.channels_mut();

        let inv_rate = 1.0 / rate as f64;
        let envelope = &instructions.background_envelope;
        let background_gain = self.background_gain;
        let gain = |n: usize| envelope.value_at(n as f64 * inv_rate) as f32 * background_gain;

        match instructions.mode {
            CrossfadeMode::Full => {
                let bed = self.stitcher.materialize(
                    self.background,
                    instructions.start_frame,
                    instructions.frames,
                );
                for (out, bed) in output.iter_mut().zip(bed.iter()) {
                    for (n, (o, &b)) in out.iter_mut().zip(bed.iter()).enumerate() {
                        *o += b * gain(n);
                    }
                }
            }
            CrossfadeMode::Streaming => {
                self.stitcher
                    .mix_into(self.background, &instructions.placements, output, gain);
            }
        }

        for bell in &instructions.bells {
            self.mix_bell(output, bell.offset_frames, inv_rate);
        }

        Ok(chunk)
    }

    fn mix_bell(&self, output: &mut [Vec<f32>], offset_frames: i64, inv_rate: f64) {
        let window = output.first().map_or(0, Vec::len) as i64;
        let first = (-offset_frames).max(0);
        let last = (self.bell_frames as i64).min(window - offset_frames);
        if first >= last {
            return;
        }

        for (out, source) in output.iter_mut().zip(self.bell.channels()) {
            for k in first as usize..last as usize {
                let gain = self.bell_envelope.value_at(k as f64 * inv_rate) as f32 * self.bell_gain;
                let n = (offset_frames + k as i64) as usize;
                out[n] += source[k] * gain;
            }
        }
    }
}

/// Frames of `bell` played per strike: the whole sample, capped at `max_seconds`.
pub fn bell_frames(bell: &AudioSample, max_seconds: f64) -> usize {
    let cap = (max_seconds * bell.sample_rate() as f64).floor() as usize;
    bell.frames().min(cap)
}
