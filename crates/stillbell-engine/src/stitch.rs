//! Loop stitching and seam crossfades.
//!
//! A short ambience sample of `D` frames is tiled along the track timeline at
//! `0, D, 2D, ...`. Loop phase is global, so a window that starts mid-loop
//! picks up exactly where the previous window stopped.
//!
//! At the head of every loop after the first, the first `xf` frames are a
//! linear blend of the previous loop's tail (read backwards from the seam) into
//! the current loop's head:
//!
//! ```text
//! f   = s / xf
//! out = sample[D - 1 - s] * (1 - f) + sample[s] * f
//! ```
//!
//! The blend starts on the frame the previous loop ended with and finishes on
//! the current loop's own material, so neither edge of the region jumps.

use serde::Serialize;

use crate::config::CrossfadeConfig;
use crate::error::{SynthesisError, SynthesisResult};
use crate::sample::AudioSample;

/// Which crossfade length to use at loop seams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CrossfadeMode {
    /// Long crossfade for tracks rendered in a single window.
    Full,
    /// Short crossfade for tracks rendered in several chunks.
    Streaming,
}

/// One contiguous run of a single loop inside a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoopPlacement {
    /// Global loop number (0 = the first loop of the track).
    pub loop_index: usize,
    /// Where the run starts in the window, in frames.
    pub window_offset: usize,
    /// Where the run starts in the ambience sample, in frames.
    pub source_start: usize,
    /// Run length in frames.
    pub length: usize,
}

/// Lays an ambience sample end to end across a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopStitcher {
    sample_frames: usize,
    crossfade_frames: usize,
}

impl LoopStitcher {
    /// Creates a stitcher for a sample of `sample_frames` frames.
    pub fn new(sample_frames: usize, crossfade_frames: usize) -> SynthesisResult<Self> {
        if sample_frames == 0 {
            return Err(SynthesisError::render("background sample has no frames"));
        }
        Ok(Self {
            sample_frames,
            crossfade_frames: crossfade_frames.min(sample_frames),
        })
    }

    /// Creates a stitcher with the crossfade length `mode` calls for.
    pub fn for_sample(
        sample: &AudioSample,
        mode: CrossfadeMode,
        config: &CrossfadeConfig,
    ) -> SynthesisResult<Self> {
        let frames = sample.frames();
        let rate = sample.sample_rate() as f64;
        let limit = match mode {
            CrossfadeMode::Full => config.max_seconds,
            CrossfadeMode::Streaming => config.streaming_seconds,
        };
        let by_time = (limit * rate).round() as usize;
        let by_length = (frames as f64 * config.fraction_of_sample).floor() as usize;
        Self::new(frames, by_time.min(by_length))
    }

    /// Ambience sample length in frames.
    pub fn sample_frames(&self) -> usize {
        self.sample_frames
    }

    /// Seam crossfade length in frames.
    pub fn crossfade_frames(&self) -> usize {
        self.crossfade_frames
    }

    /// Loop runs covering `window_frames` frames starting at track frame `window_start`.
    pub fn placements(&self, window_start: usize, window_frames: usize) -> Vec<LoopPlacement> {
        let d = self.sample_frames;
        let window_end = window_start + window_frames;
        if window_frames == 0 {
            return Vec::new();
        }

        let first_loop = window_start / d;
        let last_loop = (window_end - 1) / d;

        (first_loop..=last_loop)
            .map(|loop_index| {
                let loop_start = loop_index * d;
                let run_start = loop_start.max(window_start);
                let run_end = (loop_start + d).min(window_end);
                LoopPlacement {
                    loop_index,
                    window_offset: run_start - window_start,
                    source_start: run_start - loop_start,
                    length: run_end - run_start,
                }
            })
            .collect()
    }

    /// Value of frame `source_frame` of loop `loop_index` for one channel.
    ///
    /// Inside the seam crossfade the previous loop's tail is mirrored: frame
    /// `s` blends with `channel[D - 1 - s]`, reading the tail backwards from
    /// the seam. The blend therefore starts on the last frame the previous
    /// loop played and ends on this loop's own material.
    #[inline]
    pub fn frame_value(&self, channel: &[f32], loop_index: usize, source_frame: usize) -> f32 {
        let head = channel[source_frame];
        if loop_index == 0 || source_frame >= self.crossfade_frames {
            return head;
        }
        let f = source_frame as f32 / self.crossfade_frames as f32;
        let tail = channel[self.sample_frames - 1 - source_frame];
        tail * (1.0 - f) + head * f
    }

    /// Builds the stitched window as planar channel data.
    pub fn materialize(
        &self,
        sample: &AudioSample,
        window_start: usize,
        window_frames: usize,
    ) -> Vec<Vec<f32>> {
        let placements = self.placements(window_start, window_frames);
        sample
            .channels()
            .iter()
            .map(|channel| {
                let mut out = vec![0.0; window_frames];
                for p in &placements {
                    for j in 0..p.length {
                        out[p.window_offset + j] =
                            self.frame_value(channel, p.loop_index, p.source_start + j);
                    }
                }
                out
            })
            .collect()
    }

    /// Adds the given runs into `output`, scaling each window frame by `gain(frame)`.
    pub fn mix_into<G>(
        &self,
        sample: &AudioSample,
        placements: &[LoopPlacement],
        output: &mut [Vec<f32>],
        gain: G,
    ) where
        G: Fn(usize) -> f32,
    {
        for (channel, out) in sample.channels().iter().zip(output.iter_mut()) {
            for p in placements {
                for j in 0..p.length {
                    let n = p.window_offset + j;
                    out[n] += self.frame_value(channel, p.loop_index, p.source_start + j) * gain(n);
                }
            }
        }
    }
}
