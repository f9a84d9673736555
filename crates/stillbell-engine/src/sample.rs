//! Decoded PCM buffers and the sample supplier seam.
//!
//! The engine never decodes audio itself. Callers hand it [`AudioSample`]
//! values through a [`SampleSource`]; [`SampleLibrary`] is the in-memory
//! implementation used by the CLI and the tests.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{SynthesisError, SynthesisResult};

/// Sample rate and channel count of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleFormat {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Number of channels.
    pub channel_count: usize,
}

impl SampleFormat {
    /// Creates a format description.
    pub fn new(sample_rate: u32, channel_count: usize) -> Self {
        Self {
            sample_rate,
            channel_count,
        }
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Hz / {} ch", self.sample_rate, self.channel_count)
    }
}

/// Planar PCM audio: one `Vec<f32>` per channel, all the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

/// Decoded input audio, owned by the caller.
pub type AudioSample = AudioBuffer;

/// The PCM produced for one chunk window.
pub type RenderedChunk = AudioBuffer;

/// The fully merged track, ready for encoding.
pub type OutputTrack = AudioBuffer;

impl AudioBuffer {
    /// Creates a buffer from planar channel data.
    ///
    /// Fails if there are no channels, the sample rate is zero, or the
    /// channels have different lengths.
    pub fn new(sample_rate: u32, channels: Vec<Vec<f32>>) -> SynthesisResult<Self> {
        if sample_rate == 0 {
            return Err(SynthesisError::render("sample rate must be non-zero"));
        }
        if channels.is_empty() {
            return Err(SynthesisError::render("audio buffer has no channels"));
        }
        let frames = channels[0].len();
        if let Some(bad) = channels.iter().position(|c| c.len() != frames) {
            return Err(SynthesisError::render(format!(
                "channel {} has {} frames, expected {}",
                bad,
                channels[bad].len(),
                frames
            )));
        }
        Ok(Self {
            sample_rate,
            channels,
        })
    }

    /// Creates a zero-filled buffer.
    pub fn silent(sample_rate: u32, channel_count: usize, frames: usize) -> SynthesisResult<Self> {
        Self::new(sample_rate, vec![vec![0.0; frames]; channel_count])
    }

    /// Creates a mono buffer.
    pub fn mono(sample_rate: u32, samples: Vec<f32>) -> SynthesisResult<Self> {
        Self::new(sample_rate, vec![samples])
    }

    /// Creates a stereo buffer.
    pub fn stereo(sample_rate: u32, left: Vec<f32>, right: Vec<f32>) -> SynthesisResult<Self> {
        Self::new(sample_rate, vec![left, right])
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Frames per channel.
    pub fn frames(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    /// Returns true if the buffer holds no frames.
    pub fn is_empty(&self) -> bool {
        self.frames() == 0
    }

    /// Duration in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Sample rate and channel count.
    pub fn format(&self) -> SampleFormat {
        SampleFormat::new(self.sample_rate, self.channels.len())
    }

    /// Samples of one channel.
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }

    /// All channels.
    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    pub(crate) fn channels_mut(&mut self) -> &mut [Vec<f32>] {
        &mut self.channels
    }

    /// Consumes the buffer, returning its channel data.
    pub fn into_channels(self) -> Vec<Vec<f32>> {
        self.channels
    }

    /// Checks that `other` has the same format as `self`.
    pub fn ensure_same_format(&self, other: &AudioBuffer, context: &str) -> SynthesisResult<()> {
        if self.format() != other.format() {
            return Err(SynthesisError::format_mismatch(
                context,
                self.format(),
                other.format(),
            ));
        }
        Ok(())
    }
}

/// Known ambience beds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundKind {
    /// Rainfall.
    Rain,
    /// Sea waves.
    Sea,
    /// Running water.
    Water,
}

impl BackgroundKind {
    /// Every known kind, in display order.
    pub const ALL: [BackgroundKind; 3] = [
        BackgroundKind::Rain,
        BackgroundKind::Sea,
        BackgroundKind::Water,
    ];

    /// Lowercase identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            BackgroundKind::Rain => "rain",
            BackgroundKind::Sea => "sea",
            BackgroundKind::Water => "water",
        }
    }
}

impl fmt::Display for BackgroundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown background identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown background '{0}' (expected rain, sea, or water)")]
pub struct UnknownBackground(pub String);

impl FromStr for BackgroundKind {
    type Err = UnknownBackground;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BackgroundKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownBackground(s.to_string()))
    }
}

/// Supplies decoded samples to the engine.
pub trait SampleSource {
    /// The ambience bed for `kind`, if loaded.
    fn background(&self, kind: BackgroundKind) -> Option<&AudioSample>;

    /// The bell strike, if loaded.
    fn bell(&self) -> Option<&AudioSample>;
}

/// In-memory [`SampleSource`].
#[derive(Debug, Clone, Default)]
pub struct SampleLibrary {
    backgrounds: HashMap<BackgroundKind, AudioSample>,
    bell: Option<AudioSample>,
}

impl SampleLibrary {
    /// Creates an empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an ambience bed.
    pub fn insert_background(&mut self, kind: BackgroundKind, sample: AudioSample) {
        self.backgrounds.insert(kind, sample);
    }

    /// Sets the bell sample.
    pub fn set_bell(&mut self, sample: AudioSample) {
        self.bell = Some(sample);
    }

    /// Builder-style [`insert_background`](Self::insert_background).
    pub fn with_background(mut self, kind: BackgroundKind, sample: AudioSample) -> Self {
        self.insert_background(kind, sample);
        self
    }

    /// Builder-style [`set_bell`](Self::set_bell).
    pub fn with_bell(mut self, sample: AudioSample) -> Self {
        self.set_bell(sample);
        self
    }

    /// Loaded background kinds, sorted.
    pub fn loaded_backgrounds(&self) -> Vec<BackgroundKind> {
        let mut kinds: Vec<_> = self.backgrounds.keys().copied().collect();
        kinds.sort();
        kinds
    }
}

impl SampleSource for SampleLibrary {
    fn background(&self, kind: BackgroundKind) -> Option<&AudioSample> {
        self.backgrounds.get(&kind)
    }

    fn bell(&self) -> Option<&AudioSample> {
        self.bell.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_rejects_ragged_channels() {
        let err = AudioBuffer::new(44100, vec![vec![0.0; 10], vec![0.0; 9]]).unwrap_err();
        assert!(matches!(err, SynthesisError::RenderFailure { .. }));
        assert!(AudioBuffer::new(44100, vec![]).is_err());
        assert!(AudioBuffer::new(0, vec![vec![0.0]]).is_err());
    }

    #[test]
    fn test_buffer_accessors() {
        let buffer = AudioBuffer::stereo(1000, vec![0.1; 500], vec![0.2; 500]).unwrap();
        assert_eq!(buffer.frames(), 500);
        assert_eq!(buffer.channel_count(), 2);
        assert!((buffer.duration_seconds() - 0.5).abs() < 1e-12);
        assert_eq!(buffer.format(), SampleFormat::new(1000, 2));
        assert_eq!(buffer.channel(1)[0], 0.2);
    }

    #[test]
    fn test_ensure_same_format() {
        let a = AudioBuffer::silent(44100, 2, 10).unwrap();
        let b = AudioBuffer::silent(48000, 2, 10).unwrap();
        let c = AudioBuffer::silent(44100, 2, 3).unwrap();
        assert!(a.ensure_same_format(&b, "test").is_err());
        assert!(a.ensure_same_format(&c, "test").is_ok());
    }

    #[test]
    fn test_background_kind_parse() {
        assert_eq!("rain".parse::<BackgroundKind>(), Ok(BackgroundKind::Rain));
        assert_eq!(" Sea ".parse::<BackgroundKind>(), Ok(BackgroundKind::Sea));
        assert!("forest".parse::<BackgroundKind>().is_err());
        assert_eq!(BackgroundKind::Water.to_string(), "water");
    }

    #[test]
    fn test_background_kind_serde() {
        let json = serde_json::to_string(&BackgroundKind::Sea).unwrap();
        assert_eq!(json, "\"sea\"");
        let kind: BackgroundKind = serde_json::from_str("\"water\"").unwrap();
        assert_eq!(kind, BackgroundKind::Water);
    }

    #[test]
    fn test_library_lookup() {
        let library = SampleLibrary::new()
            .with_background(BackgroundKind::Rain, AudioBuffer::silent(1000, 1, 4).unwrap())
            .with_bell(AudioBuffer::silent(1000, 1, 2).unwrap());

        assert!(library.background(BackgroundKind::Rain).is_some());
        assert!(library.background(BackgroundKind::Sea).is_none());
        assert_eq!(library.bell().map(AudioBuffer::frames), Some(2));
        assert_eq!(library.loaded_backgrounds(), vec![BackgroundKind::Rain]);
    }
}
