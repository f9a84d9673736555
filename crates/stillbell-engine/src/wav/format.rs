//! WAV file format parameters.

use crate::error::{SynthesisError, SynthesisResult};
use crate::sample::SampleFormat;

/// WAV file format parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavFormat {
    /// Number of channels.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bits per sample (always 16 here).
    pub bits_per_sample: u16,
}

impl WavFormat {
    /// Creates a 16-bit format.
    pub fn pcm16(channels: u16, sample_rate: u32) -> Self {
        Self {
            channels,
            sample_rate,
            bits_per_sample: 16,
        }
    }

    /// Maps a buffer format onto WAV header fields.
    pub fn for_track(format: SampleFormat) -> SynthesisResult<Self> {
        let channels = u16::try_from(format.channel_count).map_err(|_| {
            SynthesisError::render(format!(
                "{} channels do not fit a WAV header",
                format.channel_count
            ))
        })?;
        let wav = Self::pcm16(channels, format.sample_rate);
        if wav.byte_rate().is_none() {
            return Err(SynthesisError::render(format!(
                "byte rate for {} does not fit a WAV header",
                format
            )));
        }
        Ok(wav)
    }

    /// Bytes per sample (per channel).
    pub(crate) fn bytes_per_sample(&self) -> u16 {
        self.bits_per_sample / 8
    }

    /// Bytes per frame, or `None` on overflow.
    pub(crate) fn block_align(&self) -> Option<u16> {
        self.channels.checked_mul(self.bytes_per_sample())
    }

    /// Bytes per second, or `None` on overflow.
    pub(crate) fn byte_rate(&self) -> Option<u32> {
        self.sample_rate.checked_mul(self.block_align()? as u32)
    }
}
