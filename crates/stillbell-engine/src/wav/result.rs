//! WAV encoding result type.

use serde::Serialize;

use crate::error::SynthesisResult;
use crate::sample::OutputTrack;

use super::format::WavFormat;
use super::writer::{interleave_to_pcm16, write_to_vec};

/// MIME label of the encoded output.
pub const WAV_MIME_TYPE: &str = "audio/wav";

/// A finished, encoded track.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WavResult {
    /// Complete WAV file bytes.
    #[serde(skip)]
    pub wav_data: Vec<u8>,
    /// BLAKE3 hash of the PCM data only.
    pub pcm_hash: String,
    /// Number of channels.
    pub channels: usize,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Frames per channel.
    pub num_frames: usize,
}

impl WavResult {
    /// Encodes `track` and hashes its PCM.
    pub fn from_track(track: &OutputTrack) -> SynthesisResult<Self> {
        let format = WavFormat::for_track(track.format())?;
        let pcm = interleave_to_pcm16(track.channels());
        let pcm_hash = blake3::hash(&pcm).to_hex().to_string();
        let wav_data = write_to_vec(&format, &pcm)?;

        Ok(Self {
            wav_data,
            pcm_hash,
            channels: track.channel_count(),
            sample_rate: track.sample_rate(),
            num_frames: track.frames(),
        })
    }

    /// Always `audio/wav`.
    pub fn mime_type(&self) -> &'static str {
        WAV_MIME_TYPE
    }

    /// Duration in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.num_frames as f64 / self.sample_rate as f64
    }
}
