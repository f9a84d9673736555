//! WAV writing and PCM conversion.

use std::io::{self, Write};

use crate::error::{SynthesisError, SynthesisResult};
use crate::sample::OutputTrack;

use super::format::WavFormat;

/// Size of the fixed RIFF/fmt/data header.
pub(crate) const HEADER_LEN: usize = 44;

/// Writes a complete WAV file: header followed by `pcm_data`.
pub fn write_wav<W: Write>(writer: &mut W, format: &WavFormat, pcm_data: &[u8]) -> io::Result<()> {
    let too_large = || io::Error::new(io::ErrorKind::InvalidInput, "PCM data too large for WAV");
    let data_size = u32::try_from(pcm_data.len()).map_err(|_| too_large())?;
    // Total file size minus the 8-byte RIFF preamble.
    let file_size = data_size.checked_add(36).ok_or_else(too_large)?;
    let block_align = format.block_align().ok_or_else(too_large)?;
    let byte_rate = format.byte_rate().ok_or_else(too_large)?;

    // RIFF header
    writer.write_all(b"RIFF")?;
    writer.write_all(&file_size.to_le_bytes())?;
    writer.write_all(b"WAVE")?;

    // fmt chunk
    writer.write_all(b"fmt ")?;
    writer.write_all(&16u32.to_le_bytes())?;
    writer.write_all(&1u16.to_le_bytes())?; // PCM
    writer.write_all(&format.channels.to_le_bytes())?;
    writer.write_all(&format.sample_rate.to_le_bytes())?;
    writer.write_all(&byte_rate.to_le_bytes())?;
    writer.write_all(&block_align.to_le_bytes())?;
    writer.write_all(&format.bits_per_sample.to_le_bytes())?;

    // data chunk
    writer.write_all(b"data")?;
    writer.write_all(&data_size.to_le_bytes())?;
    writer.write_all(pcm_data)?;

    Ok(())
}

/// Clamps to `[-1, 1]` and scales to a signed 16-bit value.
#[inline]
pub fn quantize(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * 32767.0).round() as i16
}

/// Interleaves planar channels into little-endian 16-bit PCM bytes.
///
/// Channels are read up to the length of the shortest one.
pub fn interleave_to_pcm16(channels: &[Vec<f32>]) -> Vec<u8> {
    let frames = channels.iter().map(Vec::len).min().unwrap_or(0);
    let mut pcm = Vec::with_capacity(frames * channels.len() * 2);

    for n in 0..frames {
        for channel in channels {
            pcm.extend_from_slice(&quantize(channel[n]).to_le_bytes());
        }
    }

    pcm
}

/// Encodes a track as a complete WAV file.
pub fn encode(track: &OutputTrack) -> SynthesisResult<Vec<u8>> {
    let format = WavFormat::for_track(track.format())?;
    let pcm = interleave_to_pcm16(track.channels());
    write_to_vec(&format, &pcm)
}

pub(crate) fn write_to_vec(format: &WavFormat, pcm: &[u8]) -> SynthesisResult<Vec<u8>> {
    let mut buffer = Vec::with_capacity(HEADER_LEN + pcm.len());
    write_wav(&mut buffer, format, pcm)
        .map_err(|e| SynthesisError::render(format!("failed to write WAV: {}", e)))?;
    Ok(buffer)
}
