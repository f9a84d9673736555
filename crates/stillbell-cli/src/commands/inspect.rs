//! Inspect command implementation
//!
//! Reports the format, length and PCM hash of a WAV file.

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::io::Cursor;
use std::process::ExitCode;

use stillbell_engine::wav::compute_pcm_hash;

use super::json_output::{error_codes, InspectOutput, InspectResult, JsonError};

/// Run the inspect command
///
/// # Arguments
/// * `input` - Path to the WAV file
/// * `json_output` - Whether to output machine-readable JSON
pub fn run(input: &str, json_output: bool) -> Result<ExitCode> {
    let result = match fs::read(input)
        .with_context(|| format!("Failed to read '{}'", input))
        .map_err(|e| (error_codes::FILE_READ, e))
        .and_then(|data| inspect_bytes(input, &data).map_err(|e| (error_codes::NOT_WAV, e)))
    {
        Ok(result) => result,
        Err((code, e)) => {
            if json_output {
                let output = InspectOutput {
                    success: false,
                    errors: vec![JsonError::new(code, format!("{:#}", e)).with_file(input)],
                    result: None,
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
                return Ok(ExitCode::from(1));
            }
            return Err(e);
        }
    };

    if json_output {
        let output = InspectOutput {
            success: true,
            errors: Vec::new(),
            result: Some(result),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{} {}", "Inspecting:".cyan().bold(), result.input);
        println!("  {} {} Hz", "Sample rate:".dimmed(), result.sample_rate);
        println!("  {} {}", "Channels:".dimmed(), result.channels);
        println!("  {} {}", "Bits:".dimmed(), result.bits_per_sample);
        println!(
            "  {} {} ({:.2}s)",
            "Frames:".dimmed(),
            result.num_frames,
            result.duration_seconds
        );
        println!("  {} {}", "PCM hash:".dimmed(), result.pcm_hash);
    }

    Ok(ExitCode::SUCCESS)
}

/// Reads WAV header fields and hashes the PCM data.
pub fn inspect_bytes(input: &str, data: &[u8]) -> Result<InspectResult> {
    let reader = hound::WavReader::new(Cursor::new(data)).context("Not a valid WAV file")?;
    let spec = reader.spec();
    let num_frames = reader.duration();
    let pcm_hash = compute_pcm_hash(data).context("WAV file has no data chunk")?;

    Ok(InspectResult {
        input: input.to_string(),
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        bits_per_sample: spec.bits_per_sample,
        num_frames,
        duration_seconds: num_frames as f64 / spec.sample_rate as f64,
        pcm_hash,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use stillbell_engine::{OutputTrack, WavResult};

    #[test]
    fn test_inspect_encoded_track() {
        let track = OutputTrack::stereo(8000, vec![0.1; 4000], vec![-0.1; 4000]).unwrap();
        let wav = WavResult::from_track(&track).unwrap();

        let result = inspect_bytes("track.wav", &wav.wav_data).unwrap();
        assert_eq!(result.sample_rate, 8000);
        assert_eq!(result.channels, 2);
        assert_eq!(result.bits_per_sample, 16);
        assert_eq!(result.num_frames, 4000);
        assert_eq!(result.duration_seconds, 0.5);
        assert_eq!(result.pcm_hash, wav.pcm_hash);
    }

    #[test]
    fn test_inspect_rejects_non_wav() {
        assert!(inspect_bytes("x", b"hello world").is_err());
    }
}
