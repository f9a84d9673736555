//! JSON output types for machine-readable CLI output.
//!
//! Every command accepts `--json` and then prints exactly one of these
//! documents to stdout instead of colored text.

use serde::{Deserialize, Serialize};
use stillbell_engine::{SynthesisError, Timeline, WavResult};

/// Error codes for CLI operations.
///
/// These codes are stable. Engine failures pass through their own
/// `SYNTH_XXX` codes.
pub mod error_codes {
    /// File could not be read or decoded
    pub const FILE_READ: &str = "CLI_001";
    /// File could not be written
    pub const FILE_WRITE: &str = "CLI_002";
    /// Engine config could not be loaded or is invalid
    pub const CONFIG: &str = "CLI_003";
    /// Unknown background identifier
    pub const UNKNOWN_BACKGROUND: &str = "CLI_004";
    /// Input is not a WAV file
    pub const NOT_WAV: &str = "CLI_005";
    /// Render worker could not be started
    pub const WORKER: &str = "CLI_006";
}

/// A structured error in JSON output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonError {
    /// Stable error code (e.g., "CLI_001", "SYNTH_002")
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Related file path (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Error category: "request" or "internal" for engine errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl JsonError {
    /// Creates a new error with code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            file: None,
            category: None,
        }
    }

    /// Sets the file path for this error.
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }
}

impl From<&SynthesisError> for JsonError {
    fn from(err: &SynthesisError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
            file: None,
            category: Some(err.category().to_string()),
        }
    }
}

/// Output of `stillbell render --json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderOutput {
    /// Whether the track was rendered and written
    pub success: bool,
    /// Errors encountered
    pub errors: Vec<JsonError>,
    /// Render details (on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<RenderResult>,
}

impl RenderOutput {
    /// Creates a success output.
    pub fn success(result: RenderResult) -> Self {
        Self {
            success: true,
            errors: Vec::new(),
            result: Some(result),
        }
    }

    /// Creates a failure output.
    pub fn failure(errors: Vec<JsonError>) -> Self {
        Self {
            success: false,
            errors,
            result: None,
        }
    }
}

/// Details of a finished render.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderResult {
    /// Output file path
    pub output: String,
    /// Ambience bed used
    pub background: String,
    /// Track length in seconds
    pub duration_seconds: f64,
    /// MIME type of the output
    pub mime_type: String,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: usize,
    /// Frames per channel
    pub num_frames: usize,
    /// BLAKE3 hash of the PCM data
    pub pcm_hash: String,
    /// File size in bytes
    pub bytes: usize,
    /// Wall-clock render time in milliseconds
    pub duration_ms: u64,
}

impl RenderResult {
    /// Builds the result from an encoded track.
    pub fn from_wav(
        output: &str,
        background: &str,
        wav: &WavResult,
        duration_ms: u64,
    ) -> Self {
        Self {
            output: output.to_string(),
            background: background.to_string(),
            duration_seconds: wav.duration_seconds(),
            mime_type: wav.mime_type().to_string(),
            sample_rate: wav.sample_rate,
            channels: wav.channels,
            num_frames: wav.num_frames,
            pcm_hash: wav.pcm_hash.clone(),
            bytes: wav.wav_data.len(),
            duration_ms,
        }
    }
}

/// Output of `stillbell plan --json`.
#[derive(Debug, Clone, Serialize)]
pub struct PlanOutput {
    /// Whether planning succeeded
    pub success: bool,
    /// Errors encountered
    pub errors: Vec<JsonError>,
    /// The planned timeline (on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeline: Option<Timeline>,
}

/// Output of `stillbell inspect --json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectOutput {
    /// Whether the file could be inspected
    pub success: bool,
    /// Errors encountered
    pub errors: Vec<JsonError>,
    /// File details (on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<InspectResult>,
}

/// Details of an inspected WAV file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InspectResult {
    /// Input file path
    pub input: String,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
    /// Bits per sample
    pub bits_per_sample: u16,
    /// Frames per channel
    pub num_frames: u32,
    /// Duration in seconds
    pub duration_seconds: f64,
    /// BLAKE3 hash of the PCM data
    pub pcm_hash: String,
}
