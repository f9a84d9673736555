//! Error types for the synthesis engine.

use std::fmt;

use thiserror::Error;

use crate::sample::{BackgroundKind, SampleFormat};

/// Result type for synthesis operations.
pub type SynthesisResult<T> = Result<T, SynthesisError>;

/// Which input sample a [`SynthesisError::MissingSample`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleRole {
    /// The looping ambience bed for the given background kind.
    Background(BackgroundKind),
    /// The bell strike.
    Bell,
}

impl fmt::Display for SampleRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleRole::Background(kind) => write!(f, "background '{}'", kind),
            SampleRole::Bell => write!(f, "bell"),
        }
    }
}

/// Errors that can abort a synthesis request.
///
/// Every variant is fatal for the current request: no partial output is ever
/// returned alongside one of these.
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// A required sample was not supplied by the sample source.
    #[error("{role} sample is not loaded")]
    MissingSample {
        /// The sample that was requested.
        role: SampleRole,
    },

    /// The requested duration is non-positive or below the configured minimum.
    #[error("invalid duration: {duration_seconds} seconds (minimum is {minimum_seconds} seconds)")]
    InvalidDuration {
        /// The requested duration.
        duration_seconds: f64,
        /// The configured minimum.
        minimum_seconds: f64,
    },

    /// Sample rate or channel count disagree between inputs or chunks.
    #[error("format mismatch in {context}: expected {expected}, found {found}")]
    FormatMismatch {
        /// Where the mismatch was detected.
        context: String,
        /// The reference format.
        expected: SampleFormat,
        /// The offending format.
        found: SampleFormat,
    },

    /// Envelope breakpoints were not strictly increasing in time.
    #[error(
        "{envelope} envelope breakpoint {index} at {time}s does not follow previous breakpoint at {previous}s"
    )]
    EnvelopeOrderingViolation {
        /// Which envelope was being built.
        envelope: String,
        /// Index of the offending breakpoint.
        index: usize,
        /// Time of the preceding breakpoint.
        previous: f64,
        /// Time of the offending breakpoint.
        time: f64,
    },

    /// The mixing or encoding step failed.
    #[error("render failure: {message}")]
    RenderFailure {
        /// Error message.
        message: String,
    },
}

impl SynthesisError {
    /// Creates a render failure.
    pub fn render(message: impl Into<String>) -> Self {
        Self::RenderFailure {
            message: message.into(),
        }
    }

    /// Creates a format mismatch error.
    pub fn format_mismatch(
        context: impl Into<String>,
        expected: SampleFormat,
        found: SampleFormat,
    ) -> Self {
        Self::FormatMismatch {
            context: context.into(),
            expected,
            found,
        }
    }

    /// Stable error code.
    pub fn code(&self) -> &'static str {
        match self {
            SynthesisError::MissingSample { .. } => "SYNTH_001",
            SynthesisError::InvalidDuration { .. } => "SYNTH_002",
            SynthesisError::FormatMismatch { .. } => "SYNTH_003",
            SynthesisError::EnvelopeOrderingViolation { .. } => "SYNTH_004",
            SynthesisError::RenderFailure { .. } => "SYNTH_005",
        }
    }

    /// Whether the person making the request can fix this by changing their input.
    pub fn is_user_actionable(&self) -> bool {
        matches!(
            self,
            SynthesisError::MissingSample { .. } | SynthesisError::InvalidDuration { .. }
        )
    }

    /// Coarse category for reporting.
    pub fn category(&self) -> &'static str {
        if self.is_user_actionable() {
            "request"
        } else {
            "internal"
        }
    }
}
