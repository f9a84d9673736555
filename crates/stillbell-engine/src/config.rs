//! Engine configuration.
//!
//! Every field has a default matching the product's behaviour, so an empty
//! JSON object (`{}`) is a valid configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or validating an [`EngineConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid JSON for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A field holds an out-of-range value.
    #[error("invalid config field '{field}': {message}")]
    Invalid {
        /// Dotted field path.
        field: String,
        /// What is wrong with it.
        message: String,
    },
}

impl ConfigError {
    fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Background bed gain automation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackgroundEnvelopeConfig {
    /// Ramp from silence at the start of the track.
    pub fade_in_seconds: f64,
    /// Ramp to silence at the end of the track.
    pub fade_out_seconds: f64,
    /// How long before a bell the bed starts ducking.
    pub duck_lead_seconds: f64,
    /// How long the bed stays silent after a bell starts.
    pub duck_hold_seconds: f64,
    /// Ramp back to full level after the hold.
    pub duck_release_seconds: f64,
    /// Static gain applied to the whole bed.
    pub gain: f64,
}

impl BackgroundEnvelopeConfig {
    /// Combined length of the opening and closing fades.
    pub fn fades_seconds(&self) -> f64 {
        self.fade_in_seconds + self.fade_out_seconds
    }
}

impl Default for BackgroundEnvelopeConfig {
    fn default() -> Self {
        Self {
            fade_in_seconds: 2.0,
            fade_out_seconds: 2.0,
            duck_lead_seconds: 1.0,
            duck_hold_seconds: 8.0,
            duck_release_seconds: 1.0,
            gain: 1.0,
        }
    }
}

/// Bell strike shaping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BellConfig {
    /// Cap on the audible strike length.
    pub max_duration_seconds: f64,
    /// Fade in and fade out length.
    pub fade_seconds: f64,
    /// Static gain applied to every strike.
    pub gain: f64,
}

impl Default for BellConfig {
    fn default() -> Self {
        Self {
            max_duration_seconds: 8.0,
            fade_seconds: 1.0,
            gain: 1.0,
        }
    }
}

/// Loop seam crossfade lengths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CrossfadeConfig {
    /// Upper bound for the single-chunk crossfade.
    pub max_seconds: f64,
    /// Single-chunk crossfade as a fraction of the ambience sample length.
    pub fraction_of_sample: f64,
    /// Crossfade used when the track is rendered in several chunks.
    pub streaming_seconds: f64,
}

impl Default for CrossfadeConfig {
    fn default() -> Self {
        Self {
            max_seconds: 2.0,
            fraction_of_sample: 0.1,
            streaming_seconds: 0.1,
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Shortest track the engine accepts.
    pub min_duration_seconds: f64,
    /// Longest window rendered in one piece. Longer tracks are chunked.
    pub max_chunk_seconds: f64,
    /// Render chunks on the rayon thread pool.
    pub parallel_chunks: bool,
    /// Background automation.
    pub background: BackgroundEnvelopeConfig,
    /// Bell shaping.
    pub bell: BellConfig,
    /// Loop seam crossfades.
    pub crossfade: CrossfadeConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_duration_seconds: 120.0,
            max_chunk_seconds: 300.0,
            parallel_chunks: false,
            background: BackgroundEnvelopeConfig::default(),
            bell: BellConfig::default(),
            crossfade: CrossfadeConfig::default(),
        }
    }
}

/// Bells never start closer than this to each other or to either end of
/// the track.
const BELL_SPACING_SECONDS: f64 = 60.0;

impl EngineConfig {
    /// Shortest track whose background fades do not overlap.
    ///
    /// This is `min_duration_seconds`, raised to the fade lengths when an
    /// unvalidated config sets it lower.
    pub fn shortest_track_seconds(&self) -> f64 {
        self.min_duration_seconds.max(self.background.fades_seconds())
    }

    /// Parses and validates a JSON config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Checks every field is in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("min_duration_seconds", self.min_duration_seconds)?;
        positive("max_chunk_seconds", self.max_chunk_seconds)?;

        let bg = &self.background;
        non_negative("background.fade_in_seconds", bg.fade_in_seconds)?;
        non_negative("background.fade_out_seconds", bg.fade_out_seconds)?;
        positive("background.duck_lead_seconds", bg.duck_lead_seconds)?;
        positive("background.duck_hold_seconds", bg.duck_hold_seconds)?;
        positive("background.duck_release_seconds", bg.duck_release_seconds)?;
        unit_interval("background.gain", bg.gain)?;
        if self.min_duration_seconds < bg.fades_seconds() {
            return Err(ConfigError::invalid(
                "min_duration_seconds",
                format!(
                    "must be at least the background fades ({}s), got {}",
                    bg.fades_seconds(),
                    self.min_duration_seconds
                ),
            ));
        }
        let duck_span = bg.duck_lead_seconds + bg.duck_hold_seconds + bg.duck_release_seconds;
        for (field, span) in [
            ("background.fade_in_seconds", bg.fade_in_seconds + bg.duck_lead_seconds),
            ("background.duck_hold_seconds", duck_span),
            (
                "background.fade_out_seconds",
                bg.duck_hold_seconds + bg.duck_release_seconds + bg.fade_out_seconds,
            ),
        ] {
            if span >= BELL_SPACING_SECONDS {
                return Err(ConfigError::invalid(
                    field,
                    format!(
                        "background automation spans {}s, must stay under the {}s bell spacing",
                        span, BELL_SPACING_SECONDS
                    ),
                ));
            }
        }

        positive("bell.max_duration_seconds", self.bell.max_duration_seconds)?;
        positive("bell.fade_seconds", self.bell.fade_seconds)?;
        unit_interval("bell.gain", self.bell.gain)?;

        non_negative("crossfade.max_seconds", self.crossfade.max_seconds)?;
        if !(0.0..=0.5).contains(&self.crossfade.fraction_of_sample) {
            return Err(ConfigError::invalid(
                "crossfade.fraction_of_sample",
                format!("must be within [0, 0.5], got {}", self.crossfade.fraction_of_sample),
            ));
        }
        non_negative("crossfade.streaming_seconds", self.crossfade.streaming_seconds)?;

        Ok(())
    }
}

fn positive(field: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::invalid(field, format!("must be positive, got {}", value)));
    }
    Ok(())
}

fn non_negative(field: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::invalid(
            field,
            format!("must be non-negative, got {}", value),
        ));
    }
    Ok(())
}

fn unit_interval(field: &str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::invalid(
            field,
            format!("must be within [0, 1], got {}", value),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_json_is_default() {
        let config = EngineConfig::from_json("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = EngineConfig::from_json(
            r#"{ "max_chunk_seconds": 60, "bell": { "gain": 0.8 }, "parallel_chunks": true }"#,
        )
        .unwrap();
        assert_eq!(config.max_chunk_seconds, 60.0);
        assert_eq!(config.bell.gain, 0.8);
        assert_eq!(config.bell.fade_seconds, 1.0);
        assert!(config.parallel_chunks);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = EngineConfig::from_json(r#"{ "max_chunk": 60 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_out_of_range_rejected() {
        let err = EngineConfig::from_json(r#"{ "max_chunk_seconds": 0 }"#).unwrap_err();
        match err {
            ConfigError::Invalid { field, .. } => assert_eq!(field, "max_chunk_seconds"),
            other => panic!("unexpected error: {other}"),
        }

        let err = EngineConfig::from_json(r#"{ "background": { "gain": 1.5 } }"#).unwrap_err();
        assert!(err.to_string().contains("background.gain"));
    }

    #[test]
    fn test_min_duration_must_cover_fades() {
        let err = EngineConfig::from_json(r#"{ "min_duration_seconds": 3 }"#).unwrap_err();
        match err {
            ConfigError::Invalid { field, .. } => assert_eq!(field, "min_duration_seconds"),
            other => panic!("unexpected error: {other}"),
        }

        let config = EngineConfig::from_json(r#"{ "min_duration_seconds": 4 }"#).unwrap();
        assert_eq!(config.shortest_track_seconds(), 4.0);
    }

    #[test]
    fn test_shortest_track_ignores_lower_minimum() {
        let config = EngineConfig {
            min_duration_seconds: 3.0,
            ..EngineConfig::default()
        };
        assert_eq!(config.shortest_track_seconds(), 4.0);
    }

    #[test]
    fn test_ducking_must_fit_between_bells() {
        let err = EngineConfig::from_json(r#"{ "background": { "duck_hold_seconds": 58 } }"#)
            .unwrap_err();
        assert!(err.to_string().contains("background.duck_hold_seconds"));

        let err = EngineConfig::from_json(r#"{ "background": { "fade_out_seconds": 51 } }"#)
            .unwrap_err();
        assert!(err.to_string().contains("background.fade_out_seconds"));
    }

    #[test]
    fn test_serialize_roundtrip() {
        let config = EngineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(EngineConfig::from_json(&json).unwrap(), config);
    }
}
