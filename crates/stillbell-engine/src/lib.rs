//! Stillbell Synthesis Engine
//!
//! Offline renderer for meditation tracks: a short ambience sample looped to
//! any length, bell strikes at computed times, gain automation around them,
//! and a deterministic 16-bit WAV encoder.
//!
//! # Overview
//!
//! A render runs in fixed stages:
//!
//! 1. **Timeline** - bell start times and chunk windows ([`timeline`])
//! 2. **Envelopes** - background fades and ducking, bell fades ([`envelope`])
//! 3. **Rendering** - seamless loop stitching and bell mixing per chunk
//!    ([`stitch`], [`render`])
//! 4. **Merging** - chunk concatenation ([`merge`])
//! 5. **Encoding** - RIFF/WAVE container ([`wav`])
//!
//! Long tracks are split into chunks of at most
//! [`EngineConfig::max_chunk_seconds`]. Loop phase, envelopes and bell offsets
//! are computed on the global timeline, so a chunked render matches a
//! single-window render everywhere outside the loop seam crossfades.
//!
//! # Determinism
//!
//! Rendering uses no randomness and no clock. Identical samples, request and
//! config produce identical WAV bytes, whether chunks are rendered
//! sequentially or in parallel.
//!
//! # Example
//!
//! ```ignore
//! use stillbell_engine::{BackgroundKind, Engine, NoProgress, SampleLibrary, SynthesisRequest};
//!
//! let sources = SampleLibrary::new()
//!     .with_background(BackgroundKind::Rain, rain)
//!     .with_bell(bell);
//! let request = SynthesisRequest::from_minutes(BackgroundKind::Rain, 10.0);
//! let result = Engine::default().synthesize(&request, &sources, &mut NoProgress)?;
//!
//! std::fs::write("session.wav", &result.wav_data)?;
//! println!("PCM hash: {}", result.pcm_hash);
//! ```

pub mod config;
pub mod engine;
pub mod envelope;
pub mod error;
pub mod merge;
pub mod progress;
pub mod render;
pub mod sample;
pub mod stitch;
pub mod timeline;
pub mod wav;
pub mod worker;

// Re-export main types at crate root
pub use config::{ConfigError, EngineConfig};
pub use engine::{Engine, SynthesisRequest, Timeline};
pub use error::{SampleRole, SynthesisError, SynthesisResult};
pub use progress::{NoProgress, Phase, Progress, ProgressSink};
pub use sample::{
    AudioBuffer, AudioSample, BackgroundKind, OutputTrack, RenderedChunk, SampleFormat,
    SampleLibrary, SampleSource,
};
pub use wav::WavResult;
pub use worker::{RenderWorker, WorkerEvent};

#[cfg(test)]
mod integration_tests {
    use super::*;

    fn sources(rate: u32, channels: usize) -> SampleLibrary {
        let bed: Vec<f32> = (0..rate as usize * 4)
            .map(|i| ((i as f32) * 0.013).sin() * 0.4)
            .collect();
        let bell: Vec<f32> = (0..rate as usize * 9)
            .map(|i| ((i as f32) * 0.11).sin() * 0.6)
            .collect();
        SampleLibrary::new()
            .with_background(
                BackgroundKind::Water,
                AudioBuffer::new(rate, vec![bed; channels]).unwrap(),
            )
            .with_bell(AudioBuffer::new(rate, vec![bell; channels]).unwrap())
    }

    #[test]
    fn test_synthesize_is_deterministic() {
        let engine = Engine::default();
        let request = SynthesisRequest::from_minutes(BackgroundKind::Water, 4.0);
        let library = sources(200, 2);

        let a = engine.synthesize(&request, &library, &mut NoProgress).unwrap();
        let b = engine.synthesize(&request, &library, &mut NoProgress).unwrap();

        assert_eq!(a.pcm_hash, b.pcm_hash);
        assert_eq!(a.wav_data, b.wav_data);
    }

    #[test]
    fn test_output_format_follows_background() {
        let engine = Engine::default();
        let request = SynthesisRequest::from_minutes(BackgroundKind::Water, 2.0);
        let result = engine
            .synthesize(&request, &sources(300, 2), &mut NoProgress)
            .unwrap();

        assert_eq!(result.sample_rate, 300);
        assert_eq!(result.channels, 2);
        assert_eq!(result.num_frames, 36_000);
        assert_eq!(result.wav_data.len(), 44 + 36_000 * 2 * 2);
        assert_eq!(result.mime_type(), "audio/wav");
    }

    #[test]
    fn test_track_starts_and_ends_silent() {
        let engine = Engine::default();
        let request = SynthesisRequest::from_minutes(BackgroundKind::Water, 2.0);
        let track = engine
            .render_track(&request, &sources(100, 1), &mut NoProgress)
            .unwrap();

        let ch = track.channel(0);
        assert_eq!(ch[0], 0.0);
        // Last frame is 0.01 s before the end of the fade-out.
        assert!(ch[ch.len() - 1].abs() < 0.01);
    }
}
