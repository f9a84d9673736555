//! Encoded tracks decode back to the rendered PCM.
//!
//! Uses `hound` as an independent decoder.

use std::io::Cursor;

use pretty_assertions::assert_eq;

use stillbell_engine::wav::{compute_pcm_hash, encode};
use stillbell_engine::{
    AudioBuffer, BackgroundKind, Engine, NoProgress, OutputTrack, SampleLibrary,
    SynthesisRequest, WavResult,
};

fn library(rate: u32) -> SampleLibrary {
    let bed: Vec<f32> = (0..rate as usize * 5)
        .map(|i| ((i as f32) * 0.021).sin() * 0.45)
        .collect();
    let bell: Vec<f32> = (0..rate as usize * 6)
        .map(|i| ((i as f32) * 0.4).sin() * 0.7)
        .collect();
    SampleLibrary::new()
        .with_background(
            BackgroundKind::Sea,
            AudioBuffer::stereo(rate, bed.clone(), bed.iter().map(|s| -s).collect()).unwrap(),
        )
        .with_bell(AudioBuffer::stereo(rate, bell.clone(), bell).unwrap())
}

fn decode(wav: &[u8]) -> (hound::WavSpec, Vec<i16>) {
    let mut reader = hound::WavReader::new(Cursor::new(wav)).unwrap();
    let spec = reader.spec();
    let samples = reader.samples::<i16>().map(|s| s.unwrap()).collect();
    (spec, samples)
}

#[test]
fn synthesized_track_round_trips() {
    let engine = Engine::default();
    let request = SynthesisRequest::from_minutes(BackgroundKind::Sea, 2.0);
    let track = engine
        .render_track(&request, &library(2000), &mut NoProgress)
        .unwrap();
    let result = WavResult::from_track(&track).unwrap();

    let (spec, samples) = decode(&result.wav_data);
    assert_eq!(spec.sample_rate, track.sample_rate());
    assert_eq!(spec.channels as usize, track.channel_count());
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(spec.sample_format, hound::SampleFormat::Int);
    assert_eq!(samples.len(), track.frames() * track.channel_count());

    let channels = track.channel_count();
    for (i, &decoded) in samples.iter().enumerate() {
        let original = track.channel(i % channels)[i / channels].clamp(-1.0, 1.0);
        let error = (decoded as f32 / 32767.0 - original).abs();
        assert!(error <= 1.0 / 32767.0, "sample {i}: error {error}");
    }
}

#[test]
fn out_of_range_samples_are_clamped() {
    let track = OutputTrack::mono(8000, vec![2.5, -4.0, 1.0, -1.0, 0.0]).unwrap();
    let (_, samples) = decode(&encode(&track).unwrap());
    assert_eq!(samples, vec![32767, -32767, 32767, -32767, 0]);
}

#[test]
fn pcm_hash_matches_decoded_data() {
    let track = OutputTrack::stereo(4000, vec![0.3; 100], vec![-0.3; 100]).unwrap();
    let result = WavResult::from_track(&track).unwrap();
    assert_eq!(compute_pcm_hash(&result.wav_data).as_deref(), Some(result.pcm_hash.as_str()));

    let (_, samples) = decode(&result.wav_data);
    let pcm: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
    assert_eq!(blake3::hash(&pcm).to_hex().to_string(), result.pcm_hash);
}
