//! WAV sample loading.
//!
//! Decodes ambience and bell files with `hound` into the engine's planar
//! [`AudioSample`] buffers. The engine itself never touches files.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use stillbell_engine::{AudioSample, BackgroundKind, SampleLibrary};

/// Path of the ambience file for `kind` inside `samples_dir`.
pub fn background_path(samples_dir: &Path, kind: BackgroundKind) -> PathBuf {
    samples_dir.join(format!("{}.wav", kind.as_str()))
}

/// Decodes a WAV file.
pub fn load_wav_sample(path: &Path) -> Result<AudioSample> {
    let file =
        File::open(path).with_context(|| format!("Failed to open WAV file '{}'", path.display()))?;
    decode_wav(BufReader::new(file))
        .with_context(|| format!("Failed to decode WAV file '{}'", path.display()))
}

/// Decodes WAV data from any reader into planar `f32` channels.
///
/// Integer PCM of 8, 16, 24 or 32 bits and 32-bit float are supported.
pub fn decode_wav<R: Read>(reader: R) -> Result<AudioSample> {
    let reader = hound::WavReader::new(reader)?;
    let spec = reader.spec();
    let channels = spec.channels as usize;
    if channels == 0 {
        bail!("WAV file declares zero channels");
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Int => {
            if !matches!(spec.bits_per_sample, 8 | 16 | 24 | 32) {
                bail!(
                    "unsupported bit depth: {} bits (supported: 8, 16, 24, 32)",
                    spec.bits_per_sample
                );
            }
            let max_value = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_value))
                .collect::<Result<_, _>>()?
        }
        hound::SampleFormat::Float => reader.into_samples::<f32>().collect::<Result<_, _>>()?,
    };

    let frames = interleaved.len() / channels;
    let mut planar = vec![Vec::with_capacity(frames); channels];
    for frame in interleaved.chunks_exact(channels) {
        for (channel, &sample) in planar.iter_mut().zip(frame) {
            channel.push(sample);
        }
    }

    Ok(AudioSample::new(spec.sample_rate, planar)?)
}

/// Loads the requested ambience beds and the bell into a [`SampleLibrary`].
///
/// Files that do not exist are left out of the library, so the engine can
/// report exactly which sample is missing. Files that exist but cannot be
/// decoded are an error.
pub fn load_library(
    samples_dir: &Path,
    backgrounds: &[BackgroundKind],
    bell_path: &Path,
) -> Result<SampleLibrary> {
    let mut library = SampleLibrary::new();

    for &kind in backgrounds {
        let path = background_path(samples_dir, kind);
        if path.is_file() {
            library.insert_background(kind, load_wav_sample(&path)?);
        }
    }
    if bell_path.is_file() {
        library.set_bell(load_wav_sample(bell_path)?);
    }

    Ok(library)
}
