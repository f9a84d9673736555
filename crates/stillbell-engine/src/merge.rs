//! Chunk concatenation.

use crate::error::{SynthesisError, SynthesisResult};
use crate::sample::{OutputTrack, RenderedChunk};

/// Concatenates rendered chunks, in order, into one track.
///
/// All chunks must share the first chunk's sample rate and channel count. No
/// sample is altered on the way through.
pub fn merge_chunks(chunks: Vec<RenderedChunk>) -> SynthesisResult<OutputTrack> {
    let mut iter = chunks.into_iter();
    let Some(first) = iter.next() else {
        return Err(SynthesisError::render("no chunks to merge"));
    };

    let rest: Vec<RenderedChunk> = iter.collect();
    if rest.is_empty() {
        return Ok(first);
    }

    for (i, chunk) in rest.iter().enumerate() {
        first.ensure_same_format(chunk, &format!("chunk {}", i + 1))?;
    }

    let total_frames = first.frames() + rest.iter().map(RenderedChunk::frames).sum::<usize>();
    let sample_rate = first.sample_rate();
    let mut channels: Vec<Vec<f32>> = first.into_channels();
    for channel in &mut channels {
        channel.reserve_exact(total_frames - channel.len());
    }

    for chunk in rest {
        for (out, data) in channels.iter_mut().zip(chunk.into_channels()) {
            out.extend_from_slice(&data);
        }
    }

    OutputTrack::new(sample_rate, channels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::SampleFormat;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_input_fails() {
        let err = merge_chunks(Vec::new()).unwrap_err();
        assert!(matches!(err, SynthesisError::RenderFailure { .. }));
    }

    #[test]
    fn test_single_chunk_passes_through() {
        let chunk = RenderedChunk::stereo(1000, vec![0.1, 0.2], vec![0.3, 0.4]).unwrap();
        let merged = merge_chunks(vec![chunk.clone()]).unwrap();
        assert_eq!(merged, chunk);
    }

    #[test]
    fn test_concatenates_in_order() {
        let a = RenderedChunk::stereo(1000, vec![1.0, 2.0], vec![-1.0, -2.0]).unwrap();
        let b = RenderedChunk::stereo(1000, vec![3.0], vec![-3.0]).unwrap();
        let c = RenderedChunk::stereo(1000, vec![4.0, 5.0, 6.0], vec![-4.0, -5.0, -6.0]).unwrap();

        let merged = merge_chunks(vec![a, b, c]).unwrap();
        assert_eq!(merged.frames(), 6);
        assert_eq!(merged.channel(0), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(merged.channel(1), &[-1.0, -2.0, -3.0, -4.0, -5.0, -6.0]);
    }

    #[test]
    fn test_rate_mismatch_rejected() {
        let a = RenderedChunk::mono(44100, vec![0.0; 4]).unwrap();
        let b = RenderedChunk::mono(48000, vec![0.0; 4]).unwrap();

        match merge_chunks(vec![a, b]).unwrap_err() {
            SynthesisError::FormatMismatch {
                context,
                expected,
                found,
            } => {
                assert_eq!(context, "chunk 1");
                assert_eq!(expected, SampleFormat::new(44100, 1));
                assert_eq!(found, SampleFormat::new(48000, 1));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_channel_mismatch_rejected() {
        let a = RenderedChunk::stereo(1000, vec![0.0], vec![0.0]).unwrap();
        let b = RenderedChunk::mono(1000, vec![0.0]).unwrap();
        assert!(matches!(
            merge_chunks(vec![a, b]),
            Err(SynthesisError::FormatMismatch { .. })
        ));
    }
}
