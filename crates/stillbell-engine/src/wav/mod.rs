//! Deterministic WAV encoder.
//!
//! Writes 16-bit PCM WAV files with a fixed 44-byte header and no timestamps
//! or optional chunks, so identical tracks always encode to identical bytes.
//! The BLAKE3 hash of the PCM data identifies a render.

mod format;
mod pcm;
mod result;
mod writer;


pub use format::WavFormat;
pub use pcm::{compute_pcm_hash, extract_pcm_data};
pub use result::{WavResult, WAV_MIME_TYPE};
pub use writer::{encode, interleave_to_pcm16, quantize, write_wav};
