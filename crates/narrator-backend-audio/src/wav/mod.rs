//! Deterministic WAV encoding.
//!
//! Output is always 16-bit integer PCM with a fixed 44-byte header: no
//! timestamps, no LIST chunks, nothing that varies between runs. The BLAKE3
//! hash of the PCM payload identifies a render independent of the header.

mod format;
mod header;
mod pcm;
mod result;
mod writer;


pub use format::WavFormat;
pub use header::{parse_wav_header, WavHeader, WAV_HEADER_LEN};
pub use pcm::{compute_pcm_hash, extract_pcm_data};
pub use result::WavResult;
pub use writer::{buffer_to_pcm16, encode_wav, quantize_sample, write_wav, write_wav_to_vec};
