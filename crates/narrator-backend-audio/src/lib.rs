//! Narrator Audio Backend
//!
//! Turns synthesized speech payloads into one deterministic WAV file:
//!
//! 1. [`decode`] each payload into an [`AudioBuffer`]
//! 2. [`concatenate`] the buffers in script order
//! 3. optionally [`mix`] a looped background track underneath
//! 4. encode with [`wav::encode_wav`] (or [`WavResult::from_buffer`] to also
//!    get the PCM hash)
//!
//! # Example
//!
//! ```
//! use narrator_backend_audio::{concatenate, decode_audio, wav, DecodeOptions};
//!
//! let opts = DecodeOptions::default();
//! let a = decode_audio(&vec![0u8; 6000], &opts).unwrap();
//! let b = decode_audio(&vec![0u8; 6000], &opts).unwrap();
//!
//! let story = concatenate(&[a, b]).unwrap();
//! let bytes = wav::encode_wav(&story).unwrap();
//! assert_eq!(bytes.len(), 44 + 6000 * 2);
//! ```

pub mod assemble;
pub mod buffer;
pub mod decode;
pub mod error;
pub mod wav;

pub use assemble::{concatenate, mix, DEFAULT_BACKGROUND_LEVEL};
pub use buffer::{AudioBuffer, DEFAULT_SAMPLE_RATE};
pub use decode::{decode_audio, decode_raw_pcm16, decode_wav, is_wav, DecodeOptions};
pub use error::{AudioError, AudioResult};
pub use wav::{encode_wav, parse_wav_header, WavFormat, WavHeader, WavResult};
