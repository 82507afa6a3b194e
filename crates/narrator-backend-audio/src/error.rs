//! Error types for the audio backend.

use narrator_script::CodedError;
use thiserror::Error;

/// Result type for audio operations.
pub type AudioResult<T> = Result<T, AudioError>;

/// Errors that can occur while decoding, assembling or encoding audio.
#[derive(Debug, Error)]
pub enum AudioError {
    /// Payload could not be decoded into samples.
    #[error("failed to decode audio: {message}")]
    Decode {
        /// Error message.
        message: String,
    },

    /// WAV payload uses an encoding the decoder does not handle.
    #[error("unsupported WAV encoding: {bits} bit {format}")]
    UnsupportedEncoding {
        /// Bits per sample.
        bits: u16,
        /// "int" or "float".
        format: &'static str,
    },

    /// A buffer in a concatenation does not match the first buffer's format.
    #[error(
        "buffer {index} has {found_channels} channel(s) at {found_rate} Hz, expected {expected_channels} at {expected_rate} Hz"
    )]
    FormatMismatch {
        /// Position of the offending buffer.
        index: usize,
        /// Channel count of the first buffer.
        expected_channels: usize,
        /// Sample rate of the first buffer.
        expected_rate: u32,
        /// Channel count found.
        found_channels: usize,
        /// Sample rate found.
        found_rate: u32,
    },

    /// Buffer shape is invalid (no channels, ragged channels, zero rate).
    #[error("invalid audio buffer: {message}")]
    InvalidBuffer {
        /// Error message.
        message: String,
    },

    /// Invalid parameter value.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// Error message.
        message: String,
    },

    /// Error reported by the WAV reader.
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AudioError {
    /// Creates a decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Creates an invalid buffer error.
    pub fn invalid_buffer(message: impl Into<String>) -> Self {
        Self::InvalidBuffer {
            message: message.into(),
        }
    }

    /// Creates an invalid parameter error.
    pub fn invalid_param(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            message: message.into(),
        }
    }
}

impl CodedError for AudioError {
    fn code(&self) -> &'static str {
        match self {
            AudioError::Decode { .. } => "AUDIO_001",
            AudioError::UnsupportedEncoding { .. } => "AUDIO_002",
            AudioError::FormatMismatch { .. } => "AUDIO_003",
            AudioError::InvalidBuffer { .. } => "AUDIO_004",
            AudioError::InvalidParameter { .. } => "AUDIO_005",
            AudioError::Wav(_) => "AUDIO_006",
            AudioError::Io(_) => "AUDIO_007",
        }
    }

    fn category(&self) -> &'static str {
        "audio"
    }
}
