//! Error types for synthesis and generation.

use std::path::PathBuf;

use narrator_backend_audio::AudioError;
use narrator_script::CodedError;
use thiserror::Error;

use crate::orchestrator::ProcessingStatus;

/// Result type for synthesis operations.
pub type SynthResult<T> = Result<T, SynthError>;

/// Errors that can occur while synthesizing or assembling a narration.
#[derive(Debug, Error)]
pub enum SynthError {
    /// No synthesizer program could be located.
    #[error("synthesizer not found. Pass --synth-cmd, set NARRATOR_SYNTH_CMD, or install narrator-tts on PATH")]
    SynthesizerNotFound,

    /// Failed to spawn the synthesizer process.
    #[error("failed to spawn synthesizer: {0}")]
    SpawnFailed(#[source] std::io::Error),

    /// Synthesizer process timed out.
    #[error("synthesizer timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// Synthesizer exited with non-zero status.
    #[error("synthesizer exited with status {exit_code}: {stderr}")]
    ProcessFailed { exit_code: i32, stderr: String },

    /// Failed to write the request file.
    #[error("failed to write synthesis request: {0}")]
    WriteRequestFailed(#[source] std::io::Error),

    /// Failed to read the synthesizer's output file.
    #[error("failed to read synthesizer output from {path}: {source}")]
    ReadOutputFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize the request.
    #[error("failed to serialize synthesis request: {0}")]
    SerializeFailed(#[source] serde_json::Error),

    /// The synthesis capability reported an error.
    #[error("speech synthesis failed: {message}")]
    Synthesis { message: String },

    /// The synthesis capability returned no audio.
    #[error("synthesizer returned no audio for voice '{voice_id}'")]
    EmptyPayload { voice_id: String },

    /// Returned audio could not be decoded.
    #[error("failed to decode synthesized audio: {0}")]
    Decode(#[source] AudioError),

    /// Per-line audio could not be assembled or encoded.
    #[error("failed to assemble narration: {0}")]
    Assembly(#[source] AudioError),

    /// Speaker has no voice configuration.
    #[error("speaker '{name}' has no voice configuration")]
    UnknownSpeaker { name: String },

    /// Operation not allowed in the run's current state.
    #[error("cannot {action} while generation is {status}")]
    InvalidState {
        action: &'static str,
        status: ProcessingStatus,
    },
}

impl SynthError {
    /// Creates a synthesis failure.
    pub fn synthesis(message: impl Into<String>) -> Self {
        Self::Synthesis {
            message: message.into(),
        }
    }

    /// Creates a process failed error.
    pub fn process_failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self::ProcessFailed {
            exit_code,
            stderr: stderr.into(),
        }
    }

    /// Returns true for failures of the synthesis capability itself, as
    /// opposed to decoding, assembly or caller errors.
    pub fn is_synthesis_failure(&self) -> bool {
        matches!(
            self,
            SynthError::SynthesizerNotFound
                | SynthError::SpawnFailed(_)
                | SynthError::Timeout { .. }
                | SynthError::ProcessFailed { .. }
                | SynthError::WriteRequestFailed(_)
                | SynthError::ReadOutputFailed { .. }
                | SynthError::SerializeFailed(_)
                | SynthError::Synthesis { .. }
                | SynthError::EmptyPayload { .. }
        )
    }
}

impl CodedError for SynthError {
    fn code(&self) -> &'static str {
        match self {
            SynthError::SynthesizerNotFound => "SYNTH_001",
            SynthError::SpawnFailed(_) => "SYNTH_002",
            SynthError::Timeout { .. } => "SYNTH_003",
            SynthError::ProcessFailed { .. } => "SYNTH_004",
            SynthError::WriteRequestFailed(_) => "SYNTH_005",
            SynthError::ReadOutputFailed { .. } => "SYNTH_006",
            SynthError::SerializeFailed(_) => "SYNTH_007",
            SynthError::Synthesis { .. } => "SYNTH_008",
            SynthError::EmptyPayload { .. } => "SYNTH_009",
            SynthError::Decode(_) => "SYNTH_010",
            SynthError::Assembly(_) => "SYNTH_011",
            SynthError::UnknownSpeaker { .. } => "SYNTH_012",
            SynthError::InvalidState { .. } => "SYNTH_013",
        }
    }

    fn category(&self) -> &'static str {
        "synth"
    }
}
