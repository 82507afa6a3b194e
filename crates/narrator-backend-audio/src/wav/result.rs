//! Encoded render result.

use super::format::WavFormat;
use super::writer::{buffer_to_pcm16, write_wav_to_vec};
use crate::buffer::AudioBuffer;
use crate::error::AudioResult;

/// A fully encoded WAV file plus identifying metadata.
#[derive(Debug, Clone)]
pub struct WavResult {
    /// Complete WAV file bytes.
    pub wav_data: Vec<u8>,
    /// BLAKE3 hash of the PCM payload only.
    pub pcm_hash: String,
    /// Channel count.
    pub num_channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Frames per channel.
    pub num_frames: usize,
}

impl WavResult {
    /// Encodes a buffer.
    pub fn from_buffer(buffer: &AudioBuffer) -> AudioResult<Self> {
        let format = WavFormat::for_buffer(buffer)?;
        let pcm = buffer_to_pcm16(buffer);
        let pcm_hash = blake3::hash(&pcm).to_hex().to_string();
        let wav_data = write_wav_to_vec(&format, &pcm)?;

        Ok(Self {
            wav_data,
            pcm_hash,
            num_channels: format.channels,
            sample_rate: format.sample_rate,
            num_frames: buffer.len(),
        })
    }

    /// Duration in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.num_frames as f64 / self.sample_rate as f64
    }
}
