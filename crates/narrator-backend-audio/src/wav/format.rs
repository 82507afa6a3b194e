//! WAV format parameters.

use crate::buffer::AudioBuffer;
use crate::error::{AudioError, AudioResult};

/// WAV format parameters for 16-bit PCM output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavFormat {
    /// Number of interleaved channels.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bits per sample (always 16 for output).
    pub bits_per_sample: u16,
}

impl WavFormat {
    /// 16-bit PCM with `channels` channels.
    pub fn pcm16(channels: u16, sample_rate: u32) -> Self {
        Self {
            channels,
            sample_rate,
            bits_per_sample: 16,
        }
    }

    /// Format matching a buffer's channel count and rate.
    pub fn for_buffer(buffer: &AudioBuffer) -> AudioResult<Self> {
        let channels = u16::try_from(buffer.num_channels()).map_err(|_| {
            AudioError::invalid_buffer(format!(
                "{} channels exceeds the WAV limit",
                buffer.num_channels()
            ))
        })?;
        let format = Self::pcm16(channels, buffer.sample_rate());
        if format.byte_rate().is_none() {
            return Err(AudioError::invalid_buffer(format!(
                "{} channels at {} Hz overflows the WAV byte rate",
                channels,
                buffer.sample_rate()
            )));
        }
        Ok(format)
    }

    /// Bytes per sample (per channel).
    pub(crate) fn bytes_per_sample(&self) -> u16 {
        self.bits_per_sample / 8
    }

    /// Bytes per frame, or `None` if it does not fit the header field.
    pub fn block_align(&self) -> Option<u16> {
        self.channels.checked_mul(self.bytes_per_sample())
    }

    /// Bytes per second, or `None` if it does not fit the header field.
    pub fn byte_rate(&self) -> Option<u32> {
        self.sample_rate.checked_mul(u32::from(self.block_align()?))
    }
}
