//! In-memory multi-channel audio.

use crate::error::{AudioError, AudioResult};

/// Sample rate used when nothing else is known (speech payloads, empty renders).
pub const DEFAULT_SAMPLE_RATE: u32 = 24000;

/// Decoded audio: one sample vector per channel, all of equal length.
///
/// Samples are nominally in [-1.0, 1.0] but may exceed it after mixing; the
/// encoder clamps.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl AudioBuffer {
    /// Builds a buffer from per-channel samples.
    ///
    /// Fails if there are no channels, the channels differ in length, or the
    /// rate is zero.
    pub fn from_channels(channels: Vec<Vec<f32>>, sample_rate: u32) -> AudioResult<Self> {
        if channels.is_empty() {
            return Err(AudioError::invalid_buffer("buffer has no channels"));
        }
        if sample_rate == 0 {
            return Err(AudioError::invalid_buffer("sample rate must be positive"));
        }
        let frames = channels[0].len();
        if let Some(i) = channels.iter().position(|c| c.len() != frames) {
            return Err(AudioError::invalid_buffer(format!(
                "channel {} has {} samples, expected {}",
                i,
                channels[i].len(),
                frames
            )));
        }
        Ok(Self {
            channels,
            sample_rate,
        })
    }

    /// Builds a mono buffer.
    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> AudioResult<Self> {
        Self::from_channels(vec![samples], sample_rate)
    }

    /// Builds a silent buffer. Channel count and rate are raised to at least 1.
    pub fn silent(num_channels: usize, frames: usize, sample_rate: u32) -> Self {
        Self {
            channels: vec![vec![0.0; frames]; num_channels.max(1)],
            sample_rate: sample_rate.max(1),
        }
    }

    /// Number of channels (always at least 1).
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Frames per channel.
    pub fn len(&self) -> usize {
        self.channels[0].len()
    }

    /// Returns true if the buffer holds no frames.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Samples of one channel.
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }

    /// All channels.
    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    /// Duration in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.len() as f64 / self.sample_rate as f64
    }

    /// Channel-interleaved samples, frame by frame.
    pub fn interleaved(&self) -> Vec<f32> {
        let frames = self.len();
        let mut out = Vec::with_capacity(frames * self.num_channels());
        for i in 0..frames {
            for ch in &self.channels {
                out.push(ch[i]);
            }
        }
        out
    }

    /// Returns true if `other` has the same channel count and rate.
    pub fn same_format(&self, other: &AudioBuffer) -> bool {
        self.num_channels() == other.num_channels() && self.sample_rate == other.sample_rate
    }

    pub(crate) fn channels_mut(&mut self) -> &mut [Vec<f32>] {
        &mut self.channels
    }
}
