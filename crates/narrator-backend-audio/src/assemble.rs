//! Buffer concatenation and background mixing.

use crate::buffer::{AudioBuffer, DEFAULT_SAMPLE_RATE};
use crate::error::{AudioError, AudioResult};

/// Default gain applied to a background track.
pub const DEFAULT_BACKGROUND_LEVEL: f32 = 0.2;

/// Joins buffers end to end, without gaps.
///
/// The output takes its channel count and rate from the first buffer; every
/// other buffer must match it. No resampling or channel conversion is done.
/// An empty list yields one silent mono frame at [`DEFAULT_SAMPLE_RATE`].
pub fn concatenate(buffers: &[AudioBuffer]) -> AudioResult<AudioBuffer> {
    let Some(first) = buffers.first() else {
        return Ok(AudioBuffer::silent(1, 1, DEFAULT_SAMPLE_RATE));
    };

    for (index, buf) in buffers.iter().enumerate().skip(1) {
        if !first.same_format(buf) {
            return Err(AudioError::FormatMismatch {
                index,
                expected_channels: first.num_channels(),
                expected_rate: first.sample_rate(),
                found_channels: buf.num_channels(),
                found_rate: buf.sample_rate(),
            });
        }
    }

    let total: usize = buffers.iter().map(AudioBuffer::len).sum();
    let channels = (0..first.num_channels())
        .map(|c| {
            let mut out = Vec::with_capacity(total);
            for buf in buffers {
                out.extend_from_slice(buf.channel(c));
            }
            out
        })
        .collect();

    AudioBuffer::from_channels(channels, first.sample_rate())
}

/// Adds a looped background bed under `speech`.
///
/// For every frame `i` of speech channel `c`:
/// `out = speech[c][i] + background[c % bg_channels][i % bg_len] * level`.
/// The output has the speech buffer's shape and rate. Nothing is clipped here;
/// the encoder clamps. A background with no frames leaves speech unchanged.
pub fn mix(speech: &AudioBuffer, background: &AudioBuffer, level: f32) -> AudioResult<AudioBuffer> {
    if !level.is_finite() {
        return Err(AudioError::invalid_param(
            "background_level",
            format!("must be finite, got {}", level),
        ));
    }

    let mut out = speech.clone();
    let bg_len = background.len();
    if bg_len == 0 {
        tracing::debug!("background has no frames, skipping mix");
        return Ok(out);
    }
    if background.sample_rate() != speech.sample_rate() {
        tracing::warn!(
            speech_rate = speech.sample_rate(),
            background_rate = background.sample_rate(),
            "background sample rate differs from speech; mixing without resampling"
        );
    }

    let bg_channels = background.num_channels();
    for (c, samples) in out.channels_mut().iter_mut().enumerate() {
        let bg = background.channel(c % bg_channels);
        for (i, s) in samples.iter_mut().enumerate() {
            *s += bg[i % bg_len] * level;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn mono(samples: &[f32]) -> AudioBuffer {
        AudioBuffer::mono(samples.to_vec(), 24000).unwrap()
    }

    #[test]
    fn test_concatenate_empty_is_one_silent_frame() {
        let out = concatenate(&[]).unwrap();
        assert_eq!(out.num_channels(), 1);
        assert_eq!(out.len(), 1);
        assert_eq!(out.sample_rate(), 24000);
        assert_eq!(out.channel(0), &[0.0]);
    }

    #[test]
    fn test_concatenate_lengths_and_order() {
        let out = concatenate(&[mono(&[0.1, 0.2]), mono(&[]), mono(&[0.3])]).unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(out.channel(0), &[0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_concatenate_rejects_mismatch() {
        let stereo = AudioBuffer::silent(2, 4, 24000);
        let err = concatenate(&[mono(&[0.0]), stereo]).unwrap_err();
        assert!(matches!(err, AudioError::FormatMismatch { index: 1, .. }));

        let other_rate = AudioBuffer::silent(1, 4, 44100);
        assert!(concatenate(&[mono(&[0.0]), other_rate]).is_err());
    }

    #[test]
    fn test_mix_loops_background() {
        let speech = mono(&[0.0; 10]);
        let bg = mono(&[0.4, 0.8, -0.4, -0.8]);
        let out = mix(&speech, &bg, 0.5).unwrap();

        assert_eq!(out.len(), 10);
        let s = out.channel(0);
        for i in 0..10 {
            assert_eq!(s[i], bg.channel(0)[i % 4] * 0.5);
        }
        assert_eq!(s[4], s[0]);
        assert_eq!(s[9], s[1]);
    }

    #[test]
    fn test_mix_does_not_clip() {
        let out = mix(&mono(&[0.9]), &mono(&[1.0]), 0.5).unwrap();
        assert!(out.channel(0)[0] > 1.0);
    }

    #[test]
    fn test_mix_wraps_channels() {
        let speech = AudioBuffer::silent(2, 2, 24000);
        let out = mix(&speech, &mono(&[1.0]), 0.2).unwrap();
        assert_eq!(out.channel(0), &[0.2, 0.2]);
        assert_eq!(out.channel(1), &[0.2, 0.2]);
    }

    #[test]
    fn test_mix_empty_background() {
        let speech = mono(&[0.3, 0.1]);
        let out = mix(&speech, &mono(&[]), 0.2).unwrap();
        assert_eq!(out, speech);
    }

    #[test]
    fn test_mix_rejects_nan_level() {
        assert!(mix(&mono(&[0.0]), &mono(&[0.0]), f32::NAN).is_err());
    }
}
