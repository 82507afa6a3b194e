//! Decoding synthesizer payloads into [`AudioBuffer`]s.
//!
//! Two payload kinds are accepted:
//!
//! - A RIFF/WAVE file. Integer PCM at 8, 16, 24 or 32 bits and 32-bit float
//!   are supported; the file's own channel count and rate are used.
//! - Anything else is treated as raw signed 16-bit little-endian PCM,
//!   interleaved, at the channel count and rate in [`DecodeOptions`].

use std::io::Cursor;

use byteorder::{ByteOrder, LittleEndian};
use hound::{SampleFormat, WavReader};

use crate::buffer::{AudioBuffer, DEFAULT_SAMPLE_RATE};
use crate::error::{AudioError, AudioResult};

/// How to interpret payloads that carry no header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Sample rate for raw PCM.
    pub raw_sample_rate: u32,
    /// Channel count for raw PCM.
    pub raw_channels: u16,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            raw_sample_rate: DEFAULT_SAMPLE_RATE,
            raw_channels: 1,
        }
    }
}

/// Returns true if `payload` starts with a RIFF/WAVE signature.
pub fn is_wav(payload: &[u8]) -> bool {
    payload.len() >= 12 && &payload[0..4] == b"RIFF" && &payload[8..12] == b"WAVE"
}

/// Decodes a payload into a buffer.
pub fn decode_audio(payload: &[u8], options: &DecodeOptions) -> AudioResult<AudioBuffer> {
    if payload.is_empty() {
        return Err(AudioError::decode("payload is empty"));
    }
    if is_wav(payload) {
        decode_wav(payload)
    } else {
        decode_raw_pcm16(payload, options.raw_channels, options.raw_sample_rate)
    }
}

/// Decodes a WAV file with hound.
pub fn decode_wav(payload: &[u8]) -> AudioResult<AudioBuffer> {
    let reader = WavReader::new(Cursor::new(payload))?;
    let spec = reader.spec();
    let num_channels = spec.channels as usize;
    if num_channels == 0 {
        return Err(AudioError::decode("WAV declares zero channels"));
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Int => match spec.bits_per_sample {
            8 | 16 | 24 | 32 => {
                let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<Result<_, _>>()?
            }
            bits => {
                return Err(AudioError::UnsupportedEncoding {
                    bits,
                    format: "int",
                })
            }
        },
        SampleFormat::Float => match spec.bits_per_sample {
            32 => reader.into_samples::<f32>().collect::<Result<_, _>>()?,
            bits => {
                return Err(AudioError::UnsupportedEncoding {
                    bits,
                    format: "float",
                })
            }
        },
    };

    tracing::trace!(
        channels = num_channels,
        sample_rate = spec.sample_rate,
        bits = spec.bits_per_sample,
        samples = interleaved.len(),
        "decoded WAV payload"
    );
    deinterleave(&interleaved, num_channels, spec.sample_rate)
}

/// Decodes headerless signed 16-bit little-endian PCM.
pub fn decode_raw_pcm16(payload: &[u8], channels: u16, sample_rate: u32) -> AudioResult<AudioBuffer> {
    if channels == 0 {
        return Err(AudioError::invalid_param("raw_channels", "must be at least 1"));
    }
    if payload.len() % 2 != 0 {
        return Err(AudioError::decode(format!(
            "raw PCM payload has odd length {}",
            payload.len()
        )));
    }

    let mut samples = vec![0i16; payload.len() / 2];
    LittleEndian::read_i16_into(payload, &mut samples);

    let interleaved: Vec<f32> = samples.iter().map(|&s| s as f32 / 32768.0).collect();
    deinterleave(&interleaved, channels as usize, sample_rate)
}

fn deinterleave(samples: &[f32], num_channels: usize, sample_rate: u32) -> AudioResult<AudioBuffer> {
    if samples.len() % num_channels != 0 {
        return Err(AudioError::decode(format!(
            "{} samples do not divide into {} channels",
            samples.len(),
            num_channels
        )));
    }
    let frames = samples.len() / num_channels;
    let mut channels = vec![Vec::with_capacity(frames); num_channels];
    for frame in samples.chunks_exact(num_channels) {
        for (ch, &s) in channels.iter_mut().zip(frame) {
            ch.push(s);
        }
    }
    AudioBuffer::from_channels(channels, sample_rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wav::encode_wav;
    use hound::{WavSpec, WavWriter};
    use pretty_assertions::assert_eq;

    fn hound_wav(spec: WavSpec, write: impl FnOnce(&mut WavWriter<&mut Cursor<Vec<u8>>>)) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
            write(&mut writer);
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn test_raw_pcm_mono() {
        let payload = [0x00, 0x40, 0x00, 0xC0, 0xFF, 0x7F];
        let buf = decode_audio(&payload, &DecodeOptions::default()).unwrap();
        assert_eq!(buf.sample_rate(), 24000);
        assert_eq!(buf.num_channels(), 1);
        assert_eq!(buf.channel(0), &[0.5, -0.5, 32767.0 / 32768.0]);
    }

    #[test]
    fn test_raw_pcm_silence_length() {
        let buf = decode_audio(&vec![0u8; 6000], &DecodeOptions::default()).unwrap();
        assert_eq!(buf.len(), 3000);
    }

    #[test]
    fn test_raw_pcm_stereo() {
        let opts = DecodeOptions {
            raw_sample_rate: 16000,
            raw_channels: 2,
        };
        let payload = [0x00, 0x40, 0x00, 0xC0];
        let buf = decode_audio(&payload, &opts).unwrap();
        assert_eq!(buf.num_channels(), 2);
        assert_eq!(buf.channel(0), &[0.5]);
        assert_eq!(buf.channel(1), &[-0.5]);
    }

    #[test]
    fn test_raw_pcm_odd_length_fails() {
        let err = decode_audio(&[0, 0, 0], &DecodeOptions::default()).unwrap_err();
        assert!(matches!(err, AudioError::Decode { .. }));
    }

    #[test]
    fn test_empty_payload_fails() {
        assert!(decode_audio(&[], &DecodeOptions::default()).is_err());
    }

    #[test]
    fn test_decode_own_encoding() {
        let buf = AudioBuffer::from_channels(vec![vec![0.5, -0.5], vec![0.0, -1.0]], 22050).unwrap();
        let decoded = decode_audio(&encode_wav(&buf).unwrap(), &DecodeOptions::default()).unwrap();

        assert_eq!(decoded.sample_rate(), 22050);
        assert_eq!(decoded.num_channels(), 2);
        assert_eq!(decoded.channel(0), &[16383.0 / 32768.0, -0.5]);
        assert_eq!(decoded.channel(1), &[0.0, -1.0]);
    }

    #[test]
    fn test_decode_24bit_wav() {
        let spec = WavSpec {
            channels: 1,
            sample_rate: 48000,
            bits_per_sample: 24,
            sample_format: SampleFormat::Int,
        };
        let wav = hound_wav(spec, |w| {
            w.write_sample(1 << 22).unwrap();
            w.write_sample(-(1 << 23)).unwrap();
        });
        let buf = decode_wav(&wav).unwrap();
        assert_eq!(buf.sample_rate(), 48000);
        assert_eq!(buf.channel(0), &[0.5, -1.0]);
    }

    #[test]
    fn test_decode_float_wav() {
        let spec = WavSpec {
            channels: 1,
            sample_rate: 24000,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let wav = hound_wav(spec, |w| {
            w.write_sample(0.25f32).unwrap();
            w.write_sample(-0.75f32).unwrap();
        });
        let buf = decode_audio(&wav, &DecodeOptions::default()).unwrap();
        assert_eq!(buf.channel(0), &[0.25, -0.75]);
    }

    #[test]
    fn test_truncated_wav_fails() {
        let wav = encode_wav(&AudioBuffer::silent(1, 4, 24000)).unwrap();
        assert!(decode_audio(&wav[..20], &DecodeOptions::default()).is_err());
    }
}
