//! WAV writing and PCM quantization.

use std::io::{self, Write};

use byteorder::{LittleEndian, WriteBytesExt};

use super::format::WavFormat;
use super::header::WAV_HEADER_LEN;
use crate::buffer::AudioBuffer;
use crate::error::{AudioError, AudioResult};

/// Writes a complete WAV file (RIFF, fmt, data) to a writer.
pub fn write_wav<W: Write>(writer: &mut W, format: &WavFormat, pcm_data: &[u8]) -> io::Result<()> {
    let data_size = u32::try_from(pcm_data.len())
        .ok()
        .filter(|size| size.checked_add(36).is_some())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "PCM data too large for WAV"))?;
    let (block_align, byte_rate) = format
        .block_align()
        .zip(format.byte_rate())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "WAV byte rate overflows"))?;

    // RIFF header
    writer.write_all(b"RIFF")?;
    writer.write_u32::<LittleEndian>(36 + data_size)?;
    writer.write_all(b"WAVE")?;

    // fmt chunk
    writer.write_all(b"fmt ")?;
    writer.write_u32::<LittleEndian>(16)?;
    writer.write_u16::<LittleEndian>(1)?; // PCM
    writer.write_u16::<LittleEndian>(format.channels)?;
    writer.write_u32::<LittleEndian>(format.sample_rate)?;
    writer.write_u32::<LittleEndian>(byte_rate)?;
    writer.write_u16::<LittleEndian>(block_align)?;
    writer.write_u16::<LittleEndian>(format.bits_per_sample)?;

    // data chunk
    writer.write_all(b"data")?;
    writer.write_u32::<LittleEndian>(data_size)?;
    writer.write_all(pcm_data)?;

    Ok(())
}

/// Writes a WAV file to a byte vector.
pub fn write_wav_to_vec(format: &WavFormat, pcm_data: &[u8]) -> io::Result<Vec<u8>> {
    let mut buffer = Vec::with_capacity(WAV_HEADER_LEN + pcm_data.len());
    write_wav(&mut buffer, format, pcm_data)?;
    Ok(buffer)
}

/// Quantizes one sample to a signed 16-bit value.
///
/// The sample is clamped to [-1, 1], then negative values are scaled by
/// 32768 and the rest by 32767, truncating toward zero. NaN becomes 0.
pub fn quantize_sample(sample: f32) -> i16 {
    if sample.is_nan() {
        return 0;
    }
    let s = f64::from(sample.clamp(-1.0, 1.0));
    if s < 0.0 {
        (s * 32768.0) as i16
    } else {
        (s * 32767.0) as i16
    }
}

/// Interleaves and quantizes a buffer into little-endian 16-bit PCM.
pub fn buffer_to_pcm16(buffer: &AudioBuffer) -> Vec<u8> {
    let frames = buffer.len();
    let mut pcm = Vec::with_capacity(frames * buffer.num_channels() * 2);
    for i in 0..frames {
        for channel in buffer.channels() {
            pcm.extend_from_slice(&quantize_sample(channel[i]).to_le_bytes());
        }
    }
    pcm
}

/// Encodes a buffer as a complete 16-bit PCM WAV file.
pub fn encode_wav(buffer: &AudioBuffer) -> AudioResult<Vec<u8>> {
    let format = WavFormat::for_buffer(buffer)?;
    let pcm = buffer_to_pcm16(buffer);
    write_wav_to_vec(&format, &pcm).map_err(AudioError::from)
}
