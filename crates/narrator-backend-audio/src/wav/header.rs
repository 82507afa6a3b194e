//! WAV header inspection.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{AudioError, AudioResult};

/// Size of the canonical RIFF/fmt/data header this crate writes.
pub const WAV_HEADER_LEN: usize = 44;

/// Fields read from a WAV file's fmt and data chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    /// Format tag (1 = integer PCM, 3 = IEEE float).
    pub audio_format: u16,
    /// Channel count.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Declared bytes per second.
    pub byte_rate: u32,
    /// Declared bytes per frame.
    pub block_align: u16,
    /// Bits per sample.
    pub bits_per_sample: u16,
    /// Offset of the first PCM byte.
    pub data_offset: usize,
    /// Length of the data chunk in bytes.
    pub data_len: u32,
}

impl WavHeader {
    /// Frames in the data chunk.
    pub fn num_frames(&self) -> usize {
        if self.block_align == 0 {
            return 0;
        }
        self.data_len as usize / self.block_align as usize
    }

    /// Duration of the data chunk in seconds.
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.num_frames() as f64 / self.sample_rate as f64
    }
}

/// Walks the RIFF chunks of `wav_data` and returns the fmt and data details.
pub fn parse_wav_header(wav_data: &[u8]) -> AudioResult<WavHeader> {
    if wav_data.len() < 12 || &wav_data[0..4] != b"RIFF" || &wav_data[8..12] != b"WAVE" {
        return Err(AudioError::decode("missing RIFF/WAVE header"));
    }

    let mut fmt: Option<&[u8]> = None;
    let mut pos = 12;
    while pos + 8 <= wav_data.len() {
        let chunk_id = &wav_data[pos..pos + 4];
        let chunk_size = LittleEndian::read_u32(&wav_data[pos + 4..pos + 8]) as usize;
        let body_start = pos + 8;

        match chunk_id {
            b"fmt " => {
                let body = wav_data
                    .get(body_start..body_start + chunk_size)
                    .filter(|b| b.len() >= 16)
                    .ok_or_else(|| AudioError::decode("truncated fmt chunk"))?;
                fmt = Some(body);
            }
            b"data" => {
                let fmt = fmt.ok_or_else(|| AudioError::decode("data chunk before fmt chunk"))?;
                if body_start + chunk_size > wav_data.len() {
                    return Err(AudioError::decode(format!(
                        "data chunk declares {} bytes but only {} remain",
                        chunk_size,
                        wav_data.len() - body_start
                    )));
                }
                return Ok(WavHeader {
                    audio_format: LittleEndian::read_u16(&fmt[0..2]),
                    channels: LittleEndian::read_u16(&fmt[2..4]),
                    sample_rate: LittleEndian::read_u32(&fmt[4..8]),
                    byte_rate: LittleEndian::read_u32(&fmt[8..12]),
                    block_align: LittleEndian::read_u16(&fmt[12..14]),
                    bits_per_sample: LittleEndian::read_u16(&fmt[14..16]),
                    data_offset: body_start,
                    data_len: chunk_size as u32,
                });
            }
            _ => {}
        }

        pos = body_start + chunk_size;
        // Chunks are word aligned
        if chunk_size % 2 == 1 {
            pos += 1;
        }
    }

    Err(AudioError::decode("no data chunk"))
}
