//! PCM data extraction and hashing.

use super::header::parse_wav_header;

/// Returns the data chunk of a WAV file, or None if the file is malformed.
pub fn extract_pcm_data(wav_data: &[u8]) -> Option<&[u8]> {
    let header = parse_wav_header(wav_data).ok()?;
    let end = header.data_offset + header.data_len as usize;
    wav_data.get(header.data_offset..end)
}

/// BLAKE3 hash of a WAV file's PCM data.
pub fn compute_pcm_hash(wav_data: &[u8]) -> Option<String> {
    extract_pcm_data(wav_data).map(|pcm| blake3::hash(pcm).to_hex().to_string())
}
