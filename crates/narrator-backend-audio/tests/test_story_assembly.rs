//! End-to-end assembly tests: decode, concatenate, mix, encode.

use narrator_backend_audio::wav::{compute_pcm_hash, extract_pcm_data};
use narrator_backend_audio::{
    concatenate, decode_audio, encode_wav, mix, parse_wav_header, AudioBuffer, DecodeOptions,
    WavResult, DEFAULT_BACKGROUND_LEVEL,
};
use pretty_assertions::assert_eq;

fn raw_tone(frames: usize, value: i16) -> Vec<u8> {
    (0..frames).flat_map(|_| value.to_le_bytes()).collect()
}

#[test]
fn test_two_silent_lines_make_expected_file() {
    let opts = DecodeOptions::default();
    let lines = [vec![0u8; 6000], vec![0u8; 6000]];
    let buffers: Vec<AudioBuffer> = lines
        .iter()
        .map(|p| decode_audio(p, &opts).unwrap())
        .collect();

    let wav = encode_wav(&concatenate(&buffers).unwrap()).unwrap();
    assert_eq!(wav.len(), 44 + 3000 * 2 * 2);

    let header = parse_wav_header(&wav).unwrap();
    assert_eq!(header.channels, 1);
    assert_eq!(header.sample_rate, 24000);
    assert_eq!(header.num_frames(), 6000);
    assert!(extract_pcm_data(&wav).unwrap().iter().all(|&b| b == 0));
}

#[test]
fn test_empty_story_encodes_one_frame() {
    let wav = encode_wav(&concatenate(&[]).unwrap()).unwrap();
    assert_eq!(wav.len(), 46);
    assert_eq!(&wav[44..], &[0, 0]);
}

#[test]
fn test_line_order_is_preserved() {
    let opts = DecodeOptions::default();
    let first = decode_audio(&raw_tone(2, 1000), &opts).unwrap();
    let second = decode_audio(&raw_tone(3, -1000), &opts).unwrap();

    let wav = encode_wav(&concatenate(&[first, second]).unwrap()).unwrap();
    let pcm = extract_pcm_data(&wav).unwrap();
    let values: Vec<i16> = pcm
        .chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]))
        .collect();
    // Decoding scales by 32768 but positive samples encode at 32767.
    assert_eq!(values, vec![999, 999, -1000, -1000, -1000]);
}

#[test]
fn test_background_mix_changes_hash_but_not_length() {
    let speech = decode_audio(&vec![0u8; 200], &DecodeOptions::default()).unwrap();
    let background = AudioBuffer::mono(vec![0.5, -0.5, 0.25], 24000).unwrap();

    let dry = WavResult::from_buffer(&speech).unwrap();
    let wet = WavResult::from_buffer(&mix(&speech, &background, DEFAULT_BACKGROUND_LEVEL).unwrap())
        .unwrap();

    assert_eq!(dry.wav_data.len(), wet.wav_data.len());
    assert_ne!(dry.pcm_hash, wet.pcm_hash);
    assert_eq!(compute_pcm_hash(&wet.wav_data), Some(wet.pcm_hash));
}

#[test]
fn test_loud_mix_is_clamped_on_encode() {
    let speech = AudioBuffer::mono(vec![0.9, -0.9], 24000).unwrap();
    let background = AudioBuffer::mono(vec![1.0, -1.0], 24000).unwrap();
    let wav = encode_wav(&mix(&speech, &background, 0.5).unwrap()).unwrap();

    let pcm = extract_pcm_data(&wav).unwrap();
    assert_eq!(i16::from_le_bytes([pcm[0], pcm[1]]), 32767);
    assert_eq!(i16::from_le_bytes([pcm[2], pcm[3]]), -32768);
}
