//! Inspect command implementation
//!
//! Reads a WAV header back and reports format, length and PCM hash.

use anyhow::{Context, Result};
use colored::Colorize;
use narrator_backend_audio::wav::compute_pcm_hash;
use narrator_backend_audio::parse_wav_header;
use serde::Serialize;
use std::fs;
use std::process::ExitCode;

use super::input_error;
use super::json_output::{CommandOutput, JsonError};

/// JSON result of `narrator inspect`.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    pub audio_format: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    pub data_len: u32,
    pub frames: usize,
    pub duration_seconds: f64,
    pub pcm_hash: Option<String>,
}

/// Run the inspect command
///
/// # Returns
/// Exit code: 0 success, 1 if the file is not a readable WAV
pub fn run(path: &str, json_output: bool) -> Result<ExitCode> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path))?;

    let header = match parse_wav_header(&bytes) {
        Ok(header) => header,
        Err(e) => {
            if json_output {
                CommandOutput::<InspectResult>::failure(vec![JsonError::from_coded(&e)], vec![])
                    .print()?;
            } else {
                eprintln!("{}: {}: {}", "error".red(), path, e);
            }
            return Ok(input_error());
        }
    };

    let result = InspectResult {
        audio_format: header.audio_format,
        channels: header.channels,
        sample_rate: header.sample_rate,
        bits_per_sample: header.bits_per_sample,
        data_len: header.data_len,
        frames: header.num_frames(),
        duration_seconds: header.duration_seconds(),
        pcm_hash: compute_pcm_hash(&bytes),
    };

    if json_output {
        CommandOutput::success(result, vec![]).print()?;
        return Ok(ExitCode::SUCCESS);
    }

    let format = match result.audio_format {
        1 => "PCM".to_string(),
        3 => "IEEE float".to_string(),
        other => format!("format {}", other),
    };
    println!("{} {}", "File:".cyan().bold(), path);
    println!("  {:<12} {}", "Format:", format);
    println!("  {:<12} {}", "Channels:", result.channels);
    println!("  {:<12} {} Hz", "Rate:", result.sample_rate);
    println!("  {:<12} {}", "Bit depth:", result.bits_per_sample);
    println!("  {:<12} {} bytes", "Data:", result.data_len);
    println!(
        "  {:<12} {} frames ({:.3}s)",
        "Length:", result.frames, result.duration_seconds
    );
    if let Some(hash) = &result.pcm_hash {
        println!("  {:<12} {}", "PCM hash:", hash.dimmed());
    }
    Ok(ExitCode::SUCCESS)
}
