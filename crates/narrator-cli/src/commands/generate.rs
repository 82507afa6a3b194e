//! Generate command implementation
//!
//! Runs the whole pipeline: parse, cast, synthesize each line, assemble,
//! optionally mix a background track, and write the WAV.

use anyhow::{Context, Result};
use colored::Colorize;
use narrator_backend_audio::{decode_audio, AudioBuffer, DecodeOptions};
use narrator_script::CodedError;
use narrator_synth::{
    GenerationOutput, LineOutcome, Orchestrator, ProcessingStatus, ProgressUpdate, SynthError,
};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use super::cast::ensure_script_speakers;
use super::json_output::{error_codes, CommandOutput, JsonError};
use super::reporting::{print_validation, validation_to_json};
use super::{generation_error, input_error};
use crate::config::{todays_story_file_name, SynthArgs};
use crate::input::load_session;

/// Options for `narrator generate`.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Cast file override
    pub cast: Option<String>,
    /// Explicit output path
    pub out: Option<String>,
    /// Output directory for the dated file name
    pub out_dir: Option<String>,
    /// Background track
    pub background: Option<String>,
    /// Background gain
    pub background_level: Option<f32>,
    /// Randomize voices of newly registered speakers
    pub randomize: bool,
    /// Seed for random assignment
    pub seed: Option<u32>,
    /// Synthesizer settings
    pub synth: SynthArgs,
    /// Machine-readable output
    pub json: bool,
}

/// JSON result of `narrator generate`.
#[derive(Debug, Serialize)]
pub struct GenerateResult {
    /// File written
    pub output_path: String,
    /// BLAKE3 hash of the PCM data
    pub pcm_hash: String,
    /// Channel count
    pub channels: u16,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Frames per channel
    pub frames: usize,
    /// Duration in seconds
    pub duration_seconds: f64,
    /// Lines that produced audio
    pub lines_synthesized: usize,
    /// Lines skipped for lack of a speaker configuration
    pub skipped: Vec<String>,
    /// Speakers registered by this run
    pub new_speakers: Vec<String>,
    /// Wall-clock time in milliseconds
    pub duration_ms: u64,
}

/// Resolves where the WAV goes: `--out`, else `<out-dir>/Story_<date>.wav`.
pub fn resolve_output_path(out: Option<&str>, out_dir: Option<&str>) -> PathBuf {
    match out {
        Some(path) => PathBuf::from(path),
        None => Path::new(out_dir.unwrap_or(".")).join(todays_story_file_name()),
    }
}

/// Reads and decodes a background track.
fn load_background(path: &str, decode: &DecodeOptions) -> Result<AudioBuffer> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read background: {}", path))?;
    decode_audio(&bytes, decode).with_context(|| format!("Failed to decode background: {}", path))
}

fn print_progress(update: &ProgressUpdate) {
    let pct = format!("[{:>3}%]", update.progress).dimmed();
    match (&update.line, update.status) {
        (
            Some(LineOutcome::Synthesized {
                line_id,
                speaker,
                voice_id,
                frames,
            }),
            _,
        ) => println!(
            "  {} {} {} {} ({} frames)",
            pct,
            line_id.dimmed(),
            speaker.cyan(),
            format!("as {}", voice_id).dimmed(),
            frames
        ),
        (Some(LineOutcome::Skipped { line_id, speaker }), _) => println!(
            "  {} {} {} {}",
            pct,
            line_id.dimmed(),
            speaker.yellow(),
            "skipped (no voice configured)".yellow()
        ),
        (None, ProcessingStatus::Combining) => {
            println!("  {} {}", pct, "combining...".dimmed())
        }
        (None, _) => {}
    }
}

/// Run the generate command
///
/// # Returns
/// Exit code: 0 success, 1 input/config error, 2 generation error
pub fn run(script_path: &str, library_dir: &Path, options: &GenerateOptions) -> Result<ExitCode> {
    let start = Instant::now();
    let json = options.json;

    let mut session = load_session(
        Path::new(script_path),
        options.cast.as_deref().map(Path::new),
        library_dir,
    )?;
    let config = options.synth.generation_config(options.background_level)?;
    let background = options
        .background
        .as_deref()
        .map(|p| load_background(p, &config.decode))
        .transpose()?;
    let output_path = resolve_output_path(options.out.as_deref(), options.out_dir.as_deref());

    if !json {
        println!("{} {}", "Generating from:".cyan().bold(), script_path);
        println!("{} {}", "Output:".cyan().bold(), output_path.display());
        if let Some(ref bg) = options.background {
            println!("{} {} at {}", "Background:".dimmed(), bg, config.background_level);
        }
    }

    let new_speakers = ensure_script_speakers(&mut session, options.randomize, options.seed);
    let validation = session.registry.validate(&session.library);
    if !validation.is_ok() {
        if json {
            let (errors, warnings) = validation_to_json(&validation);
            CommandOutput::<GenerateResult>::failure(errors, warnings).print()?;
        } else {
            println!("{} invalid voice settings", "FAILED".red().bold());
            print_validation(&validation);
        }
        return Ok(input_error());
    }
    if !new_speakers.is_empty() {
        session.save_cast()?;
    }
    if !json && !validation.warnings.is_empty() {
        print_validation(&validation);
    }

    if session.parsed.is_empty() && !json {
        println!("{} script has no dialogue; output will be silent", "!".yellow());
    }

    let synthesizer = options.synth.synthesizer();
    if !session.parsed.is_empty() {
        match synthesizer.resolve_program() {
            Ok((program, source)) => {
                tracing::debug!(program = %program.display(), %source, "synthesizer resolved")
            }
            Err(e) => {
                if json {
                    CommandOutput::<GenerateResult>::failure(vec![JsonError::from_coded(&e)], vec![])
                        .print()?;
                } else {
                    eprintln!("{}: {}", "error".red(), e);
                }
                return Ok(input_error());
            }
        }
    }

    let orchestrator = Orchestrator::with_config(synthesizer, config);
    let result = orchestrator.generate(
        &session.parsed.lines,
        &session.registry,
        session.library.clones(),
        background.as_ref(),
        |update| {
            if !json {
                print_progress(update);
            }
        },
    );

    let output = match result {
        Ok(output) => output,
        Err(e) => return report_generation_failure(&e, json),
    };

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }
    if let Err(e) = fs::write(&output_path, &output.wav.wav_data) {
        let message = format!("Failed to write {}: {}", output_path.display(), e);
        if json {
            CommandOutput::<GenerateResult>::failure(
                vec![JsonError::new(error_codes::FILE_WRITE, message)],
                vec![],
            )
            .print()?;
        } else {
            eprintln!("{}: {}", "error".red(), message);
        }
        return Ok(generation_error());
    }

    let duration_ms = start.elapsed().as_millis() as u64;
    if json {
        let (_, warnings) = validation_to_json(&validation);
        CommandOutput::success(
            to_result(&output, &output_path, new_speakers, duration_ms),
            warnings,
        )
        .print()?;
    } else {
        print_summary(&output, &output_path, duration_ms);
    }
    Ok(ExitCode::SUCCESS)
}

fn to_result(
    output: &GenerationOutput,
    path: &Path,
    new_speakers: Vec<String>,
    duration_ms: u64,
) -> GenerateResult {
    GenerateResult {
        output_path: path.display().to_string(),
        pcm_hash: output.wav.pcm_hash.clone(),
        channels: output.wav.num_channels,
        sample_rate: output.wav.sample_rate,
        frames: output.wav.num_frames,
        duration_seconds: output.duration_seconds(),
        lines_synthesized: output.lines_synthesized,
        skipped: output.skipped.clone(),
        new_speakers,
        duration_ms,
    }
}

fn print_summary(output: &GenerationOutput, path: &Path, duration_ms: u64) {
    println!();
    println!(
        "{} {} ({:.2}s of audio, {} lines) in {}ms",
        "SUCCESS".green().bold(),
        path.display(),
        output.duration_seconds(),
        output.lines_synthesized,
        duration_ms
    );
    if !output.skipped.is_empty() {
        println!(
            "  {} skipped lines: {}",
            "!".yellow(),
            output.skipped.join(", ")
        );
    }
    println!(
        "  {} {} Hz, {} ch, pcm {}",
        "->".dimmed(),
        output.wav.sample_rate,
        output.wav.num_channels,
        &output.wav.pcm_hash[..16]
    );
}

fn report_generation_failure(err: &SynthError, json: bool) -> Result<ExitCode> {
    tracing::debug!(code = err.code(), "generation aborted");
    if json {
        CommandOutput::<GenerateResult>::failure(vec![JsonError::from_coded(err)], vec![])
            .print()?;
    } else {
        println!();
        println!(
            "{} generation aborted; no output written",
            "FAILED".red().bold()
        );
        println!("  {} {}: {}", "x".red(), err.code(), err);
    }
    Ok(generation_error())
}
