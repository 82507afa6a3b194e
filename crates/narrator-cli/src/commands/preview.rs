//! Preview command implementation
//!
//! Synthesizes a short introduction in one speaker's voice. Nothing but the
//! preview file is written; the cast and any earlier renders are untouched.

use anyhow::{Context, Result};
use colored::Colorize;
use narrator_backend_audio::WavResult;
use narrator_script::CodedError;
use narrator_synth::Orchestrator;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use super::{generation_error, input_error};
use crate::config::SynthArgs;
use crate::input::load_session;

/// Default preview file for a speaker: `Preview_<speaker>.wav`, spaces as `_`.
pub fn default_preview_path(speaker: &str) -> PathBuf {
    PathBuf::from(format!("Preview_{}.wav", speaker.replace(' ', "_")))
}

/// Run the preview command
///
/// # Returns
/// Exit code: 0 success, 1 unknown speaker, 2 synthesis error
pub fn run(
    script_path: &str,
    speaker: &str,
    cast: Option<&str>,
    out: Option<&str>,
    library_dir: &Path,
    synth: &SynthArgs,
) -> Result<ExitCode> {
    let session = load_session(Path::new(script_path), cast.map(Path::new), library_dir)?;
    if !session.registry.contains(speaker) {
        eprintln!(
            "{}: '{}' is not in the cast; run `narrator cast {}` first",
            "error".red(),
            speaker,
            script_path
        );
        return Ok(input_error());
    }

    let config = synth.generation_config(None)?;
    let orchestrator = Orchestrator::with_config(synth.synthesizer(), config);

    let preview = match orchestrator.preview(speaker, &session.registry, session.library.clones())
    {
        Ok(preview) => preview,
        Err(e) => {
            eprintln!("{}: preview failed: {} ({})", "error".red(), e, e.code());
            return Ok(generation_error());
        }
    };

    let wav = WavResult::from_buffer(&preview.audio).context("Failed to encode preview")?;
    let out_path = out
        .map(PathBuf::from)
        .unwrap_or_else(|| default_preview_path(speaker));
    fs::write(&out_path, &wav.wav_data)
        .with_context(|| format!("Failed to write preview: {}", out_path.display()))?;

    println!("{} {}", "Preview:".cyan().bold(), out_path.display());
    println!("  {} \"{}\"", "->".dimmed(), preview.text);
    println!(
        "  {} voice {}, {:.2}s",
        "->".dimmed(),
        preview.voice_id,
        wav.duration_seconds()
    );
    println!(
        "  {} play at rate {:.2}, volume {:.2}",
        "->".dimmed(),
        preview.playback_rate,
        preview.gain
    );
    Ok(ExitCode::SUCCESS)
}
