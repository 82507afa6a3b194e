//! Cast command implementation
//!
//! Registers the speakers of a script, applies presets and per-field edits,
//! validates, and writes the cast file.

use anyhow::{anyhow, Result};
use colored::Colorize;
use narrator_script::rng::{create_rng, seed_from_source_hash};
use narrator_script::{ScriptError, VoiceSettings};
use serde::Serialize;
use std::path::Path;
use std::process::ExitCode;

use super::input_error;
use super::json_output::CommandOutput;
use super::reporting::{print_cast, print_validation, validation_to_json};
use crate::input::{load_session, parse_assignment, parse_setting_edit, Session};

/// Options for `narrator cast`.
#[derive(Debug, Clone, Default)]
pub struct CastOptions {
    /// Cast file override
    pub cast: Option<String>,
    /// Draw new speakers' voices from the catalog
    pub randomize: bool,
    /// Seed for random assignment
    pub seed: Option<u32>,
    /// `NAME=FIELD:VALUE` edits
    pub set: Vec<String>,
    /// `NAME=PRESET_ID` assignments
    pub presets: Vec<String>,
    /// Machine-readable output
    pub json: bool,
}

/// JSON result of `narrator cast`.
#[derive(Debug, Serialize)]
pub struct CastResult {
    /// Cast file written
    pub cast_path: String,
    /// Speakers registered by this run
    pub added: Vec<String>,
    /// Full registry
    pub speakers: narrator_script::VoiceRegistry,
}

/// Registers missing speakers using `defaults`.
///
/// Without an explicit seed the RNG is seeded from the script's source hash,
/// so the same script text always draws the same voices.
pub(crate) fn ensure_script_speakers(
    session: &mut Session,
    randomize: bool,
    seed: Option<u32>,
) -> Vec<String> {
    let seed = seed.unwrap_or_else(|| seed_from_source_hash(&session.parsed.source_hash));
    tracing::debug!(seed, randomize, "registering speakers");
    let added = session.registry.ensure_speakers(
        &session.parsed.speakers,
        &VoiceSettings::default(),
        randomize,
        &mut create_rng(seed),
    );
    for name in &added {
        tracing::info!(speaker = %name, "new speaker registered");
    }
    added
}

/// Applies presets then field edits to the session registry.
fn apply_edits(session: &mut Session, options: &CastOptions) -> Result<()> {
    for arg in &options.presets {
        let (speaker, preset_id) = parse_assignment(arg)?;
        session
            .registry
            .apply_preset_by_id(&speaker, &preset_id, &session.library)
            .map_err(|e| match e {
                ScriptError::UnknownSpeaker { .. } => {
                    anyhow!("'{}' is not a speaker in this script", speaker)
                }
                other => anyhow!(other),
            })?;
    }

    for arg in &options.set {
        let edit = parse_setting_edit(arg)?;
        let current = session
            .registry
            .get(&edit.speaker)
            .ok_or_else(|| anyhow!("'{}' is not a speaker in this script", edit.speaker))?;
        let updated = edit.apply(&current.settings)?;
        let is_clone = session.library.clone_by_id(&updated.voice_name).is_some();

        session.registry.update_settings(&edit.speaker, updated)?;
        session.registry.mark_cloned(&edit.speaker, is_clone)?;
    }
    Ok(())
}

/// Run the cast command
///
/// # Returns
/// Exit code: 0 success, 1 on invalid edits or settings
pub fn run(script_path: &str, library_dir: &Path, options: &CastOptions) -> Result<ExitCode> {
    let mut session = load_session(
        Path::new(script_path),
        options.cast.as_deref().map(Path::new),
        library_dir,
    )?;

    let added = ensure_script_speakers(&mut session, options.randomize, options.seed);
    apply_edits(&mut session, options)?;

    let validation = session.registry.validate(&session.library);
    if !validation.is_ok() {
        if options.json {
            let (errors, warnings) = validation_to_json(&validation);
            CommandOutput::<CastResult>::failure(errors, warnings).print()?;
        } else {
            println!("{} cast has invalid settings; nothing written", "FAILED".red().bold());
            print_validation(&validation);
        }
        return Ok(input_error());
    }

    session.save_cast()?;

    if options.json {
        let (_, warnings) = validation_to_json(&validation);
        CommandOutput::success(
            CastResult {
                cast_path: session.cast_path.display().to_string(),
                added,
                speakers: session.registry,
            },
            warnings,
        )
        .print()?;
        return Ok(ExitCode::SUCCESS);
    }

    println!("{} {}", "Cast:".cyan().bold(), session.cast_path.display());
    if !added.is_empty() {
        println!("{} {}", "New speakers:".dimmed(), added.join(", "));
    }
    print_cast(&session.registry, &session.library, &session.parsed.speakers);
    if !validation.warnings.is_empty() {
        println!();
        print_validation(&validation);
    }
    Ok(ExitCode::SUCCESS)
}
