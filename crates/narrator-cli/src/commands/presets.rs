//! Presets command implementation

use anyhow::{anyhow, Result};
use colored::Colorize;
use narrator_script::VoicePreset;
use std::path::Path;
use std::process::ExitCode;

use super::input_error;
use super::json_output::CommandOutput;
use crate::config::new_id;
use crate::input::{load_library, load_session, save_library};

/// List presets.
pub fn list(library_dir: &Path, json_output: bool) -> Result<ExitCode> {
    let library = load_library(library_dir)?;

    if json_output {
        CommandOutput::success(library.presets(), vec![]).print()?;
        return Ok(ExitCode::SUCCESS);
    }

    if library.presets().is_empty() {
        println!("{}", "No presets saved.".dimmed());
        return Ok(ExitCode::SUCCESS);
    }
    println!("{}", "Presets:".bold());
    for preset in library.presets() {
        let s = &preset.settings;
        println!(
            "  {:<24} {:<20} {} pitch {:.2} speed {:.2} volume {:.2} {}",
            preset.id.dimmed(),
            preset.name,
            s.voice_name,
            s.pitch,
            s.speed,
            s.volume,
            s.emotion
        );
    }
    Ok(ExitCode::SUCCESS)
}

/// Save a speaker's current settings as a new preset.
pub fn save(
    library_dir: &Path,
    name: &str,
    script_path: &str,
    speaker: &str,
    cast: Option<&str>,
) -> Result<ExitCode> {
    let name = name.trim();
    if name.is_empty() {
        eprintln!("{}: preset name is empty", "error".red());
        return Ok(input_error());
    }

    let mut session = load_session(Path::new(script_path), cast.map(Path::new), library_dir)?;
    let settings = session
        .registry
        .get(speaker)
        .map(|c| c.settings.clone())
        .ok_or_else(|| anyhow!("'{}' is not in the cast of {}", speaker, script_path))?;

    let preset = VoicePreset {
        id: new_id("preset", |id| session.library.preset(id).is_some()),
        name: name.to_string(),
        settings,
    };
    let id = preset.id.clone();
    session.library.add_preset(preset)?;
    save_library(&session.library, library_dir)?;

    println!("{} preset {} ({})", "Saved".green(), name, id.dimmed());
    Ok(ExitCode::SUCCESS)
}

/// Remove a preset.
pub fn remove(library_dir: &Path, id: &str) -> Result<ExitCode> {
    let mut library = load_library(library_dir)?;
    let removed = library.remove_preset(id)?;
    save_library(&library, library_dir)?;
    println!("{} preset {} ({})", "Removed".green(), removed.name, id.dimmed());
    Ok(ExitCode::SUCCESS)
}
