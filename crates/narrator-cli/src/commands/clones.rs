//! Cloned voices command implementation
//!
//! Cloned voices are aliases: each maps to the base voice that actually
//! synthesizes it.

use anyhow::Result;
use colored::Colorize;
use narrator_script::{base_voice, ClonedVoice, DEFAULT_CLONE_BASE};
use std::path::Path;
use std::process::ExitCode;

use super::input_error;
use super::json_output::CommandOutput;
use crate::config::new_id;
use crate::input::{load_library, save_library};

/// List cloned voices, favorites first.
pub fn list(library_dir: &Path, json_output: bool) -> Result<ExitCode> {
    let library = load_library(library_dir)?;
    let mut clones: Vec<&ClonedVoice> = library.clones().iter().collect();
    clones.sort_by_key(|c| !c.favorite());

    if json_output {
        CommandOutput::success(clones, vec![]).print()?;
        return Ok(ExitCode::SUCCESS);
    }

    if clones.is_empty() {
        println!("{}", "No cloned voices.".dimmed());
        return Ok(ExitCode::SUCCESS);
    }
    println!("{}", "Cloned voices:".bold());
    for clone in clones {
        let star = if clone.favorite() { "*".yellow() } else { " ".normal() };
        println!(
            "  {} {:<24} {:<20} -> {}",
            star,
            clone.id.dimmed(),
            clone.name,
            clone.base_voice_map
        );
    }
    Ok(ExitCode::SUCCESS)
}

/// Register a cloned voice.
pub fn add(library_dir: &Path, name: &str, base: Option<&str>) -> Result<ExitCode> {
    let name = name.trim();
    if name.is_empty() {
        eprintln!("{}: clone name is empty", "error".red());
        return Ok(input_error());
    }
    let base = base.unwrap_or(DEFAULT_CLONE_BASE);
    if base_voice(base).is_none() {
        eprintln!(
            "{}: '{}' is not a catalog voice (Puck, Charon, Kore, Fenrir, Zephyr)",
            "error".red(),
            base
        );
        return Ok(input_error());
    }

    let mut library = load_library(library_dir)?;
    let id = new_id("custom", |id| library.clone_by_id(id).is_some());
    let clone = ClonedVoice::new(id.clone(), name, base);
    library.add_clone(clone)?;
    save_library(&library, library_dir)?;

    println!("{} {} as {} (speaks as {})", "Added".green(), name, id.cyan(), base);
    println!(
        "  {} use it with `narrator cast <script> --set \"<speaker>=voice:{}\"`",
        "->".dimmed(),
        id
    );
    Ok(ExitCode::SUCCESS)
}

/// Remove a cloned voice.
pub fn remove(library_dir: &Path, id: &str) -> Result<ExitCode> {
    let mut library = load_library(library_dir)?;
    let removed = library.remove_clone(id)?;
    save_library(&library, library_dir)?;
    println!("{} {} ({})", "Removed".green(), removed.name, id.dimmed());
    Ok(ExitCode::SUCCESS)
}

/// Rename a cloned voice.
pub fn rename(library_dir: &Path, id: &str, name: &str) -> Result<ExitCode> {
    let mut library = load_library(library_dir)?;
    library.rename_clone(id, name.trim())?;
    save_library(&library, library_dir)?;
    println!("{} {} to {}", "Renamed".green(), id.dimmed(), name.trim());
    Ok(ExitCode::SUCCESS)
}

/// Toggle the favorite flag.
pub fn favorite(library_dir: &Path, id: &str) -> Result<ExitCode> {
    let mut library = load_library(library_dir)?;
    let now = library.toggle_favorite(id)?;
    save_library(&library, library_dir)?;
    let state = if now { "favorite" } else { "not favorite" };
    println!("{} is now {}", id, state.bold());
    Ok(ExitCode::SUCCESS)
}
