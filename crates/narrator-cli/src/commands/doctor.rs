//! Doctor command implementation
//!
//! Checks the synthesizer, the voice library and output permissions.

use anyhow::Result;
use colored::Colorize;
use narrator_script::{VoiceLibrary, BASE_VOICES};
use narrator_synth::CommandSynthesizer;
use std::env;
use std::path::Path;
use std::process::{Command, ExitCode};

use crate::config::resolve_library_dir;
use crate::input::load_library;

/// Run the doctor command
///
/// Checks:
/// - Synthesizer program resolution
/// - Voice library location and contents
/// - Output directory permissions
///
/// # Returns
/// Exit code: 0 if all checks pass, 1 if any fail
pub fn run(library_flag: Option<&Path>, synthesizer: &CommandSynthesizer) -> Result<ExitCode> {
    println!("{}", "Narrator Doctor".cyan().bold());
    println!("{}", "===============".cyan());
    println!();

    let mut all_ok = true;

    println!("{}", "Versions:".bold());
    println!("  {} narrator v{}", "->".green(), env!("CARGO_PKG_VERSION"));
    match get_rustc_version() {
        Some(version) => println!("  {} rustc {}", "->".green(), version),
        None => println!("  {} rustc (not found)", "->".yellow()),
    }
    println!();

    println!("{}", "Synthesizer:".bold());
    match synthesizer.resolve_program() {
        Ok((program, source)) => {
            println!(
                "  {} {} (from {})",
                "ok".green(),
                program.display(),
                source
            );
        }
        Err(e) => {
            println!("  {} {}", "!!".red(), e);
            println!(
                "     {}",
                "Pass --synth-cmd or set NARRATOR_SYNTH_CMD to a text-to-speech program.".dimmed()
            );
            all_ok = false;
        }
    }
    let voices: Vec<&str> = BASE_VOICES.iter().map(|v| v.name).collect();
    println!("  {} base voices: {}", "->".dimmed(), voices.join(", "));
    println!();

    println!("{}", "Library:".bold());
    match resolve_library_dir(library_flag) {
        Ok((dir, source)) => {
            println!("  {} {} (from {})", "->".green(), dir.display(), source);
            let (clones_path, presets_path) = VoiceLibrary::storage_paths(&dir);
            for path in [&clones_path, &presets_path] {
                let state = if path.exists() { "present" } else { "not created yet" };
                println!("     {} {}", path.display().to_string().dimmed(), state.dimmed());
            }
            match load_library(&dir) {
                Ok(library) => println!(
                    "  {} {} cloned voices, {} presets",
                    "ok".green(),
                    library.clones().len(),
                    library.presets().len()
                ),
                Err(e) => {
                    println!("  {} {:#}", "!!".red(), e);
                    all_ok = false;
                }
            }
        }
        Err(e) => {
            println!("  {} {}", "!!".red(), e);
            all_ok = false;
        }
    }
    println!();

    println!("{}", "Permissions:".bold());
    match env::current_dir() {
        Ok(dir) => {
            let test_file = dir.join(".narrator_write_test");
            match std::fs::write(&test_file, "test") {
                Ok(_) => {
                    let _ = std::fs::remove_file(&test_file);
                    println!(
                        "  {} Current directory is writable ({})",
                        "ok".green(),
                        dir.display()
                    );
                }
                Err(e) => {
                    println!("  {} Cannot write to current directory: {}", "!!".red(), e);
                    all_ok = false;
                }
            }
        }
        Err(e) => {
            println!("  {} Cannot determine current directory: {}", "!!".red(), e);
            all_ok = false;
        }
    }
    println!();

    if all_ok {
        println!("{} All checks passed!", "SUCCESS".green().bold());
        Ok(ExitCode::SUCCESS)
    } else {
        println!(
            "{} Some checks failed. See above for details.",
            "WARNING".yellow().bold()
        );
        Ok(ExitCode::from(1))
    }
}

fn parse_rustc_version(output: &str) -> Option<String> {
    // "rustc 1.75.0 (..."
    output.split_whitespace().nth(1).map(|s| s.to_string())
}

fn get_rustc_version() -> Option<String> {
    let output = Command::new("rustc").arg("--version").output().ok()?;
    if output.status.success() {
        parse_rustc_version(&String::from_utf8_lossy(&output.stdout))
    } else {
        None
    }
}
