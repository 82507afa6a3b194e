//! Parse command implementation
//!
//! Prints the lines and speakers found in a script.

use anyhow::Result;
use colored::Colorize;
use narrator_script::ParsedScript;
use serde::Serialize;
use std::path::Path;
use std::process::ExitCode;

use super::input_error;
use super::json_output::{error_codes, CommandOutput, JsonError};
use crate::input::load_script;

/// JSON result of `narrator parse`.
#[derive(Debug, Serialize)]
pub struct ParseResult {
    /// Parsed script
    #[serde(flatten)]
    pub script: ParsedScript,
    /// Number of lines per speaker, in speaker order
    pub line_counts: Vec<(String, usize)>,
}

/// Run the parse command
///
/// # Returns
/// Exit code: 0 success, 1 if the script cannot be read
pub fn run(script_path: &str, json_output: bool) -> Result<ExitCode> {
    let parsed = match load_script(Path::new(script_path)) {
        Ok(parsed) => parsed,
        Err(e) if json_output => {
            CommandOutput::<ParseResult>::failure(
                vec![JsonError::new(error_codes::FILE_READ, format!("{:#}", e))],
                vec![],
            )
            .print()?;
            return Ok(input_error());
        }
        Err(e) => return Err(e),
    };

    let line_counts = parsed
        .speakers
        .iter()
        .map(|s| (s.clone(), parsed.line_count_for(s)))
        .collect();

    if json_output {
        CommandOutput::success(
            ParseResult {
                script: parsed,
                line_counts,
            },
            vec![],
        )
        .print()?;
        return Ok(ExitCode::SUCCESS);
    }

    println!("{} {}", "Script:".cyan().bold(), script_path);
    println!("{} {}", "Source:".dimmed(), &parsed.source_hash[..16]);
    println!();

    if parsed.is_empty() {
        println!(
            "{} no dialogue found. Lines look like `Name: text` or `[Name: text]`.",
            "!".yellow()
        );
        return Ok(ExitCode::SUCCESS);
    }

    println!("{}", "Lines:".bold());
    for line in &parsed.lines {
        println!(
            "  {} {} {}",
            line.id.dimmed(),
            format!("[{}]", line.speaker).cyan(),
            line.text
        );
    }
    println!();

    println!("{}", "Speakers:".bold());
    for (speaker, count) in &line_counts {
        println!("  {} {} ({} lines)", "->".green(), speaker, count);
    }

    Ok(ExitCode::SUCCESS)
}
