//! Shared human-readable reporting helpers.

use colored::Colorize;
use narrator_script::{SpeakerConfig, ValidationResult, VoiceLibrary, VoiceRegistry};

use super::json_output::{validation_error_to_json, validation_warning_to_json, JsonError, JsonWarning};

pub(super) fn print_validation(result: &ValidationResult) {
    for error in &result.errors {
        println!("  {} {}", "x".red(), error);
    }
    for warning in &result.warnings {
        println!("  {} {}", "!".yellow(), warning);
    }
}

pub(super) fn validation_to_json(result: &ValidationResult) -> (Vec<JsonError>, Vec<JsonWarning>) {
    (
        result.errors.iter().map(validation_error_to_json).collect(),
        result.warnings.iter().map(validation_warning_to_json).collect(),
    )
}

/// One speaker row: name, voice (with clone display name), numbers, emotion.
pub(super) fn speaker_row(config: &SpeakerConfig, library: &VoiceLibrary) -> String {
    let s = &config.settings;
    let voice = match library.clone_by_id(&s.voice_name) {
        Some(clone) => format!("{} -> {} (custom)", clone.name, clone.base_voice_map),
        None => s.voice_name.clone(),
    };
    format!(
        "{:<16} {:<28} pitch {:.2}  speed {:.2}  volume {:.2}  {}",
        config.name, voice, s.pitch, s.speed, s.volume, s.emotion
    )
}

pub(super) fn print_cast(registry: &VoiceRegistry, library: &VoiceLibrary, speakers: &[String]) {
    for name in speakers {
        if let Some(config) = registry.get(name) {
            println!("  {}", speaker_row(config, library));
        }
    }
}
