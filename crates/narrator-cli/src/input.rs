//! Loading scripts, cast files and the voice library, and parsing the
//! `NAME=FIELD:VALUE` style edit arguments.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use narrator_script::{parse_script, Emotion, ParsedScript, VoiceLibrary, VoiceRegistry, VoiceSettings};

use crate::config::default_cast_path;

/// Everything a script-level command works on.
#[derive(Debug)]
pub struct Session {
    /// Script file.
    pub script_path: PathBuf,
    /// Parsed script.
    pub parsed: ParsedScript,
    /// Cast file backing `registry`.
    pub cast_path: PathBuf,
    /// Speaker registry loaded from the cast file.
    pub registry: VoiceRegistry,
    /// Library directory.
    pub library_dir: PathBuf,
    /// Cloned voices and presets.
    pub library: VoiceLibrary,
}

impl Session {
    /// Writes the registry back to the cast file.
    pub fn save_cast(&self) -> Result<()> {
        self.registry
            .save(&self.cast_path)
            .with_context(|| format!("Failed to write cast file: {}", self.cast_path.display()))
    }
}

/// Reads and parses a script file.
pub fn load_script(path: &Path) -> Result<ParsedScript> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read script: {}", path.display()))?;
    Ok(parse_script(&text))
}

/// Loads the voice library from `dir`. Missing files are empty lists.
pub fn load_library(dir: &Path) -> Result<VoiceLibrary> {
    VoiceLibrary::load(dir)
        .with_context(|| format!("Failed to load voice library from {}", dir.display()))
}

/// Saves the voice library to `dir`.
pub fn save_library(library: &VoiceLibrary, dir: &Path) -> Result<()> {
    library
        .save(dir)
        .with_context(|| format!("Failed to save voice library to {}", dir.display()))
}

/// Loads a script together with its cast file and the library.
pub fn load_session(script: &Path, cast: Option<&Path>, library_dir: &Path) -> Result<Session> {
    let parsed = load_script(script)?;
    let cast_path = cast
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_cast_path(script));
    let registry = VoiceRegistry::load(&cast_path)
        .with_context(|| format!("Failed to load cast file: {}", cast_path.display()))?;
    let library = load_library(library_dir)?;

    tracing::debug!(
        script = %script.display(),
        lines = parsed.lines.len(),
        speakers = parsed.speakers.len(),
        cast = %cast_path.display(),
        "session loaded"
    );

    Ok(Session {
        script_path: script.to_path_buf(),
        parsed,
        cast_path,
        registry,
        library_dir: library_dir.to_path_buf(),
        library,
    })
}

/// A voice setting that can be edited from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingField {
    Voice,
    Pitch,
    Speed,
    Volume,
    Emotion,
}

impl std::str::FromStr for SettingField {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "voice" | "voicename" => Ok(SettingField::Voice),
            "pitch" => Ok(SettingField::Pitch),
            "speed" => Ok(SettingField::Speed),
            "volume" => Ok(SettingField::Volume),
            "emotion" => Ok(SettingField::Emotion),
            other => bail!(
                "unknown setting '{}' (expected voice, pitch, speed, volume or emotion)",
                other
            ),
        }
    }
}

/// One `--set NAME=FIELD:VALUE` edit.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingEdit {
    pub speaker: String,
    pub field: SettingField,
    pub value: String,
}

impl SettingEdit {
    /// Returns `settings` with this edit applied. Ranges are not checked here.
    pub fn apply(&self, settings: &VoiceSettings) -> Result<VoiceSettings> {
        let mut out = settings.clone();
        match self.field {
            SettingField::Voice => out.voice_name = self.value.clone(),
            SettingField::Pitch => out.pitch = parse_number(&self.value, "pitch")?,
            SettingField::Speed => out.speed = parse_number(&self.value, "speed")?,
            SettingField::Volume => out.volume = parse_number(&self.value, "volume")?,
            SettingField::Emotion => out.emotion = Emotion::from(self.value.as_str()),
        }
        Ok(out)
    }
}

fn parse_number(value: &str, field: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| anyhow!("{} must be a number, got '{}'", field, value))
}

/// Splits `NAME=VALUE`. Speaker names never contain `=`.
pub fn parse_assignment(arg: &str) -> Result<(String, String)> {
    let (name, value) = arg
        .split_once('=')
        .ok_or_else(|| anyhow!("expected NAME=VALUE, got '{}'", arg))?;
    let name = name.trim();
    let value = value.trim();
    if name.is_empty() || value.is_empty() {
        bail!("expected NAME=VALUE, got '{}'", arg);
    }
    Ok((name.to_string(), value.to_string()))
}

/// Parses `NAME=FIELD:VALUE`.
pub fn parse_setting_edit(arg: &str) -> Result<SettingEdit> {
    let (speaker, rest) = parse_assignment(arg)?;
    let (field, value) = rest
        .split_once(':')
        .ok_or_else(|| anyhow!("expected NAME=FIELD:VALUE, got '{}'", arg))?;
    let value = value.trim();
    if value.is_empty() {
        bail!("missing value in '{}'", arg);
    }
    Ok(SettingEdit {
        speaker,
        field: field.parse()?,
        value: value.to_string(),
    })
}
