//! Configuration resolution: library location, cast files, synthesizer
//! options and output naming.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Result};
use chrono::{NaiveDate, Utc};
use clap::Args;
use narrator_backend_audio::{DecodeOptions, DEFAULT_BACKGROUND_LEVEL, DEFAULT_SAMPLE_RATE};
use narrator_synth::command::DEFAULT_TIMEOUT_SECS;
use narrator_synth::{CommandConfig, CommandSynthesizer, GenerationConfig};

/// Environment variable overriding the library directory.
pub const HOME_ENV: &str = "NARRATOR_HOME";

/// Suffix of the cast file stored next to a script.
pub const CAST_SUFFIX: &str = ".cast.json";

/// Where the library directory came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibrarySource {
    Flag,
    Environment,
    DataDir,
}

impl std::fmt::Display for LibrarySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LibrarySource::Flag => "--library",
            LibrarySource::Environment => HOME_ENV,
            LibrarySource::DataDir => "data dir",
        };
        write!(f, "{}", s)
    }
}

/// Picks the library directory from a flag, an environment value, or the
/// platform data directory, in that order.
pub fn library_dir_from(
    flag: Option<&Path>,
    env: Option<OsString>,
    data_dir: Option<PathBuf>,
) -> Option<(PathBuf, LibrarySource)> {
    if let Some(path) = flag {
        return Some((path.to_path_buf(), LibrarySource::Flag));
    }
    if let Some(value) = env.filter(|v| !v.is_empty()) {
        return Some((PathBuf::from(value), LibrarySource::Environment));
    }
    data_dir.map(|d| (d.join("narrator"), LibrarySource::DataDir))
}

/// Resolves the library directory for this process.
pub fn resolve_library_dir(flag: Option<&Path>) -> Result<(PathBuf, LibrarySource)> {
    match library_dir_from(flag, std::env::var_os(HOME_ENV), dirs::data_dir()) {
        Some(found) => Ok(found),
        None => bail!(
            "cannot determine a library directory; pass --library or set {}",
            HOME_ENV
        ),
    }
}

/// Default cast file for a script: `story.txt` -> `story.cast.json`.
pub fn default_cast_path(script: &Path) -> PathBuf {
    let stem = script
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "script".to_string());
    script.with_file_name(format!("{}{}", stem, CAST_SUFFIX))
}

/// Output file name for a story rendered on `date`.
pub fn story_file_name(date: NaiveDate) -> String {
    format!("Story_{}.wav", date.format("%Y-%m-%d"))
}

/// Output file name for a story rendered today (UTC).
pub fn todays_story_file_name() -> String {
    story_file_name(Utc::now().date_naive())
}

/// Highest `--raw-rate` accepted, in Hz.
pub const MAX_RAW_SAMPLE_RATE: u32 = 768_000;

/// New library id: `<prefix>_<unix millis>`.
///
/// If `taken` reports a collision (two ids in the same millisecond), a
/// numeric suffix is appended until the id is free.
pub fn new_id(prefix: &str, taken: impl Fn(&str) -> bool) -> String {
    let base = format!("{}_{}", prefix, Utc::now().timestamp_millis());
    if !taken(&base) {
        return base;
    }
    (2u32..)
        .map(|n| format!("{}_{}", base, n))
        .find(|id| !taken(id))
        .unwrap_or(base)
}

/// Synthesizer flags shared by `generate` and `preview`.
#[derive(Debug, Clone, Args)]
pub struct SynthArgs {
    /// Synthesizer program (default: $NARRATOR_SYNTH_CMD, then narrator-tts on PATH)
    #[arg(long)]
    pub synth_cmd: Option<PathBuf>,

    /// Extra argument passed to the synthesizer before --request/--output (repeatable)
    #[arg(long = "synth-arg", allow_hyphen_values = true)]
    pub synth_args: Vec<String>,

    /// Timeout for one synthesis call, in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Sample rate assumed for headerless PCM returned by the synthesizer
    #[arg(long, default_value_t = DEFAULT_SAMPLE_RATE)]
    pub raw_rate: u32,
}

impl Default for SynthArgs {
    fn default() -> Self {
        Self {
            synth_cmd: None,
            synth_args: Vec::new(),
            timeout: DEFAULT_TIMEOUT_SECS,
            raw_rate: DEFAULT_SAMPLE_RATE,
        }
    }
}

impl SynthArgs {
    /// Builds the subprocess synthesizer.
    pub fn synthesizer(&self) -> CommandSynthesizer {
        let mut config = CommandConfig::default().timeout(Duration::from_secs(self.timeout));
        if let Some(ref program) = self.synth_cmd {
            config = config.program(program);
        }
        for arg in &self.synth_args {
            config = config.arg(arg);
        }
        CommandSynthesizer::with_config(config)
    }

    /// Decode options for synthesizer payloads.
    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            raw_sample_rate: self.raw_rate,
            ..DecodeOptions::default()
        }
    }

    /// Generation configuration with the given background level.
    pub fn generation_config(&self, background_level: Option<f32>) -> Result<GenerationConfig> {
        if self.raw_rate == 0 || self.raw_rate > MAX_RAW_SAMPLE_RATE {
            bail!(
                "--raw-rate must be between 1 and {} Hz, got {}",
                MAX_RAW_SAMPLE_RATE,
                self.raw_rate
            );
        }
        let background_level = background_level.unwrap_or(DEFAULT_BACKGROUND_LEVEL);
        if !background_level.is_finite() || background_level < 0.0 {
            bail!(
                "--background-level must be a non-negative number, got {}",
                background_level
            );
        }
        Ok(GenerationConfig {
            decode: self.decode_options(),
            background_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_library_dir_precedence() {
        let flag = PathBuf::from("/tmp/flag");
        let data = Some(PathBuf::from("/data"));

        assert_eq!(
            library_dir_from(Some(&flag), Some("/env".into()), data.clone()),
            Some((flag.clone(), LibrarySource::Flag))
        );
        assert_eq!(
            library_dir_from(None, Some("/env".into()), data.clone()),
            Some((PathBuf::from("/env"), LibrarySource::Environment))
        );
        assert_eq!(
            library_dir_from(None, Some("".into()), data.clone()),
            Some((PathBuf::from("/data/narrator"), LibrarySource::DataDir))
        );
        assert_eq!(library_dir_from(None, None, None), None);
    }

    #[test]
    fn test_default_cast_path() {
        assert_eq!(
            default_cast_path(Path::new("stories/night.txt")),
            PathBuf::from("stories/night.cast.json")
        );
        assert_eq!(
            default_cast_path(Path::new("night")),
            PathBuf::from("night.cast.json")
        );
    }

    #[test]
    fn test_story_file_name() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(story_file_name(date), "Story_2026-03-07.wav");
    }

    #[test]
    fn test_new_id_prefix() {
        let id = new_id("custom", |_| false);
        let millis = id.strip_prefix("custom_").unwrap();
        assert!(millis.parse::<i64>().unwrap() > 0);
    }

    #[test]
    fn test_new_id_skips_taken() {
        // Everything without a suffix, and the first suffix, is taken.
        let id = new_id("preset", |id| id.matches('_').count() == 1 || id.ends_with("_2"));
        assert!(id.starts_with("preset_"));
        assert!(id.ends_with("_3"));
    }

    #[test]
    fn test_generation_config_validation() {
        let args = SynthArgs::default();
        assert_eq!(
            args.generation_config(None).unwrap().background_level,
            DEFAULT_BACKGROUND_LEVEL
        );
        assert!(args.generation_config(Some(-0.1)).is_err());
        assert!(args.generation_config(Some(f32::NAN)).is_err());

        let bad_rate = SynthArgs {
            raw_rate: 0,
            ..SynthArgs::default()
        };
        assert!(bad_rate.generation_config(None).is_err());

        let huge_rate = SynthArgs {
            raw_rate: 3_000_000_000,
            ..SynthArgs::default()
        };
        assert!(huge_rate.generation_config(None).is_err());

        let max_rate = SynthArgs {
            raw_rate: MAX_RAW_SAMPLE_RATE,
            ..SynthArgs::default()
        };
        assert!(max_rate.generation_config(None).is_ok());
    }
}
