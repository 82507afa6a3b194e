//! Speaker to voice mapping.
//!
//! The registry is the long-lived, session-scoped map from speaker name to
//! [`SpeakerConfig`]. Parsing only ever adds missing speakers; user edits and
//! presets replace a speaker's settings wholesale.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{ScriptError, ScriptResult, ValidationResult};
use crate::library::{ClonedVoice, VoiceLibrary, VoicePreset};
use crate::voice::{VoiceSettings, BASE_VOICES};

/// Voice configuration for one speaker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeakerConfig {
    /// Speaker name as it appears in the script.
    pub name: String,
    /// Current voice settings.
    pub settings: VoiceSettings,
    /// Display hint: the speaker uses a cloned voice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_cloned: Option<bool>,
}

impl SpeakerConfig {
    /// Creates a config for `name`.
    pub fn new(name: impl Into<String>, settings: VoiceSettings) -> Self {
        Self {
            name: name.into(),
            settings,
            is_cloned: None,
        }
    }
}

/// Replaces `config`'s settings with a copy of the preset's settings.
///
/// Name and the cloned hint are kept.
pub fn apply_preset(config: &SpeakerConfig, preset: &VoicePreset) -> SpeakerConfig {
    SpeakerConfig {
        name: config.name.clone(),
        settings: preset.settings.clone(),
        is_cloned: config.is_cloned,
    }
}

/// Returns the voice id to hand to the synthesizer.
///
/// A voice name matching a clone id resolves to that clone's base voice;
/// anything else passes through unchanged.
pub fn resolve_effective_voice<'a>(
    settings: &'a VoiceSettings,
    clones: &'a [ClonedVoice],
) -> &'a str {
    clones
        .iter()
        .find(|c| c.id == settings.voice_name)
        .map_or(settings.voice_name.as_str(), |c| c.base_voice_map.as_str())
}

/// Map of speaker name to configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoiceRegistry {
    speakers: BTreeMap<String, SpeakerConfig>,
}

impl VoiceRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered speakers.
    pub fn len(&self) -> usize {
        self.speakers.len()
    }

    /// Returns true if no speakers are registered.
    pub fn is_empty(&self) -> bool {
        self.speakers.is_empty()
    }

    /// Looks up a speaker.
    pub fn get(&self, name: &str) -> Option<&SpeakerConfig> {
        self.speakers.get(name)
    }

    /// Returns true if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.speakers.contains_key(name)
    }

    /// Iterates speakers in name order.
    pub fn iter(&self) -> impl Iterator<Item = &SpeakerConfig> {
        self.speakers.values()
    }

    /// Registers every name not yet present.
    ///
    /// New speakers copy `defaults`; with `randomize` their voice is drawn
    /// uniformly from the base catalog using `rng`. Existing speakers are never
    /// touched. Returns the names that were added.
    pub fn ensure_speakers<I, S, R>(
        &mut self,
        names: I,
        defaults: &VoiceSettings,
        randomize: bool,
        rng: &mut R,
    ) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        R: Rng + ?Sized,
    {
        let mut added = Vec::new();
        for name in names {
            let name = name.as_ref();
            if self.speakers.contains_key(name) {
                continue;
            }

            let settings = if randomize {
                match BASE_VOICES.choose(rng) {
                    Some(voice) => defaults.with_voice(voice.name),
                    None => defaults.clone(),
                }
            } else {
                defaults.clone()
            };

            tracing::debug!(speaker = name, voice = %settings.voice_name, "speaker registered");
            self.speakers
                .insert(name.to_string(), SpeakerConfig::new(name, settings));
            added.push(name.to_string());
        }
        added
    }

    /// Inserts or replaces a full speaker config.
    pub fn upsert(&mut self, config: SpeakerConfig) {
        self.speakers.insert(config.name.clone(), config);
    }

    /// Replaces a speaker's settings wholesale.
    pub fn update_settings(&mut self, name: &str, settings: VoiceSettings) -> ScriptResult<()> {
        let config = self.get_mut(name)?;
        config.settings = settings;
        Ok(())
    }

    /// Sets the cloned display hint.
    pub fn mark_cloned(&mut self, name: &str, cloned: bool) -> ScriptResult<()> {
        let config = self.get_mut(name)?;
        config.is_cloned = Some(cloned);
        Ok(())
    }

    /// Applies a preset from `library` to a speaker.
    pub fn apply_preset_by_id(
        &mut self,
        name: &str,
        preset_id: &str,
        library: &VoiceLibrary,
    ) -> ScriptResult<()> {
        let preset = library
            .preset(preset_id)
            .ok_or_else(|| ScriptError::UnknownPreset {
                id: preset_id.to_string(),
            })?;
        let config = self.get_mut(name)?;
        *config = apply_preset(config, preset);
        Ok(())
    }

    /// Effective voice id for a registered speaker.
    pub fn effective_voice(&self, name: &str, clones: &[ClonedVoice]) -> Option<String> {
        self.get(name)
            .map(|c| resolve_effective_voice(&c.settings, clones).to_string())
    }

    /// Validates every speaker's settings against `library`.
    pub fn validate(&self, library: &VoiceLibrary) -> ValidationResult {
        let mut result = ValidationResult::success();
        for config in self.speakers.values() {
            result.merge(config.settings.validate(
                &format!("speakers.{}", config.name),
                |id| library.clone_by_id(id).is_some(),
            ));
        }
        result
    }

    fn get_mut(&mut self, name: &str) -> ScriptResult<&mut SpeakerConfig> {
        self.speakers
            .get_mut(name)
            .ok_or_else(|| ScriptError::UnknownSpeaker {
                name: name.to_string(),
            })
    }

    /// Reads a registry (cast file) from JSON. A missing file yields an empty registry.
    pub fn load(path: &Path) -> ScriptResult<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Writes the registry as pretty JSON.
    pub fn save(&self, path: &Path) -> ScriptResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::create_rng;
    use crate::voice::Emotion;
    use pretty_assertions::assert_eq;

    fn preset(voice: &str) -> VoicePreset {
        VoicePreset {
            id: "preset_1".to_string(),
            name: "Gruff".to_string(),
            settings: VoiceSettings {
                voice_name: voice.to_string(),
                pitch: 0.7,
                speed: 0.9,
                volume: 0.6,
                emotion: Emotion::Angry,
            },
        }
    }

    #[test]
    fn test_ensure_uses_defaults_without_randomize() {
        let mut registry = VoiceRegistry::new();
        let defaults = VoiceSettings::default().with_voice("Kore");
        let added = registry.ensure_speakers(["A", "B"], &defaults, false, &mut create_rng(1));

        assert_eq!(added, vec!["A", "B"]);
        assert_eq!(registry.get("A").unwrap().settings, defaults);
        assert_eq!(registry.get("B").unwrap().settings, defaults);
    }

    #[test]
    fn test_ensure_never_overwrites() {
        let mut registry = VoiceRegistry::new();
        let mut rng = create_rng(7);
        registry.ensure_speakers(["A"], &VoiceSettings::default(), false, &mut rng);

        let custom = VoiceSettings {
            pitch: 1.3,
            ..VoiceSettings::default().with_voice("Zephyr")
        };
        registry.update_settings("A", custom.clone()).unwrap();

        let added =
            registry.ensure_speakers(["A", "C"], &VoiceSettings::default(), true, &mut rng);
        assert_eq!(added, vec!["C"]);
        assert_eq!(registry.get("A").unwrap().settings, custom);
    }

    #[test]
    fn test_randomized_assignment_is_deterministic_per_seed() {
        let names = ["A", "B", "C", "D", "E", "F"];
        let mut r1 = VoiceRegistry::new();
        let mut r2 = VoiceRegistry::new();
        r1.ensure_speakers(names, &VoiceSettings::default(), true, &mut create_rng(42));
        r2.ensure_speakers(names, &VoiceSettings::default(), true, &mut create_rng(42));
        assert_eq!(r1, r2);

        for config in r1.iter() {
            assert!(BASE_VOICES.iter().any(|v| v.name == config.settings.voice_name));
            assert_eq!(config.settings.pitch, 1.0);
        }
    }

    #[test]
    fn test_resolve_effective_voice() {
        let clones = vec![ClonedVoice::new("custom_1", "Grandpa", "Fenrir")];

        let cloned = VoiceSettings::default().with_voice("custom_1");
        assert_eq!(resolve_effective_voice(&cloned, &clones), "Fenrir");

        let plain = VoiceSettings::default().with_voice("Kore");
        assert_eq!(resolve_effective_voice(&plain, &clones), "Kore");

        let unknown = VoiceSettings::default().with_voice("custom_9");
        assert_eq!(resolve_effective_voice(&unknown, &clones), "custom_9");
    }

    #[test]
    fn test_apply_preset_replaces_settings_only() {
        let mut config = SpeakerConfig::new("Bob", VoiceSettings::default());
        config.is_cloned = Some(true);

        let applied = apply_preset(&config, &preset("Charon"));
        assert_eq!(applied.name, "Bob");
        assert_eq!(applied.is_cloned, Some(true));
        assert_eq!(applied.settings, preset("Charon").settings);
    }

    #[test]
    fn test_apply_preset_by_id() {
        let mut registry = VoiceRegistry::new();
        registry.upsert(SpeakerConfig::new("Bob", VoiceSettings::default()));
        let library = VoiceLibrary::from_parts(vec![], vec![preset("Charon")]);

        registry
            .apply_preset_by_id("Bob", "preset_1", &library)
            .unwrap();
        assert_eq!(registry.get("Bob").unwrap().settings.voice_name, "Charon");

        assert!(matches!(
            registry.apply_preset_by_id("Bob", "missing", &library),
            Err(ScriptError::UnknownPreset { .. })
        ));
        assert!(matches!(
            registry.apply_preset_by_id("Nobody", "preset_1", &library),
            Err(ScriptError::UnknownSpeaker { .. })
        ));
    }

    #[test]
    fn test_stored_settings_keep_clone_id() {
        let mut registry = VoiceRegistry::new();
        registry.upsert(SpeakerConfig::new(
            "Bob",
            VoiceSettings::default().with_voice("custom_1"),
        ));
        let clones = vec![ClonedVoice::new("custom_1", "Grandpa", "Fenrir")];

        assert_eq!(registry.effective_voice("Bob", &clones).as_deref(), Some("Fenrir"));
        assert_eq!(registry.get("Bob").unwrap().settings.voice_name, "custom_1");
    }

    #[test]
    fn test_validate_reports_speaker_paths() {
        let mut registry = VoiceRegistry::new();
        registry.upsert(SpeakerConfig::new(
            "Bob",
            VoiceSettings {
                volume: 1.5,
                ..VoiceSettings::default()
            },
        ));
        let result = registry.validate(&VoiceLibrary::new());
        assert!(!result.is_ok());
        assert_eq!(result.errors[0].path.as_deref(), Some("speakers.Bob.volume"));
    }
}
