//! Cloned voices and voice presets.
//!
//! Both lists are persisted as plain JSON arrays under fixed file names in a
//! library directory. Loading applies the emotion migration: presets written
//! before the `emotion` field existed come back as `Neutral`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ScriptError, ScriptResult};
use crate::voice::{Emotion, VoiceSettings};

/// Storage key (file name) of the cloned voice list.
pub const CLONES_FILE: &str = "clones.json";
/// Storage key (file name) of the preset list.
pub const PRESETS_FILE: &str = "presets.json";

/// Base voice assigned to clones created without an explicit base.
pub const DEFAULT_CLONE_BASE: &str = "Fenrir";

/// A user-defined alias that synthesizes through a base voice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClonedVoice {
    /// Opaque unique id (`custom_<millis>`).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Base voice used for actual synthesis.
    pub base_voice_map: String,
    /// Favorite flag for listings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
}

impl ClonedVoice {
    /// Creates a clone mapped to `base_voice_map`.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        base_voice_map: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            base_voice_map: base_voice_map.into(),
            is_favorite: None,
        }
    }

    /// Returns true if marked as favorite.
    pub fn favorite(&self) -> bool {
        self.is_favorite.unwrap_or(false)
    }
}

/// A named, reusable bundle of voice settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoicePreset {
    /// Unique id (`preset_<millis>`).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Settings applied on use.
    pub settings: VoiceSettings,
}

/// On-disk preset shape; `emotion` may be absent in older files.
#[derive(Deserialize)]
struct StoredPreset {
    id: String,
    name: String,
    settings: StoredSettings,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSettings {
    voice_name: String,
    pitch: f64,
    speed: f64,
    volume: f64,
    #[serde(default)]
    emotion: Option<Emotion>,
}

/// Deserializes a preset list, defaulting missing emotions to Neutral.
///
/// Returns the presets and how many of them needed the migration.
pub fn presets_from_json(json: &str) -> ScriptResult<(Vec<VoicePreset>, usize)> {
    let stored: Vec<StoredPreset> = serde_json::from_str(json)?;
    let mut migrated = 0;

    let presets = stored
        .into_iter()
        .map(|p| {
            let emotion = p.settings.emotion.unwrap_or_else(|| {
                migrated += 1;
                Emotion::Neutral
            });
            VoicePreset {
                id: p.id,
                name: p.name,
                settings: VoiceSettings {
                    voice_name: p.settings.voice_name,
                    pitch: p.settings.pitch,
                    speed: p.settings.speed,
                    volume: p.settings.volume,
                    emotion,
                },
            }
        })
        .collect();

    Ok((presets, migrated))
}

/// The persisted clone and preset lists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoiceLibrary {
    clones: Vec<ClonedVoice>,
    presets: Vec<VoicePreset>,
}

impl VoiceLibrary {
    /// Creates an empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a library from existing lists.
    pub fn from_parts(clones: Vec<ClonedVoice>, presets: Vec<VoicePreset>) -> Self {
        Self { clones, presets }
    }

    /// Loads both lists from `dir`. Missing files yield empty lists.
    pub fn load(dir: &Path) -> ScriptResult<Self> {
        let (clones_path, presets_path) = Self::storage_paths(dir);
        let clones = if clones_path.exists() {
            serde_json::from_str(&fs::read_to_string(&clones_path)?)?
        } else {
            Vec::new()
        };

        let presets = if presets_path.exists() {
            let (presets, migrated) = presets_from_json(&fs::read_to_string(&presets_path)?)?;
            if migrated > 0 {
                tracing::warn!(
                    migrated,
                    path = %presets_path.display(),
                    "presets without emotion defaulted to Neutral"
                );
            }
            presets
        } else {
            Vec::new()
        };

        tracing::debug!(
            clones = clones.len(),
            presets = presets.len(),
            dir = %dir.display(),
            "voice library loaded"
        );
        Ok(Self { clones, presets })
    }

    /// Writes both lists to `dir`, creating it if needed.
    pub fn save(&self, dir: &Path) -> ScriptResult<()> {
        fs::create_dir_all(dir)?;
        let (clones_path, presets_path) = Self::storage_paths(dir);
        fs::write(clones_path, serde_json::to_string_pretty(&self.clones)?)?;
        fs::write(presets_path, serde_json::to_string_pretty(&self.presets)?)?;
        Ok(())
    }

    /// Paths of the two storage files under `dir`.
    pub fn storage_paths(dir: &Path) -> (PathBuf, PathBuf) {
        (dir.join(CLONES_FILE), dir.join(PRESETS_FILE))
    }

    /// All cloned voices.
    pub fn clones(&self) -> &[ClonedVoice] {
        &self.clones
    }

    /// All presets.
    pub fn presets(&self) -> &[VoicePreset] {
        &self.presets
    }

    /// Looks up a clone by id.
    pub fn clone_by_id(&self, id: &str) -> Option<&ClonedVoice> {
        self.clones.iter().find(|c| c.id == id)
    }

    /// Looks up a preset by id.
    pub fn preset(&self, id: &str) -> Option<&VoicePreset> {
        self.presets.iter().find(|p| p.id == id)
    }

    /// Appends a clone. Ids must be unique.
    pub fn add_clone(&mut self, clone: ClonedVoice) -> ScriptResult<()> {
        if self.clone_by_id(&clone.id).is_some() {
            return Err(ScriptError::DuplicateId { id: clone.id });
        }
        self.clones.push(clone);
        Ok(())
    }

    /// Removes a clone and returns it.
    pub fn remove_clone(&mut self, id: &str) -> ScriptResult<ClonedVoice> {
        let index = self
            .clones
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| ScriptError::UnknownClone { id: id.to_string() })?;
        Ok(self.clones.remove(index))
    }

    /// Renames a clone.
    pub fn rename_clone(&mut self, id: &str, name: impl Into<String>) -> ScriptResult<()> {
        let clone = self.clone_mut(id)?;
        clone.name = name.into();
        Ok(())
    }

    /// Flips the favorite flag of a clone and returns the new value.
    pub fn toggle_favorite(&mut self, id: &str) -> ScriptResult<bool> {
        let clone = self.clone_mut(id)?;
        let favorite = !clone.favorite();
        clone.is_favorite = Some(favorite);
        Ok(favorite)
    }

    fn clone_mut(&mut self, id: &str) -> ScriptResult<&mut ClonedVoice> {
        self.clones
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| ScriptError::UnknownClone { id: id.to_string() })
    }

    /// Appends a preset. Ids must be unique.
    pub fn add_preset(&mut self, preset: VoicePreset) -> ScriptResult<()> {
        if self.preset(&preset.id).is_some() {
            return Err(ScriptError::DuplicateId { id: preset.id });
        }
        self.presets.push(preset);
        Ok(())
    }

    /// Removes a preset and returns it.
    pub fn remove_preset(&mut self, id: &str) -> ScriptResult<VoicePreset> {
        let index = self
            .presets
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| ScriptError::UnknownPreset { id: id.to_string() })?;
        Ok(self.presets.remove(index))
    }
}
