//! Voice settings, the emotion enumeration and the base voice catalog.

use serde::{Deserialize, Serialize};

use crate::error::{ErrorCode, ValidationError, ValidationResult, ValidationWarning, WarningCode};

/// Inclusive pitch range.
pub const PITCH_RANGE: (f64, f64) = (0.5, 1.5);
/// Inclusive speed range.
pub const SPEED_RANGE: (f64, f64) = (0.5, 2.0);
/// Inclusive volume range.
pub const VOLUME_RANGE: (f64, f64) = (0.0, 1.0);

/// Voice used when no other voice is chosen.
pub const DEFAULT_VOICE: &str = "Puck";

/// Speaker gender of a catalog voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

/// A synthesis-engine-native voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseVoice {
    /// Identifier sent to the synthesizer.
    pub name: &'static str,
    /// Speaker gender.
    pub gender: Gender,
    /// Display label.
    pub label: &'static str,
}

/// The fixed base voice catalog.
pub const BASE_VOICES: &[BaseVoice] = &[
    BaseVoice {
        name: "Puck",
        gender: Gender::Male,
        label: "Puck (Playful, energetic)",
    },
    BaseVoice {
        name: "Charon",
        gender: Gender::Male,
        label: "Charon (Deep, resonant)",
    },
    BaseVoice {
        name: "Kore",
        gender: Gender::Female,
        label: "Kore (Calm, soothing)",
    },
    BaseVoice {
        name: "Fenrir",
        gender: Gender::Male,
        label: "Fenrir (Gravelly, intense)",
    },
    BaseVoice {
        name: "Zephyr",
        gender: Gender::Female,
        label: "Zephyr (Gentle, airy)",
    },
];

/// Looks up a catalog voice by name.
pub fn base_voice(name: &str) -> Option<&'static BaseVoice> {
    BASE_VOICES.iter().find(|v| v.name == name)
}

/// Delivery style forwarded to the synthesizer.
///
/// Unknown values are kept verbatim in [`Emotion::Other`] so settings written by
/// newer tools survive a load/save cycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Emotion {
    #[default]
    Neutral,
    Happy,
    Sad,
    Angry,
    Surprised,
    Excited,
    Whispering,
    Other(String),
}

impl Emotion {
    /// The closed set of known emotions, in display order.
    pub const KNOWN: &'static [Emotion] = &[
        Emotion::Neutral,
        Emotion::Happy,
        Emotion::Sad,
        Emotion::Angry,
        Emotion::Surprised,
        Emotion::Excited,
        Emotion::Whispering,
    ];

    /// Returns the emotion as a string.
    pub fn as_str(&self) -> &str {
        match self {
            Emotion::Neutral => "Neutral",
            Emotion::Happy => "Happy",
            Emotion::Sad => "Sad",
            Emotion::Angry => "Angry",
            Emotion::Surprised => "Surprised",
            Emotion::Excited => "Excited",
            Emotion::Whispering => "Whispering",
            Emotion::Other(s) => s,
        }
    }

    /// Returns true for emotions outside the known set.
    pub fn is_other(&self) -> bool {
        matches!(self, Emotion::Other(_))
    }
}

impl From<String> for Emotion {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Neutral" => Emotion::Neutral,
            "Happy" => Emotion::Happy,
            "Sad" => Emotion::Sad,
            "Angry" => Emotion::Angry,
            "Surprised" => Emotion::Surprised,
            "Excited" => Emotion::Excited,
            "Whispering" => Emotion::Whispering,
            _ => Emotion::Other(s),
        }
    }
}

impl From<&str> for Emotion {
    fn from(s: &str) -> Self {
        Emotion::from(s.to_string())
    }
}

impl From<Emotion> for String {
    fn from(e: Emotion) -> Self {
        e.as_str().to_string()
    }
}

impl std::fmt::Display for Emotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-speaker voice configuration.
///
/// `voice_name` is either a catalog voice or a cloned-voice id; clone
/// indirection happens only when a synthesis request is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceSettings {
    /// Base voice name or cloned voice id.
    pub voice_name: String,
    /// Pitch hint, 0.5..=1.5.
    pub pitch: f64,
    /// Speaking rate, 0.5..=2.0.
    pub speed: f64,
    /// Output gain, 0.0..=1.0.
    pub volume: f64,
    /// Delivery style. Missing in older files; defaults to Neutral.
    #[serde(default)]
    pub emotion: Emotion,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            voice_name: DEFAULT_VOICE.to_string(),
            pitch: 1.0,
            speed: 1.0,
            volume: 1.0,
            emotion: Emotion::Neutral,
        }
    }
}

impl VoiceSettings {
    /// Returns a copy using a different voice.
    pub fn with_voice(&self, voice_name: impl Into<String>) -> Self {
        Self {
            voice_name: voice_name.into(),
            ..self.clone()
        }
    }

    /// Validates numeric ranges and the voice name.
    ///
    /// `path` prefixes every reported field path. `known_clone` is consulted
    /// for voices outside the base catalog; an unknown voice is a warning.
    pub fn validate(&self, path: &str, known_clone: impl Fn(&str) -> bool) -> ValidationResult {
        let mut result = ValidationResult::success();

        check_range(
            &mut result,
            self.pitch,
            PITCH_RANGE,
            ErrorCode::PitchOutOfRange,
            "pitch",
            path,
        );
        check_range(
            &mut result,
            self.speed,
            SPEED_RANGE,
            ErrorCode::SpeedOutOfRange,
            "speed",
            path,
        );
        check_range(
            &mut result,
            self.volume,
            VOLUME_RANGE,
            ErrorCode::VolumeOutOfRange,
            "volume",
            path,
        );

        if self.voice_name.trim().is_empty() {
            result.add_error(ValidationError::with_path(
                ErrorCode::EmptyVoiceName,
                "voice name is empty",
                format!("{}.voiceName", path),
            ));
        } else if base_voice(&self.voice_name).is_none() && !known_clone(&self.voice_name) {
            result.add_warning(ValidationWarning::with_path(
                WarningCode::UnknownVoice,
                format!(
                    "voice '{}' is not a catalog voice or a known clone; it will be sent as-is",
                    self.voice_name
                ),
                format!("{}.voiceName", path),
            ));
        }

        if self.emotion.is_other() {
            result.add_warning(ValidationWarning::with_path(
                WarningCode::UnknownEmotion,
                format!(
                    "emotion '{}' is not a known emotion; it will be forwarded lowercased",
                    self.emotion
                ),
                format!("{}.emotion", path),
            ));
        }

        result
    }
}

fn check_range(
    result: &mut ValidationResult,
    value: f64,
    (min, max): (f64, f64),
    code: ErrorCode,
    field: &str,
    path: &str,
) {
    let field_path = format!("{}.{}", path, field);
    if !value.is_finite() {
        result.add_error(ValidationError::with_path(
            ErrorCode::NonFiniteValue,
            format!("{} must be a finite number", field),
            field_path,
        ));
    } else if value < min || value > max {
        result.add_error(ValidationError::with_path(
            code,
            format!("{} {} outside [{}, {}]", field, value, min, max),
            field_path,
        ));
    }
}
