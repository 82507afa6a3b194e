//! Narrator Script Library
//!
//! This crate holds the script-side model of the narration pipeline: parsing a
//! multi-speaker script, the voice settings model, the speaker registry, and
//! the persisted library of cloned voices and presets.
//!
//! # Example
//!
//! ```
//! use narrator_script::{parse_script, rng::create_rng, VoiceRegistry, VoiceSettings};
//!
//! let parsed = parse_script("Narrator: Once upon a time.\n[Bob: Hi!]");
//!
//! let mut registry = VoiceRegistry::new();
//! registry.ensure_speakers(&parsed.speakers, &VoiceSettings::default(), true, &mut create_rng(7));
//! assert_eq!(registry.len(), 2);
//!
//! // Re-parsing an edited script keeps existing speakers untouched.
//! let before = registry.get("Bob").cloned();
//! let edited = parse_script("Bob: Hello again.\nAlice: Who are you?");
//! registry.ensure_speakers(&edited.speakers, &VoiceSettings::default(), true, &mut create_rng(8));
//! assert_eq!(registry.get("Bob").cloned(), before);
//! assert_eq!(registry.len(), 3);
//! ```
//!
//! # Modules
//!
//! - [`script`]: Script parser
//! - [`voice`]: Voice settings, emotions and the base voice catalog
//! - [`registry`]: Speaker registry, clone resolution and preset application
//! - [`library`]: Cloned voices and presets with JSON persistence
//! - [`error`]: Error, validation and coded-error types
//! - [`rng`]: Seeded RNG helpers

pub mod error;
pub mod library;
pub mod registry;
pub mod rng;
pub mod script;
pub mod voice;

// Re-export commonly used types at the crate root
pub use error::{
    CodedError, ErrorCode, ScriptError, ScriptResult, ValidationError, ValidationResult,
    ValidationWarning, WarningCode,
};
pub use library::{ClonedVoice, VoiceLibrary, VoicePreset, DEFAULT_CLONE_BASE};
pub use registry::{apply_preset, resolve_effective_voice, SpeakerConfig, VoiceRegistry};
pub use script::{parse_script, ParsedScript, ScriptLine};
pub use voice::{base_voice, BaseVoice, Emotion, Gender, VoiceSettings, BASE_VOICES};
