//! Error types for script handling, registry operations and settings validation.

use thiserror::Error;

/// Result type for script and registry operations.
pub type ScriptResult<T> = Result<T, ScriptError>;

/// Error codes for voice settings validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// V001: Pitch outside [0.5, 1.5]
    PitchOutOfRange,
    /// V002: Speed outside [0.5, 2.0]
    SpeedOutOfRange,
    /// V003: Volume outside [0.0, 1.0]
    VolumeOutOfRange,
    /// V004: Voice name is empty
    EmptyVoiceName,
    /// V005: A numeric field is NaN or infinite
    NonFiniteValue,
}

impl ErrorCode {
    /// Returns the error code string (e.g., "V001").
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCode::PitchOutOfRange => "V001",
            ErrorCode::SpeedOutOfRange => "V002",
            ErrorCode::VolumeOutOfRange => "V003",
            ErrorCode::EmptyVoiceName => "V004",
            ErrorCode::NonFiniteValue => "V005",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Warning codes for voice settings validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarningCode {
    /// W001: Emotion is not one of the known emotions
    UnknownEmotion,
    /// W002: Voice is neither a catalog voice nor a known clone
    UnknownVoice,
}

impl WarningCode {
    /// Returns the warning code string (e.g., "W001").
    pub fn code(&self) -> &'static str {
        match self {
            WarningCode::UnknownEmotion => "W001",
            WarningCode::UnknownVoice => "W002",
        }
    }
}

impl std::fmt::Display for WarningCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A validation error with code, message, and optional field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The error code.
    pub code: ErrorCode,
    /// Human-readable error message.
    pub message: String,
    /// Path to the offending field (e.g., "speakers.Narrator.pitch").
    pub path: Option<String>,
}

impl ValidationError {
    /// Creates a new validation error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: None,
        }
    }

    /// Creates a new validation error with a field path.
    pub fn with_path(code: ErrorCode, message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: Some(path.into()),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ref path) = self.path {
            write!(f, "{}: {} (at {})", self.code, self.message, path)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

impl std::error::Error for ValidationError {}

/// A validation warning with code, message, and optional field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// The warning code.
    pub code: WarningCode,
    /// Human-readable warning message.
    pub message: String,
    /// Path to the field.
    pub path: Option<String>,
}

impl ValidationWarning {
    /// Creates a new validation warning with a field path.
    pub fn with_path(
        code: WarningCode,
        message: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            path: Some(path.into()),
        }
    }
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ref path) = self.path {
            write!(f, "{}: {} (at {})", self.code, self.message, path)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

/// Result of settings validation.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether validation passed (no errors).
    pub ok: bool,
    /// List of validation errors.
    pub errors: Vec<ValidationError>,
    /// List of validation warnings.
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    /// Creates a successful validation result.
    pub fn success() -> Self {
        Self {
            ok: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Adds an error to the result.
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
        self.ok = false;
    }

    /// Adds a warning to the result.
    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Merges another result into this one.
    pub fn merge(&mut self, other: ValidationResult) {
        self.ok &= other.ok;
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Returns true if there are no errors.
    pub fn is_ok(&self) -> bool {
        self.ok
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::success()
    }
}

/// Common trait for errors raised anywhere in the narration pipeline.
///
/// Each crate's error type implements this so callers can report a stable
/// code and a category without matching on every variant.
pub trait CodedError: std::error::Error {
    /// Stable code such as "SCRIPT_002" or "AUDIO_004".
    fn code(&self) -> &'static str;

    /// Human-readable message; defaults to `Display`.
    fn message(&self) -> String {
        self.to_string()
    }

    /// Category for grouping ("script", "audio", "synth").
    fn category(&self) -> &'static str;
}

/// Errors raised by registry, library and persistence operations.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// Speaker is not present in the registry.
    #[error("unknown speaker '{name}'")]
    UnknownSpeaker {
        /// Speaker name.
        name: String,
    },

    /// Preset id does not exist in the library.
    #[error("unknown preset '{id}'")]
    UnknownPreset {
        /// Preset id.
        id: String,
    },

    /// Cloned voice id does not exist in the library.
    #[error("unknown cloned voice '{id}'")]
    UnknownClone {
        /// Clone id.
        id: String,
    },

    /// An entry with this id already exists.
    #[error("duplicate id '{id}'")]
    DuplicateId {
        /// The duplicated id.
        id: String,
    },

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CodedError for ScriptError {
    fn code(&self) -> &'static str {
        match self {
            ScriptError::UnknownSpeaker { .. } => "SCRIPT_001",
            ScriptError::UnknownPreset { .. } => "SCRIPT_002",
            ScriptError::UnknownClone { .. } => "SCRIPT_003",
            ScriptError::DuplicateId { .. } => "SCRIPT_004",
            ScriptError::Json(_) => "SCRIPT_005",
            ScriptError::Io(_) => "SCRIPT_006",
        }
    }

    fn category(&self) -> &'static str {
        "script"
    }
}
