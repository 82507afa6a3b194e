//! CLI command implementations

pub mod cast;
pub mod clones;
pub mod doctor;
pub mod generate;
pub mod inspect;
pub mod json_output;
pub mod parse;
pub mod presets;
pub mod preview;

mod reporting;

use std::process::ExitCode;

/// Exit code for input, configuration and validation errors.
pub const EXIT_INPUT_ERROR: u8 = 1;

/// Exit code for synthesis, decoding and assembly errors.
pub const EXIT_GENERATION_ERROR: u8 = 2;

pub(crate) fn input_error() -> ExitCode {
    ExitCode::from(EXIT_INPUT_ERROR)
}

pub(crate) fn generation_error() -> ExitCode {
    ExitCode::from(EXIT_GENERATION_ERROR)
}
