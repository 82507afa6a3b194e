//! Narrator Synthesis
//!
//! Drives an external speech synthesizer line by line and assembles the
//! results into one WAV narration.
//!
//! - [`Synthesizer`] is the capability: request in, encoded audio out.
//!   [`CommandSynthesizer`] implements it by running an external program.
//! - [`Orchestrator`] runs a whole generation or a single-speaker preview;
//!   [`GenerationRun`] exposes the same work one line at a time.
//! - [`directive`] maps emotions onto spoken instructions.

pub mod command;
pub mod directive;
pub mod error;
pub mod orchestrator;
pub mod synthesizer;

pub use command::{CommandConfig, CommandSynthesizer, ProgramSource};
pub use directive::{compose_prompt, emotion_style};
pub use error::{SynthError, SynthResult};
pub use orchestrator::{
    preview_text, synthesis_progress, GenerationConfig, GenerationOutput, GenerationRun,
    LineOutcome, Orchestrator, Preview, ProcessingStatus, ProgressUpdate,
};
pub use synthesizer::{SynthesisRequest, Synthesizer};
