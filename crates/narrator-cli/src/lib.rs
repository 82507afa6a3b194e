//! Narrator CLI library.
//!
//! Configuration resolution, script/cast/library loading, and the command
//! implementations behind the `narrator` binary.

pub mod commands;
pub mod config;
pub mod input;
