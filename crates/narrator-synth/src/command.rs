//! Subprocess-backed synthesizer.
//!
//! The synthesizer is an external program. For each request it is invoked as
//!
//! ```text
//! <program> [args...] --request <request.json> --output <audio.out>
//! ```
//!
//! where `request.json` holds a serialized [`SynthesisRequest`]. The program
//! writes the encoded audio (WAV or raw 16-bit PCM) to the output path and
//! exits 0.

use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use crate::error::{SynthError, SynthResult};
use crate::synthesizer::{SynthesisRequest, Synthesizer};

/// Default timeout for a single synthesis call.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Environment variable naming the synthesizer program.
pub const SYNTH_CMD_ENV: &str = "NARRATOR_SYNTH_CMD";

/// Program looked up on PATH when nothing else is configured.
pub const DEFAULT_PROGRAM: &str = "narrator-tts";

/// Configuration for [`CommandSynthesizer`].
#[derive(Debug, Clone)]
pub struct CommandConfig {
    /// Program path or name. Falls back to the environment, then PATH.
    pub program: Option<PathBuf>,
    /// Extra arguments placed before the request/output flags.
    pub args: Vec<String>,
    /// Timeout for one call.
    pub timeout: Duration,
    /// Whether to capture the program's stderr for error messages.
    pub capture_output: bool,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            program: None,
            args: Vec::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            capture_output: true,
        }
    }
}

impl CommandConfig {
    /// Sets the program.
    pub fn program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = Some(program.into());
        self
    }

    /// Appends an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Sets the timeout duration.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the timeout in seconds.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }
}

/// Where the synthesizer program was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramSource {
    /// Explicit configuration.
    Config,
    /// The `NARRATOR_SYNTH_CMD` environment variable.
    Environment,
    /// `narrator-tts` on PATH.
    Path,
}

impl std::fmt::Display for ProgramSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProgramSource::Config => "config",
            ProgramSource::Environment => SYNTH_CMD_ENV,
            ProgramSource::Path => "PATH",
        };
        write!(f, "{}", s)
    }
}

/// Synthesizer that shells out to an external program per request.
#[derive(Debug, Clone, Default)]
pub struct CommandSynthesizer {
    config: CommandConfig,
}

impl CommandSynthesizer {
    /// Creates a synthesizer with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a synthesizer with the given configuration.
    pub fn with_config(config: CommandConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &CommandConfig {
        &self.config
    }

    /// Locates the program: config, then environment, then PATH.
    pub fn resolve_program(&self) -> SynthResult<(PathBuf, ProgramSource)> {
        if let Some(ref program) = self.config.program {
            if let Ok(path) = which::which(program) {
                return Ok((path, ProgramSource::Config));
            }
            tracing::warn!(program = %program.display(), "configured synthesizer not found");
        }

        if let Ok(program) = std::env::var(SYNTH_CMD_ENV) {
            if let Ok(path) = which::which(&program) {
                return Ok((path, ProgramSource::Environment));
            }
            tracing::warn!(program = %program, "{} does not name an executable", SYNTH_CMD_ENV);
        }

        which::which(DEFAULT_PROGRAM)
            .map(|path| (path, ProgramSource::Path))
            .map_err(|_| SynthError::SynthesizerNotFound)
    }
}

impl Synthesizer for CommandSynthesizer {
    fn synthesize(&self, request: &SynthesisRequest) -> SynthResult<Vec<u8>> {
        let (program, _) = self.resolve_program()?;

        let temp_dir = tempfile::tempdir().map_err(SynthError::WriteRequestFailed)?;
        let request_path = temp_dir.path().join("request.json");
        let output_path = temp_dir.path().join("audio.out");

        let request_json = serde_json::to_string(request).map_err(SynthError::SerializeFailed)?;
        std::fs::write(&request_path, request_json).map_err(SynthError::WriteRequestFailed)?;

        let mut cmd = Command::new(&program);
        cmd.args(&self.config.args)
            .arg("--request")
            .arg(&request_path)
            .arg("--output")
            .arg(&output_path)
            .stdin(Stdio::null());

        if self.config.capture_output {
            cmd.stdout(Stdio::null()).stderr(Stdio::piped());
        }

        tracing::debug!(program = %program.display(), voice = %request.voice_id, "invoking synthesizer");
        let child = cmd.spawn().map_err(SynthError::SpawnFailed)?;
        let (status, stderr) =
            wait_with_timeout(child, self.config.timeout, self.config.capture_output)?;

        if !status.success() {
            let exit_code = status.code().unwrap_or(-1);
            return Err(SynthError::process_failed(exit_code, stderr.trim()));
        }

        let audio = std::fs::read(&output_path).map_err(|e| SynthError::ReadOutputFailed {
            path: output_path.clone(),
            source: e,
        })?;
        if audio.is_empty() {
            return Err(SynthError::EmptyPayload {
                voice_id: request.voice_id.clone(),
            });
        }
        Ok(audio)
    }

    fn name(&self) -> &str {
        "command"
    }
}

fn wait_with_timeout(
    mut child: Child,
    timeout: Duration,
    capture_output: bool,
) -> SynthResult<(ExitStatus, String)> {
    let start = Instant::now();

    // The pipe is drained while the child runs so a chatty synthesizer
    // never blocks on a full stderr buffer.
    let stderr_reader = if capture_output {
        child.stderr.take().map(|mut err| {
            std::thread::spawn(move || {
                let mut buf = Vec::new();
                let _ = err.read_to_end(&mut buf);
                buf
            })
        })
    } else {
        None
    };

    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if start.elapsed() > timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(SynthError::Timeout {
                        timeout_secs: timeout.as_secs(),
                    });
                }
                std::thread::sleep(Duration::from_millis(20));
            }
            Err(e) => return Err(SynthError::SpawnFailed(e)),
        }
    };

    let stderr = stderr_reader
        .and_then(|handle| handle.join().ok())
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default();

    Ok((status, stderr))
}
