//! Generation orchestrator.
//!
//! A [`GenerationRun`] walks the script one line at a time. Each step reads
//! the registry as it is at that moment, so edits made between steps apply to
//! lines not yet synthesized. Synthesis fills progress up to 90; assembly and
//! encoding take it to 100.
//!
//! [`Orchestrator::generate`] drives a whole run in one call.

use narrator_backend_audio::{
    concatenate, decode_audio, mix, AudioBuffer, DecodeOptions, WavResult,
    DEFAULT_BACKGROUND_LEVEL,
};
use narrator_script::{
    resolve_effective_voice, ClonedVoice, ScriptLine, VoiceRegistry, VoiceSettings,
};
use serde::Serialize;

use crate::error::{SynthError, SynthResult};
use crate::synthesizer::{SynthesisRequest, Synthesizer};

/// Share of progress reserved for per-line synthesis.
const SYNTHESIS_SHARE: f64 = 0.9;

/// Where a generation run is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    /// Nothing started.
    Idle,
    /// Synthesizing lines.
    Generating,
    /// Concatenating, mixing and encoding.
    Combining,
    /// Finished with output.
    Completed,
    /// Aborted; no output.
    Failed,
}

impl ProcessingStatus {
    /// Returns the lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingStatus::Idle => "idle",
            ProcessingStatus::Generating => "generating",
            ProcessingStatus::Combining => "combining",
            ProcessingStatus::Completed => "completed",
            ProcessingStatus::Failed => "failed",
        }
    }

    /// Returns true for Completed and Failed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProcessingStatus::Completed | ProcessingStatus::Failed)
    }
}

impl std::fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Progress after `done` of `total` lines: `round(100 * done / total * 0.9)`.
pub fn synthesis_progress(done: usize, total: usize) -> u8 {
    if total == 0 {
        return (100.0 * SYNTHESIS_SHARE).round() as u8;
    }
    (100.0 * (done as f64 / total as f64) * SYNTHESIS_SHARE).round() as u8
}

/// What happened to one line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LineOutcome {
    /// Audio was synthesized and decoded.
    Synthesized {
        line_id: String,
        speaker: String,
        voice_id: String,
        frames: usize,
    },
    /// The speaker had no configuration; the line contributes no audio.
    Skipped { line_id: String, speaker: String },
}

impl LineOutcome {
    /// Id of the line.
    pub fn line_id(&self) -> &str {
        match self {
            LineOutcome::Synthesized { line_id, .. } | LineOutcome::Skipped { line_id, .. } => {
                line_id
            }
        }
    }
}

/// Progress notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressUpdate {
    /// Current status.
    pub status: ProcessingStatus,
    /// Progress, 0 to 100.
    pub progress: u8,
    /// The line just processed, if any.
    pub line: Option<LineOutcome>,
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct GenerationOutput {
    /// Encoded narration.
    pub wav: WavResult,
    /// Number of lines that produced audio.
    pub lines_synthesized: usize,
    /// Ids of lines skipped for lack of a speaker configuration.
    pub skipped: Vec<String>,
}

impl GenerationOutput {
    /// Duration of the narration in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.wav.duration_seconds()
    }
}

/// Options shared by every run of an [`Orchestrator`].
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    /// How to read headerless payloads.
    pub decode: DecodeOptions,
    /// Gain applied to a background track.
    pub background_level: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            decode: DecodeOptions::default(),
            background_level: DEFAULT_BACKGROUND_LEVEL,
        }
    }
}

/// Synthesizes one text with one speaker's settings and decodes the result.
fn synthesize_text<S: Synthesizer + ?Sized>(
    synthesizer: &S,
    text: &str,
    settings: &VoiceSettings,
    clones: &[ClonedVoice],
    decode: &DecodeOptions,
) -> SynthResult<(String, AudioBuffer)> {
    let voice_id = resolve_effective_voice(settings, clones).to_string();
    let request = SynthesisRequest::new(text, voice_id.clone(), settings.emotion.clone());

    let payload = synthesizer.synthesize(&request)?;
    if payload.is_empty() {
        return Err(SynthError::EmptyPayload { voice_id });
    }
    let audio = decode_audio(&payload, decode).map_err(SynthError::Decode)?;
    Ok((voice_id, audio))
}

/// State of one generation over a fixed list of lines.
#[derive(Debug, Clone)]
pub struct GenerationRun {
    lines: Vec<ScriptLine>,
    buffers: Vec<AudioBuffer>,
    skipped: Vec<String>,
    next: usize,
    status: ProcessingStatus,
    progress: u8,
}

impl GenerationRun {
    /// Starts a run over `lines`, in order.
    pub fn new(lines: Vec<ScriptLine>) -> Self {
        Self {
            lines,
            buffers: Vec::new(),
            skipped: Vec::new(),
            next: 0,
            status: ProcessingStatus::Generating,
            progress: 0,
        }
    }

    /// Current status.
    pub fn status(&self) -> ProcessingStatus {
        self.status
    }

    /// Current progress, 0 to 100.
    pub fn progress(&self) -> u8 {
        self.progress
    }

    /// Total number of lines.
    pub fn total(&self) -> usize {
        self.lines.len()
    }

    /// Lines processed so far, synthesized or skipped.
    pub fn completed(&self) -> usize {
        self.next
    }

    /// Returns true once every line has been processed.
    pub fn is_synthesis_done(&self) -> bool {
        self.next >= self.lines.len()
    }

    /// Snapshot for progress reporting.
    pub fn update(&self, line: Option<LineOutcome>) -> ProgressUpdate {
        ProgressUpdate {
            status: self.status,
            progress: self.progress,
            line,
        }
    }

    /// Processes the next line. Returns None when all lines are done.
    ///
    /// A failure moves the run to Failed and drops everything synthesized so
    /// far.
    pub fn step<S: Synthesizer + ?Sized>(
        &mut self,
        synthesizer: &S,
        registry: &VoiceRegistry,
        clones: &[ClonedVoice],
        decode: &DecodeOptions,
    ) -> SynthResult<Option<LineOutcome>> {
        if self.status != ProcessingStatus::Generating {
            return Err(SynthError::InvalidState {
                action: "synthesize",
                status: self.status,
            });
        }
        let Some(line) = self.lines.get(self.next) else {
            return Ok(None);
        };

        let outcome = match registry.get(&line.speaker) {
            None => {
                tracing::warn!(line = %line.id, speaker = %line.speaker, "no voice configured, skipping line");
                self.skipped.push(line.id.clone());
                LineOutcome::Skipped {
                    line_id: line.id.clone(),
                    speaker: line.speaker.clone(),
                }
            }
            Some(config) => {
                match synthesize_text(synthesizer, &line.text, &config.settings, clones, decode) {
                    Ok((voice_id, audio)) => {
                        tracing::debug!(
                            line = %line.id,
                            speaker = %line.speaker,
                            voice = %voice_id,
                            frames = audio.len(),
                            "line synthesized"
                        );
                        let frames = audio.len();
                        self.buffers.push(audio);
                        LineOutcome::Synthesized {
                            line_id: line.id.clone(),
                            speaker: line.speaker.clone(),
                            voice_id,
                            frames,
                        }
                    }
                    Err(e) => {
                        tracing::debug!(line = %line.id, error = %e, "line failed, aborting run");
                        self.fail();
                        return Err(e);
                    }
                }
            }
        };

        self.next += 1;
        self.progress = synthesis_progress(self.next, self.lines.len());
        Ok(Some(outcome))
    }

    /// Concatenates, optionally mixes `background` under the result, and
    /// encodes. All lines must have been processed.
    pub fn finish(
        &mut self,
        background: Option<(&AudioBuffer, f32)>,
    ) -> SynthResult<GenerationOutput> {
        if self.status != ProcessingStatus::Generating || !self.is_synthesis_done() {
            return Err(SynthError::InvalidState {
                action: "combine",
                status: self.status,
            });
        }
        self.status = ProcessingStatus::Combining;

        match self.assemble(background) {
            Ok(wav) => {
                self.status = ProcessingStatus::Completed;
                self.progress = 100;
                let lines_synthesized = self.buffers.len();
                self.buffers.clear();
                tracing::info!(
                    lines = lines_synthesized,
                    skipped = self.skipped.len(),
                    frames = wav.num_frames,
                    "narration complete"
                );
                Ok(GenerationOutput {
                    wav,
                    lines_synthesized,
                    skipped: std::mem::take(&mut self.skipped),
                })
            }
            Err(e) => {
                self.fail();
                Err(e)
            }
        }
    }

    fn assemble(&self, background: Option<(&AudioBuffer, f32)>) -> SynthResult<WavResult> {
        let speech = concatenate(&self.buffers).map_err(SynthError::Assembly)?;
        let full = match background {
            Some((bg, level)) => mix(&speech, bg, level).map_err(SynthError::Assembly)?,
            None => speech,
        };
        WavResult::from_buffer(&full).map_err(SynthError::Assembly)
    }

    fn fail(&mut self) {
        self.status = ProcessingStatus::Failed;
        self.buffers.clear();
    }
}

/// Playback hints for a preview. Pitch is left to the synthesizer.
#[derive(Debug, Clone)]
pub struct Preview {
    /// Speaker previewed.
    pub speaker: String,
    /// Effective voice id used.
    pub voice_id: String,
    /// Text spoken.
    pub text: String,
    /// Decoded audio.
    pub audio: AudioBuffer,
    /// Suggested playback rate (the speaker's speed).
    pub playback_rate: f64,
    /// Suggested gain (the speaker's volume).
    pub gain: f64,
}

/// Preview sentence for a speaker.
pub fn preview_text(speaker: &str) -> String {
    format!("Hello, I am {}. This is how I sound.", speaker)
}

/// Runs generations and previews against one synthesizer.
#[derive(Debug, Clone)]
pub struct Orchestrator<S> {
    synthesizer: S,
    config: GenerationConfig,
}

impl<S: Synthesizer> Orchestrator<S> {
    /// Creates an orchestrator with default configuration.
    pub fn new(synthesizer: S) -> Self {
        Self::with_config(synthesizer, GenerationConfig::default())
    }

    /// Creates an orchestrator with the given configuration.
    pub fn with_config(synthesizer: S, config: GenerationConfig) -> Self {
        Self {
            synthesizer,
            config,
        }
    }

    /// The synthesizer in use.
    pub fn synthesizer(&self) -> &S {
        &self.synthesizer
    }

    /// The configuration in use.
    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Processes the next line of `run` with this orchestrator's synthesizer.
    pub fn step(
        &self,
        run: &mut GenerationRun,
        registry: &VoiceRegistry,
        clones: &[ClonedVoice],
    ) -> SynthResult<Option<LineOutcome>> {
        run.step(&self.synthesizer, registry, clones, &self.config.decode)
    }

    /// Generates the whole narration for `lines`.
    ///
    /// `on_progress` is called after every line and again when combining
    /// starts and when the run ends successfully. The first failing line
    /// aborts the run.
    pub fn generate<F>(
        &self,
        lines: &[ScriptLine],
        registry: &VoiceRegistry,
        clones: &[ClonedVoice],
        background: Option<&AudioBuffer>,
        mut on_progress: F,
    ) -> SynthResult<GenerationOutput>
    where
        F: FnMut(&ProgressUpdate),
    {
        let mut run = GenerationRun::new(lines.to_vec());
        tracing::debug!(lines = run.total(), synthesizer = self.synthesizer.name(), "generation started");
        on_progress(&run.update(None));

        while let Some(outcome) = self.step(&mut run, registry, clones)? {
            on_progress(&run.update(Some(outcome)));
        }

        on_progress(&ProgressUpdate {
            status: ProcessingStatus::Combining,
            progress: run.progress(),
            line: None,
        });
        let output = run.finish(background.map(|bg| (bg, self.config.background_level)))?;
        on_progress(&run.update(None));
        Ok(output)
    }

    /// Synthesizes the preview sentence with `speaker`'s current settings.
    ///
    /// Touches nothing but the returned value; a failure here leaves any
    /// generation state alone.
    pub fn preview(
        &self,
        speaker: &str,
        registry: &VoiceRegistry,
        clones: &[ClonedVoice],
    ) -> SynthResult<Preview> {
        let config = registry
            .get(speaker)
            .ok_or_else(|| SynthError::UnknownSpeaker {
                name: speaker.to_string(),
            })?;

        let text = preview_text(speaker);
        let (voice_id, audio) = synthesize_text(
            &self.synthesizer,
            &text,
            &config.settings,
            clones,
            &self.config.decode,
        )?;

        Ok(Preview {
            speaker: speaker.to_string(),
            voice_id,
            text,
            audio,
            playback_rate: config.settings.speed,
            gain: config.settings.volume,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use narrator_script::{parse_script, SpeakerConfig};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    /// Returns `frames` of raw silence and records every request.
    struct Recorder {
        frames: usize,
        requests: RefCell<Vec<SynthesisRequest>>,
    }

    impl Recorder {
        fn new(frames: usize) -> Self {
            Self {
                frames,
                requests: RefCell::new(Vec::new()),
            }
        }
    }

    impl Synthesizer for Recorder {
        fn synthesize(&self, request: &SynthesisRequest) -> SynthResult<Vec<u8>> {
            self.requests.borrow_mut().push(request.clone());
            Ok(vec![0; self.frames * 2])
        }
    }

    fn registry_for(names: &[&str]) -> VoiceRegistry {
        let mut registry = VoiceRegistry::new();
        for name in names {
            registry.upsert(SpeakerConfig::new(*name, VoiceSettings::default()));
        }
        registry
    }

    #[test]
    fn test_synthesis_progress() {
        assert_eq!(synthesis_progress(0, 4), 0);
        assert_eq!(synthesis_progress(1, 4), 23);
        assert_eq!(synthesis_progress(2, 4), 45);
        assert_eq!(synthesis_progress(4, 4), 90);
        assert_eq!(synthesis_progress(1, 3), 30);
        assert_eq!(synthesis_progress(0, 0), 90);
    }

    #[test]
    fn test_status_names() {
        assert_eq!(ProcessingStatus::Combining.to_string(), "combining");
        assert!(ProcessingStatus::Failed.is_terminal());
        assert!(!ProcessingStatus::Generating.is_terminal());
    }

    #[test]
    fn test_skipped_line_advances_progress() {
        let parsed = parse_script("A: one\nGhost: two");
        let registry = registry_for(&["A"]);
        let synth = Recorder::new(10);

        let mut run = GenerationRun::new(parsed.lines);
        let first = run
            .step(&synth, &registry, &[], &DecodeOptions::default())
            .unwrap()
            .unwrap();
        assert!(matches!(first, LineOutcome::Synthesized { frames: 10, .. }));
        assert_eq!(run.progress(), 45);

        let second = run
            .step(&synth, &registry, &[], &DecodeOptions::default())
            .unwrap()
            .unwrap();
        assert_eq!(
            second,
            LineOutcome::Skipped {
                line_id: "line_1".to_string(),
                speaker: "Ghost".to_string()
            }
        );
        assert_eq!(run.progress(), 90);
        assert!(run
            .step(&synth, &registry, &[], &DecodeOptions::default())
            .unwrap()
            .is_none());

        let output = run.finish(None).unwrap();
        assert_eq!(output.lines_synthesized, 1);
        assert_eq!(output.skipped, vec!["line_1"]);
        assert_eq!(output.wav.num_frames, 10);
        assert_eq!(run.status(), ProcessingStatus::Completed);
        assert_eq!(run.progress(), 100);
        assert_eq!(synth.requests.borrow().len(), 1);
    }

    #[test]
    fn test_finish_before_done_is_rejected() {
        let parsed = parse_script("A: one");
        let mut run = GenerationRun::new(parsed.lines);
        assert!(matches!(
            run.finish(None),
            Err(SynthError::InvalidState { action: "combine", .. })
        ));
    }

    #[test]
    fn test_request_uses_emotion_and_clone_base() {
        let mut registry = registry_for(&["Bob"]);
        let settings = VoiceSettings {
            emotion: narrator_script::Emotion::Sad,
            ..VoiceSettings::default().with_voice("custom_1")
        };
        registry.update_settings("Bob", settings).unwrap();
        let clones = vec![ClonedVoice::new("custom_1", "Grandpa", "Fenrir")];

        let synth = Recorder::new(1);
        Orchestrator::new(&synth)
            .generate(&parse_script("Bob: Goodbye.").lines, &registry, &clones, None, |_| {})
            .unwrap();

        let requests = synth.requests.borrow();
        assert_eq!(requests[0].voice_id, "Fenrir");
        assert_eq!(requests[0].prompt, "Say sadly: Goodbye.");
        // Stored settings keep the clone id.
        assert_eq!(registry.get("Bob").unwrap().settings.voice_name, "custom_1");
    }

    #[test]
    fn test_preview() {
        let mut registry = registry_for(&["Narrator"]);
        let settings = VoiceSettings {
            speed: 1.5,
            volume: 0.4,
            ..VoiceSettings::default().with_voice("Kore")
        };
        registry.update_settings("Narrator", settings).unwrap();

        let synth = Recorder::new(5);
        let preview = Orchestrator::new(&synth)
            .preview("Narrator", &registry, &[])
            .unwrap();

        assert_eq!(preview.text, "Hello, I am Narrator. This is how I sound.");
        assert_eq!(preview.voice_id, "Kore");
        assert_eq!(preview.playback_rate, 1.5);
        assert_eq!(preview.gain, 0.4);
        assert_eq!(preview.audio.len(), 5);
    }

    #[test]
    fn test_preview_unknown_speaker() {
        let synth = Recorder::new(5);
        let err = Orchestrator::new(&synth)
            .preview("Nobody", &VoiceRegistry::new(), &[])
            .unwrap_err();
        assert!(matches!(err, SynthError::UnknownSpeaker { .. }));
        assert!(synth.requests.borrow().is_empty());
    }
}
