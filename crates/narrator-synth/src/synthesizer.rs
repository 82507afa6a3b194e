//! The speech synthesis capability.

use narrator_script::Emotion;
use serde::Serialize;

use crate::directive::compose_prompt;
use crate::error::SynthResult;

/// One synthesis call: what to say, with which base voice, in which mood.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisRequest {
    /// Dialogue text as written in the script.
    pub text: String,
    /// Effective (base) voice id, after clone resolution.
    pub voice_id: String,
    /// Requested emotion.
    pub emotion: Emotion,
    /// Text with the emotion directive applied; this is what gets spoken.
    pub prompt: String,
}

impl SynthesisRequest {
    /// Builds a request, composing the prompt from `text` and `emotion`.
    pub fn new(text: impl Into<String>, voice_id: impl Into<String>, emotion: Emotion) -> Self {
        let text = text.into();
        let prompt = compose_prompt(&text, &emotion);
        Self {
            text,
            voice_id: voice_id.into(),
            emotion,
            prompt,
        }
    }
}

/// Something that turns a request into encoded audio bytes.
///
/// Implementations return the raw payload (a WAV file or headerless PCM);
/// decoding happens in the orchestrator. A call that produces no audio must
/// return an error or an empty vector, never silence it made up.
pub trait Synthesizer {
    /// Synthesizes one request.
    fn synthesize(&self, request: &SynthesisRequest) -> SynthResult<Vec<u8>>;

    /// Short name for logs.
    fn name(&self) -> &str {
        "synthesizer"
    }
}

impl<S: Synthesizer + ?Sized> Synthesizer for &S {
    fn synthesize(&self, request: &SynthesisRequest) -> SynthResult<Vec<u8>> {
        (**self).synthesize(request)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<S: Synthesizer + ?Sized> Synthesizer for Box<S> {
    fn synthesize(&self, request: &SynthesisRequest) -> SynthResult<Vec<u8>> {
        (**self).synthesize(request)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
