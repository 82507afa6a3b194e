//! Emotion directives.
//!
//! The synthesizer has no emotion parameter; emotion is expressed by
//! rewriting the text into an instruction such as `Say cheerfully: Hello`.

use narrator_script::Emotion;

/// Speaking style for an emotion, or None for Neutral.
pub fn emotion_style(emotion: &Emotion) -> Option<String> {
    let style = match emotion {
        Emotion::Neutral => return None,
        Emotion::Happy => "cheerfully",
        Emotion::Sad => "sadly",
        Emotion::Angry => "angrily",
        Emotion::Surprised => "with surprise",
        Emotion::Excited => "excitedly",
        Emotion::Whispering => "whisper",
        Emotion::Other(other) => return Some(other.to_lowercase()),
    };
    Some(style.to_string())
}

/// Text to send to the synthesizer for `text` spoken with `emotion`.
pub fn compose_prompt(text: &str, emotion: &Emotion) -> String {
    match emotion_style(emotion) {
        Some(style) => format!("Say {}: {}", style, text),
        None => text.to_string(),
    }
}
