//! Script parsing.
//!
//! A script is free-form text in which dialogue is tagged with a speaker name in
//! one of two surface forms:
//!
//! ```text
//! Speaker 1: Hello, are you ready?
//! [Narrator: The sun began to set.]
//! ```
//!
//! Parsing never fails. Text that does not match either form is skipped.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Speaker run of ASCII alphanumerics and horizontal whitespace, terminated by
/// `:` or `]`, followed by the rest of the physical line as dialogue.
const LINE_PATTERN: &str = r"(?:\[)?([a-zA-Z0-9 \t]+)(?::|\])[ \t]*(.*)";

fn line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(LINE_PATTERN).expect("line pattern is a valid regex"))
}

/// One line of dialogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptLine {
    /// Ordinal id (`line_0`, `line_1`, ...), unique within one parse.
    pub id: String,
    /// Speaker name, trimmed. Case and inner whitespace are significant.
    pub speaker: String,
    /// Dialogue text, trimmed, with one trailing `]` removed.
    pub text: String,
}

/// Result of parsing a script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedScript {
    /// Dialogue lines in source order.
    pub lines: Vec<ScriptLine>,
    /// Distinct speaker names in order of first appearance.
    pub speakers: Vec<String>,
    /// BLAKE3 hash of the source text (hex).
    pub source_hash: String,
}

impl ParsedScript {
    /// Returns true if no dialogue was found.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of lines spoken by `speaker`.
    pub fn line_count_for(&self, speaker: &str) -> usize {
        self.lines.iter().filter(|l| l.speaker == speaker).count()
    }
}

/// Parses script text into ordered dialogue lines and the set of speakers.
///
/// # Example
/// ```
/// use narrator_script::parse_script;
///
/// let parsed = parse_script("Narrator: Hi.\n[Bob: Yo.]");
/// assert_eq!(parsed.lines.len(), 2);
/// assert_eq!(parsed.lines[1].speaker, "Bob");
/// assert_eq!(parsed.lines[1].text, "Yo.");
/// assert_eq!(parsed.speakers, vec!["Narrator", "Bob"]);
/// ```
pub fn parse_script(text: &str) -> ParsedScript {
    let mut lines = Vec::new();
    let mut speakers: Vec<String> = Vec::new();

    for caps in line_regex().captures_iter(text) {
        let content = caps.get(2).map_or("", |m| m.as_str()).trim();
        if content.is_empty() {
            continue;
        }

        let cleaned = content.strip_suffix(']').unwrap_or(content);
        if cleaned.is_empty() {
            continue;
        }

        let speaker = caps.get(1).map_or("", |m| m.as_str()).trim();
        if speaker.is_empty() {
            continue;
        }

        lines.push(ScriptLine {
            id: format!("line_{}", lines.len()),
            speaker: speaker.to_string(),
            text: cleaned.to_string(),
        });

        if !speakers.iter().any(|s| s == speaker) {
            speakers.push(speaker.to_string());
        }
    }

    ParsedScript {
        lines,
        speakers,
        source_hash: blake3::hash(text.as_bytes()).to_hex().to_string(),
    }
}
