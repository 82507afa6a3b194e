//! Command-level tests against temporary scripts and libraries.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use narrator_cli::commands::cast::{self, CastOptions};
use narrator_cli::commands::{clones, generate, inspect, presets, EXIT_INPUT_ERROR};
use narrator_cli::config::SynthArgs;
use narrator_script::{Emotion, VoiceLibrary, VoiceRegistry};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new(script: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("story.txt"), script).unwrap();
        Self { dir }
    }

    fn script(&self) -> String {
        self.dir.path().join("story.txt").display().to_string()
    }

    fn cast_path(&self) -> PathBuf {
        self.dir.path().join("story.cast.json")
    }

    fn library(&self) -> PathBuf {
        self.dir.path().join("library")
    }

    fn registry(&self) -> VoiceRegistry {
        VoiceRegistry::load(&self.cast_path()).unwrap()
    }

    fn cast(&self, options: CastOptions) -> ExitCode {
        cast::run(&self.script(), &self.library(), &options).unwrap()
    }
}

fn edits(set: &[&str]) -> CastOptions {
    CastOptions {
        set: set.iter().map(|s| s.to_string()).collect(),
        ..CastOptions::default()
    }
}

#[test]
fn test_cast_registers_script_speakers() {
    let ws = Workspace::new("Narrator: Once upon a time.\n[Bob: Hi!]\nNarrator: The end.");

    assert_eq!(ws.cast(CastOptions::default()), ExitCode::SUCCESS);

    let registry = ws.registry();
    let names: Vec<&str> = registry.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Bob", "Narrator"]);
    assert_eq!(registry.get("Bob").unwrap().settings.voice_name, "Puck");
}

#[test]
fn test_cast_edits_persist_and_rerun_keeps_them() {
    let ws = Workspace::new("Narrator: Once.\nBob: Hi.");

    let code = ws.cast(edits(&[
        "Bob=voice:Charon",
        "Bob=pitch:1.2",
        "Bob=emotion:Whispering",
    ]));
    assert_eq!(code, ExitCode::SUCCESS);

    // A second run without edits, seeded randomization included, leaves Bob alone.
    let code = ws.cast(CastOptions {
        randomize: true,
        seed: Some(9),
        ..CastOptions::default()
    });
    assert_eq!(code, ExitCode::SUCCESS);

    let bob = ws.registry().get("Bob").cloned().unwrap();
    assert_eq!(bob.settings.voice_name, "Charon");
    assert_eq!(bob.settings.pitch, 1.2);
    assert_eq!(bob.settings.emotion, Emotion::Whispering);
}

#[test]
fn test_cast_out_of_range_is_not_written() {
    let ws = Workspace::new("Bob: Hi.");

    let code = ws.cast(edits(&["Bob=volume:1.5"]));
    assert_eq!(code, ExitCode::from(EXIT_INPUT_ERROR));
    assert!(!ws.cast_path().exists());
}

#[test]
fn test_cast_unknown_speaker_is_an_error() {
    let ws = Workspace::new("Bob: Hi.");
    let result = cast::run(&ws.script(), &ws.library(), &edits(&["Alice=pitch:1.1"]));
    assert!(result.is_err());
}

#[test]
fn test_cast_clone_voice_marks_speaker() {
    let ws = Workspace::new("Grandpa: Sit down, children.");
    assert_eq!(
        clones::add(&ws.library(), "Grandpa", Some("Charon")).unwrap(),
        ExitCode::SUCCESS
    );
    let clone_id = VoiceLibrary::load(&ws.library()).unwrap().clones()[0]
        .id
        .clone();

    let edit = format!("Grandpa=voice:{}", clone_id);
    assert_eq!(ws.cast(edits(&[edit.as_str()])), ExitCode::SUCCESS);

    let registry = ws.registry();
    let grandpa = registry.get("Grandpa").unwrap();
    assert_eq!(grandpa.settings.voice_name, clone_id);
    assert_eq!(grandpa.is_cloned, Some(true));

    let library = VoiceLibrary::load(&ws.library()).unwrap();
    assert_eq!(
        registry.effective_voice("Grandpa", library.clones()).as_deref(),
        Some("Charon")
    );
}

#[test]
fn test_preset_save_and_apply() {
    let ws = Workspace::new("Narrator: Once.\nBob: Hi.");
    ws.cast(edits(&["Bob=voice:Kore", "Bob=speed:1.5", "Bob=emotion:Happy"]));

    let code = presets::save(&ws.library(), "Chipper", &ws.script(), "Bob", None).unwrap();
    assert_eq!(code, ExitCode::SUCCESS);

    let library = VoiceLibrary::load(&ws.library()).unwrap();
    assert_eq!(library.presets().len(), 1);
    let preset = &library.presets()[0];
    assert_eq!(preset.name, "Chipper");
    assert!(preset.id.starts_with("preset_"));

    let code = ws.cast(CastOptions {
        presets: vec![format!("Narrator={}", preset.id)],
        ..CastOptions::default()
    });
    assert_eq!(code, ExitCode::SUCCESS);

    let narrator = ws.registry().get("Narrator").cloned().unwrap();
    assert_eq!(narrator.settings, preset.settings);

    assert_eq!(
        presets::remove(&ws.library(), &preset.id).unwrap(),
        ExitCode::SUCCESS
    );
    assert!(VoiceLibrary::load(&ws.library()).unwrap().presets().is_empty());
}

#[test]
fn test_clone_lifecycle() {
    let ws = Workspace::new("");
    let lib = ws.library();

    assert_eq!(clones::add(&lib, "Grandpa", None).unwrap(), ExitCode::SUCCESS);
    let id = VoiceLibrary::load(&lib).unwrap().clones()[0].id.clone();
    assert!(id.starts_with("custom_"));

    clones::rename(&lib, &id, "Grandma").unwrap();
    clones::favorite(&lib, &id).unwrap();

    let library = VoiceLibrary::load(&lib).unwrap();
    let clone = library.clone_by_id(&id).unwrap();
    assert_eq!(clone.name, "Grandma");
    assert_eq!(clone.base_voice_map, "Fenrir");
    assert!(clone.favorite());

    clones::remove(&lib, &id).unwrap();
    assert!(VoiceLibrary::load(&lib).unwrap().clones().is_empty());
    assert!(clones::remove(&lib, &id).is_err());
}

#[test]
fn test_clone_with_unknown_base_is_rejected() {
    let ws = Workspace::new("");
    let code = clones::add(&ws.library(), "Robot", Some("Marvin")).unwrap();
    assert_eq!(code, ExitCode::from(EXIT_INPUT_ERROR));
    assert!(!ws.library().join("clones.json").exists());
}

#[test]
fn test_inspect_rejects_non_wav() {
    let ws = Workspace::new("Bob: Hi.");
    let code = inspect::run(&ws.script(), true).unwrap();
    assert_eq!(code, ExitCode::from(EXIT_INPUT_ERROR));
}

#[cfg(unix)]
fn sh_synth(script: &str) -> SynthArgs {
    SynthArgs {
        synth_cmd: Some(PathBuf::from("sh")),
        synth_args: vec!["-c".into(), script.into(), "narrator-tts".into()],
        timeout: 10,
        ..SynthArgs::default()
    }
}

#[cfg(unix)]
fn generate_to(ws: &Workspace, synth: SynthArgs) -> (ExitCode, PathBuf) {
    let out = ws.dir.path().join("renders").join("story.wav");
    let options = generate::GenerateOptions {
        out: Some(out.display().to_string()),
        synth,
        ..generate::GenerateOptions::default()
    };
    let code = generate::run(&ws.script(), &ws.library(), &options).unwrap();
    (code, out)
}

#[cfg(unix)]
#[test]
fn test_generate_writes_story() {
    let ws = Workspace::new("Narrator: Once upon a time.\nBob: Hi!");

    // 3000 frames of raw 16-bit silence per line
    let (code, out) = generate_to(&ws, sh_synth(r#"head -c 6000 /dev/zero > "$4""#));
    assert_eq!(code, ExitCode::SUCCESS);

    let bytes = fs::read(&out).unwrap();
    assert_eq!(bytes.len(), 44 + 2 * 6000);
    assert_eq!(inspect::run(&out.display().to_string(), true).unwrap(), ExitCode::SUCCESS);

    // Speakers were registered on the way.
    assert_eq!(ws.registry().len(), 2);
}

#[cfg(unix)]
#[test]
fn test_generate_failure_writes_nothing() {
    let ws = Workspace::new("Narrator: Once.\nBob: Hi.");

    let (code, out) = generate_to(&ws, sh_synth("echo overloaded 1>&2; exit 1"));
    assert_eq!(code, ExitCode::from(2));
    assert!(!out.exists());
}

#[cfg(unix)]
#[test]
fn test_generate_refuses_invalid_cast() {
    let ws = Workspace::new("Bob: Hi.");
    ws.cast(CastOptions::default());

    let mut registry = ws.registry();
    let mut settings = registry.get("Bob").unwrap().settings.clone();
    settings.speed = 9.0;
    registry.update_settings("Bob", settings).unwrap();
    registry.save(&ws.cast_path()).unwrap();

    let (code, out) = generate_to(&ws, sh_synth(r#"head -c 2 /dev/zero > "$4""#));
    assert_eq!(code, ExitCode::from(EXIT_INPUT_ERROR));
    assert!(!out.exists());
}

#[test]
fn test_randomize_without_seed_follows_script_text() {
    let script = "Narrator: Once.\nBob: Hi.\nAlice: Hello.\nGrandpa: Sit.\nKid: Why?";
    let voices = |ws: &Workspace| -> Vec<String> {
        ws.registry()
            .iter()
            .map(|c| c.settings.voice_name.clone())
            .collect()
    };
    let randomize = || CastOptions {
        randomize: true,
        ..CastOptions::default()
    };

    let first = Workspace::new(script);
    let second = Workspace::new(script);
    assert_eq!(first.cast(randomize()), ExitCode::SUCCESS);
    assert_eq!(second.cast(randomize()), ExitCode::SUCCESS);

    assert_eq!(voices(&first), voices(&second));
    assert_eq!(first.registry().len(), 5);
}

#[test]
fn test_back_to_back_ids_do_not_collide() {
    let ws = Workspace::new("Bob: Hi.");
    let lib = ws.library();

    for name in ["Grandpa", "Grandma", "Uncle"] {
        assert_eq!(clones::add(&lib, name, None).unwrap(), ExitCode::SUCCESS);
    }
    ws.cast(CastOptions::default());
    for name in ["Calm", "Loud"] {
        let code = presets::save(&lib, name, &ws.script(), "Bob", None).unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
    }

    let library = VoiceLibrary::load(&lib).unwrap();
    let mut clone_ids: Vec<&str> = library.clones().iter().map(|c| c.id.as_str()).collect();
    clone_ids.dedup();
    assert_eq!(clone_ids.len(), 3);
    assert_eq!(library.presets().len(), 2);
    assert_ne!(library.presets()[0].id, library.presets()[1].id);
}
