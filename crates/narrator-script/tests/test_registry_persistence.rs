//! Registry and library persistence integration tests.

use narrator_script::library::{CLONES_FILE, PRESETS_FILE};
use narrator_script::rng::create_rng;
use narrator_script::{
    parse_script, ClonedVoice, Emotion, VoiceLibrary, VoicePreset, VoiceRegistry, VoiceSettings,
};
use pretty_assertions::assert_eq;

#[test]
fn test_reparse_preserves_customized_speaker() {
    let mut registry = VoiceRegistry::new();
    let mut rng = create_rng(3);

    let a = parse_script("Narrator: It was night.\nBob: I can't see.");
    registry.ensure_speakers(&a.speakers, &VoiceSettings::default(), true, &mut rng);

    let custom = VoiceSettings {
        voice_name: "Charon".to_string(),
        pitch: 0.8,
        speed: 1.4,
        volume: 0.5,
        emotion: Emotion::Whispering,
    };
    registry.update_settings("Bob", custom.clone()).unwrap();

    let b = parse_script("[Bob: Found the light.]\nAlice: Finally.");
    let added = registry.ensure_speakers(&b.speakers, &VoiceSettings::default(), true, &mut rng);

    assert_eq!(added, vec!["Alice"]);
    assert_eq!(registry.get("Bob").unwrap().settings, custom);
    // Speakers missing from the new script are kept.
    assert!(registry.contains("Narrator"));
}

#[test]
fn test_ensure_order_independence() {
    let defaults = VoiceSettings::default();
    let mut forward = VoiceRegistry::new();
    forward.ensure_speakers(["A", "B"], &defaults, false, &mut create_rng(0));
    forward.ensure_speakers(["B", "C"], &defaults, false, &mut create_rng(0));

    let mut backward = VoiceRegistry::new();
    backward.ensure_speakers(["C", "B"], &defaults, false, &mut create_rng(0));
    backward.ensure_speakers(["B", "A"], &defaults, false, &mut create_rng(0));

    assert_eq!(forward, backward);
}

#[test]
fn test_cast_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("story.cast.json");

    let mut registry = VoiceRegistry::new();
    registry.ensure_speakers(
        ["Narrator", "Speaker 1"],
        &VoiceSettings::default(),
        false,
        &mut create_rng(0),
    );
    registry.mark_cloned("Speaker 1", true).unwrap();
    registry.save(&path).unwrap();

    let loaded = VoiceRegistry::load(&path).unwrap();
    assert_eq!(loaded, registry);
    assert_eq!(loaded.get("Speaker 1").unwrap().is_cloned, Some(true));
}

#[test]
fn test_missing_cast_file_is_empty_registry() {
    let dir = tempfile::tempdir().unwrap();
    let loaded = VoiceRegistry::load(&dir.path().join("nope.json")).unwrap();
    assert!(loaded.is_empty());
}

#[test]
fn test_library_round_trip() {
    let dir = tempfile::tempdir().unwrap();

    let library = VoiceLibrary::from_parts(
        vec![ClonedVoice::new("custom_1700000000000", "Grandpa", "Fenrir")],
        vec![VoicePreset {
            id: "preset_1700000000001".to_string(),
            name: "Excited kid".to_string(),
            settings: VoiceSettings {
                voice_name: "Zephyr".to_string(),
                pitch: 1.4,
                speed: 1.3,
                volume: 0.9,
                emotion: Emotion::Excited,
            },
        }],
    );
    library.save(dir.path()).unwrap();

    assert!(dir.path().join(CLONES_FILE).exists());
    assert!(dir.path().join(PRESETS_FILE).exists());

    let loaded = VoiceLibrary::load(dir.path()).unwrap();
    assert_eq!(loaded, library);
}

#[test]
fn test_library_load_migrates_old_presets() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(PRESETS_FILE),
        r#"[{"id":"p1","name":"Legacy","settings":{"voiceName":"Kore","pitch":1.0,"speed":1.0,"volume":1.0}}]"#,
    )
    .unwrap();

    let loaded = VoiceLibrary::load(dir.path()).unwrap();
    assert_eq!(loaded.presets()[0].settings.emotion, Emotion::Neutral);
    assert!(loaded.clones().is_empty());
}
