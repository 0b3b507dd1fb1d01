/*!
 * Tests for configuration types and defaults
 */

use autovoice::app_config::{CharacterVoiceConfig, Config};

#[test]
fn test_config_deserialize_withMinimalJson_shouldApplyDefaults() {
    let config: Config = serde_json::from_str(r#"{ "work_dir": "/tmp/project" }"#).unwrap();

    assert_eq!(config.work_dir, "/tmp/project");
    assert_eq!(config.audio_dir, "vocal");
    assert_eq!(config.concurrent_tasks, 3);
    assert_eq!(config.translation.target_language, "ja");
    assert_eq!(config.translation.neutral_language, "zh");
    assert!(config.characters.is_empty());
}

#[test]
fn test_character_config_deserialize_withPartialJson_shouldApplyDefaults() {
    let voice: CharacterVoiceConfig = serde_json::from_str(
        r#"{ "gpt_model_path": "models/a.ckpt", "auto_mode": true }"#,
    )
    .unwrap();

    assert_eq!(voice.gpt_model_path, "models/a.ckpt");
    assert!(voice.auto_mode);
    assert!(voice.translation_enabled);
    assert_eq!(voice.prompt_language, "zh");
    assert_eq!(voice.inference.top_k, 15);
    assert_eq!(voice.inference.speed, 1.0);
}

#[test]
fn test_validate_withEmptyWorkDir_shouldFail() {
    let config = Config::default();

    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withZeroConcurrency_shouldFail() {
    let config = Config {
        work_dir: "/tmp/project".to_string(),
        concurrent_tasks: 0,
        ..Config::default()
    };

    assert!(config.validate().is_err());
}

#[test]
fn test_character_config_lookup_shouldReturnConfiguredCharacter() {
    let mut config = Config {
        work_dir: "/tmp/project".to_string(),
        ..Config::default()
    };
    config
        .characters
        .insert("alice".to_string(), CharacterVoiceConfig::default());

    assert!(config.character_config("alice").is_some());
    assert!(config.character_config("bob").is_none());

    let mut known = config.known_characters();
    known.sort();
    assert_eq!(known, vec!["alice".to_string()]);
}
