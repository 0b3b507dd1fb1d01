/*!
 * Tests for the translation and selection modes
 */

use std::path::Path;
use std::sync::Arc;

use autovoice::app_config::CharacterVoiceConfig;
use autovoice::errors::SelectionError;
use autovoice::providers::mock::MockTranslationClient;
use autovoice::providers::SelectionResponse;
use autovoice::snapshot_cache::IdentityKey;
use autovoice::translation::selector::{SelectorOptions, TranslationSelector};
use autovoice::translation::TranslateTask;

use crate::common;

fn options(work_dir: &Path) -> SelectorOptions {
    SelectorOptions {
        work_dir: work_dir.to_path_buf(),
        neutral_language: "zh".to_string(),
    }
}

fn task_for(character: &str, text: &str, voice: Option<CharacterVoiceConfig>) -> TranslateTask {
    let auto_mode = voice.as_ref().map(|v| v.auto_mode).unwrap_or(false);
    TranslateTask {
        key: IdentityKey {
            character: character.to_string(),
            text: text.to_string(),
            occurrence: 0,
        },
        character: character.to_string(),
        text: text.to_string(),
        target_language: "ja".to_string(),
        audio_filename: "out.wav".to_string(),
        context: None,
        voice,
        auto_mode,
    }
}

fn auto_voice(work_dir: &Path, character: &str) -> CharacterVoiceConfig {
    let (gpt, sovits, refs) = common::create_model_tree(work_dir, character).unwrap();
    CharacterVoiceConfig {
        gpt_model_path: gpt,
        sovits_model_path: sovits,
        ref_audio_path: refs,
        auto_mode: true,
        ..CharacterVoiceConfig::default()
    }
}

#[tokio::test]
async fn test_process_withTranslationDisabled_shouldPassThrough() {
    let temp = common::create_temp_dir().unwrap();
    let client = Arc::new(MockTranslationClient::working());
    let selector = TranslationSelector::new(client.clone(), options(temp.path()));

    let voice = CharacterVoiceConfig {
        translation_enabled: false,
        ..common::fixed_voice("A")
    };
    let result = selector
        .process(task_for("A", "原文", Some(voice)))
        .await
        .unwrap();

    assert_eq!(result.translated_text, "原文");
    assert!(result.success);
    assert!(result.selection.is_none());
    assert!(client.translate_calls.lock().is_empty());
}

#[tokio::test]
async fn test_process_withWorkingClient_shouldTranslate() {
    let temp = common::create_temp_dir().unwrap();
    let selector = TranslationSelector::new(
        Arc::new(MockTranslationClient::working()),
        options(temp.path()),
    );

    let result = selector
        .process(task_for("A", "hello", Some(common::fixed_voice("A"))))
        .await
        .unwrap();

    assert_eq!(result.translated_text, "[ja] hello");
    assert!(result.success);
    assert!(result.error.is_none());
}

/// Fallback determinism: a failing call yields the original text and
/// success == false
#[tokio::test]
async fn test_process_withFailingClient_shouldFallBackToOriginal() {
    let temp = common::create_temp_dir().unwrap();
    let selector = TranslationSelector::new(
        Arc::new(MockTranslationClient::failing()),
        options(temp.path()),
    );

    let result = selector
        .process(task_for("A", "hello", Some(common::fixed_voice("A"))))
        .await
        .unwrap();

    assert_eq!(result.translated_text, "hello");
    assert!(!result.success);
    assert!(result.error.is_some());
}

#[tokio::test]
async fn test_process_withEmptyTranslation_shouldFallBackToOriginal() {
    let temp = common::create_temp_dir().unwrap();
    let selector = TranslationSelector::new(
        Arc::new(MockTranslationClient::empty()),
        options(temp.path()),
    );

    let result = selector
        .process(task_for("A", "hello", Some(common::fixed_voice("A"))))
        .await
        .unwrap();

    assert_eq!(result.translated_text, "hello");
    assert!(!result.success);
}

#[tokio::test]
async fn test_process_withMissingVoiceConfig_shouldFail() {
    let temp = common::create_temp_dir().unwrap();
    let selector = TranslationSelector::new(
        Arc::new(MockTranslationClient::working()),
        options(temp.path()),
    );

    let outcome = selector.process(task_for("A", "hello", None)).await;

    assert!(matches!(outcome, Err(SelectionError::NoFallback(_))));
}

#[tokio::test]
async fn test_process_withAutoMode_shouldApplyIndexChoices() {
    let temp = common::create_temp_dir().unwrap();
    let client = Arc::new(MockTranslationClient::working().with_selection_response(|req| {
        SelectionResponse {
            model_group_index: Some(1),
            ref_audio_index: Some(1),
            model_group_path: None,
            ref_audio_path: None,
            translated_text: format!("[sel] {}", req.text),
            emotion: "sad".to_string(),
        }
    }));
    let selector = TranslationSelector::new(client, options(temp.path()));

    let voice = auto_voice(temp.path(), "alice");
    let result = selector
        .process(task_for("alice", "为什么", Some(voice)))
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(result.translated_text, "[sel] 为什么");
    let selection = result.selection.unwrap();
    assert_eq!(selection.emotion, "sad");
    assert_eq!(selection.gpt_model_path, "models/alice/sad/voice.ckpt");
    assert_eq!(selection.sovits_model_path, "models/alice/sad/voice.pth");
    assert!(selection.ref_audio_path.contains("【sad】"));
}

/// The collaborator may echo partial paths instead of valid indices; the
/// tiered matcher must still resolve them
#[tokio::test]
async fn test_process_withEchoedPaths_shouldResolveByMatching() {
    let temp = common::create_temp_dir().unwrap();
    let client = Arc::new(MockTranslationClient::working().with_selection_response(|req| {
        SelectionResponse {
            model_group_index: None,
            ref_audio_index: None,
            model_group_path: Some("sad".to_string()),
            ref_audio_path: Some("【happy】今天天气真好.wav".to_string()),
            translated_text: format!("[sel] {}", req.text),
            emotion: "happy".to_string(),
        }
    }));
    let selector = TranslationSelector::new(client, options(temp.path()));

    let voice = auto_voice(temp.path(), "alice");
    let result = selector
        .process(task_for("alice", "你好", Some(voice)))
        .await
        .unwrap();

    let selection = result.selection.unwrap();
    assert_eq!(selection.gpt_model_path, "models/alice/sad/voice.ckpt");
    assert!(selection.ref_audio_path.contains("【happy】"));
}

/// Auto mode with translation disabled keeps the model choice but reverts
/// the text, and asks for the neutral language
#[tokio::test]
async fn test_process_withAutoModeNoTranslation_shouldRevertText() {
    let temp = common::create_temp_dir().unwrap();
    let client = Arc::new(MockTranslationClient::working());
    let selector = TranslationSelector::new(client.clone(), options(temp.path()));

    let voice = CharacterVoiceConfig {
        translation_enabled: false,
        ..auto_voice(temp.path(), "alice")
    };
    let result = selector
        .process(task_for("alice", "原文", Some(voice)))
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(result.translated_text, "原文");
    assert!(result.selection.is_some());

    let calls = client.selection_calls.lock();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].target_language, "zh");
}

#[tokio::test]
async fn test_process_withFailingSelection_shouldFallBackToFirstCandidates() {
    let temp = common::create_temp_dir().unwrap();
    let selector = TranslationSelector::new(
        Arc::new(MockTranslationClient::failing()),
        options(temp.path()),
    );

    let voice = auto_voice(temp.path(), "alice");
    let result = selector
        .process(task_for("alice", "你好", Some(voice)))
        .await
        .unwrap();

    assert!(!result.success);
    assert_eq!(result.translated_text, "你好");
    let selection = result.selection.unwrap();
    assert_eq!(selection.emotion, "neutral");
    assert_eq!(selection.gpt_model_path, "models/alice/happy/voice.ckpt");
    assert!(selection.ref_audio_path.contains("【happy】"));
}

#[tokio::test]
async fn test_process_withNothingScanned_shouldFailFast() {
    let temp = common::create_temp_dir().unwrap();
    let client = Arc::new(MockTranslationClient::working());
    let selector = TranslationSelector::new(client.clone(), options(temp.path()));

    let voice = CharacterVoiceConfig {
        gpt_model_path: "missing/gpt".to_string(),
        sovits_model_path: "missing/sovits".to_string(),
        ref_audio_path: "missing/ref".to_string(),
        auto_mode: true,
        ..CharacterVoiceConfig::default()
    };
    let outcome = selector.process(task_for("alice", "你好", Some(voice))).await;

    assert!(matches!(outcome, Err(SelectionError::EmptyCategory { .. })));
    // The selection call is never attempted
    assert!(client.selection_calls.lock().is_empty());
}

/// One empty category is fatal for the task even when the call succeeds
#[tokio::test]
async fn test_process_withMissingReferenceAudio_shouldFailTask() {
    let temp = common::create_temp_dir().unwrap();
    common::create_test_file(temp.path(), "models/alice/happy/voice.ckpt", "g").unwrap();
    common::create_test_file(temp.path(), "models/alice/happy/voice.pth", "s").unwrap();

    let selector = TranslationSelector::new(
        Arc::new(MockTranslationClient::working()),
        options(temp.path()),
    );

    let voice = CharacterVoiceConfig {
        gpt_model_path: "models/alice".to_string(),
        sovits_model_path: "models/alice".to_string(),
        ref_audio_path: "missing/ref".to_string(),
        auto_mode: true,
        ..CharacterVoiceConfig::default()
    };
    let outcome = selector.process(task_for("alice", "你好", Some(voice))).await;

    assert!(matches!(outcome, Err(SelectionError::EmptyCategory { .. })));
}
