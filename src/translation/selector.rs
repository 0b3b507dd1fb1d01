/*!
 * Per-line translation and emotion-model selection.
 *
 * Each task runs in exactly one of four modes, chosen by the character's
 * `translation_enabled` and `auto_mode` settings:
 *
 * | translation | auto | behavior |
 * |---|---|---|
 * | off | off | pass-through, text unchanged |
 * | on  | off | plain translate call, original text on failure |
 * | on  | on  | scan model files, collaborator picks group + reference audio + emotion |
 * | off | on  | same selection call with the neutral language, text reverted to original |
 *
 * Failed translations fall back to the original text and still proceed to
 * synthesis; selection failures fall back to the first scanned file per
 * category, and become fatal for the task only when a category is empty.
 */

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use log::{debug, warn};

use crate::app_config::CharacterVoiceConfig;
use crate::errors::SelectionError;
use crate::model_scanner::{ModelFileScanner, ScannedFiles};
use crate::providers::{SelectionRequest, TranslateRequest, TranslationClient};
use crate::snapshot_cache::IdentityKey;
use crate::translation::matching::match_candidate;

/// Emotion label used whenever the collaborator gives none or fails
pub const NEUTRAL_EMOTION: &str = "neutral";

/// One unit of translation work for a newly added statement
#[derive(Debug, Clone)]
pub struct TranslateTask {
    /// Identity key of the originating statement
    pub key: IdentityKey,

    /// Speaking character
    pub character: String,

    /// Original statement text
    pub text: String,

    /// Target language for the translation
    pub target_language: String,

    /// Audio filename assigned to this task
    pub audio_filename: String,

    /// Surrounding dialogue, formatted one statement per line
    pub context: Option<String>,

    /// Voice configuration for the character, when one exists
    pub voice: Option<CharacterVoiceConfig>,

    /// Whether model pair and emotion are chosen per line
    pub auto_mode: bool,
}

/// Completed translation for a task
#[derive(Debug, Clone)]
pub struct TranslateResult {
    /// The originating task
    pub task: TranslateTask,

    /// Final text to synthesize
    pub translated_text: String,

    /// False when the fallback-to-original path was taken
    pub success: bool,

    /// Error description for observability, if any
    pub error: Option<String>,

    /// Model/reference choice, present only in auto mode
    pub selection: Option<EmotionSelection>,
}

/// Model and reference-audio choice for one line (auto mode)
#[derive(Debug, Clone, PartialEq)]
pub struct EmotionSelection {
    /// Chosen GPT weights path
    pub gpt_model_path: String,

    /// Chosen SoVITS weights path
    pub sovits_model_path: String,

    /// Chosen reference audio path
    pub ref_audio_path: String,

    /// Emotion label of the choice
    pub emotion: String,

    /// Translated text the choice was made for
    pub translated_text: String,
}

/// A GPT/SoVITS weight pair grouped by emotion directory
#[derive(Debug, Clone)]
struct ModelGroup {
    /// Display label shown to the collaborator (emotion directory name)
    label: String,

    /// GPT weights path
    gpt_path: String,

    /// SoVITS weights path
    sovits_path: String,
}

/// Options shared by all selector calls in one run
#[derive(Debug, Clone)]
pub struct SelectorOptions {
    /// Base directory model paths are resolved against
    pub work_dir: PathBuf,

    /// Target language when translation is disabled but auto mode still
    /// needs one for the selection prompt
    pub neutral_language: String,
}

/// Translation and model-selection stage for one dialogue line
pub struct TranslationSelector {
    /// Language-model collaborator
    client: Arc<dyn TranslationClient>,

    /// Run-wide options
    options: SelectorOptions,
}

impl TranslationSelector {
    /// Create a selector over the given collaborator
    pub fn new(client: Arc<dyn TranslationClient>, options: SelectorOptions) -> Self {
        Self { client, options }
    }

    /// Run one task through its mode.
    ///
    /// `Err` means the task cannot be synthesized at all (missing
    /// configuration or an empty candidate category in auto mode); every
    /// other failure degrades into a fallback result with `success: false`.
    pub async fn process(&self, task: TranslateTask) -> Result<TranslateResult, SelectionError> {
        let Some(voice) = task.voice.clone() else {
            return Err(SelectionError::NoFallback(format!(
                "no voice configuration for character '{}'",
                task.character
            )));
        };

        if task.auto_mode {
            self.process_auto(task, &voice).await
        } else if voice.translation_enabled {
            Ok(self.process_translate(task, &voice).await)
        } else {
            debug!("Pass-through for '{}' (translation disabled)", task.character);
            Ok(TranslateResult {
                translated_text: task.text.clone(),
                success: true,
                error: None,
                selection: None,
                task,
            })
        }
    }

    /// Plain translation mode: translate, fall back to the original text
    async fn process_translate(
        &self,
        task: TranslateTask,
        voice: &CharacterVoiceConfig,
    ) -> TranslateResult {
        let request = TranslateRequest {
            character: task.character.clone(),
            text: task.text.clone(),
            target_language: task.target_language.clone(),
            style_prompt: voice.style_prompt.clone(),
            context: task.context.clone(),
        };

        match self.client.translate(request).await {
            Ok(translated) if !translated.trim().is_empty() => TranslateResult {
                translated_text: translated,
                success: true,
                error: None,
                selection: None,
                task,
            },
            Ok(_) => {
                warn!("Empty translation for '{}', keeping original text", task.character);
                TranslateResult {
                    translated_text: task.text.clone(),
                    success: false,
                    error: Some("empty translation".to_string()),
                    selection: None,
                    task,
                }
            }
            Err(e) => {
                warn!("Translation failed for '{}': {}", task.character, e);
                TranslateResult {
                    translated_text: task.text.clone(),
                    success: false,
                    error: Some(e.to_string()),
                    selection: None,
                    task,
                }
            }
        }
    }

    /// Auto mode: scan candidates, let the collaborator choose a model
    /// group, reference audio, and emotion
    async fn process_auto(
        &self,
        task: TranslateTask,
        voice: &CharacterVoiceConfig,
    ) -> Result<TranslateResult, SelectionError> {
        let scanned = ModelFileScanner::scan(
            &self.options.work_dir,
            &voice.gpt_model_path,
            &voice.sovits_model_path,
            &voice.ref_audio_path,
        );

        if scanned.is_empty() {
            return Err(SelectionError::EmptyCategory {
                category: "all".to_string(),
                directory: voice.gpt_model_path.clone(),
            });
        }

        let groups = Self::build_groups(&scanned);

        let target_language = if voice.translation_enabled {
            task.target_language.clone()
        } else {
            self.options.neutral_language.clone()
        };

        let request = SelectionRequest {
            character: task.character.clone(),
            text: task.text.clone(),
            target_language,
            model_groups: groups.iter().map(|g| g.label.clone()).collect(),
            ref_audio_files: scanned.ref_audio_files.clone(),
            style_prompt: voice.style_prompt.clone(),
            context: task.context.clone(),
        };

        match self.client.select_model_and_translate(request).await {
            Ok(response) => {
                let group = Self::resolve_group(
                    &groups,
                    response.model_group_index,
                    response.model_group_path.as_deref(),
                    &task.character,
                )?;
                let ref_audio = Self::resolve_ref_audio(
                    &scanned.ref_audio_files,
                    response.ref_audio_index,
                    response.ref_audio_path.as_deref(),
                    &task.character,
                )?;

                let emotion = if response.emotion.trim().is_empty() {
                    NEUTRAL_EMOTION.to_string()
                } else {
                    response.emotion.clone()
                };

                // With translation disabled the model choice is kept but
                // the spoken text reverts to the original.
                let (translated_text, success, error) = if !voice.translation_enabled {
                    (task.text.clone(), true, None)
                } else if response.translated_text.trim().is_empty() {
                    (
                        task.text.clone(),
                        false,
                        Some("empty translation in selection response".to_string()),
                    )
                } else {
                    (response.translated_text.clone(), true, None)
                };

                Ok(TranslateResult {
                    translated_text: translated_text.clone(),
                    success,
                    error,
                    selection: Some(EmotionSelection {
                        gpt_model_path: group.gpt_path.clone(),
                        sovits_model_path: group.sovits_path.clone(),
                        ref_audio_path: ref_audio,
                        emotion,
                        translated_text,
                    }),
                    task,
                })
            }
            Err(e) => {
                warn!(
                    "Selection failed for '{}', falling back to first candidates: {}",
                    task.character, e
                );
                let group = groups.first().ok_or_else(|| SelectionError::EmptyCategory {
                    category: "model group".to_string(),
                    directory: voice.gpt_model_path.clone(),
                })?;
                let ref_audio = scanned.ref_audio_files.first().ok_or_else(|| {
                    SelectionError::EmptyCategory {
                        category: "reference audio".to_string(),
                        directory: voice.ref_audio_path.clone(),
                    }
                })?;

                Ok(TranslateResult {
                    translated_text: task.text.clone(),
                    success: false,
                    error: Some(e.to_string()),
                    selection: Some(EmotionSelection {
                        gpt_model_path: group.gpt_path.clone(),
                        sovits_model_path: group.sovits_path.clone(),
                        ref_audio_path: ref_audio.clone(),
                        emotion: NEUTRAL_EMOTION.to_string(),
                        translated_text: task.text.clone(),
                    }),
                    task,
                })
            }
        }
    }

    /// Pair GPT and SoVITS weights by their parent directory (the emotion
    /// folder convention). A group missing one half borrows the first file
    /// of that category; if either category is entirely empty no group can
    /// be formed.
    fn build_groups(scanned: &ScannedFiles) -> Vec<ModelGroup> {
        if scanned.gpt_files.is_empty() || scanned.sovits_files.is_empty() {
            return Vec::new();
        }

        let mut by_dir: BTreeMap<String, (Option<&String>, Option<&String>)> = BTreeMap::new();
        for gpt in &scanned.gpt_files {
            by_dir.entry(parent_dir(gpt)).or_default().0.get_or_insert(gpt);
        }
        for sovits in &scanned.sovits_files {
            by_dir.entry(parent_dir(sovits)).or_default().1.get_or_insert(sovits);
        }

        by_dir
            .into_iter()
            .map(|(label, (gpt, sovits))| ModelGroup {
                label,
                gpt_path: gpt.unwrap_or(&scanned.gpt_files[0]).clone(),
                sovits_path: sovits.unwrap_or(&scanned.sovits_files[0]).clone(),
            })
            .collect()
    }

    /// Resolve the chosen model group from an index or an echoed label
    fn resolve_group(
        groups: &[ModelGroup],
        index: Option<usize>,
        echoed: Option<&str>,
        character: &str,
    ) -> Result<ModelGroup, SelectionError> {
        if groups.is_empty() {
            return Err(SelectionError::EmptyCategory {
                category: "model group".to_string(),
                directory: character.to_string(),
            });
        }

        if let Some(idx) = index {
            if let Some(group) = groups.get(idx) {
                return Ok(group.clone());
            }
            warn!("Model group index {} out of range for '{}'", idx, character);
        }

        if let Some(wanted) = echoed {
            let labels: Vec<String> = groups.iter().map(|g| g.label.clone()).collect();
            if let Some(idx) = match_candidate(&labels, wanted) {
                return Ok(groups[idx].clone());
            }
            let gpt_paths: Vec<String> = groups.iter().map(|g| g.gpt_path.clone()).collect();
            if let Some(idx) = match_candidate(&gpt_paths, wanted) {
                return Ok(groups[idx].clone());
            }
            warn!("Echoed model group '{}' did not match any candidate", wanted);
        }

        debug!("Unresolved model group for '{}', using first candidate", character);
        Ok(groups[0].clone())
    }

    /// Resolve the chosen reference audio from an index or an echoed path
    fn resolve_ref_audio(
        candidates: &[String],
        index: Option<usize>,
        echoed: Option<&str>,
        character: &str,
    ) -> Result<String, SelectionError> {
        if candidates.is_empty() {
            return Err(SelectionError::EmptyCategory {
                category: "reference audio".to_string(),
                directory: character.to_string(),
            });
        }

        if let Some(idx) = index {
            if let Some(path) = candidates.get(idx) {
                return Ok(path.clone());
            }
            warn!("Reference audio index {} out of range for '{}'", idx, character);
        }

        if let Some(wanted) = echoed {
            if let Some(idx) = match_candidate(candidates, wanted) {
                return Ok(candidates[idx].clone());
            }
            warn!("Echoed reference audio '{}' did not match any candidate", wanted);
        }

        debug!("Unresolved reference audio for '{}', using first candidate", character);
        Ok(candidates[0].clone())
    }
}

/// Derive the reference transcript from a reference-audio filename.
///
/// Emotion reference banks name files after their transcript, with an
/// optional leading `【emotion】` tag; both the tag and the extension are
/// stripped.
pub fn reference_transcript(path: &str) -> String {
    let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    let stem = name.rsplit_once('.').map(|(s, _)| s).unwrap_or(name);
    let stripped = match (stem.find('【'), stem.find('】')) {
        (Some(0), Some(end)) => &stem[end + '】'.len_utf8()..],
        _ => stem,
    };
    stripped.trim().to_string()
}

/// Parent directory of a relative path, used as the emotion group label
fn parent_dir(path: &str) -> String {
    match path.rsplit_once(['/', '\\']) {
        Some((dir, _)) => dir.to_string(),
        None => String::new(),
    }
}
