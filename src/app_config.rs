use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::default::Default;

/// Application configuration module
/// This module defines the configuration types consumed by the voicing core.
/// Loading and validating these from disk or environment is handled by the
/// upstream caller; the core only reads them.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Working directory for the project (audio output and snapshots live here)
    pub work_dir: String,

    /// Directory, relative to `work_dir`, where generated audio is written
    #[serde(default = "default_audio_dir")]
    pub audio_dir: String,

    /// Translation settings shared by all characters
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Per-character voice configuration, keyed by character name
    #[serde(default)]
    pub characters: HashMap<String, CharacterVoiceConfig>,

    /// Maximum number of concurrent translation requests
    #[serde(default = "default_concurrent_tasks")]
    pub concurrent_tasks: usize,
}

impl Config {
    /// Look up the voice configuration for a character, if any
    pub fn character_config(&self, character: &str) -> Option<&CharacterVoiceConfig> {
        self.characters.get(character)
    }

    /// The set of character names the parser should keep statements for
    pub fn known_characters(&self) -> Vec<String> {
        self.characters.keys().cloned().collect()
    }

    /// Basic sanity checks on values the core depends on
    pub fn validate(&self) -> Result<()> {
        if self.work_dir.is_empty() {
            return Err(anyhow!("work_dir must not be empty"));
        }
        if self.concurrent_tasks == 0 {
            return Err(anyhow!("concurrent_tasks must be at least 1"));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            work_dir: String::new(),
            audio_dir: default_audio_dir(),
            translation: TranslationConfig::default(),
            characters: HashMap::new(),
            concurrent_tasks: default_concurrent_tasks(),
        }
    }
}

/// Translation settings shared across characters
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Target language code for translated dialogue (e.g. "ja")
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Target language used when translation is disabled but auto mode
    /// still needs a language for the selection prompt
    #[serde(default = "default_neutral_language")]
    pub neutral_language: String,

    /// How many preceding statements to include as translation context
    #[serde(default = "default_context_before")]
    pub context_before: usize,

    /// How many following statements to include as translation context
    #[serde(default = "default_context_after")]
    pub context_after: usize,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            target_language: default_target_language(),
            neutral_language: default_neutral_language(),
            context_before: default_context_before(),
            context_after: default_context_after(),
        }
    }
}

/// Per-character static voice settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CharacterVoiceConfig {
    // @field: GPT weights path; a file in fixed mode, a directory in auto mode
    #[serde(default = "String::new")]
    pub gpt_model_path: String,

    // @field: SoVITS weights path; a file in fixed mode, a directory in auto mode
    #[serde(default = "String::new")]
    pub sovits_model_path: String,

    // @field: Reference audio path; a file in fixed mode, a directory in auto mode
    #[serde(default = "String::new")]
    pub ref_audio_path: String,

    // @field: Transcript of the reference audio (fixed mode)
    #[serde(default = "String::new")]
    pub ref_audio_text: String,

    // @field: Language of the reference audio transcript
    #[serde(default = "default_prompt_language")]
    pub prompt_language: String,

    // @field: Language the synthesized text is spoken in
    #[serde(default = "default_target_language")]
    pub text_language: String,

    // @field: Free-form style hint passed to the translation prompt
    #[serde(default = "String::new")]
    pub style_prompt: String,

    // @field: Whether this character's lines are translated at all
    #[serde(default = "default_true")]
    pub translation_enabled: bool,

    // @field: Whether model pair and emotion are chosen per line
    #[serde(default)]
    pub auto_mode: bool,

    // @field: Synthesis inference parameters
    #[serde(default)]
    pub inference: InferenceParams,
}

impl Default for CharacterVoiceConfig {
    fn default() -> Self {
        Self {
            gpt_model_path: String::new(),
            sovits_model_path: String::new(),
            ref_audio_path: String::new(),
            ref_audio_text: String::new(),
            prompt_language: default_prompt_language(),
            text_language: default_target_language(),
            style_prompt: String::new(),
            translation_enabled: true,
            auto_mode: false,
            inference: InferenceParams::default(),
        }
    }
}

/// Inference parameters forwarded to the synthesis backend
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct InferenceParams {
    /// Sampling top-k
    #[serde(default = "default_top_k")]
    pub top_k: u32,

    /// Sampling top-p
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Playback speed factor
    #[serde(default = "default_speed")]
    pub speed: f32,
}

impl Default for InferenceParams {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            top_p: default_top_p(),
            temperature: default_temperature(),
            speed: default_speed(),
        }
    }
}

// Default value functions for serde
fn default_audio_dir() -> String {
    "vocal".to_string()
}

fn default_concurrent_tasks() -> usize {
    3
}

fn default_target_language() -> String {
    "ja".to_string()
}

fn default_neutral_language() -> String {
    "zh".to_string()
}

fn default_prompt_language() -> String {
    "zh".to_string()
}

fn default_context_before() -> usize {
    4
}

fn default_context_after() -> usize {
    2
}

fn default_true() -> bool {
    true
}

fn default_top_k() -> u32 {
    15
}

fn default_top_p() -> f32 {
    1.0
}

fn default_temperature() -> f32 {
    1.0
}

fn default_speed() -> f32 {
    1.0
}
