/*!
 * Collaborator contracts for the external backends.
 *
 * This module defines the call contracts the voicing core depends on:
 * - `TranslationClient`: the language-model backend that translates lines
 *   and, in auto mode, picks a model pair and reference audio per line
 * - `SynthesisClient`: the stateful voice backend that holds one model
 *   pair loaded at a time
 *
 * The concrete network clients live upstream; `providers::mock` ships
 * configurable in-memory implementations for the test suite.
 */

use std::fmt::Debug;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::app_config::InferenceParams;
use crate::errors::ProviderError;

/// Request for a plain per-line translation
#[derive(Debug, Clone)]
pub struct TranslateRequest {
    /// Speaking character
    pub character: String,

    /// Original line text
    pub text: String,

    /// Target language code
    pub target_language: String,

    /// Free-form style hint from the character configuration
    pub style_prompt: String,

    /// Surrounding dialogue, formatted one statement per line
    pub context: Option<String>,
}

/// Request for combined model selection and translation (auto mode)
#[derive(Debug, Clone)]
pub struct SelectionRequest {
    /// Speaking character
    pub character: String,

    /// Original line text
    pub text: String,

    /// Target language code
    pub target_language: String,

    /// Labels of the candidate model groups, in index order
    pub model_groups: Vec<String>,

    /// Candidate reference audio paths, in index order
    pub ref_audio_files: Vec<String>,

    /// Free-form style hint from the character configuration
    pub style_prompt: String,

    /// Surrounding dialogue, formatted one statement per line
    pub context: Option<String>,
}

/// Strictly-typed selection result returned by the language model.
///
/// Choices are index-based into the candidate lists of the request; the
/// echoed paths are best-effort and may not match the candidates
/// byte-for-byte, so callers resolve them with the tiered path matcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionResponse {
    /// Chosen model group index
    pub model_group_index: Option<usize>,

    /// Chosen reference audio index
    pub ref_audio_index: Option<usize>,

    /// Echo of the chosen model group label, if the model returned one
    #[serde(default)]
    pub model_group_path: Option<String>,

    /// Echo of the chosen reference audio path, if the model returned one
    #[serde(default)]
    pub ref_audio_path: Option<String>,

    /// Translated line text
    pub translated_text: String,

    /// Emotion label for the chosen group
    pub emotion: String,
}

/// Language-model backend used for translation and auto-mode selection
#[async_trait]
pub trait TranslationClient: Send + Sync + Debug {
    /// Translate one line of dialogue.
    ///
    /// Should return the input text rather than fail when no translation
    /// is possible; the caller still guards with its own fallback.
    async fn translate(&self, request: TranslateRequest) -> Result<String, ProviderError>;

    /// Translate one line and choose a model group and reference audio
    /// from the candidate lists
    async fn select_model_and_translate(
        &self,
        request: SelectionRequest,
    ) -> Result<SelectionResponse, ProviderError>;
}

/// Parameters for one audio generation call
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// Reference audio path for voice cloning
    pub ref_audio_path: String,

    /// Transcript of the reference audio
    pub ref_text: String,

    /// Text to speak
    pub target_text: String,

    /// Inference parameters
    pub inference: InferenceParams,
}

/// Stateful voice synthesis backend.
///
/// The backend holds at most one GPT/SoVITS model pair loaded at a time;
/// callers must serialize all calls (the pipeline's synthesis stage is
/// single-flight for exactly this reason).
#[async_trait]
pub trait SynthesisClient: Send + Sync + Debug {
    /// Load GPT weights
    async fn set_gpt_model(&self, path: &str) -> Result<(), ProviderError>;

    /// Load SoVITS weights with the character's language settings
    async fn set_sovits_model(
        &self,
        path: &str,
        prompt_language: &str,
        text_language: &str,
    ) -> Result<(), ProviderError>;

    /// Generate audio, returning the backend-side path of the result
    async fn generate_voice(&self, request: GenerateRequest) -> Result<String, ProviderError>;

    /// Download generated audio to a local path
    async fn download_audio(&self, remote_path: &str, local_path: &Path)
        -> Result<(), ProviderError>;
}

pub mod mock;
