/*!
 * Per-line translation and emotion-model selection.
 *
 * This module contains the translation stage of the voicing pipeline. It is
 * split into several submodules:
 *
 * - `selector`: The four translation/selection modes and their fallbacks
 * - `matching`: Tiered path matching for collaborator responses
 * - `context`: Surrounding-dialogue context windows for translation quality
 */

// Re-export main types for easier usage
pub use self::context::ContextWindow;
pub use self::selector::{
    EmotionSelection, TranslateResult, TranslateTask, TranslationSelector,
};

// Submodules
pub mod context;
pub mod matching;
pub mod selector;
