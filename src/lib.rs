/*!
 * # autovoice - Incremental AI Voicing for Dialogue Scripts
 *
 * A Rust library that turns hand-authored dialogue scripts into localized,
 * voiced audio lines, re-running only the lines that changed since the last
 * pass.
 *
 * ## Features
 *
 * - Lossless parse/serialize of the dialogue script format (comments,
 *   blank lines, and manual edits outside tracked dialogue are preserved)
 * - Snapshot diffing that distinguishes verbatim-duplicate lines by
 *   occurrence ordinal
 * - Per-line translation with an auto mode that selects an emotion model
 *   pair and reference audio dynamically
 * - Bounded-concurrency translation feeding a single-flight synthesis
 *   queue with character-affinity reordering to avoid model reloads
 * - Script rewriting that attaches the generated audio references
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration types (loaded by upstream callers)
 * - `script_codec`: Dialogue script parsing and round-trip serialization
 * - `snapshot_cache`: Per-file snapshots and added/removed diffing
 * - `model_scanner`: Candidate model/reference-audio enumeration
 * - `translation`: Per-line translation and emotion-model selection:
 *   - `translation::selector`: The four translation/selection modes
 *   - `translation::matching`: Tiered path matching for model responses
 *   - `translation::context`: Surrounding-dialogue context windows
 * - `pipeline`: The two-stage translate/synthesize scheduler:
 *   - `pipeline::queue`: Affinity-ordered synthesis queue
 *   - `pipeline::scheduler`: Concurrency-bounded pipeline driver
 * - `script_updater`: Writing audio references back into the script
 * - `app_controller`: Per-file run orchestration
 * - `providers`: Collaborator contracts for the LLM and synthesis backends
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod model_scanner;
pub mod pipeline;
pub mod providers;
pub mod script_codec;
pub mod script_updater;
pub mod snapshot_cache;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::{CharacterVoiceConfig, Config};
pub use app_controller::{RunSummary, VoicingController};
pub use errors::{AppError, PipelineError, ProviderError, ScriptError, SelectionError};
pub use pipeline::{PipelineReport, PipelineScheduler};
pub use script_codec::{DialogueStatement, Param, ScriptCodec};
pub use snapshot_cache::{IdentityKey, ScriptDiff, SnapshotStore};
pub use translation::TranslationSelector;
