/*!
 * The two-stage voicing pipeline.
 *
 * Stage 1 translates added statements under a concurrency cap; stage 2
 * synthesizes audio through the stateful backend, strictly one call at a
 * time, reordering queued work by character affinity to avoid model
 * reloads.
 *
 * - `queue`: Affinity-ordered synthesis queue
 * - `scheduler`: Concurrency-bounded pipeline driver
 */

// Re-export main types for easier usage
pub use self::queue::SynthesisQueue;
pub use self::scheduler::{PipelineReport, PipelineScheduler, SchedulerOptions, VoiceTask};

// Submodules
pub mod queue;
pub mod scheduler;
