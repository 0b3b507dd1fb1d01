/*!
 * Concurrency-bounded pipeline driver.
 *
 * Stage 1 dispatches translation tasks under a semaphore-enforced cap and
 * hands each completed translation to stage 2 as soon as it finishes; the
 * stages run concurrently, not sequentially in bulk. Stage 2 is
 * single-flight by construction: the backend holds mutable model state, so
 * exactly one synthesis call is in flight at any time.
 *
 * Per-task failures never abort the batch; a failed task is counted and
 * the pipeline moves on, so the synthesis loop can never stall waiting on
 * work that will not arrive.
 */

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use log::{debug, error, info, warn};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::sync::Semaphore;

use crate::errors::ProviderError;
use crate::pipeline::queue::SynthesisQueue;
use crate::providers::{GenerateRequest, SynthesisClient};
use crate::translation::selector::reference_transcript;
use crate::translation::{TranslateResult, TranslateTask, TranslationSelector};

/// A successfully voiced line, ready for the script rewrite
#[derive(Debug, Clone)]
pub struct VoiceTask {
    /// Speaking character
    pub character: String,

    /// Original statement text (rewrite lookup key, with character)
    pub original_text: String,

    /// Text that was actually spoken
    pub final_text: String,

    /// Audio filename the generated voice was saved under
    pub audio_filename: String,
}

/// Outcome of one pipeline run
#[derive(Debug, Default)]
pub struct PipelineReport {
    /// Successfully voiced lines
    pub completed: Vec<VoiceTask>,

    /// Tasks that reached a terminal failure
    pub failed: usize,

    /// Tasks synthesized with the original text after a translation failure
    pub fallback_translations: usize,

    /// Tasks dropped before dispatch (no voice configuration)
    pub dropped: usize,
}

/// Scheduler options for one run
#[derive(Debug, Clone)]
pub struct SchedulerOptions {
    /// Maximum number of concurrent translation requests
    pub concurrent_translations: usize,

    /// Directory generated audio files are downloaded into
    pub audio_output_dir: PathBuf,
}

/// Model state the synthesis loop tracks between tasks
#[derive(Debug, Default)]
struct LoadedState {
    /// Character whose models are currently loaded
    character: Option<String>,

    /// Loaded (gpt, sovits) weight pair
    models: Option<(String, String)>,
}

/// Two-stage translate/synthesize scheduler
pub struct PipelineScheduler {
    /// Translation stage
    selector: Arc<TranslationSelector>,

    /// Synthesis backend collaborator
    synthesizer: Arc<dyn SynthesisClient>,

    /// Run options
    options: SchedulerOptions,
}

impl PipelineScheduler {
    /// Create a scheduler over the given stages
    pub fn new(
        selector: Arc<TranslationSelector>,
        synthesizer: Arc<dyn SynthesisClient>,
        options: SchedulerOptions,
    ) -> Self {
        Self {
            selector,
            synthesizer,
            options,
        }
    }

    /// Run every task to a terminal state and report the outcome.
    ///
    /// Tasks with no resolvable voice configuration are dropped before
    /// dispatch. Everything else ends `done` or `failed`.
    pub async fn run(&self, tasks: Vec<TranslateTask>) -> PipelineReport {
        let (dispatchable, dropped): (Vec<_>, Vec<_>) =
            tasks.into_iter().partition(|task| task.voice.is_some());
        for task in &dropped {
            warn!(
                "Dropping task for '{}' (no voice configuration): {}",
                task.character, task.text
            );
        }

        let total = dispatchable.len();
        info!(
            "Pipeline starting: {} tasks, {} dropped, concurrency {}",
            total,
            dropped.len(),
            self.options.concurrent_translations
        );

        let failed = Arc::new(AtomicUsize::new(0));
        let fallbacks = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = mpsc::unbounded_channel::<TranslateResult>();
        let semaphore = Arc::new(Semaphore::new(self.options.concurrent_translations));

        let translate_stage = async {
            stream::iter(dispatchable)
                .map(|task| {
                    let selector = self.selector.clone();
                    let semaphore = semaphore.clone();
                    let tx = tx.clone();
                    let failed = failed.clone();
                    let fallbacks = fallbacks.clone();

                    async move {
                        // Acquire a permit from the semaphore
                        let _permit = semaphore.acquire().await.unwrap();

                        match selector.process(task).await {
                            Ok(result) => {
                                if !result.success {
                                    fallbacks.fetch_add(1, Ordering::SeqCst);
                                }
                                // Receiver outlives the stage; a send can
                                // only fail after the loop stopped, and then
                                // the task is already unprocessable.
                                let _ = tx.send(result);
                            }
                            Err(e) => {
                                error!("Task failed before synthesis: {}", e);
                                failed.fetch_add(1, Ordering::SeqCst);
                            }
                        }
                    }
                })
                .buffer_unordered(self.options.concurrent_translations)
                .collect::<Vec<()>>()
                .await;
            // Close the channel so the synthesis loop can finish draining
            drop(tx);
        };

        let synthesis_stage = self.synthesis_loop(rx, failed.clone());

        let ((), completed) = tokio::join!(translate_stage, synthesis_stage);

        let report = PipelineReport {
            completed,
            failed: failed.load(Ordering::SeqCst),
            fallback_translations: fallbacks.load(Ordering::SeqCst),
            dropped: dropped.len(),
        };
        info!(
            "Pipeline finished: {} done, {} failed, {} fallback translations, {} dropped",
            report.completed.len(),
            report.failed,
            report.fallback_translations,
            report.dropped
        );
        report
    }

    /// Single-flight synthesis loop.
    ///
    /// Drains the channel into the affinity queue and synthesizes one task
    /// at a time until the translation stage closes the channel and the
    /// queue runs dry.
    async fn synthesis_loop(
        &self,
        mut rx: UnboundedReceiver<TranslateResult>,
        failed: Arc<AtomicUsize>,
    ) -> Vec<VoiceTask> {
        let mut queue = SynthesisQueue::new();
        let mut loaded = LoadedState::default();
        let mut completed = Vec::new();

        loop {
            // Pull everything already translated before choosing the next
            // task, so affinity rotation sees the full queue
            while let Ok(result) = rx.try_recv() {
                queue.push(result);
            }

            if queue.is_empty() {
                match rx.recv().await {
                    Some(result) => {
                        queue.push(result);
                        continue;
                    }
                    None => break,
                }
            }

            let Some(next) = queue.pop_for(loaded.character.as_deref()) else {
                break;
            };

            match self.synthesize_one(&next, &mut loaded).await {
                Ok(voice_task) => {
                    debug!(
                        "Synthesized '{}' -> {}",
                        voice_task.character, voice_task.audio_filename
                    );
                    completed.push(voice_task);
                }
                Err(e) => {
                    error!("Synthesis failed for '{}': {}", next.task.character, e);
                    failed.fetch_add(1, Ordering::SeqCst);
                }
            }
        }

        completed
    }

    /// Synthesize one completed translation, reloading models when the
    /// character (or, in auto mode, the selected pair) changed
    async fn synthesize_one(
        &self,
        result: &TranslateResult,
        loaded: &mut LoadedState,
    ) -> Result<VoiceTask, ProviderError> {
        let task = &result.task;
        // run() only dispatches tasks with a voice config
        let voice = task.voice.as_ref().ok_or_else(|| {
            ProviderError::RequestFailed(format!("no voice configuration for '{}'", task.character))
        })?;

        let (gpt_path, sovits_path, ref_audio, ref_text) = match &result.selection {
            Some(selection) => (
                selection.gpt_model_path.clone(),
                selection.sovits_model_path.clone(),
                selection.ref_audio_path.clone(),
                reference_transcript(&selection.ref_audio_path),
            ),
            None => (
                voice.gpt_model_path.clone(),
                voice.sovits_model_path.clone(),
                voice.ref_audio_path.clone(),
                voice.ref_audio_text.clone(),
            ),
        };

        let wanted_models = (gpt_path.clone(), sovits_path.clone());
        let needs_reload = loaded.character.as_deref() != Some(task.character.as_str())
            || loaded.models.as_ref() != Some(&wanted_models);

        if needs_reload {
            debug!(
                "Loading models for '{}': {} / {}",
                task.character, gpt_path, sovits_path
            );
            // Invalidate first so a failed load is not mistaken for the
            // previous character's models still being usable
            loaded.character = None;
            loaded.models = None;
            self.synthesizer.set_gpt_model(&gpt_path).await?;
            self.synthesizer
                .set_sovits_model(&sovits_path, &voice.prompt_language, &voice.text_language)
                .await?;
            loaded.character = Some(task.character.clone());
            loaded.models = Some(wanted_models);
        }

        let remote_path = self
            .synthesizer
            .generate_voice(GenerateRequest {
                ref_audio_path: ref_audio,
                ref_text,
                target_text: result.translated_text.clone(),
                inference: voice.inference.clone(),
            })
            .await?;

        let local_path = self.options.audio_output_dir.join(&task.audio_filename);
        self.synthesizer
            .download_audio(&remote_path, &local_path)
            .await?;

        Ok(VoiceTask {
            character: task.character.clone(),
            original_text: task.text.clone(),
            final_text: result.translated_text.clone(),
            audio_filename: task.audio_filename.clone(),
        })
    }
}
