use anyhow::{anyhow, Result};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

use crate::app_config::Config;
use crate::file_utils::FileManager;
use crate::pipeline::{PipelineScheduler, SchedulerOptions};
use crate::providers::{SynthesisClient, TranslationClient};
use crate::script_codec::ScriptCodec;
use crate::script_updater::ScriptUpdater;
use crate::snapshot_cache::{identity_keys, SnapshotStore};
use crate::translation::context::ContextWindow;
use crate::translation::selector::{SelectorOptions, TranslateTask, TranslationSelector};

// @module: Per-file voicing run orchestration

/// Summary of one voicing run over a script file
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Statements reported added by the diff
    pub added: usize,

    /// Statements reported removed by the diff
    pub removed: usize,

    /// Lines successfully voiced and written back
    pub synthesized: usize,

    /// Tasks that reached a terminal failure
    pub failed: usize,

    /// Tasks voiced with the original text after a translation failure
    pub fallback_translations: usize,

    /// Tasks dropped before dispatch (no voice configuration)
    pub dropped: usize,
}

/// Main controller driving one script file through the voicing pipeline
pub struct VoicingController {
    // @field: App configuration
    config: Config,

    // @field: Language-model collaborator
    translation_client: Arc<dyn TranslationClient>,

    // @field: Synthesis backend collaborator
    synthesis_client: Arc<dyn SynthesisClient>,

    // @field: Snapshot store for incremental runs
    store: SnapshotStore,
}

impl VoicingController {
    // @method: Create a new controller with the given configuration
    pub fn new(
        config: Config,
        translation_client: Arc<dyn TranslationClient>,
        synthesis_client: Arc<dyn SynthesisClient>,
    ) -> Result<Self> {
        config.validate()?;
        let store = SnapshotStore::new(&config.work_dir);
        Ok(Self {
            config,
            translation_client,
            synthesis_client,
            store,
        })
    }

    /// The snapshot store backing this controller
    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Run the voicing workflow for one script file.
    ///
    /// With `force` set the snapshot is cleared first, so every statement
    /// is reprocessed and audio filenames are re-derived.
    pub async fn run(&self, script_file: &Path, force: bool) -> Result<RunSummary> {
        let start_time = std::time::Instant::now();

        if !script_file.exists() {
            return Err(anyhow!("Script file does not exist: {:?}", script_file));
        }

        let known_characters = self.config.known_characters();
        if known_characters.is_empty() {
            warn!("No characters configured, nothing to voice");
            return Ok(RunSummary::default());
        }

        if force {
            info!("Force mode: clearing snapshot for {:?}", script_file);
            self.store.clear(script_file)?;
        }

        let text = FileManager::read_to_string(script_file)?;
        let diff = self.store.diff(script_file, &text, &known_characters);
        info!(
            "Diff for {:?}: {} added, {} removed",
            script_file,
            diff.added.len(),
            diff.removed.len()
        );

        if diff.added.is_empty() {
            // Nothing to voice; still refresh the snapshot so removed
            // statements stop being reported on the next run
            self.store.save(script_file, &text, &known_characters)?;
            return Ok(RunSummary {
                removed: diff.removed.len(),
                ..RunSummary::default()
            });
        }

        let tasks = self.build_tasks(&text, &known_characters, &diff.added);

        let audio_output_dir = self.audio_output_dir();
        FileManager::ensure_dir(&audio_output_dir)?;

        let selector = Arc::new(TranslationSelector::new(
            self.translation_client.clone(),
            SelectorOptions {
                work_dir: PathBuf::from(&self.config.work_dir),
                neutral_language: self.config.translation.neutral_language.clone(),
            },
        ));
        let scheduler = PipelineScheduler::new(
            selector,
            self.synthesis_client.clone(),
            SchedulerOptions {
                concurrent_translations: self.config.concurrent_tasks,
                audio_output_dir,
            },
        );

        let report = scheduler.run(tasks).await;

        let updater = ScriptUpdater::new(&self.store);
        let applied = updater.apply(script_file, &known_characters, &report.completed)?;

        let summary = RunSummary {
            added: diff.added.len(),
            removed: diff.removed.len(),
            synthesized: applied,
            failed: report.failed,
            fallback_translations: report.fallback_translations,
            dropped: report.dropped,
        };
        info!(
            "Voicing run finished in {:?}: {} voiced, {} failed, {} dropped",
            start_time.elapsed(),
            summary.synthesized,
            summary.failed,
            summary.dropped
        );
        Ok(summary)
    }

    /// Convert added statements into translate tasks, resolving voice
    /// configuration, identity keys, context, and audio filenames
    fn build_tasks(
        &self,
        text: &str,
        known_characters: &[String],
        added: &[crate::script_codec::DialogueStatement],
    ) -> Vec<TranslateTask> {
        let all_statements = ScriptCodec::parse(text, known_characters);
        let keys = identity_keys(&all_statements);
        let window = ContextWindow::new(
            self.config.translation.context_before,
            self.config.translation.context_after,
        );

        added
            .iter()
            .map(|statement| {
                let voice = self.config.character_config(&statement.character).cloned();
                let auto_mode = voice.as_ref().map(|v| v.auto_mode).unwrap_or(false);
                let key = keys
                    .get(statement.statement_index)
                    .cloned()
                    .unwrap_or_else(|| crate::snapshot_cache::IdentityKey {
                        character: statement.character.clone(),
                        text: statement.text.clone(),
                        occurrence: 0,
                    });

                TranslateTask {
                    key,
                    character: statement.character.clone(),
                    text: statement.text.clone(),
                    target_language: self.config.translation.target_language.clone(),
                    audio_filename: Self::assign_audio_filename(&statement.character),
                    context: window.build(&all_statements, statement.statement_index),
                    voice,
                    auto_mode,
                }
            })
            .collect()
    }

    /// Absolute audio output directory for this run
    fn audio_output_dir(&self) -> PathBuf {
        FileManager::resolve(&self.config.work_dir, &self.config.audio_dir)
    }

    /// Fresh audio filename for a statement
    fn assign_audio_filename(character: &str) -> String {
        let id = Uuid::new_v4().simple().to_string();
        format!("{}_{}.wav", FileManager::slug(character), &id[..8])
    }
}
