/*!
 * Script rewriting after a pipeline run.
 *
 * Completed voice tasks are mapped back to their originating statements by
 * character and original text, the assigned audio filename and default
 * volume are attached as parameters, and the file is rewritten through the
 * codec so everything outside the voiced statements is preserved exactly.
 * Statements whose task failed or was dropped are left unmodified.
 */

use std::collections::HashSet;
use std::path::Path;

use anyhow::Result;
use log::{debug, info, warn};

use crate::file_utils::FileManager;
use crate::pipeline::VoiceTask;
use crate::script_codec::{DialogueStatement, Param, ScriptCodec};
use crate::snapshot_cache::SnapshotStore;

/// Volume parameter attached alongside the audio reference
pub const DEFAULT_VOLUME: &str = "100";

/// Audio extensions recognized when replacing a previous audio reference
const AUDIO_PARAM_EXTENSIONS: [&str; 4] = [".wav", ".mp3", ".ogg", ".flac"];

/// Writes voiced audio references back into the script
pub struct ScriptUpdater<'a> {
    /// Snapshot store refreshed after a successful rewrite
    store: &'a SnapshotStore,
}

impl<'a> ScriptUpdater<'a> {
    /// Create an updater over the given snapshot store
    pub fn new(store: &'a SnapshotStore) -> Self {
        Self { store }
    }

    /// Rewrite the script file with the completed tasks' audio references
    /// and refresh its snapshot. Returns the number of statements updated.
    pub fn apply(
        &self,
        script_path: &Path,
        known_characters: &[String],
        tasks: &[VoiceTask],
    ) -> Result<usize> {
        let text = FileManager::read_to_string(script_path)?;
        let (updated, applied) = Self::rewrite(&text, known_characters, tasks);

        if applied > 0 {
            FileManager::write_to_file(script_path, &updated)?;
        }
        self.store.save(script_path, &updated, known_characters)?;

        info!(
            "Updated {} of {} voiced statements in {:?}",
            applied,
            tasks.len(),
            script_path
        );
        Ok(applied)
    }

    /// Pure rewrite of script text: attach audio references for the given
    /// tasks and return the new text plus the number of statements updated
    pub fn rewrite(
        text: &str,
        known_characters: &[String],
        tasks: &[VoiceTask],
    ) -> (String, usize) {
        let statements = ScriptCodec::parse(text, known_characters);
        let mut consumed: HashSet<usize> = HashSet::new();
        let mut updated: Vec<DialogueStatement> = Vec::new();

        for task in tasks {
            // Duplicate lines consume matching statements in encounter order
            let found = statements.iter().find(|s| {
                !consumed.contains(&s.statement_index)
                    && s.character == task.character
                    && s.text == task.original_text
            });

            match found {
                Some(statement) => {
                    consumed.insert(statement.statement_index);
                    let mut statement = statement.clone();
                    Self::attach_audio(&mut statement, &task.audio_filename);
                    updated.push(statement);
                }
                None => {
                    warn!(
                        "No statement found for voiced line '{}: {}'",
                        task.character, task.original_text
                    );
                }
            }
        }

        let applied = updated.len();
        debug!("Rewriting {} statements", applied);
        (ScriptCodec::serialize(text, &updated), applied)
    }

    /// Replace any previous audio/volume params and append the new
    /// reference
    fn attach_audio(statement: &mut DialogueStatement, audio_filename: &str) {
        statement.params.retain(|param| !Self::is_audio_param(param));
        statement.params.push(Param::flag(audio_filename));
        statement.params.push(Param::pair("volume", DEFAULT_VOLUME));
    }

    /// Whether a param is an audio-file flag or a volume setting
    fn is_audio_param(param: &Param) -> bool {
        if param.key == "volume" {
            return true;
        }
        param.value.is_none()
            && AUDIO_PARAM_EXTENSIONS
                .iter()
                .any(|ext| param.key.to_ascii_lowercase().ends_with(ext))
    }
}
