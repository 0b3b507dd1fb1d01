/*!
 * Snapshot persistence and diffing for dialogue scripts.
 *
 * One snapshot is kept per script file, storing the last-seen content, its
 * hash, and the parsed statements tagged with stable identity keys. Diffing
 * a new version of the file against the snapshot yields exactly the added
 * and removed statements; statements present in both are untouched even when
 * derived fields such as line numbers shifted.
 */

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use log::{debug, warn};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::file_utils::FileManager;
use crate::script_codec::{DialogueStatement, Param, ScriptCodec};

/// Disambiguated identity of a statement across runs.
///
/// Two statements with identical character and text collide unless told
/// apart by `occurrence`, which counts repeats of the same pair in
/// encounter order within one file. This is what lets the cache report
/// "the 3rd occurrence of this exact line" as removed when lines repeat
/// verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentityKey {
    /// Speaking character
    pub character: String,

    /// Statement text
    pub text: String,

    /// 0-based repeat ordinal of this (character, text) pair
    pub occurrence: u32,
}

/// Compute identity keys for a statement list, in statement order
pub fn identity_keys(statements: &[DialogueStatement]) -> Vec<IdentityKey> {
    let mut seen: HashMap<(String, String), u32> = HashMap::new();
    statements
        .iter()
        .map(|statement| {
            let counter = seen
                .entry((statement.character.clone(), statement.text.clone()))
                .or_insert(0);
            let occurrence = *counter;
            *counter += 1;
            IdentityKey {
                character: statement.character.clone(),
                text: statement.text.clone(),
                occurrence,
            }
        })
        .collect()
}

/// One statement as persisted inside a snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotStatement {
    /// Identity key of the statement
    pub key: IdentityKey,

    /// Statement parameters at snapshot time
    pub params: Vec<Param>,

    /// 1-based line number at snapshot time
    pub line_number: usize,
}

/// Persisted record of the last successful run over one script file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSnapshot {
    /// Canonical path of the script file
    pub file_path: String,

    /// Full file content at snapshot time
    pub raw_content: String,

    /// SHA-256 of the content
    pub content_hash: String,

    /// RFC 3339 creation timestamp
    pub timestamp: String,

    /// Parsed statements with identity keys
    pub statements: Vec<SnapshotStatement>,
}

/// Result of diffing a script file against its snapshot
#[derive(Debug, Default)]
pub struct ScriptDiff {
    /// Statements present only in the current version
    pub added: Vec<DialogueStatement>,

    /// Identity keys present only in the previous version
    pub removed: Vec<IdentityKey>,
}

/// Snapshot store keeping one JSON record per script file.
///
/// Records live under `<work_dir>/.autovoice/snapshots/`, named by a SHA-256
/// of the canonical script path. A missing or corrupt record is treated as
/// "no prior state", never as an error.
pub struct SnapshotStore {
    /// Directory holding the snapshot records
    snapshot_dir: PathBuf,

    /// In-memory copy of records touched during this run
    loaded: Arc<RwLock<HashMap<String, CacheSnapshot>>>,
}

impl SnapshotStore {
    /// Create a store rooted at the given working directory
    pub fn new<P: AsRef<Path>>(work_dir: P) -> Self {
        Self {
            snapshot_dir: work_dir.as_ref().join(".autovoice").join("snapshots"),
            loaded: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Diff the current file content against the stored snapshot.
    ///
    /// Absent snapshot means everything is added. Diffing never mutates
    /// state; only `save` and `clear` do.
    pub fn diff(
        &self,
        file_path: &Path,
        current_text: &str,
        known_characters: &[String],
    ) -> ScriptDiff {
        let current_statements = ScriptCodec::parse(current_text, known_characters);
        let current_keys = identity_keys(&current_statements);

        let previous = match self.load(file_path) {
            Some(snapshot) => snapshot,
            None => {
                debug!("No snapshot for {:?}, treating all statements as added", file_path);
                return ScriptDiff {
                    added: current_statements,
                    removed: Vec::new(),
                };
            }
        };

        if previous.content_hash == Self::hash_content(current_text) {
            debug!("Content hash unchanged for {:?}, nothing to do", file_path);
            return ScriptDiff::default();
        }

        let previous_keys: HashSet<&IdentityKey> =
            previous.statements.iter().map(|s| &s.key).collect();
        let current_key_set: HashSet<&IdentityKey> = current_keys.iter().collect();

        let added = current_statements
            .iter()
            .zip(current_keys.iter())
            .filter(|(_, key)| !previous_keys.contains(key))
            .map(|(statement, _)| statement.clone())
            .collect();

        let removed = previous
            .statements
            .iter()
            .filter(|s| !current_key_set.contains(&s.key))
            .map(|s| s.key.clone())
            .collect();

        ScriptDiff { added, removed }
    }

    /// Persist a new snapshot for the file after a successful run
    pub fn save(
        &self,
        file_path: &Path,
        text: &str,
        known_characters: &[String],
    ) -> Result<()> {
        let statements = ScriptCodec::parse(text, known_characters);
        let keys = identity_keys(&statements);

        let snapshot = CacheSnapshot {
            file_path: file_path.to_string_lossy().to_string(),
            raw_content: text.to_string(),
            content_hash: Self::hash_content(text),
            timestamp: Utc::now().to_rfc3339(),
            statements: statements
                .iter()
                .zip(keys)
                .map(|(statement, key)| SnapshotStatement {
                    key,
                    params: statement.params.clone(),
                    line_number: statement.line_number,
                })
                .collect(),
        };

        let record_path = self.record_path(file_path);
        let json = serde_json::to_string_pretty(&snapshot)
            .context("Failed to serialize snapshot")?;
        FileManager::write_to_file(&record_path, &json)?;

        self.loaded
            .write()
            .insert(snapshot.file_path.clone(), snapshot);
        debug!("Saved snapshot for {:?}", file_path);
        Ok(())
    }

    /// Drop the snapshot for a file.
    ///
    /// Used by full-reprocess mode; must run before audio filenames are
    /// re-derived so no orphaned files are left behind.
    pub fn clear(&self, file_path: &Path) -> Result<()> {
        self.loaded
            .write()
            .remove(&file_path.to_string_lossy().to_string());
        FileManager::remove_if_exists(self.record_path(file_path))?;
        debug!("Cleared snapshot for {:?}", file_path);
        Ok(())
    }

    /// Load the snapshot for a file, degrading to `None` on any failure
    fn load(&self, file_path: &Path) -> Option<CacheSnapshot> {
        let path_key = file_path.to_string_lossy().to_string();
        if let Some(snapshot) = self.loaded.read().get(&path_key) {
            return Some(snapshot.clone());
        }

        let record_path = self.record_path(file_path);
        if !record_path.exists() {
            return None;
        }

        let content = match FileManager::read_to_string(&record_path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Unreadable snapshot {:?}: {}", record_path, e);
                return None;
            }
        };

        match serde_json::from_str::<CacheSnapshot>(&content) {
            Ok(snapshot) => {
                self.loaded.write().insert(path_key, snapshot.clone());
                Some(snapshot)
            }
            Err(e) => {
                warn!("Corrupt snapshot {:?}, treating as empty: {}", record_path, e);
                None
            }
        }
    }

    /// Snapshot record path for a script file, keyed by a hash of the path
    fn record_path(&self, file_path: &Path) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(file_path.to_string_lossy().as_bytes());
        let digest = format!("{:x}", hasher.finalize());
        self.snapshot_dir.join(format!("{}.json", digest))
    }

    /// SHA-256 hash of script content
    fn hash_content(text: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}
