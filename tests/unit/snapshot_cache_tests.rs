/*!
 * Tests for snapshot persistence and script diffing
 */

use std::fs;

use autovoice::script_codec::ScriptCodec;
use autovoice::snapshot_cache::{identity_keys, IdentityKey, SnapshotStore};

use crate::common;

fn known(characters: &[&str]) -> Vec<String> {
    characters.iter().map(|c| c.to_string()).collect()
}

#[test]
fn test_identity_keys_withDuplicateLines_shouldDisambiguateByOccurrence() {
    let statements = ScriptCodec::parse("A: 你好;\nB: 世界;\nA: 你好;", &known(&["A", "B"]));
    let keys = identity_keys(&statements);

    assert_eq!(keys.len(), 3);
    assert_eq!(keys[0].occurrence, 0);
    assert_eq!(keys[2].occurrence, 1);
    assert_ne!(keys[0], keys[2]);
    assert_eq!(keys[0].character, keys[2].character);
    assert_eq!(keys[0].text, keys[2].text);
}

#[test]
fn test_diff_withNoSnapshot_shouldReportEverythingAdded() {
    let temp = common::create_temp_dir().unwrap();
    let store = SnapshotStore::new(temp.path());
    let script = temp.path().join("scene.txt");

    let diff = store.diff(&script, "A: one;\nB: two;", &known(&["A", "B"]));

    assert_eq!(diff.added.len(), 2);
    assert!(diff.removed.is_empty());
}

#[test]
fn test_diff_withSavedSnapshot_shouldReportOnlyChanges() {
    let temp = common::create_temp_dir().unwrap();
    let store = SnapshotStore::new(temp.path());
    let script = temp.path().join("scene.txt");
    let characters = known(&["A", "B"]);

    store.save(&script, "A: one;\nB: two;", &characters).unwrap();
    let diff = store.diff(&script, "A: one;\nB: three;", &characters);

    assert_eq!(diff.added.len(), 1);
    assert_eq!(diff.added[0].text, "three");
    assert_eq!(diff.removed.len(), 1);
    assert_eq!(diff.removed[0].text, "two");
}

#[test]
fn test_diff_withIdenticalContent_shouldReportNothing() {
    let temp = common::create_temp_dir().unwrap();
    let store = SnapshotStore::new(temp.path());
    let script = temp.path().join("scene.txt");
    let characters = known(&["A"]);

    store.save(&script, "A: same;", &characters).unwrap();
    let diff = store.diff(&script, "A: same;", &characters);

    assert!(diff.added.is_empty());
    assert!(diff.removed.is_empty());
}

/// Shifted line numbers alone must not produce tasks
#[test]
fn test_diff_withInsertedComment_shouldTreatStatementsAsUnchanged() {
    let temp = common::create_temp_dir().unwrap();
    let store = SnapshotStore::new(temp.path());
    let script = temp.path().join("scene.txt");
    let characters = known(&["A", "B"]);

    store.save(&script, "A: one;\nB: two;", &characters).unwrap();
    let diff = store.diff(&script, "; new comment\nA: one;\nB: two;", &characters);

    assert!(diff.added.is_empty());
    assert!(diff.removed.is_empty());
}

/// Removing one of two identical lines must report exactly one removal
#[test]
fn test_diff_withDuplicateLineRemoved_shouldReportExactlyOne() {
    let temp = common::create_temp_dir().unwrap();
    let store = SnapshotStore::new(temp.path());
    let script = temp.path().join("scene.txt");
    let characters = known(&["A", "B"]);

    store
        .save(&script, "A: 你好;\nB: 世界;\n; comment\nA: 你好;", &characters)
        .unwrap();
    let diff = store.diff(&script, "A: 你好;\nB: 世界;\n; comment", &characters);

    assert!(diff.added.is_empty());
    assert_eq!(diff.removed.len(), 1);
    assert_eq!(
        diff.removed[0],
        IdentityKey {
            character: "A".to_string(),
            text: "你好".to_string(),
            occurrence: 1,
        }
    );
}

#[test]
fn test_diff_withDuplicateLineAdded_shouldReportOnlyTheNewOccurrence() {
    let temp = common::create_temp_dir().unwrap();
    let store = SnapshotStore::new(temp.path());
    let script = temp.path().join("scene.txt");
    let characters = known(&["A"]);

    store.save(&script, "A: ...;", &characters).unwrap();
    let diff = store.diff(&script, "A: ...;\nA: ...;", &characters);

    assert_eq!(diff.added.len(), 1);
    assert!(diff.removed.is_empty());
}

#[test]
fn test_diff_withCorruptSnapshot_shouldDegradeToEmptyState() {
    let temp = common::create_temp_dir().unwrap();
    let store = SnapshotStore::new(temp.path());
    let script = temp.path().join("scene.txt");
    let characters = known(&["A"]);

    store.save(&script, "A: one;", &characters).unwrap();

    // Overwrite every snapshot record with garbage
    let snapshot_dir = temp.path().join(".autovoice").join("snapshots");
    for entry in fs::read_dir(&snapshot_dir).unwrap() {
        fs::write(entry.unwrap().path(), "{ not valid json").unwrap();
    }

    // A fresh store has no in-memory copy and must fall back to "no prior
    // state" instead of failing
    let fresh = SnapshotStore::new(temp.path());
    let diff = fresh.diff(&script, "A: one;", &characters);
    assert_eq!(diff.added.len(), 1);
    assert!(diff.removed.is_empty());
}

#[test]
fn test_clear_withExistingSnapshot_shouldReportEverythingAddedAgain() {
    let temp = common::create_temp_dir().unwrap();
    let store = SnapshotStore::new(temp.path());
    let script = temp.path().join("scene.txt");
    let characters = known(&["A"]);

    store.save(&script, "A: one;", &characters).unwrap();
    store.clear(&script).unwrap();

    let diff = store.diff(&script, "A: one;", &characters);
    assert_eq!(diff.added.len(), 1);
}

#[test]
fn test_clear_withNoSnapshot_shouldSucceed() {
    let temp = common::create_temp_dir().unwrap();
    let store = SnapshotStore::new(temp.path());

    store.clear(&temp.path().join("never-saved.txt")).unwrap();
}

#[test]
fn test_save_shouldRecordContentHashAndStatements() {
    let temp = common::create_temp_dir().unwrap();
    let store = SnapshotStore::new(temp.path());
    let script = temp.path().join("scene.txt");
    let characters = known(&["A"]);

    store.save(&script, "A: one -v=1;", &characters).unwrap();

    let snapshot_dir = temp.path().join(".autovoice").join("snapshots");
    let record = fs::read_dir(&snapshot_dir).unwrap().next().unwrap().unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(record.path()).unwrap()).unwrap();

    assert_eq!(json["raw_content"], "A: one -v=1;");
    assert_eq!(json["statements"].as_array().unwrap().len(), 1);
    assert!(!json["content_hash"].as_str().unwrap().is_empty());
}
