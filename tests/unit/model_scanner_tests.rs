/*!
 * Tests for model and reference-audio file scanning
 */

use autovoice::model_scanner::ModelFileScanner;

use crate::common;

#[test]
fn test_scan_withNestedDirectories_shouldFindFilesRecursively() {
    let temp = common::create_temp_dir().unwrap();
    common::create_test_file(temp.path(), "models/happy/voice.ckpt", "g").unwrap();
    common::create_test_file(temp.path(), "models/sad/deep/voice.ckpt", "g").unwrap();
    common::create_test_file(temp.path(), "models/happy/voice.pth", "s").unwrap();
    common::create_test_file(temp.path(), "ref/hello.wav", "a").unwrap();
    common::create_test_file(temp.path(), "ref/ignore.txt", "x").unwrap();

    let scanned = ModelFileScanner::scan(temp.path(), "models", "models", "ref");

    assert_eq!(scanned.gpt_files.len(), 2);
    assert_eq!(scanned.sovits_files.len(), 1);
    assert_eq!(scanned.ref_audio_files, vec!["ref/hello.wav".to_string()]);
    assert!(scanned.is_complete());
}

#[test]
fn test_scan_shouldReturnSortedRelativePaths() {
    let temp = common::create_temp_dir().unwrap();
    common::create_test_file(temp.path(), "models/b/voice.ckpt", "g").unwrap();
    common::create_test_file(temp.path(), "models/a/voice.ckpt", "g").unwrap();

    let scanned = ModelFileScanner::scan(temp.path(), "models", "", "");

    assert_eq!(
        scanned.gpt_files,
        vec![
            "models/a/voice.ckpt".to_string(),
            "models/b/voice.ckpt".to_string(),
        ]
    );
}

#[test]
fn test_scan_withMissingDirectory_shouldYieldEmptyCategory() {
    let temp = common::create_temp_dir().unwrap();
    common::create_test_file(temp.path(), "ref/hello.wav", "a").unwrap();

    let scanned = ModelFileScanner::scan(temp.path(), "no-such-dir", "", "ref");

    assert!(scanned.gpt_files.is_empty());
    assert!(scanned.sovits_files.is_empty());
    assert_eq!(scanned.ref_audio_files.len(), 1);
    assert!(!scanned.is_complete());
    assert!(!scanned.is_empty());
}

#[test]
fn test_scan_withUppercaseExtension_shouldStillMatch() {
    let temp = common::create_temp_dir().unwrap();
    common::create_test_file(temp.path(), "ref/LOUD.WAV", "a").unwrap();
    common::create_test_file(temp.path(), "ref/quiet.Mp3", "a").unwrap();

    let scanned = ModelFileScanner::scan(temp.path(), "", "", "ref");

    assert_eq!(scanned.ref_audio_files.len(), 2);
}

#[test]
fn test_scan_withAllDirectoriesMissing_shouldBeEmpty() {
    let temp = common::create_temp_dir().unwrap();

    let scanned = ModelFileScanner::scan(temp.path(), "x", "y", "z");

    assert!(scanned.is_empty());
}
