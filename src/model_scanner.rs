/*!
 * Candidate file enumeration for voice synthesis.
 *
 * Scans a character's configured directories for GPT weights, SoVITS
 * weights, and reference audio, returning paths relative to the scan base.
 * A missing directory yields an empty category and a warning; whether an
 * empty category is an error is the caller's decision.
 */

use std::path::{Path, PathBuf};

use log::{debug, warn};
use walkdir::WalkDir;

/// Extensions recognized as GPT weight files
const GPT_EXTENSIONS: [&str; 1] = ["ckpt"];

/// Extensions recognized as SoVITS weight files
const SOVITS_EXTENSIONS: [&str; 1] = ["pth"];

/// Extensions recognized as reference audio
const AUDIO_EXTENSIONS: [&str; 4] = ["wav", "mp3", "ogg", "flac"];

/// Candidate files found for one character, relative to the scan base
#[derive(Debug, Clone, Default)]
pub struct ScannedFiles {
    /// GPT weight candidates
    pub gpt_files: Vec<String>,

    /// SoVITS weight candidates
    pub sovits_files: Vec<String>,

    /// Reference audio candidates
    pub ref_audio_files: Vec<String>,
}

impl ScannedFiles {
    /// True when every category came back empty
    pub fn is_empty(&self) -> bool {
        self.gpt_files.is_empty()
            && self.sovits_files.is_empty()
            && self.ref_audio_files.is_empty()
    }

    /// True when every category has at least one candidate
    pub fn is_complete(&self) -> bool {
        !self.gpt_files.is_empty()
            && !self.sovits_files.is_empty()
            && !self.ref_audio_files.is_empty()
    }
}

/// Scanner for a character's model and reference-audio directories
pub struct ModelFileScanner;

impl ModelFileScanner {
    /// Enumerate candidate files under each configured directory.
    ///
    /// Paths in the result are relative to `base_dir` where possible so
    /// they stay stable across machines.
    pub fn scan<P: AsRef<Path>>(
        base_dir: P,
        gpt_dir: &str,
        sovits_dir: &str,
        ref_audio_dir: &str,
    ) -> ScannedFiles {
        let base_dir = base_dir.as_ref();
        let scanned = ScannedFiles {
            gpt_files: Self::scan_category(base_dir, gpt_dir, &GPT_EXTENSIONS),
            sovits_files: Self::scan_category(base_dir, sovits_dir, &SOVITS_EXTENSIONS),
            ref_audio_files: Self::scan_category(base_dir, ref_audio_dir, &AUDIO_EXTENSIONS),
        };
        debug!(
            "Scanned {} gpt, {} sovits, {} reference audio candidates",
            scanned.gpt_files.len(),
            scanned.sovits_files.len(),
            scanned.ref_audio_files.len()
        );
        scanned
    }

    /// Enumerate files with one of the given extensions under a directory
    fn scan_category(base_dir: &Path, dir: &str, extensions: &[&str]) -> Vec<String> {
        if dir.is_empty() {
            return Vec::new();
        }

        let root = Self::resolve(base_dir, dir);
        if !root.is_dir() {
            warn!("Scan directory does not exist: {:?}", root);
            return Vec::new();
        }

        let mut files: Vec<String> = WalkDir::new(&root)
            .follow_links(true)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter(|entry| {
                entry
                    .path()
                    .extension()
                    .map(|ext| {
                        let ext = ext.to_string_lossy();
                        extensions.iter().any(|e| ext.eq_ignore_ascii_case(e))
                    })
                    .unwrap_or(false)
            })
            .map(|entry| {
                let path = entry.path();
                path.strip_prefix(base_dir)
                    .unwrap_or(path)
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();

        // Stable order so candidate indices mean the same thing across runs
        files.sort();
        files
    }

    /// Resolve a possibly relative directory against the base
    fn resolve(base_dir: &Path, dir: &str) -> PathBuf {
        let path = Path::new(dir);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }
}
