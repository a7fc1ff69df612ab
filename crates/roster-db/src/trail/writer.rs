//! JSONL trail writer.
//!
//! Appends `TrailOperation` records to per-study `{trail_dir}/{study_id}.jsonl`
//! files. Uses `serde_jsonlines::append_json_lines` for per-line appends.
//!
//! Study IDs are opaque, so the file stem is the ID with every byte outside
//! `[A-Za-z0-9_-]` written as `%XX`. The result never contains a separator
//! or a dot and always stays inside `trail_dir`.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use roster_core::trail::TrailOperation;

use crate::error::DatabaseError;

/// Appends trail operations to per-study JSONL files.
///
/// Commands call `append()` after persisting and before committing, so a
/// failed write aborts the command.
#[derive(Debug)]
pub struct TrailWriter {
    trail_dir: PathBuf,
    enabled: bool,
}

impl TrailWriter {
    /// Create a new `TrailWriter` pointing at the given directory.
    ///
    /// Creates the directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the directory cannot be created.
    pub fn new(trail_dir: PathBuf) -> Result<Self, DatabaseError> {
        std::fs::create_dir_all(&trail_dir).map_err(|e| DatabaseError::Other(e.into()))?;
        Ok(Self {
            trail_dir,
            enabled: true,
        })
    }

    /// Create a disabled writer (for testing or when trail is not needed).
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            trail_dir: PathBuf::new(),
            enabled: false,
        }
    }

    /// Whether trail writing is currently enabled.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Append one command's operations to the study's JSONL file.
    ///
    /// File path: `{trail_dir}/{encoded study_id}.jsonl`
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the file write fails.
    pub fn append(&self, study_id: &str, ops: &[TrailOperation]) -> Result<(), DatabaseError> {
        if !self.enabled || ops.is_empty() {
            return Ok(());
        }

        let path = self.path_for(study_id);
        serde_jsonlines::append_json_lines(&path, ops)
            .map_err(|e| DatabaseError::Other(e.into()))?;
        Ok(())
    }

    /// Trail file for `study_id`.
    #[must_use]
    pub fn path_for(&self, study_id: &str) -> PathBuf {
        self.trail_dir.join(format!("{}.jsonl", trail_file_stem(study_id)))
    }

    /// The directory where trail files are stored.
    #[must_use]
    pub fn trail_dir(&self) -> &Path {
        &self.trail_dir
    }
}

/// Percent-encode `study_id` into a single path component.
fn trail_file_stem(study_id: &str) -> String {
    let mut stem = String::with_capacity(study_id.len());
    for byte in study_id.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-' {
            stem.push(char::from(byte));
        } else {
            let _ = write!(stem, "%{byte:02X}");
        }
    }
    stem
}
