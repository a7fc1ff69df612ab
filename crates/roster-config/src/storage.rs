//! Database and trail locations.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

fn default_db_path() -> String {
    "roster.db".to_string()
}

fn default_trail_dir() -> String {
    "trail".to_string()
}

const fn default_trail_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// libSQL database file. Relative paths resolve against `.roster/`.
    /// `:memory:` keeps everything in process.
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Directory for per-study JSONL trail files. Relative to `.roster/`.
    #[serde(default = "default_trail_dir")]
    pub trail_dir: String,

    /// Whether committed commands are appended to the trail.
    #[serde(default = "default_trail_enabled")]
    pub trail_enabled: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            trail_dir: default_trail_dir(),
            trail_enabled: default_trail_enabled(),
        }
    }
}

impl StorageConfig {
    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        self.db_path == ":memory:"
    }

    /// Database path resolved against the project's `.roster` directory.
    #[must_use]
    pub fn resolved_db_path(&self, roster_dir: &Path) -> String {
        if self.is_in_memory() {
            return self.db_path.clone();
        }
        resolve(roster_dir, &self.db_path).to_string_lossy().into_owned()
    }

    /// Trail directory resolved against `.roster`, or `None` when disabled.
    #[must_use]
    pub fn resolved_trail_dir(&self, roster_dir: &Path) -> Option<PathBuf> {
        self.trail_enabled
            .then(|| resolve(roster_dir, &self.trail_dir))
    }
}

fn resolve(base: &Path, value: &str) -> PathBuf {
    let path = PathBuf::from(value);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}
