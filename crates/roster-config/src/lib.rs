//! # roster-config
//!
//! Layered configuration loading for Roster using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`ROSTER_*` prefix, `__` as separator)
//! 2. Project-level `.roster/config.toml`
//! 3. User-level `~/.config/roster/config.toml`
//! 4. Built-in defaults
//!
//! Figment maps `ROSTER_RECRUITMENT__WINDOW_HOURS` -> `recruitment.window_hours`,
//! `ROSTER_STORAGE__DB_PATH` -> `storage.db_path`, and so on.
//!
//! ```no_run
//! use roster_config::RosterConfig;
//!
//! let config = RosterConfig::load_with_dotenv().expect("config");
//! let policy = config.recruitment.policy().expect("valid recruitment settings");
//! println!("windows last {} hours", config.recruitment.window_hours);
//! ```

mod error;
mod general;
mod recruitment;
mod storage;

pub use error::ConfigError;
pub use general::GeneralConfig;
pub use recruitment::RecruitmentConfig;
pub use storage::StorageConfig;

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

/// Name of the project-local state directory.
pub const ROSTER_DIR: &str = ".roster";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RosterConfig {
    #[serde(default)]
    pub recruitment: RecruitmentConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl RosterConfig {
    /// Load configuration relative to the current directory.
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` support.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source fails to parse or a value is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_in(Path::new("."))
    }

    /// Load configuration for the project rooted at `project_root`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source fails to parse or a value is invalid.
    pub fn load_in(project_root: &Path) -> Result<Self, ConfigError> {
        let config: Self = Self::figment_in(project_root).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source fails to parse or a value is invalid.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Provider chain for the current directory.
    #[must_use]
    pub fn figment() -> Figment {
        Self::figment_in(Path::new("."))
    }

    /// Provider chain for the project rooted at `project_root`.
    #[must_use]
    pub fn figment_in(project_root: &Path) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = project_root.join(ROSTER_DIR).join("config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("ROSTER_").split("__"))
    }

    /// Reject values the recruitment reducers cannot run with.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.recruitment.policy()?;
        if self.general.default_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "general.default_limit".into(),
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// The `.roster` directory of `project_root`.
    #[must_use]
    pub fn roster_dir(project_root: &Path) -> PathBuf {
        project_root.join(ROSTER_DIR)
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("roster").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = RosterConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.storage.db_path, "roster.db");
        assert!(config.storage.trail_enabled);
    }

    #[test]
    fn figment_builds_without_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let config: RosterConfig = RosterConfig::figment_in(dir.path())
            .extract()
            .expect("should extract defaults");
        assert_eq!(config.general.default_limit, 20);
        assert_eq!(config.recruitment.window_hours, 24);
    }

    #[test]
    fn zero_limit_is_invalid() {
        let mut config = RosterConfig::default();
        config.general.default_limit = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
