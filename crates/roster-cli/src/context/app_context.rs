use std::path::PathBuf;

use anyhow::Context;
use roster_config::RosterConfig;
use roster_db::service::RosterService;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub service: RosterService,
    pub config: RosterConfig,
    pub project_root: PathBuf,
}

impl AppContext {
    /// Open the project's database and trail directory under `.roster/`.
    pub async fn init(project_root: PathBuf, config: RosterConfig) -> anyhow::Result<Self> {
        let roster_dir = RosterConfig::roster_dir(&project_root);
        let service = RosterService::from_config(&config, &roster_dir)
            .await
            .context("failed to initialize roster-db service")?;

        tracing::debug!(
            project_root = %project_root.display(),
            db_path = %config.storage.resolved_db_path(&roster_dir),
            trail = service.trail().is_enabled(),
            "application context ready"
        );

        Ok(Self {
            service,
            config,
            project_root,
        })
    }
}
