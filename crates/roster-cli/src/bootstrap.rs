use std::path::Path;

use anyhow::Context;
use roster_config::RosterConfig;

/// Load `{project_root}/.env` (or the nearest `.env` via dotenvy) and then
/// the layered configuration for the project.
pub fn load_config(project_root: &Path) -> anyhow::Result<RosterConfig> {
    load_project_dotenv(project_root)?;
    RosterConfig::load_in(project_root).context("failed to load roster configuration")
}

fn load_project_dotenv(project_root: &Path) -> anyhow::Result<()> {
    let env_path = project_root.join(".env");
    if env_path.exists() {
        dotenvy::from_path(&env_path)
            .with_context(|| format!("failed to load dotenv file at {}", env_path.display()))?;
        return Ok(());
    }

    dotenvy::dotenv().ok();
    Ok(())
}
