use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use roster_config::ROSTER_DIR;

mod bootstrap;
mod cli;
mod commands;
mod context;
mod output;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("roster error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    let flags = cli.global_flags();
    init_tracing(flags.quiet, flags.verbose)?;

    let creates_project = matches!(cli.command, cli::Commands::Init(_));
    let project_root = resolve_project_root(flags.project.as_deref(), creates_project)?;
    if creates_project {
        let roster_dir = project_root.join(ROSTER_DIR);
        std::fs::create_dir_all(&roster_dir)
            .with_context(|| format!("failed to create {}", roster_dir.display()))?;
    }

    let config = bootstrap::load_config(&project_root)?;
    let ctx = context::AppContext::init(project_root, config)
        .await
        .context("failed to initialize roster application context")?;

    commands::dispatch::dispatch(cli.command, &ctx, &flags).await
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("ROSTER_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

/// Pick the project root: an explicit `--project`, else the nearest ancestor
/// holding `.roster/`. `init` falls back to the current directory.
fn resolve_project_root(project_override: Option<&str>, creating: bool) -> anyhow::Result<PathBuf> {
    if let Some(path) = project_override {
        let explicit = PathBuf::from(path);

        if explicit
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name == ROSTER_DIR)
        {
            return explicit
                .parent()
                .map(Path::to_path_buf)
                .context("invalid --project path: '.roster' directory has no parent");
        }

        if explicit.is_dir() {
            return Ok(explicit);
        }

        anyhow::bail!(
            "invalid --project '{}': directory does not exist",
            explicit.display()
        );
    }

    let start = std::env::current_dir().context("failed to read current directory")?;
    match context::find_project_root(&start) {
        Some(root) => Ok(root),
        None if creating => Ok(start),
        None => anyhow::bail!(
            "not a roster project (no {ROSTER_DIR} directory found). Run 'roster init' first."
        ),
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::resolve_project_root;

    #[test]
    fn explicit_project_directory_is_used() {
        let temp = TempDir::new().expect("tempdir should create");
        let path = temp.path().to_string_lossy().to_string();

        let root = resolve_project_root(Some(&path), false).expect("root should resolve");
        assert_eq!(root, temp.path());
    }

    #[test]
    fn explicit_roster_dir_resolves_to_parent() {
        let temp = TempDir::new().expect("tempdir should create");
        let marker = temp.path().join(".roster");
        std::fs::create_dir(&marker).expect(".roster should create");

        let root = resolve_project_root(Some(&marker.to_string_lossy()), false)
            .expect("root should resolve");
        assert_eq!(root, temp.path());
    }

    #[test]
    fn missing_explicit_directory_is_rejected() {
        let temp = TempDir::new().expect("tempdir should create");
        let missing = temp.path().join("nope");

        let err = resolve_project_root(Some(&missing.to_string_lossy()), true)
            .expect_err("missing dir should fail");
        assert!(err.to_string().contains("does not exist"));
    }
}
