use std::{fs::File, path::Path, sync::Mutex};

use anyhow::Context as _;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const DEFAULT_FILTER: &str = "towerblocks=info,towerblocks_ai=info,towerblocks_engine=info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Logs to stderr.
pub(crate) fn init_stderr() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter())
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install the log subscriber")
}

/// Logs to `path`, keeping the terminal free for the UI.
pub(crate) fn init_file(path: &Path) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter())
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install the log subscriber")
}
