use std::path::PathBuf;

use crate::{command::play::app::PlayApp, logging, util};

mod app;
mod game_loop;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    /// Match settings (JSON). Defaults apply to missing keys
    #[clap(long)]
    config: Option<PathBuf>,
    /// Write logs to this file; nothing is logged without it
    #[clap(long)]
    log_file: Option<PathBuf>,
    /// Seed for the shape generators and the agent, overriding the config
    #[clap(long)]
    seed: Option<u64>,
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let PlayArg {
        config,
        log_file,
        seed,
    } = arg;

    if let Some(path) = log_file {
        logging::init_file(path)?;
    }
    let mut config = util::read_config_file(config.as_deref())?;
    if seed.is_some() {
        config.agent.seed = *seed;
    }

    let mut app = PlayApp::new(config);
    game_loop::run(&mut app)?;

    if let Some(winner) = app.winner() {
        tracing::info!(%winner, "session ended");
    }
    Ok(())
}
