use clap::{Parser, Subcommand};

use self::{evaluate::EvaluateArg, play::PlayArg, simulate::SimulateArg};

mod evaluate;
mod play;
mod simulate;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Play against the agent in the terminal
    Play(#[clap(flatten)] PlayArg),
    /// Let the agent play a single board without a UI
    Simulate(#[clap(flatten)] SimulateArg),
    /// Print the agent's decision for a board file
    Evaluate(#[clap(flatten)] EvaluateArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode.unwrap_or(Mode::Play(PlayArg::default())) {
        Mode::Play(arg) => play::run(&arg)?,
        Mode::Simulate(arg) => simulate::run(&arg)?,
        Mode::Evaluate(arg) => evaluate::run(&arg)?,
    }
    Ok(())
}
