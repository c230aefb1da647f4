use std::{path::PathBuf, time::Duration};

use serde::Serialize;
use towerblocks_ai::{Ai, Decision, MatchConfig};
use towerblocks_engine::{BitBoard, Board, BoardStats, Piece, PieceSeed, PlayerType};

use crate::{
    logging,
    util::{self, Output},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SimulateArg {
    /// Match settings (JSON); only the agent and gravity settings are used
    #[clap(long)]
    config: Option<PathBuf>,
    /// Seed for the shape generator and the agent, overriding the config
    #[clap(long)]
    seed: Option<u64>,
    /// Number of ticks to run
    #[clap(long, default_value_t = 2400)]
    ticks: u64,
    /// Simulated time per tick, in milliseconds
    #[clap(long, default_value_t = 50)]
    tick_ms: u64,
    /// Output file for the final statistics (defaults to stdout)
    #[clap(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct SimulationReport {
    seed: Option<u64>,
    /// Seed the shape generator ran with, random ones included.
    piece_seed: PieceSeed,
    ticks: u64,
    elapsed_ms: u64,
    topped_out: bool,
    last_decision: Option<Decision>,
    stats: BoardStats,
    board: BitBoard,
    falling_piece: Piece,
}

pub(crate) fn run(arg: &SimulateArg) -> anyhow::Result<()> {
    let SimulateArg {
        config,
        seed,
        ticks,
        tick_ms,
        output,
    } = arg;

    logging::init_stderr()?;
    let mut config = util::read_config_file(config.as_deref())?;
    if seed.is_some() {
        config.agent.seed = *seed;
    }

    let report = simulate(&config, *ticks, Duration::from_millis(*tick_ms));
    tracing::info!(
        ticks = report.ticks,
        pieces = report.stats.completed_pieces(),
        lines = report.stats.total_cleared_lines(),
        topped_out = report.topped_out,
        "simulation finished"
    );
    Output::save_json(&report, output.clone())
}

/// Lets the agent play a single board until `max_ticks` pass or it tops out.
fn simulate(config: &MatchConfig, max_ticks: u64, tick: Duration) -> SimulationReport {
    let board = match config.agent.seed {
        Some(seed) => Board::with_seed(PlayerType::Ai, PieceSeed::from(seed)),
        None => Board::new(PlayerType::Ai),
    };
    let mut board = board.with_gravity_interval(config.gravity_interval());
    let mut ai = Ai::new(&config.agent);

    board.reset_and_play();
    forward_events(&mut board, &mut ai);
    let mut ticks = 0;
    let mut topped_out = false;
    while ticks < max_ticks {
        if board.state().is_filled() {
            topped_out = true;
            break;
        }
        advance(&mut board, &mut ai, tick);
        ticks += 1;
    }

    SimulationReport {
        seed: config.agent.seed,
        piece_seed: board.seed(),
        ticks,
        elapsed_ms: u64::try_from(tick.as_millis())
            .unwrap_or(u64::MAX)
            .saturating_mul(ticks),
        topped_out,
        last_decision: ai.last_decision(),
        stats: board.stats().clone(),
        board: board.grid().clone(),
        falling_piece: board.falling_piece(),
    }
}

/// Runs gravity, lets the agent plan any shape that spawned, then lets it move.
fn advance(board: &mut Board, ai: &mut Ai, tick: Duration) {
    board.step(tick);
    forward_events(board, ai);
    ai.step(board, tick);
}

fn forward_events(board: &mut Board, ai: &mut Ai) {
    for event in board.drain_events() {
        ai.handle_event(&event, &*board);
    }
}
