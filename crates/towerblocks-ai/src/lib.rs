//! Decision engine for the agent side of a towerblocks match.
//!
//! - [`ZombieBoard`] / [`RealBoard`] - the board capabilities the agent consumes
//! - [`BoardAnalysis`] / [`BoardMetrics`] - grid metrics and the fitness built on them
//! - [`strategize`] - exhaustive (rotation, column) search on a zombie copy
//! - [`MoveExecutor`] / [`MoveCadence`] - throttled execution of a [`Decision`]
//! - [`Ai`] - the agent tying search and execution to board events
//! - [`Match`] - a human board against an agent board

pub use self::{
    agent::*, board_analysis::*, executor::*, fitness::*, strategy::*, versus::*, zombie::*,
};

mod agent;
mod board_analysis;
mod executor;
mod fitness;
mod strategy;
mod versus;
mod zombie;
