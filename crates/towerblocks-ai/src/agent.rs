use std::time::Duration;

use arrayvec::ArrayVec;
use rand::SeedableRng as _;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use towerblocks_engine::{BoardEvent, PlayerType};

use crate::{Decision, MoveAction, MoveCadence, MoveExecutor, RealBoard, ZombieBoard, strategize};

/// Agent settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Base time between two primitive moves.
    pub move_interval_ms: u64,
    /// Randomise each move interval by up to ±50 ms.
    pub move_jitter: bool,
    /// Seed for the shape generator and the jitter; random when absent.
    pub seed: Option<u64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            move_interval_ms: 250,
            move_jitter: false,
            seed: None,
        }
    }
}

impl AgentConfig {
    #[must_use]
    pub fn move_interval(&self) -> Duration {
        Duration::from_millis(self.move_interval_ms)
    }
}

/// The computer player.
///
/// Plans when told a new shape became active on its board, then plays the
/// plan out through [`Self::step`].
#[derive(Debug, Clone)]
pub struct Ai {
    executor: MoveExecutor,
    cadence: MoveCadence,
    last_decision: Option<Decision>,
}

impl Default for Ai {
    fn default() -> Self {
        Self::new(&AgentConfig::default())
    }
}

impl Ai {
    #[must_use]
    pub fn new(config: &AgentConfig) -> Self {
        let mut cadence = MoveCadence::new(config.move_interval());
        if config.move_jitter {
            let rng = match config.seed {
                Some(seed) => Pcg32::seed_from_u64(seed),
                None => Pcg32::from_rng(&mut rand::rng()),
            };
            cadence = cadence.with_jitter(rng);
        }
        Self {
            executor: MoveExecutor::new(),
            cadence,
            last_decision: None,
        }
    }

    #[must_use]
    pub fn executor(&self) -> &MoveExecutor {
        &self.executor
    }

    #[must_use]
    pub fn cadence(&self) -> &MoveCadence {
        &self.cadence
    }

    #[must_use]
    pub fn last_decision(&self) -> Option<Decision> {
        self.last_decision
    }

    /// Plans a placement when `event` announces a new shape on the agent's board.
    ///
    /// Every other event is ignored.
    pub fn handle_event<B>(&mut self, event: &BoardEvent, board: &B) -> Option<Decision>
    where
        B: RealBoard + ?Sized,
    {
        if !event.is_new_shape_for(PlayerType::Ai) {
            return None;
        }
        self.strategize(board)
    }

    /// Searches `board` and arms the executor with the result.
    pub fn strategize<B>(&mut self, board: &B) -> Option<Decision>
    where
        B: RealBoard + ?Sized,
    {
        let decision = strategize(board)?;
        self.executor.arm(decision);
        self.last_decision = Some(decision);
        Some(decision)
    }

    /// Advances the move cadence and, when a move is due, acts on `board`.
    ///
    /// Returns every action issued this tick; empty when no move was due.
    pub fn step<B>(&mut self, board: &mut B, elapsed: Duration) -> ArrayVec<MoveAction, 2>
    where
        B: ZombieBoard + ?Sized,
    {
        if !self.cadence.tick(elapsed) {
            return ArrayVec::new();
        }
        self.executor.advance_towards_target(board)
    }
}
