use std::time::Duration;

use rand::Rng as _;
use serde::{Deserialize, Serialize};
use towerblocks_engine::{Board, BoardEvent, MoveError, PieceSeed, PlayerType};

use crate::{AgentConfig, Ai};

/// Hit points each player starts with.
pub const MAX_HP: u8 = 7;

/// Match settings. The agent settings sit at the same level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    #[serde(flatten)]
    pub agent: AgentConfig,
    pub gravity_interval_ms: u64,
    pub max_hp: u8,
    /// Bottom lines stripped from a topped-out board before it restarts.
    pub recovery_lines: usize,
    pub recovery_interval_ms: u64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            agent: AgentConfig::default(),
            gravity_interval_ms: 500,
            max_hp: MAX_HP,
            recovery_lines: 18,
            recovery_interval_ms: 100,
        }
    }
}

impl MatchConfig {
    #[must_use]
    pub fn gravity_interval(&self) -> Duration {
        Duration::from_millis(self.gravity_interval_ms)
    }

    #[must_use]
    pub fn recovery_interval(&self) -> Duration {
        Duration::from_millis(self.recovery_interval_ms)
    }
}

/// A move requested by a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum PlayerMovement {
    #[display("left")]
    Left,
    #[display("right")]
    Right,
    #[display("down")]
    Down,
    /// Drop and lock immediately.
    #[display("drop")]
    Drop,
    #[display("rotate clockwise")]
    RotateClockwise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum MatchState {
    Ready,
    Playing,
    Paused,
    Finished { winner: PlayerType },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Recovery {
    lines_left: usize,
    time_until_next_line: Duration,
}

#[derive(Debug, Clone)]
struct Player {
    board: Board,
    hp: u8,
    recovery: Option<Recovery>,
}

impl Player {
    fn new(player: PlayerType, seed: PieceSeed, config: &MatchConfig) -> Self {
        Self {
            board: Board::with_seed(player, seed).with_gravity_interval(config.gravity_interval()),
            hp: config.max_hp,
            recovery: None,
        }
    }

    fn step_recovery(&mut self, elapsed: Duration, interval: Duration) {
        let Some(recovery) = &mut self.recovery else {
            return;
        };
        recovery.time_until_next_line = recovery.time_until_next_line.saturating_sub(elapsed);
        if !recovery.time_until_next_line.is_zero() {
            return;
        }
        self.board.remove_bottom_line();
        recovery.lines_left = recovery.lines_left.saturating_sub(1);
        recovery.time_until_next_line = interval;
        if recovery.lines_left == 0 {
            self.recovery = None;
            self.board.reset_and_play();
            tracing::info!(player = %self.board.player(), "board recovered");
        }
    }
}

/// A human board against an agent board.
///
/// The match owns both boards and the [`Ai`], steps them together, and routes
/// board events: cleared rows become junk rows on the opponent, a top-out
/// costs a hit point and sends the board into recovery, and new agent shapes
/// reach the agent's planner.
#[derive(Debug, Clone)]
pub struct Match {
    config: MatchConfig,
    human: Player,
    ai_player: Player,
    ai: Ai,
    state: MatchState,
}

impl Match {
    #[must_use]
    pub fn new(config: MatchConfig) -> Self {
        let seed = config
            .agent
            .seed
            .map_or_else(|| rand::rng().random(), PieceSeed::from);
        Self {
            human: Player::new(PlayerType::Human, seed, &config),
            ai_player: Player::new(PlayerType::Ai, seed, &config),
            ai: Ai::new(&config.agent),
            config,
            state: MatchState::Ready,
        }
    }

    #[must_use]
    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> MatchState {
        self.state
    }

    #[must_use]
    pub fn winner(&self) -> Option<PlayerType> {
        match self.state {
            MatchState::Finished { winner } => Some(winner),
            _ => None,
        }
    }

    #[must_use]
    pub fn board(&self, player: PlayerType) -> &Board {
        &self.player(player).board
    }

    pub fn board_mut(&mut self, player: PlayerType) -> &mut Board {
        &mut self.player_mut(player).board
    }

    #[must_use]
    pub fn hp(&self, player: PlayerType) -> u8 {
        self.player(player).hp
    }

    #[must_use]
    pub fn is_recovering(&self, player: PlayerType) -> bool {
        self.player(player).recovery.is_some()
    }

    #[must_use]
    pub fn ai(&self) -> &Ai {
        &self.ai
    }

    /// Starts both boards.
    pub fn start(&mut self) {
        if !self.state.is_ready() {
            return;
        }
        self.state = MatchState::Playing;
        self.human.board.reset_and_play();
        self.ai_player.board.reset_and_play();
        tracing::info!(max_hp = self.config.max_hp, "match started");
        self.dispatch_events();
    }

    pub fn toggle_pause(&mut self) {
        self.state = match self.state {
            MatchState::Playing => MatchState::Paused,
            MatchState::Paused => MatchState::Playing,
            state => state,
        };
    }

    /// Advances both boards, the agent and any recovery by `elapsed`.
    pub fn step(&mut self, elapsed: Duration) {
        if !self.state.is_playing() {
            return;
        }
        let recovery_interval = self.config.recovery_interval();
        for player in [&mut self.human, &mut self.ai_player] {
            player.board.step(elapsed);
            player.step_recovery(elapsed, recovery_interval);
        }
        // A shape spawned by this step must be planned before the agent moves it.
        self.dispatch_events();
        if !self.state.is_playing() {
            return;
        }
        self.ai.step(&mut self.ai_player.board, elapsed);
        self.dispatch_events();
    }

    /// Applies a move to `player`'s board.
    pub fn handle_player_movement(
        &mut self,
        player: PlayerType,
        movement: PlayerMovement,
    ) -> Result<(), MoveError> {
        if !self.state.is_playing() {
            return Err(MoveError::NotPlaying);
        }
        let board = &mut self.player_mut(player).board;
        let result = match movement {
            PlayerMovement::Left => board.try_move_left(),
            PlayerMovement::Right => board.try_move_right(),
            PlayerMovement::Down => board.try_move_down(),
            PlayerMovement::Drop => board.hard_drop(),
            PlayerMovement::RotateClockwise => board.try_rotate_right(),
        };
        self.dispatch_events();
        result
    }

    fn player(&self, player: PlayerType) -> &Player {
        match player {
            PlayerType::Human => &self.human,
            PlayerType::Ai => &self.ai_player,
        }
    }

    fn player_mut(&mut self, player: PlayerType) -> &mut Player {
        match player {
            PlayerType::Human => &mut self.human,
            PlayerType::Ai => &mut self.ai_player,
        }
    }

    /// Routes queued events until both boards are quiet.
    fn dispatch_events(&mut self) {
        loop {
            let mut events = self.human.board.drain_events();
            events.extend(self.ai_player.board.drain_events());
            if events.is_empty() {
                break;
            }
            for event in events {
                self.handle_board_event(&event);
            }
        }
    }

    fn handle_board_event(&mut self, event: &BoardEvent) {
        match *event {
            BoardEvent::ActiveShapeChanged { .. } => {
                self.ai.handle_event(event, &self.ai_player.board);
            }
            BoardEvent::RowsFilled { player, count } => {
                let opponent = player.opponent();
                tracing::info!(from = %player, to = %opponent, count, "junk rows sent");
                self.player_mut(opponent).board.add_junk_rows(count);
            }
            BoardEvent::BoardFilled { player } => self.handle_top_out(player),
        }
    }

    fn handle_top_out(&mut self, player: PlayerType) {
        if !self.state.is_playing() {
            return;
        }
        let lines = self.config.recovery_lines;
        let interval = self.config.recovery_interval();
        let slot = self.player_mut(player);
        slot.hp = slot.hp.saturating_sub(1);
        let hp = slot.hp;
        tracing::info!(%player, hp, "board filled");

        if hp == 0 {
            let winner = player.opponent();
            self.state = MatchState::Finished { winner };
            tracing::info!(%winner, "match finished");
            return;
        }
        slot.recovery = Some(Recovery {
            lines_left: lines.max(1),
            time_until_next_line: interval,
        });
    }
}

#[cfg(test)]
mod tests {
    use towerblocks_engine::{BitBoard, Piece, PieceKind, Playfield};

    use super::*;

    const TICK: Duration = Duration::from_millis(100);

    fn config() -> MatchConfig {
        MatchConfig {
            agent: AgentConfig {
                seed: Some(17),
                ..AgentConfig::default()
            },
            gravity_interval_ms: 60_000,
            ..MatchConfig::default()
        }
    }

    fn started(config: MatchConfig) -> Match {
        let mut game = Match::new(config);
        game.start();
        game
    }

    #[test]
    fn test_config_flattens_agent_settings() {
        let config: MatchConfig =
            serde_json::from_str(r#"{"max_hp": 3, "move_interval_ms": 120, "seed": 9}"#).unwrap();
        assert_eq!(config.max_hp, 3);
        assert_eq!(config.agent.move_interval_ms, 120);
        assert_eq!(config.agent.seed, Some(9));
        assert_eq!(config.recovery_lines, 18);
        assert_eq!(config.gravity_interval(), Duration::from_millis(500));

        let config: MatchConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, MatchConfig::default());
    }

    #[test]
    fn test_start_plans_for_ai() {
        let game = started(config());
        assert!(game.state().is_playing());
        assert!(game.board(PlayerType::Human).state().is_playing());
        assert!(game.board(PlayerType::Ai).state().is_playing());
        assert!(game.ai().last_decision().is_some());
        assert!(!game.ai().executor().is_move_completed());
        assert_eq!(game.hp(PlayerType::Human), MAX_HP);
    }

    #[test]
    fn test_moves_rejected_before_start() {
        let mut game = Match::new(config());
        assert!(matches!(
            game.handle_player_movement(PlayerType::Human, PlayerMovement::Left),
            Err(MoveError::NotPlaying)
        ));
    }

    #[test]
    fn test_cleared_rows_become_junk_for_opponent() {
        let mut game = started(config());
        game.board_mut(PlayerType::Human).load_playfield(Playfield::from_parts(
            BitBoard::from_ascii(
                "
                ####..####
                ####..####
                ",
            ),
            Piece::new(PieceKind::O),
        ));
        game.handle_player_movement(PlayerType::Human, PlayerMovement::Right)
            .unwrap();
        game.handle_player_movement(PlayerType::Human, PlayerMovement::Drop)
            .unwrap();

        assert!(game.board(PlayerType::Human).grid().is_playable_empty());
        let ai_board = game.board(PlayerType::Ai);
        assert_eq!(ai_board.stats().junk_rows_received(), 2);
        let junk = ai_board
            .grid()
            .playable_rows()
            .filter(|row| !row.is_playable_empty())
            .count();
        assert_eq!(junk, 2);
    }

    #[test]
    fn test_top_out_costs_hp_and_recovers() {
        let mut game = started(config());
        game.board_mut(PlayerType::Ai)
            .add_junk_rows(BitBoard::PLAYABLE_HEIGHT + 1);
        game.step(Duration::ZERO);

        assert_eq!(game.hp(PlayerType::Ai), MAX_HP - 1);
        assert!(game.is_recovering(PlayerType::Ai));
        assert!(game.board(PlayerType::Ai).state().is_filled());

        for _ in 0..17 {
            game.step(TICK);
        }
        assert!(game.is_recovering(PlayerType::Ai));
        game.step(TICK);

        assert!(!game.is_recovering(PlayerType::Ai));
        let ai_board = game.board(PlayerType::Ai);
        assert!(ai_board.state().is_playing());
        assert!(ai_board.grid().is_playable_empty());
        assert!(!game.ai().executor().is_move_completed());
        assert!(game.state().is_playing());
    }

    #[test]
    fn test_last_hp_ends_match() {
        let mut game = started(MatchConfig {
            max_hp: 1,
            ..config()
        });
        game.board_mut(PlayerType::Human)
            .add_junk_rows(BitBoard::PLAYABLE_HEIGHT + 1);
        game.step(Duration::ZERO);

        assert_eq!(game.winner(), Some(PlayerType::Ai));
        assert_eq!(game.hp(PlayerType::Human), 0);

        let ai_piece = game.board(PlayerType::Ai).falling_piece();
        game.step(Duration::from_secs(120));
        assert_eq!(game.board(PlayerType::Ai).falling_piece(), ai_piece);
        assert!(
            game.handle_player_movement(PlayerType::Ai, PlayerMovement::Drop)
                .is_err()
        );
    }

    #[test]
    fn test_pause_freezes_play() {
        let mut game = started(config());
        game.toggle_pause();
        assert!(game.state().is_paused());
        let board = game.board(PlayerType::Ai).clone();
        game.step(Duration::from_secs(120));
        assert_eq!(
            game.board(PlayerType::Ai).falling_piece(),
            board.falling_piece()
        );
        game.toggle_pause();
        assert!(game.state().is_playing());
    }

    #[test]
    fn test_agent_tracks_live_rotation_under_fast_gravity() {
        let mut game = started(MatchConfig {
            gravity_interval_ms: 20,
            ..config()
        });
        for _ in 0..2000 {
            game.step(Duration::from_millis(50));
            if !game.state().is_playing() {
                break;
            }
            let board = game.board(PlayerType::Ai);
            let executor = game.ai().executor();
            if board.state().is_playing() && !executor.is_move_completed() {
                let rotation = board.falling_piece().rotation().get();
                assert_eq!(rotation, executor.current_rotation());
            }
        }
        assert!(game.board(PlayerType::Ai).stats().completed_pieces() > 0);
    }

    #[test]
    fn test_agent_plays_on_its_own() {
        let mut game = started(MatchConfig {
            gravity_interval_ms: 100,
            ..config()
        });
        for _ in 0..600 {
            game.step(Duration::from_millis(50));
        }
        let stats = game.board(PlayerType::Ai).stats();
        assert!(stats.completed_pieces() >= 5, "{stats:?}");
    }
}
