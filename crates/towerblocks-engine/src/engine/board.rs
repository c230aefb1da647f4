use std::{mem, time::Duration};

use arrayvec::ArrayVec;
use rand::Rng as _;
use rand_pcg::Pcg32;

use crate::{
    MoveError, PlayerType,
    core::{
        bit_board::{BitBoard, BitRow},
        piece::{Piece, PieceKind},
    },
};

use super::{BoardEvent, BoardStats, PieceBuffer, PieceSeed, Playfield};

/// Default time between two gravity steps.
pub const DEFAULT_GRAVITY_INTERVAL: Duration = Duration::from_millis(500);

const JUNK_RNG_STREAM: u64 = 0x6a75_6e6b;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum BoardState {
    /// Not started yet.
    Idle,
    Playing,
    /// Topped out; waits for [`Board::reset_and_play`].
    Filled,
}

/// One player's live board.
///
/// Wraps a [`Playfield`] with what the game needs around it: the piece
/// generator, gravity, line clears, junk rows, statistics and an event queue.
/// Moves are rejected with [`MoveError::NotPlaying`] unless the board is playing.
#[derive(Debug, Clone)]
pub struct Board {
    player: PlayerType,
    seed: PieceSeed,
    playfield: Playfield,
    piece_buffer: PieceBuffer,
    junk_rng: Pcg32,
    state: BoardState,
    gravity_interval: Duration,
    time_until_gravity: Duration,
    stats: BoardStats,
    events: Vec<BoardEvent>,
}

impl Board {
    #[must_use]
    pub fn new(player: PlayerType) -> Self {
        Self::with_seed(player, rand::rng().random())
    }

    #[must_use]
    pub fn with_seed(player: PlayerType, seed: PieceSeed) -> Self {
        let mut piece_buffer = PieceBuffer::with_seed(seed);
        let playfield = Playfield::new(piece_buffer.pop_next());
        Self {
            player,
            seed,
            playfield,
            piece_buffer,
            junk_rng: Pcg32::new(junk_rng_state(seed), JUNK_RNG_STREAM),
            state: BoardState::Idle,
            gravity_interval: DEFAULT_GRAVITY_INTERVAL,
            time_until_gravity: DEFAULT_GRAVITY_INTERVAL,
            stats: BoardStats::new(),
            events: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_gravity_interval(self, gravity_interval: Duration) -> Self {
        Self {
            gravity_interval,
            time_until_gravity: gravity_interval,
            ..self
        }
    }

    #[must_use]
    pub fn player(&self) -> PlayerType {
        self.player
    }

    /// Seed of the shape generator and junk gaps. Replays the same game.
    #[must_use]
    pub fn seed(&self) -> PieceSeed {
        self.seed
    }

    #[must_use]
    pub fn state(&self) -> BoardState {
        self.state
    }

    #[must_use]
    pub fn playfield(&self) -> &Playfield {
        &self.playfield
    }

    #[must_use]
    pub fn grid(&self) -> &BitBoard {
        self.playfield.grid()
    }

    #[must_use]
    pub fn falling_piece(&self) -> Piece {
        self.playfield.falling_piece()
    }

    /// Where the falling shape would land if dropped now.
    #[must_use]
    pub fn simulate_drop_position(&self) -> Piece {
        self.falling_piece()
            .simulate_drop_position(self.playfield.grid())
    }

    pub fn next_pieces(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.piece_buffer.next_pieces()
    }

    #[must_use]
    pub fn stats(&self) -> &BoardStats {
        &self.stats
    }

    /// Takes every event queued since the last call.
    pub fn drain_events(&mut self) -> Vec<BoardEvent> {
        mem::take(&mut self.events)
    }

    /// Clears the grid, spawns a shape and starts playing.
    pub fn reset_and_play(&mut self) {
        let piece = Piece::new(self.piece_buffer.pop_next());
        self.playfield = Playfield::from_parts(BitBoard::INITIAL, piece);
        self.state = BoardState::Playing;
        self.time_until_gravity = self.gravity_interval;
        self.push_event(BoardEvent::ActiveShapeChanged {
            player: self.player,
            starting: true,
        });
    }

    /// Replaces grid and falling shape and starts playing from there.
    ///
    /// Announces the falling shape like a regular spawn.
    pub fn load_playfield(&mut self, playfield: Playfield) {
        self.playfield = playfield;
        self.state = BoardState::Playing;
        self.time_until_gravity = self.gravity_interval;
        self.push_event(BoardEvent::ActiveShapeChanged {
            player: self.player,
            starting: true,
        });
    }

    /// Advances gravity by `elapsed`.
    ///
    /// Each time the gravity countdown expires the shape moves down one row,
    /// or locks if it cannot.
    pub fn step(&mut self, elapsed: Duration) {
        if !self.state.is_playing() {
            return;
        }
        self.time_until_gravity = self.time_until_gravity.saturating_sub(elapsed);
        if self.time_until_gravity.is_zero() {
            self.time_until_gravity = self.gravity_interval;
            self.auto_drop_and_complete();
        }
    }

    pub fn try_move_left(&mut self) -> Result<(), MoveError> {
        self.ensure_playing()?;
        self.playfield
            .try_move_left()
            .map_err(MoveError::PieceCollision)
    }

    pub fn try_move_right(&mut self) -> Result<(), MoveError> {
        self.ensure_playing()?;
        self.playfield
            .try_move_right()
            .map_err(MoveError::PieceCollision)
    }

    pub fn try_move_down(&mut self) -> Result<(), MoveError> {
        self.ensure_playing()?;
        self.playfield
            .try_move_down()
            .map_err(MoveError::PieceCollision)
    }

    pub fn try_rotate_right(&mut self) -> Result<(), MoveError> {
        self.ensure_playing()?;
        self.playfield
            .try_rotate_right()
            .map_err(MoveError::PieceCollision)
    }

    /// Drops the shape as far as it goes without locking it.
    ///
    /// The shape locks on the next gravity step.
    pub fn move_down_all_the_way(&mut self) -> usize {
        if !self.state.is_playing() {
            return 0;
        }
        self.playfield.move_down_all_the_way()
    }

    /// Drops the shape and locks it immediately.
    pub fn hard_drop(&mut self) -> Result<(), MoveError> {
        self.ensure_playing()?;
        self.playfield.move_down_all_the_way();
        self.complete_piece_drop();
        Ok(())
    }

    pub fn move_to_top(&mut self) {
        self.playfield.move_to_top();
    }

    pub fn commit_shape_to_cells(&mut self) {
        self.playfield.commit_shape_to_cells();
    }

    pub fn undo_commit(&mut self) {
        self.playfield.undo_commit();
    }

    #[must_use]
    pub fn current_column(&self) -> usize {
        self.playfield.current_column()
    }

    /// Pushes `count` junk rows (one random gap each) under the stack.
    ///
    /// The falling shape is lifted if the rising stack reaches it. The board
    /// tops out when occupied rows would leave the top or the shape cannot be
    /// lifted clear. Ignored unless the board is playing.
    pub fn add_junk_rows(&mut self, count: usize) {
        if !self.state.is_playing() || count == 0 {
            return;
        }
        self.stats.receive_junk_rows(count);
        if count > BitBoard::PLAYABLE_HEIGHT {
            self.top_out();
            return;
        }

        let rows = (0..count)
            .map(|_| BitRow::junk(self.junk_rng.random_range(0..BitBoard::PLAYABLE_WIDTH)))
            .collect::<ArrayVec<_, { BitBoard::PLAYABLE_HEIGHT }>>();
        self.playfield.undo_commit();
        if self.playfield.grid_mut().push_rows_from_bottom(&rows).is_err() {
            self.top_out();
            return;
        }

        let mut piece = self.playfield.falling_piece();
        while self.playfield.grid().is_colliding(piece) {
            let Some(lifted) = piece.up() else {
                self.top_out();
                return;
            };
            piece = lifted;
        }
        self.playfield.set_falling_piece_unchecked(piece);
    }

    /// Removes the bottom playable row, moving the stack down.
    pub fn remove_bottom_line(&mut self) {
        self.playfield.grid_mut().remove_bottom_row();
    }

    fn ensure_playing(&self) -> Result<(), MoveError> {
        if self.state.is_playing() {
            Ok(())
        } else {
            Err(MoveError::NotPlaying)
        }
    }

    fn push_event(&mut self, event: BoardEvent) {
        self.events.push(event);
    }

    fn auto_drop_and_complete(&mut self) {
        if self.playfield.try_move_down().is_ok() {
            return;
        }
        self.complete_piece_drop();
    }

    fn complete_piece_drop(&mut self) {
        self.playfield.undo_commit();
        let piece = self.playfield.falling_piece();
        self.playfield.grid_mut().fill_piece(piece);
        self.push_event(BoardEvent::ActiveShapeChanged {
            player: self.player,
            starting: false,
        });
        // A shape locked in the hidden spawn rows means the stack reached the top.
        if self.playfield.grid().has_cells_above_playable() {
            self.stats.complete_piece_drop(0);
            self.top_out();
            return;
        }

        let cleared_lines = self.playfield.grid_mut().clear_lines();
        self.stats.complete_piece_drop(cleared_lines);
        if cleared_lines > 0 {
            self.push_event(BoardEvent::RowsFilled {
                player: self.player,
                count: cleared_lines,
            });
        }

        let next = Piece::new(self.piece_buffer.pop_next());
        self.playfield.set_falling_piece_unchecked(next);
        if self.playfield.is_falling_piece_colliding() {
            self.top_out();
            return;
        }
        self.time_until_gravity = self.gravity_interval;
        self.push_event(BoardEvent::ActiveShapeChanged {
            player: self.player,
            starting: true,
        });
    }

    fn top_out(&mut self) {
        self.state = BoardState::Filled;
        self.stats.top_out();
        self.push_event(BoardEvent::BoardFilled {
            player: self.player,
        });
    }
}

#[expect(clippy::cast_possible_truncation)]
fn junk_rng_state(seed: PieceSeed) -> u64 {
    let seed = u128::from_be_bytes(seed.to_bytes());
    (seed as u64) ^ ((seed >> 64) as u64)
}
