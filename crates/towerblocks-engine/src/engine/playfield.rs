use crate::{
    PieceCollisionError,
    core::{
        bit_board::BitBoard,
        piece::{Piece, PieceKind},
    },
};

/// A grid plus the shape falling on it.
///
/// `Playfield` carries everything needed to try moves and measure the result,
/// and nothing else: no gravity, no generator, no events. Cloning it gives a
/// fully independent scratch copy, which is what the search mutates.
///
/// [`Self::commit_shape_to_cells`] and [`Self::undo_commit`] are exact inverses:
/// committing snapshots the grid by value before writing the shape into it, and
/// undoing restores that snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playfield {
    grid: BitBoard,
    falling_piece: Piece,
    committed: Option<BitBoard>,
}

impl Playfield {
    #[must_use]
    pub fn new(kind: PieceKind) -> Self {
        Self::from_parts(BitBoard::INITIAL, Piece::new(kind))
    }

    #[must_use]
    pub fn from_parts(grid: BitBoard, falling_piece: Piece) -> Self {
        Self {
            grid,
            falling_piece,
            committed: None,
        }
    }

    #[must_use]
    pub fn grid(&self) -> &BitBoard {
        &self.grid
    }

    pub(crate) fn grid_mut(&mut self) -> &mut BitBoard {
        &mut self.grid
    }

    #[must_use]
    pub fn falling_piece(&self) -> Piece {
        self.falling_piece
    }

    pub fn set_falling_piece(&mut self, piece: Piece) -> Result<(), PieceCollisionError> {
        if self.grid.is_colliding(piece) {
            return Err(PieceCollisionError);
        }
        self.falling_piece = piece;
        Ok(())
    }

    pub(crate) fn set_falling_piece_unchecked(&mut self, piece: Piece) {
        self.falling_piece = piece;
    }

    #[must_use]
    pub fn is_falling_piece_colliding(&self) -> bool {
        self.grid.is_colliding(self.falling_piece)
    }

    pub fn try_move_left(&mut self) -> Result<(), PieceCollisionError> {
        let piece = self.falling_piece.left().ok_or(PieceCollisionError)?;
        self.set_falling_piece(piece)
    }

    pub fn try_move_right(&mut self) -> Result<(), PieceCollisionError> {
        let piece = self.falling_piece.right().ok_or(PieceCollisionError)?;
        self.set_falling_piece(piece)
    }

    pub fn try_move_down(&mut self) -> Result<(), PieceCollisionError> {
        let piece = self.falling_piece.down().ok_or(PieceCollisionError)?;
        self.set_falling_piece(piece)
    }

    /// Rotates clockwise in place. There is no wall kick: a blocked rotation fails.
    pub fn try_rotate_right(&mut self) -> Result<(), PieceCollisionError> {
        self.set_falling_piece(self.falling_piece.rotated_right())
    }

    /// Moves down until blocked and returns how many rows the shape fell.
    pub fn move_down_all_the_way(&mut self) -> usize {
        let mut rows = 0;
        while self.try_move_down().is_ok() {
            rows += 1;
        }
        rows
    }

    /// Puts the shape back on the spawn row, keeping column and rotation.
    pub fn move_to_top(&mut self) {
        self.falling_piece = self.falling_piece.at_spawn_row();
    }

    /// Leftmost playable column occupied by the falling shape.
    #[must_use]
    pub fn current_column(&self) -> usize {
        self.falling_piece.leftmost_column()
    }

    /// Writes the falling shape into the grid, remembering the previous grid.
    ///
    /// Full rows are left in place so they can be counted.
    pub fn commit_shape_to_cells(&mut self) {
        self.committed = Some(self.grid.clone());
        self.grid.fill_piece(self.falling_piece);
    }

    /// Restores the grid saved by the last [`Self::commit_shape_to_cells`].
    ///
    /// Does nothing when no commit is pending.
    pub fn undo_commit(&mut self) {
        if let Some(grid) = self.committed.take() {
            self.grid = grid;
        }
    }

    #[must_use]
    pub fn has_pending_commit(&self) -> bool {
        self.committed.is_some()
    }
}
