use towerblocks_engine::{BitBoard, Board, Playfield};

use crate::BoardAnalysis;

/// Board capabilities the search and the move executor rely on.
///
/// Moves report whether they were legal; an illegal move leaves the board
/// untouched. [`Self::commit_shape_to_cells`] followed by [`Self::undo_commit`]
/// must restore the exact prior grid.
pub trait ZombieBoard {
    fn move_left(&mut self) -> bool;
    fn move_right(&mut self) -> bool;
    fn move_down(&mut self) -> bool;
    /// Repeats [`Self::move_down`] until blocked.
    fn move_down_all_the_way(&mut self);
    /// Puts the shape back on the spawn row, keeping column and rotation.
    fn move_to_top(&mut self);
    /// Turns the shape clockwise. No wall kick.
    fn rotate_clockwise(&mut self) -> bool;
    fn commit_shape_to_cells(&mut self);
    fn undo_commit(&mut self);
    /// Leftmost playable column occupied by the shape.
    fn current_column(&self) -> usize;
    fn grid(&self) -> &BitBoard;

    fn analyze(&self) -> BoardAnalysis {
        BoardAnalysis::from_board(self.grid())
    }

    fn aggregate_height(&self) -> u32 {
        self.analyze().aggregate_height()
    }

    fn completed_lines(&self) -> u32 {
        self.analyze().completed_lines()
    }

    fn holes(&self) -> u32 {
        self.analyze().num_holes()
    }

    fn bumpiness(&self) -> u32 {
        self.analyze().surface_bumpiness()
    }
}

/// A board the agent plays on, able to hand out a scratch copy of itself.
pub trait RealBoard: ZombieBoard {
    type Zombie: ZombieBoard;

    /// Returns an independent copy of grid and falling shape.
    ///
    /// Mutating the zombie never affects `self`.
    fn clone_zombie(&self) -> Self::Zombie;
}

impl ZombieBoard for Playfield {
    fn move_left(&mut self) -> bool {
        self.try_move_left().is_ok()
    }

    fn move_right(&mut self) -> bool {
        self.try_move_right().is_ok()
    }

    fn move_down(&mut self) -> bool {
        self.try_move_down().is_ok()
    }

    fn move_down_all_the_way(&mut self) {
        Playfield::move_down_all_the_way(self);
    }

    fn move_to_top(&mut self) {
        Playfield::move_to_top(self);
    }

    fn rotate_clockwise(&mut self) -> bool {
        self.try_rotate_right().is_ok()
    }

    fn commit_shape_to_cells(&mut self) {
        Playfield::commit_shape_to_cells(self);
    }

    fn undo_commit(&mut self) {
        Playfield::undo_commit(self);
    }

    fn current_column(&self) -> usize {
        Playfield::current_column(self)
    }

    fn grid(&self) -> &BitBoard {
        Playfield::grid(self)
    }
}

impl RealBoard for Playfield {
    type Zombie = Playfield;

    fn clone_zombie(&self) -> Self::Zombie {
        self.clone()
    }
}

impl ZombieBoard for Board {
    fn move_left(&mut self) -> bool {
        self.try_move_left().is_ok()
    }

    fn move_right(&mut self) -> bool {
        self.try_move_right().is_ok()
    }

    fn move_down(&mut self) -> bool {
        self.try_move_down().is_ok()
    }

    fn move_down_all_the_way(&mut self) {
        Board::move_down_all_the_way(self);
    }

    fn move_to_top(&mut self) {
        Board::move_to_top(self);
    }

    fn rotate_clockwise(&mut self) -> bool {
        self.try_rotate_right().is_ok()
    }

    fn commit_shape_to_cells(&mut self) {
        Board::commit_shape_to_cells(self);
    }

    fn undo_commit(&mut self) {
        Board::undo_commit(self);
    }

    fn current_column(&self) -> usize {
        Board::current_column(self)
    }

    fn grid(&self) -> &BitBoard {
        Board::grid(self)
    }
}

impl RealBoard for Board {
    type Zombie = Playfield;

    fn clone_zombie(&self) -> Self::Zombie {
        self.playfield().clone()
    }
}

#[cfg(test)]
mod tests {
    use towerblocks_engine::{Piece, PieceKind, PieceSeed, PlayerType};

    use super::*;

    fn sample_board() -> Board {
        let mut board = Board::with_seed(PlayerType::Ai, PieceSeed::from(5));
        board.load_playfield(Playfield::from_parts(
            BitBoard::from_ascii(
                "
                ...#......
                #.###..##.
                ##.#######
                ",
            ),
            Piece::new(PieceKind::J),
        ));
        board
    }

    fn exercise<Z: ZombieBoard>(zombie: &mut Z) {
        zombie.move_left();
        zombie.rotate_clockwise();
        zombie.move_right();
        zombie.move_right();
        zombie.move_down();
        zombie.move_down_all_the_way();
        zombie.commit_shape_to_cells();
    }

    #[test]
    fn test_zombie_mutations_do_not_leak() {
        let board = sample_board();
        let grid = board.grid().clone();
        let piece = board.falling_piece();

        let mut zombie = board.clone_zombie();
        exercise(&mut zombie);

        assert_eq!(board.grid(), &grid);
        assert_eq!(board.falling_piece(), piece);
        assert_ne!(zombie.grid(), &grid);
    }

    #[test]
    fn test_zombie_of_zombie_is_independent() {
        let field = sample_board().clone_zombie();
        let before = field.clone();
        let mut zombie = field.clone_zombie();
        exercise(&mut zombie);
        assert_eq!(field, before);
    }

    #[test]
    fn test_commit_undo_round_trip_through_contract() {
        let mut board = sample_board();
        board.rotate_clockwise();
        board.move_down_all_the_way();
        let grid = board.grid().clone();

        ZombieBoard::commit_shape_to_cells(&mut board);
        assert_ne!(board.grid(), &grid);
        ZombieBoard::undo_commit(&mut board);
        assert_eq!(board.grid(), &grid);
    }

    #[test]
    fn test_illegal_moves_report_false() {
        let mut field = Playfield::new(PieceKind::O);
        while field.move_left() {}
        let piece = field.falling_piece();
        assert!(!field.move_left());
        assert_eq!(field.falling_piece(), piece);

        field.move_down_all_the_way();
        assert!(!field.move_down());
    }

    #[test]
    fn test_metrics_on_contract() {
        let board = sample_board();
        // Column heights: 2 1 2 3 2 1 1 2 2 1
        assert_eq!(board.aggregate_height(), 17);
        assert_eq!(board.holes(), 1);
        assert_eq!(board.completed_lines(), 0);
        assert_eq!(board.bumpiness(), 7);
    }
}
