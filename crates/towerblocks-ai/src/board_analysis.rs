use std::{cell::OnceCell, iter};

use towerblocks_engine::BitBoard;

/// Lazily computed metrics of a grid.
///
/// Heights count from the floor: a column whose topmost filled cell sits on
/// playable row `y` (0 at the top) has height `PLAYABLE_HEIGHT - y`. Cells in
/// the hidden spawn rows count too, so a shape parked above a full column is
/// taller than the field. Full rows are measured as they are, not cleared first.
#[derive(Debug)]
pub struct BoardAnalysis {
    board: BitBoard,
    column_heights: OnceCell<[u8; BitBoard::PLAYABLE_WIDTH]>,
    column_occupied_cells: OnceCell<[u8; BitBoard::PLAYABLE_WIDTH]>,
    aggregate_height: OnceCell<u32>,
    completed_lines: OnceCell<u32>,
    num_holes: OnceCell<u32>,
    surface_bumpiness: OnceCell<u32>,
}

impl BoardAnalysis {
    #[must_use]
    pub fn from_board(board: &BitBoard) -> Self {
        let board = board.clone();
        Self {
            board,
            column_heights: OnceCell::new(),
            column_occupied_cells: OnceCell::new(),
            aggregate_height: OnceCell::new(),
            completed_lines: OnceCell::new(),
            num_holes: OnceCell::new(),
            surface_bumpiness: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn board(&self) -> &BitBoard {
        &self.board
    }

    #[must_use]
    pub fn column_heights(&self) -> &[u8; BitBoard::PLAYABLE_WIDTH] {
        self.column_heights.get_or_init(|| {
            let mut column_heights = [0; BitBoard::PLAYABLE_WIDTH];
            for (x, h) in iter::zip(BitBoard::PLAYABLE_X_RANGE, &mut column_heights) {
                let min_y = self
                    .board
                    .stack_rows()
                    .position(|row| row.is_cell_occupied(x));
                let Some(min_y) = min_y else {
                    continue;
                };
                *h = u8::try_from(BitBoard::PLAYABLE_Y_RANGE.end - min_y).unwrap();
            }
            column_heights
        })
    }

    #[must_use]
    pub fn column_occupied_cells(&self) -> &[u8; BitBoard::PLAYABLE_WIDTH] {
        self.column_occupied_cells.get_or_init(|| {
            let mut column_occupied_cells = [0; BitBoard::PLAYABLE_WIDTH];
            for (x, o) in iter::zip(BitBoard::PLAYABLE_X_RANGE, &mut column_occupied_cells) {
                for row in self.board.stack_rows() {
                    if row.is_cell_occupied(x) {
                        *o += 1;
                    }
                }
            }
            column_occupied_cells
        })
    }

    /// Sum of column heights.
    #[must_use]
    pub fn aggregate_height(&self) -> u32 {
        *self.aggregate_height.get_or_init(|| {
            self.column_heights()
                .iter()
                .copied()
                .map(u32::from)
                .sum()
        })
    }

    /// Rows with no empty playable cell.
    #[must_use]
    pub fn completed_lines(&self) -> u32 {
        *self
            .completed_lines
            .get_or_init(|| u32::try_from(self.board.count_filled_lines()).unwrap())
    }

    /// Empty cells with at least one filled cell above them in the same column.
    #[must_use]
    pub fn num_holes(&self) -> u32 {
        *self.num_holes.get_or_init(|| {
            iter::zip(self.column_heights(), self.column_occupied_cells())
                .map(|(h, occ)| u32::from(h - occ))
                .sum()
        })
    }

    /// Sum of absolute height differences between adjacent columns.
    #[must_use]
    pub fn surface_bumpiness(&self) -> u32 {
        *self.surface_bumpiness.get_or_init(|| {
            self.column_heights()
                .windows(2)
                .map(|w| {
                    let left = i32::from(w[0]);
                    let right = i32::from(w[1]);
                    (right - left).unsigned_abs()
                })
                .sum()
        })
    }
}
