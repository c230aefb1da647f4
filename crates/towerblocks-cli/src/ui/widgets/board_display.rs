use std::iter;

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    widgets::{Block as BlockWidget, BlockExt, Widget},
};
use towerblocks_engine::{BitBoard, MAX_COLS, MAX_ROWS, Piece};

use crate::ui::widgets::{BlockDisplay, CellKind};

#[derive(Debug)]
pub struct BoardDisplay<'a> {
    grid: &'a BitBoard,
    ghost: Option<Piece>,
    falling_piece: Option<Piece>,
    block: Option<BlockWidget<'a>>,
}

impl<'a> BoardDisplay<'a> {
    pub fn new(grid: &'a BitBoard) -> Self {
        Self {
            grid,
            ghost: None,
            falling_piece: None,
            block: None,
        }
    }

    pub fn ghost(self, piece: Piece) -> Self {
        Self {
            ghost: Some(piece),
            ..self
        }
    }

    pub fn falling_piece(self, piece: Piece) -> Self {
        Self {
            falling_piece: Some(piece),
            ..self
        }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn width(&self) -> u16 {
        10 * BlockDisplay::width() + super::block_horizontal_margin(self.block.as_ref())
    }

    pub fn height(&self) -> u16 {
        20 * BlockDisplay::height() + super::block_vertical_margin(self.block.as_ref())
    }

    /// Playable cells, top row first, with the ghost and falling piece laid over the grid.
    pub fn cells(&self) -> [[CellKind; MAX_COLS]; MAX_ROWS] {
        let mut cells = [[CellKind::Empty; MAX_COLS]; MAX_ROWS];
        for (cells_row, row) in iter::zip(&mut cells, self.grid.playable_rows()) {
            for (cell, occupied) in iter::zip(cells_row, row.iter_playable_cells()) {
                if occupied {
                    *cell = CellKind::Locked;
                }
            }
        }

        let overlays = [
            self.ghost.map(|piece| (piece, CellKind::Ghost)),
            self.falling_piece
                .map(|piece| (piece, CellKind::Falling(piece.kind()))),
        ];
        for (piece, kind) in overlays.into_iter().flatten() {
            for (x, y) in piece.occupied_positions() {
                let col = x.checked_sub(BitBoard::PLAYABLE_X_RANGE.start);
                let row = y.checked_sub(BitBoard::PLAYABLE_Y_RANGE.start);
                if let (Some(col), Some(row)) = (col, row)
                    && col < MAX_COLS
                    && row < MAX_ROWS
                {
                    cells[row][col] = kind;
                }
            }
        }
        cells
    }
}

impl Widget for BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let col_constraints = (0..MAX_COLS).map(|_| Constraint::Length(BlockDisplay::width()));
        let row_constraints = (0..MAX_ROWS).map(|_| Constraint::Length(BlockDisplay::height()));
        let horizontal = Layout::horizontal(col_constraints).flex(Flex::Center);
        let vertical = Layout::vertical(row_constraints);

        let grid_cells = area
            .layout::<MAX_ROWS>(&vertical)
            .into_iter()
            .map(|row| row.layout::<MAX_COLS>(&horizontal));

        for (grid_row, row) in iter::zip(grid_cells, self.cells()) {
            for (grid_cell, cell) in iter::zip(grid_row, row) {
                BlockDisplay::from_cell(cell).render(grid_cell, buf);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use towerblocks_engine::PieceKind;

    use super::*;

    #[test]
    fn test_cells_overlay_pieces_on_grid() {
        let grid = BitBoard::from_ascii("##########\n#########.");
        let falling = Piece::new(PieceKind::O).down().unwrap().down().unwrap();
        let ghost = falling.simulate_drop_position(&grid);
        let cells = BoardDisplay::new(&grid)
            .ghost(ghost)
            .falling_piece(falling)
            .cells();

        assert!(cells[19][..9].iter().all(|c| *c == CellKind::Locked));
        assert_eq!(cells[19][9], CellKind::Empty);
        assert!(cells[18].iter().all(|c| *c == CellKind::Locked));

        // O sits in columns 3-4 of the two top playable rows.
        assert_eq!(cells[0][3], CellKind::Falling(PieceKind::O));
        assert_eq!(cells[1][4], CellKind::Falling(PieceKind::O));
        assert_eq!(cells[0][2], CellKind::Empty);
        assert_eq!(cells[0][5], CellKind::Empty);
        assert_eq!(cells[16][3], CellKind::Ghost);
        assert_eq!(cells[17][4], CellKind::Ghost);
    }

    #[test]
    fn test_spawned_piece_above_field_is_hidden() {
        let grid = BitBoard::INITIAL;
        let cells = BoardDisplay::new(&grid)
            .falling_piece(Piece::new(PieceKind::T))
            .cells();
        assert!(cells.iter().flatten().all(|c| *c == CellKind::Empty));
    }

    #[test]
    fn test_size_includes_border() {
        let grid = BitBoard::INITIAL;
        let plain = BoardDisplay::new(&grid);
        assert_eq!((plain.width(), plain.height()), (20, 20));
        let framed = BoardDisplay::new(&grid).block(BlockWidget::bordered());
        assert_eq!((framed.width(), framed.height()), (22, 22));
    }
}
