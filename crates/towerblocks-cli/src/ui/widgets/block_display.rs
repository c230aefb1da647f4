use ratatui::{
    prelude::{Buffer, Rect},
    style::Style,
    widgets::{Paragraph, Widget},
};
use towerblocks_engine::PieceKind;

use crate::ui::widgets::style;

/// What a single board cell shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Empty,
    /// Settled cell. Locked cells keep no shape identity.
    Locked,
    Ghost,
    Falling(PieceKind),
}

#[derive(Debug)]
pub struct BlockDisplay {
    style: Style,
    symbol: &'static str,
}

impl BlockDisplay {
    pub const fn new(style: Style, symbol: &'static str) -> Self {
        Self { style, symbol }
    }

    pub fn width() -> u16 {
        2
    }

    pub fn height() -> u16 {
        1
    }

    pub fn from_cell(cell: CellKind) -> Self {
        match cell {
            CellKind::Empty => Self::new(style::EMPTY_DOT, "."),
            CellKind::Locked => Self::new(style::LOCKED, ""),
            CellKind::Ghost => Self::new(style::GHOST, "[]"),
            CellKind::Falling(kind) => Self::new(piece_style(kind), ""),
        }
    }
}

pub fn piece_style(kind: PieceKind) -> Style {
    match kind {
        PieceKind::I => style::I_BLOCK,
        PieceKind::O => style::O_BLOCK,
        PieceKind::S => style::S_BLOCK,
        PieceKind::Z => style::Z_BLOCK,
        PieceKind::J => style::J_BLOCK,
        PieceKind::L => style::L_BLOCK,
        PieceKind::T => style::T_BLOCK,
    }
}

impl Widget for BlockDisplay {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &BlockDisplay {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        // Paragraph fills the whole area, not only the cells under the symbol
        Paragraph::new(self.symbol)
            .style(self.style)
            .centered()
            .render(area, buf);
    }
}
