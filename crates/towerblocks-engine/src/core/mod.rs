pub use self::{bit_board::*, piece::*};

pub(crate) mod bit_board;
pub(crate) mod piece;

/// Number of playable columns.
pub const MAX_COLS: usize = 10;
/// Number of playable rows.
pub const MAX_ROWS: usize = 20;

pub(crate) const PLAYABLE_WIDTH: usize = MAX_COLS;
pub(crate) const PLAYABLE_HEIGHT: usize = MAX_ROWS;
pub(crate) const SENTINEL_MARGIN_LEFT: usize = 2;
pub(crate) const SENTINEL_MARGIN_RIGHT: usize = 2;
pub(crate) const SENTINEL_MARGIN_TOP: usize = 2;
pub(crate) const SENTINEL_MARGIN_BOTTOM: usize = 2;
pub(crate) const TOTAL_WIDTH: usize = SENTINEL_MARGIN_LEFT + PLAYABLE_WIDTH + SENTINEL_MARGIN_RIGHT;
pub(crate) const TOTAL_HEIGHT: usize =
    SENTINEL_MARGIN_TOP + PLAYABLE_HEIGHT + SENTINEL_MARGIN_BOTTOM;
