use std::{fmt::Write, ops::Range};

use serde::Serialize;

use crate::{JunkOverflowError, core::piece::Piece};

use super::{
    PLAYABLE_HEIGHT, PLAYABLE_WIDTH, SENTINEL_MARGIN_LEFT, SENTINEL_MARGIN_TOP, TOTAL_HEIGHT,
    TOTAL_WIDTH,
};

pub(crate) const PIECE_SPAWN_X: usize = 5;
pub(crate) const PIECE_SPAWN_Y: usize = 0;

// Left sentinel: bits 0-1 (x=0,1)
const LEFT_SENTINEL_MASK: u16 = 0b11;
// Right sentinel: bits 12-13 (x=12,13)
const RIGHT_SENTINEL_MASK: u16 = 0b11 << (SENTINEL_MARGIN_LEFT + PLAYABLE_WIDTH);
const SENTINEL_MASK: u16 = LEFT_SENTINEL_MASK | RIGHT_SENTINEL_MASK;
const FULL_ROW_MASK: u16 = (1 << TOTAL_WIDTH) - 1;
const PLAYABLE_MASK: u16 = FULL_ROW_MASK & !SENTINEL_MASK;

/// Single row in the bit board representation.
///
/// Stores one row of the board as a 16-bit bitmask where each bit represents a cell.
///
/// # Bit Layout (LSB to MSB)
///
/// - Bits 0-1: Left sentinel (walls)
/// - Bits 2-11: Playable area (10 cells)
/// - Bits 12-13: Right sentinel (walls)
/// - Bits 14-15: Unused (padding)
///
/// Sentinel bits are always set to 1 to simplify collision detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitRow {
    bits: u16,
}

impl BitRow {
    pub const EMPTY: Self = Self {
        bits: SENTINEL_MASK,
    };
    pub const FULL_SENTINEL: Self = Self {
        bits: FULL_ROW_MASK,
    };

    /// A junk row: every playable cell occupied except the one at playable column `gap`.
    #[must_use]
    pub const fn junk(gap: usize) -> Self {
        assert!(gap < PLAYABLE_WIDTH);
        Self {
            bits: FULL_ROW_MASK & !(1 << (gap + SENTINEL_MARGIN_LEFT)),
        }
    }

    /// Checks if the playable area is completely filled.
    #[inline]
    #[must_use]
    pub fn is_playable_filled(self) -> bool {
        (self.bits & PLAYABLE_MASK) == PLAYABLE_MASK
    }

    /// Checks if the playable area has no occupied cell.
    #[inline]
    #[must_use]
    pub fn is_playable_empty(self) -> bool {
        (self.bits & PLAYABLE_MASK) == 0
    }

    /// Checks if a cell at the given x-coordinate (board coordinates, sentinels included) is occupied.
    #[inline]
    #[must_use]
    pub fn is_cell_occupied(self, x: usize) -> bool {
        let bit = 1 << x;
        (self.bits & bit) != 0
    }

    #[inline]
    #[must_use]
    fn is_any_cell_occupied(self, x0: usize, mask: u16) -> bool {
        let bits = mask << x0;
        (self.bits & bits) != 0
    }

    #[inline]
    fn occupy_cells(&mut self, x0: usize, mask: u16) {
        let bits = mask << x0;
        self.bits |= bits;
    }

    /// Iterates over all playable cells in the row, returning their occupied status.
    #[inline]
    pub fn iter_playable_cells(self) -> impl Iterator<Item = bool> {
        BitBoard::PLAYABLE_X_RANGE.map(move |x| {
            let bit = 1 << x;
            (self.bits & bit) != 0
        })
    }
}

/// Cell grid of a board, with 2-cell sentinel borders on every side.
///
/// Each row is a `u16` where bit N is the cell at x=N:
/// - Bits 0-1: left sentinel (walls, x=0,1)
/// - Bits 2-11: playable area (10 cells, x=2-11)
/// - Bits 12-13: right sentinel (walls, x=12,13)
///
/// The top two rows only carry side walls so pieces can spawn above the
/// playable area; the bottom two rows are solid so pieces stop on them.
/// Two cells are needed because every piece is positioned through a 4×4 box
/// and the vertical I-piece sits in the second column of its box.
///
/// ```text
///             0  1  2  3  4  5  6  7  8  9 10 11 12 13
/// Board:      W  W  .  .  .  .  .  .  .  .  .  .  W  W
/// I-piece:    W [W  I  .  .] .  .  .  .  .  .  .  W  W   ← leftmost
/// I-piece:    W  W  .  .  .  .  .  .  .  . [.  I  W  W]  ← rightmost
/// ```
///
/// `BitBoard` is a plain value: cloning it yields a fully independent grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitBoard {
    rows: [BitRow; TOTAL_HEIGHT],
}

impl Serialize for BitBoard {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Format: "3003,3003,3003,..." (comma-separated hex values)
        let mut hex_string = String::with_capacity(TOTAL_HEIGHT * 5);
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                hex_string.push(',');
            }
            write!(&mut hex_string, "{:04x}", row.bits).map_err(serde::ser::Error::custom)?;
        }
        serializer.serialize_str(&hex_string)
    }
}

impl Default for BitBoard {
    fn default() -> Self {
        Self::INITIAL
    }
}

impl BitBoard {
    pub const TOTAL_WIDTH: usize = TOTAL_WIDTH;
    pub const TOTAL_HEIGHT: usize = TOTAL_HEIGHT;
    pub const PLAYABLE_WIDTH: usize = PLAYABLE_WIDTH;
    pub const PLAYABLE_HEIGHT: usize = PLAYABLE_HEIGHT;
    pub const PLAYABLE_X_RANGE: Range<usize> =
        SENTINEL_MARGIN_LEFT..(SENTINEL_MARGIN_LEFT + PLAYABLE_WIDTH);
    pub const PLAYABLE_Y_RANGE: Range<usize> =
        SENTINEL_MARGIN_TOP..(SENTINEL_MARGIN_TOP + PLAYABLE_HEIGHT);

    pub const INITIAL: Self = {
        let mut rows = [BitRow::EMPTY; TOTAL_HEIGHT];
        let mut y = SENTINEL_MARGIN_TOP + PLAYABLE_HEIGHT;
        while y < TOTAL_HEIGHT {
            rows[y] = BitRow::FULL_SENTINEL;
            y += 1;
        }
        Self { rows }
    };

    /// Returns a playable row by index (0 is the top playable row).
    #[must_use]
    pub fn playable_row(&self, y: usize) -> BitRow {
        self.rows[y + SENTINEL_MARGIN_TOP]
    }

    /// Returns an iterator over the playable rows, top to bottom.
    pub fn playable_rows(&self) -> impl Iterator<Item = BitRow> + '_ {
        self.rows[SENTINEL_MARGIN_TOP..][..PLAYABLE_HEIGHT]
            .iter()
            .copied()
    }

    /// Returns the rows a stack can reach, top to bottom: the hidden spawn
    /// rows followed by the playable rows.
    pub fn stack_rows(&self) -> impl Iterator<Item = BitRow> + '_ {
        self.rows[..SENTINEL_MARGIN_TOP + PLAYABLE_HEIGHT]
            .iter()
            .copied()
    }

    /// Returns `true` if a cell is occupied in the hidden rows above the playable area.
    #[must_use]
    pub fn has_cells_above_playable(&self) -> bool {
        !self.rows[..SENTINEL_MARGIN_TOP]
            .iter()
            .all(|row| row.is_playable_empty())
    }

    /// Checks if the piece collides with occupied cells or walls.
    #[must_use]
    pub fn is_colliding(&self, piece: Piece) -> bool {
        let x0 = piece.position().x();
        let y0 = piece.position().y();
        for (mask, row) in piece.mask().into_iter().zip(&self.rows[y0..]) {
            if row.is_any_cell_occupied(x0, mask) {
                return true;
            }
        }
        false
    }

    /// Writes the piece's cells into the grid.
    pub fn fill_piece(&mut self, piece: Piece) {
        let x0 = piece.position().x();
        let y0 = piece.position().y();
        for (mask, row) in piece.mask().into_iter().zip(&mut self.rows[y0..]) {
            row.occupy_cells(x0, mask);
        }
    }

    /// Counts playable rows with no empty cell, without clearing them.
    #[must_use]
    pub fn count_filled_lines(&self) -> usize {
        self.playable_rows()
            .filter(|row| row.is_playable_filled())
            .count()
    }

    /// Clears filled lines and returns the number of lines cleared.
    ///
    /// Rows above a cleared line move down; empty rows enter from the top.
    pub fn clear_lines(&mut self) -> usize {
        let playable_rows = &mut self.rows[SENTINEL_MARGIN_TOP..][..PLAYABLE_HEIGHT];
        let mut count = 0;

        for y in (0..PLAYABLE_HEIGHT).rev() {
            if playable_rows[y].is_playable_filled() {
                count += 1;
                continue;
            }
            if count > 0 {
                playable_rows[y + count] = playable_rows[y];
            }
        }

        playable_rows[..count].fill(BitRow::EMPTY);
        count
    }

    /// Pushes the stack up and inserts `rows` at the bottom of the playable area.
    ///
    /// The rows are inserted in order, so the last one ends up at the very bottom.
    /// Fails without touching the grid if an occupied row would be pushed out of
    /// the top of the playable area.
    pub fn push_rows_from_bottom(&mut self, rows: &[BitRow]) -> Result<(), JunkOverflowError> {
        let count = rows.len();
        if count == 0 {
            return Ok(());
        }
        let playable_rows = &mut self.rows[SENTINEL_MARGIN_TOP..][..PLAYABLE_HEIGHT];
        if count > PLAYABLE_HEIGHT
            || playable_rows[..count]
                .iter()
                .any(|row| !row.is_playable_empty())
        {
            return Err(JunkOverflowError);
        }
        playable_rows.rotate_left(count);
        playable_rows[PLAYABLE_HEIGHT - count..].copy_from_slice(rows);
        Ok(())
    }

    /// Removes the bottom playable row; the stack moves down by one.
    pub fn remove_bottom_row(&mut self) {
        let playable_rows = &mut self.rows[SENTINEL_MARGIN_TOP..][..PLAYABLE_HEIGHT];
        playable_rows.rotate_right(1);
        playable_rows[0] = BitRow::EMPTY;
    }

    /// Returns `true` if no playable cell is occupied.
    #[must_use]
    pub fn is_playable_empty(&self) -> bool {
        self.playable_rows().all(BitRow::is_playable_empty)
    }

    /// Creates a `BitBoard` from ASCII art.
    ///
    /// `#` is an occupied cell and `.` an empty one; every row must be 10 cells wide.
    /// Rows are listed top to bottom and aligned to the bottom of the board, so
    /// fewer than 20 rows describe the lower part of the stack.
    ///
    /// # Panics
    ///
    /// Panics if a row is not 10 cells wide or more than 20 rows are given.
    #[must_use]
    pub fn from_ascii(art: &str) -> Self {
        Self::try_from_ascii(art).unwrap_or_else(|msg| panic!("{msg}"))
    }

    /// Fallible variant of [`Self::from_ascii`].
    pub fn try_from_ascii(art: &str) -> Result<Self, String> {
        let mut board = Self::INITIAL;
        let lines: Vec<&str> = art.lines().filter(|line| !line.trim().is_empty()).collect();
        if lines.len() > PLAYABLE_HEIGHT {
            return Err(format!(
                "expected at most {PLAYABLE_HEIGHT} rows, got {}",
                lines.len()
            ));
        }
        let offset = PLAYABLE_HEIGHT - lines.len();

        for (y, line) in lines.iter().enumerate() {
            let chars: Vec<char> = line.chars().filter(|c| *c == '#' || *c == '.').collect();
            if chars.len() != PLAYABLE_WIDTH {
                return Err(format!(
                    "each row must have exactly {PLAYABLE_WIDTH} cells, got {} at row {y}",
                    chars.len()
                ));
            }

            for (x, &ch) in chars.iter().enumerate() {
                if ch == '#' {
                    let row_index = y + offset + SENTINEL_MARGIN_TOP;
                    let col_index = x + SENTINEL_MARGIN_LEFT;
                    board.rows[row_index].occupy_cells(col_index, 0b1);
                }
            }
        }
        Ok(board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn occupy_cell(board: &mut BitBoard, x: usize, y: usize) {
        board.rows[y].occupy_cells(x, 0b1);
    }

    fn fill_row(board: &mut BitBoard, y: usize) {
        for x in BitBoard::PLAYABLE_X_RANGE {
            occupy_cell(board, x, y);
        }
    }

    #[test]
    fn test_initial_board() {
        let board = BitBoard::INITIAL;

        for y in 0..TOTAL_HEIGHT {
            for x in 0..TOTAL_WIDTH {
                let cell = board.rows[y].is_cell_occupied(x);
                if y >= SENTINEL_MARGIN_TOP + PLAYABLE_HEIGHT {
                    assert!(cell, "bottom sentinels should be occupied at ({x}, {y})");
                    continue;
                }
                if !BitBoard::PLAYABLE_X_RANGE.contains(&x) {
                    assert!(cell, "side sentinels should be occupied at ({x}, {y})");
                    continue;
                }
                assert!(!cell, "playable area should be empty at ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_stack_rows_include_hidden_rows() {
        let mut board = BitBoard::from_ascii("#.........");
        assert!(!board.has_cells_above_playable());
        assert_eq!(
            board.stack_rows().count(),
            SENTINEL_MARGIN_TOP + PLAYABLE_HEIGHT
        );

        occupy_cell(&mut board, SENTINEL_MARGIN_LEFT + 4, 1);
        assert!(board.has_cells_above_playable());
        let rows: Vec<BitRow> = board.stack_rows().collect();
        assert!(rows[1].is_cell_occupied(SENTINEL_MARGIN_LEFT + 4));
        assert!(rows.last().unwrap().is_cell_occupied(SENTINEL_MARGIN_LEFT));
    }

    #[test]
    fn test_junk_row_has_single_gap() {
        for gap in 0..PLAYABLE_WIDTH {
            let row = BitRow::junk(gap);
            let empty: Vec<usize> = row
                .iter_playable_cells()
                .enumerate()
                .filter_map(|(x, occupied)| (!occupied).then_some(x))
                .collect();
            assert_eq!(empty, vec![gap]);
            assert!(!row.is_playable_filled());
        }
    }

    #[test]
    fn test_clear_lines_compacts_stack() {
        let mut board = BitBoard::from_ascii(
            "
            #.........
            ##########
            .#........
            ##########
            ",
        );
        assert_eq!(board.count_filled_lines(), 2);
        assert_eq!(board.clear_lines(), 2);
        assert_eq!(
            board,
            BitBoard::from_ascii(
                "
                #.........
                .#........
                ",
            )
        );
    }

    #[test]
    fn test_clear_lines_with_partial_lines() {
        let mut board = BitBoard::from_ascii("#########.");
        assert_eq!(board.count_filled_lines(), 0);
        assert_eq!(board.clear_lines(), 0);
        assert_eq!(board, BitBoard::from_ascii("#########."));
    }

    #[test]
    fn test_clear_lines_all_filled_preserves_sentinels() {
        let mut board = BitBoard::INITIAL;
        for y in BitBoard::PLAYABLE_Y_RANGE {
            fill_row(&mut board, y);
        }
        assert_eq!(board.clear_lines(), PLAYABLE_HEIGHT);
        assert_eq!(board, BitBoard::INITIAL);
    }

    #[test]
    fn test_push_rows_from_bottom() {
        let mut board = BitBoard::from_ascii("#.........");
        board
            .push_rows_from_bottom(&[BitRow::junk(3), BitRow::junk(7)])
            .unwrap();
        assert_eq!(
            board,
            BitBoard::from_ascii(
                "
                #.........
                ###.######
                #######.##
                ",
            )
        );
    }

    #[test]
    fn test_push_rows_overflow_leaves_grid_untouched() {
        let mut board = BitBoard::INITIAL;
        occupy_cell(&mut board, SENTINEL_MARGIN_LEFT, SENTINEL_MARGIN_TOP);
        let before = board.clone();
        assert!(board.push_rows_from_bottom(&[BitRow::junk(0)]).is_err());
        assert_eq!(board, before);
    }

    #[test]
    fn test_remove_bottom_row() {
        let mut board = BitBoard::from_ascii(
            "
            .#........
            ###.######
            ",
        );
        board.remove_bottom_row();
        assert_eq!(board, BitBoard::from_ascii(".#........"));
        board.remove_bottom_row();
        assert!(board.is_playable_empty());
    }

    #[test]
    fn test_from_ascii_rejects_bad_width() {
        assert!(BitBoard::try_from_ascii("#####").is_err());
    }

    #[test]
    fn test_bit_board_serialization() {
        let board = BitBoard::from_ascii(
            "
            .#........
            ..#.......
            ",
        );
        let serialized = serde_json::to_string(&board).unwrap();

        assert!(serialized.contains("3003")); // empty rows
        assert!(serialized.contains("3fff")); // bottom sentinel rows
        assert_eq!(serialized.len(), TOTAL_HEIGHT * 4 + (TOTAL_HEIGHT - 1) + 2);
    }
}
