use serde::Serialize;

/// Per-board counters.
///
/// # Example
///
/// ```
/// use towerblocks_engine::BoardStats;
///
/// let mut stats = BoardStats::new();
/// stats.complete_piece_drop(4);
///
/// assert_eq!(stats.completed_pieces(), 1);
/// assert_eq!(stats.total_cleared_lines(), 4);
/// assert_eq!(stats.line_cleared_counter()[4], 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BoardStats {
    completed_pieces: usize,
    total_cleared_lines: usize,
    line_cleared_counter: [usize; 5],
    junk_rows_received: usize,
    top_outs: usize,
}

impl BoardStats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            completed_pieces: 0,
            total_cleared_lines: 0,
            line_cleared_counter: [0; 5],
            junk_rows_received: 0,
            top_outs: 0,
        }
    }

    #[must_use]
    pub const fn completed_pieces(&self) -> usize {
        self.completed_pieces
    }

    #[must_use]
    pub const fn total_cleared_lines(&self) -> usize {
        self.total_cleared_lines
    }

    /// Histogram of locks by number of rows cleared (index 0-4).
    #[must_use]
    pub const fn line_cleared_counter(&self) -> &[usize; 5] {
        &self.line_cleared_counter
    }

    #[must_use]
    pub const fn junk_rows_received(&self) -> usize {
        self.junk_rows_received
    }

    #[must_use]
    pub const fn top_outs(&self) -> usize {
        self.top_outs
    }

    pub const fn complete_piece_drop(&mut self, cleared_lines: usize) {
        self.completed_pieces += 1;
        self.total_cleared_lines += cleared_lines;
        if cleared_lines < self.line_cleared_counter.len() {
            self.line_cleared_counter[cleared_lines] += 1;
        }
    }

    pub const fn receive_junk_rows(&mut self, count: usize) {
        self.junk_rows_received += count;
    }

    pub const fn top_out(&mut self) {
        self.top_outs += 1;
    }
}
