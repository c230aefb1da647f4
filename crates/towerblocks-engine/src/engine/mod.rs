//! Live game state built on the [`core`](crate::core) value types.
//!
//! - [`Playfield`] - grid plus falling shape; the part the search clones
//! - [`Board`] - one player's board: gravity, locking, junk rows and events
//! - [`BoardEvent`] - notifications queued by a [`Board`]
//! - [`BoardStats`] - per-board counters
//! - [`PieceBuffer`] - 7-bag piece generation
//! - [`PieceSeed`] - seed for deterministic piece generation
//!
//! # Board Flow
//!
//! 1. [`Board::reset_and_play`] clears the grid and spawns a shape
//! 2. The owner calls [`Board::step`] every tick; gravity moves the shape down
//! 3. A shape that cannot move down locks, full rows clear and the next shape spawns
//! 4. A spawn that collides tops the board out
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use towerblocks_engine::{Board, BoardEvent, PieceSeed, PlayerType};
//!
//! let mut board = Board::with_seed(PlayerType::Human, PieceSeed::from(42));
//! board.reset_and_play();
//! board.hard_drop().unwrap();
//! board.step(Duration::from_millis(16));
//!
//! let events = board.drain_events();
//! assert!(events.iter().any(|e| e.is_new_shape_for(PlayerType::Human)));
//! assert_eq!(board.stats().completed_pieces(), 1);
//! ```

pub use self::{board::*, board_event::*, board_stats::*, piece_buffer::*, playfield::*};

mod board;
mod board_event;
mod board_stats;
mod piece_buffer;
mod playfield;
