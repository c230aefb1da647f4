//! Falling-block board engine for the versus game.
//!
//! - [`core`] holds the value types: [`BitBoard`] grids and [`Piece`] shapes.
//! - [`engine`] holds the live [`Board`] (gravity, locking, junk rows, events),
//!   the [`Playfield`] it wraps, and the 7-bag [`PieceBuffer`].

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("piece colliding when moving falling piece")]
pub struct PieceCollisionError;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum MoveError {
    #[display("piece colliding when moving falling piece")]
    PieceCollision(PieceCollisionError),
    #[display("board is not playing")]
    NotPlaying,
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("junk rows pushed occupied cells above the top of the board")]
pub struct JunkOverflowError;

/// Which side of the versus game a board belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum PlayerType {
    #[display("human")]
    Human,
    #[display("ai")]
    Ai,
}

impl PlayerType {
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            PlayerType::Human => PlayerType::Ai,
            PlayerType::Ai => PlayerType::Human,
        }
    }
}
