use crate::PlayerType;

/// Notifications a [`Board`](super::Board) queues for its owner.
///
/// The owner collects them with [`Board::drain_events`](super::Board::drain_events)
/// after stepping the board and routes them to whoever cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum BoardEvent {
    /// The falling shape changed. `starting` is `true` when a new shape has
    /// just become active and `false` when the previous one locked.
    ActiveShapeChanged { player: PlayerType, starting: bool },
    /// `count` full rows were cleared.
    RowsFilled { player: PlayerType, count: usize },
    /// The stack reached the top; the board stopped playing.
    BoardFilled { player: PlayerType },
}

impl BoardEvent {
    #[must_use]
    pub fn player(&self) -> PlayerType {
        match *self {
            BoardEvent::ActiveShapeChanged { player, .. }
            | BoardEvent::RowsFilled { player, .. }
            | BoardEvent::BoardFilled { player } => player,
        }
    }

    /// Returns `true` for the notification that a new shape became active on `player`'s board.
    #[must_use]
    pub fn is_new_shape_for(&self, player: PlayerType) -> bool {
        matches!(
            *self,
            BoardEvent::ActiveShapeChanged { player: p, starting: true } if p == player
        )
    }
}
