use std::{cmp::Ordering, time::Duration};

use arrayvec::ArrayVec;
use rand::Rng as _;
use rand_pcg::Pcg32;

use crate::{Decision, ZombieBoard};

/// Base time between two primitive moves.
pub const TIME_BETWEEN_MOVES: Duration = Duration::from_millis(250);
/// Width of the jitter window centred on [`TIME_BETWEEN_MOVES`], in milliseconds.
pub const TIME_MAX_DEVIATION_MS: u64 = 100;
/// Width of the jitter window centred on [`TIME_BETWEEN_MOVES`].
pub const TIME_MAX_DEVIATION: Duration = Duration::from_millis(TIME_MAX_DEVIATION_MS);

/// A primitive action issued on the real board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::IsVariant)]
pub enum MoveAction {
    #[display("rotate")]
    Rotate,
    #[display("shift left")]
    ShiftLeft,
    #[display("shift right")]
    ShiftRight,
    #[display("drop")]
    Drop,
}

/// Drives the falling shape towards a [`Decision`], one tick at a time.
///
/// Each call to [`Self::advance_towards_target`] may turn the shape once and
/// then shift it one column toward the target column, read live from the
/// board. Once both match, the shape is dropped and the executor stays
/// completed until [`Self::arm`] hands it a new decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveExecutor {
    target_rotation: u8,
    target_column: usize,
    current_rotation: u8,
    move_completed: bool,
}

impl Default for MoveExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl MoveExecutor {
    /// Creates an executor with nothing to do.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            target_rotation: 0,
            target_column: 0,
            current_rotation: 0,
            move_completed: true,
        }
    }

    /// Starts a new decision cycle.
    pub fn arm(&mut self, decision: Decision) {
        self.target_rotation = decision.rotation;
        self.target_column = decision.column;
        self.current_rotation = 0;
        self.move_completed = false;
    }

    #[must_use]
    pub fn target_rotation(&self) -> u8 {
        self.target_rotation
    }

    #[must_use]
    pub fn target_column(&self) -> usize {
        self.target_column
    }

    /// Clockwise turns applied so far in this cycle.
    #[must_use]
    pub fn current_rotation(&self) -> u8 {
        self.current_rotation
    }

    #[must_use]
    pub fn is_move_completed(&self) -> bool {
        self.move_completed
    }

    /// Performs at most one rotation and one shift, or the final drop.
    ///
    /// Returns the actions issued, refused ones included. Refused moves are
    /// retried on the next call.
    pub fn advance_towards_target<B>(&mut self, board: &mut B) -> ArrayVec<MoveAction, 2>
    where
        B: ZombieBoard + ?Sized,
    {
        let mut actions = ArrayVec::new();
        if self.move_completed {
            return actions;
        }

        if self.current_rotation == self.target_rotation
            && board.current_column() == self.target_column
        {
            board.move_down_all_the_way();
            actions.push(MoveAction::Drop);
            tracing::trace!(column = self.target_column, "drop");
            self.move_completed = true;
            self.current_rotation = 0;
            self.target_column = 0;
            return actions;
        }

        if self.current_rotation < self.target_rotation {
            actions.push(MoveAction::Rotate);
            if board.rotate_clockwise() {
                self.current_rotation += 1;
            }
            tracing::trace!(
                rotation = self.current_rotation,
                target = self.target_rotation,
                "rotate"
            );
        }

        let column = board.current_column();
        let shift = match column.cmp(&self.target_column) {
            Ordering::Less => Some((MoveAction::ShiftRight, board.move_right())),
            Ordering::Greater => Some((MoveAction::ShiftLeft, board.move_left())),
            Ordering::Equal => None,
        };
        if let Some((action, moved)) = shift {
            actions.push(action);
            tracing::trace!(%action, column, target = self.target_column, moved, "shift");
        }

        actions
    }
}

/// Countdown gating how often the executor may act.
#[derive(Debug, Clone)]
pub struct MoveCadence {
    interval: Duration,
    jitter: Option<Pcg32>,
    time_until_next_move: Duration,
}

impl Default for MoveCadence {
    fn default() -> Self {
        Self::new(TIME_BETWEEN_MOVES)
    }
}

impl MoveCadence {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            jitter: None,
            time_until_next_move: interval,
        }
    }

    /// Randomises each reset within `interval ± TIME_MAX_DEVIATION / 2`.
    #[must_use]
    pub fn with_jitter(self, rng: Pcg32) -> Self {
        Self {
            jitter: Some(rng),
            ..self
        }
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    #[must_use]
    pub fn time_until_next_move(&self) -> Duration {
        self.time_until_next_move
    }

    /// Counts `elapsed` down. Returns `true` when a move is due, after
    /// restarting the countdown.
    pub fn tick(&mut self, elapsed: Duration) -> bool {
        self.time_until_next_move = self.time_until_next_move.saturating_sub(elapsed);
        if !self.time_until_next_move.is_zero() {
            return false;
        }
        self.time_until_next_move = self.next_interval();
        true
    }

    fn next_interval(&mut self) -> Duration {
        let Some(rng) = &mut self.jitter else {
            return self.interval;
        };
        // Whole milliseconds in `interval - 50 ms .. interval + 50 ms`.
        let offset = Duration::from_millis(rng.random_range(0..TIME_MAX_DEVIATION_MS));
        (self.interval + offset).saturating_sub(TIME_MAX_DEVIATION / 2)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use towerblocks_engine::{BitBoard, Piece, PieceKind, Playfield};

    use super::*;

    fn distance(executor: &MoveExecutor, board: &Playfield) -> usize {
        let rotation = usize::from(executor.target_rotation() - executor.current_rotation());
        rotation + board.current_column().abs_diff(executor.target_column())
    }

    #[test]
    fn test_converges_without_early_drop() {
        let mut board = Playfield::new(PieceKind::T);
        assert_eq!(board.current_column(), 3);
        let mut executor = MoveExecutor::new();
        executor.arm(Decision {
            rotation: 2,
            column: 5,
        });

        let mut last_distance = distance(&executor, &board);
        let mut dropped = false;
        for _ in 0..20 {
            let actions = executor.advance_towards_target(&mut board);
            if actions.iter().any(MoveAction::is_drop) {
                dropped = true;
                break;
            }
            let d = distance(&executor, &board);
            assert!(d <= last_distance, "distance went from {last_distance} to {d}");
            last_distance = d;
        }

        assert!(dropped);
        assert!(executor.is_move_completed());
        assert_eq!(board.falling_piece().rotation().get(), 2);
        assert_eq!(board.current_column(), 5);
        assert!(board.try_move_down().is_err());
    }

    #[test]
    fn test_drop_only_when_on_target() {
        let mut board = Playfield::new(PieceKind::L);
        let mut executor = MoveExecutor::new();
        executor.arm(Decision {
            rotation: 3,
            column: 0,
        });
        for _ in 0..20 {
            let rotation = executor.current_rotation();
            let column = board.current_column();
            let actions = executor.advance_towards_target(&mut board);
            if actions.contains(&MoveAction::Drop) {
                assert_eq!((rotation, column), (3, 0));
                assert_eq!(actions.len(), 1);
                return;
            }
        }
        panic!("never dropped");
    }

    #[test]
    fn test_rotate_and_shift_in_same_tick() {
        let mut board = Playfield::new(PieceKind::J);
        let mut executor = MoveExecutor::new();
        executor.arm(Decision {
            rotation: 1,
            column: 6,
        });
        let actions = executor.advance_towards_target(&mut board);
        assert_eq!(actions.as_slice(), &[MoveAction::Rotate, MoveAction::ShiftRight]);
        assert_eq!(executor.current_rotation(), 1);
    }

    #[test]
    fn test_completed_executor_is_inert() {
        let mut board = Playfield::new(PieceKind::S);
        let before = board.clone();
        let mut executor = MoveExecutor::new();
        assert!(executor.is_move_completed());
        assert!(executor.advance_towards_target(&mut board).is_empty());
        assert_eq!(board, before);

        executor.arm(Decision {
            rotation: 0,
            column: 3,
        });
        assert_eq!(
            executor.advance_towards_target(&mut board).as_slice(),
            &[MoveAction::Drop]
        );
        let landed = board.clone();
        assert!(executor.advance_towards_target(&mut board).is_empty());
        assert_eq!(board, landed);
    }

    #[test]
    fn test_refused_rotation_is_retried() {
        // The vertical I fits through the ceiling only at column 6.
        let mut art = String::from("######.###\n######.###\n");
        for _ in 0..18 {
            art.push_str("..........\n");
        }
        let mut board =
            Playfield::from_parts(BitBoard::from_ascii(&art), Piece::new(PieceKind::I));
        let mut executor = MoveExecutor::new();
        executor.arm(Decision {
            rotation: 1,
            column: 6,
        });

        let actions = executor.advance_towards_target(&mut board);
        assert_eq!(actions.as_slice(), &[MoveAction::Rotate, MoveAction::ShiftRight]);
        assert_eq!(executor.current_rotation(), 0);

        for _ in 0..2 {
            executor.advance_towards_target(&mut board);
        }
        assert!(executor.is_move_completed());
        assert_eq!(board.falling_piece().rotation().get(), 1);
        assert_eq!(board.current_column(), 6);
        assert!(board.try_move_down().is_err());
    }

    #[test]
    fn test_cadence_fires_every_interval() {
        let mut cadence = MoveCadence::new(TIME_BETWEEN_MOVES);
        let frame = Duration::from_millis(50);
        let fired: Vec<bool> = (0..10).map(|_| cadence.tick(frame)).collect();
        assert_eq!(
            fired,
            [false, false, false, false, true, false, false, false, false, true]
        );
    }

    #[test]
    fn test_cadence_resets_to_full_interval_after_overshoot() {
        let mut cadence = MoveCadence::new(TIME_BETWEEN_MOVES);
        assert!(cadence.tick(Duration::from_millis(400)));
        assert_eq!(cadence.time_until_next_move(), TIME_BETWEEN_MOVES);
    }

    #[test]
    fn test_cadence_jitter_stays_in_window() {
        let mut cadence =
            MoveCadence::new(TIME_BETWEEN_MOVES).with_jitter(Pcg32::seed_from_u64(9));
        let low = TIME_BETWEEN_MOVES - TIME_MAX_DEVIATION / 2;
        let high = TIME_BETWEEN_MOVES + TIME_MAX_DEVIATION / 2;
        for _ in 0..1000 {
            assert!(cadence.tick(Duration::from_secs(1)));
            let next = cadence.time_until_next_move();
            assert!(low <= next && next < high, "{next:?}");
            assert_eq!(next.subsec_nanos() % 1_000_000, 0, "{next:?}");
        }
    }
}
