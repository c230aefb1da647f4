use arrayvec::ArrayVec;
use serde::Serialize;
use towerblocks_engine::MAX_COLS;

use crate::{BoardMetrics, RealBoard, ZombieBoard};

/// Number of clockwise rotations tried per shape.
pub const ROTATIONS: u8 = 4;

/// Upper bound on the placements one search can score.
pub const MAX_CANDIDATES: usize = ROTATIONS as usize * MAX_COLS;

/// Where the agent wants the falling shape to end up.
///
/// `rotation` counts clockwise turns from the spawn orientation; `column` is
/// the leftmost column the shape occupies once in that rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Decision {
    pub rotation: u8,
    pub column: usize,
}

/// One scored placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Candidate {
    pub rotation: u8,
    pub column: usize,
    pub metrics: BoardMetrics,
    pub fitness: f64,
}

impl Candidate {
    #[must_use]
    pub fn decision(&self) -> Decision {
        Decision {
            rotation: self.rotation,
            column: self.column,
        }
    }
}

/// Scores every placement reachable on a zombie copy of `board`.
///
/// Rotation-major, column-minor: for each rotation the shape is pushed
/// against the left wall and swept right one column at a time, dropped,
/// committed, measured and rewound. A sweep stops the first time the shape
/// cannot move right. The column recorded is read back after the drop.
///
/// `board` itself is never touched.
pub fn evaluate_candidates<B>(board: &B) -> ArrayVec<Candidate, MAX_CANDIDATES>
where
    B: RealBoard + ?Sized,
{
    let mut zombie = board.clone_zombie();
    let mut candidates = ArrayVec::new();

    for rotation in 0..ROTATIONS {
        while zombie.move_left() {}

        for _ in 0..MAX_COLS {
            zombie.move_down_all_the_way();
            zombie.commit_shape_to_cells();
            let metrics = BoardMetrics::measure(&zombie);
            candidates.push(Candidate {
                rotation,
                column: zombie.current_column(),
                metrics,
                fitness: metrics.fitness(),
            });
            zombie.undo_commit();
            zombie.move_to_top();
            if !zombie.move_right() {
                break;
            }
        }

        if rotation + 1 < ROTATIONS && !rotate_for_next_sweep(&mut zombie) {
            break;
        }
    }

    candidates
}

/// Returns the first candidate with the highest fitness.
#[must_use]
pub fn select_best(candidates: &[Candidate]) -> Option<&Candidate> {
    let mut best_fitness = f64::NEG_INFINITY;
    let mut best = None;
    for candidate in candidates {
        if candidate.fitness > best_fitness {
            best_fitness = candidate.fitness;
            best = Some(candidate);
        }
    }
    best
}

/// Picks the placement with the highest fitness for the falling shape.
///
/// Ties go to the first placement found. Deterministic for a given board.
pub fn strategize<B>(board: &B) -> Option<Decision>
where
    B: RealBoard + ?Sized,
{
    let candidates = evaluate_candidates(board);
    let best = select_best(&candidates)?;
    tracing::debug!(
        rotation = best.rotation,
        column = best.column,
        fitness = best.fitness,
        candidates = candidates.len(),
        "placement decided"
    );
    Some(best.decision())
}

/// Rotates clockwise, stepping left from wherever the sweep ended until the
/// rotation fits. Returns `false` when no column allows it.
fn rotate_for_next_sweep<Z>(zombie: &mut Z) -> bool
where
    Z: ZombieBoard,
{
    loop {
        if zombie.rotate_clockwise() {
            return true;
        }
        if !zombie.move_left() {
            return false;
        }
    }
}
