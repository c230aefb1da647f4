use std::{collections::VecDeque, fmt::Write as _};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
    seq::SliceRandom,
};
use rand_pcg::Pcg32;
use serde::{Serialize, Serializer};

use crate::PieceKind;

/// Generates pieces with the 7-bag randomizer.
///
/// A bag holds one of each of the 7 kinds in shuffled order; pieces are drawn
/// from the front and a new shuffled bag is appended whenever 7 or fewer remain,
/// so the queue can always be previewed at least 7 pieces ahead.
///
/// # Example
///
/// ```
/// use towerblocks_engine::{PieceBuffer, PieceSeed};
///
/// let mut a = PieceBuffer::with_seed(PieceSeed::from(42));
/// let mut b = PieceBuffer::with_seed(PieceSeed::from(42));
/// assert_eq!(a.pop_next(), b.pop_next());
/// ```
#[derive(Debug, Clone)]
pub struct PieceBuffer {
    rng: Pcg32,
    bag: VecDeque<PieceKind>,
}

impl Default for PieceBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// 128-bit seed for deterministic piece generation.
///
/// Serialized as a 32-character hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceSeed([u8; 16]);

impl PieceSeed {
    #[must_use]
    pub const fn to_bytes(self) -> [u8; 16] {
        self.0
    }
}

impl From<u64> for PieceSeed {
    fn from(value: u64) -> Self {
        Self(u128::from(value).to_be_bytes())
    }
}

impl Serialize for PieceSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let num = u128::from_be_bytes(self.0);
        let mut hex_str = String::with_capacity(2 * self.0.len());
        write!(&mut hex_str, "{num:032x}").map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&hex_str)
    }
}

impl Distribution<PieceSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        PieceSeed(seed)
    }
}

impl PieceBuffer {
    /// Creates a new piece buffer with a random seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Like [`Self::new`], but deterministic for the given seed.
    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        let rng = Pcg32::from_seed(seed.0);
        let bag = VecDeque::with_capacity(PieceKind::LEN * 2);
        let mut this = Self { rng, bag };
        this.fill_bag();
        this
    }

    fn fill_bag(&mut self) {
        while self.bag.len() <= PieceKind::LEN {
            let mut new_bag = PieceKind::ALL;
            new_bag.shuffle(&mut self.rng);
            self.bag.extend(new_bag);
        }
    }

    /// Draws the next piece from the bag.
    pub fn pop_next(&mut self) -> PieceKind {
        self.fill_bag();
        self.bag
            .pop_front()
            .expect("piece bag should never be empty")
    }

    /// Upcoming pieces in draw order.
    pub fn next_pieces(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.bag.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_bag_contains_every_kind() {
        let mut buffer = PieceBuffer::with_seed(PieceSeed::from(7));
        for _ in 0..3 {
            let mut bag: Vec<PieceKind> = (0..PieceKind::LEN).map(|_| buffer.pop_next()).collect();
            bag.sort_by_key(|kind| *kind as u8);
            assert_eq!(bag, PieceKind::ALL);
        }
    }

    #[test]
    fn test_preview_is_at_least_one_bag() {
        let mut buffer = PieceBuffer::with_seed(PieceSeed::from(1));
        for _ in 0..20 {
            assert!(buffer.next_pieces().count() >= PieceKind::LEN);
            let expected = buffer.next_pieces().next().unwrap();
            assert_eq!(buffer.pop_next(), expected);
        }
    }

    #[test]
    fn test_deterministic_piece_generation() {
        let mut buffer1 = PieceBuffer::with_seed(PieceSeed::from(0x1234_5678));
        let mut buffer2 = PieceBuffer::with_seed(PieceSeed::from(0x1234_5678));
        for _ in 0..20 {
            assert_eq!(buffer1.pop_next(), buffer2.pop_next());
        }
    }

    #[test]
    fn test_seed_serialization() {
        let seed = PieceSeed::from(0x0123_4567_89ab_cdef);
        let serialized = serde_json::to_string(&seed).unwrap();
        assert_eq!(serialized, "\"00000000000000000123456789abcdef\"");
    }
}
