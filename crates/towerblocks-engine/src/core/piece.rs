use serde::Serialize;

use super::{
    SENTINEL_MARGIN_LEFT,
    bit_board::{BitBoard, PIECE_SPAWN_X, PIECE_SPAWN_Y},
};

/// A falling shape (tetromino) with position, rotation, and kind.
///
/// Pieces are immutable values: movement and rotation return new `Piece`s.
///
/// # Coordinate System
///
/// - Position is the top-left of the piece's 4×4 box in board coordinates
///   (sentinel margins included)
/// - Rotation is tracked as 0 (spawn), 1 (90° clockwise), 2 (180°), 3 (270°)
///
/// # Example
///
/// ```
/// use towerblocks_engine::{Piece, PieceKind};
///
/// let piece = Piece::new(PieceKind::T);
/// let moved = piece.right().unwrap();
/// let rotated = moved.rotated_right();
/// assert_eq!(rotated.rotation().get(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    position: PiecePosition,
    rotation: PieceRotation,
    kind: PieceKind,
}

impl Serialize for Piece {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Format: "kind#rotation@x,y" (e.g., "S#1@4,18")
        let s = format!(
            "{}#{}@{},{}",
            self.kind.as_char(),
            self.rotation.0,
            self.position.x,
            self.position.y
        );
        serializer.serialize_str(&s)
    }
}

impl Piece {
    /// Creates a piece of the given kind at the spawn position and rotation.
    #[must_use]
    pub fn new(kind: PieceKind) -> Self {
        Self {
            position: PiecePosition::SPAWN_POSITION,
            rotation: PieceRotation::default(),
            kind,
        }
    }

    #[must_use]
    pub fn position(&self) -> PiecePosition {
        self.position
    }

    #[must_use]
    pub fn rotation(&self) -> PieceRotation {
        self.rotation
    }

    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub(crate) fn mask(&self) -> PieceMask {
        self.kind.mask(self.rotation)
    }

    /// Board coordinates of the four cells the piece occupies.
    pub fn occupied_positions(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.kind
            .occupied_positions(self.rotation)
            .map(move |(dx, dy)| (self.position.x() + dx, self.position.y() + dy))
    }

    /// Leftmost playable column occupied by the piece.
    ///
    /// Unlike [`PiecePosition::x`] this does not depend on where the cells sit
    /// inside the 4×4 box, so it is comparable across rotations.
    #[must_use]
    pub fn leftmost_column(&self) -> usize {
        let x = self
            .occupied_positions()
            .map(|(x, _y)| x)
            .min()
            .expect("every piece occupies four cells");
        x.saturating_sub(SENTINEL_MARGIN_LEFT)
    }

    #[must_use]
    pub fn left(&self) -> Option<Self> {
        let position = self.position.left()?;
        Some(Self { position, ..*self })
    }

    #[must_use]
    pub fn right(&self) -> Option<Self> {
        let position = self.position.right()?;
        Some(Self { position, ..*self })
    }

    #[must_use]
    pub fn up(&self) -> Option<Self> {
        let position = self.position.up()?;
        Some(Self { position, ..*self })
    }

    #[must_use]
    pub fn down(&self) -> Option<Self> {
        let position = self.position.down()?;
        Some(Self { position, ..*self })
    }

    /// Same column and rotation, back on the spawn row.
    #[must_use]
    pub fn at_spawn_row(&self) -> Self {
        Self {
            position: PiecePosition::new(self.position.x, PiecePosition::SPAWN_POSITION.y),
            ..*self
        }
    }

    #[must_use]
    pub fn rotated_right(&self) -> Self {
        Self {
            rotation: self.rotation.rotated_right(),
            ..*self
        }
    }

    /// Lowest non-colliding position straight below this piece.
    #[must_use]
    pub fn simulate_drop_position(&self, board: &BitBoard) -> Self {
        let mut dropped = *self;
        while let Some(piece) = dropped.down().filter(|m| !board.is_colliding(*m)) {
            dropped = piece;
        }
        dropped
    }
}

/// Position of a piece's 4×4 box on the board.
///
/// - (0, 0) is the top-left corner of the board including sentinel margins
/// - X increases rightward (columns), Y increases downward (rows)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PiecePosition {
    x: u8,
    y: u8,
}

impl PiecePosition {
    #[expect(clippy::cast_possible_truncation)]
    pub const SPAWN_POSITION: Self = Self::new(PIECE_SPAWN_X as u8, PIECE_SPAWN_Y as u8);

    #[must_use]
    pub const fn new(x: u8, y: u8) -> Self {
        assert!((x as usize) < BitBoard::TOTAL_WIDTH);
        assert!((y as usize) < BitBoard::TOTAL_HEIGHT);
        Self { x, y }
    }

    #[must_use]
    pub fn x(self) -> usize {
        usize::from(self.x)
    }

    #[must_use]
    pub fn y(self) -> usize {
        usize::from(self.y)
    }

    #[must_use]
    pub const fn left(&self) -> Option<Self> {
        if self.x == 0 {
            None
        } else {
            Some(Self::new(self.x - 1, self.y))
        }
    }

    #[must_use]
    pub const fn right(&self) -> Option<Self> {
        if self.x as usize >= BitBoard::TOTAL_WIDTH - 1 {
            None
        } else {
            Some(Self::new(self.x + 1, self.y))
        }
    }

    #[must_use]
    pub const fn up(&self) -> Option<Self> {
        if self.y == 0 {
            None
        } else {
            Some(Self::new(self.x, self.y - 1))
        }
    }

    #[must_use]
    pub const fn down(&self) -> Option<Self> {
        if self.y as usize >= BitBoard::TOTAL_HEIGHT - 1 {
            None
        } else {
            Some(Self::new(self.x, self.y + 1))
        }
    }
}

/// Rotation state of a piece, 0-3 clockwise quarter turns from spawn.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PieceRotation(u8);

impl PieceRotation {
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn rotated_right(self) -> Self {
        PieceRotation((self.0 + 1) % 4)
    }

    const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// Kind of a piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PieceKind {
    I = 0,
    O = 1,
    S = 2,
    Z = 3,
    J = 4,
    L = 5,
    T = 6,
}

impl PieceKind {
    /// Number of piece kinds (7).
    pub const LEN: usize = 7;

    pub const ALL: [PieceKind; Self::LEN] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
        PieceKind::T,
    ];

    pub(crate) fn mask(self, rotation: PieceRotation) -> PieceMask {
        PIECE_MASKS[self as usize][rotation.as_usize()]
    }

    /// Offsets inside the 4×4 box occupied by the piece in the given rotation.
    pub fn occupied_positions(
        self,
        rotation: PieceRotation,
    ) -> impl Iterator<Item = (usize, usize)> {
        let mask = self.mask(rotation);
        (0..4).flat_map(move |dy| {
            (0..4).filter_map(move |dx| ((mask[dy] & (1 << dx)) != 0).then_some((dx, dy)))
        })
    }

    /// Returns the single character representation of this piece kind.
    ///
    /// ```
    /// use towerblocks_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::O => 'O',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
            PieceKind::T => 'T',
        }
    }

    /// Parses a piece kind from a single character (case-insensitive).
    ///
    /// ```
    /// use towerblocks_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_char('I'), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_char('t'), Some(PieceKind::T));
    /// assert_eq!(PieceKind::from_char('X'), None);
    /// ```
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'I' => Some(PieceKind::I),
            'O' => Some(PieceKind::O),
            'S' => Some(PieceKind::S),
            'Z' => Some(PieceKind::Z),
            'J' => Some(PieceKind::J),
            'L' => Some(PieceKind::L),
            'T' => Some(PieceKind::T),
            _ => None,
        }
    }
}

/// Bitmask of a piece within its 4×4 box: one `u16` per row, bit N is column N.
pub(crate) type PieceMask = [u16; 4];

/// Generates all 4 rotation states of a piece mask by rotating 90° clockwise.
///
/// `size` is the effective box size (4 for I, 2 for O, 3 for the rest).
const fn mask_rotations(size: usize, mask: PieceMask) -> [PieceMask; 4] {
    let mut rotates = [mask; 4];
    let mut i = 1;
    while i < 4 {
        let mut new_mask = [0; 4];
        let mut y = 0;
        while y < size {
            let mut x = 0;
            while x < size {
                if (rotates[i - 1][size - 1 - x] & (1 << y)) != 0 {
                    new_mask[y] |= 1 << x;
                }
                x += 1;
            }
            y += 1;
        }
        rotates[i] = new_mask;
        i += 1;
    }
    rotates
}

const PIECE_MASKS: [[PieceMask; 4]; PieceKind::LEN] = {
    const fn m(bits: [bool; 4]) -> u16 {
        let mut mask = 0;
        let mut i = 0;
        while i < 4 {
            if bits[i] {
                mask |= 1 << i;
            }
            i += 1;
        }
        mask
    }

    const C: bool = true;
    const E: bool = false;
    const EEEE: u16 = m([E; 4]);

    [
        // I-piece
        mask_rotations(4, [EEEE, m([C, C, C, C]), EEEE, EEEE]),
        // O-piece
        mask_rotations(2, [m([C, C, E, E]), m([C, C, E, E]), EEEE, EEEE]),
        // S-piece
        mask_rotations(3, [m([E, C, C, E]), m([C, C, E, E]), EEEE, EEEE]),
        // Z-piece
        mask_rotations(3, [m([C, C, E, E]), m([E, C, C, E]), EEEE, EEEE]),
        // J-piece
        mask_rotations(3, [m([C, E, E, E]), m([C, C, C, E]), EEEE, EEEE]),
        // L-piece
        mask_rotations(3, [m([E, E, C, E]), m([C, C, C, E]), EEEE, EEEE]),
        // T-piece
        mask_rotations(3, [m([E, C, E, E]), m([C, C, C, E]), EEEE, EEEE]),
    ]
};
