// ============================================================================
// Configuration
// ============================================================================

/// Column a freshly spawned piece starts at. Puts the four-wide I piece in
/// the middle of the 12-column board.
pub const SPAWN_X: i16 = 4;
pub const SPAWN_Y: i16 = 0;

pub const ROTATION_COUNT: usize = 4;

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Position {
    pub x: i16,
    pub y: i16,
}

impl Position {
    pub const fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

type Shape = [(i16, i16); 4];

// Indexed by `PieceKind as usize`, then by rotation.
const SHAPES: [[Shape; ROTATION_COUNT]; 7] = [
    // I
    [
        [(0, 0), (1, 0), (2, 0), (3, 0)],
        [(0, 0), (0, 1), (0, 2), (0, 3)],
        [(0, 0), (1, 0), (2, 0), (3, 0)],
        [(0, 0), (0, 1), (0, 2), (0, 3)],
    ],
    // O
    [
        [(0, 0), (1, 0), (0, 1), (1, 1)],
        [(0, 0), (1, 0), (0, 1), (1, 1)],
        [(0, 0), (1, 0), (0, 1), (1, 1)],
        [(0, 0), (1, 0), (0, 1), (1, 1)],
    ],
    // T
    [
        [(1, 0), (0, 1), (1, 1), (2, 1)],
        [(0, 0), (0, 1), (1, 1), (0, 2)],
        [(0, 0), (1, 0), (2, 0), (1, 1)],
        [(1, 0), (0, 1), (1, 1), (1, 2)],
    ],
    // S
    [
        [(1, 0), (2, 0), (0, 1), (1, 1)],
        [(0, 0), (0, 1), (1, 1), (1, 2)],
        [(1, 0), (2, 0), (0, 1), (1, 1)],
        [(0, 0), (0, 1), (1, 1), (1, 2)],
    ],
    // Z
    [
        [(0, 0), (1, 0), (1, 1), (2, 1)],
        [(1, 0), (0, 1), (1, 1), (0, 2)],
        [(0, 0), (1, 0), (1, 1), (2, 1)],
        [(1, 0), (0, 1), (1, 1), (0, 2)],
    ],
    // J
    [
        [(0, 0), (0, 1), (1, 1), (2, 1)],
        [(1, 0), (1, 1), (0, 2), (1, 2)],
        [(0, 0), (1, 0), (2, 0), (2, 1)],
        [(0, 0), (1, 0), (0, 1), (0, 2)],
    ],
    // L
    [
        [(2, 0), (0, 1), (1, 1), (2, 1)],
        [(0, 0), (0, 1), (0, 2), (1, 2)],
        [(0, 0), (1, 0), (2, 0), (0, 1)],
        [(0, 0), (1, 0), (1, 1), (1, 2)],
    ],
];

impl PieceKind {
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Relative footprint of this kind in the given rotation state.
    /// Rotation wraps, so any index is accepted.
    pub fn shape(self, rotation: usize) -> &'static [(i16, i16); 4] {
        &SHAPES[self as usize][rotation % ROTATION_COUNT]
    }

    pub fn symbol(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::O => 'O',
            PieceKind::T => 'T',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
        }
    }
}

impl TryFrom<char> for PieceKind {
    type Error = char;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c.to_ascii_uppercase() {
            'I' => Ok(PieceKind::I),
            'O' => Ok(PieceKind::O),
            'T' => Ok(PieceKind::T),
            'S' => Ok(PieceKind::S),
            'Z' => Ok(PieceKind::Z),
            'J' => Ok(PieceKind::J),
            'L' => Ok(PieceKind::L),
            _ => Err(c),
        }
    }
}

/// Absolute board cells covered by `kind` in `rotation` with its origin at `origin`.
pub fn cells(kind: PieceKind, rotation: usize, origin: Position) -> [Position; 4] {
    kind.shape(rotation)
        .map(|(dx, dy)| Position::new(origin.x + dx, origin.y + dy))
}

// ============================================================================
// Piece
// ============================================================================

/// A tetromino instance. Moving and rotating produce new values; whether the
/// result is legal on a board is decided by the caller.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Piece {
    pub kind: PieceKind,
    pub position: Position,
    pub rotation: usize,
}

impl Piece {
    pub fn new(kind: PieceKind) -> Self {
        Self::new_at(kind, SPAWN_X, SPAWN_Y)
    }

    pub fn new_at(kind: PieceKind, x: i16, y: i16) -> Self {
        Self {
            kind,
            position: Position::new(x, y),
            rotation: 0,
        }
    }

    pub fn cells(&self) -> [Position; 4] {
        cells(self.kind, self.rotation, self.position)
    }

    /// Clockwise quarter turn about the origin.
    pub fn rotated(&self) -> Self {
        Self {
            rotation: (self.rotation + 1) % ROTATION_COUNT,
            ..*self
        }
    }

    pub fn moved(&self, dx: i16, dy: i16) -> Self {
        Self {
            position: Position::new(self.position.x + dx, self.position.y + dy),
            ..*self
        }
    }

    /// Same kind and rotation, back at the spawn origin.
    pub fn at_spawn(&self) -> Self {
        Self {
            position: Position::new(SPAWN_X, SPAWN_Y),
            ..*self
        }
    }
}
