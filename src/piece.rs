use crate::grid::{Cell, EMPTY};

/// Rectangular matrix of cell values; row 0 is the top.
pub type Shape = Vec<Vec<Cell>>;

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Position {
    pub x: i16,
    pub y: i16,
}

/// Display attribute attached to each piece kind. Front-ends decide how a
/// color is actually drawn.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DisplayColor {
    Red,
    Blue,
    Green,
    Purple,
    Orange,
    Yellow,
    Cyan,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum PieceKind {
    I,
    J,
    L,
    O,
    S,
    T,
    Z,
}

impl PieceKind {
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::J,
        PieceKind::L,
        PieceKind::O,
        PieceKind::S,
        PieceKind::T,
        PieceKind::Z,
    ];

    /// Cell value this kind writes into the grid, in `1..=7`.
    pub fn id(self) -> Cell {
        match self {
            PieceKind::I => 1,
            PieceKind::J => 2,
            PieceKind::L => 3,
            PieceKind::O => 4,
            PieceKind::S => 5,
            PieceKind::T => 6,
            PieceKind::Z => 7,
        }
    }

    pub fn from_id(id: Cell) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.id() == id)
    }

    /// Canonical spawn orientation. A fresh matrix is built on every call, so
    /// rotating one piece can never leak into the next spawn.
    pub fn shape(self) -> Shape {
        let v = self.id();
        match self {
            PieceKind::I => vec![vec![v, v, v, v]],
            PieceKind::J => vec![vec![v, 0, 0], vec![v, v, v]],
            PieceKind::L => vec![vec![0, 0, v], vec![v, v, v]],
            PieceKind::O => vec![vec![v, v], vec![v, v]],
            PieceKind::S => vec![vec![0, v, v], vec![v, v, 0]],
            PieceKind::T => vec![vec![v, v, v], vec![0, v, 0]],
            PieceKind::Z => vec![vec![v, v, 0], vec![0, v, v]],
        }
    }

    pub fn color(self) -> DisplayColor {
        match self {
            PieceKind::I => DisplayColor::Red,
            PieceKind::J => DisplayColor::Blue,
            PieceKind::L => DisplayColor::Green,
            PieceKind::O => DisplayColor::Purple,
            PieceKind::S => DisplayColor::Orange,
            PieceKind::T => DisplayColor::Yellow,
            PieceKind::Z => DisplayColor::Cyan,
        }
    }
}

// ============================================================================
// Rotation
// ============================================================================

/// Rotates a shape 90 degrees clockwise: transpose, then reverse every row.
///
/// Works on any rectangular matrix; an `h x w` input yields a `w x h` output.
pub fn rotate_clockwise(shape: &[Vec<Cell>]) -> Shape {
    let height = shape.len();
    let width = shape.first().map_or(0, Vec::len);

    let mut transposed: Shape = (0..width)
        .map(|c| (0..height).map(|r| shape[r][c]).collect())
        .collect();
    for row in &mut transposed {
        row.reverse();
    }
    transposed
}

// ============================================================================
// Active Piece
// ============================================================================

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Piece {
    pub kind: PieceKind,
    pub shape: Shape,
    pub origin: Position,
}

impl Piece {
    /// New piece of `kind` at the spawn origin (row 0, column 0).
    pub fn spawn(kind: PieceKind) -> Self {
        Self::new_at(kind, 0, 0)
    }

    pub fn new_at(kind: PieceKind, x: i16, y: i16) -> Self {
        Self {
            kind,
            shape: kind.shape(),
            origin: Position { x, y },
        }
    }

    pub fn color(&self) -> DisplayColor {
        self.kind.color()
    }

    /// Absolute grid positions of every occupied cell, with their values.
    pub fn blocks(&self) -> Vec<(Position, Cell)> {
        let mut blocks = Vec::new();
        for (r, row) in self.shape.iter().enumerate() {
            for (c, &value) in row.iter().enumerate() {
                if value != EMPTY {
                    blocks.push((
                        Position {
                            x: self.origin.x + c as i16,
                            y: self.origin.y + r as i16,
                        },
                        value,
                    ));
                }
            }
        }
        blocks
    }

    pub fn rotated_shape(&self) -> Shape {
        rotate_clockwise(&self.shape)
    }
}
