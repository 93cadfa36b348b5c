//! Falling piece model: kind, owner, placement and occupied-cell geometry
//!
//! A shape's geometry is a pure function of its kind and rotation. Offsets
//! are `(dx, dy)` pairs relative to the shape's pivot at `(col, row)`, with
//! `dy` growing downwards. Several kinds reach one row above their pivot, so a
//! freshly spawned shape may sit partly above the top of the board.

use crate::PlayerId;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Column/row offset of one occupied cell relative to the pivot
pub type Offset = (i32, i32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    I,
    J,
    L,
    O,
    S,
    T,
    Z,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 7] = [
        ShapeKind::I,
        ShapeKind::J,
        ShapeKind::L,
        ShapeKind::O,
        ShapeKind::S,
        ShapeKind::T,
        ShapeKind::Z,
    ];

    /// Picks a kind uniformly at random
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    fn base(self) -> [Offset; 4] {
        match self {
            ShapeKind::I => [(-1, 0), (0, 0), (1, 0), (2, 0)],
            ShapeKind::J => [(-1, -1), (-1, 0), (0, 0), (1, 0)],
            ShapeKind::L => [(1, -1), (-1, 0), (0, 0), (1, 0)],
            ShapeKind::O => [(0, 0), (1, 0), (0, 1), (1, 1)],
            ShapeKind::S => [(0, -1), (1, -1), (-1, 0), (0, 0)],
            ShapeKind::T => [(0, -1), (-1, 0), (0, 0), (1, 0)],
            ShapeKind::Z => [(-1, -1), (0, -1), (0, 0), (1, 0)],
        }
    }

    /// Occupied offsets of this kind at the given rotation
    ///
    /// Each quarter turn maps `(dx, dy)` to `(-dy, dx)`, a clockwise turn on a
    /// board whose rows grow downwards. The square piece never turns.
    pub fn offsets(self, rotation: Rotation) -> [Offset; 4] {
        let mut cells = self.base();
        if self == ShapeKind::O {
            return cells;
        }

        for _ in 0..rotation.value() {
            for cell in cells.iter_mut() {
                *cell = (-cell.1, cell.0);
            }
        }
        cells
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("rotation {0} is outside 0..=3")]
pub struct InvalidRotation(pub u8);

/// Quarter-turn count in `0..=3`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rotation(u8);

impl Rotation {
    pub const SPAWN: Rotation = Rotation(0);

    pub fn value(self) -> u8 {
        self.0
    }

    /// Rotation reached by turning once in `direction`
    pub fn turned(self, direction: Direction) -> Self {
        Rotation((self.0 + direction.quarter_turns()) % 4)
    }
}

impl TryFrom<u8> for Rotation {
    type Error = InvalidRotation;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value < 4 {
            Ok(Rotation(value))
        } else {
            Err(InvalidRotation(value))
        }
    }
}

impl From<Rotation> for u8 {
    fn from(rotation: Rotation) -> Self {
        rotation.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    /// Clockwise quarter turns equivalent to one turn in this direction
    pub fn quarter_turns(self) -> u8 {
        match self {
            Direction::Left => 3,
            Direction::Right => 1,
        }
    }
}

/// One falling piece controlled by one player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    #[serde(rename = "shapeType")]
    pub kind: ShapeKind,
    pub player_id: PlayerId,
    pub col: i32,
    pub row: i32,
    pub rotation: Rotation,
}

impl Shape {
    pub fn new(kind: ShapeKind, player_id: PlayerId, col: i32, row: i32, rotation: Rotation) -> Self {
        Self {
            kind,
            player_id,
            col,
            row,
            rotation,
        }
    }

    /// Spawns a shape of a random kind at the top centre of a board `width` wide
    pub fn random<R: Rng + ?Sized>(rng: &mut R, player_id: PlayerId, width: usize) -> Self {
        Self::new(
            ShapeKind::random(rng),
            player_id,
            (width / 2) as i32,
            0,
            Rotation::SPAWN,
        )
    }

    pub fn coordinates(&self) -> [Offset; 4] {
        self.kind.offsets(self.rotation)
    }

    /// Offsets this shape would occupy at a hypothetical rotation
    pub fn coordinates_at(&self, rotation: Rotation) -> [Offset; 4] {
        self.kind.offsets(rotation)
    }

    /// Absolute `(row, col)` of every occupied cell at the shape's own placement
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.coordinates()
            .into_iter()
            .map(move |(dx, dy)| (self.row + dy, self.col + dx))
    }
}
