//! Placed-cell grid: collision tests, grounding and line clearing

use crate::shape::{Rotation, Shape};
use crate::PlayerId;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Owner of a grounded block, `None` when empty
pub type Cell = Option<PlayerId>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("cell ({row}, {col}) lies outside the {width}x{height} grid")]
    OutOfBounds {
        row: i32,
        col: i32,
        width: usize,
        height: usize,
    },
    #[error("grid contents do not match the declared {width}x{height} size")]
    Dimensions { width: usize, height: usize },
}

/// Wire form of a grid, as carried by `UpdateMap`
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GridSnapshot {
    width: usize,
    height: usize,
    map: Vec<Vec<Cell>>,
}

/// Row-major grid of grounded cells
///
/// Row 0 is the top of the board. The row count never changes: clearing a
/// row inserts a fresh empty one at the top.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GridSnapshot", into = "GridSnapshot")]
pub struct GridMap {
    width: usize,
    height: usize,
    rows: Vec<Vec<Cell>>,
}

impl TryFrom<GridSnapshot> for GridMap {
    type Error = GridError;

    fn try_from(snapshot: GridSnapshot) -> Result<Self, Self::Error> {
        let consistent = snapshot.map.len() == snapshot.height
            && snapshot.map.iter().all(|row| row.len() == snapshot.width);
        if !consistent {
            return Err(GridError::Dimensions {
                width: snapshot.width,
                height: snapshot.height,
            });
        }

        Ok(Self {
            width: snapshot.width,
            height: snapshot.height,
            rows: snapshot.map,
        })
    }
}

impl From<GridMap> for GridSnapshot {
    fn from(grid: GridMap) -> Self {
        Self {
            width: grid.width,
            height: grid.height,
            map: grid.rows,
        }
    }
}

impl GridMap {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            rows: vec![vec![None; width]; height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Owner of the block at `(row, col)`, if any
    pub fn owner_at(&self, row: usize, col: usize) -> Cell {
        self.rows.get(row).and_then(|r| r.get(col)).copied().flatten()
    }

    /// Writes a single grounded block
    pub fn place(&mut self, row: usize, col: usize, owner: PlayerId) -> Result<(), GridError> {
        let (width, height) = (self.width, self.height);
        let cell = self
            .rows
            .get_mut(row)
            .and_then(|r| r.get_mut(col))
            .ok_or(GridError::OutOfBounds {
                row: row as i32,
                col: col as i32,
                width,
                height,
            })?;
        *cell = Some(owner);
        Ok(())
    }

    /// True iff `shape` fits at its own placement
    pub fn fits(&self, shape: &Shape) -> bool {
        self.fits_at(shape, shape.row, shape.col, shape.rotation)
    }

    /// True iff `shape` would fit at the given placement
    ///
    /// Every occupied cell must lie within the column bounds and above the
    /// bottom edge, and must not cover a grounded block. Cells above row 0
    /// are allowed.
    pub fn fits_at(&self, shape: &Shape, row: i32, col: i32, rotation: Rotation) -> bool {
        shape.coordinates_at(rotation).iter().all(|&(dx, dy)| {
            let (Some(c), Some(r)) = (col.checked_add(dx), row.checked_add(dy)) else {
                return false;
            };
            c >= 0
                && (c as usize) < self.width
                && r < self.height as i32
                && (r < 0 || self.rows[r as usize][c as usize].is_none())
        })
    }

    /// Moves `shape` down as far as it fits, then grounds it
    ///
    /// Returns `Ok(false)` without touching the grid when the shape already
    /// conflicts with it.
    pub fn drop_shape(&mut self, shape: &mut Shape) -> Result<bool, GridError> {
        if !self.fits(shape) {
            warn!(
                "Shape of player {} conflicts with the grid before dropping; ignoring",
                shape.player_id
            );
            return Ok(false);
        }

        while self.fits_at(shape, shape.row + 1, shape.col, shape.rotation) {
            shape.row += 1;
        }

        self.ground(shape)?;
        Ok(true)
    }

    /// Writes every cell of `shape` into the grid under its owner
    ///
    /// All cells are bounds-checked before any is written, so a failure leaves
    /// the grid unchanged.
    pub fn ground(&mut self, shape: &Shape) -> Result<(), GridError> {
        let mut cells = Vec::with_capacity(4);
        for (row, col) in shape.cells() {
            if row < 0 || col < 0 || row >= self.height as i32 || col >= self.width as i32 {
                return Err(GridError::OutOfBounds {
                    row,
                    col,
                    width: self.width,
                    height: self.height,
                });
            }
            cells.push((row as usize, col as usize));
        }

        for (row, col) in cells {
            self.rows[row][col] = Some(shape.player_id);
        }
        Ok(())
    }

    pub fn is_row_full(&self, row: usize) -> bool {
        self.rows
            .get(row)
            .map_or(false, |r| r.iter().all(Option::is_some))
    }

    /// Removes every full row, shifting the rows above it down
    ///
    /// Returns the number of rows removed.
    pub fn clear_full_rows(&mut self) -> usize {
        let before = self.rows.len();
        self.rows.retain(|r| !r.iter().all(Option::is_some));
        let cleared = before - self.rows.len();

        for _ in 0..cleared {
            self.rows.insert(0, vec![None; self.width]);
        }
        cleared
    }

    /// Number of grounded blocks owned by each player
    pub fn blocks_per_player(&self) -> HashMap<PlayerId, usize> {
        let mut counts = HashMap::new();
        for owner in self.rows.iter().flatten().flatten() {
            *counts.entry(*owner).or_insert(0) += 1;
        }
        counts
    }

    /// Empties the grid, keeping its dimensions
    pub fn reset(&mut self) {
        self.rows = vec![vec![None; self.width]; self.height];
    }
}
