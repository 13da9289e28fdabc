//! Placement checks, movement, rotation with wall kicks, and locking.

use super::grid::{Cell, Grid};
use super::piece::{ActivePiece, Shape};
use log::debug;

/// True when every cell `shape` would cover at `(x, y)` is in bounds and
/// empty. An empty shape always fits.
pub fn is_valid(grid: &Grid, x: i32, y: i32, shape: &Shape, unit: i32) -> bool {
    ActivePiece::footprint(shape, x, y, unit).all(|(cx, cy)| grid.is_empty(cx, cy))
}

impl ActivePiece {
    /// Shifts the anchor by `(dx, dy)` cells if the target is valid.
    pub fn try_move(&mut self, grid: &Grid, dx: i32, dy: i32) -> bool {
        let (nx, ny) = (self.x + dx, self.y + dy);
        if is_valid(grid, nx, ny, &self.shape, self.unit) {
            self.x = nx;
            self.y = ny;
            true
        } else {
            false
        }
    }

    /// Rotates clockwise, trying the current anchor, then one unit left,
    /// then one unit right. Leaves the piece untouched if none fit.
    pub fn try_rotate(&mut self, grid: &Grid) -> bool {
        let rotated = self.shape.rotated();
        for kick in [0, -self.unit, self.unit] {
            let nx = self.x + kick;
            if is_valid(grid, nx, self.y, &rotated, self.unit) {
                self.x = nx;
                self.shape = rotated;
                return true;
            }
        }
        false
    }

    /// Slides down one cell at a time until blocked. Returns cells travelled.
    /// Locking is left to the caller.
    pub fn drop_to_floor(&mut self, grid: &Grid) -> u32 {
        let mut travelled = 0;
        while self.try_move(grid, 0, -1) {
            travelled += 1;
        }
        travelled
    }

    /// Writes the piece colour into every covered cell. Cells outside the
    /// grid are skipped. Returns how many cells were written.
    pub fn lock(&self, grid: &mut Grid) -> usize {
        let mut written = 0;
        for (x, y) in self.cells() {
            if grid.in_bounds(x, y) {
                grid.set(x, y, Cell::Occupied(self.color));
                written += 1;
            }
        }
        debug!("lock {:?} at ({}, {}): {written} cells", self.kind, self.x, self.y);
        written
    }
}

/// Drops `piece` to its resting position and locks it into `grid`.
pub fn hard_drop(grid: &mut Grid, piece: &mut ActivePiece) -> u32 {
    let travelled = piece.drop_to_floor(grid);
    piece.lock(grid);
    travelled
}
