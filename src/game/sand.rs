//! Sand settling: one buffered sweep per tick.
//!
//! Every tick reads particles from a snapshot taken at the start of the tick
//! and writes into the live grid, so a particle moves at most one row per
//! tick. A destination must be empty in both, so a cell filled earlier in the
//! sweep is closed and the particle tries its diagonals instead.

use super::grid::{Cell, Grid};
use log::trace;
use rand::Rng;

/// Holds the snapshot buffer between ticks so it is allocated once.
#[derive(Debug, Default, Clone)]
pub struct SandSimulator {
    before: Vec<Cell>,
    ticks: u64,
}

impl SandSimulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticks run since creation.
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Advances every particle at most one row. Returns how many moved.
    ///
    /// Rows are visited from the floor up and columns left to right. For the
    /// particle above each visited cell: fall straight down if open, else
    /// slide to an open lower diagonal (coin flip when both are open), else
    /// stay. A destination is open when it was empty in the snapshot and has
    /// not been filled earlier in this sweep.
    pub fn tick<R: Rng + ?Sized>(&mut self, grid: &mut Grid, rng: &mut R) -> usize {
        self.ticks = self.ticks.wrapping_add(1);
        let (w, h) = (grid.width(), grid.height());
        self.before.clear();
        self.before.extend_from_slice(grid.cells());

        let before = self.before.as_slice();
        let live = grid.cells_mut();

        let mut moved = 0;
        for y in 0..h.saturating_sub(1) {
            for x in 0..w {
                let below = y * w + x;
                let src = below + w;
                let particle = before[src];
                if particle.is_empty() {
                    continue;
                }

                let dst = if open(before, live, below) {
                    Some(below)
                } else {
                    let left = (x > 0 && open(before, live, below - 1)).then(|| below - 1);
                    let right = (x + 1 < w && open(before, live, below + 1)).then(|| below + 1);
                    match (left, right) {
                        (Some(l), Some(r)) => Some(if rng.gen_bool(0.5) { l } else { r }),
                        (l, r) => l.or(r),
                    }
                };

                if let Some(dst) = dst {
                    live[src] = Cell::Empty;
                    live[dst] = particle;
                    moved += 1;
                }
            }
        }
        trace!("sand tick {}: {moved} moved", self.ticks);
        moved
    }
}

#[inline]
fn open(before: &[Cell], live: &[Cell], i: usize) -> bool {
    before[i].is_empty() && live[i].is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::grid::ColorId;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const SAND: Cell = Cell::Occupied(ColorId(1));

    #[test]
    fn test_particle_falls_one_row_per_tick() {
        let mut grid = Grid::new(3, 5);
        let mut sim = SandSimulator::new();
        let mut rng = StdRng::seed_from_u64(1);
        grid.set(1, 4, SAND);
        assert_eq!(sim.tick(&mut grid, &mut rng), 1);
        assert_eq!(grid.get(1, 3), Some(SAND));
        assert!(grid.is_empty(1, 4));
        assert!(grid.is_empty(1, 2));
        assert_eq!(sim.ticks(), 1);
    }

    #[test]
    fn test_stacked_column_does_not_chain_fall() {
        let mut grid = Grid::new(1, 4);
        let mut sim = SandSimulator::new();
        let mut rng = StdRng::seed_from_u64(1);
        grid.set(0, 2, SAND);
        grid.set(0, 3, SAND);
        sim.tick(&mut grid, &mut rng);
        // lower one moved into row 1; upper one saw row 2 occupied in the snapshot
        assert!(!grid.is_empty(0, 1));
        assert!(grid.is_empty(0, 2));
        assert!(!grid.is_empty(0, 3));
    }

    #[test]
    fn test_slides_to_only_open_diagonal() {
        let mut grid = Grid::new(3, 2);
        let mut sim = SandSimulator::new();
        let mut rng = StdRng::seed_from_u64(3);
        grid.set(0, 0, SAND);
        grid.set(1, 0, SAND);
        grid.set(1, 1, SAND);
        sim.tick(&mut grid, &mut rng);
        assert_eq!(grid.get(2, 0), Some(SAND));
        assert!(grid.is_empty(1, 1));
    }

    #[test]
    fn test_edge_column_only_checks_inward_diagonal() {
        let mut grid = Grid::new(2, 2);
        let mut sim = SandSimulator::new();
        let mut rng = StdRng::seed_from_u64(3);
        grid.set(0, 0, SAND);
        grid.set(0, 1, SAND);
        grid.set(1, 0, SAND);
        assert_eq!(sim.tick(&mut grid, &mut rng), 0);
    }

    #[test]
    fn test_coin_flip_uses_both_sides() {
        let mut left = 0;
        let mut right = 0;
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let mut grid = Grid::new(3, 2);
            let mut sim = SandSimulator::new();
            grid.set(1, 0, SAND);
            grid.set(1, 1, SAND);
            sim.tick(&mut grid, &mut rng);
            if !grid.is_empty(0, 0) {
                left += 1;
            }
            if !grid.is_empty(2, 0) {
                right += 1;
            }
        }
        assert_eq!(left + right, 200);
        assert!(left > 50 && right > 50);
    }

    #[test]
    fn test_claimed_destination_is_not_overwritten() {
        // (0,1) slides right into (1,0); (1,1) then finds (1,0) taken and
        // must not overwrite it.
        let mut grid = Grid::new(3, 2);
        let mut sim = SandSimulator::new();
        let mut rng = StdRng::seed_from_u64(9);
        grid.set(0, 0, SAND);
        grid.set(0, 1, Cell::Occupied(ColorId(2)));
        grid.set(1, 1, Cell::Occupied(ColorId(3)));
        let before = grid.occupied_count();
        sim.tick(&mut grid, &mut rng);
        assert_eq!(grid.occupied_count(), before);
        assert_eq!(grid.get(1, 0), Some(Cell::Occupied(ColorId(2))));
        assert_eq!(grid.get(2, 0), Some(Cell::Occupied(ColorId(3))));
    }
}
