//! Property tests for the grid, shapes, placement, sand and row clearing.

use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use sandfall::game::{
    ActivePiece, Cell, ClearRule, ColorId, Grid, SandSimulator, Shape, ShapeKind, clear_lines,
    is_valid,
};
use std::collections::HashSet;

fn arb_kind() -> impl Strategy<Value = ShapeKind> {
    prop::sample::select(ShapeKind::ALL.to_vec())
}

fn filled_set(shape: &Shape) -> HashSet<(usize, usize)> {
    shape.filled_cells().collect()
}

#[test]
fn shapes_are_distinct() {
    let shapes: HashSet<Shape> = ShapeKind::ALL.iter().map(|k| k.shape()).collect();
    assert_eq!(shapes.len(), 7);
}

#[test]
fn rotation_cycle_lengths() {
    let expected = [
        (ShapeKind::I, 2),
        (ShapeKind::J, 4),
        (ShapeKind::L, 4),
        (ShapeKind::O, 1),
        (ShapeKind::S, 2),
        (ShapeKind::T, 4),
        (ShapeKind::Z, 2),
    ];
    for (kind, cycle) in expected {
        let start = kind.shape();
        let mut s = start.rotated();
        let mut n = 1;
        while s != start {
            s = s.rotated();
            n += 1;
            assert!(n <= 4, "{kind:?} did not return after 4 turns");
        }
        assert_eq!(n, cycle, "{kind:?}");
        let mut four = start.clone();
        for _ in 0..4 {
            four = four.rotated();
        }
        assert_eq!(filled_set(&four), filled_set(&start));
    }
}

#[test]
fn particle_in_empty_column_reaches_floor_in_height_minus_one_ticks() {
    let (w, h) = (7, 15);
    let mut grid = Grid::new(w, h);
    let mut sim = SandSimulator::new();
    let mut rng = StdRng::seed_from_u64(3);
    let sand = Cell::Occupied(ColorId(4));
    grid.set(3, h as i32 - 1, sand);
    for tick in 1..h {
        assert_eq!(sim.tick(&mut grid, &mut rng), 1, "tick {tick}");
        assert_eq!(grid.get(3, (h - 1 - tick) as i32), Some(sand));
    }
    assert_eq!(grid.get(3, 0), Some(sand));
    let settled = grid.clone();
    assert_eq!(sim.tick(&mut grid, &mut rng), 0);
    assert_eq!(grid, settled);
}

proptest! {
    #[test]
    fn cleared_grid_is_empty_everywhere(w in 4usize..40, h in 4usize..40, seed in any::<u64>()) {
        let mut grid = Grid::new(w, h);
        let mut rng = StdRng::seed_from_u64(seed);
        for _ in 0..(w * h / 3) {
            let x = rand::Rng::gen_range(&mut rng, 0..w as i32);
            let y = rand::Rng::gen_range(&mut rng, 0..h as i32);
            grid.set(x, y, Cell::Occupied(ColorId(2)));
        }
        grid.clear();
        for y in 0..h as i32 {
            for x in 0..w as i32 {
                prop_assert!(grid.is_empty(x, y));
            }
        }
    }

    #[test]
    fn spawn_fits_on_empty_grid(kind in arb_kind(), w in 4usize..48, h in 4usize..48) {
        let grid = Grid::new(w, h);
        let p = ActivePiece::spawn_kind(kind, w, h, 1);
        prop_assert!(is_valid(&grid, p.x, p.y, &p.shape, p.unit));
    }

    #[test]
    fn scaled_spawn_fits_on_empty_grid(kind in arb_kind(), unit in 1usize..6, extra_w in 0usize..20, extra_h in 0usize..20) {
        let (w, h) = (4 * unit + extra_w, 4 * unit + extra_h);
        let grid = Grid::new(w, h);
        let p = ActivePiece::spawn_kind(kind, w, h, unit as i32);
        prop_assert!(is_valid(&grid, p.x, p.y, &p.shape, p.unit));
    }

    #[test]
    fn lock_writes_exactly_the_shape(kind in arb_kind(), turns in 0usize..4, unit in 1i32..4) {
        let (w, h) = (24, 24);
        let mut grid = Grid::new(w, h);
        let mut p = ActivePiece::spawn_kind(kind, w, h, unit);
        p.y = 2;
        for _ in 0..turns {
            prop_assert!(p.try_rotate(&grid));
        }
        let written = p.lock(&mut grid);
        let expected = p.shape.filled_count() * (unit * unit) as usize;
        prop_assert_eq!(written, expected);
        prop_assert_eq!(grid.occupied_count(), expected);
        prop_assert!(grid.cells().iter().all(|c| c.is_empty() || *c == Cell::Occupied(kind.color())));
    }

    #[test]
    fn fully_blocked_particle_never_moves(
        x in 1i32..9,
        y in 1i32..9,
        seed in any::<u64>(),
        ticks in 1usize..6,
    ) {
        let mut grid = Grid::new(10, 10);
        let mut sim = SandSimulator::new();
        let mut rng = StdRng::seed_from_u64(seed);
        let particle = Cell::Occupied(ColorId(5));
        let wall = Cell::Occupied(ColorId(0));
        // solid floor so the supports never slide away
        for yy in 0..y {
            for xx in 0..10 {
                grid.set(xx, yy, wall);
            }
        }
        grid.set(x, y, particle);
        for _ in 0..ticks {
            sim.tick(&mut grid, &mut rng);
            prop_assert_eq!(grid.get(x, y), Some(particle));
        }
    }

    #[test]
    fn sand_tick_conserves_particles(seed in any::<u64>(), density in 1u32..90) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut grid = Grid::new(16, 16);
        for y in 0..16 {
            for x in 0..16 {
                if rand::Rng::gen_range(&mut rng, 0..100) < density {
                    grid.set(x, y, Cell::Occupied(ColorId((x % 7) as u8)));
                }
            }
        }
        let mut sim = SandSimulator::new();
        let before = grid.occupied_count();
        for _ in 0..20 {
            sim.tick(&mut grid, &mut rng);
            prop_assert_eq!(grid.occupied_count(), before);
        }
    }

    #[test]
    fn threshold_boundary(width in 4usize..200, pct in 1u8..=100) {
        let rule = ClearRule { threshold_pct: pct, points_per_row: 100 };
        let need = rule.required_cells(width);
        let mut grid = Grid::new(width, 2);
        for x in 0..need {
            grid.set(x as i32, 0, Cell::Occupied(ColorId(1)));
        }
        for x in 0..need - 1 {
            grid.set(x as i32, 1, Cell::Occupied(ColorId(1)));
        }
        let report = clear_lines(&mut grid, &rule);
        prop_assert_eq!(report.rows, vec![0]);
        prop_assert_eq!(report.points, 100);
        prop_assert_eq!(grid.row_occupancy(0), 0);
        prop_assert_eq!(grid.row_occupancy(1), need - 1);
    }
}
