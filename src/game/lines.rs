//! Row clearing by fill threshold.
//!
//! Cleared rows are only emptied; the sand simulator closes the gap.

use super::grid::Grid;
use log::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearRule {
    /// Percentage of a row (1..=100) that must be occupied.
    pub threshold_pct: u8,
    pub points_per_row: u32,
}

impl Default for ClearRule {
    fn default() -> Self {
        Self {
            threshold_pct: 95,
            points_per_row: 100,
        }
    }
}

impl ClearRule {
    /// Minimum occupied cells for a row of `width` to qualify (never below 1).
    pub fn required_cells(&self, width: usize) -> usize {
        let pct = usize::from(self.threshold_pct.clamp(1, 100));
        (width * pct).div_ceil(100).max(1)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClearReport {
    /// Emptied rows, floor first.
    pub rows: Vec<usize>,
    pub points: u32,
}

impl ClearReport {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Empties every row at or above the threshold, each scored independently.
pub fn clear_lines(grid: &mut Grid, rule: &ClearRule) -> ClearReport {
    let need = rule.required_cells(grid.width());
    let mut report = ClearReport::default();
    for y in 0..grid.height() {
        if grid.row_occupancy(y) >= need {
            grid.clear_row(y);
            report.rows.push(y);
            report.points = report.points.saturating_add(rule.points_per_row);
        }
    }
    if !report.is_empty() {
        info!("cleared rows {:?} for {} points", report.rows, report.points);
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::grid::{Cell, ColorId};

    fn fill(grid: &mut Grid, y: i32, n: i32) {
        for x in 0..n {
            grid.set(x, y, Cell::Occupied(ColorId(3)));
        }
    }

    #[test]
    fn test_required_cells() {
        let full = ClearRule {
            threshold_pct: 100,
            points_per_row: 100,
        };
        assert_eq!(full.required_cells(10), 10);
        let r = ClearRule::default();
        assert_eq!(r.required_cells(10), 10);
        assert_eq!(r.required_cells(40), 38);
        assert_eq!(r.required_cells(192), 183);
        let low = ClearRule {
            threshold_pct: 0,
            points_per_row: 1,
        };
        assert_eq!(low.required_cells(10), 1);
    }

    #[test]
    fn test_clears_qualifying_rows_only() {
        let mut grid = Grid::new(40, 6);
        fill(&mut grid, 0, 40);
        fill(&mut grid, 1, 38);
        fill(&mut grid, 2, 37);
        let report = clear_lines(&mut grid, &ClearRule::default());
        assert_eq!(report.rows, vec![0, 1]);
        assert_eq!(report.points, 200);
        assert_eq!(grid.row_occupancy(0), 0);
        assert_eq!(grid.row_occupancy(1), 0);
        assert_eq!(grid.row_occupancy(2), 37);
    }

    #[test]
    fn test_no_rows_no_points() {
        let mut grid = Grid::new(10, 4);
        fill(&mut grid, 0, 9);
        let report = clear_lines(&mut grid, &ClearRule::default());
        assert!(report.is_empty());
        assert_eq!(report.points, 0);
        assert_eq!(grid.occupied_count(), 9);
    }
}
