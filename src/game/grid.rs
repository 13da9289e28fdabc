//! Occupancy grid shared by the piece controller and the sand simulator.
//!
//! Storage is row-major (`y * width + x`). `y = 0` is the floor and increasing
//! `y` goes up, so gravity always moves particles towards smaller `y`.

/// Opaque colour token carried by an occupied cell. The host maps it to a
/// real colour; the core only compares it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorId(pub u8);

/// Single cell: either empty or a sand particle of a given colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Occupied(ColorId),
}

impl Cell {
    #[inline]
    pub const fn is_empty(self) -> bool {
        matches!(self, Self::Empty)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::Empty; width * height],
        }
    }

    #[inline]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Every cell, row-major from the floor up.
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn clear(&mut self) {
        self.cells.fill(Cell::Empty);
    }

    #[inline]
    pub const fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// True only for in-bounds empty cells; out of range counts as blocked.
    #[inline]
    pub fn is_empty(&self, x: i32, y: i32) -> bool {
        self.get(x, y).is_some_and(Cell::is_empty)
    }

    /// `None` when out of range; renderers treat that as empty.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        if self.in_bounds(x, y) {
            Some(self.cells[self.index(x as usize, y as usize)])
        } else {
            None
        }
    }

    /// Writes are silently dropped when out of range.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) {
        if self.in_bounds(x, y) {
            let i = self.index(x as usize, y as usize);
            self.cells[i] = cell;
        }
    }

    #[inline]
    pub(crate) const fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// Raw access for the simulator; caller guarantees the index is valid.
    #[inline]
    pub(crate) fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// Occupied cells in row `y` (0 when out of range).
    pub fn row_occupancy(&self, y: usize) -> usize {
        if y >= self.height {
            return 0;
        }
        let start = y * self.width;
        self.cells[start..start + self.width]
            .iter()
            .filter(|c| !c.is_empty())
            .count()
    }

    pub fn clear_row(&mut self, y: usize) {
        if y < self.height {
            let start = y * self.width;
            self.cells[start..start + self.width].fill(Cell::Empty);
        }
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_empty()).count()
    }
}
