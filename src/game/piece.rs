//! Tetromino shapes, rotation and the falling piece.

use super::grid::ColorId;
use log::debug;
use rand::Rng;

/// The seven tetromino kinds. Order is fixed: index `i` owns colour `i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
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
    pub const ALL: [Self; 7] = [Self::I, Self::J, Self::L, Self::O, Self::S, Self::T, Self::Z];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Colour paired with this kind. Shape and colour are drawn together.
    #[inline]
    pub const fn color(self) -> ColorId {
        ColorId(self as u8)
    }

    /// Spawn matrix, row 0 first. Row 0 is the lowest row on the grid.
    fn rows(self) -> &'static [&'static [u8]] {
        match self {
            Self::I => &[&[1, 1, 1, 1]],
            Self::J => &[&[1, 0, 0], &[1, 1, 1]],
            Self::L => &[&[0, 0, 1], &[1, 1, 1]],
            Self::O => &[&[1, 1], &[1, 1]],
            Self::S => &[&[0, 1, 1], &[1, 1, 0]],
            Self::T => &[&[0, 1, 0], &[1, 1, 1]],
            Self::Z => &[&[1, 1, 0], &[0, 1, 1]],
        }
    }

    pub fn shape(self) -> Shape {
        Shape::from_rows(self.rows())
    }
}

/// Immutable occupancy matrix of a piece. Rotating yields a new `Shape`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shape {
    rows: usize,
    cols: usize,
    filled: Vec<bool>,
}

impl Shape {
    /// Builds a shape from 0/1 rows. Ragged rows are padded with empty cells.
    pub fn from_rows(rows: &[&[u8]]) -> Self {
        let cols = rows.iter().map(|r| r.len()).max().unwrap_or(0);
        let mut filled = vec![false; rows.len() * cols];
        for (r, row) in rows.iter().enumerate() {
            for (c, &v) in row.iter().enumerate() {
                filled[r * cols + c] = v != 0;
            }
        }
        Self {
            rows: rows.len(),
            cols,
            filled,
        }
    }

    #[inline]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn is_filled(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols && self.filled[row * self.cols + col]
    }

    /// `(row, col)` of every occupied sub-cell.
    pub fn filled_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let cols = self.cols;
        self.filled
            .iter()
            .enumerate()
            .filter(|&(_, &f)| f)
            .map(move |(i, _)| (i / cols, i % cols))
    }

    pub fn filled_count(&self) -> usize {
        self.filled.iter().filter(|&&f| f).count()
    }

    /// Clockwise quarter turn about the top-left origin:
    /// `new[c][rows - 1 - r] = old[r][c]`.
    #[must_use]
    pub fn rotated(&self) -> Self {
        let (rows, cols) = (self.rows, self.cols);
        let mut filled = vec![false; rows * cols];
        for r in 0..rows {
            for c in 0..cols {
                // new matrix is cols x rows
                filled[c * rows + (rows - 1 - r)] = self.filled[r * cols + c];
            }
        }
        Self {
            rows: cols,
            cols: rows,
            filled,
        }
    }
}

/// The falling piece. Anchor and sizes are in grid cells; each shape
/// sub-cell covers `unit x unit` cells starting at
/// `(x + col * unit, y + row * unit)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivePiece {
    pub kind: ShapeKind,
    pub shape: Shape,
    pub color: ColorId,
    pub x: i32,
    pub y: i32,
    pub unit: i32,
}

impl ActivePiece {
    /// Draws a kind uniformly and places it. Validity is not checked here.
    pub fn spawn<R: Rng + ?Sized>(rng: &mut R, width: usize, height: usize, unit: i32) -> Self {
        let kind = ShapeKind::ALL[rng.gen_range(0..ShapeKind::ALL.len())];
        Self::spawn_kind(kind, width, height, unit)
    }

    /// Centred horizontally, top row just under the ceiling.
    pub fn spawn_kind(kind: ShapeKind, width: usize, height: usize, unit: i32) -> Self {
        let shape = kind.shape();
        let x = width as i32 / 2 - (shape.cols() as i32 * unit) / 2;
        let y = height as i32 - 1 - shape.rows() as i32 * unit;
        debug!("spawn {kind:?} at ({x}, {y})");
        Self {
            kind,
            color: kind.color(),
            shape,
            x,
            y,
            unit,
        }
    }

    /// Absolute grid cells covered by `shape` anchored at `(x, y)`.
    pub fn footprint(shape: &Shape, x: i32, y: i32, unit: i32) -> impl Iterator<Item = (i32, i32)> + '_ {
        shape.filled_cells().flat_map(move |(r, c)| {
            let ox = x + c as i32 * unit;
            let oy = y + r as i32 * unit;
            (0..unit).flat_map(move |dy| (0..unit).map(move |dx| (ox + dx, oy + dy)))
        })
    }

    /// Cells this piece covers at its current position.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        Self::footprint(&self.shape, self.x, self.y, self.unit)
    }
}
