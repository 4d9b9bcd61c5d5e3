#![no_std]

/// The eight three-in-a-row patterns of a 3x3 board, as flat row-major indices.
///
/// Rows first, then columns, then the two diagonals.
pub const LINES_3X3: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Dimensions of a rectangular board stored as a flat row-major slice.
///
/// All neighbour lookups go through row/column arithmetic so that a step off
/// the left or right edge never wraps around into the adjacent row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    pub width: usize,
    pub height: usize,
}

impl Grid {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Total number of cells.
    pub const fn len(&self) -> usize {
        self.width * self.height
    }

    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Splits a flat index into `(row, col)`.
    pub const fn row_col(&self, index: usize) -> (usize, usize) {
        (index / self.width, index % self.width)
    }

    /// Joins `(row, col)` into a flat index, or `None` when outside the grid.
    pub const fn index(&self, row: usize, col: usize) -> Option<usize> {
        if row < self.height && col < self.width {
            Some(row * self.width + col)
        } else {
            None
        }
    }

    /// Returns the index `dr` rows and `dc` columns away from `index`.
    ///
    /// # Arguments
    /// * `index` - Starting cell
    /// * `dr` - Row delta (negative is up)
    /// * `dc` - Column delta (negative is left)
    ///
    /// # Returns
    /// `None` if the start is off the grid or the target falls outside it
    pub fn offset(&self, index: usize, dr: i32, dc: i32) -> Option<usize> {
        if index >= self.len() {
            return None;
        }
        let (row, col) = self.row_col(index);
        let r = row as i32 + dr;
        let c = col as i32 + dc;
        if r < 0 || c < 0 {
            return None;
        }
        self.index(r as usize, c as usize)
    }
}

/// Returns the value owning a complete line, scanning `lines` in order.
///
/// # Arguments
/// * `cells` - The board as a flat slice
/// * `lines` - Index triples to test, e.g. [`LINES_3X3`]
pub fn line_owner<T: Copy + PartialEq>(cells: &[Option<T>], lines: &[[usize; 3]]) -> Option<T> {
    for &[a, b, c] in lines {
        if let (Some(x), Some(y), Some(z)) = (cells[a], cells[b], cells[c]) {
            if x == y && y == z {
                return Some(x);
            }
        }
    }
    None
}
