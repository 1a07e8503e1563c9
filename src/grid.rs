// ============================================================================
// Configuration
// ============================================================================

pub const GRID_ROWS: usize = 20;
pub const GRID_COLUMNS: usize = 10;

/// Cell occupancy value. `EMPTY` is a free cell; anything else is the id of
/// the piece kind that locked there.
pub type Cell = u8;

pub const EMPTY: Cell = 0;

/// Largest edge a grid may have; piece coordinates are `i16`.
pub const MAX_DIMENSION: usize = 1024;

// ============================================================================
// Grid
// ============================================================================

/// Fixed-size playfield. Row 0 is the top; dimensions never change after
/// construction.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Grid {
    columns: usize,
    cells: Vec<Vec<Cell>>,
}

impl Grid {
    pub fn new(rows: usize, columns: usize) -> Self {
        assert!(rows > 0 && columns > 0, "grid must have at least one cell");
        assert!(
            rows <= MAX_DIMENSION && columns <= MAX_DIMENSION,
            "grid edges are limited to {}",
            MAX_DIMENSION
        );
        Self {
            columns,
            cells: vec![vec![EMPTY; columns]; rows],
        }
    }

    /// Builds a grid from explicit rows. Every row must have the same width.
    pub fn from_rows(cells: Vec<Vec<Cell>>) -> Self {
        let columns = cells.first().map_or(0, Vec::len);
        assert!(columns > 0, "grid must have at least one cell");
        assert!(
            cells.iter().all(|row| row.len() == columns),
            "grid rows must all be {} wide",
            columns
        );
        assert!(
            cells.len() <= MAX_DIMENSION && columns <= MAX_DIMENSION,
            "grid edges are limited to {}",
            MAX_DIMENSION
        );
        Self { columns, cells }
    }

    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Panics if `row` or `col` is out of range; callers go through the
    /// collision check first.
    pub fn cell_at(&self, row: usize, col: usize) -> Cell {
        self.cells[row][col]
    }

    pub fn set_cell(&mut self, row: usize, col: usize, value: Cell) {
        self.cells[row][col] = value;
    }

    pub fn row(&self, row: usize) -> &[Cell] {
        &self.cells[row]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.iter().map(Vec::as_slice)
    }

    pub fn is_row_full(&self, row: usize) -> bool {
        self.cells[row].iter().all(|&cell| cell != EMPTY)
    }

    pub fn filled_count_in_row(&self, row: usize) -> usize {
        self.cells[row].iter().filter(|&&cell| cell != EMPTY).count()
    }

    pub fn total_filled_cells(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|&&cell| cell != EMPTY)
            .count()
    }

    /// Removes every full row, bottom to top, and returns how many went.
    ///
    /// Each full row is removed in place: everything above it slides down one
    /// row and row 0 becomes empty. The same index is then checked again,
    /// since the row that slid into it may be full as well.
    pub fn clear_full_rows(&mut self) -> u32 {
        let mut cleared = 0;
        let mut row = self.rows();

        while row > 0 {
            let y = row - 1;
            if self.is_row_full(y) {
                for shifted in (1..=y).rev() {
                    let (above, below) = self.cells.split_at_mut(shifted);
                    below[0].copy_from_slice(&above[shifted - 1]);
                }
                self.cells[0].fill(EMPTY);
                cleared += 1;
                // Don't move up - the row above has shifted into this position
            } else {
                row -= 1;
            }
        }

        cleared
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(GRID_ROWS, GRID_COLUMNS)
    }
}
