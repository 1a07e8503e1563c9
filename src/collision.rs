use crate::grid::{Cell, Grid, EMPTY};
use crate::piece::Piece;

/// Reports whether `candidate`, placed at the piece's origin shifted by
/// `(dx, dy)`, would hit a wall, the floor, or a locked cell.
///
/// Cells above row 0 are allowed: only the side walls and the floor bound a
/// piece, so part of its matrix may hang over the top of the grid.
pub fn collides(grid: &Grid, piece: &Piece, dx: i16, dy: i16, candidate: &[Vec<Cell>]) -> bool {
    // Grid edges are capped at `MAX_DIMENSION`, well inside `i16`
    let columns = grid.columns() as i16;
    let rows = grid.rows() as i16;

    for (r, row) in candidate.iter().enumerate() {
        for (c, &value) in row.iter().enumerate() {
            if value == EMPTY {
                continue;
            }
            let x = piece.origin.x + c as i16 + dx;
            let y = piece.origin.y + r as i16 + dy;

            if x < 0 || x >= columns || y >= rows {
                return true;
            }
            if y >= 0 && grid.cell_at(y as usize, x as usize) != EMPTY {
                return true;
            }
        }
    }
    false
}
