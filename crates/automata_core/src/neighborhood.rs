//! Moore-neighborhood counting.
//!
//! The neighborhood is the 8 cells around a position. Edges are clipped:
//! offsets that fall outside the grid are skipped, never wrapped.

use crate::grid::{Grid, State};

/// Moore neighborhood offsets as (d_row, d_col), center excluded.
/// ```text
/// 1 1 1
/// 1 0 1
/// 1 1 1
/// ```
pub const MOORE_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Largest count `count_matching` can return.
pub const MAX_NEIGHBORS: u32 = MOORE_OFFSETS.len() as u32;

/// Iterate over the in-bounds Moore neighbors of (row, col).
pub fn moore_neighbors(grid: &Grid, row: usize, col: usize) -> impl Iterator<Item = State> + '_ {
    let rows = grid.rows() as i32;
    let cols = grid.cols() as i32;
    let (r, c) = (row as i32, col as i32);

    MOORE_OFFSETS.iter().filter_map(move |&(dr, dc)| {
        let nr = r + dr;
        let nc = c + dc;
        if nr < 0 || nc < 0 || nr >= rows || nc >= cols {
            return None;
        }
        grid.get(nr as usize, nc as usize)
    })
}

/// Count the neighbors of (row, col) currently in `target_state`.
///
/// Returns a value in `[0, 8]`. Corner cells only have 3 in-bounds
/// neighbors and edge cells 5.
pub fn count_matching(grid: &Grid, row: usize, col: usize, target_state: State) -> u32 {
    moore_neighbors(grid, row, col)
        .filter(|&s| s == target_state)
        .count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(rows: usize, cols: usize, state: State) -> Grid {
        Grid::new(rows, cols, &[0, 1, 2], state).unwrap()
    }

    #[test]
    fn test_center_of_full_grid_sees_eight() {
        let grid = filled(3, 3, 1);
        assert_eq!(count_matching(&grid, 1, 1, 1), 8);
        assert_eq!(count_matching(&grid, 1, 1, 0), 0);
    }

    #[test]
    fn test_corner_of_5x5_sees_three() {
        let grid = filled(5, 5, 1);
        assert_eq!(count_matching(&grid, 0, 0, 1), 3);
        assert_eq!(count_matching(&grid, 4, 4, 1), 3);
        assert_eq!(count_matching(&grid, 0, 4, 1), 3);
        assert_eq!(moore_neighbors(&grid, 0, 0).count(), 3);
    }

    #[test]
    fn test_edge_sees_five() {
        let grid = filled(5, 5, 1);
        assert_eq!(count_matching(&grid, 0, 2, 1), 5);
        assert_eq!(count_matching(&grid, 2, 4, 1), 5);
    }

    #[test]
    fn test_cell_itself_is_not_counted() {
        let mut grid = filled(3, 3, 0);
        grid.set(1, 1, 2).unwrap();
        assert_eq!(count_matching(&grid, 1, 1, 2), 0);
        assert_eq!(count_matching(&grid, 0, 0, 2), 1);
    }

    #[test]
    fn test_no_wraparound() {
        // 1x3 strip: the ends are not neighbors of each other
        let grid = Grid::from_rows(vec![vec![2, 0, 0]], &[0, 2]).unwrap();
        assert_eq!(count_matching(&grid, 0, 2, 2), 0);
        assert_eq!(count_matching(&grid, 0, 1, 2), 1);
    }

    #[test]
    fn test_mixed_pattern() {
        // 0 1 0
        // 1 0 1
        // 0 1 0
        let grid =
            Grid::from_rows(vec![vec![0, 1, 0], vec![1, 0, 1], vec![0, 1, 0]], &[0, 1]).unwrap();
        assert_eq!(count_matching(&grid, 1, 1, 1), 4);
        assert_eq!(count_matching(&grid, 0, 0, 1), 2);
        assert_eq!(count_matching(&grid, 0, 1, 1), 2);
        assert_eq!(count_matching(&grid, 0, 1, 0), 3);
    }

    #[test]
    fn test_single_cell_grid() {
        let grid = filled(1, 1, 1);
        assert_eq!(count_matching(&grid, 0, 0, 1), 0);
    }
}
