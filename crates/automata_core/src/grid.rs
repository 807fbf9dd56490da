//! Dense 2D grid of cell states.
//!
//! Cells are stored row-major in a flat `Vec<State>`:
//! `index = col + row * cols`.
//!
//! A grid carries the alphabet of states it may hold. Every write is
//! checked against it, so a grid never contains an undeclared state.

use std::fmt;

/// A cell state tag. Meaning ("alive", "infected") is assigned by callers.
pub type State = u8;

/// Error type for grid construction and access.
#[derive(Debug, Clone, PartialEq)]
pub enum GridError {
    /// Rows or columns is zero
    EmptyDimensions { rows: usize, cols: usize },
    /// `rows * cols` does not fit in `usize`
    TooLarge { rows: usize, cols: usize },
    /// Alphabet has no states
    EmptyAlphabet,
    /// Alphabet lists a state twice
    DuplicateState(State),
    /// A row has a different length than the first row
    RaggedRow {
        row: usize,
        expected: usize,
        got: usize,
    },
    /// Cell value not in the grid's alphabet
    UndeclaredState { row: usize, col: usize, state: State },
    /// Access outside the grid
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::EmptyDimensions { rows, cols } => {
                write!(f, "grid dimensions must be non-zero (got {}x{})", rows, cols)
            }
            GridError::TooLarge { rows, cols } => {
                write!(f, "a {}x{} grid is too large to allocate", rows, cols)
            }
            GridError::EmptyAlphabet => write!(f, "state alphabet is empty"),
            GridError::DuplicateState(s) => write!(f, "duplicate state {} in alphabet", s),
            GridError::RaggedRow { row, expected, got } => write!(
                f,
                "row {} has {} cells, expected {}",
                row, got, expected
            ),
            GridError::UndeclaredState { row, col, state } => write!(
                f,
                "state {} at ({}, {}) is not in the alphabet",
                state, row, col
            ),
            GridError::OutOfBounds {
                row,
                col,
                rows,
                cols,
            } => write!(
                f,
                "cell ({}, {}) is outside the {}x{} grid",
                row, col, rows, cols
            ),
        }
    }
}

impl std::error::Error for GridError {}

/// Check an alphabet and return it sorted.
pub(crate) fn normalize_alphabet(alphabet: &[State]) -> Result<Vec<State>, GridError> {
    if alphabet.is_empty() {
        return Err(GridError::EmptyAlphabet);
    }
    let mut sorted = alphabet.to_vec();
    sorted.sort_unstable();
    for pair in sorted.windows(2) {
        if pair[0] == pair[1] {
            return Err(GridError::DuplicateState(pair[0]));
        }
    }
    Ok(sorted)
}

/// Number of cells in a `rows x cols` grid.
fn cell_count(rows: usize, cols: usize) -> Result<usize, GridError> {
    if rows == 0 || cols == 0 {
        return Err(GridError::EmptyDimensions { rows, cols });
    }
    rows.checked_mul(cols).ok_or(GridError::TooLarge { rows, cols })
}

/// A fixed-size 2D grid of cell states.
///
/// # Example
///
/// ```
/// use automata_core::Grid;
///
/// let mut grid = Grid::new(3, 4, &[0, 1], 0).unwrap();
/// grid.set(1, 2, 1).unwrap();
/// assert_eq!(grid.get(1, 2), Some(1));
/// assert_eq!(grid.count(1), 1);
/// assert!(grid.set(1, 2, 7).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    /// Row-major cell states
    cells: Vec<State>,
    rows: usize,
    cols: usize,
    /// Declared states, sorted ascending
    alphabet: Vec<State>,
}

impl Grid {
    /// Create a grid with every cell set to `fill`.
    pub fn new(
        rows: usize,
        cols: usize,
        alphabet: &[State],
        fill: State,
    ) -> Result<Self, GridError> {
        let len = cell_count(rows, cols)?;
        let alphabet = normalize_alphabet(alphabet)?;
        if alphabet.binary_search(&fill).is_err() {
            return Err(GridError::UndeclaredState {
                row: 0,
                col: 0,
                state: fill,
            });
        }
        Ok(Self {
            cells: vec![fill; len],
            rows,
            cols,
            alphabet,
        })
    }

    /// Create a grid from explicit rows of states.
    pub fn from_rows(rows: Vec<Vec<State>>, alphabet: &[State]) -> Result<Self, GridError> {
        let height = rows.len();
        let width = rows.first().map(|r| r.len()).unwrap_or(0);
        let len = cell_count(height, width)?;
        let alphabet = normalize_alphabet(alphabet)?;

        let mut cells = Vec::with_capacity(len);
        for (r, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(GridError::RaggedRow {
                    row: r,
                    expected: width,
                    got: row.len(),
                });
            }
            for (c, state) in row.into_iter().enumerate() {
                if alphabet.binary_search(&state).is_err() {
                    return Err(GridError::UndeclaredState { row: r, col: c, state });
                }
                cells.push(state);
            }
        }

        Ok(Self {
            cells,
            rows: height,
            cols: width,
            alphabet,
        })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false: zero-sized grids cannot be constructed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Declared states, sorted ascending.
    pub fn alphabet(&self) -> &[State] {
        &self.alphabet
    }

    /// Whether `state` belongs to this grid's alphabet.
    #[inline]
    pub fn contains_state(&self, state: State) -> bool {
        self.alphabet.binary_search(&state).is_ok()
    }

    /// Get the flat index for (row, col). Returns None if out of bounds.
    #[inline]
    pub fn index(&self, row: usize, col: usize) -> Option<usize> {
        if row < self.rows && col < self.cols {
            Some(col + row * self.cols)
        } else {
            None
        }
    }

    /// Get the state at (row, col), or None if out of bounds.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<State> {
        self.index(row, col).map(|i| self.cells[i])
    }

    /// Set the state at (row, col).
    pub fn set(&mut self, row: usize, col: usize, state: State) -> Result<(), GridError> {
        let idx = self.index(row, col).ok_or(GridError::OutOfBounds {
            row,
            col,
            rows: self.rows,
            cols: self.cols,
        })?;
        if !self.contains_state(state) {
            return Err(GridError::UndeclaredState { row, col, state });
        }
        self.cells[idx] = state;
        Ok(())
    }

    /// Write a flat slot without checks. Callers verify bounds and alphabet.
    #[inline]
    pub(crate) fn write_unchecked(&mut self, idx: usize, state: State) {
        self.cells[idx] = state;
    }

    /// Row-major view of all cells.
    pub fn cells(&self) -> &[State] {
        &self.cells
    }

    /// Iterate over `(row, col, state)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, State)> + '_ {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &s)| (i / cols, i % cols, s))
    }

    /// Number of cells currently in `state`.
    pub fn count(&self, state: State) -> usize {
        self.cells.iter().filter(|&&s| s == state).count()
    }

    /// Whether `other` has the same dimensions and alphabet.
    pub fn same_shape(&self, other: &Grid) -> bool {
        self.rows == other.rows && self.cols == other.cols && self.alphabet == other.alphabet
    }

    /// Copy the cells out as nested rows.
    pub fn to_rows(&self) -> Vec<Vec<State>> {
        self.cells.chunks(self.cols).map(|r| r.to_vec()).collect()
    }
}
