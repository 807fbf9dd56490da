//! Run configuration and configuration errors.
//!
//! `SimulationConfig` is a plain serde struct read from JSON. Missing keys
//! fall back to `Default`, so a config file only needs the values it changes:
//!
//! ```json
//! { "rows": 30, "cols": 30, "seed": 7, "generations": 50,
//!   "initial": { "distribution": { "probabilities": [0.3, 0.6, 0.1] } },
//!   "colors": { "2": "#ff0000" } }
//! ```

use crate::grid::{GridError, State};
use crate::persistence::PersistError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Largest grid a run may request (4096 x 4096).
pub const MAX_CELLS: usize = 1 << 24;

/// Largest rendered cell side, in pixels.
pub const MAX_PIXEL_SIZE: u32 = 64;

/// Error type for malformed rule sets, distributions and run settings.
///
/// Raised before any generation runs. The caller can fix the input and retry.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Alphabet has no states
    EmptyAlphabet,
    /// Alphabet lists a state twice
    DuplicateState(State),
    /// A state is referenced but not declared
    UndeclaredState { context: String, state: State },
    /// Branch weight is negative or not finite
    InvalidWeight { state: State, weight: f64 },
    /// Probability rule without branches
    EmptyBranches { state: State },
    /// Branch weights do not sum to 1
    WeightSum { state: State, total: f64 },
    /// Neighbor range is inverted or exceeds 8
    InvalidRange {
        state: State,
        at_least: u32,
        at_most: u32,
    },
    /// A neighbor condition nested inside another
    NestedCondition { state: State },
    /// A probability outside [0, 1]
    InvalidProbability { name: String, value: f64 },
    /// Distribution length differs from the alphabet
    DistributionLength { states: usize, probabilities: usize },
    /// Distribution does not sum to 1
    DistributionSum { total: f64 },
    /// Grid dimensions are zero
    InvalidDimensions { rows: usize, cols: usize },
    /// Grid has more than `MAX_CELLS` cells
    TooManyCells { rows: usize, cols: usize },
    /// Pixel size is zero or above `MAX_PIXEL_SIZE`
    InvalidPixelSize { value: u32 },
    /// Rendered image side does not fit in `u32`
    ImageTooLarge {
        rows: usize,
        cols: usize,
        pixel_size: u32,
    },
    /// Colour string is not `#rrggbb`
    InvalidColor { state: State, value: String },
    /// Grid construction failed
    Grid(GridError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyAlphabet => write!(f, "state alphabet is empty"),
            ConfigError::DuplicateState(s) => write!(f, "state {} is declared twice", s),
            ConfigError::UndeclaredState { context, state } => {
                write!(f, "undeclared state {} in {}", state, context)
            }
            ConfigError::InvalidWeight { state, weight } => write!(
                f,
                "rule for state {} has invalid branch weight {}",
                state, weight
            ),
            ConfigError::EmptyBranches { state } => {
                write!(f, "probability rule for state {} has no branches", state)
            }
            ConfigError::WeightSum { state, total } => write!(
                f,
                "branch weights for state {} sum to {}, expected 1",
                state, total
            ),
            ConfigError::InvalidRange {
                state,
                at_least,
                at_most,
            } => write!(
                f,
                "rule for state {} has invalid neighbor range {}..={}",
                state, at_least, at_most
            ),
            ConfigError::NestedCondition { state } => write!(
                f,
                "rule for state {} nests a neighbor condition inside another",
                state
            ),
            ConfigError::InvalidProbability { name, value } => {
                write!(f, "{} probability {} is outside [0, 1]", name, value)
            }
            ConfigError::DistributionLength {
                states,
                probabilities,
            } => write!(
                f,
                "{} probabilities given for {} states",
                probabilities, states
            ),
            ConfigError::DistributionSum { total } => {
                write!(f, "state probabilities sum to {}, expected 1", total)
            }
            ConfigError::InvalidDimensions { rows, cols } => {
                write!(f, "grid dimensions must be non-zero (got {}x{})", rows, cols)
            }
            ConfigError::TooManyCells { rows, cols } => write!(
                f,
                "a {}x{} grid exceeds the limit of {} cells",
                rows, cols, MAX_CELLS
            ),
            ConfigError::InvalidPixelSize { value } => write!(
                f,
                "pixel size {} is outside 1..={}",
                value, MAX_PIXEL_SIZE
            ),
            ConfigError::ImageTooLarge {
                rows,
                cols,
                pixel_size,
            } => write!(
                f,
                "a {}x{} grid at {} px per cell is too large to render",
                rows, cols, pixel_size
            ),
            ConfigError::InvalidColor { state, value } => {
                write!(f, "colour '{}' for state {} is not #rrggbb", value, state)
            }
            ConfigError::Grid(e) => write!(f, "grid error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Grid(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GridError> for ConfigError {
    fn from(e: GridError) -> Self {
        ConfigError::Grid(e)
    }
}

/// How the first generation is produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitialState {
    /// Binary grid; each cell is alive (1) with `probability`.
    Alive { probability: f64 },
    /// One probability per state of the rule set alphabet, in sorted order.
    Distribution { probabilities: Vec<f64> },
}

impl Default for InitialState {
    fn default() -> Self {
        InitialState::Alive { probability: 0.2 }
    }
}

/// Settings for one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub rows: usize,
    pub cols: usize,
    /// Seed for the run's random source
    pub seed: u64,
    /// Number of generations to advance
    pub generations: usize,
    pub initial: InitialState,
    /// Side of one cell in rendered images, in pixels
    pub pixel_size: u32,
    /// Per-state colour overrides (`#rrggbb`)
    pub colors: BTreeMap<State, String>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            rows: 20,
            cols: 20,
            seed: 0,
            generations: 10,
            initial: InitialState::default(),
            pixel_size: 8,
            colors: BTreeMap::new(),
        }
    }
}

impl SimulationConfig {
    /// Read a JSON config file and validate it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PersistError> {
        let text = std::fs::read_to_string(path)?;
        let config: SimulationConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check dimensions, pixel size and the initial-state probabilities.
    ///
    /// Distribution sums are checked against the alphabet by the
    /// initializer, once the rule set is known.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(ConfigError::InvalidDimensions {
                rows: self.rows,
                cols: self.cols,
            });
        }
        let cells = self.rows.checked_mul(self.cols);
        if cells.map_or(true, |n| n > MAX_CELLS) {
            return Err(ConfigError::TooManyCells {
                rows: self.rows,
                cols: self.cols,
            });
        }
        if !(1..=MAX_PIXEL_SIZE).contains(&self.pixel_size) {
            return Err(ConfigError::InvalidPixelSize {
                value: self.pixel_size,
            });
        }
        match &self.initial {
            InitialState::Alive { probability } => {
                if !(0.0..=1.0).contains(probability) {
                    return Err(ConfigError::InvalidProbability {
                        name: "alive".to_string(),
                        value: *probability,
                    });
                }
            }
            InitialState::Distribution { probabilities } => {
                if let Some(&p) = probabilities.iter().find(|p| !(0.0..=1.0).contains(*p)) {
                    return Err(ConfigError::InvalidProbability {
                        name: "state".to_string(),
                        value: p,
                    });
                }
            }
        }
        Ok(())
    }
}
