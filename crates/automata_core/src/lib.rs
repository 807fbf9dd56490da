//! Core engine for Automata Studio.
//!
//! This crate provides:
//! - A fixed-size 2D grid of integer cell states
//! - Moore-neighborhood counting with clipped edges
//! - Data-driven transition rules (unconditional, probabilistic, neighbor-conditioned)
//! - Rule evaluation with cumulative-weight branch selection
//! - Double-buffered generation updates
//! - Random initial grids, CSV/JSON persistence and PNG rendering
//!
//! # Example
//!
//! ```
//! use automata_core::rng::StdRandom;
//! use automata_core::{advance, Grid, RuleSet};
//!
//! let grid = Grid::from_rows(vec![vec![0, 0, 0], vec![0, 1, 0], vec![0, 0, 0]], &[0, 1]).unwrap();
//! let mut rng = StdRandom::from_seed(0);
//! let next = advance(&grid, &RuleSet::conway(), &mut rng).unwrap();
//! assert_eq!(next.count(1), 0);
//! ```

pub mod config;
pub mod evaluator;
pub mod grid;
pub mod initializer;
pub mod neighborhood;
pub mod persistence;
pub mod render;
pub mod rng;
pub mod rule;
pub mod stepper;

pub use config::{ConfigError, InitialState, SimulationConfig};
pub use evaluator::{resolve, RuleEvaluationError};
pub use grid::{Grid, GridError, State};
pub use neighborhood::count_matching;
pub use persistence::PersistError;
pub use render::Palette;
pub use rng::{CellRng, SequenceRandom, StdRandom};
pub use rule::{Branch, Rule, RuleSet};
pub use stepper::{advance, advance_into, StepError, Stepper};
