//! Whole-grid generation updates.
//!
//! Every cell of generation N+1 is computed from a frozen generation N:
//! reads go to the input grid, writes go to a separate output buffer. No
//! cell ever sees a neighbor's value from the generation being built, so
//! the sweep order cannot change the result.
//!
//! A failed cell aborts the whole update. The caller never sees a partly
//! written generation.

use crate::evaluator::{resolve, RuleEvaluationError};
use crate::grid::{Grid, State};
use crate::neighborhood::count_matching;
use crate::rng::CellRng;
use crate::rule::RuleSet;
use std::fmt;
use tracing::{debug, warn};

/// Error type for a generation update.
#[derive(Debug, Clone, PartialEq)]
pub enum StepError {
    /// Grid and rule set declare different alphabets
    AlphabetMismatch {
        grid: Vec<State>,
        rule_set: Vec<State>,
    },
    /// Output buffer does not match the input grid
    ShapeMismatch {
        input: (usize, usize),
        output: (usize, usize),
    },
    /// Rule evaluation failed for one cell
    Evaluation {
        row: usize,
        col: usize,
        source: RuleEvaluationError,
    },
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepError::AlphabetMismatch { grid, rule_set } => write!(
                f,
                "grid alphabet {:?} differs from rule set alphabet {:?}",
                grid, rule_set
            ),
            StepError::ShapeMismatch { input, output } => write!(
                f,
                "output buffer is {}x{}, input grid is {}x{}",
                output.0, output.1, input.0, input.1
            ),
            StepError::Evaluation { row, col, source } => {
                write!(f, "cell ({}, {}): {}", row, col, source)
            }
        }
    }
}

impl std::error::Error for StepError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StepError::Evaluation { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Compute the next generation into a new grid.
pub fn advance(grid: &Grid, rule_set: &RuleSet, rng: &mut dyn CellRng) -> Result<Grid, StepError> {
    let mut output = grid.clone();
    advance_into(grid, &mut output, rule_set, rng)?;
    Ok(output)
}

/// Compute the next generation of `input` into `output`.
///
/// `output` must have the same shape and alphabet as `input`. Its previous
/// contents are ignored. On error its contents are unspecified and must be
/// discarded.
pub fn advance_into(
    input: &Grid,
    output: &mut Grid,
    rule_set: &RuleSet,
    rng: &mut dyn CellRng,
) -> Result<(), StepError> {
    if input.alphabet() != rule_set.states() {
        return Err(StepError::AlphabetMismatch {
            grid: input.alphabet().to_vec(),
            rule_set: rule_set.states().to_vec(),
        });
    }
    if !input.same_shape(output) {
        return Err(StepError::ShapeMismatch {
            input: (input.rows(), input.cols()),
            output: (output.rows(), output.cols()),
        });
    }

    for (idx, (row, col, state)) in input.iter().enumerate() {
        let next = resolve(
            rule_set,
            state,
            |target| count_matching(input, row, col, target),
            rng,
        )
        .map_err(|source| StepError::Evaluation { row, col, source })?;
        // resolve only returns states of the rule set, which equals the grid alphabet
        output.write_unchecked(idx, next);
    }
    Ok(())
}

/// Owns a run: the current generation, a back buffer, the rules and the rng.
///
/// # Example
///
/// ```
/// use automata_core::rng::StdRandom;
/// use automata_core::{Grid, RuleSet, Stepper};
///
/// // Blinker: a horizontal bar flips to vertical and back.
/// let grid = Grid::from_rows(
///     vec![vec![0, 0, 0], vec![1, 1, 1], vec![0, 0, 0]],
///     &[0, 1],
/// ).unwrap();
/// let rng = Box::new(StdRandom::from_seed(1));
/// let mut stepper = Stepper::new(grid.clone(), RuleSet::conway(), rng);
///
/// stepper.step().unwrap();
/// assert_eq!(stepper.grid().to_rows(), vec![vec![0, 1, 0], vec![0, 1, 0], vec![0, 1, 0]]);
/// stepper.step().unwrap();
/// assert_eq!(stepper.grid(), &grid);
/// assert_eq!(stepper.generation(), 2);
/// ```
pub struct Stepper {
    /// Current generation (frozen during a step)
    current: Grid,
    /// Write buffer, swapped with `current` after a successful step
    back: Grid,
    rule_set: RuleSet,
    random: Box<dyn CellRng>,
    /// Number of completed generations
    generation: usize,
}

impl Stepper {
    /// Create a stepper starting at generation 0.
    pub fn new(grid: Grid, rule_set: RuleSet, random: Box<dyn CellRng>) -> Self {
        let back = grid.clone();
        Self {
            current: grid,
            back,
            rule_set,
            random,
            generation: 0,
        }
    }

    /// Advance one generation.
    ///
    /// On error the current generation and counter are unchanged.
    pub fn step(&mut self) -> Result<(), StepError> {
        if let Err(e) = advance_into(
            &self.current,
            &mut self.back,
            &self.rule_set,
            self.random.as_mut(),
        ) {
            warn!(generation = self.generation, error = %e, "step failed");
            return Err(e);
        }
        std::mem::swap(&mut self.current, &mut self.back);
        self.generation += 1;

        debug!(
            generation = self.generation,
            population = ?self.population(),
            "advanced"
        );
        Ok(())
    }

    /// Advance `generations` times, stopping at the first error.
    pub fn run(&mut self, generations: usize) -> Result<(), StepError> {
        for _ in 0..generations {
            self.step()?;
        }
        Ok(())
    }

    /// Replace the current generation and restart the counter.
    pub fn reset(&mut self, grid: Grid, random: Box<dyn CellRng>) {
        self.back = grid.clone();
        self.current = grid;
        self.random = random;
        self.generation = 0;
    }

    /// The current generation.
    pub fn grid(&self) -> &Grid {
        &self.current
    }

    pub fn rule_set(&self) -> &RuleSet {
        &self.rule_set
    }

    /// Number of completed generations.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Cell count per state of the current generation.
    pub fn population(&self) -> Vec<(State, usize)> {
        self.current
            .alphabet()
            .iter()
            .map(|&s| (s, self.current.count(s)))
            .collect()
    }
}
