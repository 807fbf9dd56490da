//! Random first generations.

use crate::config::ConfigError;
use crate::grid::{normalize_alphabet, Grid, State};
use crate::rng::CellRng;
use crate::rule::PROBABILITY_TOLERANCE;

/// Binary grid over {0, 1}; each cell is alive (1) when its draw is below
/// `alive_probability`.
pub fn random_binary(
    rows: usize,
    cols: usize,
    alive_probability: f64,
    rng: &mut dyn CellRng,
) -> Result<Grid, ConfigError> {
    if !(0.0..=1.0).contains(&alive_probability) {
        return Err(ConfigError::InvalidProbability {
            name: "alive".to_string(),
            value: alive_probability,
        });
    }
    let mut grid = new_grid(rows, cols, &[0, 1], 0)?;
    for idx in 0..grid.len() {
        if rng.next_double() < alive_probability {
            grid.write_unchecked(idx, 1);
        }
    }
    Ok(grid)
}

/// Grid over `states`, each cell drawn independently with
/// `probabilities[i]` for `states[i]`.
///
/// # Example
///
/// ```
/// use automata_core::initializer::random_from_distribution;
/// use automata_core::rng::StdRandom;
///
/// let mut rng = StdRandom::from_seed(3);
/// let grid = random_from_distribution(4, 4, &[0, 1, 2], &[0.0, 1.0, 0.0], &mut rng).unwrap();
/// assert_eq!(grid.count(1), 16);
/// ```
pub fn random_from_distribution(
    rows: usize,
    cols: usize,
    states: &[State],
    probabilities: &[f64],
    rng: &mut dyn CellRng,
) -> Result<Grid, ConfigError> {
    if states.len() != probabilities.len() {
        return Err(ConfigError::DistributionLength {
            states: states.len(),
            probabilities: probabilities.len(),
        });
    }
    if let Some(&p) = probabilities
        .iter()
        .find(|p| !p.is_finite() || **p < 0.0 || **p > 1.0)
    {
        return Err(ConfigError::InvalidProbability {
            name: "state".to_string(),
            value: p,
        });
    }
    let total: f64 = probabilities.iter().sum();
    if (total - 1.0).abs() > PROBABILITY_TOLERANCE {
        return Err(ConfigError::DistributionSum { total });
    }
    normalize_alphabet(states)?;

    let fill = states[0];
    let mut grid = new_grid(rows, cols, states, fill)?;
    for idx in 0..grid.len() {
        let draw = rng.next_double();
        grid.write_unchecked(idx, sample(states, probabilities, draw));
    }
    Ok(grid)
}

/// Categorical sample by cumulative weight. A draw left over by rounding
/// falls on the last state with non-zero probability.
fn sample(states: &[State], probabilities: &[f64], draw: f64) -> State {
    let mut cumulative = 0.0;
    let mut last = states[0];
    for (&state, &p) in states.iter().zip(probabilities) {
        if p <= 0.0 {
            continue;
        }
        cumulative += p;
        last = state;
        if draw < cumulative {
            return state;
        }
    }
    last
}

fn new_grid(rows: usize, cols: usize, states: &[State], fill: State) -> Result<Grid, ConfigError> {
    if rows == 0 || cols == 0 {
        return Err(ConfigError::InvalidDimensions { rows, cols });
    }
    Ok(Grid::new(rows, cols, states, fill)?)
}
