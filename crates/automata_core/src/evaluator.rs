//! Rule evaluation for a single cell.
//!
//! `resolve` walks the rule list of the cell's current state in declared
//! order. The first rule that applies decides the next state:
//!
//! - `Unconditional` always applies.
//! - `Probability` always applies and consumes exactly one draw.
//! - `NeighborConditioned` applies when the neighbor count is in range, and
//!   then resolves its nested rule. Otherwise evaluation moves on.
//!
//! If nothing applies the cell keeps its state. A rule that applies but
//! cannot produce a valid state is an error, never a silent identity.

use crate::grid::State;
use crate::rng::CellRng;
use crate::rule::{Branch, Rule, RuleSet};
use std::fmt;

/// Error for a cell whose matched rule is internally broken.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleEvaluationError {
    /// No branch's cumulative weight covered the draw
    UnclaimedDraw {
        state: State,
        draw: f64,
        total_weight: f64,
    },
    /// A matched rule produced a state outside the alphabet
    UndeclaredState { from: State, to: State },
}

impl fmt::Display for RuleEvaluationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleEvaluationError::UnclaimedDraw {
                state,
                draw,
                total_weight,
            } => write!(
                f,
                "probability rule for state {} left draw {} unclaimed (weights sum to {})",
                state, draw, total_weight
            ),
            RuleEvaluationError::UndeclaredState { from, to } => write!(
                f,
                "rule for state {} produced undeclared state {}",
                from, to
            ),
        }
    }
}

impl std::error::Error for RuleEvaluationError {}

/// Pick the branch for a uniform draw in [0, 1).
///
/// Branches are accumulated in declaration order; the first whose running
/// total exceeds `draw` wins. Returns None when the weights run out first.
pub fn select_branch(branches: &[Branch], draw: f64) -> Option<State> {
    let mut cumulative = 0.0;
    for branch in branches {
        cumulative += branch.weight;
        if draw < cumulative {
            return Some(branch.turn_to);
        }
    }
    None
}

/// Resolve the next state for one cell.
///
/// `neighbor_counts` returns how many neighbors are in a given state; it is
/// only called for `NeighborConditioned` rules that are reached.
///
/// # Example
///
/// ```
/// use automata_core::evaluator::resolve;
/// use automata_core::rng::SequenceRandom;
/// use automata_core::{Rule, RuleSet};
///
/// let rules = RuleSet::new(&[0, 1])
///     .with_rules(0, vec![Rule::when_neighbors(3, 3, 1, Rule::turn_to(1))]);
/// let mut rng = SequenceRandom::constant(0.5);
///
/// assert_eq!(resolve(&rules, 0, |_| 3, &mut rng), Ok(1));
/// assert_eq!(resolve(&rules, 0, |_| 2, &mut rng), Ok(0));
/// ```
pub fn resolve<F>(
    rule_set: &RuleSet,
    current_state: State,
    mut neighbor_counts: F,
    rng: &mut dyn CellRng,
) -> Result<State, RuleEvaluationError>
where
    F: FnMut(State) -> u32,
{
    for rule in rule_set.rules_for(current_state) {
        if let Some(next) = apply_rule(rule, current_state, &mut neighbor_counts, rng)? {
            if !rule_set.contains_state(next) {
                return Err(RuleEvaluationError::UndeclaredState {
                    from: current_state,
                    to: next,
                });
            }
            return Ok(next);
        }
    }
    Ok(current_state)
}

/// Evaluate one rule. `Ok(None)` means the rule does not apply to this cell.
fn apply_rule<F>(
    rule: &Rule,
    current_state: State,
    neighbor_counts: &mut F,
    rng: &mut dyn CellRng,
) -> Result<Option<State>, RuleEvaluationError>
where
    F: FnMut(State) -> u32,
{
    match rule {
        Rule::Unconditional { turn_to } => Ok(Some(*turn_to)),
        Rule::Probability { branches } => {
            let draw = rng.next_double();
            match select_branch(branches, draw) {
                Some(next) => Ok(Some(next)),
                None => Err(RuleEvaluationError::UnclaimedDraw {
                    state: current_state,
                    draw,
                    total_weight: branches.iter().map(|b| b.weight).sum(),
                }),
            }
        }
        Rule::NeighborConditioned {
            at_least,
            at_most,
            target_state,
            then,
        } => {
            let count = neighbor_counts(*target_state);
            if (*at_least..=*at_most).contains(&count) {
                apply_rule(then, current_state, neighbor_counts, rng)
            } else {
                Ok(None)
            }
        }
    }
}
