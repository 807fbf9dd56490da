//! Transition rules expressed as data.
//!
//! Each state owns an ordered list of `Rule`s. The first rule that applies
//! to a cell decides its next state; a state with no applicable rule keeps
//! its current value.
//!
//! Rules serialize to tagged JSON objects:
//!
//! ```json
//! { "type": "neighbor_conditioned", "at_least": 1, "at_most": 8, "target_state": 2,
//!   "then": { "type": "probability",
//!             "branches": [ { "weight": 0.3, "turn_to": 2 }, { "weight": 0.7, "turn_to": 1 } ] } }
//! ```

use crate::config::ConfigError;
use crate::grid::State;
use crate::neighborhood::MAX_NEIGHBORS;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How far branch weights may sum above 1.0 and still load.
///
/// Sums below 1.0 never load: the largest draw is just under 1.0, so any
/// shortfall leaves draws that no branch claims.
pub const PROBABILITY_TOLERANCE: f64 = 1e-9;

/// One outcome of a `Rule::Probability`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub weight: f64,
    pub turn_to: State,
}

impl Branch {
    pub fn new(weight: f64, turn_to: State) -> Self {
        Self { weight, turn_to }
    }
}

/// A single transition rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Rule {
    /// Always transition to `turn_to`.
    Unconditional { turn_to: State },
    /// Pick exactly one branch with one uniform draw.
    Probability { branches: Vec<Branch> },
    /// Apply `then` only when the number of neighbors in `target_state`
    /// lies in `[at_least, at_most]`.
    NeighborConditioned {
        at_least: u32,
        at_most: u32,
        target_state: State,
        then: Box<Rule>,
    },
}

impl Rule {
    /// `Rule::Unconditional`.
    pub fn turn_to(state: State) -> Self {
        Rule::Unconditional { turn_to: state }
    }

    /// `Rule::Probability` from `(weight, turn_to)` pairs, in order.
    pub fn probability(branches: &[(f64, State)]) -> Self {
        Rule::Probability {
            branches: branches.iter().map(|&(w, s)| Branch::new(w, s)).collect(),
        }
    }

    /// `Rule::NeighborConditioned` for counts in `at_least..=at_most`.
    pub fn when_neighbors(at_least: u32, at_most: u32, target_state: State, then: Rule) -> Self {
        Rule::NeighborConditioned {
            at_least,
            at_most,
            target_state,
            then: Box::new(then),
        }
    }

    fn validate(&self, owner: State, states: &[State], nested: bool) -> Result<(), ConfigError> {
        let declared = |s: &State| states.binary_search(s).is_ok();

        match self {
            Rule::Unconditional { turn_to } => {
                if !declared(turn_to) {
                    return Err(ConfigError::UndeclaredState {
                        context: format!("turn_to of a rule for state {}", owner),
                        state: *turn_to,
                    });
                }
            }
            Rule::Probability { branches } => {
                if branches.is_empty() {
                    return Err(ConfigError::EmptyBranches { state: owner });
                }
                let mut total = 0.0;
                for branch in branches {
                    if !branch.weight.is_finite() || branch.weight < 0.0 {
                        return Err(ConfigError::InvalidWeight {
                            state: owner,
                            weight: branch.weight,
                        });
                    }
                    if !declared(&branch.turn_to) {
                        return Err(ConfigError::UndeclaredState {
                            context: format!("probability branch for state {}", owner),
                            state: branch.turn_to,
                        });
                    }
                    total += branch.weight;
                }
                // summed in declaration order, as the evaluator accumulates
                if total < 1.0 || total > 1.0 + PROBABILITY_TOLERANCE {
                    return Err(ConfigError::WeightSum {
                        state: owner,
                        total,
                    });
                }
            }
            Rule::NeighborConditioned {
                at_least,
                at_most,
                target_state,
                then,
            } => {
                if nested {
                    return Err(ConfigError::NestedCondition { state: owner });
                }
                if at_least > at_most || *at_most > MAX_NEIGHBORS {
                    return Err(ConfigError::InvalidRange {
                        state: owner,
                        at_least: *at_least,
                        at_most: *at_most,
                    });
                }
                if !declared(target_state) {
                    return Err(ConfigError::UndeclaredState {
                        context: format!("target_state of a rule for state {}", owner),
                        state: *target_state,
                    });
                }
                then.validate(owner, states, true)?;
            }
        }
        Ok(())
    }
}

/// The state-indexed table of rules for one run.
///
/// # Example
///
/// ```
/// use automata_core::{Rule, RuleSet};
///
/// // Dead cells with exactly 3 live neighbors are born; nothing else changes.
/// let rules = RuleSet::new(&[0, 1])
///     .with_rules(0, vec![Rule::when_neighbors(3, 3, 1, Rule::turn_to(1))]);
/// assert!(rules.validate().is_ok());
/// assert_eq!(rules.rules_for(1).len(), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RuleSetData")]
pub struct RuleSet {
    /// Declared alphabet, sorted ascending
    states: Vec<State>,
    /// Rules per state, in evaluation order
    #[serde(default)]
    rules: BTreeMap<State, Vec<Rule>>,
}

/// Serialized form; the alphabet may arrive unsorted.
#[derive(Deserialize)]
struct RuleSetData {
    states: Vec<State>,
    #[serde(default)]
    rules: BTreeMap<State, Vec<Rule>>,
}

impl From<RuleSetData> for RuleSet {
    fn from(data: RuleSetData) -> Self {
        let mut rule_set = RuleSet::new(&data.states);
        rule_set.rules = data.rules;
        rule_set
    }
}

impl RuleSet {
    /// Create an empty rule set over `states`. Every state starts with the
    /// identity transition.
    pub fn new(states: &[State]) -> Self {
        let mut states = states.to_vec();
        states.sort_unstable();
        Self {
            states,
            rules: BTreeMap::new(),
        }
    }

    /// Replace the rule list for `state`. Builder form.
    pub fn with_rules(mut self, state: State, rules: Vec<Rule>) -> Self {
        self.rules.insert(state, rules);
        self
    }

    /// Rules for `state` in evaluation order (empty if none).
    pub fn rules_for(&self, state: State) -> &[Rule] {
        self.rules.get(&state).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Declared alphabet, sorted ascending.
    pub fn states(&self) -> &[State] {
        &self.states
    }

    #[inline]
    pub fn contains_state(&self, state: State) -> bool {
        self.states.binary_search(&state).is_ok()
    }

    /// Number of rules across all states.
    pub fn rule_count(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    /// Check the rule set before a run.
    ///
    /// Rejects an empty or duplicated alphabet, rules keyed by or producing
    /// undeclared states, negative or non-finite weights, weights that do
    /// not sum to 1, bad neighbor ranges, and conditions nested inside
    /// conditions.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.states.is_empty() {
            return Err(ConfigError::EmptyAlphabet);
        }
        for pair in self.states.windows(2) {
            if pair[0] == pair[1] {
                return Err(ConfigError::DuplicateState(pair[0]));
            }
        }

        for (&state, rules) in &self.rules {
            if !self.contains_state(state) {
                return Err(ConfigError::UndeclaredState {
                    context: "rule list key".to_string(),
                    state,
                });
            }
            for rule in rules {
                rule.validate(state, &self.states, false)?;
            }
        }
        Ok(())
    }

    /// Binary life-like rule with custom bounds.
    ///
    /// A dead cell (0) is born when its live neighbors are in `birth`; a live
    /// cell (1) survives when they are in `survival`, and dies otherwise.
    /// `life_like((3, 3), (2, 3))` is Conway's B3/S23.
    pub fn life_like(birth: (u32, u32), survival: (u32, u32)) -> Result<Self, ConfigError> {
        let rules = RuleSet::new(&[0, 1])
            .with_rules(0, vec![Rule::when_neighbors(birth.0, birth.1, 1, Rule::turn_to(1))])
            .with_rules(
                1,
                vec![
                    Rule::when_neighbors(survival.0, survival.1, 1, Rule::turn_to(1)),
                    Rule::turn_to(0),
                ],
            );
        rules.validate()?;
        Ok(rules)
    }

    /// Conway's Game of Life.
    pub fn conway() -> Self {
        RuleSet::new(&[0, 1])
            .with_rules(0, vec![Rule::when_neighbors(3, 3, 1, Rule::turn_to(1))])
            .with_rules(
                1,
                vec![Rule::when_neighbors(2, 3, 1, Rule::turn_to(1)), Rule::turn_to(0)],
            )
    }

    /// Susceptible/infected/removed epidemic rule.
    ///
    /// States: removed (0), susceptible (1), infected (2). A susceptible cell
    /// next to at least one infected cell becomes infected with probability
    /// `infection`; an infected cell is removed with probability `recovery`.
    pub fn sir(infection: f64, recovery: f64) -> Result<Self, ConfigError> {
        for (name, value) in [("infection", infection), ("recovery", recovery)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidProbability {
                    name: name.to_string(),
                    value,
                });
            }
        }

        let rules = RuleSet::new(&[0, 1, 2])
            .with_rules(
                1,
                vec![Rule::when_neighbors(
                    1,
                    MAX_NEIGHBORS,
                    2,
                    Rule::probability(&[(infection, 2), (1.0 - infection, 1)]),
                )],
            )
            .with_rules(2, vec![Rule::probability(&[(recovery, 0), (1.0 - recovery, 2)])]);
        rules.validate()?;
        Ok(rules)
    }
}
