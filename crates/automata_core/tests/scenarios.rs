//! End-to-end runs through the public API.

use automata_core::persistence::{load_rule_set, rule_set_from_json, save_rule_set};
use automata_core::{
    advance, Grid, Rule, RuleEvaluationError, RuleSet, SequenceRandom, StdRandom, StepError,
    Stepper,
};

/// Conway's rules with every transition written as a weight-1.0 probability rule.
fn probabilistic_conway() -> RuleSet {
    RuleSet::new(&[0, 1])
        .with_rules(0, vec![Rule::when_neighbors(3, 3, 1, Rule::probability(&[(1.0, 1)]))])
        .with_rules(
            1,
            vec![
                Rule::when_neighbors(2, 3, 1, Rule::probability(&[(1.0, 1)])),
                Rule::probability(&[(1.0, 0)]),
            ],
        )
}

#[test]
fn test_lone_cell_dies_under_probabilistic_conway() {
    let rules = probabilistic_conway();
    rules.validate().unwrap();
    let grid = Grid::from_rows(vec![vec![0, 0, 0], vec![0, 1, 0], vec![0, 0, 0]], &[0, 1]).unwrap();

    let mut rng = StdRandom::from_seed(17);
    let next = advance(&grid, &rules, &mut rng).unwrap();
    assert_eq!(next, Grid::new(3, 3, &[0, 1], 0).unwrap());
}

#[test]
fn test_glider_moves_under_probabilistic_conway() {
    let glider = Grid::from_rows(
        vec![
            vec![0, 1, 0, 0, 0, 0],
            vec![0, 0, 1, 0, 0, 0],
            vec![1, 1, 1, 0, 0, 0],
            vec![0, 0, 0, 0, 0, 0],
            vec![0, 0, 0, 0, 0, 0],
            vec![0, 0, 0, 0, 0, 0],
        ],
        &[0, 1],
    )
    .unwrap();
    let moved = Grid::from_rows(
        vec![
            vec![0, 0, 0, 0, 0, 0],
            vec![0, 0, 1, 0, 0, 0],
            vec![0, 0, 0, 1, 0, 0],
            vec![0, 1, 1, 1, 0, 0],
            vec![0, 0, 0, 0, 0, 0],
            vec![0, 0, 0, 0, 0, 0],
        ],
        &[0, 1],
    )
    .unwrap();

    let mut stepper = Stepper::new(
        glider,
        probabilistic_conway(),
        Box::new(StdRandom::from_seed(3)),
    );
    stepper.run(4).unwrap();
    assert_eq!(stepper.grid(), &moved);
}

#[test]
fn test_sir_certain_infection() {
    let rules = RuleSet::sir(1.0, 0.0).unwrap();
    let grid = Grid::from_rows(vec![vec![1, 2]], &[0, 1, 2]).unwrap();

    let mut rng = StdRandom::from_seed(0);
    let next = advance(&grid, &rules, &mut rng).unwrap();
    assert_eq!(next.to_rows(), vec![vec![2, 2]]);
}

#[test]
fn test_sir_certain_recovery_without_new_infection() {
    let rules = RuleSet::sir(0.0, 1.0).unwrap();
    let grid = Grid::from_rows(vec![vec![1, 2, 0]], &[0, 1, 2]).unwrap();

    let mut rng = StdRandom::from_seed(0);
    let next = advance(&grid, &rules, &mut rng).unwrap();
    assert_eq!(next.to_rows(), vec![vec![1, 0, 0]]);
}

#[test]
fn test_sir_epidemic_burns_out() {
    // Removed cells never change and infected cells eventually recover, so
    // a long enough run ends without infected cells.
    let rules = RuleSet::sir(0.6, 0.5).unwrap();
    let mut grid = Grid::new(8, 8, &[0, 1, 2], 1).unwrap();
    grid.set(4, 4, 2).unwrap();

    let mut stepper = Stepper::new(grid, rules, Box::new(StdRandom::from_seed(11)));
    let mut removed = 0;
    for _ in 0..200 {
        stepper.step().unwrap();
        let now = stepper.grid().count(0);
        assert!(now >= removed, "removed cells never come back");
        removed = now;
    }
    assert_eq!(stepper.grid().count(2), 0);
}

#[test]
fn test_same_seed_same_history() {
    let rules = RuleSet::sir(0.4, 0.2).unwrap();
    let mut grid = Grid::new(10, 10, &[0, 1, 2], 1).unwrap();
    grid.set(0, 0, 2).unwrap();
    grid.set(9, 9, 2).unwrap();

    let mut a = Stepper::new(grid.clone(), rules.clone(), Box::new(StdRandom::from_seed(42)));
    let mut b = Stepper::new(grid, rules, Box::new(StdRandom::from_seed(42)));
    for _ in 0..15 {
        a.step().unwrap();
        b.step().unwrap();
        assert_eq!(a.grid(), b.grid());
    }
}

#[test]
fn test_malformed_rule_aborts_without_commit() {
    // Bypasses the loader: weights sum to 0.6
    let rules = RuleSet::new(&[0, 1, 2])
        .with_rules(0, vec![Rule::probability(&[(0.5, 1), (0.1, 2)])]);
    assert!(rules.validate().is_err());

    let grid = Grid::new(2, 2, &[0, 1, 2], 0).unwrap();
    // (0,0) draws 0.2 and is claimed, (0,1) draws 0.95 which no branch covers
    let rng = SequenceRandom::new(vec![0.2, 0.95]);
    let mut stepper = Stepper::new(grid.clone(), rules, Box::new(rng));
    let err = stepper.step().unwrap_err();
    match err {
        StepError::Evaluation { row, col, source } => {
            assert_eq!((row, col), (0, 1));
            assert!(matches!(source, RuleEvaluationError::UnclaimedDraw { state: 0, .. }));
        }
        other => panic!("expected evaluation error, got {:?}", other),
    }
    assert_eq!(stepper.grid(), &grid);
    assert_eq!(stepper.generation(), 0);
}

#[test]
fn test_rule_file_drives_a_run() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("life.json");
    save_rule_set(&RuleSet::life_like((3, 3), (2, 3)).unwrap(), &path).unwrap();

    let rules = load_rule_set(&path).unwrap();
    let vertical = vec![vec![0, 1, 0], vec![0, 1, 0], vec![0, 1, 0]];
    let blinker = Grid::from_rows(vertical, &[0, 1]).unwrap();
    let mut rng = StdRandom::from_seed(0);
    let next = advance(&blinker, &rules, &mut rng).unwrap();
    assert_eq!(next.to_rows(), vec![vec![0, 0, 0], vec![1, 1, 1], vec![0, 0, 0]]);
}

#[test]
fn test_nested_condition_rejected_by_loader() {
    let text = r#"{ "states": [0, 1], "rules": { "0": [
        { "type": "neighbor_conditioned", "at_least": 1, "at_most": 8, "target_state": 1,
          "then": { "type": "neighbor_conditioned", "at_least": 2, "at_most": 8, "target_state": 1,
                    "then": { "type": "unconditional", "turn_to": 1 } } } ] } }"#;
    assert!(rule_set_from_json(text).is_err());
}
