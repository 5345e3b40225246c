use ca_formats::rle::Rle;
use hashlife_universe::{get_bounds, Bounds, Rule, Universe};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rustc_hash::{FxHashMap, FxHashSet};

type Cells = FxHashSet<(i64, i64)>;

const R_PENTOMINO: &str = "x = 3, y = 3, rule = B3/S23\nb2o$2o$bo!";
const GLIDER: &str = "x = 3, y = 3, rule = B3/S23\nbo$2bo$3o!";

fn read_rle(pattern: &str) -> Vec<(i64, i64)> {
    Rle::new(pattern)
        .unwrap()
        .map(|cell| cell.unwrap().position)
        .collect()
}

fn live_set(universe: &Universe) -> Cells {
    universe.live_cells().into_iter().collect()
}

/// One generation by counting the neighbors of every cell.
fn naive_step(cells: &Cells, rule: &Rule) -> Cells {
    let mut counts: FxHashMap<(i64, i64), usize> = FxHashMap::default();
    for &(x, y) in cells {
        for dx in -1..=1 {
            for dy in -1..=1 {
                if (dx, dy) != (0, 0) {
                    *counts.entry((x + dx, y + dy)).or_default() += 1;
                }
            }
        }
    }
    counts
        .into_iter()
        .filter(|&(cell, n)| rule.next_state(cells.contains(&cell), n))
        .map(|(cell, _)| cell)
        .collect()
}

fn check_against_naive(rule: &str, seed: u64, generations: usize) {
    let rule: Rule = rule.parse().unwrap();
    let mut universe = Universe::new(rule.clone());
    universe.seed_random(16, 16, 80, &mut ChaCha8Rng::seed_from_u64(seed));
    let mut cells = live_set(&universe);
    for generation in 1..=generations {
        universe.advance_one_generation();
        cells = naive_step(&cells, &rule);
        assert_eq!(live_set(&universe), cells, "generation {}", generation);
        assert_eq!(universe.population(), cells.len() as u64);
    }
}

#[test]
fn life_matches_naive() {
    check_against_naive("B3/S23", 1, 40);
}

#[test]
fn highlife_matches_naive() {
    check_against_naive("B36/S23", 2, 40);
}

#[test]
fn seeds_matches_naive() {
    check_against_naive("B2/S", 3, 12);
}

#[test]
fn superstep_matches_single_steps() {
    let mut a = Universe::default();
    let mut b = Universe::default();
    a.seed_random(24, 24, 150, &mut ChaCha8Rng::seed_from_u64(4));
    b.seed_random(24, 24, 150, &mut ChaCha8Rng::seed_from_u64(4));
    a.set_step(5);
    for _ in 0..3 {
        a.step();
    }
    for _ in 0..3 * 32 {
        b.advance_one_generation();
    }
    assert_eq!(a.get_generation(), 96);
    assert_eq!(b.get_generation(), 96);
    assert_eq!(live_set(&a), live_set(&b));
}

#[test]
fn glider_moves_diagonally() {
    let mut universe = Universe::default();
    universe.load_pattern(&read_rle(GLIDER));
    let start = live_set(&universe);
    universe.set_step(2);
    universe.step();
    assert_eq!(universe.get_generation(), 4);
    let moved: Cells = start.iter().map(|&(x, y)| (x + 1, y + 1)).collect();
    assert_eq!(live_set(&universe), moved);
}

#[test]
fn r_pentomino_stabilizes() {
    let mut universe = Universe::default();
    universe.load_pattern(&read_rle(R_PENTOMINO));
    assert_eq!(universe.population(), 5);
    universe.set_step(11);
    universe.step();
    assert_eq!(universe.get_generation(), 2048);
    assert_eq!(universe.population(), 116);
}

#[test]
fn rle_output_reads_back() {
    let mut universe = Universe::default();
    universe.load_pattern(&read_rle(R_PENTOMINO));
    universe.set_step(6);
    universe.step();
    let bounds = universe.bound().unwrap();
    let expected: Cells = universe
        .live_cells()
        .into_iter()
        .map(|(x, y)| (x - bounds.xmin, y - bounds.ymin))
        .collect();
    let read: Cells = read_rle(&universe.to_rle()).into_iter().collect();
    assert_eq!(read, expected);
}

#[test]
fn rewind_restores_generation() {
    let mut universe = Universe::default();
    universe.load_pattern(&read_rle(R_PENTOMINO));
    let start = live_set(&universe);
    universe.set_step(4);
    universe.step();
    universe.save_state();
    universe.step();
    assert_eq!(universe.get_generation(), 32);
    assert!(universe.load_previous_state());
    assert_eq!(universe.get_generation(), 0);
    assert_eq!(live_set(&universe), start);
    assert!(!universe.load_previous_state());
}

#[test]
fn expand_root_keeps_cells() {
    let mut universe = Universe::default();
    universe.load_pattern(&read_rle(GLIDER));
    let cells = live_set(&universe);
    let bounds = universe.bound();
    for _ in 0..5 {
        universe.expand_root();
        assert_eq!(live_set(&universe), cells);
        assert_eq!(universe.bound(), bounds);
    }
}

#[test]
fn bounds_of_nothing() {
    assert_eq!(get_bounds(&[], &[]), Bounds::default());
    let mut universe = Universe::default();
    universe.load_pattern(&[]);
    assert_eq!(universe.population(), 0);
    assert_eq!(universe.bound(), None);
}

proptest! {
    #[test]
    fn set_then_get(cells in prop::collection::vec((-5000i64..5000, -5000i64..5000), 0..64)) {
        let mut universe = Universe::default();
        for &(x, y) in &cells {
            universe.set_cell(x, y, true);
        }
        let distinct: Cells = cells.iter().copied().collect();
        prop_assert_eq!(universe.population(), distinct.len() as u64);
        for &(x, y) in &cells {
            prop_assert!(universe.get_cell(x, y));
        }
        prop_assert_eq!(live_set(&universe), distinct.clone());

        if let Some(&(x, y)) = cells.first() {
            universe.set_cell(x, y, false);
            prop_assert!(!universe.get_cell(x, y));
            prop_assert_eq!(universe.population(), distinct.len() as u64 - 1);
            for &(u, v) in distinct.iter().filter(|&&cell| cell != (x, y)) {
                prop_assert!(universe.get_cell(u, v));
            }
        }
    }

    #[test]
    fn bound_is_tight(cells in prop::collection::vec((-300i64..300, -300i64..300), 1..32)) {
        let mut universe = Universe::default();
        for &(x, y) in &cells {
            universe.set_cell(x, y, true);
        }
        let (xs, ys): (Vec<i64>, Vec<i64>) = cells.iter().copied().unzip();
        prop_assert_eq!(universe.bound(), Some(get_bounds(&xs, &ys)));
    }

    #[test]
    fn small_soups_match_naive(cells in prop::collection::vec((-6i64..6, -6i64..6), 0..40)) {
        let rule = Rule::conway();
        let mut universe = Universe::default();
        for &(x, y) in &cells {
            universe.set_cell(x, y, true);
        }
        let mut expected: Cells = cells.iter().copied().collect();
        for _ in 0..6 {
            universe.advance_one_generation();
            expected = naive_step(&expected, &rule);
        }
        prop_assert_eq!(live_set(&universe), expected);
    }
}
