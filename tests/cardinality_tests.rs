#![cfg(feature = "cardinality")]
//! Integration tests for CardinalityMap.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rstest::rstest;
use sylva::tree::{CardinalityMap, TreeConfig};

fn distinct<const N: usize>(keys: &[[u8; 3]]) -> usize {
    let mut prefixes: Vec<&[u8]> = keys.iter().map(|key| &key[..N]).collect();
    prefixes.sort_unstable();
    prefixes.dedup();
    prefixes.len()
}

#[rstest]
#[case(3)]
#[case(5)]
#[case(32)]
fn test_random_churn_keeps_counts_exact(#[case] order: usize) {
    let mut rng = StdRng::seed_from_u64(order as u64);
    let mut map = CardinalityMap::with_config(TreeConfig::new().with_order(order));

    for step in 0..4_000u32 {
        let key = [rng.random_range(0..4u8), rng.random_range(0..6u8), rng.random_range(0..8u8)];
        if rng.random_bool(0.65) {
            map.put(key, step);
        } else {
            map.remove(&key);
        }
        if step % 400 == 0 {
            assert!(map.verify(), "diverged at step {step}");
        }
    }

    let keys: Vec<[u8; 3]> = map.as_map().keys().copied().collect();
    assert!(map.verify());
    assert_eq!(map.distinct_prefixes(1), distinct::<1>(&keys));
    assert_eq!(map.distinct_prefixes(2), distinct::<2>(&keys));
    assert_eq!(map.distinct_prefixes(3), keys.len());
}

#[rstest]
fn test_variable_length_keys() {
    let mut map = CardinalityMap::new();
    map.put(vec!["a"], 1);
    map.put(vec!["a", "b"], 2);
    map.put(vec!["a", "c"], 3);
    map.put(vec!["b"], 4);

    assert_eq!(map.counts(), &[2, 2]);
    assert_eq!(map.distinct_prefixes(1), 2);
    assert!(map.verify());
}

#[rstest]
fn test_clear_resets_counts() {
    let mut map = CardinalityMap::new();
    map.put((1, 'a', true), ());
    map.put((2, 'a', true), ());
    map.clear();
    assert!(map.is_empty());
    assert!(map.counts().is_empty());
    assert_eq!(map.distinct_prefixes(3), 0);
}

#[rstest]
fn test_four_part_tuples() {
    let mut map = CardinalityMap::new();
    for a in 0..2 {
        for d in 0..5 {
            map.put((a, 0, 0, d), ());
        }
    }
    assert_eq!(map.counts(), &[2, 0, 0, 8]);
    assert_eq!(map.into_inner().len(), 10);
}
