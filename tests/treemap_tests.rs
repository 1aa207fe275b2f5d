//! Integration tests for TreeMap.
//!
//! The stress suites are generated once per tree order with `paste`, so the
//! split, merge and redistribution paths are exercised at every fill shape.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rstest::rstest;
use sylva::tree::{Append, ReverseOrder, SearchStrategy, TreeConfig, TreeMap};

// =============================================================================
// Helpers
// =============================================================================

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn shuffled(count: u32, seed: u64) -> Vec<u32> {
    let mut keys: Vec<u32> = (0..count).collect();
    keys.shuffle(&mut StdRng::seed_from_u64(seed));
    keys
}

/// A value that counts how many times it has been dropped.
#[derive(Debug)]
struct Tracked {
    drops: Arc<AtomicUsize>,
}

impl Tracked {
    fn new(drops: &Arc<AtomicUsize>) -> Self {
        Self {
            drops: Arc::clone(drops),
        }
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}

fn assert_ascending<V>(map: &TreeMap<u32, V>) {
    let keys: Vec<u32> = map.keys().copied().collect();
    assert!(keys.windows(2).all(|pair| pair[0] < pair[1]));
    assert_eq!(keys.len(), map.len());
}

fn random_insert_then_remove_all(config: TreeConfig) {
    init_tracing();
    let drops = Arc::new(AtomicUsize::new(0));
    let mut map = TreeMap::with_config(config);
    let keys = shuffled(2_000, 7);
    for key in &keys {
        assert!(map.put(*key, Tracked::new(&drops)).is_none());
    }
    map.check_invariants().unwrap();
    assert_ascending(&map);

    let mut removal = keys.clone();
    removal.shuffle(&mut StdRng::seed_from_u64(11));
    for (removed, key) in removal.iter().enumerate() {
        assert!(map.remove(key).is_some());
        if removed % 97 == 0 {
            map.check_invariants().unwrap();
        }
    }

    assert!(map.is_empty());
    assert_eq!(map.height(), 0);
    assert_eq!(drops.load(Ordering::SeqCst), keys.len());
}

fn interleaved_random_operations(config: TreeConfig) {
    let mut rng = StdRng::seed_from_u64(config.order() as u64);
    let mut map = TreeMap::with_config(config);
    let mut model = std::collections::BTreeMap::new();

    for step in 0..5_000u32 {
        let key = rng.random_range(0..800u32);
        if rng.random_bool(0.6) {
            assert_eq!(map.put(key, step), model.insert(key, step));
        } else {
            assert_eq!(map.remove(&key), model.remove(&key));
        }
        if step % 500 == 0 {
            map.check_invariants().unwrap();
        }
    }

    map.check_invariants().unwrap();
    assert_eq!(map.len(), model.len());
    assert!(map.iter().map(|(key, value)| (*key, *value)).eq(model.into_iter()));
}

fn descending_inserts_then_ascending_removals(config: TreeConfig) {
    let mut map = TreeMap::with_config(config);
    for key in (0..1_500u32).rev() {
        map.put(key, key);
    }
    map.check_invariants().unwrap();
    for key in 0..1_500u32 {
        assert_eq!(map.first_key(), Some(&key));
        assert_eq!(map.remove(&key), Some(key));
    }
    assert!(map.is_empty());
}

fn appended_keys_stay_balanced(config: TreeConfig) {
    let mut map = TreeMap::with_config(config);
    for key in 0..3_000u32 {
        assert_eq!(map.append(key, ()), Append::Appended);
    }
    map.check_invariants().unwrap();
    assert_eq!(map.len(), 3_000);
    assert_eq!(map.last_key(), Some(&2_999));
}

macro_rules! order_suite {
    ($($order:literal),+ $(,)?) => {
        paste::paste! {
            $(
                mod [<order_ $order>] {
                    use super::*;

                    fn config(search: SearchStrategy, slotted: bool) -> TreeConfig {
                        TreeConfig::new()
                            .with_order($order)
                            .with_search(search)
                            .with_slotted(slotted)
                    }

                    #[rstest]
                    fn test_random_insert_then_remove_all(
                        #[values(SearchStrategy::Linear, SearchStrategy::Binary)] search: SearchStrategy,
                        #[values(false, true)] slotted: bool,
                    ) {
                        random_insert_then_remove_all(config(search, slotted));
                    }

                    #[rstest]
                    fn test_interleaved_random_operations(
                        #[values(false, true)] slotted: bool,
                    ) {
                        interleaved_random_operations(config(SearchStrategy::Binary, slotted));
                    }

                    #[rstest]
                    fn test_descending_inserts_then_ascending_removals() {
                        descending_inserts_then_ascending_removals(config(SearchStrategy::Linear, false));
                    }

                    #[rstest]
                    fn test_appended_keys_stay_balanced() {
                        appended_keys_stay_balanced(config(SearchStrategy::Binary, true));
                    }
                }
            )+
        }
    };
}

order_suite!(3, 4, 5, 7, 16, 64);

// =============================================================================
// Basic Operations
// =============================================================================

#[rstest]
fn test_new_creates_empty_map() {
    let map: TreeMap<i32, String> = TreeMap::new();
    assert!(map.is_empty());
    assert_eq!(map.len(), 0);
    assert_eq!(map.first_key(), None);
    assert_eq!(map.last_entry(), None);
}

#[rstest]
fn test_default_creates_empty_map() {
    let map: TreeMap<i32, String> = TreeMap::default();
    assert!(map.is_empty());
}

#[rstest]
fn test_put_returns_previous_value() {
    let mut map = TreeMap::new();
    assert_eq!(map.put(1, "one"), None);
    assert_eq!(map.put(1, "uno"), Some("one"));
    assert_eq!(map.get(&1), Some(&"uno"));
    assert_eq!(map.len(), 1);
}

#[rstest]
fn test_remove_absent_key_keeps_size() {
    let mut map: TreeMap<i32, i32> = (0..50).map(|key| (key, key)).collect();
    let modification = map.modification();
    assert_eq!(map.remove(&100), None);
    assert_eq!(map.len(), 50);
    assert_eq!(map.modification(), modification);
}

#[rstest]
fn test_round_trip_for_surviving_keys() {
    let mut map = TreeMap::with_config(TreeConfig::new().with_order(3));
    for key in 0..400u32 {
        map.put(key, key * 3);
    }
    for key in (0..400u32).filter(|key| key % 3 == 0) {
        map.remove(&key);
    }
    for key in 0..400u32 {
        let expected = (key % 3 != 0).then_some(key * 3);
        assert_eq!(map.get(&key).copied(), expected);
    }
}

#[rstest]
fn test_replacement_drops_previous_value_once() {
    let drops = Arc::new(AtomicUsize::new(0));
    let mut map = TreeMap::new();
    map.put(1, Tracked::new(&drops));
    let previous = map.put(1, Tracked::new(&drops));
    assert_eq!(drops.load(Ordering::SeqCst), 0);
    drop(previous);
    assert_eq!(drops.load(Ordering::SeqCst), 1);
    drop(map);
    assert_eq!(drops.load(Ordering::SeqCst), 2);
}

#[rstest]
fn test_clear_drops_every_value() {
    let drops = Arc::new(AtomicUsize::new(0));
    let mut map = TreeMap::with_config(TreeConfig::new().with_order(4));
    for key in 0..300 {
        map.put(key, Tracked::new(&drops));
    }
    map.clear();
    assert!(map.is_empty());
    assert_eq!(map.height(), 0);
    assert_eq!(drops.load(Ordering::SeqCst), 300);
}

#[rstest]
fn test_get_mut_updates_in_place() {
    let mut map: TreeMap<&str, Vec<i32>> = TreeMap::new();
    map.put("a", vec![1]);
    map.get_mut(&"a").unwrap().push(2);
    assert_eq!(map[&"a"], vec![1, 2]);
}

#[rstest]
fn test_iter_mut_and_values_mut() {
    let mut map: TreeMap<i32, i32> = (0..100).map(|key| (key, key)).collect();
    for (key, value) in map.iter_mut() {
        *value += key;
    }
    for value in map.values_mut() {
        *value += 1;
    }
    assert!(map.iter().all(|(key, value)| *value == key * 2 + 1));
}

#[rstest]
fn test_owned_iteration_is_ordered_and_reversible() {
    let map: TreeMap<i32, char> = [(3, 'c'), (1, 'a'), (2, 'b')].into_iter().collect();
    let forward: Vec<_> = map.clone().into_iter().collect();
    let backward: Vec<_> = map.into_iter().rev().collect();
    assert_eq!(forward, vec![(1, 'a'), (2, 'b'), (3, 'c')]);
    assert_eq!(backward, vec![(3, 'c'), (2, 'b'), (1, 'a')]);
}

#[rstest]
fn test_iter_is_double_ended_and_exact() {
    let map: TreeMap<i32, ()> = (0..10).map(|key| (key, ())).collect();
    let mut iter = map.keys();
    assert_eq!(iter.len(), 10);
    assert_eq!(iter.next(), Some(&0));
    assert_eq!(iter.next_back(), Some(&9));
    assert_eq!(iter.len(), 8);
    assert_eq!(iter.rev().copied().collect::<Vec<_>>(), (1..9).rev().collect::<Vec<_>>());
}

#[rstest]
fn test_reverse_order_comparator() {
    let mut map = TreeMap::with_comparator(ReverseOrder);
    for key in 0..20 {
        map.put(key, ());
    }
    assert_eq!(map.first_key(), Some(&19));
    assert_eq!(map.lower_key(&10), Some(&11));
    assert_eq!(map.higher_key(&10), Some(&9));
    map.check_invariants().unwrap();
}

#[rstest]
fn test_closure_comparator_orders_case_insensitively() {
    let by_lowercase = |left: &String, right: &String| left.to_lowercase().cmp(&right.to_lowercase());
    let mut map = TreeMap::with_comparator(by_lowercase);
    map.put("b".to_string(), 1);
    map.put("A".to_string(), 2);
    map.put("a".to_string(), 3);
    assert_eq!(map.len(), 2);
    assert_eq!(map.get(&"A".to_string()), Some(&3));
}

#[rstest]
fn test_put_all_into_collects_replaced_entries() {
    let mut map: TreeMap<i32, &str> = [(1, "a"), (2, "b")].into_iter().collect();
    let mut replaced = TreeMap::new();
    map.put_all_into([(2, "B"), (3, "C")], &mut replaced);
    assert_eq!(replaced.iter().collect::<Vec<_>>(), vec![(&2, &"b")]);
    assert_eq!(map.len(), 3);
}

#[rstest]
fn test_transfer_moves_entries_and_empties_source() {
    let mut source: TreeMap<i32, i32> = (0..100).map(|key| (key, key)).collect();
    let mut target: TreeMap<i32, i32> = (500..510).map(|key| (key, key)).collect();
    source.transfer_to(&mut target);
    assert!(source.is_empty());
    assert_eq!(target.len(), 100);
    assert_eq!(target.first_key(), Some(&0));
    assert!(!target.contains_key(&500));
    target.check_invariants().unwrap();
}

#[rstest]
fn test_pop_first_and_last_drain_in_order() {
    let mut map: TreeMap<i32, ()> = (0..200).map(|key| (key, ())).collect();
    for expected in 0..100 {
        assert_eq!(map.pop_first(), Some((expected, ())));
        assert_eq!(map.pop_last(), Some((199 - expected, ())));
    }
    assert_eq!(map.pop_first(), None);
    assert_eq!(map.height(), 0);
}

#[rstest]
fn test_equality_ignores_tree_shape() {
    let narrow: TreeMap<i32, i32> = {
        let mut map = TreeMap::with_config(TreeConfig::new().with_order(3));
        map.extend((0..100).map(|key| (key, key)));
        map
    };
    let wide: TreeMap<i32, i32> = (0..100).rev().map(|key| (key, key)).collect();
    assert_eq!(narrow, wide);
}

#[rstest]
fn test_height_grows_logarithmically() {
    let mut map = TreeMap::with_config(TreeConfig::new().with_order(16));
    for key in 0..100_000u32 {
        map.put(key, ());
    }
    assert!(map.height() <= 6, "height {}", map.height());
}

#[rstest]
fn test_string_keys_are_found_by_str() {
    let mut map = TreeMap::with_config(TreeConfig::new().with_order(3));
    for word in ["pear", "fig", "apple", "plum", "kiwi", "lime", "date"] {
        map.put(word.to_string(), word.len());
    }
    assert_eq!(map.get("plum"), Some(&4));
    assert_eq!(map.get_key_value("fig").map(|(key, _)| key.as_str()), Some("fig"));
    assert!(map.contains_key("kiwi"));
    assert!(!map.contains_key("grape"));
    if let Some(value) = map.get_mut("lime") {
        *value = 40;
    }
    assert_eq!(map.get("lime"), Some(&40));
    assert_eq!(map.remove("apple"), Some(5));
    assert_eq!(map.remove_entry("date"), Some(("date".to_string(), 4)));
    assert_eq!(map.remove("apple"), None);
    map.check_invariants().unwrap();
    assert_eq!(map.len(), 5);
}
