#![cfg(feature = "sync")]
//! Integration tests for sharing trees across threads.

use std::sync::Arc;
use std::thread;

use rstest::rstest;
use sylva::sync::Synchronized;
use sylva::tree::{TreeConfig, TreeMap, TreeSet};

#[rstest]
fn test_concurrent_writers_produce_valid_tree() {
    let shared = Arc::new(Synchronized::new(TreeMap::with_config(
        TreeConfig::new().with_order(3),
    )));

    let handles: Vec<_> = (0..8u32)
        .map(|worker| {
            let shared = Arc::clone(&shared);
            thread::spawn(move || {
                for key in 0..500u32 {
                    shared.with(|map| map.put(key * 8 + worker, worker));
                }
                for key in (0..500u32).step_by(2) {
                    shared.with(|map| map.remove(&(key * 8 + worker)));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let map = shared.lock();
    assert_eq!(map.len(), 8 * 250);
    map.check_invariants().unwrap();
}

#[rstest]
fn test_readers_observe_whole_operations() {
    let shared = Arc::new(Synchronized::new(TreeSet::new()));
    let writer = {
        let shared = Arc::clone(&shared);
        thread::spawn(move || {
            for element in 0..2_000u32 {
                shared.with(|set| {
                    set.add(element);
                    set.add(element + 1_000_000);
                });
            }
        })
    };

    for _ in 0..50 {
        let size = shared.with(|set| set.len());
        assert_eq!(size % 2, 0);
    }
    writer.join().unwrap();
    let set = Arc::try_unwrap(shared).ok().map(Synchronized::into_inner);
    assert_eq!(set.map(|set| set.len()), Some(4_000));
}
