//! Integration tests for TreeSet.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rstest::rstest;
use sylva::tree::{ReverseOrder, Seek, TreeConfig, TreeError, TreeSet};

// =============================================================================
// Basic Operations
// =============================================================================

#[rstest]
fn test_new_creates_empty_set() {
    let set: TreeSet<i32> = TreeSet::new();
    assert!(set.is_empty());
    assert_eq!(set.first(), None);
    assert_eq!(set.iter().next(), None);
}

#[rstest]
fn test_add_reports_novelty() {
    let mut set = TreeSet::new();
    assert!(set.add("b"));
    assert!(set.add("a"));
    assert!(!set.add("b"));
    assert_eq!(set.len(), 2);
    assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec!["a", "b"]);
}

#[rstest]
fn test_remove_absent_element_is_not_found() {
    let mut set: TreeSet<i32> = (0..10).collect();
    assert!(!set.remove(&42));
    assert_eq!(set.len(), 10);
}

#[rstest]
#[case(3)]
#[case(4)]
#[case(9)]
fn test_shuffled_add_and_remove_keep_order(#[case] order: usize) {
    let mut elements: Vec<u32> = (0..3_000).collect();
    let mut rng = StdRng::seed_from_u64(order as u64);
    elements.shuffle(&mut rng);

    let mut set = TreeSet::with_config(TreeConfig::new().with_order(order));
    for element in &elements {
        assert!(set.add(*element));
    }
    set.check_invariants().unwrap();
    assert!(set.iter().copied().eq(0..3_000));

    elements.shuffle(&mut rng);
    let (removed, kept) = elements.split_at(1_500);
    for element in removed {
        assert!(set.remove(element));
    }
    set.check_invariants().unwrap();

    let mut survivors = kept.to_vec();
    survivors.sort_unstable();
    assert_eq!(set.iter().copied().collect::<Vec<_>>(), survivors);
}

#[rstest]
fn test_pop_drains_from_both_ends() {
    let mut set: TreeSet<i32> = (0..6).collect();
    assert_eq!(set.pop_first(), Some(0));
    assert_eq!(set.pop_last(), Some(5));
    assert_eq!(set.into_iter().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
}

#[rstest]
fn test_reverse_ordered_set() {
    let set: TreeSet<i32, ReverseOrder> = (0..5).collect();
    assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![4, 3, 2, 1, 0]);
    assert_eq!(set.ceiling(&2), Some(&2));
    assert_eq!(set.higher(&2), Some(&1));
}

// =============================================================================
// Cursors
// =============================================================================

#[rstest]
fn test_cursor_at_floor_and_ceiling() {
    let set: TreeSet<i32> = (0..20).map(|element| element * 5).collect();

    let mut ceiling = set.cursor_at(&12, Seek::Ceiling);
    assert_eq!(ceiling.next(), Some(&15));
    assert_eq!(ceiling.peek_previous(), Some(&15));

    let mut floor = set.cursor_at(&12, Seek::Floor);
    assert_eq!(floor.next(), Some(&10));
    assert_eq!(floor.previous(), Some(&10));
    assert_eq!(floor.previous(), Some(&5));
}

#[rstest]
fn test_cursor_remove_every_other_element() {
    let mut set: TreeSet<i32> = (0..100).collect();
    let mut cursor = set.cursor_mut();
    while let Some(element) = cursor.next() {
        if element % 2 == 1 {
            cursor.remove().unwrap();
        }
    }
    assert_eq!(set.len(), 50);
    assert!(set.iter().all(|element| element % 2 == 0));
    set.check_invariants().unwrap();
}

#[rstest]
fn test_cursor_remove_without_current_fails() {
    let mut set: TreeSet<i32> = (0..3).collect();
    let mut cursor = set.cursor_mut();
    assert_eq!(cursor.remove(), Err(TreeError::NoCurrentEntry));
    cursor.next();
    assert_eq!(cursor.remove(), Ok(0));
    assert_eq!(cursor.remove(), Err(TreeError::NoCurrentEntry));
}

// =============================================================================
// Range Views
// =============================================================================

#[rstest]
fn test_head_sub_tail_sets() {
    let set: TreeSet<i32> = (0..50).collect();
    assert_eq!(set.head_set(4).iter().copied().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
    assert_eq!(set.sub_set(10, 12).iter().copied().collect::<Vec<_>>(), vec![10, 11, 12]);
    assert_eq!(set.tail_set(47).iter().rev().copied().collect::<Vec<_>>(), vec![49, 48, 47]);
    assert!(set.sub_set(20, 30).contains(&25));
    assert!(!set.sub_set(20, 30).contains(&31));
    assert_eq!(set.tail_set(100).len(), 0);
}

#[rstest]
fn test_tail_set_mut_drains_range_only() {
    let mut set: TreeSet<i32> = (0..50).collect();
    {
        let mut tail = set.tail_set_mut(40);
        assert_eq!(tail.len(), 10);
        let mut cursor = tail.cursor_mut();
        while cursor.next().is_some() {
            cursor.remove().unwrap();
        }
    }
    assert_eq!(set.len(), 40);
    assert_eq!(set.last(), Some(&39));
}

#[rstest]
fn test_string_elements_are_found_by_str() {
    let mut set: TreeSet<String> = ["oak", "ash", "elm", "yew", "fir"]
        .into_iter()
        .map(String::from)
        .collect();
    assert!(set.contains("elm"));
    assert_eq!(set.get("ash").map(String::as_str), Some("ash"));
    assert!(set.remove("yew"));
    assert!(!set.remove("yew"));
    assert_eq!(set.take("oak"), Some("oak".to_string()));
    assert_eq!(set.iter().map(String::as_str).collect::<Vec<_>>(), vec!["ash", "elm", "fir"]);
}
