//! Property-based tests for TreeSet.

use std::collections::BTreeSet;

use proptest::prelude::*;
use sylva::tree::{TreeConfig, TreeSet};

fn build(order: usize, elements: &[i16]) -> TreeSet<i16> {
    let mut set = TreeSet::with_config(TreeConfig::new().with_order(order));
    set.add_all(elements.iter().copied());
    set
}

proptest! {
    /// Law: a set built from any sequence equals the model set.
    #[test]
    fn prop_set_matches_model(
        order in 3..10usize,
        elements in prop::collection::vec(any::<i16>(), 0..500)
    ) {
        let set = build(order, &elements);
        let model: BTreeSet<i16> = elements.iter().copied().collect();
        prop_assert!(set.check_invariants().is_ok());
        prop_assert!(set.iter().eq(model.iter()));
    }

    /// Law: every present element is its own floor and ceiling.
    #[test]
    fn prop_present_elements_are_fixed_points(
        order in 3..10usize,
        elements in prop::collection::vec(any::<i16>(), 1..200)
    ) {
        let set = build(order, &elements);
        for element in &elements {
            prop_assert_eq!(set.floor(element), Some(element));
            prop_assert_eq!(set.ceiling(element), Some(element));
        }
    }

    /// Law: lower and higher step to the neighbouring elements.
    #[test]
    fn prop_lower_and_higher_are_neighbours(
        elements in prop::collection::vec(any::<i16>(), 2..200)
    ) {
        let set = build(3, &elements);
        let ordered: Vec<i16> = set.iter().copied().collect();
        for pair in ordered.windows(2) {
            prop_assert_eq!(set.lower(&pair[1]), Some(&pair[0]));
            prop_assert_eq!(set.higher(&pair[0]), Some(&pair[1]));
        }
    }

    /// Law: cursor removal of a predicate leaves exactly the survivors.
    #[test]
    fn prop_cursor_removal_keeps_survivors(
        order in 3..8usize,
        elements in prop::collection::vec(any::<i16>(), 0..300),
        modulus in 2..5i16
    ) {
        let mut set = build(order, &elements);
        let before = set.len();
        let mut removed = 0;
        let mut cursor = set.cursor_mut();
        while let Some(element) = cursor.next() {
            if element.rem_euclid(modulus) == 0 {
                cursor.remove().unwrap();
                removed += 1;
            }
        }
        prop_assert_eq!(set.len(), before - removed);
        prop_assert!(set.check_invariants().is_ok());
        prop_assert!(set.iter().all(|element| element.rem_euclid(modulus) != 0));
        let model: BTreeSet<i16> = elements
            .into_iter()
            .filter(|element| element.rem_euclid(modulus) != 0)
            .collect();
        prop_assert!(set.iter().eq(model.iter()));
    }
}
