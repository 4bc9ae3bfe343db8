use std::collections::HashSet;

use prismloop_compiler::enumerate::{assignment_count, enumerate};
use prismloop_compiler::expand::ExpandError;
use prismloop_ir::types::BoundedVariable;
use proptest::prelude::*;

fn var(name: &str, low: i64, high: i64) -> BoundedVariable {
    BoundedVariable::new(name, low, high, low).unwrap()
}

#[test]
fn test_require_reports_missing_position() {
    let x = var("x", 3, 4);
    let first = enumerate([&x]).next().unwrap();
    assert_eq!(first.require(0).unwrap(), 3);
    assert!(matches!(
        first.require(1),
        Err(ExpandError::Unassigned { index: 1, .. })
    ));
}

#[test]
fn test_full_width_product_saturates() {
    let wide = var("w", i64::MIN, i64::MAX);
    assert_eq!(assignment_count([&wide, &wide]), u64::MAX);

    let mut assignments = enumerate([&wide, &wide]);
    assert_eq!(assignments.size_hint(), (usize::MAX, None));
    let first = assignments.next().unwrap();
    assert_eq!(first.value_at(0), Some(i64::MIN));
    assert_eq!(first.value_at(1), Some(i64::MIN));
}

#[test]
fn test_zero_variables_yield_zero_assignments() {
    let none: Vec<&BoundedVariable> = Vec::new();
    assert_eq!(enumerate(none.clone()).count(), 0);
    assert_eq!(assignment_count(none), 0);
}

#[test]
fn test_single_variable_yields_one_pair_per_value() {
    let x = var("x", -1, 2);
    let all: Vec<_> = enumerate([&x]).collect();
    assert_eq!(all.len(), 4);
    for (assignment, expected) in all.iter().zip(-1..=2) {
        assert_eq!(assignment.len(), 1);
        assert_eq!(assignment.pairs()[0], ("x".to_string(), expected));
    }
}

#[test]
fn test_assignment_order_matches_variable_order() {
    let a = var("a", 0, 1);
    let b = var("b", 0, 2);
    let c = var("c", 7, 7);
    let guards: Vec<String> = enumerate([&a, &b, &c]).map(|j| j.to_string()).collect();
    assert_eq!(
        guards,
        vec![
            "a=0 & b=0 & c=7",
            "a=0 & b=1 & c=7",
            "a=0 & b=2 & c=7",
            "a=1 & b=0 & c=7",
            "a=1 & b=1 & c=7",
            "a=1 & b=2 & c=7",
        ]
    );
}

#[test]
fn test_enumeration_uses_enum_range_not_declared_range() {
    let est = BoundedVariable::new("est", -5, 5, 0)
        .unwrap()
        .with_enum_range(-1, 1)
        .unwrap();
    let values: Vec<i64> = enumerate([&est]).map(|j| j.get("est").unwrap()).collect();
    assert_eq!(values, vec![-1, 0, 1]);
}

#[test]
fn test_empty_enum_range_empties_the_product() {
    let a = var("a", 0, 3);
    let b = var("b", 0, 3).with_enum_range(2, 1).unwrap();
    assert_eq!(enumerate([&a, &b]).count(), 0);
    assert_eq!(assignment_count([&a, &b]), 0);
}

#[test]
fn test_symbolic_variable_enumerates_nothing() {
    let k = BoundedVariable::symbolic("k", 0, "N", 1).unwrap();
    assert_eq!(enumerate([&k]).count(), 0);
}

#[test]
fn test_lookup_by_name() {
    let a = var("a", 0, 0);
    let b = var("b", 3, 3);
    let only = enumerate([&a, &b]).next().unwrap();
    assert_eq!(only.get("b"), Some(3));
    assert_eq!(only.get("missing"), None);
}

proptest! {
    #[test]
    fn prop_enumeration_is_complete_and_ordered(
        ranges in prop::collection::vec((-3i64..3, 0i64..4), 1..4)
    ) {
        let vars: Vec<BoundedVariable> = ranges
            .iter()
            .enumerate()
            .map(|(i, (low, width))| var(&format!("v{i}"), *low, low + width))
            .collect();
        let expected: u64 = ranges.iter().map(|(_, width)| (*width + 1) as u64).product();

        let assignments: Vec<Vec<i64>> = enumerate(&vars)
            .map(|j| j.iter().map(|(_, value)| value).collect())
            .collect();

        prop_assert_eq!(assignments.len() as u64, expected);
        prop_assert_eq!(assignment_count(&vars), expected);

        let unique: HashSet<&Vec<i64>> = assignments.iter().collect();
        prop_assert_eq!(unique.len(), assignments.len());

        // Lexicographic order over list position == first varies slowest.
        let mut sorted = assignments.clone();
        sorted.sort();
        prop_assert_eq!(sorted, assignments.clone());

        for values in &assignments {
            for (value, (low, width)) in values.iter().zip(&ranges) {
                prop_assert!(*value >= *low && *value <= low + width);
            }
        }
    }
}
