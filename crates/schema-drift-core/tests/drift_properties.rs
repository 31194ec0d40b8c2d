//! Property tests for snapshot building and drift detection.

use std::collections::BTreeSet;

use proptest::prelude::*;
use schema_drift_core::{FieldAttributes, ObjectSnapshot, detect_drift};

// =============================================================================
// Strategies
// =============================================================================

/// Names come from a small pool so that generated snapshots overlap.
fn arb_field() -> impl Strategy<Value = FieldAttributes> {
    (
        prop::sample::select(vec!["ID", "NAME", "EMAIL", "AMOUNT", "CREATED_AT", "NOTE"]),
        prop::sample::select(vec!["NUMBER", "VARCHAR2", "DATE", "CHAR", "CLOB"]),
        0i64..200,
        prop::option::of(0i64..38),
        prop::option::of(-127i64..127),
        prop::option::of(any::<bool>()),
    )
        .prop_map(|(name, data_type, length, precision, scale, nullable)| {
            FieldAttributes {
                name: name.to_string(),
                data_type: data_type.to_string(),
                length,
                precision,
                scale,
                nullable,
            }
        })
}

fn arb_descriptors() -> impl Strategy<Value = Vec<FieldAttributes>> {
    prop::collection::vec(arb_field(), 0..10)
}

fn arb_snapshot() -> impl Strategy<Value = ObjectSnapshot> {
    arb_descriptors().prop_map(ObjectSnapshot::build)
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn prop_same_snapshot_has_no_drift(s in arb_snapshot()) {
        prop_assert!(detect_drift(&s, &s).is_empty());
    }

    #[test]
    fn prop_new_and_deleted_swap_with_sides(s in arb_snapshot(), t in arb_snapshot()) {
        let forward = detect_drift(&s, &t);
        let backward = detect_drift(&t, &s);
        prop_assert_eq!(&forward.new, &backward.deleted);
        prop_assert_eq!(&forward.deleted, &backward.new);
        prop_assert_eq!(forward.changed.len(), backward.changed.len());

        for (f, b) in forward.changed.iter().zip(&backward.changed) {
            prop_assert_eq!(&f.field, &b.field);
            for (fd, bd) in f.diffs.iter().zip(&b.diffs) {
                prop_assert_eq!(fd.attribute, bd.attribute);
                prop_assert_eq!(&fd.target, &bd.source);
                prop_assert_eq!(&fd.source, &bd.target);
            }
        }
    }

    #[test]
    fn prop_every_name_classified_once(s in arb_snapshot(), t in arb_snapshot()) {
        let report = detect_drift(&s, &t);

        let new: BTreeSet<&str> = report.new.iter().map(|f| f.name.as_str()).collect();
        let deleted: BTreeSet<&str> = report.deleted.iter().map(|f| f.name.as_str()).collect();
        let changed: BTreeSet<&str> = report.changed.iter().map(|c| c.field.as_str()).collect();

        let all: BTreeSet<&str> = s.names().chain(t.names()).collect();
        for name in all {
            let unchanged = s.contains(name) && t.contains(name) && s.get(name) == t.get(name);
            let hits = [
                new.contains(name),
                deleted.contains(name),
                changed.contains(name),
                unchanged,
            ]
            .iter()
            .filter(|hit| **hit)
            .count();
            prop_assert_eq!(hits, 1, "field {} classified {} times", name, hits);
        }
    }

    #[test]
    fn prop_diffs_are_non_empty_and_ordered(s in arb_snapshot(), t in arb_snapshot()) {
        for changed in detect_drift(&s, &t).changed {
            prop_assert!(!changed.diffs.is_empty());
            let attrs: Vec<_> = changed.diffs.iter().map(|d| d.attribute).collect();
            let mut sorted = attrs.clone();
            sorted.sort();
            sorted.dedup();
            prop_assert_eq!(attrs, sorted);
        }
    }

    #[test]
    fn prop_last_descriptor_wins(descriptors in arb_descriptors()) {
        let snapshot = ObjectSnapshot::build(descriptors.clone());
        for field in snapshot.fields() {
            let last = descriptors.iter().rev().find(|d| d.name == field.name);
            prop_assert_eq!(Some(field), last);
        }
        let distinct: BTreeSet<&str> = descriptors.iter().map(|d| d.name.as_str()).collect();
        prop_assert_eq!(snapshot.len(), distinct.len());
    }
}
