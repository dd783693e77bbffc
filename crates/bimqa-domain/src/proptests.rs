//! Property-based tests for the domain crate.
//!
//! These tests use proptest to verify invariants around:
//! - Report aggregation (pass ratio bounds, item traversal)
//! - Collision detection symmetry and pair uniqueness
//! - Argument merging

use crate::geometry::{CollisionParams, find_collisions};
use crate::model::{BoundingBox, ElementId, Xyz};
use bimqa_types::{ArgMap, ArgValue, ReportItem, ReportSection, merge_args};
use proptest::prelude::*;
use std::collections::HashSet;

// ============================================================================
// Strategies for generating arbitrary values
// ============================================================================

fn arb_item() -> impl Strategy<Value = ReportItem> {
    ("[a-z]{1,8}", proptest::option::of(any::<bool>())).prop_map(|(name, passed)| {
        let item = ReportItem::new(name);
        match passed {
            Some(p) => item.with_passed(p),
            None => item,
        }
    })
}

fn arb_section() -> impl Strategy<Value = ReportSection> {
    let leaf = (prop::collection::vec(arb_item(), 0..8), any::<bool>()).prop_map(
        |(items, test)| {
            let section = if test {
                ReportSection::test("leaf")
            } else {
                ReportSection::info("leaf")
            };
            section.with_items(items)
        },
    );
    leaf.prop_recursive(3, 24, 4, |inner| {
        (
            prop::collection::vec(arb_item(), 0..4),
            prop::collection::vec(inner, 0..4),
        )
            .prop_map(|(items, children)| {
                let mut section = ReportSection::test("node").with_items(items);
                for child in children {
                    section.add_child(child);
                }
                section
            })
    })
}

fn arb_box() -> impl Strategy<Value = BoundingBox> {
    (
        -50.0f64..50.0,
        -50.0f64..50.0,
        -50.0f64..50.0,
        0.1f64..10.0,
        0.1f64..10.0,
        0.1f64..10.0,
    )
        .prop_map(|(x, y, z, w, d, h)| {
            BoundingBox::new(Xyz::new(x, y, z), Xyz::new(x + w, y + d, z + h))
        })
}

fn arb_boxes() -> impl Strategy<Value = Vec<(ElementId, Option<BoundingBox>)>> {
    prop::collection::vec(proptest::option::weighted(0.9, arb_box()), 0..12).prop_map(|boxes| {
        boxes
            .into_iter()
            .enumerate()
            .map(|(i, bb)| (ElementId(i as i64 + 1), bb))
            .collect()
    })
}

fn count_items(section: &ReportSection) -> usize {
    section.items.len() + section.children.iter().map(count_items).sum::<usize>()
}

proptest! {
    #[test]
    fn passed_ratio_is_always_within_bounds(
        section in arb_section(),
        total in proptest::option::of(0usize..20),
        passed in proptest::option::of(0usize..40),
        ratio in proptest::option::of(-2.0f64..3.0),
    ) {
        let mut section = section;
        if let Some(t) = total { section.set_total_count(t); }
        if let Some(p) = passed { section.set_passed_count(p); }
        if let Some(r) = ratio { section.set_passed_ratio(r); }
        let r = section.passed_ratio();
        prop_assert!((0.0..=1.0).contains(&r));
    }

    #[test]
    fn default_ratio_counts_failed_items(items in prop::collection::vec(arb_item(), 1..20)) {
        let failed = items.iter().filter(|i| i.is_failed()).count();
        let total = items.len();
        let section = ReportSection::test("t").with_items(items);
        let expected = (total - failed) as f64 / total as f64;
        prop_assert!((section.passed_ratio() - expected).abs() < 1e-12);
    }

    #[test]
    fn all_items_visits_every_item_once(section in arb_section()) {
        prop_assert_eq!(section.all_items().len(), count_items(&section));
        // own items come first
        let own: Vec<&ReportItem> = section.items.iter().collect();
        prop_assert_eq!(&section.all_items()[..own.len()], own.as_slice());
    }

    #[test]
    fn collisions_are_reported_once_per_unordered_pair(boxes in arb_boxes()) {
        let result = find_collisions(boxes.clone(), &CollisionParams::default());
        let mut seen = HashSet::new();
        for (a, b) in &result.pairs {
            prop_assert_ne!(a, b);
            prop_assert!(seen.insert((*a.min(b), *a.max(b))));
            prop_assert!(result.failed.contains(a) && result.failed.contains(b));
        }
        let with_box = boxes.iter().filter(|(_, bb)| bb.is_some()).count();
        prop_assert_eq!(result.checked, with_box);
        prop_assert_eq!(result.missing.len(), boxes.len() - with_box);
        prop_assert!(result.passed_count() <= result.checked);
    }

    #[test]
    fn collision_outcome_does_not_depend_on_input_order(boxes in arb_boxes()) {
        let params = CollisionParams::default();
        let forward = find_collisions(boxes.clone(), &params);
        let reversed = find_collisions(boxes.into_iter().rev(), &params);
        prop_assert_eq!(forward.failed, reversed.failed);
        prop_assert_eq!(forward.pairs.len(), reversed.pairs.len());
    }

    #[test]
    fn lower_sensitivity_never_finds_more_clashes(boxes in arb_boxes(), s in 0.05f64..1.0) {
        let loose = find_collisions(boxes.clone(), &CollisionParams::with_sensitivity(s * 0.5));
        let strict = find_collisions(boxes, &CollisionParams::with_sensitivity(s));
        prop_assert!(loose.failed.is_subset(&strict.failed));
    }

    #[test]
    fn explicit_args_always_win(
        defaults in prop::collection::btree_map("[a-c]", any::<i64>(), 0..3),
        explicit in prop::collection::btree_map("[b-d]", any::<bool>(), 0..3),
    ) {
        let defaults: ArgMap = defaults.into_iter().map(|(k, v)| (k, ArgValue::Int(v))).collect();
        let explicit: ArgMap = explicit.into_iter().map(|(k, v)| (k, ArgValue::Bool(v))).collect();
        let merged = merge_args(&defaults, &explicit);
        for (k, v) in &explicit {
            prop_assert_eq!(merged.get(k), Some(v));
        }
        for (k, v) in &defaults {
            if !explicit.contains_key(k) {
                prop_assert_eq!(merged.get(k), Some(v));
            }
        }
    }
}
