//! Bounding-box collision with proximity pruning.
//!
//! Every element is compared only with elements whose centre lies within
//! `distance_factor * half_diagonal` of its own centre. Both boxes are shrunk
//! by `sensitivity` about their centres before the overlap test, so a lower
//! sensitivity ignores shallow overlaps. The pass is a plain nested loop.

use crate::model::{BoundingBox, ElementId};
use std::collections::{BTreeSet, HashSet};

pub const DEFAULT_DISTANCE_FACTOR: f64 = 20.0;
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollisionParams {
    /// Shrink factor in `(0, 1]` applied to both boxes.
    pub sensitivity: f64,
    pub distance_factor: f64,
    pub tolerance: f64,
}

impl Default for CollisionParams {
    fn default() -> Self {
        Self {
            sensitivity: 0.8,
            distance_factor: DEFAULT_DISTANCE_FACTOR,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl CollisionParams {
    pub fn with_sensitivity(sensitivity: f64) -> Self {
        Self {
            sensitivity,
            ..Self::default()
        }
    }
}

/// Whether `other` is close enough to `base` to be collision-checked.
pub fn is_near(base: &BoundingBox, other: &BoundingBox, distance_factor: f64) -> bool {
    base.center().distance_to(other.center()) < distance_factor * base.half_diagonal()
}

pub fn collide(a: &BoundingBox, b: &BoundingBox, params: &CollisionParams) -> bool {
    a.scaled(params.sensitivity)
        .intersects(&b.scaled(params.sensitivity), params.tolerance)
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CollisionResult {
    /// Clashing pairs in discovery order, each reported once.
    pub pairs: Vec<(ElementId, ElementId)>,
    /// Every element involved in at least one clash.
    pub failed: BTreeSet<ElementId>,
    /// Number of elements with a bounding box.
    pub checked: usize,
    /// Elements skipped because they have no bounding box.
    pub missing: Vec<ElementId>,
}

impl CollisionResult {
    pub fn passed_count(&self) -> usize {
        self.checked.saturating_sub(self.failed.len())
    }
}

pub fn find_collisions<I>(candidates: I, params: &CollisionParams) -> CollisionResult
where
    I: IntoIterator<Item = (ElementId, Option<BoundingBox>)>,
{
    let mut result = CollisionResult::default();
    let mut boxes: Vec<(ElementId, BoundingBox)> = Vec::new();
    for (id, bb) in candidates {
        match bb {
            Some(bb) => boxes.push((id, bb)),
            None => {
                tracing::warn!(element = %id, "element has no bounding box");
                result.missing.push(id);
            }
        }
    }
    result.checked = boxes.len();

    let mut seen: HashSet<(ElementId, ElementId)> = HashSet::new();
    for (i, (base_id, base_bb)) in boxes.iter().enumerate() {
        for (j, (other_id, other_bb)) in boxes.iter().enumerate() {
            if i == j || base_id == other_id {
                continue;
            }
            if !is_near(base_bb, other_bb, params.distance_factor) {
                continue;
            }
            if !collide(base_bb, other_bb, params) {
                continue;
            }
            let key = (*base_id.min(other_id), *base_id.max(other_id));
            if seen.insert(key) {
                result.pairs.push((*base_id, *other_id));
                result.failed.insert(*base_id);
                result.failed.insert(*other_id);
            }
        }
    }
    result
}
