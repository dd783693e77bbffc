//! Real extent of a tag head.
//!
//! A tag's bounding box with the leader attached spans the head and the
//! leader end. To find the head alone, the leader is freed and the head moved
//! onto the leader end, which yields the head's size. The real head then sits
//! in the corner of the with-leader box opposite the leader end.
//!
//! Tag boxes are flattened to `z` in `[0, 1]` so only plan overlap counts.

use crate::document::{Document, DocumentError};
use crate::model::{BoundingBox, Element, ElementId};
use std::collections::HashMap;

/// Box of `id` as drawn in `view`, flattened to the tag plane.
pub fn tag_box(doc: &dyn Document, id: ElementId, view: ElementId) -> Option<BoundingBox> {
    doc.bounding_box(id, Some(view)).map(|bb| bb.flattened(0.0, 1.0))
}

/// Clip `with_leader` to a head-sized box in the corner opposite the
/// detached head.
pub fn reconstruct_real_box(with_leader: &BoundingBox, detached_head: &BoundingBox) -> BoundingBox {
    let whole = with_leader.center();
    let head = detached_head.center();
    let head_on_top = head.y < whole.y;
    let head_on_left = head.x > whole.x;
    let head_width = detached_head.width();
    let head_height = detached_head.height();

    let mut real = *with_leader;
    if head_on_top {
        real.min.y = real.max.y - head_height;
    } else {
        real.max.y = real.min.y + head_height;
    }
    if head_on_left {
        real.max.x = real.min.x + head_width;
    } else {
        real.min.x = real.max.x - head_width;
    }
    real
}

fn needs_head_move(tag: &Element, view: ElementId) -> bool {
    tag.owner_view == Some(view)
        && tag
            .as_tag()
            .is_some_and(|t| t.has_leader && !t.tagged.is_empty() && t.leader_end.is_some())
}

/// Per-view tag geometry. Clear it before moving to another view.
#[derive(Debug, Default)]
pub struct TagGeometryCache {
    with_leader: HashMap<ElementId, Option<BoundingBox>>,
    head: HashMap<ElementId, Option<BoundingBox>>,
    real: HashMap<ElementId, Option<BoundingBox>>,
}

impl TagGeometryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.with_leader.clear();
        self.head.clear();
        self.real.clear();
    }

    /// Record with-leader boxes of the leadered tags owned by `view`, free
    /// their leaders, then record the detached head boxes.
    ///
    /// Modifies the model: call inside a transaction group.
    pub fn precalculate(
        &mut self,
        doc: &mut dyn Document,
        tags: &[&Element],
        view: ElementId,
    ) -> Result<(), DocumentError> {
        let moved: Vec<ElementId> = tags
            .iter()
            .filter(|t| needs_head_move(t, view))
            .map(|t| t.id)
            .collect();

        for &id in &moved {
            self.with_leader.insert(id, tag_box(doc, id, view));
        }
        for &id in &moved {
            doc.free_tag_leader(id)?;
        }
        for &id in &moved {
            self.head.insert(id, tag_box(doc, id, view));
        }
        tracing::debug!(view = %view, tags = moved.len(), "tag heads moved");
        Ok(())
    }

    /// Real head box of `tag`, or `None` (and `tag` pushed onto `missing`)
    /// when no box can be obtained.
    ///
    /// `tag` must describe the tag as it was before `precalculate`.
    pub fn real_box(
        &mut self,
        doc: &dyn Document,
        tag: &Element,
        view: ElementId,
        missing: &mut Vec<ElementId>,
    ) -> Option<BoundingBox> {
        let id = tag.id;
        if let Some(hit) = self.real.get(&id) {
            return *hit;
        }

        let Some(facet) = tag.as_tag() else {
            return self.plain(doc, id, view, missing);
        };
        if !facet.has_leader || facet.tagged.is_empty() || facet.leader_end.is_none() {
            return self.plain(doc, id, view, missing);
        }

        let with_leader = match self.with_leader.get(&id) {
            Some(bb) => *bb,
            None => tag_box(doc, id, view),
        };
        let head = self.head.get(&id).copied().flatten();
        let (Some(with_leader), Some(head)) = (with_leader, head) else {
            missing.push(id);
            self.real.insert(id, None);
            return None;
        };

        let real = reconstruct_real_box(&with_leader, &head);
        tracing::debug!(tag = %id, ?real, "real tag box");
        self.real.insert(id, Some(real));
        Some(real)
    }

    fn plain(
        &mut self,
        doc: &dyn Document,
        id: ElementId,
        view: ElementId,
        missing: &mut Vec<ElementId>,
    ) -> Option<BoundingBox> {
        let bb = tag_box(doc, id, view);
        if bb.is_none() {
            missing.push(id);
        }
        self.real.insert(id, bb);
        bb
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Xyz;
    use crate::test_support::{doc_with, tag, tagging, view};
    use crate::transaction::TransactionGroup;

    fn bb(x0: f64, y0: f64, x1: f64, y1: f64) -> BoundingBox {
        BoundingBox::new(Xyz::new(x0, y0, 0.0), Xyz::new(x1, y1, 1.0))
    }

    #[test]
    fn head_above_left_when_leader_runs_down_right() {
        let with_leader = bb(-1.0, -5.0, 10.0, 0.5);
        let detached = bb(9.0, -5.5, 11.0, -4.5);
        assert_eq!(
            reconstruct_real_box(&with_leader, &detached),
            bb(-1.0, -0.5, 1.0, 0.5)
        );
    }

    #[test]
    fn head_below_right_when_leader_runs_up_left() {
        let with_leader = bb(0.0, 0.0, 10.0, 6.0);
        let detached = bb(-1.0, 5.5, 1.0, 6.5);
        assert_eq!(
            reconstruct_real_box(&with_leader, &detached),
            bb(8.0, 0.0, 10.0, 1.0)
        );
    }

    #[test]
    fn probing_recovers_the_head_and_rolls_back() {
        let original = tagging(
            tag(2, 1, Xyz::new(0.0, 0.0, 0.0), Some(Xyz::new(10.0, -5.0, 0.0))),
            &[100],
        );
        let mut doc = doc_with(vec![view(1, "Plan"), original.clone()]);
        let mut cache = TagGeometryCache::new();
        let mut missing = Vec::new();

        let real = {
            let mut group = TransactionGroup::start(&mut doc, "measure").expect("start");
            cache
                .precalculate(&mut *group, &[&original], ElementId(1))
                .expect("precalculate");
            cache.real_box(&*group, &original, ElementId(1), &mut missing)
        };

        // `tag` heads are 2 x 1
        assert_eq!(real, Some(bb(-1.0, -0.5, 1.0, 0.5)));
        assert!(missing.is_empty());
        assert_eq!(
            doc.bounding_box(ElementId(2), None).map(|b| b.max.x),
            Some(10.0)
        );
    }

    #[test]
    fn unmoved_leader_tags_are_reported_missing() {
        let t = tagging(
            tag(2, 1, Xyz::new(0.0, 0.0, 0.0), Some(Xyz::new(3.0, 3.0, 0.0))),
            &[100],
        );
        let doc = doc_with(vec![view(1, "Plan"), t.clone()]);
        let mut cache = TagGeometryCache::new();
        let mut missing = Vec::new();

        assert_eq!(cache.real_box(&doc, &t, ElementId(1), &mut missing), None);
        assert_eq!(missing, vec![ElementId(2)]);
    }
}
