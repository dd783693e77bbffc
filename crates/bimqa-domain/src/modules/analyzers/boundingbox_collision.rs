use super::clash_item;
use crate::geometry::{CollisionParams, find_collisions};
use crate::model::{Element, ElementId};
use crate::operator::{Analyzer, Operator, RunContext};
use crate::registry::HostCatalog;
use bimqa_types::{ArgType, Args, ModuleSpec, ReportSection, ids};
use std::collections::HashMap;

const NAME: &str = "Boundingbox Collision Analyzer";
const DESCRIPTION: &str = "Check if bounding boxes of elements collide";

pub(super) fn spec(_: &HostCatalog) -> ModuleSpec {
    ModuleSpec::new()
        .name(NAME)
        .description(DESCRIPTION)
        .author("Junfeng Xiao")
        .returns("One failed item per clashing pair")
        .hidden()
        .arg(ids::ARG_SENSITIVITY, ArgType::Float, 0.8)
        .arg(ids::ARG_DISTANCE_FACTOR, ArgType::Float, 20.0)
}

pub(super) struct BoundingBoxCollision;

impl Operator for BoundingBoxCollision {}

impl Analyzer for BoundingBoxCollision {
    fn analyze(
        &mut self,
        ctx: &mut RunContext<'_>,
        data: &[Element],
        args: &Args,
    ) -> anyhow::Result<ReportSection> {
        let params = CollisionParams {
            sensitivity: args.float(ids::ARG_SENSITIVITY)?,
            distance_factor: args.float(ids::ARG_DISTANCE_FACTOR)?,
            ..CollisionParams::default()
        };
        let result = find_collisions(
            data.iter()
                .map(|e| (e.id, ctx.doc.bounding_box(e.id, None))),
            &params,
        );

        let by_id: HashMap<ElementId, &Element> = data.iter().map(|e| (e.id, e)).collect();
        let mut section = ReportSection::test(NAME).with_description(format!(
            "{DESCRIPTION} through {} elements",
            data.len()
        ));
        for (a, b) in &result.pairs {
            if let (Some(a), Some(b)) = (by_id.get(a), by_id.get(b)) {
                section.add_item(clash_item(a, b));
            }
        }
        section.set_total_count(result.checked);
        section.set_passed_count(result.passed_count());
        tracing::info!(
            checked = result.checked,
            clashes = result.pairs.len(),
            "bounding box collision finished"
        );
        Ok(section)
    }
}
