//! Tag overlap per view.
//!
//! Tags with a leader report a box spanning head and leader end, so the real
//! head box is reconstructed first (see [`crate::geometry::tag_bbox`]). That
//! needs model edits, which happen inside a transaction group that is always
//! rolled back.

use super::{by_owner_view, clash_item};
use crate::geometry::{CollisionParams, TagGeometryCache, find_collisions};
use crate::model::{Element, ElementId};
use crate::modules::tags_in_views;
use crate::operator::{Analyzer, Operator, RunContext};
use crate::registry::HostCatalog;
use crate::transaction::TransactionGroup;
use bimqa_types::{ArgMap, ArgType, ArgValue, Args, ModuleSpec, ReportItem, ReportSection, ids};
use std::collections::HashMap;

const NAME: &str = "Check if tags overlap";
const MAX_VIEW_NAME: usize = 50;

pub(super) fn spec(_: &HostCatalog) -> ModuleSpec {
    ModuleSpec::new()
        .name(NAME)
        .description("Check if tags overlap each other in every view.")
        .returns("One section per view with overlapping tags")
        .arg(ids::ARG_SENSITIVITY, ArgType::Float, 0.5)
        .arg(ids::ARG_REPORT_BB_ERROR, ArgType::Bool, true)
        .arg(ids::ARG_REPORT_SECTION_NAME, ArgType::String, NAME)
}

pub(super) fn in_views_spec(_: &HostCatalog) -> ModuleSpec {
    ModuleSpec::new()
        .name("Check if tags overlap in views")
        .description("Check if tags overlap in the collected views.")
        .returns("One section per view with overlapping tags")
        .hidden()
        .arg(ids::ARG_IGNORE_FLOW_DIRECTION_ARROWS, ArgType::Bool, true)
        .arg(ids::ARG_INCLUDE_SPATIAL_TAGS, ArgType::Bool, true)
        .arg(ids::ARG_SENSITIVITY_TITLE, ArgType::Float, 0.6)
}

fn short_view_name(name: &str) -> String {
    if name.chars().count() > MAX_VIEW_NAME {
        let head: String = name.chars().take(MAX_VIEW_NAME).collect();
        format!("{head}...")
    } else {
        name.to_string()
    }
}

pub(super) struct TagCollision;

impl Operator for TagCollision {}

impl Analyzer for TagCollision {
    fn analyze(
        &mut self,
        ctx: &mut RunContext<'_>,
        data: &[Element],
        args: &Args,
    ) -> anyhow::Result<ReportSection> {
        let params = CollisionParams::with_sensitivity(args.float(ids::ARG_SENSITIVITY)?);
        let report_bb_error = args.bool(ids::ARG_REPORT_BB_ERROR)?;
        let mut parent = ReportSection::info(args.string(ids::ARG_REPORT_SECTION_NAME)?)
            .with_description(format!("Check if tags overlap through {} tags", data.len()));

        let groups = by_owner_view(data);
        let total = groups.len();
        let mut processed = 0;
        let mut clean = 0;
        let mut missing: Vec<(String, &Element)> = Vec::new();

        let ui = &mut *ctx.ui;
        let mut group = TransactionGroup::start(&mut *ctx.doc, "Check tag collision")?;
        let mut cache = TagGeometryCache::new();

        for (index, (view_id, tags)) in groups.into_iter().enumerate() {
            let (view_name, is_3d) = match group.element(view_id) {
                Some(view) => (view.display_name().to_string(), view.is_3d_view()),
                None => {
                    tracing::warn!(view = %view_id, "owner view not found");
                    continue;
                }
            };
            if is_3d {
                continue;
            }
            if ui.is_cancelled() {
                tracing::warn!(done = index, total, "tag collision check cancelled");
                break;
            }
            ui.update_progress(index + 1, total);
            tracing::info!(view = %view_name, tags = tags.len(), "checking tag overlap");

            cache.clear();
            cache.precalculate(&mut *group, &tags, view_id)?;
            let mut missing_ids = Vec::new();
            let boxes: Vec<(ElementId, Option<_>)> = tags
                .iter()
                .map(|t| (t.id, cache.real_box(&*group, t, view_id, &mut missing_ids)))
                .collect();
            let by_id: HashMap<ElementId, &Element> = tags.iter().map(|t| (t.id, *t)).collect();
            missing.extend(
                missing_ids
                    .iter()
                    .filter_map(|id| by_id.get(id))
                    .map(|t| (view_name.clone(), *t)),
            );

            let result = find_collisions(boxes.into_iter().filter(|(_, bb)| bb.is_some()), &params);
            processed += 1;

            let mut child = ReportSection::test(format!("In view {}", short_view_name(&view_name)))
                .with_description(format!("In view `{view_name}`"))
                .with_max_printed_items(100);
            for (a, b) in &result.pairs {
                if let (Some(a), Some(b)) = (by_id.get(a), by_id.get(b)) {
                    child.add_item(clash_item(a, b));
                }
            }
            child.set_total_count(result.checked);
            child.set_passed_count(result.passed_count());

            if child.has_failures() {
                parent.add_child(child);
            } else {
                clean += 1;
            }
        }
        drop(group);

        parent.set_total_count(processed);
        parent.set_passed_count(clean);

        if report_bb_error && !missing.is_empty() {
            let mut errors = ReportSection::test("Tag Bounding Box Error").with_max_printed_items(200);
            for (view_name, tag) in &missing {
                let name = tag.family.as_deref().unwrap_or(tag.category_name());
                errors.add_item(
                    ReportItem::new(name)
                        .with_description(format!(
                            "Element in view {view_name} has no bounding box!"
                        ))
                        .with_element(tag.id)
                        .with_passed(false),
                );
            }
            parent.add_child(errors);
        }
        Ok(parent)
    }
}

/// Gathers the tags of the collected views and hands them to
/// `tag_collision`.
pub(super) struct TagCollisionInViews;

impl Operator for TagCollisionInViews {}

impl Analyzer for TagCollisionInViews {
    fn analyze(
        &mut self,
        ctx: &mut RunContext<'_>,
        data: &[Element],
        args: &Args,
    ) -> anyhow::Result<ReportSection> {
        let views: Vec<ElementId> = data.iter().filter(|e| e.is_view()).map(|e| e.id).collect();
        let tags = tags_in_views(
            ctx.doc.elements(),
            &views,
            args.bool(ids::ARG_IGNORE_FLOW_DIRECTION_ARROWS)?,
            args.bool(ids::ARG_INCLUDE_SPATIAL_TAGS)?,
        );
        let sensitivity = args.float(ids::ARG_SENSITIVITY_TITLE)?;
        tracing::debug!(views = views.len(), tags = tags.len(), "delegating to tag_collision");

        let registry = ctx.registry;
        let mut explicit: ArgMap = args.as_map().clone();
        for key in [
            ids::ARG_IGNORE_FLOW_DIRECTION_ARROWS,
            ids::ARG_INCLUDE_SPATIAL_TAGS,
            ids::ARG_SENSITIVITY_TITLE,
        ] {
            explicit.remove(key);
        }
        explicit.insert(ids::ARG_SENSITIVITY.to_string(), ArgValue::Float(sensitivity));
        registry
            .load_analyzer(ids::ANALYZER_TAG_COLLISION)
            .analyze(ctx, &tags, &explicit)
    }
}
