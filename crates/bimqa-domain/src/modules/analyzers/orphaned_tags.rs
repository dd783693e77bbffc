use super::by_owner_view;
use crate::model::Element;
use crate::operator::{Analyzer, Operator, RunContext};
use crate::registry::HostCatalog;
use bimqa_types::{Args, ModuleSpec, ReportItem, ReportSection};

const NAME: &str = "Check orphaned or unknown tags";

pub(super) fn spec(_: &HostCatalog) -> ModuleSpec {
    ModuleSpec::new()
        .name(NAME)
        .description("Find tags that lost their host and tags showing no value.")
        .returns("One failed item per orphaned or unknown tag")
}

pub(super) struct OrphanedTags;

impl Operator for OrphanedTags {}

impl Analyzer for OrphanedTags {
    fn analyze(
        &mut self,
        ctx: &mut RunContext<'_>,
        data: &[Element],
        _args: &Args,
    ) -> anyhow::Result<ReportSection> {
        let mut section = ReportSection::test(NAME)
            .with_description(format!("{NAME} through {} tags", data.len()))
            .with_max_printed_items(100);

        let groups = by_owner_view(data);
        let total = groups.len();
        for (index, (view_id, tags)) in groups.into_iter().enumerate() {
            if ctx.ui.is_cancelled() {
                tracing::warn!(done = index, total, "orphaned tag check cancelled");
                break;
            }
            ctx.ui.update_progress(index + 1, total);

            let Some(view) = ctx.doc.element(view_id) else {
                tracing::warn!(view = %view_id, "owner view not found");
                continue;
            };
            if view.is_3d_view() {
                continue;
            }
            let view_name = view.display_name();
            tracing::info!(view = view_name, tags = tags.len(), "checking tags");

            let mut unknown = Vec::new();
            let mut orphaned = Vec::new();
            for tag in tags {
                let Some(facet) = tag.as_tag() else {
                    continue;
                };
                let category = tag.category_name();
                if facet.is_orphaned {
                    orphaned.push(
                        ReportItem::new(format!("Orphaned {category}."))
                            .with_description(format!(
                                "view '{view_name}': The tag is orphaned."
                            ))
                            .with_element(tag.id)
                            .with_passed(false),
                    );
                } else if facet.text.is_empty()
                    && facet
                        .tagged
                        .iter()
                        .any(|host| !ctx.doc.is_hidden_in_view(*host, view_id))
                {
                    let hosts = facet
                        .tagged
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(", ");
                    unknown.push(
                        ReportItem::new(format!("Unknown {category}."))
                            .with_description(format!(
                                "view '{view_name}': The tag has unknown value. The tag's hosts IDs: {hosts}."
                            ))
                            .with_element(tag.id)
                            .with_passed(false),
                    );
                }
            }
            // unknown tags first, then orphaned ones
            for item in unknown.into_iter().chain(orphaned) {
                section.add_item(item);
            }
        }

        section.set_total_count(data.len());
        section.set_passed_count(data.len().saturating_sub(section.items.len()));
        let ratio = if data.is_empty() {
            1.0
        } else {
            1.0 - section.items.len() as f64 / data.len() as f64
        };
        section.set_passed_ratio(ratio);
        Ok(section)
    }
}
