use crate::model::Element;
use crate::modules::{tags_in_views, view_ids};
use crate::operator::{Collector, Operator, RunContext};
use crate::registry::HostCatalog;
use bimqa_types::{ArgType, Args, ModuleSpec, ids};

pub(super) fn spec(_: &HostCatalog) -> ModuleSpec {
    ModuleSpec::new()
        .name("Collect tags")
        .description("Collect all tags in views")
        .returns("Tags owned by the scope views")
        .arg(ids::ARG_IGNORE_FLOW_ARROWS, ArgType::Bool, true)
        .arg(ids::ARG_INCLUDE_SPATIAL_TAGS, ArgType::Bool, true)
}

pub(super) struct CollectTags;

impl Operator for CollectTags {}

impl Collector for CollectTags {
    fn collect(
        &mut self,
        ctx: &mut RunContext<'_>,
        scope: &[Element],
        args: &Args,
    ) -> anyhow::Result<Vec<Element>> {
        let ignore_flow_arrows = args.bool(ids::ARG_IGNORE_FLOW_ARROWS)?;
        let include_spatial = args.bool(ids::ARG_INCLUDE_SPATIAL_TAGS)?;
        let views = view_ids(scope);
        let tags = tags_in_views(
            ctx.doc.elements(),
            &views,
            ignore_flow_arrows,
            include_spatial,
        );
        tracing::info!(views = views.len(), tags = tags.len(), "collected tags");
        Ok(tags)
    }
}
