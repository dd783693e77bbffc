use crate::model::Element;
use crate::modules::scope::documentation_views;
use crate::operator::{Collector, Operator, RunContext};
use crate::registry::HostCatalog;
use bimqa_types::{Args, ModuleSpec};

pub(super) fn current_view_spec(_: &HostCatalog) -> ModuleSpec {
    ModuleSpec::new()
        .name("Collect active view")
        .description("Collect the active view, whatever the scope.")
        .returns("The active view")
        .hidden()
}

pub(super) fn documentation_views_spec(_: &HostCatalog) -> ModuleSpec {
    ModuleSpec::new()
        .name("Collect all documentation views")
        .description("Collect all documentation views, whatever the scope.")
        .returns("Documentation views")
        .hidden()
}

pub(super) struct CurrentView;

impl Operator for CurrentView {}

impl Collector for CurrentView {
    fn collect(
        &mut self,
        ctx: &mut RunContext<'_>,
        _scope: &[Element],
        _args: &Args,
    ) -> anyhow::Result<Vec<Element>> {
        Ok(ctx.doc.active_view().cloned().into_iter().collect())
    }
}

pub(super) struct DocumentationViews;

impl Operator for DocumentationViews {}

impl Collector for DocumentationViews {
    fn collect(
        &mut self,
        ctx: &mut RunContext<'_>,
        _scope: &[Element],
        _args: &Args,
    ) -> anyhow::Result<Vec<Element>> {
        Ok(documentation_views(&*ctx.doc))
    }
}
