use crate::model::{Element, ElementId};
use crate::modules::{check_categories, has_tag};
use crate::operator::{Collector, Operator, RunContext};
use crate::registry::HostCatalog;
use bimqa_types::{ArgType, Args, ModuleSpec, ids};

pub(super) fn spec(catalog: &HostCatalog) -> ModuleSpec {
    ModuleSpec::new()
        .name("Collect model categories")
        .description("Collect elements of the given model categories that have no tag")
        .returns("Untagged elements")
        .hidden()
        .arg(ids::ARG_ACTIVE_VIEW_ONLY, ArgType::Bool, true)
        .arg(
            ids::ARG_CATEGORIES_TO_COLLECT,
            ArgType::MultiChoice(catalog.model_categories.clone()),
            Vec::<String>::new(),
        )
}

pub(super) struct UntaggedModelCategories;

impl Operator for UntaggedModelCategories {}

impl Collector for UntaggedModelCategories {
    fn collect(
        &mut self,
        ctx: &mut RunContext<'_>,
        _scope: &[Element],
        args: &Args,
    ) -> anyhow::Result<Vec<Element>> {
        let active_only = args.bool(ids::ARG_ACTIVE_VIEW_ONLY)?;
        let categories = args.list(ids::ARG_CATEGORIES_TO_COLLECT)?;
        check_categories(&*ctx.doc, categories)?;

        let doc = &*ctx.doc;
        let active: Option<ElementId> = if active_only {
            match doc.active_view() {
                Some(view) => Some(view.id),
                None => anyhow::bail!("there is no active view"),
            }
        } else {
            None
        };

        let candidates = match active {
            Some(view) => doc.elements_in_view(view),
            None => doc.elements(),
        };
        let untagged: Vec<Element> = candidates
            .into_iter()
            .filter(|e| e.category.as_ref().is_some_and(|c| categories.contains(c)))
            .filter(|e| !has_tag(doc, e.id, active))
            .cloned()
            .collect();
        tracing::info!(elements = untagged.len(), "collected untagged elements");
        Ok(untagged)
    }
}
