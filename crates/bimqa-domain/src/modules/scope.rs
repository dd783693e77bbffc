//! Built-in scope selectors.

use crate::document::Document;
use crate::model::Element;
use crate::operator::{Operator, RunContext, ScopeSelector};
use crate::registry::{HostCatalog, ModuleRegistry, RegistryError};
use crate::ui::Ui;
use bimqa_types::{ArgMap, ArgType, ArgValue, Args, ModuleMeta, ModuleSpec, ids};

/// Parameter marking a view's documentation group.
pub const PARAM_VIEW_GROUP: &str = "View Group";
pub const DOCUMENTATION_VIEW_GROUP: &str = "Documentation View";

pub(crate) fn register(registry: &mut ModuleRegistry) -> Result<(), RegistryError> {
    registry.register_scope_selector(
        ids::SCOPE_CURRENT_VIEW,
        |_| {
            ModuleSpec::new()
                .name("Active view")
                .description("Collect active view from the current model and return as a list.")
                .returns("The active view")
        },
        || Ok(Box::new(CurrentView)),
    )?;
    registry.register_scope_selector(
        ids::SCOPE_DOCUMENTATION_VIEWS,
        |_| {
            ModuleSpec::new()
                .name("Documentation Views")
                .description("Collect all documentation views from the current model.")
                .returns("Views whose view group is a documentation view")
        },
        || Ok(Box::new(DocumentationViews)),
    )?;
    registry.register_scope_selector(ids::SCOPE_SELECTED_VIEWS, selected_views_spec, || {
        Ok(Box::new(SelectedViews))
    })?;
    Ok(())
}

/// Non-template views whose view group names a documentation view.
pub(crate) fn documentation_views(doc: &dyn Document) -> Vec<Element> {
    doc.views()
        .into_iter()
        .filter(|v| v.as_view().is_some_and(|f| !f.is_template))
        .filter(|v| {
            v.parameter(PARAM_VIEW_GROUP)
                .is_some_and(|g| g.contains(DOCUMENTATION_VIEW_GROUP))
        })
        .cloned()
        .collect()
}

struct CurrentView;

impl Operator for CurrentView {}

impl ScopeSelector for CurrentView {
    fn select(&mut self, ctx: &mut RunContext<'_>, _args: &Args) -> anyhow::Result<Vec<Element>> {
        Ok(ctx.doc.active_view().cloned().into_iter().collect())
    }
}

struct DocumentationViews;

impl Operator for DocumentationViews {}

impl ScopeSelector for DocumentationViews {
    fn select(&mut self, ctx: &mut RunContext<'_>, _args: &Args) -> anyhow::Result<Vec<Element>> {
        let views = documentation_views(&*ctx.doc);
        tracing::debug!(views = views.len(), "documentation views selected");
        Ok(views)
    }
}

fn selected_views_spec(catalog: &HostCatalog) -> ModuleSpec {
    ModuleSpec::new()
        .name("Selected Views")
        .description("Collect selected views (in advance settings).")
        .returns("The selected views")
        .arg(
            ids::ARG_SELECTED_VIEWS,
            ArgType::MultiChoice(catalog.views.clone()),
            Vec::<String>::new(),
        )
}

struct SelectedViews;

impl Operator for SelectedViews {
    fn description(&self, meta: &ModuleMeta, args: &Args) -> String {
        let selected = args.list(ids::ARG_SELECTED_VIEWS).unwrap_or_default();
        if selected.is_empty() {
            return format!("{}\nNo view is selected currently!", meta.description);
        }
        let shown = selected
            .iter()
            .take(5)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        let ellipsis = if selected.len() > 5 { "... " } else { " " };
        format!(
            "{}\nSelected views: {shown}{ellipsis}({} views)",
            meta.description,
            selected.len()
        )
    }

    fn show_additional_settings(
        &mut self,
        ui: &mut dyn Ui,
        doc: &dyn Document,
        _meta: &ModuleMeta,
        current: &ArgMap,
    ) -> Option<ArgMap> {
        let options: Vec<String> = doc
            .views()
            .into_iter()
            .filter(|v| v.as_view().is_some_and(|f| !f.is_template))
            .filter_map(|v| v.name.clone())
            .collect();
        let checked = match current.get(ids::ARG_SELECTED_VIEWS) {
            Some(ArgValue::List(names)) => names.clone(),
            _ => Vec::new(),
        };
        let picked = super::pick_from_list(ui, "Select views", &options, &checked)?;
        Some(ArgMap::from([(
            ids::ARG_SELECTED_VIEWS.to_string(),
            ArgValue::List(picked),
        )]))
    }
}

impl ScopeSelector for SelectedViews {
    fn select(&mut self, ctx: &mut RunContext<'_>, args: &Args) -> anyhow::Result<Vec<Element>> {
        let wanted = args.list(ids::ARG_SELECTED_VIEWS)?;
        Ok(ctx
            .doc
            .views()
            .into_iter()
            .filter(|v| v.as_view().is_some_and(|f| !f.is_template))
            .filter(|v| v.name.as_ref().is_some_and(|n| wanted.contains(n)))
            .cloned()
            .collect())
    }
}
