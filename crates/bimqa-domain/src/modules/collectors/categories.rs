use crate::document::Document;
use crate::model::{Element, ElementId};
use crate::modules::{check_categories, pick_from_list, summarize_names, view_ids};
use crate::operator::{Collector, Operator, RunContext, SectionDecorator};
use crate::registry::HostCatalog;
use crate::ui::Ui;
use bimqa_types::{ArgMap, ArgType, ArgValue, Args, ModuleMeta, ModuleSpec, ReportSection, ids};
use std::collections::BTreeSet;

pub(super) fn by_model_cats_spec(catalog: &HostCatalog) -> ModuleSpec {
    ModuleSpec::new()
        .name("By Model Categories")
        .description("Select elements by Model Categories")
        .returns("Elements of the selected model categories")
        .arg(
            ids::ARG_CATEGORY_FILTER,
            ArgType::MultiChoice(catalog.model_categories.clone()),
            Vec::<String>::new(),
        )
}

pub(super) fn all_elements_spec(catalog: &HostCatalog) -> ModuleSpec {
    ModuleSpec::new()
        .name("Collect all elements")
        .description("Collect all elements of the filtered categories in the scope views")
        .returns("Elements of the selected categories")
        .hidden()
        .arg(
            ids::ARG_CATEGORY_FILTER,
            ArgType::MultiChoice(catalog.categories.clone()),
            catalog.categories.clone(),
        )
}

pub(super) fn selected_elements_spec(catalog: &HostCatalog) -> ModuleSpec {
    ModuleSpec::new()
        .name("Collect selected elements")
        .description("Collect the currently selected elements of the filtered categories")
        .returns("Selected elements")
        .hidden()
        .arg(
            ids::ARG_CATEGORY_FILTER,
            ArgType::MultiChoice(catalog.categories.clone()),
            Vec::<String>::new(),
        )
}

/// Elements of `categories` visible in the scope views, or in the whole
/// model when the scope holds no view. Each element appears once.
pub(crate) fn elements_of_categories(
    doc: &dyn Document,
    scope: &[Element],
    categories: &[String],
) -> Vec<Element> {
    let wanted = |e: &&Element| {
        e.category
            .as_ref()
            .is_some_and(|c| categories.contains(c))
    };
    let views = view_ids(scope);
    if views.is_empty() {
        return doc.elements().into_iter().filter(wanted).cloned().collect();
    }

    let mut seen: BTreeSet<ElementId> = BTreeSet::new();
    let mut out = Vec::new();
    for view in views {
        for element in doc.elements_in_view(view).into_iter().filter(wanted) {
            if seen.insert(element.id) {
                out.push(element.clone());
            }
        }
    }
    out
}

fn describe_filter(base: &str, args: &Args) -> String {
    let selected = args.list(ids::ARG_CATEGORY_FILTER).unwrap_or_default();
    if selected.is_empty() {
        format!("{base}\nNo category is selected!")
    } else {
        format!(
            "{base}\nSelected categories: {}",
            summarize_names(selected, 5)
        )
    }
}

fn edit_filter(ui: &mut dyn Ui, options: &[String], current: &ArgMap) -> Option<ArgMap> {
    let checked = match current.get(ids::ARG_CATEGORY_FILTER) {
        Some(ArgValue::List(names)) => names.clone(),
        _ => Vec::new(),
    };
    let picked = pick_from_list(ui, "Select categories", options, &checked)?;
    Some(ArgMap::from([(
        ids::ARG_CATEGORY_FILTER.to_string(),
        ArgValue::List(picked),
    )]))
}

/// Category-filtered collection. The number of elements collected by the
/// last run becomes the section's total count.
pub(super) struct ByCategories {
    model_only: bool,
    collected: Option<usize>,
}

impl ByCategories {
    pub(super) fn model() -> Self {
        Self {
            model_only: true,
            collected: None,
        }
    }

    pub(super) fn all() -> Self {
        Self {
            model_only: false,
            collected: None,
        }
    }
}

impl Operator for ByCategories {
    fn description(&self, meta: &ModuleMeta, args: &Args) -> String {
        describe_filter(&meta.description, args)
    }

    fn show_additional_settings(
        &mut self,
        ui: &mut dyn Ui,
        doc: &dyn Document,
        _meta: &ModuleMeta,
        current: &ArgMap,
    ) -> Option<ArgMap> {
        let options = if self.model_only {
            doc.model_category_names()
        } else {
            doc.categories().iter().map(|c| c.name.clone()).collect()
        };
        edit_filter(ui, &options, current)
    }

    fn section_decorator(&self) -> Option<SectionDecorator<'_>> {
        let total = self.collected?;
        Some(Box::new(move |section: &mut ReportSection| {
            section.set_total_count(total)
        }))
    }
}

impl Collector for ByCategories {
    fn collect(
        &mut self,
        ctx: &mut RunContext<'_>,
        scope: &[Element],
        args: &Args,
    ) -> anyhow::Result<Vec<Element>> {
        let filter = args.list(ids::ARG_CATEGORY_FILTER)?;
        check_categories(&*ctx.doc, filter)?;
        let elements = elements_of_categories(&*ctx.doc, scope, filter);
        tracing::info!(
            categories = filter.len(),
            elements = elements.len(),
            "collected elements by category"
        );
        self.collected = Some(elements.len());
        Ok(elements)
    }
}

pub(super) struct SelectedElements;

impl Operator for SelectedElements {
    fn description(&self, meta: &ModuleMeta, args: &Args) -> String {
        describe_filter(&meta.description, args)
    }

    fn show_additional_settings(
        &mut self,
        ui: &mut dyn Ui,
        doc: &dyn Document,
        _meta: &ModuleMeta,
        current: &ArgMap,
    ) -> Option<ArgMap> {
        let options: Vec<String> = doc.categories().iter().map(|c| c.name.clone()).collect();
        edit_filter(ui, &options, current)
    }
}

impl Collector for SelectedElements {
    fn collect(
        &mut self,
        ctx: &mut RunContext<'_>,
        _scope: &[Element],
        args: &Args,
    ) -> anyhow::Result<Vec<Element>> {
        let filter = args.list(ids::ARG_CATEGORY_FILTER)?;
        let doc: &dyn Document = &*ctx.doc;
        Ok(doc
            .selection()
            .into_iter()
            .filter_map(|id| doc.element(id))
            .filter(|e| e.category.as_ref().is_some_and(|c| filter.contains(c)))
            .cloned()
            .collect())
    }
}
