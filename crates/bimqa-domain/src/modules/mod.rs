//! Built-in QA modules.

use crate::document::Document;
use crate::model::{Element, ElementId};
use crate::registry::{ModuleRegistry, RegistryError};

pub mod analyzers;
pub mod collectors;
pub mod scope;

/// Register every built-in scope selector, collector and analyzer.
pub fn register_builtin(registry: &mut ModuleRegistry) -> Result<(), RegistryError> {
    scope::register(registry)?;
    collectors::register(registry)?;
    analyzers::register(registry)?;
    Ok(())
}

/// At most `max` comma-joined names, then "and N more".
pub(crate) fn summarize_names(names: &[String], max: usize) -> String {
    if names.len() > max {
        format!(
            "{} and {} more",
            names[..max].join(", "),
            names.len() - max
        )
    } else {
        names.join(", ")
    }
}

pub(crate) fn is_flow_arrow(tag: &Element) -> bool {
    tag.family
        .as_deref()
        .is_some_and(|f| f.contains("Flow Arrow") || f.contains("FlowArrow"))
}

/// Whether `id` has a tag; with `view`, only tags drawn in that view count.
pub(crate) fn has_tag(doc: &dyn Document, id: ElementId, view: Option<ElementId>) -> bool {
    let tags = doc.dependent_tags(id);
    match view {
        Some(view) => tags
            .into_iter()
            .any(|t| doc.element(t).is_some_and(|t| t.owner_view == Some(view))),
        None => !tags.is_empty(),
    }
}

/// Fail on the first name that is not a category of `doc`.
pub(crate) fn check_categories(doc: &dyn Document, names: &[String]) -> anyhow::Result<()> {
    if let Some(name) = names.iter().find(|n| doc.category(n).is_none()) {
        anyhow::bail!("No category found with this name {name}");
    }
    Ok(())
}

pub(crate) fn view_ids(scope: &[Element]) -> Vec<ElementId> {
    scope.iter().filter(|e| e.is_view()).map(|e| e.id).collect()
}

/// Tags owned by `views`, in model order.
pub(crate) fn tags_in_views(
    elements: Vec<&Element>,
    views: &[ElementId],
    ignore_flow_arrows: bool,
    include_spatial: bool,
) -> Vec<Element> {
    elements
        .into_iter()
        .filter(|e| e.owner_view.is_some_and(|v| views.contains(&v)))
        .filter(|e| {
            e.as_tag()
                .is_some_and(|t| include_spatial || !t.tag_class.is_spatial())
        })
        .filter(|e| !(ignore_flow_arrows && is_flow_arrow(e)))
        .cloned()
        .collect()
}

/// Checked list picker used by modules with additional settings: checked
/// options first, then alphabetical.
pub(crate) fn pick_from_list(
    ui: &mut dyn crate::ui::Ui,
    title: &str,
    options: &[String],
    checked: &[String],
) -> Option<Vec<String>> {
    let mut ordered: Vec<String> = options.to_vec();
    ordered.sort_by(|a, b| {
        (!checked.contains(a), a.as_str()).cmp(&(!checked.contains(b), b.as_str()))
    });
    ui.select_from_list(title, &ordered, checked)
        .filter(|picked| !picked.is_empty())
}

#[cfg(test)]
mod tests;
