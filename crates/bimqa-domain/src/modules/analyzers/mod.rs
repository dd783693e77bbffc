//! Built-in analyzers.

use crate::model::Element;
use crate::registry::{ModuleRegistry, RegistryError};
use bimqa_types::{ArgError, Args, ReportItem, SectionKind, ids};

mod boundingbox_collision;
mod count_elements;
mod is_tagged;
mod orphaned_tags;
mod tag_collision;

pub(crate) fn register(registry: &mut ModuleRegistry) -> Result<(), RegistryError> {
    registry.register_analyzer(
        ids::ANALYZER_COUNT_ELEMENTS,
        count_elements::spec,
        || Ok(Box::new(count_elements::CountElements)),
    )?;
    registry.register_analyzer(ids::ANALYZER_IS_TAGGED, is_tagged::spec, || {
        Ok(Box::new(is_tagged::IsTagged))
    })?;
    registry.register_analyzer(ids::ANALYZER_ORPHANED_TAGS, orphaned_tags::spec, || {
        Ok(Box::new(orphaned_tags::OrphanedTags))
    })?;
    registry.register_analyzer(
        ids::ANALYZER_BOUNDINGBOX_COLLISION,
        boundingbox_collision::spec,
        || Ok(Box::new(boundingbox_collision::BoundingBoxCollision)),
    )?;
    registry.register_analyzer(
        ids::ANALYZER_TAG_COLLISION,
        tag_collision::spec,
        || Ok(Box::new(tag_collision::TagCollision)),
    )?;
    registry.register_analyzer(
        ids::ANALYZER_TAG_COLLISION_IN_VIEWS,
        tag_collision::in_views_spec,
        || Ok(Box::new(tag_collision::TagCollisionInViews)),
    )?;
    Ok(())
}

const REPORT_TYPES: [&str; 2] = ["INFO", "TEST"];

fn report_types() -> Vec<String> {
    REPORT_TYPES.iter().map(|s| s.to_string()).collect()
}

fn report_kind(args: &Args) -> Result<SectionKind, ArgError> {
    Ok(match args.string(ids::ARG_COUNT_REPORT_TYPE)? {
        "TEST" => SectionKind::Test,
        _ => SectionKind::Info,
    })
}

/// Negative limits print nothing.
fn max_printed(args: &Args) -> Result<usize, ArgError> {
    Ok(usize::try_from(args.int(ids::ARG_MAX_PRINTED_ITEMS)?).unwrap_or(0))
}

/// Failed item for a clashing pair.
pub(crate) fn clash_item(a: &Element, b: &Element) -> ReportItem {
    let name = if a.category_name() == b.category_name() {
        format!("Clash between {}", a.category_name())
    } else {
        format!(
            "Clash between {} and {}",
            a.category_name(),
            b.category_name()
        )
    };
    ReportItem::new(name)
        .with_description(format!(
            "Clash between {} and {}",
            a.display_name(),
            b.display_name()
        ))
        .with_element(a.id)
        .with_element(b.id)
        .with_passed(false)
}

/// Group elements by owner view, keeping first-seen view order.
fn by_owner_view(data: &[Element]) -> Vec<(crate::model::ElementId, Vec<&Element>)> {
    let mut groups: Vec<(crate::model::ElementId, Vec<&Element>)> = Vec::new();
    for element in data {
        let Some(view) = element.owner_view else {
            continue;
        };
        match groups.iter_mut().find(|(v, _)| *v == view) {
            Some((_, tags)) => tags.push(element),
            None => groups.push((view, vec![element])),
        }
    }
    groups
}
