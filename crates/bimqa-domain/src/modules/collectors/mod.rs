//! Built-in collectors.

use crate::registry::{ModuleRegistry, RegistryError};
use bimqa_types::ids;

mod categories;
mod sloped_pipes;
mod tags;
mod untagged;
mod views;

pub use sloped_pipes::{PipeSlope, SlopeThresholds};

pub(crate) fn register(registry: &mut ModuleRegistry) -> Result<(), RegistryError> {
    registry.register_collector(
        ids::COLLECTOR_BY_MODEL_CATS,
        categories::by_model_cats_spec,
        || Ok(Box::new(categories::ByCategories::model())),
    )?;
    registry.register_collector(
        ids::COLLECTOR_ALL_ELEMENTS,
        categories::all_elements_spec,
        || Ok(Box::new(categories::ByCategories::all())),
    )?;
    registry.register_collector(
        ids::COLLECTOR_SELECTED_ELEMENTS,
        categories::selected_elements_spec,
        || Ok(Box::new(categories::SelectedElements)),
    )?;
    registry.register_collector(
        ids::COLLECTOR_CURRENT_VIEW,
        views::current_view_spec,
        || Ok(Box::new(views::CurrentView)),
    )?;
    registry.register_collector(
        ids::COLLECTOR_DOCUMENTATION_VIEWS,
        views::documentation_views_spec,
        || Ok(Box::new(views::DocumentationViews)),
    )?;
    registry.register_collector(ids::COLLECTOR_TAGS, tags::spec, || {
        Ok(Box::new(tags::CollectTags))
    })?;
    registry.register_collector(ids::COLLECTOR_SLOPED_PIPES, sloped_pipes::spec, || {
        Ok(Box::new(sloped_pipes::SlopedPipes))
    })?;
    registry.register_collector(
        ids::COLLECTOR_UNTAGGED_MODEL_CATEGORIES,
        untagged::spec,
        || Ok(Box::new(untagged::UntaggedModelCategories)),
    )?;
    Ok(())
}
