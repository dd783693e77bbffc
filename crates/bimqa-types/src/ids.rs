//! Stable module names and argument keys.
//!
//! Module names are persistence keys: they appear in `.opset` files and must
//! never change once released. Argument keys are user-facing labels and are
//! stored verbatim in argument maps.

// Scope selectors
pub const SCOPE_CURRENT_VIEW: &str = "current_view";
pub const SCOPE_DOCUMENTATION_VIEWS: &str = "documentation_views";
pub const SCOPE_SELECTED_VIEWS: &str = "selected_views";

// Collectors
pub const COLLECTOR_ALL_ELEMENTS: &str = "all_elements";
pub const COLLECTOR_BY_MODEL_CATS: &str = "by_model_cats";
pub const COLLECTOR_CURRENT_VIEW: &str = "current_view";
pub const COLLECTOR_DOCUMENTATION_VIEWS: &str = "documentation_views";
pub const COLLECTOR_SELECTED_ELEMENTS: &str = "selected_elements";
pub const COLLECTOR_SLOPED_PIPES: &str = "sloped_pipes";
pub const COLLECTOR_TAGS: &str = "tags";
pub const COLLECTOR_UNTAGGED_MODEL_CATEGORIES: &str = "untagged_model_categories";

// Analyzers
pub const ANALYZER_BOUNDINGBOX_COLLISION: &str = "boundingbox_collision";
pub const ANALYZER_COUNT_ELEMENTS: &str = "count_elements";
pub const ANALYZER_IS_TAGGED: &str = "is_tagged";
pub const ANALYZER_ORPHANED_TAGS: &str = "orphaned_tags";
pub const ANALYZER_TAG_COLLISION: &str = "tag_collision";
pub const ANALYZER_TAG_COLLISION_IN_VIEWS: &str = "tag_collision_in_views";

// Fallbacks used when a persisted operation omits a module.
pub const DEFAULT_SCOPE_SELECTOR: &str = SCOPE_CURRENT_VIEW;
pub const DEFAULT_COLLECTOR: &str = COLLECTOR_ALL_ELEMENTS;
pub const DEFAULT_ANALYZER: &str = ANALYZER_COUNT_ELEMENTS;

pub const DEFAULT_AUTHOR: &str = "BIM QA team";

// Argument keys
pub const ARG_CATEGORY_FILTER: &str = "Category Filter";
pub const ARG_SELECTED_VIEWS: &str = "Selected Views";
pub const ARG_IGNORE_FLOW_ARROWS: &str = "Ignore Flow Arrows";
pub const ARG_IGNORE_FLOW_DIRECTION_ARROWS: &str = "Ignore Flow Direction Arrows";
pub const ARG_INCLUDE_SPATIAL_TAGS: &str = "Include Spatial Element Tags";
pub const ARG_ACTIVE_VIEW_ONLY: &str = "Collect elements in the active view only";
pub const ARG_CATEGORIES_TO_COLLECT: &str = "Categories to collect";
pub const ARG_VERTICAL_TOLERANCE: &str = "Vertical Tolerance";
pub const ARG_WEIRD_THRESHOLD: &str = "Weird Threshold";
pub const ARG_SLOPED_THRESHOLD: &str = "Sloped Threshold";
pub const ARG_COUNT_REPORT_TYPE: &str = "Count Report Type";
pub const ARG_PRINT_DETAILS: &str = "Print Details";
pub const ARG_MAX_PRINTED_ITEMS: &str = "Max Printed Items";
pub const ARG_SENSITIVITY: &str = "sensitivity";
pub const ARG_SENSITIVITY_TITLE: &str = "Sensitivity";
pub const ARG_DISTANCE_FACTOR: &str = "distance factor";
pub const ARG_REPORT_BB_ERROR: &str = "report bounding box error";
pub const ARG_REPORT_SECTION_NAME: &str = "report section name";
