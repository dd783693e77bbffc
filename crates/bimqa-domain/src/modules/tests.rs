use crate::model::{Element, ElementId, TagClass, Xyz};
use crate::operation::Operation;
use crate::operator::RunContext;
use crate::snapshot::MemoryDocument;
use crate::test_support::{
    arg_map, builtin_registry, cube, doc_with, generic, names, pipe, tag, tagging, view, view_of,
};
use crate::ui::RecordingUi;
use crate::Document;
use bimqa_types::{ArgMap, ArgValue, ModuleKind, ReportSection, SectionKind, ids};

struct Pipeline<'a> {
    scope: &'a str,
    collector: &'a str,
    analyzer: &'a str,
    scope_args: ArgMap,
    collector_args: ArgMap,
    analyzer_args: ArgMap,
}

impl<'a> Pipeline<'a> {
    fn new(scope: &'a str, collector: &'a str, analyzer: &'a str) -> Self {
        Self {
            scope,
            collector,
            analyzer,
            scope_args: ArgMap::new(),
            collector_args: ArgMap::new(),
            analyzer_args: ArgMap::new(),
        }
    }

    fn scope_args(mut self, args: &[(&str, ArgValue)]) -> Self {
        self.scope_args = arg_map(args);
        self
    }

    fn collector_args(mut self, args: &[(&str, ArgValue)]) -> Self {
        self.collector_args = arg_map(args);
        self
    }

    fn analyzer_args(mut self, args: &[(&str, ArgValue)]) -> Self {
        self.analyzer_args = arg_map(args);
        self
    }

    fn run_with(self, doc: &mut MemoryDocument, ui: &mut RecordingUi) -> anyhow::Result<ReportSection> {
        let registry = builtin_registry(doc);
        let mut op = Operation::from_names(&registry, "", self.scope, self.collector, self.analyzer)
            .with_scope_selector_args(self.scope_args)
            .with_collector_args(self.collector_args)
            .with_analyzer_args(self.analyzer_args);
        let mut ctx = RunContext::new(doc, ui, &registry);
        Ok(op.run(&mut ctx)?)
    }

    fn run(self, doc: &mut MemoryDocument) -> ReportSection {
        self.run_with(doc, &mut RecordingUi::new()).expect("operation runs")
    }
}

fn list(names: &[&str]) -> ArgValue {
    ArgValue::List(names.iter().map(|s| s.to_string()).collect())
}

fn element_ids(section: &ReportSection) -> Vec<String> {
    section
        .all_items()
        .iter()
        .flat_map(|i| i.element_ids.clone())
        .collect()
}

/// Views 1 (active) and 2; walls 10 and 12, door 11.
fn building() -> MemoryDocument {
    let mut hidden_wall = generic(12, "Walls", Some(cube(50.0, 0.0, 0.0, 1.0)), &[2]);
    hidden_wall.hidden_in_views = vec![ElementId(1)];
    doc_with(vec![
        view(1, "Level 1"),
        view(2, "Level 2"),
        generic(10, "Walls", Some(cube(0.0, 0.0, 0.0, 2.0)), &[1]),
        generic(11, "Doors", Some(cube(1.0, 0.0, 0.0, 2.0)), &[1]),
        hidden_wall,
    ])
}

// ============================================================================
// Registration
// ============================================================================

#[test]
fn every_builtin_loads_without_stubbing() {
    let doc = building();
    let registry = builtin_registry(&doc);
    for kind in ModuleKind::ALL {
        for name in registry.registered_names(kind) {
            let meta = registry.describe(kind, &name).expect("loads");
            assert_eq!(meta.module_name, name);
        }
    }
    assert_eq!(registry.registered_names(ModuleKind::ScopeSelector).len(), 3);
    assert_eq!(registry.registered_names(ModuleKind::Collector).len(), 8);
    assert_eq!(registry.registered_names(ModuleKind::Analyzer).len(), 6);
}

#[test]
fn hidden_builtins_are_listed_only_on_request() {
    let doc = building();
    let registry = builtin_registry(&doc);
    let visible: Vec<String> = registry
        .list_available(ModuleKind::Collector, false)
        .iter()
        .map(|m| m.module_name.clone())
        .collect();
    assert_eq!(visible, vec!["by_model_cats", "sloped_pipes", "tags"]);
    assert_eq!(registry.list_available(ModuleKind::Collector, true).len(), 8);
}

#[test]
fn argument_choices_come_from_the_model() {
    let doc = building();
    let registry = builtin_registry(&doc);
    let meta = registry
        .describe(ModuleKind::ScopeSelector, ids::SCOPE_SELECTED_VIEWS)
        .expect("loads");
    assert_eq!(
        meta.arg_types.get(ids::ARG_SELECTED_VIEWS),
        Some(&bimqa_types::ArgType::MultiChoice(vec![
            "Level 1".to_string(),
            "Level 2".to_string()
        ]))
    );
    let meta = registry
        .describe(ModuleKind::Collector, ids::COLLECTOR_ALL_ELEMENTS)
        .expect("loads");
    assert_eq!(
        meta.default_args.get(ids::ARG_CATEGORY_FILTER),
        Some(&list(&["Door Tags", "Doors", "Pipes", "Room Tags", "Walls"]))
    );
}

// ============================================================================
// Scope selectors
// ============================================================================

#[test]
fn selected_views_description_lists_the_selection() {
    let doc = building();
    let registry = builtin_registry(&doc);
    let handle = registry.load_scope_selector(ids::SCOPE_SELECTED_VIEWS);

    assert!(handle.description(&ArgMap::new()).ends_with("\nNo view is selected currently!"));
    let described = handle.description(&arg_map(&[(ids::ARG_SELECTED_VIEWS, list(&["Level 2"]))]));
    assert!(described.ends_with("\nSelected views: Level 2 (1 views)"));

    let many = list(&["a", "b", "c", "d", "e", "f"]);
    let described = handle.description(&arg_map(&[(ids::ARG_SELECTED_VIEWS, many)]));
    assert!(described.ends_with("Selected views: a, b, c, d, e... (6 views)"));
}

#[test]
fn selected_views_settings_use_the_list_picker() {
    let doc = building();
    let registry = builtin_registry(&doc);
    let handle = registry.load_scope_selector(ids::SCOPE_SELECTED_VIEWS);

    let mut ui = RecordingUi::new();
    assert_eq!(handle.show_additional_settings(&mut ui, &doc, &ArgMap::new()), None);

    ui.list_answer = Some(Vec::new());
    assert_eq!(handle.show_additional_settings(&mut ui, &doc, &ArgMap::new()), None);

    ui.list_answer = Some(vec!["Level 1".to_string()]);
    assert_eq!(
        handle.show_additional_settings(&mut ui, &doc, &ArgMap::new()),
        Some(arg_map(&[(ids::ARG_SELECTED_VIEWS, list(&["Level 1"]))]))
    );
}

#[test]
fn documentation_views_are_found_by_view_group() {
    let mut doc_view = view(3, "Sheet view");
    doc_view
        .parameters
        .insert(super::scope::PARAM_VIEW_GROUP.to_string(), "Documentation Views".to_string());
    let mut template = view(4, "Template");
    template
        .parameters
        .insert(super::scope::PARAM_VIEW_GROUP.to_string(), "Documentation Views".to_string());
    if let crate::model::Facet::View(v) = &mut template.facet {
        v.is_template = true;
    }
    let doc = doc_with(vec![view(1, "Work"), doc_view, template]);
    let found: Vec<ElementId> = super::scope::documentation_views(&doc)
        .iter()
        .map(|v| v.id)
        .collect();
    assert_eq!(found, vec![ElementId(3)]);
}

// ============================================================================
// Collectors and counting
// ============================================================================

#[test]
fn count_by_model_category_in_the_active_view() {
    let mut doc = building();
    let section = Pipeline::new(ids::SCOPE_CURRENT_VIEW, ids::COLLECTOR_BY_MODEL_CATS, ids::ANALYZER_COUNT_ELEMENTS)
        .collector_args(&[(ids::ARG_CATEGORY_FILTER, list(&["Walls"]))])
        .run(&mut doc);

    assert_eq!(section.kind, SectionKind::Info);
    assert_eq!(section.name, "Count elements");
    assert_eq!(names(&section.all_items()), vec!["Walls 10"]);
    assert_eq!(section.items[0].description, "Walls - 10");
    assert_eq!(section.total_count(), 1);
    assert_eq!(section.max_printed_items, 20);
}

#[test]
fn empty_scope_collects_from_the_whole_model() {
    let mut doc = building();
    let section = Pipeline::new(ids::SCOPE_SELECTED_VIEWS, ids::COLLECTOR_BY_MODEL_CATS, ids::ANALYZER_COUNT_ELEMENTS)
        .collector_args(&[(ids::ARG_CATEGORY_FILTER, list(&["Walls"]))])
        .run(&mut doc);
    assert_eq!(element_ids(&section), vec!["10", "12"]);
}

#[test]
fn elements_seen_from_several_views_are_collected_once() {
    let mut doc = doc_with(vec![
        view(1, "A"),
        view(2, "B"),
        generic(10, "Walls", None, &[1, 2]),
    ]);
    let section = Pipeline::new(ids::SCOPE_SELECTED_VIEWS, ids::COLLECTOR_BY_MODEL_CATS, ids::ANALYZER_COUNT_ELEMENTS)
        .scope_args(&[(ids::ARG_SELECTED_VIEWS, list(&["A", "B"]))])
        .collector_args(&[(ids::ARG_CATEGORY_FILTER, list(&["Walls"]))])
        .run(&mut doc);
    assert_eq!(element_ids(&section), vec!["10"]);
}

#[test]
fn count_as_test_only_changes_the_section_kind() {
    let mut doc = building();
    let section = Pipeline::new(ids::SCOPE_CURRENT_VIEW, ids::COLLECTOR_BY_MODEL_CATS, ids::ANALYZER_COUNT_ELEMENTS)
        .collector_args(&[(ids::ARG_CATEGORY_FILTER, list(&["Walls", "Doors"]))])
        .analyzer_args(&[
            (ids::ARG_COUNT_REPORT_TYPE, ArgValue::from("TEST")),
            (ids::ARG_MAX_PRINTED_ITEMS, ArgValue::Int(-3)),
        ])
        .run(&mut doc);
    assert!(section.is_test());
    assert!(section.items.iter().all(|i| i.passed.is_none()));
    assert_eq!(section.passed_count(), 2);
    assert_eq!(section.passed_ratio(), 1.0);
    assert!(!section.has_failures());
    assert_eq!(section.max_printed_items, 0);
}

#[test]
fn misspelled_category_fails_the_collection() {
    let mut doc = building();
    let err = Pipeline::new(ids::SCOPE_CURRENT_VIEW, ids::COLLECTOR_BY_MODEL_CATS, ids::ANALYZER_COUNT_ELEMENTS)
        .collector_args(&[(ids::ARG_CATEGORY_FILTER, list(&["Walls", "Wals"]))])
        .run_with(&mut doc, &mut RecordingUi::new())
        .expect_err("unknown category");
    let msg = err.to_string();
    assert!(msg.starts_with("Error collecting data in By Model Categories"));
    assert!(msg.contains("No category found with this name Wals"));
}

#[test]
fn category_filter_description_summarizes_selection() {
    let doc = building();
    let registry = builtin_registry(&doc);
    let handle = registry.load_collector(ids::COLLECTOR_BY_MODEL_CATS);
    assert!(handle.description(&ArgMap::new()).ends_with("\nNo category is selected!"));
    let six = list(&["a", "b", "c", "d", "e", "f"]);
    assert!(
        handle
            .description(&arg_map(&[(ids::ARG_CATEGORY_FILTER, six)]))
            .ends_with("\nSelected categories: a, b, c, d, e and 1 more")
    );
}

#[test]
fn selected_elements_respect_the_category_filter() {
    let mut doc = building();
    let mut snapshot = doc.snapshot().clone();
    snapshot.selection = vec![ElementId(10), ElementId(11)];
    doc = MemoryDocument::new(snapshot).expect("valid");

    let section = Pipeline::new(ids::SCOPE_CURRENT_VIEW, ids::COLLECTOR_SELECTED_ELEMENTS, ids::ANALYZER_COUNT_ELEMENTS)
        .collector_args(&[(ids::ARG_CATEGORY_FILTER, list(&["Doors"]))])
        .run(&mut doc);
    assert_eq!(element_ids(&section), vec!["11"]);
}

#[test]
fn view_collectors_ignore_the_scope() {
    let mut doc = building();
    let section = Pipeline::new(ids::SCOPE_SELECTED_VIEWS, ids::COLLECTOR_CURRENT_VIEW, ids::ANALYZER_COUNT_ELEMENTS)
        .run(&mut doc);
    assert_eq!(element_ids(&section), vec!["1"]);
}

fn tagged_plan() -> MemoryDocument {
    let mut flow = tag(22, 1, Xyz::new(20.0, 0.0, 0.0), None);
    flow.family = Some("Pipe Flow Arrow".into());
    let mut room = tag(23, 1, Xyz::new(30.0, 0.0, 0.0), None);
    room.category = Some("Room Tags".into());
    if let Some(t) = room.as_tag_mut() {
        t.tag_class = TagClass::Room;
    }
    doc_with(vec![
        view(1, "Plan"),
        view(2, "Other"),
        generic(10, "Doors", None, &[1]),
        tagging(tag(20, 1, Xyz::new(0.0, 0.0, 0.0), None), &[10]),
        tag(21, 2, Xyz::new(0.0, 0.0, 0.0), None),
        flow,
        room,
    ])
}

#[test]
fn tags_collector_filters_flow_arrows_and_spatial_tags() {
    let mut doc = tagged_plan();
    let section = Pipeline::new(ids::SCOPE_CURRENT_VIEW, ids::COLLECTOR_TAGS, ids::ANALYZER_COUNT_ELEMENTS)
        .run(&mut doc);
    assert_eq!(element_ids(&section), vec!["20", "23"]);

    let section = Pipeline::new(ids::SCOPE_CURRENT_VIEW, ids::COLLECTOR_TAGS, ids::ANALYZER_COUNT_ELEMENTS)
        .collector_args(&[
            (ids::ARG_IGNORE_FLOW_ARROWS, ArgValue::Bool(false)),
            (ids::ARG_INCLUDE_SPATIAL_TAGS, ArgValue::Bool(false)),
        ])
        .run(&mut doc);
    assert_eq!(element_ids(&section), vec!["20", "22"]);
}

#[test]
fn sloped_pipes_are_classified_by_angle_from_vertical() {
    let origin = Xyz::new(0.0, 0.0, 0.0);
    let slope = 80f64.to_radians();
    let mut doc = doc_with(vec![
        view(1, "Plumbing"),
        pipe(30, origin, Xyz::new(5.0, 0.0, 0.0), &[1]),
        pipe(31, origin, Xyz::new(0.0, 0.0, 3.0), &[1]),
        pipe(32, origin, Xyz::new(1.0, 0.0, 1.0), &[1]),
        pipe(33, origin, Xyz::new(slope.sin(), 0.0, slope.cos()), &[1]),
        generic(34, "Walls", None, &[1]),
    ]);
    let section = Pipeline::new(ids::SCOPE_CURRENT_VIEW, ids::COLLECTOR_SLOPED_PIPES, ids::ANALYZER_COUNT_ELEMENTS)
        .run(&mut doc);
    assert_eq!(element_ids(&section), vec!["33"]);
}

#[test]
fn untagged_collector_checks_tags_in_the_active_view() {
    let mut doc = doc_with(vec![
        view(1, "Plan"),
        view(2, "Other"),
        generic(10, "Doors", None, &[1, 2]),
        generic(11, "Doors", None, &[1, 2]),
        tagging(tag(20, 1, Xyz::new(0.0, 0.0, 0.0), None), &[10]),
        tagging(tag(21, 2, Xyz::new(0.0, 0.0, 0.0), None), &[11]),
    ]);
    let args = [(ids::ARG_CATEGORIES_TO_COLLECT, list(&["Doors"]))];
    let section = Pipeline::new(ids::SCOPE_CURRENT_VIEW, ids::COLLECTOR_UNTAGGED_MODEL_CATEGORIES, ids::ANALYZER_COUNT_ELEMENTS)
        .collector_args(&args)
        .run(&mut doc);
    assert_eq!(element_ids(&section), vec!["11"]);

    let section = Pipeline::new(ids::SCOPE_CURRENT_VIEW, ids::COLLECTOR_UNTAGGED_MODEL_CATEGORIES, ids::ANALYZER_COUNT_ELEMENTS)
        .collector_args(&[
            (ids::ARG_CATEGORIES_TO_COLLECT, list(&["Doors"])),
            (ids::ARG_ACTIVE_VIEW_ONLY, ArgValue::Bool(false)),
        ])
        .run(&mut doc);
    assert!(element_ids(&section).is_empty());
}

#[test]
fn untagged_collector_rejects_unknown_categories() {
    let mut doc = building();
    let err = Pipeline::new(ids::SCOPE_CURRENT_VIEW, ids::COLLECTOR_UNTAGGED_MODEL_CATEGORIES, ids::ANALYZER_COUNT_ELEMENTS)
        .collector_args(&[(ids::ARG_CATEGORIES_TO_COLLECT, list(&["Roofs"]))])
        .run_with(&mut doc, &mut RecordingUi::new())
        .expect_err("unknown category");
    assert!(err.to_string().contains("No category found with this name Roofs"));
}

// ============================================================================
// Analyzers
// ============================================================================

#[test]
fn is_tagged_honours_the_active_view_flag() {
    let mut doc = doc_with(vec![
        view(1, "Plan"),
        view(2, "Other"),
        generic(10, "Doors", None, &[1, 2]),
        generic(11, "Doors", None, &[1, 2]),
        tagging(tag(20, 1, Xyz::new(0.0, 0.0, 0.0), None), &[10]),
        tagging(tag(21, 2, Xyz::new(0.0, 0.0, 0.0), None), &[11]),
    ]);
    let filter = [(ids::ARG_CATEGORY_FILTER, list(&["Doors"]))];

    let section = Pipeline::new(ids::SCOPE_CURRENT_VIEW, ids::COLLECTOR_BY_MODEL_CATS, ids::ANALYZER_IS_TAGGED)
        .collector_args(&filter)
        .run(&mut doc);
    assert!(section.is_test());
    assert_eq!(section.description, "Check if elements are tagged through 2 elements");
    assert_eq!(section.total_count(), 2);
    assert_eq!(section.passed_count(), 1);
    assert_eq!(section.failed_items().map(|i| i.element_ids[0].clone()).collect::<Vec<_>>(), vec!["11"]);
    let descriptions: Vec<&str> = section.items.iter().map(|i| i.description.as_str()).collect();
    assert_eq!(descriptions, vec!["Doors - 10", "Doors - 11"]);
    assert_eq!(section.max_printed_items, 1000);

    let section = Pipeline::new(ids::SCOPE_CURRENT_VIEW, ids::COLLECTOR_BY_MODEL_CATS, ids::ANALYZER_IS_TAGGED)
        .collector_args(&filter)
        .analyzer_args(&[(ids::ARG_ACTIVE_VIEW_ONLY, ArgValue::Bool(false))])
        .run(&mut doc);
    assert!(!section.has_failures());
}

#[test]
fn orphaned_and_unknown_tags_are_reported() {
    let mut orphan = tag(20, 1, Xyz::new(0.0, 0.0, 0.0), None);
    if let Some(t) = orphan.as_tag_mut() {
        t.is_orphaned = true;
    }
    let mut blank = tagging(tag(21, 1, Xyz::new(5.0, 0.0, 0.0), None), &[10]);
    let mut blank_hidden_host = tagging(tag(22, 1, Xyz::new(9.0, 0.0, 0.0), None), &[11]);
    for t in [&mut blank, &mut blank_hidden_host] {
        if let Some(f) = t.as_tag_mut() {
            f.text.clear();
        }
    }
    let mut hidden_door = generic(11, "Doors", None, &[1]);
    hidden_door.hidden_in_views = vec![ElementId(1)];
    let mut doc = doc_with(vec![
        view(1, "Plan"),
        generic(10, "Doors", None, &[1]),
        hidden_door,
        orphan,
        blank,
        blank_hidden_host,
        tag(23, 1, Xyz::new(20.0, 0.0, 0.0), None),
    ]);

    let section = Pipeline::new(ids::SCOPE_CURRENT_VIEW, ids::COLLECTOR_TAGS, ids::ANALYZER_ORPHANED_TAGS)
        .run(&mut doc);

    // per view: unknown tags come before orphaned ones
    assert_eq!(names(&section.all_items()), vec!["Unknown Door Tags.", "Orphaned Door Tags."]);
    assert_eq!(
        section.items[0].description,
        "view 'Plan': The tag has unknown value. The tag's hosts IDs: 10."
    );
    assert_eq!(section.items[1].description, "view 'Plan': The tag is orphaned.");
    assert_eq!(section.items[0].element_ids, vec!["21"]);
    assert_eq!(section.total_count(), 4);
    assert!((section.passed_ratio() - 0.5).abs() < 1e-12);
    assert_eq!(section.max_printed_items, 100);
}

#[test]
fn orphaned_tags_with_no_data_pass() {
    let mut doc = doc_with(vec![view(1, "Plan")]);
    let section = Pipeline::new(ids::SCOPE_CURRENT_VIEW, ids::COLLECTOR_TAGS, ids::ANALYZER_ORPHANED_TAGS)
        .run(&mut doc);
    assert!(section.items.is_empty());
    assert_eq!(section.passed_ratio(), 1.0);
}

#[test]
fn orphaned_tags_skip_3d_views() {
    let mut orphan = tag(20, 1, Xyz::new(0.0, 0.0, 0.0), None);
    if let Some(t) = orphan.as_tag_mut() {
        t.is_orphaned = true;
    }
    let mut doc = doc_with(vec![
        view_of(1, "{3D}", crate::model::ViewType::ThreeD),
        orphan,
    ]);
    let section = Pipeline::new(ids::SCOPE_CURRENT_VIEW, ids::COLLECTOR_TAGS, ids::ANALYZER_ORPHANED_TAGS)
        .run(&mut doc);
    assert!(section.items.is_empty());
}

#[test]
fn boundingbox_collision_reports_clashing_pairs() {
    let mut doc = building();
    let section = Pipeline::new(ids::SCOPE_CURRENT_VIEW, ids::COLLECTOR_BY_MODEL_CATS, ids::ANALYZER_BOUNDINGBOX_COLLISION)
        .collector_args(&[(ids::ARG_CATEGORY_FILTER, list(&["Walls", "Doors"]))])
        .run(&mut doc);

    assert_eq!(names(&section.all_items()), vec!["Clash between Walls and Doors"]);
    assert_eq!(section.items[0].description, "Clash between Walls 10 and Doors 11");
    assert_eq!(section.items[0].element_ids, vec!["10", "11"]);
    assert_eq!(section.total_count(), 2);
    assert_eq!(section.passed_count(), 0);
    assert!(section.description.ends_with(" through 2 elements"));
}

fn overlapping_tags() -> MemoryDocument {
    let mut no_box = tag(24, 1, Xyz::new(40.0, 0.0, 0.0), None);
    no_box.hidden_in_views = vec![ElementId(1)];
    doc_with(vec![
        view(1, "Plan"),
        view(2, "Quiet"),
        view_of(3, "{3D}", crate::model::ViewType::ThreeD),
        tag(20, 1, Xyz::new(0.0, 0.0, 0.0), None),
        tag(21, 1, Xyz::new(0.5, 0.0, 0.0), None),
        tag(22, 1, Xyz::new(100.0, 0.0, 0.0), None),
        tag(23, 2, Xyz::new(0.0, 0.0, 0.0), None),
        tag(25, 3, Xyz::new(0.0, 0.0, 0.0), None),
        tag(26, 3, Xyz::new(0.0, 0.0, 0.0), None),
        no_box,
    ])
}

fn all_views() -> [(&'static str, ArgValue); 1] {
    [(ids::ARG_SELECTED_VIEWS, list(&["Plan", "Quiet", "{3D}"]))]
}

#[test]
fn tag_collision_reports_overlaps_per_view() {
    let mut doc = overlapping_tags();
    let section = Pipeline::new(ids::SCOPE_SELECTED_VIEWS, ids::COLLECTOR_TAGS, ids::ANALYZER_TAG_COLLISION)
        .scope_args(&all_views())
        .run(&mut doc);

    assert_eq!(section.kind, SectionKind::Info);
    assert_eq!(section.name, "Check if tags overlap");
    // Plan and Quiet are processed, only Quiet is clean
    assert_eq!(section.total_count(), 2);
    assert_eq!(section.passed_count(), 1);

    let child_names: Vec<&str> = section.children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(child_names, vec!["In view Plan", "Tag Bounding Box Error"]);
    let plan = &section.children[0];
    assert_eq!(plan.description, "In view `Plan`");
    assert_eq!(names(&plan.all_items()), vec!["Clash between Door Tags"]);
    assert_eq!(plan.items[0].element_ids, vec!["20", "21"]);

    let errors = &section.children[1];
    assert_eq!(errors.items[0].name, "Door Tag");
    assert_eq!(errors.items[0].description, "Element in view Plan has no bounding box!");
    assert_eq!(errors.max_printed_items, 200);
    assert!(section.has_failures());
}

#[test]
fn tag_collision_can_skip_bounding_box_errors() {
    let mut doc = overlapping_tags();
    let section = Pipeline::new(ids::SCOPE_SELECTED_VIEWS, ids::COLLECTOR_TAGS, ids::ANALYZER_TAG_COLLISION)
        .scope_args(&all_views())
        .analyzer_args(&[
            (ids::ARG_REPORT_BB_ERROR, ArgValue::Bool(false)),
            (ids::ARG_REPORT_SECTION_NAME, ArgValue::from("Tags")),
        ])
        .run(&mut doc);
    assert_eq!(section.name, "Tags");
    assert_eq!(section.children.len(), 1);
}

#[test]
fn leader_tags_are_checked_by_their_real_head() {
    let leadered = tagging(
        tag(20, 1, Xyz::new(0.0, 0.0, 0.0), Some(Xyz::new(10.0, -5.0, 0.0))),
        &[100],
    );
    let mut doc = doc_with(vec![
        view(1, "Plan"),
        generic(100, "Doors", None, &[1]),
        leadered.clone(),
        tag(21, 1, Xyz::new(9.0, -4.5, 0.0), None),
    ]);
    let section = Pipeline::new(ids::SCOPE_CURRENT_VIEW, ids::COLLECTOR_TAGS, ids::ANALYZER_TAG_COLLISION)
        .run(&mut doc);

    assert!(!section.has_failures());
    assert_eq!(section.passed_count(), 1);
    assert_eq!(doc.element(ElementId(20)), Some(&leadered));
    assert!(!doc.in_transaction());
}

#[test]
fn tag_collision_stops_when_cancelled() {
    let mut doc = overlapping_tags();
    let mut ui = RecordingUi::cancelling_after(1);
    let section = Pipeline::new(ids::SCOPE_SELECTED_VIEWS, ids::COLLECTOR_TAGS, ids::ANALYZER_TAG_COLLISION)
        .scope_args(&all_views())
        .run_with(&mut doc, &mut ui)
        .expect("runs");
    assert_eq!(section.total_count(), 1);
    assert_eq!(ui.progress, vec![(1, 3)]);
    assert!(!doc.in_transaction());
}

#[test]
fn tag_collision_in_views_delegates_with_its_sensitivity() {
    let mut doc = overlapping_tags();
    let section = Pipeline::new(ids::SCOPE_SELECTED_VIEWS, ids::COLLECTOR_DOCUMENTATION_VIEWS, ids::ANALYZER_TAG_COLLISION_IN_VIEWS)
        .run(&mut doc);
    // no documentation views: nothing to check
    assert_eq!(section.name, "Check if tags overlap");
    assert_eq!(section.total_count(), 0);

    let plan: Vec<Element> = doc.views().into_iter().filter(|v| v.id == ElementId(1)).cloned().collect();
    let registry = builtin_registry(&doc);
    let mut ui = RecordingUi::new();
    let mut ctx = RunContext::new(&mut doc, &mut ui, &registry);
    let section = registry
        .load_analyzer(ids::ANALYZER_TAG_COLLISION_IN_VIEWS)
        .analyze(&mut ctx, &plan, &ArgMap::new())
        .expect("analyze");
    assert_eq!(section.children[0].name, "In view Plan");
}

#[test]
fn tag_collision_in_views_forwards_extra_args_to_the_delegate() {
    let mut doc = overlapping_tags();
    let plan: Vec<Element> = doc.views().into_iter().filter(|v| v.id == ElementId(1)).cloned().collect();
    let registry = builtin_registry(&doc);
    let mut ui = RecordingUi::new();
    let mut ctx = RunContext::new(&mut doc, &mut ui, &registry);
    let explicit = arg_map(&[(ids::ARG_REPORT_SECTION_NAME, ArgValue::Str("Tag clashes".into()))]);
    let section = registry
        .load_analyzer(ids::ANALYZER_TAG_COLLISION_IN_VIEWS)
        .analyze(&mut ctx, &plan, &explicit)
        .expect("analyze");
    assert_eq!(section.name, "Tag clashes");
    assert_eq!(section.children[0].name, "In view Plan");
}
