use crate::model::{
    BoundingBox, Category, CategoryKind, CurveFacet, Element, ElementId, Facet, TagClass, TagFacet,
    ViewFacet, ViewType, Xyz,
};
use crate::operator::{Analyzer, Collector, Operator, RunContext, ScopeSelector};
use crate::registry::{HostCatalog, ModuleRegistry};
use crate::snapshot::{MemoryDocument, ModelSnapshot};
use bimqa_types::{
    ArgMap, ArgType, ArgValue, Args, ModuleSpec, ReportItem, ReportSection,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub fn categories() -> Vec<Category> {
    vec![
        Category {
            id: 1,
            name: "Walls".into(),
            kind: CategoryKind::Model,
        },
        Category {
            id: 2,
            name: "Doors".into(),
            kind: CategoryKind::Model,
        },
        Category {
            id: 3,
            name: "Pipes".into(),
            kind: CategoryKind::Model,
        },
        Category {
            id: 4,
            name: "Door Tags".into(),
            kind: CategoryKind::Annotation,
        },
        Category {
            id: 5,
            name: "Room Tags".into(),
            kind: CategoryKind::Annotation,
        },
    ]
}

/// Document over `elements`; the first non-template view is active.
pub fn doc_with(elements: Vec<Element>) -> MemoryDocument {
    let active_view = elements
        .iter()
        .find(|e| e.as_view().is_some_and(|v| !v.is_template))
        .map(|e| e.id);
    MemoryDocument::new(ModelSnapshot {
        title: "test model".into(),
        active_view,
        selection: Vec::new(),
        categories: categories(),
        elements,
    })
    .expect("valid snapshot")
}

pub fn cube(x: f64, y: f64, z: f64, size: f64) -> BoundingBox {
    BoundingBox::new(Xyz::new(x, y, z), Xyz::new(x + size, y + size, z + size))
}

pub fn view_of(id: i64, name: &str, view_type: ViewType) -> Element {
    let mut e = Element::new(id);
    e.name = Some(name.into());
    e.category = Some("Views".into());
    e.facet = Facet::View(ViewFacet {
        view_type,
        is_template: false,
    });
    e
}

pub fn view(id: i64, name: &str) -> Element {
    view_of(id, name, ViewType::FloorPlan)
}

pub fn generic(id: i64, category: &str, bb: Option<BoundingBox>, views: &[i64]) -> Element {
    let mut e = Element::new(id);
    e.name = Some(format!("{category} {id}"));
    e.category = Some(category.into());
    e.bounding_box = bb;
    e.views = views.iter().map(|&v| ElementId(v)).collect();
    e
}

/// Door tag with a 2 x 1 head centred on `head`, owned by `owner_view`.
pub fn tag(id: i64, owner_view: i64, head: Xyz, leader_end: Option<Xyz>) -> Element {
    let mut e = Element::new(id);
    e.category = Some("Door Tags".into());
    e.family = Some("Door Tag".into());
    e.owner_view = Some(ElementId(owner_view));
    e.facet = Facet::Tag(TagFacet {
        tag_class: TagClass::Element,
        tagged: Vec::new(),
        text: "D1".into(),
        is_orphaned: false,
        has_leader: leader_end.is_some(),
        head,
        head_width: 2.0,
        head_height: 1.0,
        leader_end,
    });
    e
}

pub fn tagging(mut tag: Element, hosts: &[i64]) -> Element {
    if let Some(t) = tag.as_tag_mut() {
        t.tagged = hosts.iter().map(|&h| ElementId(h)).collect();
    }
    tag
}

pub fn pipe(id: i64, start: Xyz, end: Xyz, views: &[i64]) -> Element {
    let mut e = generic(id, "Pipes", None, views);
    e.facet = Facet::Curve(CurveFacet { start, end });
    e
}

pub fn builtin_registry(doc: &MemoryDocument) -> ModuleRegistry {
    ModuleRegistry::with_builtin_modules(HostCatalog::from_document(doc)).expect("builtins")
}

pub fn arg_map(pairs: &[(&str, ArgValue)]) -> ArgMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

pub fn names(items: &[&ReportItem]) -> Vec<String> {
    items.iter().map(|i| i.name.clone()).collect()
}

// ============================================================================
// Scriptable modules
// ============================================================================

/// Shared call log of the scriptable modules.
#[derive(Clone, Default)]
pub struct CallLog {
    pub collect_calls: Arc<AtomicUsize>,
    pub analyze_calls: Arc<AtomicUsize>,
    pub analyzer_args: Arc<Mutex<Vec<ArgMap>>>,
}

impl CallLog {
    pub fn collects(&self) -> usize {
        self.collect_calls.load(Ordering::SeqCst)
    }

    pub fn analyses(&self) -> usize {
        self.analyze_calls.load(Ordering::SeqCst)
    }
}

struct AllViews;

impl Operator for AllViews {}

impl ScopeSelector for AllViews {
    fn select(&mut self, ctx: &mut RunContext<'_>, _args: &Args) -> anyhow::Result<Vec<Element>> {
        Ok(ctx.doc.views().into_iter().cloned().collect())
    }
}

struct EveryElement {
    calls: CallLog,
}

impl Operator for EveryElement {
    fn author(&self) -> &str {
        "Test Author"
    }
}

impl Collector for EveryElement {
    fn collect(
        &mut self,
        ctx: &mut RunContext<'_>,
        _scope: &[Element],
        _args: &Args,
    ) -> anyhow::Result<Vec<Element>> {
        self.calls.collect_calls.fetch_add(1, Ordering::SeqCst);
        Ok(ctx
            .doc
            .elements()
            .into_iter()
            .filter(|e| !e.is_view())
            .cloned()
            .collect())
    }
}

struct BrokenCollector;

impl Operator for BrokenCollector {
    fn author(&self) -> &str {
        "Broken Author"
    }
}

impl Collector for BrokenCollector {
    fn collect(
        &mut self,
        _ctx: &mut RunContext<'_>,
        _scope: &[Element],
        _args: &Args,
    ) -> anyhow::Result<Vec<Element>> {
        anyhow::bail!("collector exploded")
    }
}

/// Records its effective arguments and reports one passing item per element.
struct RecordingAnalyzer {
    calls: CallLog,
}

impl Operator for RecordingAnalyzer {
    fn section_decorator(&self) -> Option<crate::operator::SectionDecorator<'_>> {
        Some(Box::new(|s: &mut ReportSection| {
            s.description = format!("decorated: {}", s.description)
        }))
    }

    fn item_decorator(&self) -> Option<crate::operator::ItemDecorator<'_>> {
        Some(Box::new(|i: &mut ReportItem| i.name = i.name.to_uppercase()))
    }
}

impl Analyzer for RecordingAnalyzer {
    fn analyze(
        &mut self,
        _ctx: &mut RunContext<'_>,
        data: &[Element],
        args: &Args,
    ) -> anyhow::Result<ReportSection> {
        self.calls.analyze_calls.fetch_add(1, Ordering::SeqCst);
        self.calls.analyzer_args.lock().push(args.as_map().clone());
        let mut section = ReportSection::test("recorded").with_description("seen");
        for e in data {
            section.add_item(
                ReportItem::new(e.display_name())
                    .with_element(e.id)
                    .with_passed(true),
            );
        }
        Ok(section)
    }
}

fn recording_spec(_: &HostCatalog) -> ModuleSpec {
    ModuleSpec::new()
        .name("Recording analyzer")
        .arg("a", ArgType::Int, 1i64)
        .arg("b", ArgType::Bool, true)
}

/// Registry with scriptable modules: scope `all_views`, collectors
/// `every_element` / `broken`, analyzer `recording`, plus a collector
/// `unbuildable` whose factory fails.
pub fn scripted_registry(calls: &CallLog) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new(HostCatalog::default());
    registry
        .register_scope_selector(
            "all_views",
            |_| ModuleSpec::new().name("All views"),
            || Ok(Box::new(AllViews)),
        )
        .expect("register");
    let p = calls.clone();
    registry
        .register_collector(
            "every_element",
            |_| ModuleSpec::new(),
            move || {
                Ok(Box::new(EveryElement { calls: p.clone() }))
            },
        )
        .expect("register");
    registry
        .register_collector(
            "broken",
            |_| ModuleSpec::new().name("Broken collector"),
            || Ok(Box::new(BrokenCollector)),
        )
        .expect("register");
    registry
        .register_collector(
            "unbuildable",
            |_| ModuleSpec::new(),
            || anyhow::bail!("missing host API"),
        )
        .expect("register");
    let p = calls.clone();
    registry
        .register_analyzer("recording", recording_spec, move || {
            Ok(Box::new(RecordingAnalyzer { calls: p.clone() }))
        })
        .expect("register");
    registry
}
