//! Module contracts.
//!
//! Every module implements [`Operator`] plus exactly one of the stage traits.
//! Arguments arrive already merged with the module's defaults.

use crate::document::Document;
use crate::model::Element;
use crate::registry::ModuleRegistry;
use crate::ui::Ui;
use bimqa_types::{ArgMap, Args, ModuleMeta, ReportItem, ReportSection, ids, merge_args};

pub type SectionDecorator<'a> = Box<dyn Fn(&mut ReportSection) + 'a>;
pub type ItemDecorator<'a> = Box<dyn Fn(&mut ReportItem) + 'a>;

/// Everything a stage can reach while it runs.
pub struct RunContext<'a> {
    pub doc: &'a mut dyn Document,
    pub ui: &'a mut dyn Ui,
    pub registry: &'a ModuleRegistry,
}

impl<'a> RunContext<'a> {
    pub fn new(doc: &'a mut dyn Document, ui: &'a mut dyn Ui, registry: &'a ModuleRegistry) -> Self {
        Self { doc, ui, registry }
    }
}

pub trait Operator: Send {
    /// Author used when the registration does not name one.
    fn author(&self) -> &str {
        ids::DEFAULT_AUTHOR
    }

    /// Description for the given effective arguments.
    fn description(&self, meta: &ModuleMeta, _args: &Args) -> String {
        meta.description.clone()
    }

    /// Interactive argument editing. Returns the new explicit arguments, or
    /// `None` when the user cancelled.
    fn show_additional_settings(
        &mut self,
        ui: &mut dyn Ui,
        _doc: &dyn Document,
        meta: &ModuleMeta,
        current: &ArgMap,
    ) -> Option<ArgMap> {
        let merged = merge_args(&meta.default_args, current);
        ui.edit_arguments(&meta.name, &meta.arg_types, &merged)
    }

    /// Post-processing applied to the whole report section.
    fn section_decorator(&self) -> Option<SectionDecorator<'_>> {
        None
    }

    /// Post-processing applied to every report item, depth-first.
    fn item_decorator(&self) -> Option<ItemDecorator<'_>> {
        None
    }
}

pub trait ScopeSelector: Operator {
    fn select(&mut self, ctx: &mut RunContext<'_>, args: &Args) -> anyhow::Result<Vec<Element>>;
}

pub trait Collector: Operator {
    fn collect(
        &mut self,
        ctx: &mut RunContext<'_>,
        scope: &[Element],
        args: &Args,
    ) -> anyhow::Result<Vec<Element>>;
}

pub trait Analyzer: Operator {
    fn analyze(
        &mut self,
        ctx: &mut RunContext<'_>,
        data: &[Element],
        args: &Args,
    ) -> anyhow::Result<ReportSection>;
}
