//! A single QA operation: scope selection, collection, analysis.

use crate::operator::{Analyzer, Collector, RunContext, ScopeSelector};
use crate::registry::{ModuleHandle, ModuleRegistry};
use bimqa_types::{
    ArgMap, ConfigType, ModuleKind, ModuleMeta, ModuleRefDoc, OperationDoc, ReportSection,
};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    ScopeSelection,
    Collection,
    Analysis,
}

impl Stage {
    pub fn message(self) -> &'static str {
        match self {
            Stage::ScopeSelection => "Error selecting scope in",
            Stage::Collection => "Error collecting data in",
            Stage::Analysis => "Error analyzing data in",
        }
    }

    pub fn kind(self) -> ModuleKind {
        match self {
            Stage::ScopeSelection => ModuleKind::ScopeSelector,
            Stage::Collection => ModuleKind::Collector,
            Stage::Analysis => ModuleKind::Analyzer,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperationState {
    Idle,
    SelectingScope,
    Collecting,
    Analyzing,
    Done,
    Failed(Stage),
}

/// A stage failure, fatal to the operation.
#[derive(Debug, thiserror::Error)]
#[error("{} {module_title}: {source}", .stage.message())]
pub struct StageError {
    pub stage: Stage,
    pub operation: String,
    pub module_name: String,
    pub module_title: String,
    pub author: String,
    #[source]
    pub source: anyhow::Error,
    /// Full diagnostic chain of `source`.
    pub trace: String,
}

impl StageError {
    fn new(stage: Stage, operation: &str, meta: &ModuleMeta, source: anyhow::Error) -> Self {
        let trace = format!("{source:?}");
        tracing::error!(
            stage = ?stage,
            operation,
            module = %meta.module_name,
            author = %meta.author,
            "{} {}: {source:#}. Please contact the BIM team or the module author {}",
            stage.message(),
            meta.name,
            meta.author,
        );
        Self {
            stage,
            operation: operation.to_string(),
            module_name: meta.module_name.clone(),
            module_title: meta.name.clone(),
            author: meta.author.clone(),
            source,
            trace,
        }
    }
}

#[derive(Clone)]
pub struct Operation {
    pub name: String,
    scope_selector: ModuleHandle<dyn ScopeSelector>,
    collector: ModuleHandle<dyn Collector>,
    analyzer: ModuleHandle<dyn Analyzer>,
    pub scope_selector_args: ArgMap,
    pub collector_args: ArgMap,
    pub analyzer_args: ArgMap,
    state: OperationState,
}

impl Operation {
    pub fn new(
        name: impl Into<String>,
        scope_selector: ModuleHandle<dyn ScopeSelector>,
        collector: ModuleHandle<dyn Collector>,
        analyzer: ModuleHandle<dyn Analyzer>,
    ) -> Self {
        Self {
            name: name.into(),
            scope_selector,
            collector,
            analyzer,
            scope_selector_args: ArgMap::new(),
            collector_args: ArgMap::new(),
            analyzer_args: ArgMap::new(),
            state: OperationState::Idle,
        }
    }

    /// Resolve modules by name through `registry`.
    pub fn from_names(
        registry: &ModuleRegistry,
        name: impl Into<String>,
        scope_selector: &str,
        collector: &str,
        analyzer: &str,
    ) -> Self {
        Self::new(
            name,
            registry.load_scope_selector(scope_selector),
            registry.load_collector(collector),
            registry.load_analyzer(analyzer),
        )
    }

    pub fn with_scope_selector_args(mut self, args: ArgMap) -> Self {
        self.scope_selector_args = args;
        self
    }

    pub fn with_collector_args(mut self, args: ArgMap) -> Self {
        self.collector_args = args;
        self
    }

    pub fn with_analyzer_args(mut self, args: ArgMap) -> Self {
        self.analyzer_args = args;
        self
    }

    pub fn scope_selector(&self) -> &ModuleHandle<dyn ScopeSelector> {
        &self.scope_selector
    }

    pub fn collector(&self) -> &ModuleHandle<dyn Collector> {
        &self.collector
    }

    pub fn analyzer(&self) -> &ModuleHandle<dyn Analyzer> {
        &self.analyzer
    }

    pub fn set_scope_selector(&mut self, module: ModuleHandle<dyn ScopeSelector>) {
        self.scope_selector = module;
    }

    pub fn set_collector(&mut self, module: ModuleHandle<dyn Collector>) {
        self.collector = module;
    }

    pub fn set_analyzer(&mut self, module: ModuleHandle<dyn Analyzer>) {
        self.analyzer = module;
    }

    pub fn state(&self) -> OperationState {
        self.state
    }

    /// Run the pipeline.
    ///
    /// A failing stage stops the operation; later stages are not invoked.
    /// On success the section is renamed to the operation name (when it has
    /// more than one character) and passed through the decorators of the
    /// scope selector, collector and analyzer, in that order.
    pub fn run(&mut self, ctx: &mut RunContext<'_>) -> Result<ReportSection, StageError> {
        tracing::info!(operation = %self, "running operation");

        self.state = OperationState::SelectingScope;
        let scope = self
            .scope_selector
            .select(ctx, &self.scope_selector_args)
            .map_err(|e| self.fail(Stage::ScopeSelection, e))?;

        self.state = OperationState::Collecting;
        let data = self
            .collector
            .collect(ctx, &scope, &self.collector_args)
            .map_err(|e| self.fail(Stage::Collection, e))?;

        self.state = OperationState::Analyzing;
        let mut section = self
            .analyzer
            .analyze(ctx, &data, &self.analyzer_args)
            .map_err(|e| self.fail(Stage::Analysis, e))?;

        if self.name.chars().count() > 1 {
            section.name = self.name.clone();
        }

        self.scope_selector.decorate(&mut section);
        self.collector.decorate(&mut section);
        self.analyzer.decorate(&mut section);

        self.state = OperationState::Done;
        tracing::info!(
            operation = %self.name,
            scope = scope.len(),
            elements = data.len(),
            items = section.all_items().len(),
            "operation finished"
        );
        Ok(section)
    }

    fn fail(&mut self, stage: Stage, source: anyhow::Error) -> StageError {
        self.state = OperationState::Failed(stage);
        let meta = match stage {
            Stage::ScopeSelection => self.scope_selector.meta(),
            Stage::Collection => self.collector.meta(),
            Stage::Analysis => self.analyzer.meta(),
        };
        StageError::new(stage, &self.name, meta, source)
    }

    pub fn to_document(&self) -> OperationDoc {
        fn module_ref(meta: &ModuleMeta) -> ModuleRefDoc {
            ModuleRefDoc {
                name: meta.name.clone(),
                author: meta.author.clone(),
                module_name: meta.module_name.clone(),
            }
        }

        OperationDoc {
            config_type: ConfigType::Operation,
            name: self.name.clone(),
            scope_selector: Some(module_ref(self.scope_selector.meta())),
            scope_selector_args: self.scope_selector_args.clone(),
            collector: Some(module_ref(self.collector.meta())),
            collector_args: self.collector_args.clone(),
            analyzer: Some(module_ref(self.analyzer.meta())),
            analyzer_args: self.analyzer_args.clone(),
        }
    }

    /// Rebuild from a document; modules are re-resolved by name, so unknown
    /// names turn into stubs.
    pub fn from_document(doc: &OperationDoc, registry: &ModuleRegistry) -> Self {
        Self::from_names(
            registry,
            doc.name.clone(),
            doc.module_name(ModuleKind::ScopeSelector),
            doc.module_name(ModuleKind::Collector),
            doc.module_name(ModuleKind::Analyzer),
        )
        .with_scope_selector_args(doc.scope_selector_args.clone())
        .with_collector_args(doc.collector_args.clone())
        .with_analyzer_args(doc.analyzer_args.clone())
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} -> {} -> {}",
            self.name,
            self.scope_selector.module_name(),
            self.collector.module_name(),
            self.analyzer.module_name()
        )
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("name", &self.name)
            .field("scope_selector", &self.scope_selector)
            .field("collector", &self.collector)
            .field("analyzer", &self.analyzer)
            .field("state", &self.state)
            .finish()
    }
}
