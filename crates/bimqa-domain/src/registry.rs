//! Module registry.
//!
//! Modules are registered explicitly under `(kind, module_name)` with a
//! metadata function and a factory. Loading instantiates a module once per
//! registry and caches it; a module that cannot be loaded resolves to a
//! [`ModuleHandle::Stub`] that keeps the error and behaves neutrally.

use crate::document::Document;
use crate::model::Element;
use crate::operator::{Analyzer, Collector, Operator, RunContext, ScopeSelector};
use crate::ui::Ui;
use bimqa_types::{
    ArgMap, Args, MetaError, ModuleKind, ModuleMeta, ModuleSpec, ReportSection, ids, merge_args,
};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Document-derived option lists used to build module argument types.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HostCatalog {
    /// All category names, sorted.
    pub categories: Vec<String>,
    /// Model category names, sorted.
    pub model_categories: Vec<String>,
    /// Non-template view names, sorted.
    pub views: Vec<String>,
}

impl HostCatalog {
    pub fn from_document(doc: &dyn Document) -> Self {
        let mut categories: Vec<String> =
            doc.categories().iter().map(|c| c.name.clone()).collect();
        categories.sort();
        categories.dedup();

        let mut views: Vec<String> = doc
            .views()
            .into_iter()
            .filter(|v| v.as_view().is_some_and(|f| !f.is_template))
            .filter_map(|v| v.name.clone())
            .collect();
        views.sort();

        Self {
            categories,
            model_categories: doc.model_category_names(),
            views,
        }
    }
}

/// Builds a module's registration metadata.
pub type Describe = fn(&HostCatalog) -> ModuleSpec;

type Factory<T> = Box<dyn Fn() -> anyhow::Result<Box<T>> + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("{kind} '{name}' is already registered")]
    Duplicate { kind: ModuleKind, name: String },
    #[error("no {kind} is registered as '{name}'")]
    NotRegistered { kind: ModuleKind, name: String },
    #[error("{kind} '{name}' failed to initialize")]
    Factory {
        kind: ModuleKind,
        name: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("invalid module metadata")]
    Metadata(#[from] MetaError),
}

/// Display text of `err` followed by its whole source chain.
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut cur = err.source();
    while let Some(cause) = cur {
        out.push_str("\n  caused by: ");
        out.push_str(&cause.to_string());
        cur = cause.source();
    }
    out
}

/// Neutral stand-in for a module that failed to load.
#[derive(Debug)]
pub struct StubModule {
    meta: ModuleMeta,
    error: String,
    trace: String,
    warned: AtomicBool,
}

impl StubModule {
    fn new(kind: ModuleKind, name: &str, err: &RegistryError) -> Self {
        Self {
            meta: ModuleMeta {
                kind,
                module_name: name.to_string(),
                name: name.to_string(),
                description: format!("Failed to load {} '{name}': {err}", kind.label()),
                author: ids::DEFAULT_AUTHOR.to_string(),
                returns: String::new(),
                arg_types: BTreeMap::new(),
                default_args: ArgMap::new(),
                hidden: true,
            },
            error: err.to_string(),
            trace: error_chain(err),
            warned: AtomicBool::new(false),
        }
    }

    pub fn error(&self) -> &str {
        &self.error
    }

    pub fn trace(&self) -> &str {
        &self.trace
    }

    /// Alert the user the first time the stub is invoked.
    fn warn_once(&self, ui: &mut dyn Ui) {
        tracing::warn!(
            kind = %self.meta.kind,
            module = %self.meta.module_name,
            error = %self.error,
            "invoking stub for a module that failed to load"
        );
        if !self.warned.swap(true, Ordering::Relaxed) {
            ui.alert(
                &format!("{}: Something's Wrong", self.meta.name),
                &format!(
                    "{} '{}' could not be loaded and was skipped.",
                    self.meta.kind.label(),
                    self.meta.module_name
                ),
                Some(&self.trace),
            );
        }
    }
}

pub struct LoadedModule<T: ?Sized> {
    meta: Arc<ModuleMeta>,
    instance: Arc<Mutex<Box<T>>>,
}

impl<T: ?Sized> Clone for LoadedModule<T> {
    fn clone(&self) -> Self {
        Self {
            meta: Arc::clone(&self.meta),
            instance: Arc::clone(&self.instance),
        }
    }
}

/// Result of resolving a module name: the cached instance or a stub.
pub enum ModuleHandle<T: ?Sized> {
    Loaded(LoadedModule<T>),
    Stub(Arc<StubModule>),
}

impl<T: ?Sized> Clone for ModuleHandle<T> {
    fn clone(&self) -> Self {
        match self {
            ModuleHandle::Loaded(m) => ModuleHandle::Loaded(m.clone()),
            ModuleHandle::Stub(s) => ModuleHandle::Stub(Arc::clone(s)),
        }
    }
}

impl<T: ?Sized> std::fmt::Debug for ModuleHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModuleHandle::Loaded(m) => write!(f, "Loaded({})", m.meta.module_name),
            ModuleHandle::Stub(s) => write!(f, "Stub({}: {})", s.meta.module_name, s.error),
        }
    }
}

impl<T: ?Sized + Operator> ModuleHandle<T> {
    pub fn meta(&self) -> &ModuleMeta {
        match self {
            ModuleHandle::Loaded(m) => m.meta.as_ref(),
            ModuleHandle::Stub(s) => &s.meta,
        }
    }

    pub fn module_name(&self) -> &str {
        &self.meta().module_name
    }

    pub fn is_stub(&self) -> bool {
        matches!(self, ModuleHandle::Stub(_))
    }

    pub fn stub(&self) -> Option<&StubModule> {
        match self {
            ModuleHandle::Stub(s) => Some(s.as_ref()),
            ModuleHandle::Loaded(_) => None,
        }
    }

    /// Whether both handles point at the same module instance.
    pub fn same_instance(&self, other: &ModuleHandle<T>) -> bool {
        match (self, other) {
            (ModuleHandle::Loaded(a), ModuleHandle::Loaded(b)) => {
                Arc::ptr_eq(&a.instance, &b.instance)
            }
            (ModuleHandle::Stub(a), ModuleHandle::Stub(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// `{**default_args, **explicit}`.
    pub fn effective_args(&self, explicit: &ArgMap) -> Args {
        Args::new(merge_args(&self.meta().default_args, explicit))
    }

    pub fn description(&self, explicit: &ArgMap) -> String {
        match self {
            ModuleHandle::Loaded(m) => {
                let args = self.effective_args(explicit);
                m.instance.lock().description(&m.meta, &args)
            }
            ModuleHandle::Stub(s) => s.meta.description.clone(),
        }
    }

    pub fn show_additional_settings(
        &self,
        ui: &mut dyn Ui,
        doc: &dyn Document,
        current: &ArgMap,
    ) -> Option<ArgMap> {
        match self {
            ModuleHandle::Loaded(m) => {
                m.instance
                    .lock()
                    .show_additional_settings(ui, doc, &m.meta, current)
            }
            ModuleHandle::Stub(_) => None,
        }
    }

    /// Apply the module's section decorator, then its item decorator.
    pub fn decorate(&self, section: &mut ReportSection) {
        let ModuleHandle::Loaded(m) = self else {
            return;
        };
        let instance = m.instance.lock();
        if let Some(decorate) = instance.section_decorator() {
            tracing::debug!(module = %m.meta.module_name, "applying section decorator");
            decorate(section);
        }
        if let Some(decorate) = instance.item_decorator() {
            tracing::debug!(module = %m.meta.module_name, "applying item decorator");
            section.decorate_items(|item| decorate(item));
        }
    }
}

impl ModuleHandle<dyn ScopeSelector> {
    pub fn select(
        &self,
        ctx: &mut RunContext<'_>,
        explicit: &ArgMap,
    ) -> anyhow::Result<Vec<Element>> {
        match self {
            ModuleHandle::Loaded(m) => {
                let args = self.effective_args(explicit);
                tracing::debug!(module = %m.meta.module_name, args = ?args.as_map(), "selecting scope");
                let mut instance = m.instance.lock();
                instance.select(ctx, &args)
            }
            ModuleHandle::Stub(s) => {
                s.warn_once(&mut *ctx.ui);
                Ok(Vec::new())
            }
        }
    }
}

impl ModuleHandle<dyn Collector> {
    pub fn collect(
        &self,
        ctx: &mut RunContext<'_>,
        scope: &[Element],
        explicit: &ArgMap,
    ) -> anyhow::Result<Vec<Element>> {
        match self {
            ModuleHandle::Loaded(m) => {
                let args = self.effective_args(explicit);
                tracing::debug!(module = %m.meta.module_name, scope = scope.len(), args = ?args.as_map(), "collecting");
                let mut instance = m.instance.lock();
                instance.collect(ctx, scope, &args)
            }
            ModuleHandle::Stub(s) => {
                s.warn_once(&mut *ctx.ui);
                Ok(Vec::new())
            }
        }
    }
}

impl ModuleHandle<dyn Analyzer> {
    pub fn analyze(
        &self,
        ctx: &mut RunContext<'_>,
        data: &[Element],
        explicit: &ArgMap,
    ) -> anyhow::Result<ReportSection> {
        match self {
            ModuleHandle::Loaded(m) => {
                let args = self.effective_args(explicit);
                tracing::debug!(module = %m.meta.module_name, elements = data.len(), args = ?args.as_map(), "analyzing");
                let mut instance = m.instance.lock();
                instance.analyze(ctx, data, &args)
            }
            ModuleHandle::Stub(s) => {
                s.warn_once(&mut *ctx.ui);
                Ok(ReportSection::info(s.meta.name.clone())
                    .with_description(s.meta.description.clone()))
            }
        }
    }
}

struct Registration<T: ?Sized> {
    describe: Describe,
    factory: Factory<T>,
}

struct Table<T: ?Sized> {
    kind: ModuleKind,
    registrations: BTreeMap<String, Registration<T>>,
    cache: Mutex<BTreeMap<String, LoadedModule<T>>>,
}

impl<T: ?Sized + Operator> Table<T> {
    fn new(kind: ModuleKind) -> Self {
        Self {
            kind,
            registrations: BTreeMap::new(),
            cache: Mutex::new(BTreeMap::new()),
        }
    }

    fn register(
        &mut self,
        name: &str,
        describe: Describe,
        factory: Factory<T>,
    ) -> Result<(), RegistryError> {
        if self.registrations.contains_key(name) {
            return Err(RegistryError::Duplicate {
                kind: self.kind,
                name: name.to_string(),
            });
        }
        self.registrations
            .insert(name.to_string(), Registration { describe, factory });
        Ok(())
    }

    fn try_load(&self, name: &str, catalog: &HostCatalog) -> Result<LoadedModule<T>, RegistryError> {
        if let Some(hit) = self.cache.lock().get(name) {
            return Ok(hit.clone());
        }
        let registration =
            self.registrations
                .get(name)
                .ok_or_else(|| RegistryError::NotRegistered {
                    kind: self.kind,
                    name: name.to_string(),
                })?;
        let instance = (registration.factory)().map_err(|source| RegistryError::Factory {
            kind: self.kind,
            name: name.to_string(),
            source,
        })?;
        let spec = (registration.describe)(catalog);
        let meta = ModuleMeta::resolve(self.kind, name, spec, instance.author())?;
        let loaded = LoadedModule {
            meta: Arc::new(meta),
            instance: Arc::new(Mutex::new(instance)),
        };
        tracing::debug!(kind = %self.kind, module = name, "module loaded");
        Ok(self
            .cache
            .lock()
            .entry(name.to_string())
            .or_insert(loaded)
            .clone())
    }

    fn handle(&self, name: &str, catalog: &HostCatalog) -> ModuleHandle<T> {
        match self.try_load(name, catalog) {
            Ok(m) => ModuleHandle::Loaded(m),
            Err(err) => {
                tracing::error!(
                    kind = %self.kind,
                    module = name,
                    error = %error_chain(&err),
                    "failed to load module, substituting a stub"
                );
                ModuleHandle::Stub(Arc::new(StubModule::new(self.kind, name, &err)))
            }
        }
    }

    fn list(&self, catalog: &HostCatalog, include_hidden: bool) -> Vec<Arc<ModuleMeta>> {
        let mut out = Vec::new();
        for name in self.registrations.keys() {
            match self.try_load(name, catalog) {
                Ok(m) if include_hidden || !m.meta.hidden => out.push(m.meta),
                Ok(_) => {}
                Err(err) => tracing::warn!(
                    kind = %self.kind,
                    module = %name,
                    error = %error_chain(&err),
                    "skipping module that failed to load"
                ),
            }
        }
        out
    }
}

pub struct ModuleRegistry {
    catalog: HostCatalog,
    scope_selectors: Table<dyn ScopeSelector>,
    collectors: Table<dyn Collector>,
    analyzers: Table<dyn Analyzer>,
}

impl ModuleRegistry {
    /// Empty registry.
    pub fn new(catalog: HostCatalog) -> Self {
        Self {
            catalog,
            scope_selectors: Table::new(ModuleKind::ScopeSelector),
            collectors: Table::new(ModuleKind::Collector),
            analyzers: Table::new(ModuleKind::Analyzer),
        }
    }

    /// Registry holding every built-in module.
    pub fn with_builtin_modules(catalog: HostCatalog) -> Result<Self, RegistryError> {
        let mut registry = Self::new(catalog);
        crate::modules::register_builtin(&mut registry)?;
        Ok(registry)
    }

    pub fn catalog(&self) -> &HostCatalog {
        &self.catalog
    }

    pub fn register_scope_selector<F>(
        &mut self,
        name: &str,
        describe: Describe,
        factory: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn() -> anyhow::Result<Box<dyn ScopeSelector>> + Send + Sync + 'static,
    {
        self.scope_selectors
            .register(name, describe, Box::new(factory))
    }

    pub fn register_collector<F>(
        &mut self,
        name: &str,
        describe: Describe,
        factory: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn() -> anyhow::Result<Box<dyn Collector>> + Send + Sync + 'static,
    {
        self.collectors.register(name, describe, Box::new(factory))
    }

    pub fn register_analyzer<F>(
        &mut self,
        name: &str,
        describe: Describe,
        factory: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn() -> anyhow::Result<Box<dyn Analyzer>> + Send + Sync + 'static,
    {
        self.analyzers.register(name, describe, Box::new(factory))
    }

    pub fn load_scope_selector(&self, name: &str) -> ModuleHandle<dyn ScopeSelector> {
        self.scope_selectors.handle(name, &self.catalog)
    }

    pub fn load_collector(&self, name: &str) -> ModuleHandle<dyn Collector> {
        self.collectors.handle(name, &self.catalog)
    }

    pub fn load_analyzer(&self, name: &str) -> ModuleHandle<dyn Analyzer> {
        self.analyzers.handle(name, &self.catalog)
    }

    /// Metadata of a loadable module; the load error otherwise.
    pub fn describe(&self, kind: ModuleKind, name: &str) -> Result<Arc<ModuleMeta>, RegistryError> {
        match kind {
            ModuleKind::ScopeSelector => self
                .scope_selectors
                .try_load(name, &self.catalog)
                .map(|m| m.meta),
            ModuleKind::Collector => self.collectors.try_load(name, &self.catalog).map(|m| m.meta),
            ModuleKind::Analyzer => self.analyzers.try_load(name, &self.catalog).map(|m| m.meta),
        }
    }

    /// Loadable modules of `kind`, sorted by module name. Hidden modules are
    /// left out unless `include_hidden` is set; broken ones are skipped.
    pub fn list_available(&self, kind: ModuleKind, include_hidden: bool) -> Vec<Arc<ModuleMeta>> {
        match kind {
            ModuleKind::ScopeSelector => self.scope_selectors.list(&self.catalog, include_hidden),
            ModuleKind::Collector => self.collectors.list(&self.catalog, include_hidden),
            ModuleKind::Analyzer => self.analyzers.list(&self.catalog, include_hidden),
        }
    }

    /// Registered module names of `kind`, loadable or not.
    pub fn registered_names(&self, kind: ModuleKind) -> Vec<String> {
        match kind {
            ModuleKind::ScopeSelector => self.scope_selectors.registrations.keys().cloned().collect(),
            ModuleKind::Collector => self.collectors.registrations.keys().cloned().collect(),
            ModuleKind::Analyzer => self.analyzers.registrations.keys().cloned().collect(),
        }
    }

    /// Drop cached instances; the next load creates fresh ones.
    pub fn clear_cache(&self) {
        self.scope_selectors.cache.lock().clear();
        self.collectors.cache.lock().clear();
        self.analyzers.cache.lock().clear();
    }
}
