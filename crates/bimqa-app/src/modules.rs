//! Module catalogue use cases: list and describe registered modules.

use anyhow::Context;
use bimqa_domain::{HostCatalog, MemoryDocument, ModuleRegistry};
use bimqa_types::{ModuleKind, ModuleMeta};
use std::sync::Arc;

/// Registry of the built-in modules. Argument option lists (categories,
/// view names) come from the model when one is given.
pub fn catalog_registry(model_json: Option<&str>) -> anyhow::Result<ModuleRegistry> {
    let catalog = match model_json {
        Some(text) => {
            let doc = MemoryDocument::from_json(text).context("parse model snapshot")?;
            HostCatalog::from_document(&doc)
        }
        None => HostCatalog::default(),
    };
    ModuleRegistry::with_builtin_modules(catalog).context("register built-in modules")
}

/// Loadable modules, grouped by kind in pipeline order.
pub fn list_modules(
    registry: &ModuleRegistry,
    kind: Option<ModuleKind>,
    include_hidden: bool,
) -> Vec<Arc<ModuleMeta>> {
    ModuleKind::ALL
        .into_iter()
        .filter(|k| kind.is_none_or(|wanted| wanted == *k))
        .flat_map(|k| registry.list_available(k, include_hidden))
        .collect()
}

/// Format a module list for terminal display.
pub fn format_module_list(modules: &[Arc<ModuleMeta>]) -> String {
    let mut out = String::new();
    let mut current: Option<ModuleKind> = None;

    for meta in modules {
        if current != Some(meta.kind) {
            if current.is_some() {
                out.push('\n');
            }
            out.push_str(&format!("{}s:\n", meta.kind.label()));
            current = Some(meta.kind);
        }
        out.push_str(&format!(
            "  * {} - {} by {}",
            meta.module_name, meta.name, meta.author
        ));
        if meta.hidden {
            out.push_str(" (hidden)");
        }
        out.push('\n');
    }

    if out.is_empty() {
        out.push_str("No modules available.\n");
    }
    out
}

/// Describe one module: metadata, argument types and defaults.
pub fn describe_module(
    registry: &ModuleRegistry,
    kind: ModuleKind,
    module_name: &str,
) -> anyhow::Result<String> {
    let meta = registry
        .describe(kind, module_name)
        .with_context(|| format!("describe {kind} '{module_name}'"))?;

    let mut out = String::new();
    out.push_str(&meta.name);
    out.push('\n');
    out.push_str(&"=".repeat(meta.name.chars().count()));
    out.push_str("\n\n");
    out.push_str(&format!("kind:        {}\n", meta.kind));
    out.push_str(&format!("module name: {}\n", meta.module_name));
    out.push_str(&format!("author:      {}\n", meta.author));
    if !meta.returns.is_empty() {
        out.push_str(&format!("returns:     {}\n", meta.returns));
    }
    if meta.hidden {
        out.push_str("hidden:      yes\n");
    }
    if !meta.description.is_empty() {
        out.push('\n');
        out.push_str(&meta.description);
        out.push('\n');
    }

    out.push_str("\nArguments\n---------\n");
    if meta.arg_types.is_empty() {
        out.push_str("(none)\n");
    }
    for (key, ty) in &meta.arg_types {
        match meta.default_args.get(key) {
            Some(default) => out.push_str(&format!("  {key}: {ty} = {default}\n")),
            None => out.push_str(&format!("  {key}: {ty}\n")),
        }
    }

    Ok(out)
}
