//! The `run` use case: run an operation set against a model snapshot.

use anyhow::Context;
use bimqa_domain::{HostCatalog, MemoryDocument, ModuleRegistry, OperationSet, RunContext, TracingUi};
use bimqa_settings::ResolvedSettings;
use bimqa_types::report::DEFAULT_MAX_PRINTED_ITEMS;
use bimqa_types::{QaReport, ReportSection, ReportSummary, SCHEMA_REPORT_V1, ToolMeta};
use time::OffsetDateTime;

/// Input for the run use case.
#[derive(Clone, Debug)]
pub struct RunInput<'a> {
    /// Model snapshot JSON.
    pub model_json: &'a str,
    /// Operation-set document (`.opset` contents).
    pub set_json: &'a str,
    pub settings: &'a ResolvedSettings,
}

/// Output from the run use case.
#[derive(Clone, Debug)]
pub struct RunOutput {
    pub report: QaReport,
    /// Modules that could not be loaded and ran as neutral stand-ins.
    pub stubbed_modules: Vec<String>,
}

/// Parse the model and the set, run every operation and wrap the sections in
/// a report envelope.
pub fn run_operation_set(input: RunInput<'_>) -> anyhow::Result<RunOutput> {
    let started_at = OffsetDateTime::now_utc();

    let mut doc = MemoryDocument::from_json(input.model_json).context("parse model snapshot")?;
    let registry = ModuleRegistry::with_builtin_modules(HostCatalog::from_document(&doc))
        .context("register built-in modules")?;
    let mut set =
        OperationSet::from_json(input.set_json, &registry).context("parse operation set")?;

    let stubbed_modules = stubbed_modules(&set);
    for module in &stubbed_modules {
        tracing::warn!(module = %module, "module unavailable, running a neutral stand-in");
    }

    let mut ui = TracingUi;
    let mut sections = {
        let mut ctx = RunContext::new(&mut doc, &mut ui, &registry);
        set.run(&mut ctx).map_err(|err| {
            let context = format!(
                "operation set '{}' aborted in module '{}' (author: {})",
                set.name, err.source.module_name, err.source.author
            );
            anyhow::Error::new(err).context(context)
        })?
    };

    if let Some(max) = input.settings.max_printed_items {
        for section in &mut sections {
            cap_printed_items(section, max);
        }
    }

    let finished_at = OffsetDateTime::now_utc();
    let summary = ReportSummary::from_sections(&sections);
    tracing::info!(
        set = %set.name,
        operations = summary.operations,
        failed_items = summary.failed_items,
        "operation set finished"
    );

    Ok(RunOutput {
        report: QaReport {
            schema: SCHEMA_REPORT_V1.to_string(),
            tool: ToolMeta {
                name: "bimqa".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            started_at,
            finished_at,
            model: Some(doc.snapshot().title.clone()),
            name: set.name.clone(),
            description: set.description.clone(),
            summary,
            sections,
        },
        stubbed_modules,
    })
}

fn stubbed_modules(set: &OperationSet) -> Vec<String> {
    let mut out = Vec::new();
    for op in set.operations() {
        let handles = [
            (op.scope_selector().is_stub(), op.scope_selector().module_name()),
            (op.collector().is_stub(), op.collector().module_name()),
            (op.analyzer().is_stub(), op.analyzer().module_name()),
        ];
        for (is_stub, name) in handles {
            if is_stub && !out.iter().any(|n| n == name) {
                out.push(name.to_string());
            }
        }
    }
    out
}

/// Apply the configured cap to sections that kept the built-in default.
fn cap_printed_items(section: &mut ReportSection, max: usize) {
    if section.max_printed_items == DEFAULT_MAX_PRINTED_ITEMS {
        section.max_printed_items = max;
    }
    for child in &mut section.children {
        cap_printed_items(child, max);
    }
}

/// Map the report to an exit code: 2 when strict and any TEST section failed.
pub fn verdict_exit_code(report: &QaReport, strict: bool) -> i32 {
    if strict && report.has_failures() { 2 } else { 0 }
}
