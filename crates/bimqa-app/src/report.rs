//! Report envelope IO helpers.

use anyhow::Context;
use bimqa_types::{QaReport, SCHEMA_REPORT_V1};

pub fn parse_report_json(text: &str) -> anyhow::Result<QaReport> {
    let value: serde_json::Value = serde_json::from_str(text).context("parse report json")?;

    let schema = value
        .get("schema")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    if schema != SCHEMA_REPORT_V1 {
        anyhow::bail!("unknown report schema: {schema} (expected {SCHEMA_REPORT_V1})");
    }

    serde_json::from_value(value).context("parse bimqa report")
}

pub fn serialize_report(report: &QaReport) -> anyhow::Result<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(report).context("serialize report")?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Markdown for a whole report: the set name is the title.
pub fn render_report_markdown(report: &QaReport) -> String {
    bimqa_render::render_markdown(&report.name, &report.description, &report.sections)
}
