use crate::report::ReportSection;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Stable schema identifier for QA reports.
pub const SCHEMA_REPORT_V1: &str = "bimqa.report.v1";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ToolMeta {
    pub name: String,
    pub version: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ReportSummary {
    pub operations: usize,
    pub test_sections: usize,
    pub failed_sections: usize,
    pub items: usize,
    pub failed_items: usize,
}

impl ReportSummary {
    pub fn from_sections(sections: &[ReportSection]) -> Self {
        let mut summary = Self {
            operations: sections.len(),
            ..Self::default()
        };
        for section in sections {
            summary.add_section(section);
        }
        summary
    }

    fn add_section(&mut self, section: &ReportSection) {
        if section.is_test() {
            self.test_sections += 1;
            if section.passed_count() < section.total_count() {
                self.failed_sections += 1;
            }
        }
        self.items += section.items.len();
        self.failed_items += section.failed_items().count();
        for child in &section.children {
            self.add_section(child);
        }
    }
}

/// The JSON document written by `bimqa run`: one top-level section per
/// operation of the set that produced it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct QaReport {
    pub schema: String,
    pub tool: ToolMeta,
    #[serde(with = "time::serde::rfc3339")]
    #[schemars(with = "String")]
    pub started_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    #[schemars(with = "String")]
    pub finished_at: OffsetDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub summary: ReportSummary,
    pub sections: Vec<ReportSection>,
}

impl QaReport {
    pub fn has_failures(&self) -> bool {
        self.sections.iter().any(ReportSection::has_failures)
    }
}
