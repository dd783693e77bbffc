use super::{max_printed, report_kind, report_types};
use crate::model::Element;
use crate::operator::{Analyzer, Operator, RunContext};
use crate::registry::HostCatalog;
use bimqa_types::{ArgType, Args, ModuleSpec, ReportItem, ReportSection, ids};

pub(super) fn spec(_: &HostCatalog) -> ModuleSpec {
    ModuleSpec::new()
        .name("Count elements")
        .description(
            "Count elements from the collector and list them in a table if Print Details is True.",
        )
        .returns("One item per collected element")
        .arg(
            ids::ARG_COUNT_REPORT_TYPE,
            ArgType::Choice(report_types()),
            "INFO",
        )
        .arg(ids::ARG_PRINT_DETAILS, ArgType::Bool, true)
        .arg(ids::ARG_MAX_PRINTED_ITEMS, ArgType::Int, 20i64)
}

/// Lists every collected element. The report type only changes the section
/// kind; items carry no verdict.
pub(super) struct CountElements;

impl Operator for CountElements {}

impl Analyzer for CountElements {
    fn analyze(
        &mut self,
        _ctx: &mut RunContext<'_>,
        data: &[Element],
        args: &Args,
    ) -> anyhow::Result<ReportSection> {
        let kind = report_kind(args)?;
        let mut section = ReportSection::new("Count elements", kind)
            .with_description(format!("Count {} elements", data.len()))
            .with_print_details(args.bool(ids::ARG_PRINT_DETAILS)?)
            .with_max_printed_items(max_printed(args)?);

        for element in data {
            section.add_item(
                ReportItem::new(element.display_name())
                    .with_description(format!("{} - {}", element.category_name(), element.id))
                    .with_element(element.id),
            );
        }
        Ok(section)
    }
}
