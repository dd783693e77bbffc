use super::{max_printed, report_kind, report_types};
use crate::model::Element;
use crate::modules::has_tag;
use crate::operator::{Analyzer, Operator, RunContext};
use crate::registry::HostCatalog;
use bimqa_types::{ArgType, Args, ModuleSpec, ReportItem, ReportSection, ids};

pub(super) fn spec(_: &HostCatalog) -> ModuleSpec {
    ModuleSpec::new()
        .name("Check if elements are tagged")
        .description("Check if elements are tagged")
        .author("Arthur Emig")
        .returns("One item per element, failed when untagged")
        .arg(
            ids::ARG_COUNT_REPORT_TYPE,
            ArgType::Choice(report_types()),
            "TEST",
        )
        .arg(ids::ARG_PRINT_DETAILS, ArgType::Bool, true)
        .arg(ids::ARG_MAX_PRINTED_ITEMS, ArgType::Int, 1000i64)
        .arg(ids::ARG_ACTIVE_VIEW_ONLY, ArgType::Bool, true)
}

pub(super) struct IsTagged;

impl Operator for IsTagged {}

impl Analyzer for IsTagged {
    fn analyze(
        &mut self,
        ctx: &mut RunContext<'_>,
        data: &[Element],
        args: &Args,
    ) -> anyhow::Result<ReportSection> {
        let view = if args.bool(ids::ARG_ACTIVE_VIEW_ONLY)? {
            match ctx.doc.active_view() {
                Some(v) => Some(v.id),
                None => anyhow::bail!("there is no active view"),
            }
        } else {
            None
        };

        let mut section = ReportSection::new("Check if elements are tagged", report_kind(args)?)
            .with_description(format!(
                "Check if elements are tagged through {} elements",
                data.len()
            ))
            .with_print_details(args.bool(ids::ARG_PRINT_DETAILS)?)
            .with_max_printed_items(max_printed(args)?);

        for element in data {
            let tagged = has_tag(&*ctx.doc, element.id, view);
            section.add_item(
                ReportItem::new(element.display_name())
                    .with_description(format!("{} - {}", element.category_name(), element.id))
                    .with_element(element.id)
                    .with_passed(tagged),
            );
        }
        Ok(section)
    }
}
