use crate::level_prefix;
use crate::selection::section_selection;
use bimqa_types::{ReportItem, ReportSection};

/// Render a report as Markdown.
///
/// The report title is level `1`; its sections are numbered `1.1`, `1.2`,
/// and nested sections extend their parent's prefix.
pub fn render_markdown(title: &str, description: &str, sections: &[ReportSection]) -> String {
    let mut out = String::new();

    out.push_str(&format!("# 1 {title}\n\n"));
    if !description.is_empty() {
        out.push_str(&format!("{description}\n\n"));
    }

    if sections.is_empty() {
        out.push_str("No report sections.\n");
        return out;
    }

    for (i, section) in sections.iter().enumerate() {
        render_section(&mut out, section, &[1, i + 1]);
    }
    out
}

fn render_section(out: &mut String, section: &ReportSection, levels: &[usize]) {
    out.push_str(&format!(
        "{} {} {}",
        "#".repeat(levels.len()),
        level_prefix(levels),
        section.name
    ));
    if let Some(action) = section_selection(section) {
        out.push_str(&format!(
            " [{}: {}]",
            action.label(),
            action.element_ids.join(", ")
        ));
    }
    out.push_str("\n\n");

    if !section.description.is_empty() {
        out.push_str(&format!("{}\n\n", section.description));
    }

    if section.is_test() {
        out.push_str(&format!(
            "**Passed: {:.2}%** ({}/{})\n\n",
            section.passed_ratio() * 100.0,
            section.passed_count(),
            section.total_count()
        ));
    } else if !section.items.is_empty() {
        out.push_str(&format!("**Count:** {}\n\n", section.total_count()));
    }

    if section.print_details && !section.items.is_empty() {
        out.push_str("**Details:**\n\n");
        if section.items.len() > section.max_printed_items {
            out.push_str(&format!(
                "*Too many items to show. Showing first {} items.*\n\n",
                section.max_printed_items
            ));
        }
        out.push_str("| Result | Name | Element ID | Description |\n");
        out.push_str("| --- | --- | --- | --- |\n");
        for item in section.items.iter().take(section.max_printed_items) {
            out.push_str(&item_row(item));
        }
        out.push('\n');
    }

    let mut child_levels = levels.to_vec();
    child_levels.push(0);
    for child in &section.children {
        if let Some(last) = child_levels.last_mut() {
            *last += 1;
        }
        render_section(out, child, &child_levels);
    }
}

fn item_row(item: &ReportItem) -> String {
    let result = match item.passed {
        Some(true) => "passed",
        Some(false) => "**FAILED**",
        None => " ",
    };
    format!(
        "| {} | {} | {} | {} |\n",
        result,
        cell(&item.name),
        cell(&item.element_ids.join(", ")),
        cell(&item.description)
    )
}

/// Keep a value inside its table cell.
fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', "<br>")
}
