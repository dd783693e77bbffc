use bimqa_types::{ReportItem, ReportSection};
use std::collections::BTreeSet;

/// "Select all" action offered next to a section heading.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectionAction {
    /// Deduplicated numeric element ids, in first-seen order.
    pub element_ids: Vec<String>,
}

impl SelectionAction {
    pub fn label(&self) -> String {
        format!("Select All Related {} Elements", self.element_ids.len())
    }
}

/// Elements worth selecting for `section`: the failed items of a TEST
/// section, every item of an INFO section, descendants included.
pub fn section_selection(section: &ReportSection) -> Option<SelectionAction> {
    let items: Vec<&ReportItem> = if section.is_test() {
        section
            .all_items()
            .into_iter()
            .filter(|i| i.is_failed())
            .collect()
    } else {
        section.all_items()
    };

    let mut seen = BTreeSet::new();
    let element_ids: Vec<String> = items
        .into_iter()
        .flat_map(|i| i.numeric_element_ids())
        .filter(|id| seen.insert(*id))
        .map(str::to_string)
        .collect();

    (!element_ids.is_empty()).then_some(SelectionAction { element_ids })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_select_only_failed_items() {
        let mut section = ReportSection::test("t").with_items(vec![
            ReportItem::new("ok").with_element("1").with_passed(true),
            ReportItem::new("bad").with_elements(["2", "3"]).with_passed(false),
        ]);
        section.add_child(ReportSection::test("child").with_items(vec![
            ReportItem::new("bad again").with_elements(["3", "4"]).with_passed(false),
        ]));

        let action = section_selection(&section).expect("selection");
        assert_eq!(action.element_ids, vec!["2", "3", "4"]);
        assert_eq!(action.label(), "Select All Related 3 Elements");
    }

    #[test]
    fn info_sections_select_every_numeric_id() {
        let section = ReportSection::info("i").with_items(vec![
            ReportItem::new("a").with_element("10"),
            ReportItem::new("b").with_element("not-an-id"),
        ]);
        assert_eq!(
            section_selection(&section).map(|a| a.element_ids),
            Some(vec!["10".to_string()])
        );
    }

    #[test]
    fn nothing_to_select_yields_none() {
        let section = ReportSection::test("t")
            .with_items(vec![ReportItem::new("ok").with_element("1").with_passed(true)]);
        assert_eq!(section_selection(&section), None);
    }
}
