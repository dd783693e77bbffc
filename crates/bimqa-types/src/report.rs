//! Report tree produced by analyzers.
//!
//! A [`ReportSection`] is either an INFO section (inventory, no pass/fail
//! semantics) or a TEST section. Sections nest to any depth; counts default to
//! values computed from the section's own items and can be overridden.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_PRINTED_ITEMS: usize = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum SectionKind {
    Info,
    Test,
}

impl SectionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SectionKind::Info => "INFO",
            SectionKind::Test => "TEST",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ReportItem {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub element_ids: Vec<String>,
    /// `None` for inventory items that carry no verdict.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passed: Option<bool>,
}

impl ReportItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_element(mut self, id: impl ToString) -> Self {
        self.element_ids.push(id.to_string());
        self
    }

    pub fn with_elements<I, T>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        self.element_ids
            .extend(ids.into_iter().map(|id| id.to_string()));
        self
    }

    pub fn with_passed(mut self, passed: bool) -> Self {
        self.passed = Some(passed);
        self
    }

    pub fn is_failed(&self) -> bool {
        self.passed == Some(false)
    }

    /// Element ids that can be resolved to model elements (all ASCII digits).
    pub fn numeric_element_ids(&self) -> impl Iterator<Item = &str> {
        self.element_ids
            .iter()
            .map(String::as_str)
            .filter(|id| is_numeric_id(id))
    }
}

pub fn is_numeric_id(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit())
}

fn default_true() -> bool {
    true
}

fn default_max_printed_items() -> usize {
    DEFAULT_MAX_PRINTED_ITEMS
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReportSection {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub kind: SectionKind,
    #[serde(default)]
    pub items: Vec<ReportItem>,
    #[serde(default)]
    pub children: Vec<ReportSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passed_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passed_ratio: Option<f64>,
    #[serde(default = "default_true")]
    pub print_details: bool,
    #[serde(default = "default_max_printed_items")]
    pub max_printed_items: usize,
}

impl ReportSection {
    pub fn new(name: impl Into<String>, kind: SectionKind) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            kind,
            items: Vec::new(),
            children: Vec::new(),
            passed_count: None,
            total_count: None,
            passed_ratio: None,
            print_details: true,
            max_printed_items: DEFAULT_MAX_PRINTED_ITEMS,
        }
    }

    pub fn info(name: impl Into<String>) -> Self {
        Self::new(name, SectionKind::Info)
    }

    pub fn test(name: impl Into<String>) -> Self {
        Self::new(name, SectionKind::Test)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_items(mut self, items: Vec<ReportItem>) -> Self {
        self.items = items;
        self
    }

    pub fn with_max_printed_items(mut self, max: usize) -> Self {
        self.max_printed_items = max;
        self
    }

    pub fn with_print_details(mut self, print_details: bool) -> Self {
        self.print_details = print_details;
        self
    }

    pub fn add_item(&mut self, item: ReportItem) {
        self.items.push(item);
    }

    pub fn add_child(&mut self, child: ReportSection) {
        self.children.push(child);
    }

    pub fn is_test(&self) -> bool {
        self.kind == SectionKind::Test
    }

    pub fn total_count(&self) -> usize {
        self.total_count.unwrap_or(self.items.len())
    }

    pub fn passed_count(&self) -> usize {
        self.passed_count.unwrap_or_else(|| {
            let failed = self.items.iter().filter(|i| i.is_failed()).count();
            self.total_count().saturating_sub(failed)
        })
    }

    pub fn set_total_count(&mut self, total: usize) {
        self.total_count = Some(total);
    }

    pub fn set_passed_count(&mut self, passed: usize) {
        self.passed_count = Some(passed);
    }

    pub fn set_passed_ratio(&mut self, ratio: f64) {
        self.passed_ratio = Some(ratio);
    }

    /// Pass ratio in `[0, 1]`.
    ///
    /// An explicit ratio override wins. Otherwise an empty section reports
    /// `0.0`, and a passed count above the total is clamped to `1.0`.
    pub fn passed_ratio(&self) -> f64 {
        if let Some(ratio) = self.passed_ratio {
            if ratio.is_nan() {
                return 0.0;
            }
            return ratio.clamp(0.0, 1.0);
        }
        let total = self.total_count();
        if total == 0 {
            return 0.0;
        }
        let passed = self.passed_count();
        if passed > total {
            tracing::warn!(
                section = %self.name,
                passed,
                total,
                "passed count is greater than total count"
            );
            return 1.0;
        }
        passed as f64 / total as f64
    }

    pub fn failed_items(&self) -> impl Iterator<Item = &ReportItem> {
        self.items.iter().filter(|i| i.is_failed())
    }

    /// Own items, then every child's `all_items`, depth-first in list order.
    pub fn all_items(&self) -> Vec<&ReportItem> {
        let mut out = Vec::new();
        self.collect_items(&mut out);
        out
    }

    fn collect_items<'a>(&'a self, out: &mut Vec<&'a ReportItem>) {
        out.extend(self.items.iter());
        for child in &self.children {
            child.collect_items(out);
        }
    }

    /// Apply `f` to every item in the tree, depth-first.
    pub fn decorate_items(&mut self, mut f: impl FnMut(&mut ReportItem)) {
        self.decorate_items_dyn(&mut f);
    }

    fn decorate_items_dyn(&mut self, f: &mut dyn FnMut(&mut ReportItem)) {
        for item in &mut self.items {
            f(item);
        }
        for child in &mut self.children {
            child.decorate_items_dyn(f);
        }
    }

    /// Whether this section or any descendant TEST section has failed items.
    pub fn has_failures(&self) -> bool {
        (self.is_test() && self.passed_count() < self.total_count())
            || self.children.iter().any(ReportSection::has_failures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, passed: Option<bool>) -> ReportItem {
        ReportItem {
            name: name.into(),
            passed,
            ..ReportItem::default()
        }
    }

    #[test]
    fn counts_default_from_items() {
        let s = ReportSection::test("t").with_items(vec![
            item("a", Some(true)),
            item("b", Some(false)),
            item("c", None),
        ]);
        assert_eq!(s.total_count(), 3);
        assert_eq!(s.passed_count(), 2);
        assert!((s.passed_ratio() - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn empty_section_has_zero_ratio() {
        assert_eq!(ReportSection::info("empty").passed_ratio(), 0.0);
    }

    #[test]
    fn passed_above_total_clamps_to_one() {
        let mut s = ReportSection::test("t");
        s.set_total_count(2);
        s.set_passed_count(5);
        assert_eq!(s.passed_ratio(), 1.0);
    }

    #[test]
    fn ratio_override_is_clamped() {
        let mut s = ReportSection::test("t");
        s.set_passed_ratio(1.5);
        assert_eq!(s.passed_ratio(), 1.0);
        s.set_passed_ratio(0.25);
        assert_eq!(s.passed_ratio(), 0.25);
    }

    #[test]
    fn all_items_is_depth_first_in_list_order() {
        let mut root = ReportSection::info("root").with_items(vec![item("r", None)]);
        let mut a = ReportSection::info("a").with_items(vec![item("a1", None)]);
        a.add_child(ReportSection::info("a.a").with_items(vec![item("aa1", None)]));
        root.add_child(a);
        root.add_child(ReportSection::info("b").with_items(vec![item("b1", None)]));

        let names: Vec<_> = root.all_items().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["r", "a1", "aa1", "b1"]);
    }

    #[test]
    fn decorate_items_reaches_children() {
        let mut root = ReportSection::info("root").with_items(vec![item("r", None)]);
        root.add_child(ReportSection::info("c").with_items(vec![item("c", None)]));

        root.decorate_items(|i| i.name.push('!'));

        let names: Vec<_> = root.all_items().iter().map(|i| i.name.clone()).collect();
        assert_eq!(names, vec!["r!", "c!"]);
    }

    #[test]
    fn numeric_ids_skip_non_digit_references() {
        let i = ReportItem::new("x").with_elements(["12", "abc", "", "7a", "003"]);
        let ids: Vec<_> = i.numeric_element_ids().collect();
        assert_eq!(ids, vec!["12", "003"]);
    }

    #[test]
    fn failures_bubble_up_from_children() {
        let mut root = ReportSection::info("root");
        root.add_child(ReportSection::test("t").with_items(vec![item("x", Some(false))]));
        assert!(root.has_failures());
        assert!(!ReportSection::test("ok").has_failures());
    }
}
