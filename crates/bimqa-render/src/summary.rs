use bimqa_types::ReportSection;

/// One terminal line per top-level section.
pub fn render_summary(sections: &[ReportSection]) -> Vec<String> {
    sections
        .iter()
        .enumerate()
        .map(|(i, s)| {
            if s.is_test() {
                let status = if s.has_failures() { "FAIL" } else { "PASS" };
                format!(
                    "[{status}] {}. {}: {}/{} passed ({:.2}%)",
                    i + 1,
                    s.name,
                    s.passed_count(),
                    s.total_count(),
                    s.passed_ratio() * 100.0
                )
            } else if s.has_failures() {
                format!(
                    "[FAIL] {}. {}: {} item(s), failures in sub-reports",
                    i + 1,
                    s.name,
                    s.all_items().len()
                )
            } else {
                format!("[INFO] {}. {}: {} item(s)", i + 1, s.name, s.total_count())
            }
        })
        .collect()
}
