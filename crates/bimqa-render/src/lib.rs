//! Rendering of report-section trees (Markdown, terminal summary).
//!
//! Every renderer is a pure function of the tree.

#![forbid(unsafe_code)]

mod markdown;
mod selection;
mod summary;

pub use markdown::render_markdown;
pub use selection::{SelectionAction, section_selection};
pub use summary::render_summary;

/// `[1, 2, 3]` -> `"1.2.3"`.
pub(crate) fn level_prefix(levels: &[usize]) -> String {
    levels
        .iter()
        .map(usize::to_string)
        .collect::<Vec<_>>()
        .join(".")
}
