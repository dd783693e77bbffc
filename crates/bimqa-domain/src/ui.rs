//! User-interaction collaborator.
//!
//! Modules never talk to a terminal or a dialog directly; they go through
//! [`Ui`]. Headless runs use [`TracingUi`], tests use [`RecordingUi`].

use bimqa_types::{ArgMap, ArgType};
use std::collections::BTreeMap;

pub trait Ui {
    /// Show a message. `details` holds diagnostics shown on expansion.
    fn alert(&mut self, title: &str, message: &str, details: Option<&str>);

    fn update_progress(&mut self, _done: usize, _total: usize) {}

    fn is_cancelled(&self) -> bool {
        false
    }

    /// Let the user pick from `options`. `None` means cancelled.
    fn select_from_list(
        &mut self,
        _title: &str,
        _options: &[String],
        _checked: &[String],
    ) -> Option<Vec<String>> {
        None
    }

    /// Let the user edit argument values. `None` means cancelled.
    fn edit_arguments(
        &mut self,
        _title: &str,
        _arg_types: &BTreeMap<String, ArgType>,
        _current: &ArgMap,
    ) -> Option<ArgMap> {
        None
    }
}

/// Non-interactive UI: alerts and progress go to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingUi;

impl Ui for TracingUi {
    fn alert(&mut self, title: &str, message: &str, details: Option<&str>) {
        tracing::warn!(title, "{message}");
        if let Some(details) = details {
            tracing::debug!(title, "{details}");
        }
    }

    fn update_progress(&mut self, done: usize, total: usize) {
        tracing::debug!(done, total, "progress");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedAlert {
    pub title: String,
    pub message: String,
    pub details: Option<String>,
}

/// Scriptable UI that records every interaction.
#[derive(Debug, Default, Clone)]
pub struct RecordingUi {
    pub alerts: Vec<RecordedAlert>,
    pub progress: Vec<(usize, usize)>,
    /// Report cancellation once this many progress updates have been seen.
    pub cancel_after: Option<usize>,
    pub list_answer: Option<Vec<String>>,
    pub args_answer: Option<ArgMap>,
}

impl RecordingUi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancelling_after(updates: usize) -> Self {
        Self {
            cancel_after: Some(updates),
            ..Self::default()
        }
    }
}

impl Ui for RecordingUi {
    fn alert(&mut self, title: &str, message: &str, details: Option<&str>) {
        self.alerts.push(RecordedAlert {
            title: title.to_string(),
            message: message.to_string(),
            details: details.map(str::to_string),
        });
    }

    fn update_progress(&mut self, done: usize, total: usize) {
        self.progress.push((done, total));
    }

    fn is_cancelled(&self) -> bool {
        self.cancel_after
            .is_some_and(|n| self.progress.len() >= n)
    }

    fn select_from_list(
        &mut self,
        _title: &str,
        _options: &[String],
        _checked: &[String],
    ) -> Option<Vec<String>> {
        self.list_answer.clone()
    }

    fn edit_arguments(
        &mut self,
        _title: &str,
        _arg_types: &BTreeMap<String, ArgType>,
        _current: &ArgMap,
    ) -> Option<ArgMap> {
        self.args_answer.clone()
    }
}
