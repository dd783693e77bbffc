//! Use case orchestration for bimqa.
//!
//! This crate provides the application layer: use cases that coordinate the
//! engine, the settings and the renderers. It is intentionally thin and
//! delegates heavy lifting to the appropriate layers.
//!
//! The CLI crate depends on this; it only handles argument parsing and
//! terminal output.

#![forbid(unsafe_code)]

mod modules;
mod report;
mod run;
mod store;
mod transfer;

pub use modules::{catalog_registry, describe_module, format_module_list, list_modules};
pub use report::{parse_report_json, render_report_markdown, serialize_report};
pub use run::{RunInput, RunOutput, run_operation_set, verdict_exit_code};
pub use store::{BUILTIN_SETS, OperationSetStore, StoredSet};
pub use transfer::{TransferInput, TransferOutput, transfer_parameters};

pub use bimqa_domain::{ParamPair, TransferRequest};
