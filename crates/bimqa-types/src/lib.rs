//! Stable DTOs and IDs used across the bimqa workspace.
//!
//! This crate is intentionally boring:
//! - the report tree produced by analyzers
//! - module metadata and the argument model
//! - operation / operation-set documents (`.opset` files)
//! - the JSON report envelope written by the CLI
//! - stable module names

#![forbid(unsafe_code)]

pub mod args;
pub mod config;
pub mod ids;
pub mod module;
pub mod receipt;
pub mod report;

pub use args::{ArgError, ArgMap, ArgType, ArgValue, Args, merge_args};
pub use config::{
    CONFIG_EXTENSION, ConfigError, ConfigType, ModuleRefDoc, OperationDoc, OperationSetDoc,
    has_config_extension, peek_config_type,
};
pub use module::{MetaError, ModuleKind, ModuleMeta, ModuleSpec};
pub use receipt::{QaReport, ReportSummary, SCHEMA_REPORT_V1, ToolMeta};
pub use report::{ReportItem, ReportSection, SectionKind};
