//! QA engine (no IO).
//!
//! Input: a host [`Document`] (any BIM model behind the collaborator traits)
//! and operations built from registered modules.
//! Output: one [`ReportSection`](bimqa_types::ReportSection) tree per
//! operation.
//!
//! An operation is a three-stage pipeline: a scope selector picks views, a
//! collector gathers elements from them and an analyzer turns the elements
//! into a report.

#![forbid(unsafe_code)]

pub mod document;
pub mod geometry;
pub mod model;
pub mod modules;
pub mod operation;
pub mod operation_set;
pub mod operator;
pub mod registry;
pub mod snapshot;
pub mod transaction;
pub mod transfer;
pub mod ui;

pub use document::{Document, DocumentError};
pub use operation::{Operation, OperationState, Stage, StageError};
pub use operation_set::{ConfigInstance, OperationSet, OperationSetError};
pub use operator::{Analyzer, Collector, Operator, RunContext, ScopeSelector};
pub use registry::{HostCatalog, ModuleHandle, ModuleRegistry, RegistryError};
pub use snapshot::{MemoryDocument, ModelSnapshot, SnapshotError, parse_snapshot};
pub use transaction::TransactionGroup;
pub use transfer::{
    ParamPair, ParameterWrite, TransferError, TransferPlan, TransferRequest, apply_transfer,
    plan_transfer, split_number,
};
pub use ui::{RecordingUi, TracingUi, Ui};

#[cfg(test)]
mod proptests;
#[cfg(test)]
mod test_support;
