//! The `transfer` use case: copy space parameters onto the family instances
//! inside each space and return the updated model snapshot.

use anyhow::Context;
use bimqa_domain::{MemoryDocument, TransferRequest, apply_transfer, plan_transfer};

#[derive(Clone, Debug)]
pub struct TransferInput<'a> {
    /// Model snapshot JSON.
    pub model_json: &'a str,
    pub request: &'a TransferRequest,
}

#[derive(Clone, Debug)]
pub struct TransferOutput {
    /// Updated model snapshot JSON.
    pub model_json: String,
    pub spaces: usize,
    pub matched: usize,
    pub written: usize,
}

pub fn transfer_parameters(input: TransferInput<'_>) -> anyhow::Result<TransferOutput> {
    let mut doc = MemoryDocument::from_json(input.model_json).context("parse model snapshot")?;
    let plan = plan_transfer(&doc, input.request)
        .with_context(|| format!("plan parameter transfer for family '{}'", input.request.family))?;
    apply_transfer(&mut doc, &plan).context("apply parameter transfer")?;

    let mut model_json =
        serde_json::to_string_pretty(&doc.into_snapshot()).context("serialize model snapshot")?;
    model_json.push('\n');
    Ok(TransferOutput {
        model_json,
        spaces: plan.spaces,
        matched: plan.matched,
        written: plan.writes.len(),
    })
}
