//! Space-to-instance parameter transfer.
//!
//! Every instance of one family whose location point lies inside a space
//! receives up to four of the space's parameter values. With `divide` set, a
//! value shared by several instances in the same space is split between
//! them: `"100 W"` over four instances becomes `"25 W"`.
//!
//! Planning only reads the model; [`apply_transfer`] commits the writes.

use crate::document::{Document, DocumentError};
use crate::model::{Element, ElementId};
use crate::snapshot::MemoryDocument;
use std::fmt;
use std::str::FromStr;

pub const SPACES_CATEGORY: &str = "Spaces";
pub const MAX_PAIRS: usize = 4;

/// Space parameter copied onto an instance parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParamPair {
    pub source: String,
    pub target: String,
}

impl ParamPair {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// `"Space parameter=Instance parameter"`.
impl FromStr for ParamPair {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (source, target) = s
            .split_once('=')
            .ok_or_else(|| format!("expected SOURCE=TARGET, got '{s}'"))?;
        let (source, target) = (source.trim(), target.trim());
        if source.is_empty() || target.is_empty() {
            return Err(format!("empty parameter name in '{s}'"));
        }
        Ok(Self::new(source, target))
    }
}

impl fmt::Display for ParamPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.source, self.target)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TransferRequest {
    /// Family whose instances receive the values.
    pub family: String,
    pub pairs: Vec<ParamPair>,
    /// Split numeric values between the instances sharing a space.
    pub divide: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransferError {
    #[error("no parameter pairs given")]
    NoPairs,
    #[error("at most {MAX_PAIRS} parameter pairs are supported, got {0}")]
    TooManyPairs(usize),
    #[error("family '{0}' not found")]
    UnknownFamily(String),
    #[error("no spaces in scope")]
    NoSpaces,
    #[error(transparent)]
    Document(#[from] DocumentError),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParameterWrite {
    pub element: ElementId,
    pub name: String,
    pub value: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransferPlan {
    pub spaces: usize,
    /// Instance-in-space matches; an instance inside two spaces counts twice.
    pub matched: usize,
    pub writes: Vec<ParameterWrite>,
}

/// Work out every parameter write without touching the model.
///
/// Scope is the active view when the model has one, else the whole model.
/// Pairs whose source is missing on the space, or whose target is missing on
/// the instance, are skipped.
pub fn plan_transfer(
    doc: &dyn Document,
    request: &TransferRequest,
) -> Result<TransferPlan, TransferError> {
    match request.pairs.len() {
        0 => return Err(TransferError::NoPairs),
        n if n > MAX_PAIRS => return Err(TransferError::TooManyPairs(n)),
        _ => {}
    }
    let family = request.family.as_str();
    if !doc.elements().iter().any(|e| is_instance_of(e, family)) {
        return Err(TransferError::UnknownFamily(request.family.clone()));
    }

    let scope = match doc.active_view() {
        Some(view) => doc.elements_in_view(view.id),
        None => doc.elements(),
    };
    let spaces: Vec<&Element> = scope
        .iter()
        .copied()
        .filter(|e| e.category.as_deref() == Some(SPACES_CATEGORY))
        .collect();
    if spaces.is_empty() {
        return Err(TransferError::NoSpaces);
    }
    let instances: Vec<&Element> = scope
        .iter()
        .copied()
        .filter(|e| is_instance_of(e, family))
        .collect();
    tracing::info!(spaces = spaces.len(), instances = instances.len(), family, "planning parameter transfer");

    let mut plan = TransferPlan {
        spaces: spaces.len(),
        ..TransferPlan::default()
    };
    for space in spaces {
        let Some(bb) = space.bounding_box else {
            tracing::warn!(space = %space.id, "space has no bounding box");
            continue;
        };
        let inside: Vec<&Element> = instances
            .iter()
            .copied()
            .filter(|i| i.location_point().is_some_and(|p| bb.contains(p)))
            .collect();
        tracing::debug!(space = %space.display_name(), instances = inside.len(), "space matched");
        plan.matched += inside.len();

        for instance in &inside {
            for pair in &request.pairs {
                let (Some(value), true) = (
                    space.parameter(&pair.source),
                    instance.parameters.contains_key(&pair.target),
                ) else {
                    continue;
                };
                let value = if request.divide && inside.len() > 1 {
                    split_number(value, inside.len())
                } else {
                    value.to_string()
                };
                plan.writes.push(ParameterWrite {
                    element: instance.id,
                    name: pair.target.clone(),
                    value,
                });
            }
        }
    }
    Ok(plan)
}

/// Commit the planned writes in order.
pub fn apply_transfer(doc: &mut MemoryDocument, plan: &TransferPlan) -> Result<(), TransferError> {
    for write in &plan.writes {
        doc.set_parameter(write.element, &write.name, &write.value)?;
    }
    tracing::info!(writes = plan.writes.len(), matched = plan.matched, "parameter transfer applied");
    Ok(())
}

fn is_instance_of(e: &Element, family: &str) -> bool {
    e.family.as_deref() == Some(family) && e.location_point().is_some()
}

/// Divide the first number in `text` by `count`, keeping the text around it.
///
/// Both `.` and `,` are read as decimal separators and the separator is kept.
/// Text without a number, or a zero count, comes back unchanged.
pub fn split_number(text: &str, count: usize) -> String {
    let Some((start, end)) = first_number(text) else {
        return text.to_string();
    };
    if count == 0 {
        return text.to_string();
    }
    let digits = &text[start..end];
    let comma = digits.contains(',');
    let Ok(number) = digits.replace(',', ".").parse::<f64>() else {
        return text.to_string();
    };
    let quotient = format_quotient(number / count as f64, comma);
    format!("{}{quotient}{}", &text[..start], &text[end..])
}

/// Byte range of the first `\d+([.,]\d+)?` run.
fn first_number(text: &str) -> Option<(usize, usize)> {
    let bytes = text.as_bytes();
    let start = bytes.iter().position(u8::is_ascii_digit)?;
    let digits_from = |from: usize| {
        bytes[from..]
            .iter()
            .position(|b| !b.is_ascii_digit())
            .map_or(bytes.len(), |n| from + n)
    };
    let mut end = digits_from(start);
    if end + 1 < bytes.len()
        && matches!(bytes[end], b'.' | b',')
        && bytes[end + 1].is_ascii_digit()
    {
        end = digits_from(end + 1);
    }
    Some((start, end))
}

/// At most three decimals, trailing zeros dropped.
fn format_quotient(v: f64, comma: bool) -> String {
    let mut s = format!("{v:.3}");
    let trimmed = s.trim_end_matches('0').trim_end_matches('.').len();
    s.truncate(trimmed);
    if comma {
        s = s.replace('.', ",");
    }
    s
}
