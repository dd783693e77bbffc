//! Pipe slope classification.
//!
//! A pipe is classified by the angle between its axis and the vertical.
//! Level pipes are horizontal regardless of thresholds.

use crate::model::{CurveFacet, Element};
use crate::modules::view_ids;
use crate::operator::{Collector, Operator, RunContext};
use crate::registry::HostCatalog;
use bimqa_types::{ArgType, Args, ModuleSpec, ids};
use std::collections::BTreeSet;

pub const PIPES_CATEGORY: &str = "Pipes";

pub(super) fn spec(_: &HostCatalog) -> ModuleSpec {
    ModuleSpec::new()
        .name("Sloped pipes")
        .description("Collect pipes that are neither horizontal nor vertical")
        .author("Arthur Emig")
        .returns("Sloped pipes")
        .arg(ids::ARG_VERTICAL_TOLERANCE, ArgType::Float, 1.0)
        .arg(ids::ARG_WEIRD_THRESHOLD, ArgType::Float, 65.0)
        .arg(ids::ARG_SLOPED_THRESHOLD, ArgType::Float, 90.0)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipeSlope {
    Horizontal,
    Vertical,
    /// Steep enough to be suspicious, too shallow to be vertical.
    Weird,
    Sloped,
    /// Beyond the sloped threshold.
    Unclassified,
}

/// Angles in degrees from the vertical.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlopeThresholds {
    pub vertical_tolerance: f64,
    pub weird: f64,
    pub sloped: f64,
}

impl Default for SlopeThresholds {
    fn default() -> Self {
        Self {
            vertical_tolerance: 1.0,
            weird: 65.0,
            sloped: 90.0,
        }
    }
}

impl SlopeThresholds {
    fn from_args(args: &Args) -> anyhow::Result<Self> {
        Ok(Self {
            vertical_tolerance: args.float(ids::ARG_VERTICAL_TOLERANCE)?,
            weird: args.float(ids::ARG_WEIRD_THRESHOLD)?,
            sloped: args.float(ids::ARG_SLOPED_THRESHOLD)?,
        })
    }

    pub fn classify(&self, curve: &CurveFacet) -> PipeSlope {
        if curve.is_level() {
            return PipeSlope::Horizontal;
        }
        let angle = curve.angle_from_vertical();
        if angle < self.vertical_tolerance {
            PipeSlope::Vertical
        } else if angle < self.weird {
            PipeSlope::Weird
        } else if angle < self.sloped {
            PipeSlope::Sloped
        } else {
            PipeSlope::Unclassified
        }
    }
}

pub(super) struct SlopedPipes;

impl Operator for SlopedPipes {}

impl Collector for SlopedPipes {
    fn collect(
        &mut self,
        ctx: &mut RunContext<'_>,
        scope: &[Element],
        args: &Args,
    ) -> anyhow::Result<Vec<Element>> {
        let thresholds = SlopeThresholds::from_args(args)?;

        let mut seen = BTreeSet::new();
        let mut pipes: Vec<&Element> = Vec::new();
        for view in view_ids(scope) {
            for e in ctx.doc.elements_in_view(view) {
                if e.category.as_deref() == Some(PIPES_CATEGORY)
                    && e.as_curve().is_some()
                    && seen.insert(e.id)
                {
                    pipes.push(e);
                }
            }
        }

        let (mut horizontal, mut vertical, mut weird, mut unclassified) = (0, 0, 0, 0);
        let mut sloped = Vec::new();
        for pipe in pipes {
            let Some(curve) = pipe.as_curve() else {
                continue;
            };
            match thresholds.classify(curve) {
                PipeSlope::Horizontal => horizontal += 1,
                PipeSlope::Vertical => vertical += 1,
                PipeSlope::Weird => weird += 1,
                PipeSlope::Sloped => sloped.push(pipe.clone()),
                PipeSlope::Unclassified => unclassified += 1,
            }
        }
        tracing::info!(
            horizontal,
            vertical,
            weird,
            sloped = sloped.len(),
            unclassified,
            "classified pipes"
        );
        Ok(sloped)
    }
}
