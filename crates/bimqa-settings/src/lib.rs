//! `bimqa.toml` parsing and resolution.
//!
//! This crate is IO-free: it parses and resolves configuration provided as strings.

#![forbid(unsafe_code)]

mod model;
mod resolve;

pub use model::{BimqaConfigV1, ReportConfig};
pub use resolve::{DEFAULT_SETS_DIR, LogLevel, Overrides, ResolvedSettings};

/// Parse `bimqa.toml` (or equivalent) into a typed model.
pub fn parse_config_toml(input: &str) -> anyhow::Result<BimqaConfigV1> {
    let cfg: BimqaConfigV1 = toml::from_str(input)?;
    Ok(cfg)
}

/// Resolve the effective settings: overrides, then the file, then defaults.
pub fn resolve_settings(
    cfg: BimqaConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedSettings> {
    resolve::resolve_settings(cfg, overrides)
}
