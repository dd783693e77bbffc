use crate::model::BimqaConfigV1;
use anyhow::Context;
use std::fmt;

pub const DEFAULT_SETS_DIR: &str = "qa/sets";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub log_level: Option<String>,
    pub sets_dir: Option<String>,
    pub include_hidden: Option<bool>,
    pub strict: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedSettings {
    pub log_level: LogLevel,
    pub sets_dir: String,
    pub include_hidden: bool,
    pub strict: bool,
    pub max_printed_items: Option<usize>,
}

impl Default for ResolvedSettings {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            sets_dir: DEFAULT_SETS_DIR.to_string(),
            include_hidden: false,
            strict: false,
            max_printed_items: None,
        }
    }
}

pub fn resolve_settings(
    cfg: BimqaConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedSettings> {
    let mut resolved = ResolvedSettings::default();

    if let Some(level) = overrides.log_level.or(cfg.log_level) {
        resolved.log_level =
            parse_log_level(&level).with_context(|| format!("invalid log_level '{level}'"))?;
    }
    if let Some(dir) = overrides.sets_dir.or(cfg.sets_dir) {
        if dir.trim().is_empty() {
            anyhow::bail!("sets_dir must not be empty");
        }
        resolved.sets_dir = dir;
    }
    if let Some(include_hidden) = overrides.include_hidden.or(cfg.include_hidden) {
        resolved.include_hidden = include_hidden;
    }
    if let Some(strict) = overrides.strict.or(cfg.strict) {
        resolved.strict = strict;
    }
    resolved.max_printed_items = cfg.report.max_printed_items.map(|n| n as usize);

    Ok(resolved)
}

fn parse_log_level(v: &str) -> anyhow::Result<LogLevel> {
    match v.to_ascii_lowercase().as_str() {
        "error" => Ok(LogLevel::Error),
        "warn" | "warning" => Ok(LogLevel::Warn),
        "info" => Ok(LogLevel::Info),
        "debug" => Ok(LogLevel::Debug),
        "trace" => Ok(LogLevel::Trace),
        other => anyhow::bail!("unknown log level: {other} (expected error|warn|info|debug|trace)"),
    }
}
