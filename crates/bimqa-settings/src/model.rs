use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// `bimqa.toml` schema v1.
///
/// User-facing and permissive: every field is optional.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BimqaConfigV1 {
    /// Optional schema string for tooling (`bimqa.config.v1`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// `error`, `warn`, `info` (default), `debug` or `trace`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// Folder holding `.opset` files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sets_dir: Option<String>,

    /// List hidden modules too.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_hidden: Option<bool>,

    /// Exit with code 2 when any TEST section has failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,

    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReportConfig {
    /// Cap applied to sections that keep the default `max_printed_items`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_printed_items: Option<u32>,
}
