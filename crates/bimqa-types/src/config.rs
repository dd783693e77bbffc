//! Persisted operation / operation-set documents (`.opset` files).

use crate::args::ArgMap;
use crate::ids;
use crate::module::ModuleKind;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File extension of operation-set documents, matched case-insensitively.
pub const CONFIG_EXTENSION: &str = "opset";

pub fn has_config_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(CONFIG_EXTENSION))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConfigType {
    Operation,
    OperationSet,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config has no \"type\" field")]
    MissingType,
    #[error("unknown config type: {0} (expected operation, operation_set)")]
    UnknownType(String),
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("config text is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Read the `"type"` discriminator of a config document.
pub fn peek_config_type(text: &str) -> Result<ConfigType, ConfigError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    match value.get("type").and_then(|t| t.as_str()) {
        None => Err(ConfigError::MissingType),
        Some("operation") => Ok(ConfigType::Operation),
        Some("operation_set") => Ok(ConfigType::OperationSet),
        Some(other) => Err(ConfigError::UnknownType(other.to_string())),
    }
}

/// Serialize a document the way `.opset` files are written (4-space indent).
pub fn to_config_json<T: Serialize>(doc: &T) -> Result<String, ConfigError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    doc.serialize(&mut ser)?;
    config_text(buf)
}

fn config_text(buf: Vec<u8>) -> Result<String, ConfigError> {
    let mut text = String::from_utf8(buf)?;
    text.push('\n');
    Ok(text)
}

/// Reference to a module inside a persisted operation. `module_name` is the
/// resolution key; `name` and `author` are informational.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ModuleRefDoc {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub author: String,
    pub module_name: String,
}

fn operation_type() -> ConfigType {
    ConfigType::Operation
}

fn operation_set_type() -> ConfigType {
    ConfigType::OperationSet
}

fn default_set_name() -> String {
    "Operation Set".to_string()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct OperationDoc {
    #[serde(rename = "type", default = "operation_type")]
    pub config_type: ConfigType,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope_selector: Option<ModuleRefDoc>,
    #[serde(default)]
    pub scope_selector_args: ArgMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collector: Option<ModuleRefDoc>,
    #[serde(default)]
    pub collector_args: ArgMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyzer: Option<ModuleRefDoc>,
    #[serde(default)]
    pub analyzer_args: ArgMap,
}

impl OperationDoc {
    /// Module name for `kind`, falling back to the default module when absent.
    pub fn module_name(&self, kind: ModuleKind) -> &str {
        let (module, fallback) = match kind {
            ModuleKind::ScopeSelector => (&self.scope_selector, ids::DEFAULT_SCOPE_SELECTOR),
            ModuleKind::Collector => (&self.collector, ids::DEFAULT_COLLECTOR),
            ModuleKind::Analyzer => (&self.analyzer, ids::DEFAULT_ANALYZER),
        };
        module
            .as_ref()
            .map(|m| m.module_name.as_str())
            .filter(|n| !n.is_empty())
            .unwrap_or(fallback)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct OperationSetDoc {
    #[serde(rename = "type", default = "operation_set_type")]
    pub config_type: ConfigType,
    #[serde(default = "default_set_name")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub operations: Vec<OperationDoc>,
}

impl OperationSetDoc {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            config_type: ConfigType::OperationSet,
            name: name.into(),
            description: String::new(),
            operations: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_match_ignores_case() {
        assert!(has_config_extension(Path::new("a/b/Walls.OPSET")));
        assert!(has_config_extension(Path::new("x.opset")));
        assert!(!has_config_extension(Path::new("x.opset.bak")));
        assert!(!has_config_extension(Path::new("opset")));
    }

    #[test]
    fn config_type_is_required() {
        assert!(matches!(
            peek_config_type(r#"{"name": "x"}"#),
            Err(ConfigError::MissingType)
        ));
        assert!(matches!(
            peek_config_type(r#"{"type": "report"}"#),
            Err(ConfigError::UnknownType(t)) if t == "report"
        ));
        assert_eq!(
            peek_config_type(r#"{"type": "operation_set"}"#).expect("type"),
            ConfigType::OperationSet
        );
    }

    #[test]
    fn missing_fields_take_defaults() {
        let doc: OperationSetDoc =
            serde_json::from_str(r#"{"type": "operation_set", "operations": [{}]}"#)
                .expect("parse");
        assert_eq!(doc.name, "Operation Set");
        assert_eq!(doc.description, "");
        let op = &doc.operations[0];
        assert_eq!(op.module_name(ModuleKind::ScopeSelector), "current_view");
        assert_eq!(op.module_name(ModuleKind::Collector), "all_elements");
        assert_eq!(op.module_name(ModuleKind::Analyzer), "count_elements");
    }

    #[test]
    fn config_json_uses_four_space_indent() {
        let text = to_config_json(&OperationSetDoc::new("Walls")).expect("json");
        assert!(text.contains("\n    \"type\": \"operation_set\""));
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn non_utf8_config_text_is_an_error() {
        let err = config_text(vec![b'{', 0xff, b'}']).expect_err("invalid utf-8");
        assert!(matches!(err, ConfigError::Utf8(_)));
        assert_eq!(config_text(b"{}".to_vec()).expect("utf-8"), "{}\n");
    }
}
