use crate::args::{ArgMap, ArgType, ArgValue};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ModuleKind {
    ScopeSelector,
    Collector,
    Analyzer,
}

impl ModuleKind {
    pub const ALL: [ModuleKind; 3] = [
        ModuleKind::ScopeSelector,
        ModuleKind::Collector,
        ModuleKind::Analyzer,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ModuleKind::ScopeSelector => "scope_selector",
            ModuleKind::Collector => "collector",
            ModuleKind::Analyzer => "analyzer",
        }
    }

    /// Human label used in logs and alerts.
    pub fn label(self) -> &'static str {
        match self {
            ModuleKind::ScopeSelector => "Scope Selector",
            ModuleKind::Collector => "Collector",
            ModuleKind::Analyzer => "Analyzer",
        }
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModuleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "scope_selector" | "scope" => Ok(ModuleKind::ScopeSelector),
            "collector" => Ok(ModuleKind::Collector),
            "analyzer" => Ok(ModuleKind::Analyzer),
            other => Err(format!(
                "unknown module kind: {other} (expected scope_selector, collector, analyzer)"
            )),
        }
    }
}

/// Metadata a module registers with. Unset fields fall back when the module
/// is loaded (see [`ModuleMeta::resolve`]).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModuleSpec {
    pub name: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub returns: Option<String>,
    pub arg_types: BTreeMap<String, ArgType>,
    pub default_args: ArgMap,
    pub hidden: Option<bool>,
}

impl ModuleSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn returns(mut self, returns: impl Into<String>) -> Self {
        self.returns = Some(returns.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = Some(true);
        self
    }

    /// Declare an argument and its default.
    pub fn arg(mut self, key: &str, ty: ArgType, default: impl Into<ArgValue>) -> Self {
        self.arg_types.insert(key.to_string(), ty);
        self.default_args.insert(key.to_string(), default.into());
        self
    }

    /// Declare an argument without a default.
    pub fn arg_without_default(mut self, key: &str, ty: ArgType) -> Self {
        self.arg_types.insert(key.to_string(), ty);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MetaError {
    #[error("{kind} '{module}': default for '{key}' has no declared type")]
    DefaultWithoutType {
        kind: ModuleKind,
        module: String,
        key: String,
    },
    #[error("{kind} '{module}': default for '{key}' is not a valid {expected}")]
    InvalidDefault {
        kind: ModuleKind,
        module: String,
        key: String,
        expected: String,
    },
}

/// Resolved module metadata as exposed to callers and tooling.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ModuleMeta {
    pub kind: ModuleKind,
    pub module_name: String,
    pub name: String,
    pub description: String,
    pub author: String,
    #[serde(rename = "return")]
    pub returns: String,
    pub arg_types: BTreeMap<String, ArgType>,
    pub default_args: ArgMap,
    pub hidden: bool,
}

impl ModuleMeta {
    /// Apply metadata fallbacks and validate defaults against declared types.
    pub fn resolve(
        kind: ModuleKind,
        module_name: &str,
        spec: ModuleSpec,
        instance_author: &str,
    ) -> Result<Self, MetaError> {
        for (key, value) in &spec.default_args {
            let Some(ty) = spec.arg_types.get(key) else {
                return Err(MetaError::DefaultWithoutType {
                    kind,
                    module: module_name.to_string(),
                    key: key.clone(),
                });
            };
            if !ty.accepts(value) {
                return Err(MetaError::InvalidDefault {
                    kind,
                    module: module_name.to_string(),
                    key: key.clone(),
                    expected: ty.to_string(),
                });
            }
        }

        Ok(Self {
            kind,
            module_name: module_name.to_string(),
            name: spec.name.unwrap_or_else(|| module_name.to_string()),
            description: spec.description.unwrap_or_default(),
            author: spec
                .author
                .unwrap_or_else(|| instance_author.to_string()),
            returns: spec.returns.unwrap_or_default(),
            arg_types: spec.arg_types,
            default_args: spec.default_args,
            hidden: spec.hidden.unwrap_or(false),
        })
    }
}
