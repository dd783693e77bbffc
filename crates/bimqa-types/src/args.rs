//! Module argument model.
//!
//! Modules declare their arguments as `ArgType`s with optional defaults. At
//! run time the defaults are merged under the explicit arguments stored on an
//! operation (`merge_args`), and operators read the result through `Args`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Ordered argument map, keyed by the user-facing argument label.
pub type ArgMap = BTreeMap<String, ArgValue>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", content = "options", rename_all = "snake_case")]
pub enum ArgType {
    Bool,
    Int,
    Float,
    String,
    /// One value out of a fixed list.
    Choice(Vec<String>),
    /// Any subset of a fixed list.
    MultiChoice(Vec<String>),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ArgValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<String>),
}

impl ArgValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            ArgValue::Bool(_) => "bool",
            ArgValue::Int(_) => "int",
            ArgValue::Float(_) => "float",
            ArgValue::Str(_) => "string",
            ArgValue::List(_) => "list",
        }
    }
}

impl From<bool> for ArgValue {
    fn from(v: bool) -> Self {
        ArgValue::Bool(v)
    }
}

impl From<i64> for ArgValue {
    fn from(v: i64) -> Self {
        ArgValue::Int(v)
    }
}

impl From<f64> for ArgValue {
    fn from(v: f64) -> Self {
        ArgValue::Float(v)
    }
}

impl From<&str> for ArgValue {
    fn from(v: &str) -> Self {
        ArgValue::Str(v.to_string())
    }
}

impl From<Vec<String>> for ArgValue {
    fn from(v: Vec<String>) -> Self {
        ArgValue::List(v)
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Bool(v) => write!(f, "{v}"),
            ArgValue::Int(v) => write!(f, "{v}"),
            ArgValue::Float(v) => write!(f, "{v}"),
            ArgValue::Str(v) => write!(f, "{v:?}"),
            ArgValue::List(v) => write!(f, "[{}]", v.join(", ")),
        }
    }
}

impl ArgType {
    /// Whether `value` is a legal value for this type.
    ///
    /// Floats accept integers and ints accept whole-valued floats (`20.0`).
    /// Choice types only accept listed options.
    pub fn accepts(&self, value: &ArgValue) -> bool {
        match (self, value) {
            (ArgType::Bool, ArgValue::Bool(_)) => true,
            (ArgType::Int, ArgValue::Int(_)) => true,
            (ArgType::Int, ArgValue::Float(v)) => is_whole(*v),
            (ArgType::Float, ArgValue::Float(_) | ArgValue::Int(_)) => true,
            (ArgType::String, ArgValue::Str(_)) => true,
            (ArgType::Choice(options), ArgValue::Str(v)) => options.contains(v),
            (ArgType::MultiChoice(options), ArgValue::List(vs)) => {
                vs.iter().all(|v| options.contains(v))
            }
            _ => false,
        }
    }
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgType::Bool => f.write_str("bool"),
            ArgType::Int => f.write_str("int"),
            ArgType::Float => f.write_str("float"),
            ArgType::String => f.write_str("string"),
            ArgType::Choice(o) => write!(f, "choice of {} option(s)", o.len()),
            ArgType::MultiChoice(o) => write!(f, "multi-choice of {} option(s)", o.len()),
        }
    }
}

fn is_whole(v: f64) -> bool {
    v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64
}

/// `{**defaults, **explicit}`: explicit values win, unknown keys pass through.
pub fn merge_args(defaults: &ArgMap, explicit: &ArgMap) -> ArgMap {
    let mut merged = defaults.clone();
    for (k, v) in explicit {
        merged.insert(k.clone(), v.clone());
    }
    merged
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ArgError {
    #[error("missing argument '{key}'")]
    Missing { key: String },
    #[error("argument '{key}' expected {expected}, got {found}")]
    WrongType {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Effective arguments handed to an operator.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Args {
    values: ArgMap,
}

impl Args {
    pub fn new(values: ArgMap) -> Self {
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&ArgValue> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn as_map(&self) -> &ArgMap {
        &self.values
    }

    pub fn into_map(self) -> ArgMap {
        self.values
    }

    fn require(&self, key: &str) -> Result<&ArgValue, ArgError> {
        self.values.get(key).ok_or_else(|| ArgError::Missing {
            key: key.to_string(),
        })
    }

    fn wrong(key: &str, expected: &'static str, found: &ArgValue) -> ArgError {
        ArgError::WrongType {
            key: key.to_string(),
            expected,
            found: found.kind_name(),
        }
    }

    pub fn bool(&self, key: &str) -> Result<bool, ArgError> {
        match self.require(key)? {
            ArgValue::Bool(v) => Ok(*v),
            other => Err(Self::wrong(key, "bool", other)),
        }
    }

    pub fn int(&self, key: &str) -> Result<i64, ArgError> {
        match self.require(key)? {
            ArgValue::Int(v) => Ok(*v),
            ArgValue::Float(v) if is_whole(*v) => Ok(*v as i64),
            other => Err(Self::wrong(key, "int", other)),
        }
    }

    pub fn float(&self, key: &str) -> Result<f64, ArgError> {
        match self.require(key)? {
            ArgValue::Float(v) => Ok(*v),
            ArgValue::Int(v) => Ok(*v as f64),
            other => Err(Self::wrong(key, "float", other)),
        }
    }

    pub fn string(&self, key: &str) -> Result<&str, ArgError> {
        match self.require(key)? {
            ArgValue::Str(v) => Ok(v.as_str()),
            other => Err(Self::wrong(key, "string", other)),
        }
    }

    pub fn list(&self, key: &str) -> Result<&[String], ArgError> {
        match self.require(key)? {
            ArgValue::List(v) => Ok(v.as_slice()),
            other => Err(Self::wrong(key, "list", other)),
        }
    }
}

impl From<ArgMap> for Args {
    fn from(values: ArgMap) -> Self {
        Self::new(values)
    }
}
