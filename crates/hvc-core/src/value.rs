//! # Value Types and Type Constraints
//!
//! Rulesets declare the acceptable type of every hyperparameter either as
//! a single type (`k: int`) or as a union (`C: [int, float]`). Both shapes
//! are represented by [`TypeConstraint`], so checking a value is a
//! membership test of [`ValueType::of`] against the constraint.
//!
//! ## Numeric Semantics
//!
//! Integers and floats are distinct. A YAML `5.0` parses as a float and
//! is rejected by an integer-only constraint even though it is
//! numerically integral.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The runtime type of a configuration value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Integer,
    Float,
    String,
    Boolean,
    Sequence,
    Mapping,
    Null,
}

impl ValueType {
    /// Classify a value by its runtime type.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Boolean,
            Value::Number(n) if n.is_i64() || n.is_u64() => Self::Integer,
            Value::Number(_) => Self::Float,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Sequence,
            Value::Object(_) => Self::Mapping,
        }
    }

    /// Canonical name, as printed in messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Sequence => "sequence",
            Self::Mapping => "mapping",
            Self::Null => "null",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned for a type name a ruleset may not use.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown value type '{0}'")]
pub struct UnknownValueType(pub String);

impl FromStr for ValueType {
    type Err = UnknownValueType;

    /// Accepts canonical names and the short aliases rulesets are usually
    /// written with (`int`, `str`, `bool`, `list`, `dict`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "int" | "integer" => Ok(Self::Integer),
            "float" => Ok(Self::Float),
            "str" | "string" => Ok(Self::String),
            "bool" | "boolean" => Ok(Self::Boolean),
            "list" | "sequence" => Ok(Self::Sequence),
            "dict" | "mapping" => Ok(Self::Mapping),
            "null" | "none" => Ok(Self::Null),
            other => Err(UnknownValueType(other.to_string())),
        }
    }
}

/// The acceptable type(s) for a hyperparameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeConstraint {
    /// The value must have exactly this type.
    Exact(ValueType),
    /// The value must have any one of these types. No preference order.
    OneOf(BTreeSet<ValueType>),
}

impl TypeConstraint {
    /// Whether a value of type `ty` satisfies this constraint.
    pub fn accepts(&self, ty: ValueType) -> bool {
        match self {
            Self::Exact(expected) => *expected == ty,
            Self::OneOf(allowed) => allowed.contains(&ty),
        }
    }

    /// Whether `value` satisfies this constraint.
    pub fn accepts_value(&self, value: &Value) -> bool {
        self.accepts(ValueType::of(value))
    }

    /// The member types, in canonical order.
    pub fn members(&self) -> Vec<ValueType> {
        match self {
            Self::Exact(ty) => vec![*ty],
            Self::OneOf(allowed) => allowed.iter().copied().collect(),
        }
    }
}

impl fmt::Display for TypeConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(ty) => write!(f, "{ty}"),
            Self::OneOf(allowed) => {
                for (i, ty) in allowed.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" or ")?;
                    }
                    write!(f, "{ty}")?;
                }
                Ok(())
            }
        }
    }
}

/// Convert a `serde_yaml::Value` to a `serde_json::Value`.
///
/// Job files use only the JSON-compatible subset of YAML. Tags are
/// dropped and non-string map keys are stringified. Non-finite floats
/// have no JSON representation and are rejected.
pub fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Number(serde_json::Number::from(i)))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::Number(serde_json::Number::from(u)))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("cannot represent float {f} in JSON"))
            } else {
                Err(format!("unsupported YAML number: {n:?}"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => {
            let items: Result<Vec<Value>, String> = seq.iter().map(yaml_to_json_value).collect();
            Ok(Value::Array(items?))
        }
        serde_yaml::Value::Mapping(map) => {
            let mut json_map = serde_json::Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported YAML map key type: {other:?}")),
                };
                json_map.insert(key, yaml_to_json_value(v)?);
            }
            Ok(Value::Object(json_map))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}
