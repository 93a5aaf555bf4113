use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single indicator parameter: numeric, or text for enumerated options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f64),
    Text(String),
}

impl ParamValue {
    /// Numeric view; numeric strings are accepted.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "'{s}'"),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// An active chart indicator and its parameters.
///
/// Uses `BTreeMap` so validation messages come out in a stable order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorConfig {
    pub name: String,
    #[serde(default)]
    pub params: BTreeMap<String, ParamValue>,
}

impl IndicatorConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: BTreeMap::new(),
        }
    }

    /// Build from `&[(&str, f64)]` pairs.
    pub fn with_params(name: impl Into<String>, pairs: &[(&str, f64)]) -> Self {
        Self {
            name: name.into(),
            params: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), ParamValue::Number(*v)))
                .collect(),
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.params.get(key).and_then(ParamValue::as_number)
    }
}
