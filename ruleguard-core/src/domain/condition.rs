//! Leaf conditions of a rule tree.
//!
//! A `RuleCondition` compares one market field against a threshold. The
//! structural properties are optional at the type level: a caller's form data may
//! arrive incomplete, and the validator reports the gap as an error string
//! rather than refusing to build the value.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::ConditionId;

/// Category of a condition, chosen by the rule builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionType {
    Price,
    Indicator,
    Volume,
    News,
    Portfolio,
    /// Any unrecognised type string.
    #[serde(other)]
    Unknown,
}

impl ConditionType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Price => "price",
            Self::Indicator => "indicator",
            Self::Volume => "volume",
            Self::News => "news",
            Self::Portfolio => "portfolio",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ConditionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comparison operator of a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    GreaterThan,
    LessThan,
    Equals,
    CrossesAbove,
    CrossesBelow,
    Between,
    /// Any unrecognised operator string.
    #[serde(other)]
    Unknown,
}

impl Operator {
    /// Every operator a condition may legally use.
    pub const ALL: [Operator; 6] = [
        Operator::GreaterThan,
        Operator::LessThan,
        Operator::Equals,
        Operator::CrossesAbove,
        Operator::CrossesBelow,
        Operator::Between,
    ];

    /// Wire name, as used in JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GreaterThan => "greater_than",
            Self::LessThan => "less_than",
            Self::Equals => "equals",
            Self::CrossesAbove => "crosses_above",
            Self::CrossesBelow => "crosses_below",
            Self::Between => "between",
            Self::Unknown => "unknown",
        }
    }

    /// Human-readable phrase for messages ("greater than").
    pub fn phrase(self) -> &'static str {
        match self {
            Self::GreaterThan => "greater than",
            Self::LessThan => "less than",
            Self::Equals => "equals",
            Self::CrossesAbove => "crosses above",
            Self::CrossesBelow => "crosses below",
            Self::Between => "between",
            Self::Unknown => "unknown operator",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Threshold of a condition: a number, or free text for string-valued fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    Number(f64),
    Text(String),
}

impl ConditionValue {
    /// Numeric view of the value. Numeric strings such as `"70"` are accepted.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            Self::Number(_) => None,
        }
    }

    /// True for an empty or whitespace-only text value.
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Text(s) if s.trim().is_empty())
    }
}

impl fmt::Display for ConditionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "'{s}'"),
        }
    }
}

impl From<f64> for ConditionValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for ConditionValue {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<&str> for ConditionValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ConditionValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// A leaf comparison of one market field against a threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleCondition {
    #[serde(default)]
    pub id: ConditionId,
    #[serde(rename = "type", default)]
    pub condition_type: Option<ConditionType>,
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub operator: Option<Operator>,
    #[serde(default)]
    pub value: Option<ConditionValue>,
    /// Upper bound, only meaningful for `between`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value2: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<String>,
}

impl RuleCondition {
    /// Build a complete single-threshold condition.
    pub fn new(
        id: impl Into<String>,
        condition_type: ConditionType,
        field: impl Into<String>,
        operator: Operator,
        value: impl Into<ConditionValue>,
    ) -> Self {
        Self {
            id: ConditionId::new(id),
            condition_type: Some(condition_type),
            field: field.into(),
            operator: Some(operator),
            value: Some(value.into()),
            value2: None,
            timeframe: None,
        }
    }

    /// Build a `between` condition over `[lower, upper]`.
    pub fn between(
        id: impl Into<String>,
        condition_type: ConditionType,
        field: impl Into<String>,
        lower: f64,
        upper: f64,
    ) -> Self {
        Self {
            value2: Some(upper),
            ..Self::new(id, condition_type, field, Operator::Between, lower)
        }
    }

    pub fn with_value2(self, value2: f64) -> Self {
        Self {
            value2: Some(value2),
            ..self
        }
    }

    pub fn with_timeframe(self, timeframe: impl Into<String>) -> Self {
        Self {
            timeframe: Some(timeframe.into()),
            ..self
        }
    }

    /// Numeric threshold, if the value is present and numeric.
    pub fn numeric_value(&self) -> Option<f64> {
        self.value.as_ref().and_then(ConditionValue::as_number)
    }

    /// Short description used inside messages: `RSI greater than 70`.
    pub fn describe(&self) -> String {
        let op = self.operator.unwrap_or(Operator::Unknown);
        let value = self
            .value
            .as_ref()
            .map(|v| v.to_string())
            .unwrap_or_else(|| "?".into());
        match (op, self.value2) {
            (Operator::Between, Some(upper)) => {
                format!("{} between {} and {}", self.field, value, upper)
            }
            _ => format!("{} {} {}", self.field, op.phrase(), value),
        }
    }
}
