//! Persisted rule aggregate.
//!
//! `Rule` is owned by the rule store. The validator only reads its root group and
//! actions; nothing in this crate mutates a stored rule.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::group::RuleGroup;
use super::ids::{RuleId, TreeFingerprint};

/// Where an alert is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertChannel {
    InApp,
    Email,
    Push,
    Webhook,
}

/// What happens when a rule triggers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleAction {
    /// Notify the user.
    Alert {
        #[serde(default)]
        channels: Vec<AlertChannel>,
        #[serde(default)]
        message: String,
    },
    /// Sell a percentage of the position.
    AutoSell { percentage: f64 },
}

impl fmt::Display for RuleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alert { .. } => f.write_str("alert"),
            Self::AutoSell { percentage } => write!(f, "auto-sell {percentage}%"),
        }
    }
}

/// Summary statistics produced by the backtest/preview service.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BacktestStats {
    pub total_triggers: u32,
    pub win_rate: f64,
    pub avg_profit_pct: f64,
    pub max_profit_pct: f64,
    pub max_loss_pct: f64,
    pub profitable_triggers: u32,
}

/// A backtest result cached on the rule, tagged with the tree it was run against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedBacktest {
    pub fingerprint: TreeFingerprint,
    pub symbol: String,
    pub lookback_days: u32,
    pub stats: BacktestStats,
    pub computed_at: DateTime<Utc>,
}

/// Trigger bookkeeping maintained by the alerting system.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TriggerStats {
    pub trigger_count: u64,
    pub last_triggered: Option<DateTime<Utc>>,
}

/// A persisted trigger definition: a condition tree plus actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: RuleId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub root_group: RuleGroup,
    #[serde(default)]
    pub actions: Vec<RuleAction>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub triggers: TriggerStats,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backtest: Option<CachedBacktest>,
}

fn default_enabled() -> bool {
    true
}

impl Rule {
    pub fn new(id: impl Into<String>, name: impl Into<String>, root_group: RuleGroup) -> Self {
        Self {
            id: RuleId::new(id),
            name: name.into(),
            description: String::new(),
            root_group,
            actions: Vec::new(),
            enabled: true,
            triggers: TriggerStats::default(),
            created_at: Utc::now(),
            backtest: None,
        }
    }

    pub fn with_action(mut self, action: RuleAction) -> Self {
        self.actions.push(action);
        self
    }

    /// True when a cached backtest exists and was computed for the current tree.
    pub fn has_fresh_backtest(&self) -> bool {
        self.backtest
            .as_ref()
            .is_some_and(|b| b.fingerprint == self.root_group.fingerprint())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::condition::{ConditionType, Operator, RuleCondition};

    fn rsi_rule() -> Rule {
        let group = RuleGroup::and("root").with_condition(RuleCondition::new(
            "c1",
            ConditionType::Indicator,
            "RSI",
            Operator::LessThan,
            30.0,
        ));
        Rule::new("r1", "RSI dip", group).with_action(RuleAction::Alert {
            channels: vec![AlertChannel::InApp],
            message: "RSI oversold".into(),
        })
    }

    #[test]
    fn action_wire_format_is_tagged() {
        let json = serde_json::to_string(&RuleAction::AutoSell { percentage: 50.0 }).unwrap();
        assert_eq!(json, r#"{"type":"auto_sell","percentage":50.0}"#);
    }

    #[test]
    fn stale_backtest_is_detected() {
        let mut rule = rsi_rule();
        assert!(!rule.has_fresh_backtest());

        rule.backtest = Some(CachedBacktest {
            fingerprint: rule.root_group.fingerprint(),
            symbol: "AAPL".into(),
            lookback_days: 90,
            stats: BacktestStats::default(),
            computed_at: Utc::now(),
        });
        assert!(rule.has_fresh_backtest());

        rule.root_group = rule.root_group.clone().with_condition(RuleCondition::new(
            "c2",
            ConditionType::Volume,
            "volume_ratio",
            Operator::GreaterThan,
            1.5,
        ));
        assert!(!rule.has_fresh_backtest());
    }

    #[test]
    fn enabled_defaults_to_true() {
        let json = r#"{
            "id": "r1",
            "name": "n",
            "root_group": {"id": "g", "logic": "AND"},
            "created_at": "2024-01-01T00:00:00Z"
        }"#;
        let rule: Rule = serde_json::from_str(json).unwrap();
        assert!(rule.enabled);
        assert!(rule.actions.is_empty());
    }
}
