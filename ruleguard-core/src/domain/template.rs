//! Built-in rule templates.
//!
//! A template is an immutable, shareable condition tree plus actions and catalog
//! metadata. The rule builder clones one to seed a new `Rule`.

use serde::{Deserialize, Serialize};

use super::condition::{ConditionType, Operator, RuleCondition};
use super::group::RuleGroup;
use super::rule::{AlertChannel, Rule, RuleAction};

/// Catalog grouping of templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateCategory {
    Reversal,
    Momentum,
    Breakout,
    RiskManagement,
}

/// A shareable starting point for a new rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleTemplate {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: TemplateCategory,
    /// Number of users who created a rule from this template.
    pub popularity: u32,
    /// Average historical win rate in `[0, 1]`.
    pub avg_win_rate: f64,
    pub root_group: RuleGroup,
    pub actions: Vec<RuleAction>,
}

impl RuleTemplate {
    /// Seed a new rule from this template.
    pub fn instantiate(&self, rule_id: impl Into<String>) -> Rule {
        let mut rule = Rule::new(rule_id, self.name.clone(), self.root_group.clone());
        rule.description = self.description.clone();
        rule.actions = self.actions.clone();
        rule
    }
}

/// Named presets shipped with the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplatePreset {
    RsiOversoldBounce,
    MacdBullishCrossover,
    VolumeBreakout,
    OverboughtReversal,
    DrawdownGuard,
}

fn indicator(id: &str, field: &str, op: Operator, value: f64) -> RuleCondition {
    RuleCondition::new(id, ConditionType::Indicator, field, op, value)
}

fn alert(message: &str) -> RuleAction {
    RuleAction::Alert {
        channels: vec![AlertChannel::InApp, AlertChannel::Push],
        message: message.into(),
    }
}

impl TemplatePreset {
    pub fn all() -> &'static [TemplatePreset] {
        &[
            Self::RsiOversoldBounce,
            Self::MacdBullishCrossover,
            Self::VolumeBreakout,
            Self::OverboughtReversal,
            Self::DrawdownGuard,
        ]
    }

    pub fn to_template(self) -> RuleTemplate {
        match self {
            Self::RsiOversoldBounce => RuleTemplate {
                id: "rsi_oversold_bounce".into(),
                name: "RSI Oversold Bounce".into(),
                description: "Alert when RSI dips below 30 and then crosses back above it".into(),
                category: TemplateCategory::Reversal,
                popularity: 1_250,
                avg_win_rate: 0.58,
                root_group: RuleGroup::and("root")
                    .with_condition(indicator("rsi_below", "RSI", Operator::LessThan, 30.0))
                    .with_condition(indicator("rsi_cross", "RSI", Operator::CrossesAbove, 30.0)),
                actions: vec![alert("RSI bounced out of oversold territory")],
            },
            Self::MacdBullishCrossover => RuleTemplate {
                id: "macd_bullish_crossover".into(),
                name: "MACD Bullish Crossover".into(),
                description: "MACD crosses above zero with RSI in a neutral band and rising volume"
                    .into(),
                category: TemplateCategory::Momentum,
                popularity: 980,
                avg_win_rate: 0.55,
                root_group: RuleGroup::and("root")
                    .with_condition(indicator("macd_cross", "MACD", Operator::CrossesAbove, 0.0))
                    .with_condition(RuleCondition::between(
                        "rsi_band",
                        ConditionType::Indicator,
                        "RSI",
                        40.0,
                        70.0,
                    ))
                    .with_condition(RuleCondition::new(
                        "volume_confirm",
                        ConditionType::Volume,
                        "volume_ratio",
                        Operator::GreaterThan,
                        1.2,
                    )),
                actions: vec![alert("MACD bullish crossover confirmed")],
            },
            Self::VolumeBreakout => RuleTemplate {
                id: "volume_breakout".into(),
                name: "Volume Breakout".into(),
                description: "Strong daily move on at least twice the average volume".into(),
                category: TemplateCategory::Breakout,
                popularity: 760,
                avg_win_rate: 0.52,
                root_group: RuleGroup::and("root")
                    .with_condition(
                        RuleCondition::new(
                            "move",
                            ConditionType::Price,
                            "price_change_pct",
                            Operator::GreaterThan,
                            3.0,
                        )
                        .with_timeframe("1d"),
                    )
                    .with_condition(RuleCondition::new(
                        "volume_spike",
                        ConditionType::Volume,
                        "volume_ratio",
                        Operator::GreaterThan,
                        2.0,
                    ))
                    .with_condition(RuleCondition::new(
                        "stop",
                        ConditionType::Portfolio,
                        "stop_loss",
                        Operator::GreaterThan,
                        2.0,
                    )),
                actions: vec![alert("Volume breakout detected")],
            },
            Self::OverboughtReversal => RuleTemplate {
                id: "overbought_reversal".into(),
                name: "Overbought Reversal".into(),
                description: "RSI overbought while momentum rolls over".into(),
                category: TemplateCategory::Reversal,
                popularity: 640,
                avg_win_rate: 0.49,
                root_group: RuleGroup::and("root")
                    .with_condition(indicator("rsi_high", "RSI", Operator::GreaterThan, 75.0))
                    .with_group(
                        RuleGroup::or("rollover")
                            .with_condition(indicator(
                                "stoch_cross",
                                "stochastic_k",
                                Operator::CrossesBelow,
                                80.0,
                            ))
                            .with_condition(indicator(
                                "hist_cross",
                                "MACD_histogram",
                                Operator::CrossesBelow,
                                0.0,
                            )),
                    ),
                actions: vec![alert("Overbought reversal forming")],
            },
            Self::DrawdownGuard => RuleTemplate {
                id: "drawdown_guard".into(),
                name: "Drawdown Guard".into(),
                description: "Sell when the position loses 8% or nears its safety line".into(),
                category: TemplateCategory::RiskManagement,
                popularity: 1_410,
                avg_win_rate: 0.0,
                root_group: RuleGroup::or("root")
                    .with_condition(RuleCondition::new(
                        "pnl",
                        ConditionType::Portfolio,
                        "position_pnl_pct",
                        Operator::LessThan,
                        -8.0,
                    ))
                    .with_condition(RuleCondition::new(
                        "safety",
                        ConditionType::Portfolio,
                        "safety_line",
                        Operator::LessThan,
                        1.0,
                    )),
                actions: vec![
                    RuleAction::AutoSell { percentage: 100.0 },
                    alert("Drawdown guard sold the position"),
                ],
            },
        }
    }
}

/// Every built-in template, in catalog order.
pub fn builtin_templates() -> Vec<RuleTemplate> {
    TemplatePreset::all()
        .iter()
        .map(|p| p.to_template())
        .collect()
}

/// Look up a built-in template by id or display name (case-insensitive).
pub fn find_template(key: &str) -> Option<RuleTemplate> {
    builtin_templates()
        .into_iter()
        .find(|t| t.id.eq_ignore_ascii_case(key) || t.name.eq_ignore_ascii_case(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_ids_are_unique() {
        let templates = builtin_templates();
        let mut ids: Vec<_> = templates.iter().map(|t| t.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), templates.len());
    }

    #[test]
    fn find_by_name_or_id() {
        assert!(find_template("RSI Oversold Bounce").is_some());
        assert!(find_template("rsi_oversold_bounce").is_some());
        assert!(find_template("nope").is_none());
    }

    #[test]
    fn instantiate_copies_tree_and_actions() {
        let template = TemplatePreset::DrawdownGuard.to_template();
        let rule = template.instantiate("r-42");
        assert_eq!(rule.id.0, "r-42");
        assert_eq!(rule.root_group, template.root_group);
        assert_eq!(rule.actions.len(), 2);
        assert!(rule.enabled);
    }
}
