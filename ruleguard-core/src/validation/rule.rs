//! Whole-rule validation: the condition tree plus the rule's own fields.

use tracing::debug;

use crate::config::ValidatorConfig;
use crate::domain::{Rule, RuleAction};

use super::group::validate_rule_group_with;
use super::result::ValidationResult;

/// Validate a rule with default thresholds.
pub fn validate_rule(rule: &Rule) -> ValidationResult {
    validate_rule_with(rule, &ValidatorConfig::default())
}

pub fn validate_rule_with(rule: &Rule, config: &ValidatorConfig) -> ValidationResult {
    let mut result = validate_rule_group_with(&rule.root_group, config.max_nesting);

    if rule.name.trim().is_empty() {
        result.add_error("Rule name is required");
    }
    if rule.actions.is_empty() {
        result.add_warning("Rule has no actions, so triggering it does nothing");
    }

    for (i, action) in rule.actions.iter().enumerate() {
        match action {
            RuleAction::AutoSell { percentage } => {
                if !(percentage.is_finite() && *percentage > 0.0 && *percentage <= 100.0) {
                    result.add_error(format!(
                        "Action {}: auto-sell percentage must be in (0, 100], got {percentage}",
                        i + 1
                    ));
                }
            }
            RuleAction::Alert { channels, .. } => {
                if channels.is_empty() {
                    result.add_warning(format!(
                        "Action {}: alert has no delivery channels",
                        i + 1
                    ));
                }
            }
        }
    }

    debug!(rule = %rule.id, valid = result.valid, "validated rule");
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AlertChannel, ConditionType, Operator, RuleCondition, RuleGroup};

    fn group() -> RuleGroup {
        RuleGroup::and("root").with_condition(RuleCondition::new(
            "c1",
            ConditionType::Indicator,
            "RSI",
            Operator::LessThan,
            30.0,
        ))
    }

    fn alert() -> RuleAction {
        RuleAction::Alert {
            channels: vec![AlertChannel::Push],
            message: "RSI dip".into(),
        }
    }

    #[test]
    fn well_formed_rule_is_clean() {
        let rule = Rule::new("r1", "RSI dip", group()).with_action(alert());
        assert!(validate_rule(&rule).is_clean());
    }

    #[test]
    fn name_and_actions() {
        let rule = Rule::new("r1", "  ", group());
        let r = validate_rule(&rule);
        assert_eq!(r.errors, vec!["Rule name is required"]);
        assert_eq!(r.warnings, vec!["Rule has no actions, so triggering it does nothing"]);
    }

    #[test]
    fn auto_sell_bounds() {
        for (pct, ok) in [(0.0, false), (50.0, true), (100.0, true), (120.0, false), (f64::NAN, false)] {
            let rule = Rule::new("r1", "sell", group()).with_action(RuleAction::AutoSell { percentage: pct });
            assert_eq!(validate_rule(&rule).valid, ok, "percentage {pct}");
        }
    }

    #[test]
    fn silent_alert_warns() {
        let rule = Rule::new("r1", "n", group()).with_action(RuleAction::Alert {
            channels: vec![],
            message: String::new(),
        });
        let r = validate_rule(&rule);
        assert!(r.valid);
        assert_eq!(r.warnings, vec!["Action 1: alert has no delivery channels"]);
    }

    #[test]
    fn tree_errors_surface() {
        let rule = Rule::new("r1", "empty", RuleGroup::or("root")).with_action(alert());
        assert!(!validate_rule(&rule).valid);
    }
}
