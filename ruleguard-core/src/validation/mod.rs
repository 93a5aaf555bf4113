//! Validators for condition trees, whole rules, and indicator sets.
//!
//! Every validator is a pure function returning a [`ValidationResult`]; malformed
//! input is reported as messages, never as a panic or an `Err`.
//! [`RuleValidator`] bundles them behind a single [`ValidatorConfig`].

pub mod advisor;
pub mod batch;
pub mod condition;
pub mod conflict;
pub mod group;
pub mod indicators;
pub mod result;
pub mod rule;
pub mod semantics;

use serde::{Deserialize, Serialize};

use crate::config::ValidatorConfig;
use crate::domain::{IndicatorConfig, Rule, RuleGroup, RuleId};

pub use advisor::{count_conditions, suggest_improvements, suggest_improvements_with, used_fields};
pub use batch::validate_rules;
pub use condition::validate_condition;
pub use conflict::detect_and_conflicts;
pub use group::{validate_rule_group, validate_rule_group_at, validate_rule_group_with, DEFAULT_MAX_NESTING};
pub use indicators::{validate_indicator_set, validate_indicator_set_with};
pub use result::ValidationResult;
pub use rule::{validate_rule, validate_rule_with};

/// Validation verdict plus advisor suggestions for one tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleReview {
    pub validation: ValidationResult,
    pub suggestions: Vec<String>,
}

/// Config-carrying entry point for every validator.
#[derive(Debug, Clone, Default)]
pub struct RuleValidator {
    config: ValidatorConfig,
}

impl RuleValidator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    pub fn validate_group(&self, group: &RuleGroup) -> ValidationResult {
        validate_rule_group_with(group, self.config.max_nesting)
    }

    pub fn suggest(&self, group: &RuleGroup) -> Vec<String> {
        suggest_improvements_with(group, &self.config)
    }

    pub fn validate_indicators(&self, configs: &[IndicatorConfig]) -> ValidationResult {
        validate_indicator_set_with(configs, &self.config)
    }

    pub fn validate_rule(&self, rule: &Rule) -> ValidationResult {
        validate_rule_with(rule, &self.config)
    }

    pub fn validate_rules(&self, rules: &[Rule]) -> Vec<(RuleId, ValidationResult)> {
        validate_rules(rules, &self.config)
    }

    /// Validate a tree and collect suggestions in one call.
    pub fn review(&self, group: &RuleGroup) -> RuleReview {
        RuleReview {
            validation: self.validate_group(group),
            suggestions: self.suggest(group),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConditionType, Operator, RuleCondition};

    #[test]
    fn facade_honours_config() {
        let deep = RuleGroup::and("a").with_group(
            RuleGroup::and("b").with_condition(RuleCondition::new(
                "c",
                ConditionType::Indicator,
                "RSI",
                Operator::LessThan,
                30.0,
            )),
        );
        assert!(RuleValidator::default().validate_group(&deep).valid);

        let flat_only = RuleValidator::new(ValidatorConfig {
            max_nesting: 0,
            ..ValidatorConfig::default()
        });
        assert!(!flat_only.validate_group(&deep).valid);
        assert_eq!(flat_only.config().max_nesting, 0);
    }

    #[test]
    fn review_bundles_suggestions() {
        let group = RuleGroup::and("root").with_condition(RuleCondition::new(
            "c",
            ConditionType::Price,
            "current_price",
            Operator::GreaterThan,
            100.0,
        ));
        let review = RuleValidator::default().review(&group);
        assert!(review.validation.valid);
        assert_eq!(review.suggestions.len(), 3);

        let json = serde_json::to_value(&review).unwrap();
        assert_eq!(json["validation"]["valid"], true);
    }
}
