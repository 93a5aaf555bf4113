//! Parallel validation of many rules.

use rayon::prelude::*;
use tracing::info;

use crate::config::ValidatorConfig;
use crate::domain::{Rule, RuleId};

use super::result::ValidationResult;
use super::rule::validate_rule_with;

/// Validate every rule on the rayon pool. Output order matches input order.
pub fn validate_rules(rules: &[Rule], config: &ValidatorConfig) -> Vec<(RuleId, ValidationResult)> {
    let results: Vec<_> = rules
        .par_iter()
        .map(|rule| (rule.id.clone(), validate_rule_with(rule, config)))
        .collect();

    let invalid = results.iter().filter(|(_, r)| !r.valid).count();
    info!(rules = rules.len(), invalid, "batch validation complete");
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConditionType, Operator, RuleCondition, RuleGroup};

    #[test]
    fn preserves_order_and_verdicts() {
        let rules: Vec<Rule> = (0..50)
            .map(|i| {
                let group = if i % 7 == 0 {
                    RuleGroup::and("empty")
                } else {
                    RuleGroup::and("root").with_condition(RuleCondition::new(
                        "c",
                        ConditionType::Indicator,
                        "RSI",
                        Operator::LessThan,
                        30.0,
                    ))
                };
                Rule::new(format!("r{i}"), "rule", group)
            })
            .collect();

        let results = validate_rules(&rules, &ValidatorConfig::default());
        assert_eq!(results.len(), 50);
        for (i, (id, result)) in results.iter().enumerate() {
            assert_eq!(id.0, format!("r{i}"));
            assert_eq!(result.valid, i % 7 != 0);
        }
    }

    #[test]
    fn empty_batch() {
        assert!(validate_rules(&[], &ValidatorConfig::default()).is_empty());
    }
}
