//! Improvement advisor.
//!
//! Heuristic, non-blocking suggestions over a whole tree. Suggestions are
//! computed whether or not the tree is valid; callers usually show them only
//! for valid trees.

use std::collections::BTreeSet;

use crate::config::ValidatorConfig;
use crate::domain::RuleGroup;

use super::semantics::{field_kind, is_risk_field, FieldKind};

pub const SUGGEST_VOLUME: &str =
    "Consider adding a volume confirmation condition to filter out weak price moves";
pub const SUGGEST_RSI_WITH_MACD: &str =
    "Consider confirming MACD signals with an RSI condition";
pub const SUGGEST_SINGLE_CONDITION: &str =
    "Single-condition rules may produce false signals; consider adding a confirming condition";
pub const SUGGEST_RISK: &str =
    "Consider adding a stop_loss or safety_line condition for risk management";

/// Total number of leaf conditions in the tree.
pub fn count_conditions(group: &RuleGroup) -> usize {
    group.count_conditions()
}

/// Every field referenced in the tree.
pub fn used_fields(group: &RuleGroup) -> BTreeSet<String> {
    group.used_fields()
}

/// Suggestions with the default overfitting threshold.
pub fn suggest_improvements(group: &RuleGroup) -> Vec<String> {
    suggest_improvements_with(group, &ValidatorConfig::default())
}

pub fn suggest_improvements_with(group: &RuleGroup, config: &ValidatorConfig) -> Vec<String> {
    let fields = used_fields(group);
    let total = count_conditions(group);
    let has_kind = |kind: FieldKind| fields.iter().any(|f| field_kind(f) == Some(kind));
    let has_field = |name: &str| fields.iter().any(|f| f.eq_ignore_ascii_case(name));

    let mut suggestions = Vec::new();

    let has_price = has_kind(FieldKind::Price);
    if has_price && !has_kind(FieldKind::Volume) {
        suggestions.push(SUGGEST_VOLUME.to_string());
    }
    if has_field("MACD") && !has_field("RSI") {
        suggestions.push(SUGGEST_RSI_WITH_MACD.to_string());
    }
    if total == 1 {
        suggestions.push(SUGGEST_SINGLE_CONDITION.to_string());
    }
    if total > config.overfit_condition_limit {
        suggestions.push(format!(
            "Rules with more than {} conditions ({total} here) risk overfitting to past data",
            config.overfit_condition_limit
        ));
    }
    if has_price && !fields.iter().any(|f| is_risk_field(f)) {
        suggestions.push(SUGGEST_RISK.to_string());
    }

    suggestions
}
