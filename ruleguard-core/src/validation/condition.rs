//! Leaf condition validation.
//!
//! Order of checks: structure (required properties), operator support, value
//! type and range, `between` ordering, then advisory thresholds. Everything is
//! reported; nothing panics on malformed input.

use crate::domain::{ConditionType, ConditionValue, Operator, RuleCondition};

use super::result::ValidationResult;
use super::semantics::{field_domain, FieldDomain, ValueType, KNOWN_TIMEFRAMES};

/// Validate a single leaf condition.
pub fn validate_condition(condition: &RuleCondition) -> ValidationResult {
    let mut result = ValidationResult::new();
    let field = condition.field.trim();

    // ── Structure ──
    let condition_type = match condition.condition_type {
        None => {
            result.add_error("Condition type is required");
            None
        }
        Some(ConditionType::Unknown) => {
            result.add_error("Condition type is not recognised");
            None
        }
        Some(t) => Some(t),
    };
    if field.is_empty() {
        result.add_error("Condition field is required");
    }
    let operator = match condition.operator {
        None => {
            result.add_error("Condition operator is required");
            None
        }
        Some(Operator::Unknown) => {
            result.add_error("Condition operator is not recognised");
            None
        }
        Some(op) => Some(op),
    };
    let value = match &condition.value {
        Some(v) if !v.is_blank() => Some(v),
        _ => {
            result.add_error("Condition value is required");
            None
        }
    };

    if field.is_empty() {
        return result;
    }

    // ── Semantics ──
    match field_domain(field) {
        Some(domain) => {
            if let Some(t) = condition_type {
                if !domain.kind.accepts(t) {
                    result.add_warning(format!(
                        "Field '{field}' belongs to the {} family but the condition type is '{t}'",
                        domain.kind.label()
                    ));
                }
            }
            if let Some(op) = operator {
                if !domain.operators.contains(&op) {
                    result.add_error(format!(
                        "Operator '{op}' is not supported for field '{field}'"
                    ));
                }
            }
            if let Some(v) = value {
                check_value_type(field, v, domain, &mut result);
            }
        }
        None => result.add_warning(format!(
            "Unknown field '{field}': range checks skipped"
        )),
    }

    if operator == Some(Operator::Between) {
        check_between(field, condition, &mut result);
    }

    if let Some(tf) = condition.timeframe.as_deref() {
        if !KNOWN_TIMEFRAMES.contains(&tf) {
            result.add_warning(format!("Timeframe '{tf}' is not recognised"));
        }
    }

    result
}

fn check_value_type(
    field: &str,
    value: &ConditionValue,
    domain: &FieldDomain,
    result: &mut ValidationResult,
) {
    match domain.value_type {
        ValueType::Number => match value.as_number() {
            Some(v) => check_range(field, "value", v, domain, result),
            None => result.add_error(format!("Value for '{field}' must be a number")),
        },
        ValueType::String => {
            if value.as_text().is_none() {
                result.add_error(format!("Value for '{field}' must be text"));
            }
        }
        ValueType::Boolean => {
            let ok = match value {
                ConditionValue::Number(n) => *n == 0.0 || *n == 1.0,
                ConditionValue::Text(s) => {
                    s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("false")
                }
            };
            if !ok {
                result.add_error(format!("Value for '{field}' must be true or false"));
            }
        }
    }
}

/// Range check plus advisory extremes for one numeric threshold.
fn check_range(
    field: &str,
    label: &str,
    v: f64,
    domain: &FieldDomain,
    result: &mut ValidationResult,
) {
    if !v.is_finite() {
        result.add_error(format!("{field} {label} must be a finite number"));
        return;
    }
    if let Some(min) = domain.min {
        if v < min {
            result.add_error(format!(
                "{field} {label} {v} is below the minimum of {min}"
            ));
            return;
        }
    }
    if let Some(max) = domain.max {
        if v > max {
            result.add_error(format!(
                "{field} {label} {v} is above the maximum of {max}"
            ));
            return;
        }
    }
    if let Some(high) = domain.rarely_above {
        if v > high {
            result.add_warning(format!(
                "{field} {label} {v} is above {high} and rarely triggers"
            ));
        }
    }
    if let Some(low) = domain.rarely_below {
        if v < low {
            result.add_warning(format!(
                "{field} {label} {v} is below {low} and rarely triggers"
            ));
        }
    }
}

fn check_between(field: &str, condition: &RuleCondition, result: &mut ValidationResult) {
    let Some(upper) = condition.value2 else {
        result.add_error("Operator 'between' requires a second value (value2)");
        return;
    };

    if let Some(domain) = field_domain(field) {
        if domain.value_type == ValueType::Number {
            check_range(field, "value2", upper, domain, result);
        }
    }

    if let Some(lower) = condition.numeric_value() {
        if lower >= upper {
            result.add_error(format!(
                "Operator 'between' needs value ({lower}) to be less than value2 ({upper})"
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rsi(op: Operator, v: f64) -> RuleCondition {
        RuleCondition::new("c", ConditionType::Indicator, "RSI", op, v)
    }

    #[test]
    fn complete_condition_is_clean() {
        let r = validate_condition(&rsi(Operator::LessThan, 30.0));
        assert!(r.is_clean(), "{r:?}");
    }

    #[test]
    fn missing_properties_are_structural_errors() {
        let c: RuleCondition = serde_json::from_str(r#"{"id": "c"}"#).unwrap();
        let r = validate_condition(&c);
        assert!(!r.valid);
        assert_eq!(
            r.errors,
            vec![
                "Condition type is required",
                "Condition field is required",
                "Condition operator is required",
                "Condition value is required",
            ]
        );
    }

    #[test]
    fn rsi_out_of_range_names_the_bound() {
        let r = validate_condition(&rsi(Operator::GreaterThan, 120.0));
        assert!(!r.valid);
        assert_eq!(r.errors, vec!["RSI value 120 is above the maximum of 100"]);

        let r = validate_condition(&rsi(Operator::GreaterThan, -5.0));
        assert_eq!(r.errors, vec!["RSI value -5 is below the minimum of 0"]);
    }

    #[test]
    fn rsi_extremes_warn_without_blocking() {
        let r = validate_condition(&rsi(Operator::GreaterThan, 95.0));
        assert!(r.valid);
        assert_eq!(r.warnings.len(), 1);
        assert!(r.warnings[0].contains("rarely triggers"));

        let r = validate_condition(&rsi(Operator::LessThan, 5.0));
        assert!(r.valid);
        assert!(r.warnings[0].contains("below 10"));
    }

    #[test]
    fn between_requires_ordered_second_value() {
        let missing = RuleCondition::new("c", ConditionType::Indicator, "RSI", Operator::Between, 30.0);
        let r = validate_condition(&missing);
        assert!(!r.valid);
        assert!(r.errors[0].contains("value2"));

        let reversed = RuleCondition::between("c", ConditionType::Indicator, "RSI", 70.0, 30.0);
        assert!(!validate_condition(&reversed).valid);

        let equal = RuleCondition::between("c", ConditionType::Indicator, "RSI", 50.0, 50.0);
        assert!(!validate_condition(&equal).valid);

        let ok = RuleCondition::between("c", ConditionType::Indicator, "RSI", 30.0, 70.0);
        assert!(validate_condition(&ok).valid);
    }

    #[test]
    fn rsi_value2_is_range_checked() {
        let c = RuleCondition::between("c", ConditionType::Indicator, "RSI", 30.0, 130.0);
        let r = validate_condition(&c);
        assert_eq!(r.errors, vec!["RSI value2 130 is above the maximum of 100"]);
    }

    #[test]
    fn value2_is_ignored_for_other_operators() {
        let c = rsi(Operator::GreaterThan, 50.0).with_value2(10.0);
        assert!(validate_condition(&c).is_clean());
    }

    #[test]
    fn negative_volume_ratio_is_an_error() {
        let c = RuleCondition::new("v", ConditionType::Volume, "volume_ratio", Operator::GreaterThan, -1.0);
        assert!(!validate_condition(&c).valid);

        let spike = RuleCondition::new("v", ConditionType::Volume, "volume_ratio", Operator::GreaterThan, 7.0);
        let r = validate_condition(&spike);
        assert!(r.valid);
        assert!(r.warnings[0].contains("rarely triggers"));
    }

    #[test]
    fn categorical_fields_reject_ordering_operators() {
        let c = RuleCondition::new("s", ConditionType::Portfolio, "sector", Operator::GreaterThan, "Energy");
        let r = validate_condition(&c);
        assert_eq!(r.errors, vec!["Operator 'greater_than' is not supported for field 'sector'"]);
    }

    #[test]
    fn non_numeric_value_on_numeric_field() {
        let c = RuleCondition::new("c", ConditionType::Indicator, "RSI", Operator::GreaterThan, "high");
        assert_eq!(validate_condition(&c).errors, vec!["Value for 'RSI' must be a number"]);

        let numeric_text = RuleCondition::new("c", ConditionType::Indicator, "RSI", Operator::GreaterThan, "70");
        assert!(validate_condition(&numeric_text).valid);
    }

    #[test]
    fn unknown_field_and_timeframe_only_warn() {
        let c = RuleCondition::new("c", ConditionType::Indicator, "moon_phase", Operator::Equals, 1.0)
            .with_timeframe("3d");
        let r = validate_condition(&c);
        assert!(r.valid);
        assert_eq!(r.warnings.len(), 2);
    }

    #[test]
    fn type_mismatch_warns() {
        let c = RuleCondition::new("c", ConditionType::News, "RSI", Operator::LessThan, 30.0);
        let r = validate_condition(&c);
        assert!(r.valid);
        assert!(r.warnings[0].contains("oscillator family"));
    }
}
