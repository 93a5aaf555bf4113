//! Indicator configuration validation.
//!
//! Flat sibling of the group validator: parameter presence and ranges first,
//! cross-parameter logic second, dependencies between indicators third, chart
//! clutter heuristics last.

use std::collections::{BTreeSet, HashSet};

use tracing::debug;

use crate::config::ValidatorConfig;
use crate::domain::{IndicatorConfig, ParamValue};

use super::result::ValidationResult;
use super::semantics::{
    canonical_indicator, indicator_dependencies, indicator_rule, IndicatorFamily, IndicatorRule,
    ValueType,
};

/// Validate a set of active indicators with default thresholds.
pub fn validate_indicator_set(configs: &[IndicatorConfig]) -> ValidationResult {
    validate_indicator_set_with(configs, &ValidatorConfig::default())
}

pub fn validate_indicator_set_with(
    configs: &[IndicatorConfig],
    config: &ValidatorConfig,
) -> ValidationResult {
    let mut result = ValidationResult::new();

    for indicator in configs {
        let name = indicator.name.trim();
        if name.is_empty() {
            result.add_error("Indicator name is required");
            continue;
        }
        match indicator_rule(name) {
            Some(rule) => {
                check_params(name, indicator, rule, &mut result);
                check_cross_params(name, indicator, config, &mut result);
            }
            None => result.add_warning(format!(
                "Unknown indicator '{name}': parameters not checked"
            )),
        }
    }

    check_dependencies(configs, &mut result);
    check_clutter(configs, config, &mut result);

    debug!(
        indicators = configs.len(),
        valid = result.valid,
        errors = result.errors.len(),
        warnings = result.warnings.len(),
        "validated indicator set"
    );
    result
}

fn check_params(
    name: &str,
    indicator: &IndicatorConfig,
    rule: &IndicatorRule,
    result: &mut ValidationResult,
) {
    for domain in rule.params {
        let Some(value) = indicator.params.get(domain.name) else {
            if domain.required {
                result.add_error(format!(
                    "{name}: missing required parameter '{}'",
                    domain.name
                ));
            }
            continue;
        };

        match domain.value_type {
            ValueType::Number => {
                let Some(n) = value.as_number() else {
                    result.add_error(format!(
                        "{name}: parameter '{}' must be a number",
                        domain.name
                    ));
                    continue;
                };
                if domain.integer && n.fract() != 0.0 {
                    result.add_error(format!(
                        "{name}: parameter '{}' must be a whole number, got {n}",
                        domain.name
                    ));
                }
                if let Some(min) = domain.min.filter(|min| n < *min) {
                    result.add_error(format!(
                        "{name}: parameter '{}' value {n} is below the minimum of {min}",
                        domain.name
                    ));
                } else if let Some(max) = domain.max.filter(|max| n > *max) {
                    result.add_error(format!(
                        "{name}: parameter '{}' value {n} is above the maximum of {max}",
                        domain.name
                    ));
                }
            }
            ValueType::String => {
                if matches!(value, ParamValue::Number(_)) {
                    result.add_error(format!(
                        "{name}: parameter '{}' must be text",
                        domain.name
                    ));
                }
            }
            ValueType::Boolean => {}
        }
    }

    for key in indicator.params.keys() {
        if rule.param(key).is_none() {
            result.add_warning(format!("{name}: unknown parameter '{key}' ignored"));
        }
    }
}

fn check_cross_params(
    name: &str,
    indicator: &IndicatorConfig,
    config: &ValidatorConfig,
    result: &mut ValidationResult,
) {
    match canonical_indicator(name) {
        Some("RSI") => {
            if let (Some(ob), Some(os)) = (indicator.number("overbought"), indicator.number("oversold")) {
                if ob <= os {
                    result.add_error(format!(
                        "{name}: overbought ({ob}) must be greater than oversold ({os})"
                    ));
                } else if ob - os < config.min_rsi_band_gap {
                    result.add_warning(format!(
                        "{name}: overbought/oversold gap of {} is narrower than {} and will signal often",
                        ob - os,
                        config.min_rsi_band_gap
                    ));
                }
            }
        }
        Some("MACD") => {
            if let (Some(fast), Some(slow)) = (indicator.number("fast"), indicator.number("slow")) {
                if fast >= slow {
                    result.add_error(format!(
                        "{name}: fast period ({fast}) must be less than slow period ({slow})"
                    ));
                }
            }
        }
        _ => {}
    }
}

fn check_dependencies(configs: &[IndicatorConfig], result: &mut ValidationResult) {
    let active: HashSet<&str> = configs
        .iter()
        .filter_map(|c| canonical_indicator(c.name.trim()))
        .collect();

    let mut reported = BTreeSet::new();
    for indicator in configs {
        let name = indicator.name.trim();
        for dep in indicator_dependencies(name) {
            if !active.contains(dep) && reported.insert((name, *dep)) {
                result.add_error(format!("'{name}' requires '{dep}' to be active"));
            }
        }
    }
}

fn check_clutter(configs: &[IndicatorConfig], config: &ValidatorConfig, result: &mut ValidationResult) {
    let mut rsi_count = 0;
    let mut ma_count = 0;
    for indicator in configs {
        let name = indicator.name.trim();
        if canonical_indicator(name) == Some("RSI") {
            rsi_count += 1;
        }
        if indicator_rule(name).is_some_and(|r| r.family == IndicatorFamily::MovingAverage) {
            ma_count += 1;
        }
    }

    if rsi_count > config.max_rsi_instances {
        result.add_warning(format!(
            "{rsi_count} RSI indicators are active; more than {} clutters the chart",
            config.max_rsi_instances
        ));
    }
    if ma_count > config.max_moving_averages {
        result.add_warning(format!(
            "{ma_count} moving averages are active; more than {} clutters the chart",
            config.max_moving_averages
        ));
    }
}
