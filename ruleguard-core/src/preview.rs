//! Preview (backtest) service seam.
//!
//! The service itself lives elsewhere. This module owns the wire types, the
//! trait callers implement, and the guard that validates a tree before it is
//! sent: an invalid tree never reaches the service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ValidatorConfig;
use crate::domain::{BacktestStats, CachedBacktest, RuleGroup};
use crate::guard::GuardError;
use crate::validation::{validate_rule_group_with, ValidationResult};

/// Longest lookback the preview service accepts, in days.
pub const MAX_LOOKBACK_DAYS: u32 = 3650;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewRequest {
    pub symbol: String,
    pub root_group: RuleGroup,
    pub lookback_days: u32,
}

/// One historical bar on which the tree would have fired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleTrigger {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    /// Forward return after the trigger, in percent.
    pub outcome_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PreviewResponse {
    pub backtest_stats: BacktestStats,
    #[serde(default)]
    pub sample_triggers: Vec<SampleTrigger>,
    #[serde(default)]
    pub validation_warnings: Vec<String>,
    #[serde(default)]
    pub conflicts: Vec<String>,
}

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("preview service unavailable: {0}")]
    Unavailable(String),

    #[error("not enough history for {symbol} over {lookback_days} days")]
    InsufficientData { symbol: String, lookback_days: u32 },

    #[error("preview service rejected the request: {0}")]
    Rejected(String),
}

/// Backtest/preview collaborator.
pub trait PreviewService: Send + Sync {
    fn preview(&self, request: &PreviewRequest) -> Result<PreviewResponse, PreviewError>;
}

/// Validate `group` and build a request, refusing invalid trees and parameters.
pub fn prepare_preview(
    symbol: &str,
    group: &RuleGroup,
    lookback_days: u32,
    config: &ValidatorConfig,
) -> Result<PreviewRequest, GuardError> {
    checked_request(symbol, group, lookback_days, config).map(|(request, _)| request)
}

/// Request plus the verdict it passed, so callers never walk the tree twice.
fn checked_request(
    symbol: &str,
    group: &RuleGroup,
    lookback_days: u32,
    config: &ValidatorConfig,
) -> Result<(PreviewRequest, ValidationResult), GuardError> {
    let symbol = symbol.trim();
    if symbol.is_empty() {
        return Err(GuardError::InvalidRequest("symbol is required".into()));
    }
    if !(1..=MAX_LOOKBACK_DAYS).contains(&lookback_days) {
        return Err(GuardError::InvalidRequest(format!(
            "lookback must be between 1 and {MAX_LOOKBACK_DAYS} days, got {lookback_days}"
        )));
    }

    let result = validate_rule_group_with(group, config.max_nesting);
    if !result.valid {
        warn!(symbol, errors = result.errors.len(), conflicts = result.conflicts.len(), "preview refused");
        return Err(GuardError::Rejected(result));
    }

    let request = PreviewRequest {
        symbol: symbol.to_uppercase(),
        root_group: group.clone(),
        lookback_days,
    };
    Ok((request, result))
}

/// Fold the service's own warnings and conflicts into a local result.
/// Messages already present are not repeated.
pub fn merge_preview_findings(mut result: ValidationResult, response: &PreviewResponse) -> ValidationResult {
    for warning in &response.validation_warnings {
        if !result.warnings.contains(warning) {
            result.add_warning(warning.clone());
        }
    }
    for conflict in &response.conflicts {
        if !result.conflicts.contains(conflict) {
            result.add_conflict(conflict.clone());
        }
    }
    result
}

/// Validate, call the service, and merge its findings into the local verdict.
pub fn run_preview(
    service: &dyn PreviewService,
    symbol: &str,
    group: &RuleGroup,
    lookback_days: u32,
    config: &ValidatorConfig,
) -> Result<(PreviewResponse, ValidationResult), GuardError> {
    let (request, local) = checked_request(symbol, group, lookback_days, config)?;
    let response = service.preview(&request)?;
    debug!(
        symbol = %request.symbol,
        triggers = response.backtest_stats.total_triggers,
        "preview complete"
    );
    let merged = merge_preview_findings(local, &response);
    Ok((response, merged))
}

impl CachedBacktest {
    /// Cache a preview result against the tree it was computed for.
    pub fn from_preview(request: &PreviewRequest, response: &PreviewResponse, computed_at: DateTime<Utc>) -> Self {
        Self {
            fingerprint: request.root_group.fingerprint(),
            symbol: request.symbol.clone(),
            lookback_days: request.lookback_days,
            stats: response.backtest_stats.clone(),
            computed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConditionType, Operator, RuleCondition};

    fn rsi(op: Operator, v: f64) -> RuleCondition {
        RuleCondition::new("c", ConditionType::Indicator, "RSI", op, v)
    }

    #[test]
    fn request_parameters_are_checked() {
        let group = RuleGroup::and("root").with_condition(rsi(Operator::LessThan, 30.0));
        let config = ValidatorConfig::default();

        assert!(matches!(
            prepare_preview(" ", &group, 90, &config),
            Err(GuardError::InvalidRequest(_))
        ));
        assert!(matches!(
            prepare_preview("AAPL", &group, 0, &config),
            Err(GuardError::InvalidRequest(_))
        ));
        assert!(matches!(
            prepare_preview("AAPL", &group, MAX_LOOKBACK_DAYS + 1, &config),
            Err(GuardError::InvalidRequest(_))
        ));

        let request = prepare_preview(" aapl ", &group, 90, &config).unwrap();
        assert_eq!(request.symbol, "AAPL");
        assert_eq!(request.lookback_days, 90);
    }

    #[test]
    fn conflicting_tree_is_refused() {
        let group = RuleGroup::and("root")
            .with_condition(rsi(Operator::GreaterThan, 70.0))
            .with_condition(rsi(Operator::LessThan, 50.0));
        let err = prepare_preview("AAPL", &group, 90, &ValidatorConfig::default()).unwrap_err();
        assert_eq!(err.validation().map(|r| r.conflicts.len()), Some(1));
    }

    #[test]
    fn merge_deduplicates() {
        let mut local = ValidationResult::new();
        local.add_warning("RSI value 95 is above 90 and rarely triggers");

        let response = PreviewResponse {
            validation_warnings: vec![
                "RSI value 95 is above 90 and rarely triggers".into(),
                "Only 2 triggers in the lookback window".into(),
            ],
            conflicts: vec!["x".into(), "x".into()],
            ..PreviewResponse::default()
        };
        let merged = merge_preview_findings(local, &response);
        assert_eq!(merged.warnings.len(), 2);
        assert_eq!(merged.conflicts, vec!["x"]);
        assert!(!merged.valid);
    }

    struct EchoService {
        warnings: Vec<String>,
    }

    impl PreviewService for EchoService {
        fn preview(&self, _request: &PreviewRequest) -> Result<PreviewResponse, PreviewError> {
            Ok(PreviewResponse {
                validation_warnings: self.warnings.clone(),
                ..PreviewResponse::default()
            })
        }
    }

    #[test]
    fn run_preview_keeps_local_verdict_once() {
        let group = RuleGroup::and("root").with_condition(rsi(Operator::GreaterThan, 95.0));
        let config = ValidatorConfig::default();
        let local = validate_rule_group_with(&group, config.max_nesting);
        assert_eq!(local.warnings.len(), 1);

        let mut echoed = local.warnings.clone();
        echoed.push("Only 2 triggers in the lookback window".into());
        let service = EchoService { warnings: echoed.clone() };

        let (_, merged) = run_preview(&service, "spy", &group, 90, &config).unwrap();
        assert!(merged.valid);
        assert_eq!(merged.warnings, echoed);
    }

    #[test]
    fn cached_backtest_tracks_tree() {
        let group = RuleGroup::and("root").with_condition(rsi(Operator::LessThan, 30.0));
        let request = prepare_preview("SPY", &group, 30, &ValidatorConfig::default()).unwrap();
        let cached = CachedBacktest::from_preview(&request, &PreviewResponse::default(), Utc::now());
        assert_eq!(cached.fingerprint, group.fingerprint());
        assert_eq!(cached.symbol, "SPY");
    }
}
