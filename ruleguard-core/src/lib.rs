//! RuleGuard Core: validation for trading rule condition trees and indicator sets.
//!
//! This crate contains:
//! - Domain types (conditions, AND/OR groups, rules, actions, templates, indicator configs)
//! - Static field and indicator semantics tables
//! - Condition, conflict, group-tree, rule, and indicator-set validators
//! - The improvement advisor
//! - TOML-loadable validator thresholds
//! - Seams for the preview service and the rule store, with validating guards

pub mod config;
pub mod domain;
pub mod guard;
pub mod preview;
pub mod store;
pub mod validation;

pub use config::{ConfigError, ValidatorConfig};
pub use guard::GuardError;
pub use validation::{
    detect_and_conflicts, suggest_improvements, validate_condition, validate_indicator_set,
    validate_rule, validate_rule_group, validate_rule_group_with, validate_rules, RuleReview,
    RuleValidator, ValidationResult,
};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: everything handed across threads is Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Domain types
        require_send::<domain::RuleCondition>();
        require_sync::<domain::RuleCondition>();
        require_send::<domain::RuleGroup>();
        require_sync::<domain::RuleGroup>();
        require_send::<domain::Rule>();
        require_sync::<domain::Rule>();
        require_send::<domain::RuleTemplate>();
        require_sync::<domain::RuleTemplate>();
        require_send::<domain::IndicatorConfig>();
        require_sync::<domain::IndicatorConfig>();

        // Validation
        require_send::<ValidationResult>();
        require_sync::<ValidationResult>();
        require_send::<RuleValidator>();
        require_sync::<RuleValidator>();
        require_send::<ValidatorConfig>();
        require_sync::<ValidatorConfig>();

        // Seams
        require_send::<preview::PreviewRequest>();
        require_sync::<preview::PreviewRequest>();
        require_send::<preview::PreviewResponse>();
        require_sync::<preview::PreviewResponse>();
        require_send::<GuardError>();
        require_sync::<GuardError>();
    }

    /// The preview guard works against any trait object.
    #[test]
    fn preview_service_is_object_safe() {
        fn _call(
            service: &dyn preview::PreviewService,
            request: &preview::PreviewRequest,
        ) -> Result<preview::PreviewResponse, preview::PreviewError> {
            service.preview(request)
        }
    }
}
