//! Rule persistence seam.
//!
//! Storage is owned by another service; this crate only defines the trait and
//! the validating save path.

use thiserror::Error;
use tracing::{info, warn};

use crate::config::ValidatorConfig;
use crate::domain::{Rule, RuleId};
use crate::guard::GuardError;
use crate::validation::{validate_rule_with, ValidationResult};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("rule not found: {0}")]
    NotFound(RuleId),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// CRUD over persisted rules.
pub trait RuleStore: Send + Sync {
    fn get(&self, id: &RuleId) -> Result<Rule, StoreError>;
    fn list(&self) -> Result<Vec<Rule>, StoreError>;
    /// Insert or replace by id.
    fn save(&self, rule: &Rule) -> Result<(), StoreError>;
    fn delete(&self, id: &RuleId) -> Result<(), StoreError>;
}

/// Validate `rule` and save it only if it is valid.
///
/// Returns the verdict on success so callers can surface warnings.
pub fn save_rule_guarded(
    store: &dyn RuleStore,
    rule: &Rule,
    config: &ValidatorConfig,
) -> Result<ValidationResult, GuardError> {
    let result = validate_rule_with(rule, config);
    if !result.valid {
        warn!(rule = %rule.id, errors = result.errors.len(), conflicts = result.conflicts.len(), "save refused");
        return Err(GuardError::Rejected(result));
    }
    store.save(rule)?;
    info!(rule = %rule.id, warnings = result.warnings.len(), "rule saved");
    Ok(result)
}
