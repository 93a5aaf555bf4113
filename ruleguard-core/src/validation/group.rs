//! Recursive group tree validation.
//!
//! Walks the whole tree and returns every problem at once; the only early exit
//! is the nesting ceiling, below which nothing is inspected.

use tracing::debug;

use crate::domain::{Logic, RuleGroup};

use super::condition::validate_condition;
use super::conflict::detect_and_conflicts;
use super::result::ValidationResult;
use super::semantics::canonical_field;

/// Default nesting ceiling; the root group is depth 0.
pub const DEFAULT_MAX_NESTING: usize = 3;

/// Validate a tree with the default nesting ceiling.
pub fn validate_rule_group(group: &RuleGroup) -> ValidationResult {
    validate_rule_group_with(group, DEFAULT_MAX_NESTING)
}

/// Validate a tree with an explicit nesting ceiling.
pub fn validate_rule_group_with(group: &RuleGroup, max_nesting: usize) -> ValidationResult {
    let result = validate_rule_group_at(group, max_nesting, 0);
    debug!(
        group = %group.id,
        conditions = group.count_conditions(),
        valid = result.valid,
        errors = result.errors.len(),
        warnings = result.warnings.len(),
        conflicts = result.conflicts.len(),
        "validated rule group"
    );
    result
}

/// Validate `group` as if it sat at `depth` in a larger tree.
pub fn validate_rule_group_at(group: &RuleGroup, max_nesting: usize, depth: usize) -> ValidationResult {
    let mut result = ValidationResult::new();

    if depth > max_nesting {
        result.add_error(format!("Maximum nesting depth of {max_nesting} exceeded"));
        return result;
    }

    for (i, condition) in group.conditions.iter().enumerate() {
        result.absorb(&format!("Condition {}: ", i + 1), validate_condition(condition));
    }

    match group.logic {
        Logic::And => {
            for conflict in detect_and_conflicts(&group.conditions) {
                result.add_conflict(conflict);
            }
        }
        Logic::Or => {
            if group.child_count() == 1 {
                result.add_warning("OR group has a single child, so OR has no effect");
            }
        }
    }

    warn_duplicates(group, &mut result);

    for (i, nested) in group.groups.iter().enumerate() {
        result.absorb(
            &format!("Nested group {}: ", i + 1),
            validate_rule_group_at(nested, max_nesting, depth + 1),
        );
    }

    if group.is_empty() {
        result.add_error("Group must contain at least one condition or nested group");
    }

    result
}

/// Identical conditions (ignoring ids and field spelling) within one group add nothing.
fn warn_duplicates(group: &RuleGroup, result: &mut ValidationResult) {
    let conditions = &group.conditions;
    for (j, later) in conditions.iter().enumerate() {
        let duplicate_of = conditions[..j].iter().position(|earlier| {
            canonical_field(&earlier.field) == canonical_field(&later.field)
                && earlier.operator == later.operator
                && earlier.value == later.value
                && earlier.value2 == later.value2
                && earlier.timeframe == later.timeframe
        });
        if let Some(i) = duplicate_of {
            result.add_warning(format!(
                "Condition {} duplicates condition {}",
                j + 1,
                i + 1
            ));
        }
    }
}
