//! AND-group conflict detection.
//!
//! Pairwise check for same-field conditions that can never hold together. The
//! operator logic lives in a lookup table keyed by `(Operator, Operator)`; a pair
//! with no entry for `(a, b)` is retried as `(b, a)` with swapped operands, and a
//! pair with no entry either way never conflicts.
//!
//! Scope: only conditions sharing a field, only within one AND group, only two at
//! a time. Conflicts across different but related fields, three-way interactions,
//! and interactions with nested subgroups are not detected.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::LazyLock;

use tracing::trace;

use crate::domain::{ConditionValue, Operator, RuleCondition};

use super::semantics::canonical_field;

/// A condition's threshold as seen by the conflict table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operand<'a> {
    Number(f64),
    Range { lower: f64, upper: f64 },
    Text(&'a str),
}

impl Operand<'_> {
    fn number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    fn range(&self) -> Option<(f64, f64)> {
        match self {
            Self::Range { lower, upper } => Some((*lower, *upper)),
            _ => None,
        }
    }
}

/// Returns true when the two operands can never both be satisfied.
type Comparator = for<'a, 'b> fn(&Operand<'a>, &Operand<'b>) -> bool;

fn numbers(a: &Operand<'_>, b: &Operand<'_>) -> Option<(f64, f64)> {
    Some((a.number()?, b.number()?))
}

fn gt_lt(a: &Operand<'_>, b: &Operand<'_>) -> bool {
    numbers(a, b).is_some_and(|(v1, v2)| v1 >= v2)
}

fn lt_gt(a: &Operand<'_>, b: &Operand<'_>) -> bool {
    numbers(a, b).is_some_and(|(v1, v2)| v1 <= v2)
}

fn eq_eq(a: &Operand<'_>, b: &Operand<'_>) -> bool {
    match (a, b) {
        (Operand::Number(v1), Operand::Number(v2)) => v1 != v2,
        (Operand::Text(s1), Operand::Text(s2)) => !s1.eq_ignore_ascii_case(s2),
        _ => false,
    }
}

fn eq_gt(a: &Operand<'_>, b: &Operand<'_>) -> bool {
    numbers(a, b).is_some_and(|(v, t)| v <= t)
}

fn eq_lt(a: &Operand<'_>, b: &Operand<'_>) -> bool {
    numbers(a, b).is_some_and(|(v, t)| v >= t)
}

fn between_gt(a: &Operand<'_>, b: &Operand<'_>) -> bool {
    match (a.range(), b.number()) {
        (Some((_, hi)), Some(t)) => t >= hi,
        _ => false,
    }
}

fn between_lt(a: &Operand<'_>, b: &Operand<'_>) -> bool {
    match (a.range(), b.number()) {
        (Some((lo, _)), Some(t)) => t <= lo,
        _ => false,
    }
}

static CONFLICT_RULES: LazyLock<HashMap<(Operator, Operator), Comparator>> = LazyLock::new(|| {
    use Operator::*;
    HashMap::from([
        ((GreaterThan, LessThan), gt_lt as Comparator),
        ((LessThan, GreaterThan), lt_gt as Comparator),
        ((Equals, Equals), eq_eq as Comparator),
        ((Equals, GreaterThan), eq_gt as Comparator),
        ((Equals, LessThan), eq_lt as Comparator),
        ((Between, GreaterThan), between_gt as Comparator),
        ((Between, LessThan), between_lt as Comparator),
    ])
});

/// Operator pairs the table knows about, for diagnostics and tests.
pub fn conflict_rule_keys() -> Vec<(Operator, Operator)> {
    let mut keys: Vec<_> = CONFLICT_RULES.keys().copied().collect();
    keys.sort();
    keys
}

/// Extract the operand of a condition, or `None` if it cannot take part in
/// conflict detection (missing operator, missing or malformed value).
pub fn operand(condition: &RuleCondition) -> Option<Operand<'_>> {
    let value = condition.value.as_ref()?;
    match condition.operator? {
        Operator::Unknown => None,
        Operator::Between => {
            let lower = value.as_number()?;
            let upper = condition.value2?;
            (lower < upper).then_some(Operand::Range { lower, upper })
        }
        _ => match (value.as_number(), value) {
            (Some(n), _) => Some(Operand::Number(n)),
            (None, ConditionValue::Text(s)) => Some(Operand::Text(s.trim())),
            (None, ConditionValue::Number(_)) => None,
        },
    }
}

/// True when two conditions on the same field can never both hold.
pub fn pair_conflicts(a: &RuleCondition, b: &RuleCondition) -> bool {
    let (Some(op_a), Some(op_b)) = (a.operator, b.operator) else {
        return false;
    };
    let (Some(x), Some(y)) = (operand(a), operand(b)) else {
        return false;
    };
    if let Some(cmp) = CONFLICT_RULES.get(&(op_a, op_b)) {
        cmp(&x, &y)
    } else if let Some(cmp) = CONFLICT_RULES.get(&(op_b, op_a)) {
        cmp(&y, &x)
    } else {
        false
    }
}

/// Detect mutually unsatisfiable pairs among AND-combined conditions.
///
/// Returns one human-readable message per conflicting pair; empty means no
/// conflict. Field names are compared by their canonical spelling, so `RSI` and
/// `rsi` share a bucket. Fields are reported in order of first appearance.
pub fn detect_and_conflicts(conditions: &[RuleCondition]) -> Vec<String> {
    let mut by_field: Vec<(Cow<'static, str>, Vec<&RuleCondition>)> = Vec::new();
    for condition in conditions {
        if condition.field.trim().is_empty() {
            continue;
        }
        let field = canonical_field(&condition.field);
        match by_field.iter().position(|(f, _)| *f == field) {
            Some(i) => by_field[i].1.push(condition),
            None => by_field.push((field, vec![condition])),
        }
    }

    let mut conflicts = Vec::new();
    for (field, bucket) in by_field.iter().filter(|(_, b)| b.len() >= 2) {
        for (i, a) in bucket.iter().enumerate() {
            for b in &bucket[i + 1..] {
                if pair_conflicts(a, b) {
                    trace!(field = %field, first = %a.describe(), second = %b.describe(), "conflict");
                    conflicts.push(format!(
                        "Conflicting conditions on {field}: '{}' and '{}' can never both be true",
                        a.describe(),
                        b.describe()
                    ));
                }
            }
        }
    }
    conflicts
}
