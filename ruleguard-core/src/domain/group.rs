//! Internal nodes of a rule tree.
//!
//! Groups are values: editing a tree means building a new node with
//! `with_condition` / `with_group`, never mutating one in place.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::condition::RuleCondition;
use super::ids::{GroupId, TreeFingerprint};

/// How a group combines its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Logic {
    #[serde(rename = "AND")]
    And,
    #[serde(rename = "OR")]
    Or,
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => f.write_str("AND"),
            Self::Or => f.write_str("OR"),
        }
    }
}

/// A node combining conditions and nested groups under one logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleGroup {
    #[serde(default)]
    pub id: GroupId,
    pub logic: Logic,
    #[serde(default)]
    pub conditions: Vec<RuleCondition>,
    #[serde(default)]
    pub groups: Vec<RuleGroup>,
}

impl RuleGroup {
    pub fn new(id: impl Into<String>, logic: Logic) -> Self {
        Self {
            id: GroupId::new(id),
            logic,
            conditions: Vec::new(),
            groups: Vec::new(),
        }
    }

    pub fn and(id: impl Into<String>) -> Self {
        Self::new(id, Logic::And)
    }

    pub fn or(id: impl Into<String>) -> Self {
        Self::new(id, Logic::Or)
    }

    /// New group with `condition` appended.
    pub fn with_condition(mut self, condition: RuleCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// New group with `group` appended as a nested child.
    pub fn with_group(mut self, group: RuleGroup) -> Self {
        self.groups.push(group);
        self
    }

    /// True when the group has neither conditions nor nested groups.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty() && self.groups.is_empty()
    }

    /// Number of direct children (conditions + nested groups).
    pub fn child_count(&self) -> usize {
        self.conditions.len() + self.groups.len()
    }

    /// Total number of leaf conditions in the whole tree.
    pub fn count_conditions(&self) -> usize {
        self.conditions.len()
            + self
                .groups
                .iter()
                .map(RuleGroup::count_conditions)
                .sum::<usize>()
    }

    /// Every field name referenced anywhere in the tree.
    pub fn used_fields(&self) -> BTreeSet<String> {
        let mut fields = BTreeSet::new();
        self.collect_fields(&mut fields);
        fields
    }

    fn collect_fields(&self, out: &mut BTreeSet<String>) {
        for condition in &self.conditions {
            if !condition.field.is_empty() {
                out.insert(condition.field.clone());
            }
        }
        for group in &self.groups {
            group.collect_fields(out);
        }
    }

    /// Depth of the deepest group, where a group with no nested groups is 0.
    pub fn max_depth(&self) -> usize {
        self.groups
            .iter()
            .map(|g| g.max_depth() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Every condition in the tree, depth-first.
    pub fn all_conditions(&self) -> Vec<&RuleCondition> {
        let mut out = Vec::with_capacity(self.conditions.len());
        self.collect_conditions(&mut out);
        out
    }

    fn collect_conditions<'a>(&'a self, out: &mut Vec<&'a RuleCondition>) {
        out.extend(self.conditions.iter());
        for group in &self.groups {
            group.collect_conditions(out);
        }
    }

    /// Structural fingerprint of the tree (canonical JSON → BLAKE3).
    pub fn fingerprint(&self) -> TreeFingerprint {
        // Struct fields serialize in declaration order, so the JSON is canonical.
        let json = serde_json::to_vec(self).unwrap_or_default();
        TreeFingerprint::from_bytes(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::condition::{ConditionType, Operator};

    fn cond(id: &str, field: &str, op: Operator, v: f64) -> RuleCondition {
        RuleCondition::new(id, ConditionType::Indicator, field, op, v)
    }

    fn sample_tree() -> RuleGroup {
        RuleGroup::and("root")
            .with_condition(cond("c1", "RSI", Operator::LessThan, 30.0))
            .with_group(
                RuleGroup::or("g1")
                    .with_condition(cond("c2", "MACD", Operator::CrossesAbove, 0.0))
                    .with_group(
                        RuleGroup::and("g2")
                            .with_condition(cond("c3", "volume_ratio", Operator::GreaterThan, 1.5)),
                    ),
            )
    }

    #[test]
    fn counts_and_fields_walk_the_whole_tree() {
        let tree = sample_tree();
        assert_eq!(tree.count_conditions(), 3);
        let fields: Vec<_> = tree.used_fields().into_iter().collect();
        assert_eq!(fields, vec!["MACD", "RSI", "volume_ratio"]);
        assert_eq!(tree.max_depth(), 2);
        assert_eq!(tree.all_conditions().len(), 3);
    }

    #[test]
    fn logic_uses_uppercase_wire_names() {
        let json = serde_json::to_string(&RuleGroup::or("g")).unwrap();
        assert!(json.contains("\"logic\":\"OR\""));
        let g: RuleGroup = serde_json::from_str(r#"{"id":"g","logic":"AND"}"#).unwrap();
        assert_eq!(g.logic, Logic::And);
        assert!(g.is_empty());
    }

    #[test]
    fn fingerprint_tracks_edits() {
        let tree = sample_tree();
        assert_eq!(tree.fingerprint(), sample_tree().fingerprint());
        let edited = sample_tree().with_condition(cond("c4", "RSI", Operator::GreaterThan, 10.0));
        assert_ne!(tree.fingerprint(), edited.fingerprint());
    }
}
