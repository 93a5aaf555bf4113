use serde::{Deserialize, Serialize};

/// Verdict shared by every validator.
///
/// `valid` is false iff `errors` or `conflicts` is non-empty; warnings never
/// affect validity. Use the `add_*` methods so the flag stays in sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub conflicts: Vec<String>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationResult {
    /// An empty, valid result.
    pub fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            conflicts: Vec::new(),
        }
    }

    /// A result holding a single error.
    pub fn failure(error: impl Into<String>) -> Self {
        let mut result = Self::new();
        result.add_error(error);
        result
    }

    pub fn add_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
        self.valid = false;
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn add_conflict(&mut self, conflict: impl Into<String>) {
        self.conflicts.push(conflict.into());
        self.valid = false;
    }

    /// Fold `other` into `self`, prefixing every message with `prefix`.
    pub fn absorb(&mut self, prefix: &str, other: ValidationResult) {
        let tag = |m: String| format!("{prefix}{m}");
        self.errors.extend(other.errors.into_iter().map(tag));
        self.warnings.extend(other.warnings.into_iter().map(tag));
        self.conflicts.extend(other.conflicts.into_iter().map(tag));
        self.refresh();
    }

    /// Recompute `valid` from the message lists.
    pub fn refresh(&mut self) {
        self.valid = self.errors.is_empty() && self.conflicts.is_empty();
    }

    /// True if there is nothing to report at all, warnings included.
    pub fn is_clean(&self) -> bool {
        self.valid && self.warnings.is_empty()
    }

    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    /// Total number of messages across all severities.
    pub fn message_count(&self) -> usize {
        self.errors.len() + self.warnings.len() + self.conflicts.len()
    }
}
