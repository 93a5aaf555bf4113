//! Error type shared by the guards that run validation in front of a collaborator.

use thiserror::Error;

use crate::preview::PreviewError;
use crate::store::StoreError;
use crate::validation::ValidationResult;

/// Why a guarded call did not reach, or failed inside, its collaborator.
#[derive(Debug, Error)]
pub enum GuardError {
    /// The tree or rule failed validation; the collaborator was not called.
    #[error("validation failed with {} error(s) and {} conflict(s)", .0.errors.len(), .0.conflicts.len())]
    Rejected(ValidationResult),

    /// Request parameters outside the tree were unusable.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Preview(#[from] PreviewError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl GuardError {
    /// The validation verdict, if this is a rejection.
    pub fn validation(&self) -> Option<&ValidationResult> {
        match self {
            Self::Rejected(result) => Some(result),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_message_counts_findings() {
        let mut result = ValidationResult::new();
        result.add_error("a");
        result.add_conflict("b");
        result.add_conflict("c");
        let err = GuardError::Rejected(result);
        assert_eq!(err.to_string(), "validation failed with 1 error(s) and 2 conflict(s)");
        assert_eq!(err.validation().map(|r| r.conflicts.len()), Some(2));
        assert!(GuardError::InvalidRequest("x".into()).validation().is_none());
    }
}
