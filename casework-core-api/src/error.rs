use thiserror::Error;

use crate::domain::{ActivityId, ActivityState};

/// Every failure the lifecycle engine reports to its caller.
///
/// Nothing inside the engine recovers from these silently: each one is
/// returned as a typed result. Bulk operations turn per-item errors into
/// entries of their result instead of failing the call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("Not found: activity {0}")]
    NotFound(ActivityId),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition {
        from: ActivityState,
        to: ActivityState,
    },

    #[error("Stale state for activity {activity_id}: expected {expected}, found {}", describe_found(.found))]
    StaleState {
        activity_id: ActivityId,
        expected: ActivityState,
        found: Option<ActivityState>,
    },

    #[error("Missing justification: {operation} requires at least {required} characters, got {actual}")]
    MissingJustification {
        operation: String,
        required: usize,
        actual: usize,
    },

    #[error("Missing evidence: completion requires at least {required} attached evidence file(s), found {found}")]
    MissingEvidence { required: u32, found: u32 },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Timed out after {millis} ms")]
    Timeout { millis: u64 },

    #[error("Cancelled")]
    Cancelled,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

fn describe_found(found: &Option<ActivityState>) -> String {
    match found {
        Some(state) => state.to_string(),
        None => "nothing".to_string(),
    }
}

impl LifecycleError {
    /// True when the failure comes from the data store rather than from
    /// the request itself.
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            LifecycleError::DatabaseError(_) | LifecycleError::Timeout { .. }
        )
    }
}

impl From<validator::ValidationErrors> for LifecycleError {
    fn from(errors: validator::ValidationErrors) -> Self {
        LifecycleError::ValidationError(errors.to_string())
    }
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_state_message_names_both_states() {
        let err = LifecycleError::StaleState {
            activity_id: 42,
            expected: ActivityState::Pending,
            found: Some(ActivityState::InProgress),
        };
        assert_eq!(
            err.to_string(),
            "Stale state for activity 42: expected PENDING, found IN_PROGRESS"
        );
    }

    #[test]
    fn test_missing_justification_message_names_shortfall() {
        let err = LifecycleError::MissingJustification {
            operation: "reopen".to_string(),
            required: 15,
            actual: 4,
        };
        assert!(err.to_string().contains("at least 15 characters, got 4"));
    }

    #[test]
    fn test_infrastructure_classification() {
        assert!(LifecycleError::DatabaseError("down".into()).is_infrastructure());
        assert!(LifecycleError::Timeout { millis: 10 }.is_infrastructure());
        assert!(!LifecycleError::NotFound(1).is_infrastructure());
        assert!(!LifecycleError::Cancelled.is_infrastructure());
    }
}
