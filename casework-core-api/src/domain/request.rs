use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use validator::{Validate, ValidationError};

use super::activity_state::ActivityState;
use super::ids::UserId;
use super::origin_kind::OriginKind;
use super::team::Team;

/// Upper bound for free-text justifications, observations and comments.
pub const MAX_TEXT_CHARS: u64 = 500;

/// Upper bound for activity titles.
pub const MAX_TITLE_CHARS: u64 = 100;

/// Payload of a new activity. The state is not part of it: activities
/// always start in `PENDING`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NewActivity {
    pub measure_id: i64,
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    pub actor: Team,
    pub responsible_principal: Option<UserId>,
    #[serde(default)]
    pub responsible_secondary: BTreeSet<UserId>,
    pub due_date: NaiveDate,
    pub requires_legal_review: bool,
    pub origin_kind: OriginKind,
    #[serde(default)]
    pub is_draft: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct TransitionRequest {
    pub target: ActivityState,
    #[validate(length(max = 500))]
    pub justification: Option<String>,
    /// State the caller observed. When set, the call fails with a stale
    /// state error if the activity has moved on.
    pub expected_source: Option<ActivityState>,
}

impl TransitionRequest {
    pub fn to(target: ActivityState) -> Self {
        Self {
            target,
            justification: None,
            expected_source: None,
        }
    }

    pub fn with_justification(mut self, justification: impl Into<String>) -> Self {
        self.justification = Some(justification.into());
        self
    }

    pub fn expecting(mut self, source: ActivityState) -> Self {
        self.expected_source = Some(source);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct TransferRequest {
    pub destination: Team,
    pub new_responsible: Option<UserId>,
    #[validate(length(max = 500))]
    pub justification: String,
}

/// Responsible-party change. `None` leaves the field as it is.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_assignment"))]
pub struct AssignmentRequest {
    pub principal: Option<UserId>,
    pub secondaries: Option<BTreeSet<UserId>>,
}

fn validate_assignment(request: &AssignmentRequest) -> Result<(), ValidationError> {
    if request.principal.is_none() && request.secondaries.is_none() {
        let mut error = ValidationError::new("empty_assignment");
        error.message = Some("assignment must change the principal or the secondaries".into());
        return Err(error);
    }
    Ok(())
}
