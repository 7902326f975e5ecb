use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Lifecycle state of a work-plan activity.
///
/// `Pending` is the only state an activity can be created in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "activity_state", rename_all = "SCREAMING_SNAKE_CASE")
)]
pub enum ActivityState {
    Pending,
    InProgress,
    Completed,
    PendingSupervisorReview,
    PendingLegalReview,
    LegalRejectedWithNotes,
    LegalApproved,
    Cancelled,
    Overdue,
}

impl ActivityState {
    pub const ALL: [ActivityState; 9] = [
        ActivityState::Pending,
        ActivityState::InProgress,
        ActivityState::Completed,
        ActivityState::PendingSupervisorReview,
        ActivityState::PendingLegalReview,
        ActivityState::LegalRejectedWithNotes,
        ActivityState::LegalApproved,
        ActivityState::Cancelled,
        ActivityState::Overdue,
    ];

    /// Locked states only leave through a privileged reopen.
    pub fn is_locked(self) -> bool {
        matches!(
            self,
            ActivityState::Completed | ActivityState::Cancelled | ActivityState::LegalApproved
        )
    }

    /// Closed states are excluded from the deadline urgency buckets.
    pub fn is_closed(self) -> bool {
        self.is_locked()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActivityState::Pending => "PENDING",
            ActivityState::InProgress => "IN_PROGRESS",
            ActivityState::Completed => "COMPLETED",
            ActivityState::PendingSupervisorReview => "PENDING_SUPERVISOR_REVIEW",
            ActivityState::PendingLegalReview => "PENDING_LEGAL_REVIEW",
            ActivityState::LegalRejectedWithNotes => "LEGAL_REJECTED_WITH_NOTES",
            ActivityState::LegalApproved => "LEGAL_APPROVED",
            ActivityState::Cancelled => "CANCELLED",
            ActivityState::Overdue => "OVERDUE",
        }
    }
}

impl std::fmt::Display for ActivityState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityState {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActivityState::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or(())
    }
}
