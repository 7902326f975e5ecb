use async_trait::async_trait;
use casework_core_api::{ActivityState, UserId};
use chrono::{DateTime, Utc};
use sqlx::Database;

use crate::models::activity::ActivityModel;
use crate::models::audit::AuditRecordModel;
use crate::models::review::ReviewRecordModel;
use crate::models::transfer::TransferRecordModel;

use super::RepositoryError;

/// A guarded write of one activity.
///
/// `activity` carries the new field values and, in `hash`, the hash that was
/// read before the change. The write applies only if the stored row still
/// has `expected_state` and that hash.
///
/// The audit record and the optional records below are written in the same
/// unit of work as the activity, and only when the write applies.
#[derive(Debug, Clone)]
pub struct ActivityChange {
    pub activity: ActivityModel,
    pub expected_state: ActivityState,
    pub audit: AuditRecordModel,
    pub transfer: Option<TransferRecordModel>,
    pub review: Option<ReviewRecordModel>,
    /// Marks the current review decisions of the activity as superseded
    pub invalidate_reviews: Option<ReviewInvalidation>,
}

impl ActivityChange {
    pub fn new(activity: ActivityModel, expected_state: ActivityState, audit: AuditRecordModel) -> Self {
        Self {
            activity,
            expected_state,
            audit,
            transfer: None,
            review: None,
            invalidate_reviews: None,
        }
    }

    pub fn with_transfer(mut self, record: TransferRecordModel) -> Self {
        self.transfer = Some(record);
        self
    }

    pub fn with_review(mut self, record: ReviewRecordModel) -> Self {
        self.review = Some(record);
        self
    }

    pub fn invalidating_reviews(mut self, invalidated_by: UserId, invalidated_at: DateTime<Utc>) -> Self {
        self.invalidate_reviews = Some(ReviewInvalidation {
            invalidated_by,
            invalidated_at,
        });
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewInvalidation {
    pub invalidated_by: UserId,
    pub invalidated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CasOutcome {
    /// The write went through; the sealed activity as stored
    Applied(ActivityModel),
    /// The stored activity changed since it was read
    Stale { current_state: ActivityState },
    /// The activity no longer exists
    Missing,
}

/// Compare-and-swap write of an activity's state and fields
///
/// This is the single place the shared `state` field is written. It must be
/// one atomic conditional update at the data-store boundary: two writers that
/// read the same version can never both succeed.
///
/// # Type Parameters
/// * `DB` - The database type (must implement sqlx::Database)
#[async_trait]
pub trait CasUpdateState<DB: Database>: Send + Sync {
    async fn cas_update_state(&self, change: ActivityChange) -> Result<CasOutcome, RepositoryError>;
}
