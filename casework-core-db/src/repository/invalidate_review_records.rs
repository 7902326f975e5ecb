use async_trait::async_trait;
use casework_core_api::{ActivityId, UserId};
use chrono::{DateTime, Utc};
use sqlx::Database;

use super::RepositoryError;

/// Marks every current review decision of an activity as no longer current
///
/// The records themselves stay in place; only `invalidated_at` and
/// `invalidated_by` are stamped.
///
/// # Returns
/// * `Ok(usize)` - The number of records invalidated
#[async_trait]
pub trait InvalidateReviewRecords<DB: Database>: Send + Sync {
    async fn invalidate_review_records(
        &self,
        activity_id: ActivityId,
        invalidated_by: UserId,
        invalidated_at: DateTime<Utc>,
    ) -> Result<usize, RepositoryError>;
}
