use async_trait::async_trait;
use casework_core_api::ActivityId;
use sqlx::Database;

use crate::models::review::ReviewRecordModel;

use super::RepositoryError;

/// Loads the visado history of an activity, oldest first
#[async_trait]
pub trait FindReviewRecordsByActivityId<DB: Database>: Send + Sync {
    async fn find_review_records_by_activity_id(
        &self,
        activity_id: ActivityId,
    ) -> Result<Vec<ReviewRecordModel>, RepositoryError>;
}
