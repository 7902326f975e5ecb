use async_trait::async_trait;
use sqlx::Database;

use crate::models::review::ReviewRecordModel;

use super::RepositoryError;

/// Append a supervisor or legal review decision
#[async_trait]
pub trait AppendReviewRecord<DB: Database>: Send + Sync {
    async fn append_review_record(
        &self,
        record: ReviewRecordModel,
    ) -> Result<ReviewRecordModel, RepositoryError>;
}
