use async_trait::async_trait;
use casework_core_api::{ActivityId, UserId};
use casework_core_db::repository::invalidate_review_records::InvalidateReviewRecords;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, Postgres};
use std::error::Error;

use super::repo_impl::ReviewRecordRepositoryImpl;

/// Stamps the current review records of an activity. Already invalidated
/// rows keep their original stamp.
pub async fn invalidate_review_rows(
    conn: &mut PgConnection,
    activity_id: ActivityId,
    invalidated_by: UserId,
    invalidated_at: DateTime<Utc>,
) -> Result<usize, Box<dyn Error + Send + Sync>> {
    let result = sqlx::query(
        r#"
        UPDATE activity_review_record
        SET invalidated_at = $2, invalidated_by = $3
        WHERE activity_id = $1 AND invalidated_at IS NULL
        "#,
    )
    .bind(activity_id)
    .bind(invalidated_at)
    .bind(invalidated_by)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() as usize)
}

impl ReviewRecordRepositoryImpl {
    pub(super) async fn invalidate_impl(
        &self,
        activity_id: ActivityId,
        invalidated_by: UserId,
        invalidated_at: DateTime<Utc>,
    ) -> Result<usize, Box<dyn Error + Send + Sync>> {
        let mut tx = self.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;
        invalidate_review_rows(&mut **transaction, activity_id, invalidated_by, invalidated_at).await
    }
}

#[async_trait]
impl InvalidateReviewRecords<Postgres> for ReviewRecordRepositoryImpl {
    async fn invalidate_review_records(
        &self,
        activity_id: ActivityId,
        invalidated_by: UserId,
        invalidated_at: DateTime<Utc>,
    ) -> Result<usize, Box<dyn Error + Send + Sync>> {
        Self::invalidate_impl(self, activity_id, invalidated_by, invalidated_at).await
    }
}
