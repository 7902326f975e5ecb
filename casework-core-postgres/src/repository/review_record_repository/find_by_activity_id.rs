use async_trait::async_trait;
use casework_core_api::ActivityId;
use casework_core_db::models::review::ReviewRecordModel;
use casework_core_db::repository::find_review_records_by_activity_id::FindReviewRecordsByActivityId;
use crate::utils::TryFromRow;
use sqlx::Postgres;
use std::error::Error;

use super::repo_impl::ReviewRecordRepositoryImpl;

impl ReviewRecordRepositoryImpl {
    pub(super) async fn find_by_activity_id_impl(
        &self,
        activity_id: ActivityId,
    ) -> Result<Vec<ReviewRecordModel>, Box<dyn Error + Send + Sync>> {
        let mut tx = self.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;
        let rows = sqlx::query(
            "SELECT * FROM activity_review_record WHERE activity_id = $1 ORDER BY reviewed_at, id",
        )
        .bind(activity_id)
        .fetch_all(&mut **transaction)
        .await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(ReviewRecordModel::try_from_row(&row)?);
        }
        Ok(records)
    }
}

#[async_trait]
impl FindReviewRecordsByActivityId<Postgres> for ReviewRecordRepositoryImpl {
    async fn find_review_records_by_activity_id(
        &self,
        activity_id: ActivityId,
    ) -> Result<Vec<ReviewRecordModel>, Box<dyn Error + Send + Sync>> {
        Self::find_by_activity_id_impl(self, activity_id).await
    }
}
