use async_trait::async_trait;
use casework_core_db::models::review::ReviewRecordModel;
use casework_core_db::repository::append_review_record::AppendReviewRecord;
use crate::utils::TryFromRow;
use sqlx::{PgConnection, Postgres};
use std::error::Error;

use super::repo_impl::ReviewRecordRepositoryImpl;

pub async fn insert_review_record(
    conn: &mut PgConnection,
    record: &ReviewRecordModel,
) -> Result<ReviewRecordModel, Box<dyn Error + Send + Sync>> {
    let row = sqlx::query(
        r#"
        INSERT INTO activity_review_record
        (id, activity_id, stage, decision, observations, reviewed_by, reviewed_at,
         invalidated_at, invalidated_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(record.id)
    .bind(record.activity_id)
    .bind(record.stage)
    .bind(record.decision)
    .bind(record.observations.as_deref())
    .bind(record.reviewed_by)
    .bind(record.reviewed_at)
    .bind(record.invalidated_at)
    .bind(record.invalidated_by)
    .fetch_one(conn)
    .await?;

    ReviewRecordModel::try_from_row(&row)
}

impl ReviewRecordRepositoryImpl {
    pub(super) async fn append_impl(
        &self,
        record: ReviewRecordModel,
    ) -> Result<ReviewRecordModel, Box<dyn Error + Send + Sync>> {
        let mut tx = self.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;
        insert_review_record(&mut **transaction, &record).await
    }
}

#[async_trait]
impl AppendReviewRecord<Postgres> for ReviewRecordRepositoryImpl {
    async fn append_review_record(
        &self,
        record: ReviewRecordModel,
    ) -> Result<ReviewRecordModel, Box<dyn Error + Send + Sync>> {
        Self::append_impl(self, record).await
    }
}
