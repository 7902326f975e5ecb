use async_trait::async_trait;
use casework_core_db::models::review::ReviewRecordModel;
use crate::utils::{get_optional_heapless_string, TryFromRow};
use postgres_unit_of_work::{Executor, TransactionAware, TransactionResult};
use sqlx::{postgres::PgRow, Row};
use std::error::Error;

/// Visado decisions of activities. Rows are appended and later stamped as
/// invalidated, never deleted.
pub struct ReviewRecordRepositoryImpl {
    pub executor: Executor,
}

impl ReviewRecordRepositoryImpl {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }
}

impl TryFromRow<PgRow> for ReviewRecordModel {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(ReviewRecordModel {
            id: row.try_get("id")?,
            activity_id: row.try_get("activity_id")?,
            stage: row.try_get("stage")?,
            decision: row.try_get("decision")?,
            observations: get_optional_heapless_string(row, "observations")?,
            reviewed_by: row.try_get("reviewed_by")?,
            reviewed_at: row.try_get("reviewed_at")?,
            invalidated_at: row.try_get("invalidated_at")?,
            invalidated_by: row.try_get("invalidated_by")?,
        })
    }
}

#[async_trait]
impl TransactionAware for ReviewRecordRepositoryImpl {
    async fn on_commit(&self) -> TransactionResult<()> {
        Ok(())
    }

    async fn on_rollback(&self) -> TransactionResult<()> {
        Ok(())
    }
}
