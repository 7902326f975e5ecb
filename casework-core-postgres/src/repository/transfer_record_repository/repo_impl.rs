use async_trait::async_trait;
use casework_core_db::models::transfer::TransferRecordModel;
use crate::utils::{get_heapless_string, TryFromRow};
use postgres_unit_of_work::{Executor, TransactionAware, TransactionResult};
use sqlx::{postgres::PgRow, Row};
use std::error::Error;

pub struct TransferRecordRepositoryImpl {
    pub executor: Executor,
}

impl TransferRecordRepositoryImpl {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }
}

impl TryFromRow<PgRow> for TransferRecordModel {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(TransferRecordModel {
            id: row.try_get("id")?,
            activity_id: row.try_get("activity_id")?,
            source_team: row.try_get("source_team")?,
            destination_team: row.try_get("destination_team")?,
            previous_responsible: row.try_get("previous_responsible")?,
            new_responsible: row.try_get("new_responsible")?,
            justification: get_heapless_string(row, "justification")?,
            state_at_transfer: row.try_get("state_at_transfer")?,
            transferred_by: row.try_get("transferred_by")?,
            transferred_at: row.try_get("transferred_at")?,
        })
    }
}

#[async_trait]
impl TransactionAware for TransferRecordRepositoryImpl {
    async fn on_commit(&self) -> TransactionResult<()> {
        Ok(())
    }

    async fn on_rollback(&self) -> TransactionResult<()> {
        Ok(())
    }
}
