use async_trait::async_trait;
use casework_core_db::models::audit::AuditRecordModel;
use crate::utils::{get_optional_heapless_string, TryFromRow};
use postgres_unit_of_work::{Executor, TransactionAware, TransactionResult};
use sqlx::{postgres::PgRow, Row};
use std::error::Error;

/// Append-only access to `activity_audit_record`.
pub struct AuditRecordRepositoryImpl {
    pub executor: Executor,
}

impl AuditRecordRepositoryImpl {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }
}

impl TryFromRow<PgRow> for AuditRecordModel {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(AuditRecordModel {
            id: row.try_get("id")?,
            activity_id: row.try_get("activity_id")?,
            action: row.try_get("action")?,
            from_state: row.try_get("from_state")?,
            to_state: row.try_get("to_state")?,
            justification: get_optional_heapless_string(row, "justification")?,
            metadata: row.try_get("metadata")?,
            acting_user: row.try_get("acting_user")?,
            recorded_at: row.try_get("recorded_at")?,
        })
    }
}

#[async_trait]
impl TransactionAware for AuditRecordRepositoryImpl {
    async fn on_commit(&self) -> TransactionResult<()> {
        Ok(())
    }

    async fn on_rollback(&self) -> TransactionResult<()> {
        Ok(())
    }
}
