use async_trait::async_trait;
use casework_core_db::models::activity::ActivityModel;
use crate::utils::{get_heapless_string, TryFromRow};
use postgres_unit_of_work::{Executor, TransactionAware, TransactionResult};
use sqlx::{postgres::PgRow, Row};
use std::error::Error;

pub struct ActivityRepositoryImpl {
    pub executor: Executor,
}

impl ActivityRepositoryImpl {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }
}

impl TryFromRow<PgRow> for ActivityModel {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let secondaries: Vec<i64> = row.try_get("responsible_secondary")?;
        Ok(ActivityModel {
            id: row.try_get("id")?,
            measure_id: row.try_get("measure_id")?,
            title: get_heapless_string(row, "title")?,
            state: row.try_get("state")?,
            actor: row.try_get("actor")?,
            responsible_principal: row.try_get("responsible_principal")?,
            responsible_secondary: secondaries.into_iter().collect(),
            due_date: row.try_get("due_date")?,
            requires_legal_review: row.try_get("requires_legal_review")?,
            origin_kind: row.try_get("origin_kind")?,
            is_draft: row.try_get("is_draft")?,
            evidence_count: row.try_get("evidence_count")?,
            antecedent_hash: row.try_get("antecedent_hash")?,
            antecedent_audit_log_id: row.try_get("antecedent_audit_log_id")?,
            hash: row.try_get("hash")?,
            audit_log_id: row.try_get("audit_log_id")?,
        })
    }
}

#[async_trait]
impl TransactionAware for ActivityRepositoryImpl {
    async fn on_commit(&self) -> TransactionResult<()> {
        Ok(())
    }

    async fn on_rollback(&self) -> TransactionResult<()> {
        Ok(())
    }
}
