use async_trait::async_trait;
use casework_core_api::{ActivityId, UserId};
use casework_core_db::models::activity::ActivityModel;
use casework_core_db::models::audit::AuditRecordModel;
use casework_core_db::models::review::ReviewRecordModel;
use casework_core_db::models::transfer::TransferRecordModel;
use casework_core_db::repository::{
    ActivityChange, AppendAuditRecord, AppendReviewRecord, AppendTransferRecord, CasOutcome,
    CasUpdateState, CreateBatch, FindById, FindReviewRecordsByActivityId, InvalidateReviewRecords,
    LoadAuditTrail, LoadBatch, Page, PageRequest, RepositoryError,
};
use chrono::{DateTime, Utc};
use postgres_unit_of_work::Executor;
use sqlx::{PgPool, Postgres};
use std::sync::Arc;
use tracing::debug;

use super::PostgresActivityGateway;

/// Gateway over a connection pool where every call is its own unit of work.
///
/// Each call begins a transaction, runs on a fresh [`PostgresActivityGateway`]
/// and commits before returning. A failing call is rolled back when its
/// executor drops, so later calls (the remaining items of a bulk operation
/// among them) start on a clean transaction.
#[derive(Clone)]
pub struct PooledActivityGateway {
    pool: Arc<PgPool>,
}

impl PooledActivityGateway {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    async fn begin(&self) -> Result<(Executor, PostgresActivityGateway), RepositoryError> {
        let tx = self.pool.begin().await?;
        let executor = Executor::new(tx);
        Ok((executor.clone(), PostgresActivityGateway::on_executor(executor)))
    }
}

async fn commit(executor: &Executor) -> Result<(), RepositoryError> {
    let tx = executor
        .tx
        .lock()
        .await
        .take()
        .ok_or("Transaction has been consumed")?;
    tx.commit().await?;
    Ok(())
}

#[async_trait]
impl FindById<Postgres, ActivityModel> for PooledActivityGateway {
    async fn find_by_id(&self, id: ActivityId) -> Result<Option<ActivityModel>, RepositoryError> {
        let (executor, gateway) = self.begin().await?;
        let found = gateway.find_by_id(id).await?;
        commit(&executor).await?;
        Ok(found)
    }
}

#[async_trait]
impl LoadBatch<Postgres, ActivityModel> for PooledActivityGateway {
    async fn load_batch(&self, ids: &[ActivityId]) -> Result<Vec<Option<ActivityModel>>, RepositoryError> {
        let (executor, gateway) = self.begin().await?;
        let loaded = gateway.load_batch(ids).await?;
        commit(&executor).await?;
        Ok(loaded)
    }
}

#[async_trait]
impl CreateBatch<Postgres, ActivityModel> for PooledActivityGateway {
    async fn create_batch(
        &self,
        items: Vec<(ActivityModel, AuditRecordModel)>,
    ) -> Result<Vec<ActivityModel>, RepositoryError> {
        let (executor, gateway) = self.begin().await?;
        let created = gateway.create_batch(items).await?;
        commit(&executor).await?;
        Ok(created)
    }
}

#[async_trait]
impl CasUpdateState<Postgres> for PooledActivityGateway {
    async fn cas_update_state(&self, change: ActivityChange) -> Result<CasOutcome, RepositoryError> {
        let activity_id = change.activity.id;
        let (executor, gateway) = self.begin().await?;
        let outcome = gateway.cas_update_state(change).await?;
        commit(&executor).await?;
        debug!(activity_id, applied = matches!(outcome, CasOutcome::Applied(_)), "guarded update committed");
        Ok(outcome)
    }
}

#[async_trait]
impl AppendAuditRecord<Postgres> for PooledActivityGateway {
    async fn append_audit_record(
        &self,
        record: AuditRecordModel,
    ) -> Result<AuditRecordModel, RepositoryError> {
        let (executor, gateway) = self.begin().await?;
        let saved = gateway.append_audit_record(record).await?;
        commit(&executor).await?;
        Ok(saved)
    }
}

#[async_trait]
impl LoadAuditTrail<Postgres> for PooledActivityGateway {
    async fn load_audit_trail(
        &self,
        activity_id: ActivityId,
        page: PageRequest,
    ) -> Result<Page<AuditRecordModel>, RepositoryError> {
        let (executor, gateway) = self.begin().await?;
        let trail = gateway.load_audit_trail(activity_id, page).await?;
        commit(&executor).await?;
        Ok(trail)
    }
}

#[async_trait]
impl AppendTransferRecord<Postgres> for PooledActivityGateway {
    async fn append_transfer_record(
        &self,
        record: TransferRecordModel,
    ) -> Result<TransferRecordModel, RepositoryError> {
        let (executor, gateway) = self.begin().await?;
        let saved = gateway.append_transfer_record(record).await?;
        commit(&executor).await?;
        Ok(saved)
    }
}

#[async_trait]
impl AppendReviewRecord<Postgres> for PooledActivityGateway {
    async fn append_review_record(
        &self,
        record: ReviewRecordModel,
    ) -> Result<ReviewRecordModel, RepositoryError> {
        let (executor, gateway) = self.begin().await?;
        let saved = gateway.append_review_record(record).await?;
        commit(&executor).await?;
        Ok(saved)
    }
}

#[async_trait]
impl InvalidateReviewRecords<Postgres> for PooledActivityGateway {
    async fn invalidate_review_records(
        &self,
        activity_id: ActivityId,
        invalidated_by: UserId,
        invalidated_at: DateTime<Utc>,
    ) -> Result<usize, RepositoryError> {
        let (executor, gateway) = self.begin().await?;
        let stamped = gateway
            .invalidate_review_records(activity_id, invalidated_by, invalidated_at)
            .await?;
        commit(&executor).await?;
        Ok(stamped)
    }
}

#[async_trait]
impl FindReviewRecordsByActivityId<Postgres> for PooledActivityGateway {
    async fn find_review_records_by_activity_id(
        &self,
        activity_id: ActivityId,
    ) -> Result<Vec<ReviewRecordModel>, RepositoryError> {
        let (executor, gateway) = self.begin().await?;
        let records = gateway.find_review_records_by_activity_id(activity_id).await?;
        commit(&executor).await?;
        Ok(records)
    }
}
