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
use postgres_unit_of_work::{Executor, TransactionAware, TransactionResult};
use sqlx::Postgres;
use std::sync::Arc;

use super::{
    ActivityRepositoryImpl, AuditRecordRepositoryImpl, ReviewRecordRepositoryImpl,
    TransferRecordRepositoryImpl,
};

/// The repositories of one unit of work, bundled so the engine can drive
/// them as a single store. All of them share the same executor.
///
/// Nothing here commits. The owner of the session decides when the
/// transaction ends, and every call made through this gateway lands in that
/// one transaction. An engine that should commit each operation on its own
/// runs over [`PooledActivityGateway`](super::PooledActivityGateway) instead.
pub struct PostgresActivityGateway {
    pub activity_repository: Arc<ActivityRepositoryImpl>,
    pub audit_record_repository: Arc<AuditRecordRepositoryImpl>,
    pub transfer_record_repository: Arc<TransferRecordRepositoryImpl>,
    pub review_record_repository: Arc<ReviewRecordRepositoryImpl>,
}

impl PostgresActivityGateway {
    pub fn on_executor(executor: Executor) -> Self {
        Self {
            activity_repository: Arc::new(ActivityRepositoryImpl::new(executor.clone())),
            audit_record_repository: Arc::new(AuditRecordRepositoryImpl::new(executor.clone())),
            transfer_record_repository: Arc::new(TransferRecordRepositoryImpl::new(executor.clone())),
            review_record_repository: Arc::new(ReviewRecordRepositoryImpl::new(executor)),
        }
    }
}

#[async_trait]
impl FindById<Postgres, ActivityModel> for PostgresActivityGateway {
    async fn find_by_id(&self, id: ActivityId) -> Result<Option<ActivityModel>, RepositoryError> {
        self.activity_repository.find_by_id(id).await
    }
}

#[async_trait]
impl LoadBatch<Postgres, ActivityModel> for PostgresActivityGateway {
    async fn load_batch(&self, ids: &[ActivityId]) -> Result<Vec<Option<ActivityModel>>, RepositoryError> {
        self.activity_repository.load_batch(ids).await
    }
}

#[async_trait]
impl CreateBatch<Postgres, ActivityModel> for PostgresActivityGateway {
    async fn create_batch(
        &self,
        items: Vec<(ActivityModel, AuditRecordModel)>,
    ) -> Result<Vec<ActivityModel>, RepositoryError> {
        self.activity_repository.create_batch(items).await
    }
}

#[async_trait]
impl CasUpdateState<Postgres> for PostgresActivityGateway {
    async fn cas_update_state(&self, change: ActivityChange) -> Result<CasOutcome, RepositoryError> {
        self.activity_repository.cas_update_state(change).await
    }
}

#[async_trait]
impl AppendAuditRecord<Postgres> for PostgresActivityGateway {
    async fn append_audit_record(
        &self,
        record: AuditRecordModel,
    ) -> Result<AuditRecordModel, RepositoryError> {
        self.audit_record_repository.append_audit_record(record).await
    }
}

#[async_trait]
impl LoadAuditTrail<Postgres> for PostgresActivityGateway {
    async fn load_audit_trail(
        &self,
        activity_id: ActivityId,
        page: PageRequest,
    ) -> Result<Page<AuditRecordModel>, RepositoryError> {
        self.audit_record_repository
            .load_audit_trail(activity_id, page)
            .await
    }
}

#[async_trait]
impl AppendTransferRecord<Postgres> for PostgresActivityGateway {
    async fn append_transfer_record(
        &self,
        record: TransferRecordModel,
    ) -> Result<TransferRecordModel, RepositoryError> {
        self.transfer_record_repository
            .append_transfer_record(record)
            .await
    }
}

#[async_trait]
impl AppendReviewRecord<Postgres> for PostgresActivityGateway {
    async fn append_review_record(
        &self,
        record: ReviewRecordModel,
    ) -> Result<ReviewRecordModel, RepositoryError> {
        self.review_record_repository.append_review_record(record).await
    }
}

#[async_trait]
impl InvalidateReviewRecords<Postgres> for PostgresActivityGateway {
    async fn invalidate_review_records(
        &self,
        activity_id: ActivityId,
        invalidated_by: UserId,
        invalidated_at: DateTime<Utc>,
    ) -> Result<usize, RepositoryError> {
        self.review_record_repository
            .invalidate_review_records(activity_id, invalidated_by, invalidated_at)
            .await
    }
}

#[async_trait]
impl FindReviewRecordsByActivityId<Postgres> for PostgresActivityGateway {
    async fn find_review_records_by_activity_id(
        &self,
        activity_id: ActivityId,
    ) -> Result<Vec<ReviewRecordModel>, RepositoryError> {
        self.review_record_repository
            .find_review_records_by_activity_id(activity_id)
            .await
    }
}

#[async_trait]
impl TransactionAware for PostgresActivityGateway {
    async fn on_commit(&self) -> TransactionResult<()> {
        self.activity_repository.on_commit().await?;
        self.audit_record_repository.on_commit().await?;
        self.transfer_record_repository.on_commit().await?;
        self.review_record_repository.on_commit().await
    }

    async fn on_rollback(&self) -> TransactionResult<()> {
        self.activity_repository.on_rollback().await?;
        self.audit_record_repository.on_rollback().await?;
        self.transfer_record_repository.on_rollback().await?;
        self.review_record_repository.on_rollback().await
    }
}

#[cfg(test)]
mod tests {
    use crate::test_helper::setup_test_context;
    use casework_core_api::{
        ActivityState, AuditAction, NewActivity, OriginKind, RoleTag, Team, TransitionRequest,
        UserContext,
    };
    use casework_core_db::repository::PageRequest;
    use casework_core_engine::{ActivityEngine, CallContext, EngineConfig};
    use chrono::{Duration, Utc};
    use sqlx::Postgres;
    use std::collections::BTreeSet;
    use std::sync::Arc;

    #[tokio::test]
    #[ignore = "requires a PostgreSQL database at DATABASE_URL"]
    async fn test_engine_runs_over_postgres() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let gateway = Arc::new(ctx.gateway);
        let config = EngineConfig::default();
        let call = CallContext::from_config(&config);
        let engine: ActivityEngine<Postgres, _> = ActivityEngine::new(gateway, config);
        let user = UserContext::new(5, [RoleTag::TechnicalTeam]);

        let created = engine
            .create_activity(
                &call,
                &user,
                NewActivity {
                    measure_id: 42,
                    title: "School follow-up".to_string(),
                    actor: Team::TechnicalTeam,
                    responsible_principal: Some(5),
                    responsible_secondary: BTreeSet::new(),
                    due_date: (Utc::now() + Duration::days(10)).date_naive(),
                    requires_legal_review: false,
                    origin_kind: OriginKind::Manual,
                    is_draft: false,
                },
            )
            .await?;

        engine
            .request_transition(&call, &user, created.id, TransitionRequest::to(ActivityState::InProgress))
            .await?;
        let completed = engine
            .request_transition(&call, &user, created.id, TransitionRequest::to(ActivityState::Completed))
            .await?;
        assert_eq!(completed.state, ActivityState::Completed);

        let trail = engine
            .audit_trail(&call, &user, created.id, PageRequest::default())
            .await?;
        assert_eq!(trail.total, 3);
        assert_eq!(trail.items[0].to_state, Some(ActivityState::Completed));
        assert_eq!(trail.items[2].action, AuditAction::Created);

        Ok(())
    }
}
