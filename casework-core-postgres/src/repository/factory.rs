use std::sync::Arc;
use postgres_unit_of_work::UnitOfWorkSession;

use super::{
    ActivityRepositoryImpl, AuditRecordRepositoryImpl, PostgresActivityGateway,
    ReviewRecordRepositoryImpl, TransferRecordRepositoryImpl,
};

/// Builds the casework repositories for a unit-of-work session.
///
/// Holds no caches today; it exists so callers can keep one instance for the
/// application and build repositories per session.
#[derive(Default)]
pub struct CaseworkRepoFactory {}

impl CaseworkRepoFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {})
    }

    pub fn build_activity_repo(&self, session: &impl UnitOfWorkSession) -> Arc<ActivityRepositoryImpl> {
        Arc::new(ActivityRepositoryImpl::new(session.executor().clone()))
    }

    pub fn build_audit_record_repo(&self, session: &impl UnitOfWorkSession) -> Arc<AuditRecordRepositoryImpl> {
        Arc::new(AuditRecordRepositoryImpl::new(session.executor().clone()))
    }

    pub fn build_transfer_record_repo(&self, session: &impl UnitOfWorkSession) -> Arc<TransferRecordRepositoryImpl> {
        Arc::new(TransferRecordRepositoryImpl::new(session.executor().clone()))
    }

    pub fn build_review_record_repo(&self, session: &impl UnitOfWorkSession) -> Arc<ReviewRecordRepositoryImpl> {
        Arc::new(ReviewRecordRepositoryImpl::new(session.executor().clone()))
    }

    /// Build every repository on the session's executor, bundled for the engine
    pub fn build_gateway(&self, session: &impl UnitOfWorkSession) -> PostgresActivityGateway {
        PostgresActivityGateway {
            activity_repository: self.build_activity_repo(session),
            audit_record_repository: self.build_audit_record_repo(session),
            transfer_record_repository: self.build_transfer_record_repo(session),
            review_record_repository: self.build_review_record_repo(session),
        }
    }
}
