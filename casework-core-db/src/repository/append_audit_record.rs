use async_trait::async_trait;
use sqlx::Database;

use crate::models::audit::AuditRecordModel;

use super::RepositoryError;

/// Append-only write to the audit trail
///
/// Used for records that do not accompany an activity write (comments).
/// Records written through `CasUpdateState` must not be appended again.
#[async_trait]
pub trait AppendAuditRecord<DB: Database>: Send + Sync {
    async fn append_audit_record(
        &self,
        record: AuditRecordModel,
    ) -> Result<AuditRecordModel, RepositoryError>;
}
