use async_trait::async_trait;
use casework_core_api::ActivityId;
use sqlx::Database;

use crate::models::audit::AuditRecordModel;
use crate::repository::pagination::{Page, PageRequest};

use super::RepositoryError;

/// Read-only, paginated access to the audit trail of an activity
///
/// Records are returned newest first.
///
/// # Example
/// ```ignore
/// let page = repo.load_audit_trail(activity_id, PageRequest::new(20, 0)).await?;
/// println!("Page {} of {}", page.page_number(), page.total_pages());
/// ```
#[async_trait]
pub trait LoadAuditTrail<DB: Database>: Send + Sync {
    async fn load_audit_trail(
        &self,
        activity_id: ActivityId,
        page: PageRequest,
    ) -> Result<Page<AuditRecordModel>, RepositoryError>;
}
