use async_trait::async_trait;
use sqlx::Database;

use crate::models::audit::AuditRecordModel;
use crate::models::auditable::Auditable;

use super::RepositoryError;

/// Generic repository trait for creating multiple entities in a batch
///
/// Each item comes with the audit record documenting its creation; the
/// implementation seals the item's hash chain against that record and
/// writes both in the same unit of work. Items carrying id 0 receive a
/// store-assigned id, which is also stamped on their audit record.
///
/// # Type Parameters
/// * `DB` - The database type (must implement sqlx::Database)
/// * `T` - The entity type that must implement Auditable trait
#[async_trait]
pub trait CreateBatch<DB: Database, T: Auditable>: Send + Sync {
    /// Save multiple items
    ///
    /// # Returns
    /// * `Ok(Vec<T>)` - The created entities with their hash chain populated
    /// * `Err` - An error if the items could not be written
    async fn create_batch(
        &self,
        items: Vec<(T, AuditRecordModel)>,
    ) -> Result<Vec<T>, RepositoryError>;
}
