use async_trait::async_trait;
use sqlx::Database;

use crate::models::identifiable::Identifiable;

use super::RepositoryError;

/// Generic repository trait for finding an entity by its ID
///
/// Returns an Option so callers can tell a missing entity apart from a
/// failed query.
///
/// # Type Parameters
/// * `DB` - The database type (must implement sqlx::Database)
/// * `T` - The entity type that must implement Identifiable trait
///
/// # Example
/// ```ignore
/// impl FindById<Postgres, ActivityModel> for ActivityRepositoryImpl {
///     async fn find_by_id(&self, id: ActivityId) -> Result<Option<ActivityModel>, RepositoryError> {
///         // Implementation
///     }
/// }
/// ```
#[async_trait]
pub trait FindById<DB: Database, T: Identifiable>: Send + Sync {
    /// Find an entity by its unique identifier
    ///
    /// # Returns
    /// * `Ok(Some(T))` - The found entity
    /// * `Ok(None)` - If the entity does not exist
    /// * `Err` - An error if the query could not be executed
    async fn find_by_id(&self, id: T::Id) -> Result<Option<T>, RepositoryError>;
}
