use async_trait::async_trait;
use casework_core_api::ActivityId;
use casework_core_db::models::activity::ActivityModel;
use casework_core_db::repository::find_by_id::FindById;
use sqlx::Postgres;
use std::error::Error;

use super::repo_impl::ActivityRepositoryImpl;

#[async_trait]
impl FindById<Postgres, ActivityModel> for ActivityRepositoryImpl {
    async fn find_by_id(
        &self,
        id: ActivityId,
    ) -> Result<Option<ActivityModel>, Box<dyn Error + Send + Sync>> {
        let results = Self::load_batch_impl(self, &[id]).await?;
        Ok(results.into_iter().next().flatten())
    }
}
