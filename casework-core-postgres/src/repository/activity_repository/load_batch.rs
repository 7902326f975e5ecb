use async_trait::async_trait;
use casework_core_api::ActivityId;
use casework_core_db::models::activity::ActivityModel;
use casework_core_db::repository::load_batch::LoadBatch;
use crate::utils::TryFromRow;
use sqlx::Postgres;
use std::error::Error;

use super::repo_impl::ActivityRepositoryImpl;

impl ActivityRepositoryImpl {
    pub(super) async fn load_batch_impl(
        repo: &ActivityRepositoryImpl,
        ids: &[ActivityId],
    ) -> Result<Vec<Option<ActivityModel>>, Box<dyn Error + Send + Sync>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let query = r#"SELECT * FROM activity WHERE id = ANY($1)"#;
        let rows = {
            let mut tx = repo.executor.tx.lock().await;
            if let Some(transaction) = tx.as_mut() {
                sqlx::query(query).bind(ids).fetch_all(&mut **transaction).await?
            } else {
                return Err("Transaction has been consumed".into());
            }
        };

        let mut item_map = std::collections::HashMap::new();
        for row in rows {
            let item = ActivityModel::try_from_row(&row)?;
            item_map.insert(item.id, item);
        }

        // Same order as the requested ids; repeated ids each get a copy
        Ok(ids.iter().map(|id| item_map.get(id).cloned()).collect())
    }
}

#[async_trait]
impl LoadBatch<Postgres, ActivityModel> for ActivityRepositoryImpl {
    async fn load_batch(
        &self,
        ids: &[ActivityId],
    ) -> Result<Vec<Option<ActivityModel>>, Box<dyn Error + Send + Sync>> {
        Self::load_batch_impl(self, ids).await
    }
}
