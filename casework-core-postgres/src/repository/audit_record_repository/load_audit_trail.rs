use async_trait::async_trait;
use casework_core_api::ActivityId;
use casework_core_db::models::audit::AuditRecordModel;
use casework_core_db::repository::load_audit_trail::LoadAuditTrail;
use casework_core_db::repository::pagination::{Page, PageRequest};
use crate::utils::{as_sql_count, TryFromRow};
use sqlx::Postgres;
use std::error::Error;

use super::repo_impl::AuditRecordRepositoryImpl;

impl AuditRecordRepositoryImpl {
    pub(super) async fn load_audit_trail_impl(
        &self,
        activity_id: ActivityId,
        page: PageRequest,
    ) -> Result<Page<AuditRecordModel>, Box<dyn Error + Send + Sync>> {
        let mut tx = self.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM activity_audit_record WHERE activity_id = $1",
        )
        .bind(activity_id)
        .fetch_one(&mut **transaction)
        .await?;

        let rows = sqlx::query(
            r#"
            SELECT * FROM activity_audit_record
            WHERE activity_id = $1
            ORDER BY recorded_at DESC, id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(activity_id)
        .bind(as_sql_count(page.limit)?)
        .bind(as_sql_count(page.offset)?)
        .fetch_all(&mut **transaction)
        .await?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            items.push(AuditRecordModel::try_from_row(&row)?);
        }
        Ok(Page::new(items, total.max(0) as usize, page.limit, page.offset))
    }
}

#[async_trait]
impl LoadAuditTrail<Postgres> for AuditRecordRepositoryImpl {
    async fn load_audit_trail(
        &self,
        activity_id: ActivityId,
        page: PageRequest,
    ) -> Result<Page<AuditRecordModel>, Box<dyn Error + Send + Sync>> {
        Self::load_audit_trail_impl(self, activity_id, page).await
    }
}
