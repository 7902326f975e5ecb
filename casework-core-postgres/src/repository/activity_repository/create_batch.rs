use async_trait::async_trait;
use casework_core_db::models::activity::ActivityModel;
use casework_core_db::models::audit::AuditRecordModel;
use casework_core_db::repository::create_batch::CreateBatch;
use sqlx::Postgres;
use std::error::Error;

use super::repo_impl::ActivityRepositoryImpl;
use crate::repository::audit_record_repository::insert_audit_record;

impl ActivityRepositoryImpl {
    pub(super) async fn create_batch_impl(
        &self,
        items: Vec<(ActivityModel, AuditRecordModel)>,
    ) -> Result<Vec<ActivityModel>, Box<dyn Error + Send + Sync>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let mut saved_items = Vec::with_capacity(items.len());
        {
            let mut tx = self.executor.tx.lock().await;
            let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;

            for (mut item, mut audit) in items {
                if item.id == 0 {
                    item.id = sqlx::query_scalar::<_, i64>(
                        "SELECT nextval(pg_get_serial_sequence('activity', 'id'))",
                    )
                    .fetch_one(&mut **transaction)
                    .await?;
                }
                audit.activity_id = item.id;
                item.seal(audit.id)?;

                let secondaries: Vec<i64> = item.responsible_secondary.iter().copied().collect();
                sqlx::query(
                    r#"
                    INSERT INTO activity
                    (id, measure_id, title, state, actor, responsible_principal, responsible_secondary,
                     due_date, requires_legal_review, origin_kind, is_draft, evidence_count,
                     antecedent_hash, antecedent_audit_log_id, hash, audit_log_id)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
                    "#,
                )
                .bind(item.id)
                .bind(item.measure_id)
                .bind(item.title.as_str())
                .bind(item.state)
                .bind(item.actor)
                .bind(item.responsible_principal)
                .bind(&secondaries)
                .bind(item.due_date)
                .bind(item.requires_legal_review)
                .bind(item.origin_kind)
                .bind(item.is_draft)
                .bind(item.evidence_count)
                .bind(item.antecedent_hash)
                .bind(item.antecedent_audit_log_id)
                .bind(item.hash)
                .bind(item.audit_log_id)
                .execute(&mut **transaction)
                .await?;

                insert_audit_record(&mut **transaction, &audit).await?;
                saved_items.push(item);
            }
        }

        Ok(saved_items)
    }
}

#[async_trait]
impl CreateBatch<Postgres, ActivityModel> for ActivityRepositoryImpl {
    async fn create_batch(
        &self,
        items: Vec<(ActivityModel, AuditRecordModel)>,
    ) -> Result<Vec<ActivityModel>, Box<dyn Error + Send + Sync>> {
        Self::create_batch_impl(self, items).await
    }
}
