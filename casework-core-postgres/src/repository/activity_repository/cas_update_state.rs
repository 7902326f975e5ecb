use async_trait::async_trait;
use casework_core_api::ActivityState;
use casework_core_db::repository::cas_update_state::{ActivityChange, CasOutcome, CasUpdateState};
use sqlx::Postgres;
use std::error::Error;
use tracing::debug;

use super::repo_impl::ActivityRepositoryImpl;
use crate::repository::audit_record_repository::insert_audit_record;
use crate::repository::review_record_repository::{insert_review_record, invalidate_review_rows};
use crate::repository::transfer_record_repository::insert_transfer_record;

impl ActivityRepositoryImpl {
    /// Guarded update: the row changes only if it still has the expected
    /// state and the hash the caller read. The audit record and any attached
    /// transfer, review or invalidation are written only when the update
    /// applied, on the same transaction.
    pub(super) async fn cas_update_state_impl(
        &self,
        change: ActivityChange,
    ) -> Result<CasOutcome, Box<dyn Error + Send + Sync>> {
        let ActivityChange {
            mut activity,
            expected_state,
            audit,
            transfer,
            review,
            invalidate_reviews,
        } = change;
        let previous_hash = activity.seal(audit.id)?;
        let secondaries: Vec<i64> = activity.responsible_secondary.iter().copied().collect();

        let mut tx = self.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;

        let rows_affected = sqlx::query(
            r#"
            UPDATE activity SET
            measure_id = $2, title = $3, state = $4, actor = $5, responsible_principal = $6,
            responsible_secondary = $7, due_date = $8, requires_legal_review = $9,
            origin_kind = $10, is_draft = $11, evidence_count = $12, antecedent_hash = $13,
            antecedent_audit_log_id = $14, hash = $15, audit_log_id = $16
            WHERE id = $1 AND state = $17 AND hash = $18
            "#,
        )
        .bind(activity.id)
        .bind(activity.measure_id)
        .bind(activity.title.as_str())
        .bind(activity.state)
        .bind(activity.actor)
        .bind(activity.responsible_principal)
        .bind(&secondaries)
        .bind(activity.due_date)
        .bind(activity.requires_legal_review)
        .bind(activity.origin_kind)
        .bind(activity.is_draft)
        .bind(activity.evidence_count)
        .bind(activity.antecedent_hash)
        .bind(activity.antecedent_audit_log_id)
        .bind(activity.hash)
        .bind(activity.audit_log_id)
        .bind(expected_state)
        .bind(previous_hash)
        .execute(&mut **transaction)
        .await?
        .rows_affected();

        if rows_affected == 0 {
            let current = sqlx::query_scalar::<_, ActivityState>("SELECT state FROM activity WHERE id = $1")
                .bind(activity.id)
                .fetch_optional(&mut **transaction)
                .await?;
            debug!(activity_id = activity.id, ?current, "guarded update matched no row");
            return Ok(match current {
                Some(current_state) => CasOutcome::Stale { current_state },
                None => CasOutcome::Missing,
            });
        }

        insert_audit_record(&mut **transaction, &audit).await?;
        if let Some(invalidation) = invalidate_reviews {
            invalidate_review_rows(
                &mut **transaction,
                activity.id,
                invalidation.invalidated_by,
                invalidation.invalidated_at,
            )
            .await?;
        }
        if let Some(record) = &transfer {
            insert_transfer_record(&mut **transaction, record).await?;
        }
        if let Some(record) = &review {
            insert_review_record(&mut **transaction, record).await?;
        }
        Ok(CasOutcome::Applied(activity))
    }
}

#[async_trait]
impl CasUpdateState<Postgres> for ActivityRepositoryImpl {
    async fn cas_update_state(
        &self,
        change: ActivityChange,
    ) -> Result<CasOutcome, Box<dyn Error + Send + Sync>> {
        Self::cas_update_state_impl(self, change).await
    }
}
