use async_trait::async_trait;
use casework_core_db::models::audit::AuditRecordModel;
use casework_core_db::repository::append_audit_record::AppendAuditRecord;
use sqlx::{PgConnection, Postgres};
use std::error::Error;

use super::repo_impl::AuditRecordRepositoryImpl;

/// Inserts one audit record on an open connection. Shared with the
/// activity repository, which writes the record in the same transaction as
/// the activity row.
pub async fn insert_audit_record(
    conn: &mut PgConnection,
    record: &AuditRecordModel,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    sqlx::query(
        r#"
        INSERT INTO activity_audit_record
        (id, activity_id, action, from_state, to_state, justification, metadata, acting_user, recorded_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(record.id)
    .bind(record.activity_id)
    .bind(record.action)
    .bind(record.from_state)
    .bind(record.to_state)
    .bind(record.justification.as_deref())
    .bind(&record.metadata)
    .bind(record.acting_user)
    .bind(record.recorded_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

#[async_trait]
impl AppendAuditRecord<Postgres> for AuditRecordRepositoryImpl {
    async fn append_audit_record(
        &self,
        record: AuditRecordModel,
    ) -> Result<AuditRecordModel, Box<dyn Error + Send + Sync>> {
        let mut tx = self.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;
        insert_audit_record(&mut **transaction, &record).await?;
        Ok(record)
    }
}
