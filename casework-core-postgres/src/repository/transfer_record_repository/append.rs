use async_trait::async_trait;
use casework_core_db::models::transfer::TransferRecordModel;
use casework_core_db::repository::append_transfer_record::AppendTransferRecord;
use crate::utils::TryFromRow;
use sqlx::{PgConnection, Postgres};
use std::error::Error;

use super::repo_impl::TransferRecordRepositoryImpl;

pub async fn insert_transfer_record(
    conn: &mut PgConnection,
    record: &TransferRecordModel,
) -> Result<TransferRecordModel, Box<dyn Error + Send + Sync>> {
    let row = sqlx::query(
        r#"
        INSERT INTO activity_transfer_record
        (id, activity_id, source_team, destination_team, previous_responsible, new_responsible,
         justification, state_at_transfer, transferred_by, transferred_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING *
        "#,
    )
    .bind(record.id)
    .bind(record.activity_id)
    .bind(record.source_team)
    .bind(record.destination_team)
    .bind(record.previous_responsible)
    .bind(record.new_responsible)
    .bind(record.justification.as_str())
    .bind(record.state_at_transfer)
    .bind(record.transferred_by)
    .bind(record.transferred_at)
    .fetch_one(conn)
    .await?;

    TransferRecordModel::try_from_row(&row)
}

impl TransferRecordRepositoryImpl {
    pub(super) async fn append_impl(
        &self,
        record: TransferRecordModel,
    ) -> Result<TransferRecordModel, Box<dyn Error + Send + Sync>> {
        let mut tx = self.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;
        insert_transfer_record(&mut **transaction, &record).await
    }

    /// Transfers of an activity, oldest first.
    pub async fn find_by_activity_id(
        &self,
        activity_id: i64,
    ) -> Result<Vec<TransferRecordModel>, Box<dyn Error + Send + Sync>> {
        let mut tx = self.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;
        let rows = sqlx::query(
            "SELECT * FROM activity_transfer_record WHERE activity_id = $1 ORDER BY transferred_at, id",
        )
        .bind(activity_id)
        .fetch_all(&mut **transaction)
        .await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(TransferRecordModel::try_from_row(&row)?);
        }
        Ok(records)
    }
}

#[async_trait]
impl AppendTransferRecord<Postgres> for TransferRecordRepositoryImpl {
    async fn append_transfer_record(
        &self,
        record: TransferRecordModel,
    ) -> Result<TransferRecordModel, Box<dyn Error + Send + Sync>> {
        Self::append_impl(self, record).await
    }
}

#[cfg(test)]
mod tests {
    use crate::repository::test_utils::{create_test_activity, create_test_audit};
    use crate::test_helper::setup_test_context;
    use casework_core_api::{ActivityState, Team};
    use casework_core_db::models::transfer::TransferRecordModel;
    use casework_core_db::repository::append_transfer_record::AppendTransferRecord;
    use casework_core_db::repository::create_batch::CreateBatch;
    use casework_core_db::utils::bounded;
    use chrono::Utc;
    use uuid::Uuid;

    #[tokio::test]
    #[ignore = "requires a PostgreSQL database at DATABASE_URL"]
    async fn test_append_and_find_transfer() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let gateway = ctx.gateway();
        let created = gateway
            .activity_repository
            .create_batch(vec![(create_test_activity(), create_test_audit())])
            .await?;

        let record = TransferRecordModel {
            id: Uuid::new_v4(),
            activity_id: created[0].id,
            source_team: Team::TechnicalTeam,
            destination_team: Team::LegalTeam,
            previous_responsible: Some(5),
            new_responsible: None,
            justification: bounded("justification", "custody hearing needs the legal team")?,
            state_at_transfer: ActivityState::Pending,
            transferred_by: 100,
            transferred_at: Utc::now(),
        };
        let saved = gateway
            .transfer_record_repository
            .append_transfer_record(record.clone())
            .await?;
        assert_eq!(saved.id, record.id);

        let found = gateway
            .transfer_record_repository
            .find_by_activity_id(created[0].id)
            .await?;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].destination_team, Team::LegalTeam);

        Ok(())
    }
}
