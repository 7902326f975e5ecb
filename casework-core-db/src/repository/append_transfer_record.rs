use async_trait::async_trait;
use sqlx::Database;

use crate::models::transfer::TransferRecordModel;

use super::RepositoryError;

/// Append-only write of a transfer record
#[async_trait]
pub trait AppendTransferRecord<DB: Database>: Send + Sync {
    async fn append_transfer_record(
        &self,
        record: TransferRecordModel,
    ) -> Result<TransferRecordModel, RepositoryError>;
}
