use casework_core_db::models::activity::ActivityModel;
use casework_core_db::repository::{
    AppendAuditRecord, AppendReviewRecord, AppendTransferRecord, CasUpdateState, CreateBatch,
    FindById, FindReviewRecordsByActivityId, InvalidateReviewRecords, LoadAuditTrail, LoadBatch,
};
use sqlx::Database;

/// Everything the engine needs from the persistence layer.
///
/// Implemented automatically for any type that provides each repository
/// trait for the same database.
pub trait ActivityGateway<DB: Database>:
    FindById<DB, ActivityModel>
    + LoadBatch<DB, ActivityModel>
    + CreateBatch<DB, ActivityModel>
    + CasUpdateState<DB>
    + AppendAuditRecord<DB>
    + AppendTransferRecord<DB>
    + AppendReviewRecord<DB>
    + InvalidateReviewRecords<DB>
    + FindReviewRecordsByActivityId<DB>
    + LoadAuditTrail<DB>
    + Send
    + Sync
{
}

impl<DB, T> ActivityGateway<DB> for T
where
    DB: Database,
    T: FindById<DB, ActivityModel>
        + LoadBatch<DB, ActivityModel>
        + CreateBatch<DB, ActivityModel>
        + CasUpdateState<DB>
        + AppendAuditRecord<DB>
        + AppendTransferRecord<DB>
        + AppendReviewRecord<DB>
        + InvalidateReviewRecords<DB>
        + FindReviewRecordsByActivityId<DB>
        + LoadAuditTrail<DB>
        + Send
        + Sync,
{
}
