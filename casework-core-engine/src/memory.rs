//! In-process gateway keeping activities and their records in memory.
//!
//! The compare-and-swap runs under one mutex, so it gives the same
//! guarantee as the guarded `UPDATE` of the PostgreSQL gateway. Latency and
//! an outage switch can be injected to exercise timeouts and failures.

use async_trait::async_trait;
use casework_core_api::{ActivityId, UserId};
use casework_core_db::models::activity::ActivityModel;
use casework_core_db::models::audit::AuditRecordModel;
use casework_core_db::models::review::ReviewRecordModel;
use casework_core_db::models::transfer::TransferRecordModel;
use casework_core_db::repository::{
    ActivityChange, AppendAuditRecord, AppendReviewRecord, AppendTransferRecord, CasOutcome,
    CasUpdateState, CreateBatch, FindById, FindReviewRecordsByActivityId, InvalidateReviewRecords,
    LoadAuditTrail, LoadBatch, Page, PageRequest, RepositoryError,
};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use sqlx::Database;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

#[derive(Default)]
struct StoreState {
    activities: HashMap<ActivityId, ActivityModel>,
    audit: Vec<AuditRecordModel>,
    transfers: Vec<TransferRecordModel>,
    reviews: Vec<ReviewRecordModel>,
    last_id: ActivityId,
}

#[derive(Default)]
pub struct InMemoryActivityStore {
    state: Mutex<StoreState>,
    unavailable: AtomicBool,
    latency: Mutex<Option<Duration>>,
}

impl InMemoryActivityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an activity as-is, bypassing the engine. Used to seed states
    /// that only outside processes produce, such as `OVERDUE`.
    pub fn insert(&self, mut activity: ActivityModel) -> Result<ActivityModel, RepositoryError> {
        activity.seal(uuid::Uuid::new_v4())?;
        let mut state = self.state.lock();
        state.last_id = state.last_id.max(activity.id);
        state.activities.insert(activity.id, activity.clone());
        Ok(activity)
    }

    /// Makes every subsequent call fail as if the store were unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Delays every subsequent call.
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.lock() = latency;
    }

    pub fn get(&self, activity_id: ActivityId) -> Option<ActivityModel> {
        self.state.lock().activities.get(&activity_id).cloned()
    }

    pub fn audit_records(&self, activity_id: ActivityId) -> Vec<AuditRecordModel> {
        let state = self.state.lock();
        state
            .audit
            .iter()
            .filter(|r| r.activity_id == activity_id)
            .cloned()
            .collect()
    }

    pub fn transfer_records(&self, activity_id: ActivityId) -> Vec<TransferRecordModel> {
        let state = self.state.lock();
        state
            .transfers
            .iter()
            .filter(|r| r.activity_id == activity_id)
            .cloned()
            .collect()
    }

    pub fn review_records(&self, activity_id: ActivityId) -> Vec<ReviewRecordModel> {
        let state = self.state.lock();
        state
            .reviews
            .iter()
            .filter(|r| r.activity_id == activity_id)
            .cloned()
            .collect()
    }

    async fn enter(&self) -> Result<(), RepositoryError> {
        let latency = *self.latency.lock();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err("data store unavailable".into());
        }
        Ok(())
    }
}

#[async_trait]
impl<DB: Database> FindById<DB, ActivityModel> for InMemoryActivityStore {
    async fn find_by_id(&self, id: ActivityId) -> Result<Option<ActivityModel>, RepositoryError> {
        self.enter().await?;
        Ok(self.state.lock().activities.get(&id).cloned())
    }
}

#[async_trait]
impl<DB: Database> LoadBatch<DB, ActivityModel> for InMemoryActivityStore {
    async fn load_batch(&self, ids: &[ActivityId]) -> Result<Vec<Option<ActivityModel>>, RepositoryError> {
        self.enter().await?;
        let state = self.state.lock();
        Ok(ids.iter().map(|id| state.activities.get(id).cloned()).collect())
    }
}

#[async_trait]
impl<DB: Database> CreateBatch<DB, ActivityModel> for InMemoryActivityStore {
    async fn create_batch(
        &self,
        items: Vec<(ActivityModel, AuditRecordModel)>,
    ) -> Result<Vec<ActivityModel>, RepositoryError> {
        self.enter().await?;
        let mut state = self.state.lock();
        let mut created = Vec::with_capacity(items.len());
        for (mut activity, mut audit) in items {
            if activity.id == 0 {
                state.last_id += 1;
                activity.id = state.last_id;
            } else if state.activities.contains_key(&activity.id) {
                return Err(format!("activity {} already exists", activity.id).into());
            }
            audit.activity_id = activity.id;
            activity.seal(audit.id)?;
            state.last_id = state.last_id.max(activity.id);
            state.activities.insert(activity.id, activity.clone());
            state.audit.push(audit);
            created.push(activity);
        }
        Ok(created)
    }
}

#[async_trait]
impl<DB: Database> CasUpdateState<DB> for InMemoryActivityStore {
    async fn cas_update_state(&self, change: ActivityChange) -> Result<CasOutcome, RepositoryError> {
        self.enter().await?;
        let ActivityChange {
            mut activity,
            expected_state,
            audit,
            transfer,
            review,
            invalidate_reviews,
        } = change;
        let previous_hash = activity.seal(audit.id)?;

        let mut state = self.state.lock();
        let Some(stored) = state.activities.get(&activity.id) else {
            return Ok(CasOutcome::Missing);
        };
        if stored.state != expected_state || stored.hash != previous_hash {
            return Ok(CasOutcome::Stale {
                current_state: stored.state,
            });
        }
        if let Some(stamp) = invalidate_reviews {
            for record in state
                .reviews
                .iter_mut()
                .filter(|r| r.activity_id == activity.id && r.is_current())
            {
                record.invalidated_at = Some(stamp.invalidated_at);
                record.invalidated_by = Some(stamp.invalidated_by);
            }
        }
        state.activities.insert(activity.id, activity.clone());
        state.audit.push(audit);
        state.transfers.extend(transfer);
        state.reviews.extend(review);
        Ok(CasOutcome::Applied(activity))
    }
}

#[async_trait]
impl<DB: Database> AppendAuditRecord<DB> for InMemoryActivityStore {
    async fn append_audit_record(
        &self,
        record: AuditRecordModel,
    ) -> Result<AuditRecordModel, RepositoryError> {
        self.enter().await?;
        self.state.lock().audit.push(record.clone());
        Ok(record)
    }
}

#[async_trait]
impl<DB: Database> AppendTransferRecord<DB> for InMemoryActivityStore {
    async fn append_transfer_record(
        &self,
        record: TransferRecordModel,
    ) -> Result<TransferRecordModel, RepositoryError> {
        self.enter().await?;
        self.state.lock().transfers.push(record.clone());
        Ok(record)
    }
}

#[async_trait]
impl<DB: Database> AppendReviewRecord<DB> for InMemoryActivityStore {
    async fn append_review_record(
        &self,
        record: ReviewRecordModel,
    ) -> Result<ReviewRecordModel, RepositoryError> {
        self.enter().await?;
        self.state.lock().reviews.push(record.clone());
        Ok(record)
    }
}

#[async_trait]
impl<DB: Database> InvalidateReviewRecords<DB> for InMemoryActivityStore {
    async fn invalidate_review_records(
        &self,
        activity_id: ActivityId,
        invalidated_by: UserId,
        invalidated_at: DateTime<Utc>,
    ) -> Result<usize, RepositoryError> {
        self.enter().await?;
        let mut state = self.state.lock();
        let mut count = 0;
        for record in state
            .reviews
            .iter_mut()
            .filter(|r| r.activity_id == activity_id && r.is_current())
        {
            record.invalidated_at = Some(invalidated_at);
            record.invalidated_by = Some(invalidated_by);
            count += 1;
        }
        Ok(count)
    }
}

#[async_trait]
impl<DB: Database> FindReviewRecordsByActivityId<DB> for InMemoryActivityStore {
    async fn find_review_records_by_activity_id(
        &self,
        activity_id: ActivityId,
    ) -> Result<Vec<ReviewRecordModel>, RepositoryError> {
        self.enter().await?;
        let state = self.state.lock();
        Ok(state
            .reviews
            .iter()
            .filter(|r| r.activity_id == activity_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl<DB: Database> LoadAuditTrail<DB> for InMemoryActivityStore {
    async fn load_audit_trail(
        &self,
        activity_id: ActivityId,
        page: PageRequest,
    ) -> Result<Page<AuditRecordModel>, RepositoryError> {
        self.enter().await?;
        let state = self.state.lock();
        let newest_first: Vec<_> = state
            .audit
            .iter()
            .rev()
            .filter(|r| r.activity_id == activity_id)
            .cloned()
            .collect();
        Ok(Page::from_slice(&newest_first, page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sample_activity;
    use casework_core_api::{ActivityState, AuditAction, Team};
    use sqlx::Postgres;

    fn change(activity: ActivityModel, to: ActivityState) -> ActivityChange {
        let expected_state = activity.state;
        let audit = AuditRecordModel::new(activity.id, AuditAction::StateChange, 1, Utc::now())
            .with_states(expected_state, to);
        let mut activity = activity;
        activity.state = to;
        ActivityChange::new(activity, expected_state, audit)
    }

    #[tokio::test]
    async fn test_cas_admits_one_writer_per_version() -> Result<(), RepositoryError> {
        let store = InMemoryActivityStore::new();
        let stored = store.insert(sample_activity(1))?;

        let first = CasUpdateState::<Postgres>::cas_update_state(
            &store,
            change(stored.clone(), ActivityState::InProgress),
        )
        .await?;
        let second = CasUpdateState::<Postgres>::cas_update_state(
            &store,
            change(stored, ActivityState::Cancelled),
        )
        .await?;

        assert!(matches!(first, CasOutcome::Applied(ref a) if a.state == ActivityState::InProgress));
        assert_eq!(
            second,
            CasOutcome::Stale {
                current_state: ActivityState::InProgress
            }
        );
        assert_eq!(store.audit_records(1).len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_change_records_follow_the_write() -> Result<(), RepositoryError> {
        let store = InMemoryActivityStore::new();
        let stored = store.insert(sample_activity(3))?;
        let transfer = TransferRecordModel {
            id: uuid::Uuid::new_v4(),
            activity_id: 3,
            source_team: Team::TechnicalTeam,
            destination_team: Team::LegalTeam,
            previous_responsible: None,
            new_responsible: None,
            justification: casework_core_db::utils::bounded("justification", "hearing moved to legal")?,
            state_at_transfer: ActivityState::Pending,
            transferred_by: 1,
            transferred_at: Utc::now(),
        };

        let applied = CasUpdateState::<Postgres>::cas_update_state(
            &store,
            change(stored.clone(), ActivityState::InProgress).with_transfer(transfer.clone()),
        )
        .await?;
        assert!(matches!(applied, CasOutcome::Applied(_)));

        let stale = CasUpdateState::<Postgres>::cas_update_state(
            &store,
            change(stored, ActivityState::Cancelled).with_transfer(transfer),
        )
        .await?;
        assert!(matches!(stale, CasOutcome::Stale { .. }));
        assert_eq!(store.transfer_records(3).len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_cas_on_missing_activity() -> Result<(), RepositoryError> {
        let store = InMemoryActivityStore::new();
        let outcome = CasUpdateState::<Postgres>::cas_update_state(
            &store,
            change(sample_activity(8), ActivityState::InProgress),
        )
        .await?;
        assert_eq!(outcome, CasOutcome::Missing);
        assert!(store.audit_records(8).is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_assigns_ids() -> Result<(), RepositoryError> {
        let store = InMemoryActivityStore::new();
        store.insert(sample_activity(5))?;
        let items = vec![(
            sample_activity(0),
            AuditRecordModel::new(0, AuditAction::Created, 1, Utc::now()),
        )];
        let created = CreateBatch::<Postgres, ActivityModel>::create_batch(&store, items).await?;
        assert_eq!(created[0].id, 6);
        assert_ne!(created[0].hash, 0);
        assert_eq!(store.audit_records(6)[0].action, AuditAction::Created);
        Ok(())
    }

    #[tokio::test]
    async fn test_outage_fails_calls() {
        let store = InMemoryActivityStore::new();
        store.set_unavailable(true);
        let result = FindById::<Postgres, ActivityModel>::find_by_id(&store, 1).await;
        assert!(result.is_err());
    }
}
