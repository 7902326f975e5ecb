use casework_core_api::{ActivityId, ReviewDecision, ReviewStage, UserId};
use chrono::{DateTime, Utc};
use heapless::String as HeaplessString;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Identifiable;

/// # Documentation
/// A supervisor or legal decision in the visado of an activity.
///
/// Reopening a legally approved activity invalidates its earlier decisions:
/// they stay in the history but are no longer current.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecordModel {
    pub id: Uuid,
    pub activity_id: ActivityId,
    pub stage: ReviewStage,
    pub decision: ReviewDecision,
    pub observations: Option<HeaplessString<2000>>,
    pub reviewed_by: UserId,
    pub reviewed_at: DateTime<Utc>,
    pub invalidated_at: Option<DateTime<Utc>>,
    pub invalidated_by: Option<UserId>,
}

impl ReviewRecordModel {
    pub fn is_current(&self) -> bool {
        self.invalidated_at.is_none()
    }
}

impl Identifiable for ReviewRecordModel {
    type Id = Uuid;

    fn get_id(&self) -> Uuid {
        self.id
    }
}
