use casework_core_api::{ActivityId, ActivityState, AuditAction, UserId};
use chrono::{DateTime, Utc};
use heapless::String as HeaplessString;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Identifiable;
use crate::utils::bounded;

/// # Documentation
/// - One immutable record per mutation of an activity.
/// - Written by the engine, owned by the append-only audit trail.
/// - There is no operation that edits or deletes a record once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecordModel {
    pub id: Uuid,
    pub activity_id: ActivityId,
    pub action: AuditAction,
    pub from_state: Option<ActivityState>,
    pub to_state: Option<ActivityState>,
    pub justification: Option<HeaplessString<2000>>,
    /// Action-specific details (assignment before/after, transfer teams, ...)
    pub metadata: serde_json::Value,
    pub acting_user: UserId,
    pub recorded_at: DateTime<Utc>,
}

impl AuditRecordModel {
    pub fn new(
        activity_id: ActivityId,
        action: AuditAction,
        acting_user: UserId,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            activity_id,
            action,
            from_state: None,
            to_state: None,
            justification: None,
            metadata: serde_json::Value::Null,
            acting_user,
            recorded_at,
        }
    }

    pub fn with_states(mut self, from: ActivityState, to: ActivityState) -> Self {
        self.from_state = Some(from);
        self.to_state = Some(to);
        self
    }

    pub fn with_justification(mut self, justification: Option<&str>) -> Result<Self, String> {
        self.justification = justification
            .map(|text| bounded("justification", text.trim()))
            .transpose()?;
        Ok(self)
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

impl Identifiable for AuditRecordModel {
    type Id = Uuid;

    fn get_id(&self) -> Uuid {
        self.id
    }
}
