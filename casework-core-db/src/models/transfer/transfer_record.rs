use casework_core_api::{ActivityId, ActivityState, Team, UserId};
use chrono::{DateTime, Utc};
use heapless::String as HeaplessString;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Identifiable;

/// # Documentation
/// - Created exactly once per successful transfer of an activity between teams.
/// - Never retargeted or edited afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRecordModel {
    pub id: Uuid,
    pub activity_id: ActivityId,
    pub source_team: Team,
    pub destination_team: Team,
    pub previous_responsible: Option<UserId>,
    pub new_responsible: Option<UserId>,
    pub justification: HeaplessString<2000>,
    pub state_at_transfer: ActivityState,
    pub transferred_by: UserId,
    pub transferred_at: DateTime<Utc>,
}

impl Identifiable for TransferRecordModel {
    type Id = Uuid;

    fn get_id(&self) -> Uuid {
        self.id
    }
}
