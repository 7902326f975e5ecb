use serde::{Deserialize, Serialize};

use super::ids::ActivityId;

/// Urgency bucket of an activity. Variant order is display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeadlineBucket {
    Overdue,
    DueSoon,
    OnTrack,
    /// Completed, cancelled or legally approved: outside every urgency bucket.
    Closed,
}

/// Total display ordering: bucket first, then days remaining ascending,
/// then activity id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DeadlineSortKey {
    pub bucket: DeadlineBucket,
    pub days_remaining: i64,
    pub activity_id: ActivityId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadlineClass {
    pub bucket: DeadlineBucket,
    pub sort_key: DeadlineSortKey,
}
