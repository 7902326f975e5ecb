use serde::{Deserialize, Serialize};

use super::ids::ActivityId;

/// Failure of one item inside a bulk call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkItemError {
    pub activity_id: ActivityId,
    pub error_message: String,
}

/// Aggregate outcome of a bulk call.
///
/// A non-empty `errors` list means partial success, not failure of the call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkResult<T> {
    pub succeeded_count: usize,
    pub updated_activities: Vec<T>,
    pub errors: Vec<BulkItemError>,
}

impl<T> BulkResult<T> {
    pub fn is_partial(&self) -> bool {
        !self.errors.is_empty() && self.succeeded_count > 0
    }
}

impl<T> Default for BulkResult<T> {
    fn default() -> Self {
        Self {
            succeeded_count: 0,
            updated_activities: Vec::new(),
            errors: Vec::new(),
        }
    }
}
