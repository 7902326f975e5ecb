use serde::{Deserialize, Serialize};

/// What a user may do to one activity in its current state.
///
/// Derived on every request; never cached across a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CapabilitySet {
    pub is_locked: bool,
    pub is_responsible: bool,
    pub can_edit: bool,
    pub can_reopen: bool,
    pub can_transfer: bool,
    pub can_approve: bool,
}
