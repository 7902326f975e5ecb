use uuid::Uuid;

use super::identifiable::Identifiable;

/// Trait for entities for which audit records are maintained
pub trait Auditable: Identifiable {
    /// Returns the ID of the audit record written with the latest change, if any
    fn get_audit_log_id(&self) -> Option<Uuid>;
}
