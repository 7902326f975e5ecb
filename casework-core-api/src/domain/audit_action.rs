use serde::{Deserialize, Serialize};

/// Kind of mutation an audit record documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "audit_action", rename_all = "SCREAMING_SNAKE_CASE")
)]
pub enum AuditAction {
    Created,
    StateChange,
    FieldEdit,
    Reopen,
    Assignment,
    Transfer,
    AttachmentAdded,
    Comment,
    Approval,
    Rejection,
}
