use serde::{Deserialize, Serialize};

/// How an activity came into existence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "origin_kind", rename_all = "SCREAMING_SNAKE_CASE")
)]
pub enum OriginKind {
    /// Created by a user from the work plan.
    Manual,
    /// Generated from a judicial request received from a court.
    JudicialRequest,
    /// Generated from a court order (oficio).
    CourtOrder,
}

impl OriginKind {
    /// Externally originated activities must carry evidence before completion.
    pub fn requires_evidence(self) -> bool {
        matches!(self, OriginKind::JudicialRequest | OriginKind::CourtOrder)
    }
}
