use serde::{Deserialize, Serialize};

/// The two steps of the visado double approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "review_stage", rename_all = "SCREAMING_SNAKE_CASE")
)]
pub enum ReviewStage {
    Supervisor,
    Legal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "review_decision", rename_all = "SCREAMING_SNAKE_CASE")
)]
pub enum ReviewDecision {
    Approved,
    Rejected,
}
