use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Organizational team ("actor") that owns an activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "team", rename_all = "SCREAMING_SNAKE_CASE")
)]
pub enum Team {
    TechnicalTeam,
    LegalTeam,
    ResidentialTeam,
    InstitutionAdults,
}

impl Team {
    pub const ALL: [Team; 4] = [
        Team::TechnicalTeam,
        Team::LegalTeam,
        Team::ResidentialTeam,
        Team::InstitutionAdults,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Team::TechnicalTeam => "TECHNICAL_TEAM",
            Team::LegalTeam => "LEGAL_TEAM",
            Team::ResidentialTeam => "RESIDENTIAL_TEAM",
            Team::InstitutionAdults => "INSTITUTION_ADULTS",
        }
    }
}

impl std::fmt::Display for Team {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Team {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Team::ALL.into_iter().find(|team| team.as_str() == s).ok_or(())
    }
}
