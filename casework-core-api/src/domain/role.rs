use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

use super::ids::UserId;

/// Closed set of role tags the engine reasons about.
///
/// Raw group names from the identity provider are resolved into these tags
/// once, at the boundary. The engine never matches role-name strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoleTag {
    TechnicalTeam,
    LegalTeam,
    ResidentialTeam,
    ZonalSupervisor,
    Director,
    Administrator,
}

impl RoleTag {
    pub const ALL: [RoleTag; 6] = [
        RoleTag::TechnicalTeam,
        RoleTag::LegalTeam,
        RoleTag::ResidentialTeam,
        RoleTag::ZonalSupervisor,
        RoleTag::Director,
        RoleTag::Administrator,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RoleTag::TechnicalTeam => "TECHNICAL_TEAM",
            RoleTag::LegalTeam => "LEGAL_TEAM",
            RoleTag::ResidentialTeam => "RESIDENTIAL_TEAM",
            RoleTag::ZonalSupervisor => "ZONAL_SUPERVISOR",
            RoleTag::Director => "DIRECTOR",
            RoleTag::Administrator => "ADMINISTRATOR",
        }
    }
}

impl std::fmt::Display for RoleTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exact match on the canonical tag name. No case folding, no fuzzy matching.
impl FromStr for RoleTag {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RoleTag::ALL.into_iter().find(|role| role.as_str() == s).ok_or(())
    }
}

/// The caller of an engine operation, with its resolved role tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContext {
    pub user_id: UserId,
    pub roles: BTreeSet<RoleTag>,
}

impl UserContext {
    pub fn new(user_id: UserId, roles: impl IntoIterator<Item = RoleTag>) -> Self {
        Self {
            user_id,
            roles: roles.into_iter().collect(),
        }
    }

    pub fn has(&self, role: RoleTag) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_supervisor(&self) -> bool {
        self.has(RoleTag::ZonalSupervisor)
    }

    pub fn is_director(&self) -> bool {
        self.has(RoleTag::Director)
    }

    pub fn is_administrator(&self) -> bool {
        self.has(RoleTag::Administrator)
    }
}
