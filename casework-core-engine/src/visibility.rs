use casework_core_api::{RoleTag, Team, UserContext};
use std::collections::BTreeSet;

/// Teams whose activities a user may see and filter by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActorVisibility {
    All,
    Teams(BTreeSet<Team>),
}

impl ActorVisibility {
    pub fn can_see(&self, team: Team) -> bool {
        match self {
            ActorVisibility::All => true,
            ActorVisibility::Teams(teams) => teams.contains(&team),
        }
    }

    pub fn teams(&self) -> BTreeSet<Team> {
        match self {
            ActorVisibility::All => Team::ALL.into_iter().collect(),
            ActorVisibility::Teams(teams) => teams.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ActorVisibility::Teams(teams) if teams.is_empty())
    }
}

fn teams_for(role: RoleTag) -> &'static [Team] {
    match role {
        RoleTag::ZonalSupervisor | RoleTag::Director | RoleTag::Administrator => &Team::ALL,
        RoleTag::TechnicalTeam => &[Team::TechnicalTeam],
        RoleTag::LegalTeam => &[Team::LegalTeam],
        RoleTag::ResidentialTeam => &[Team::ResidentialTeam, Team::InstitutionAdults],
    }
}

/// Union of the teams mapped from every role of the user.
pub fn visible_actors(user: &UserContext) -> ActorVisibility {
    if user.is_supervisor() || user.is_director() || user.is_administrator() {
        return ActorVisibility::All;
    }
    let teams = user
        .roles
        .iter()
        .flat_map(|role| teams_for(*role).iter().copied())
        .collect();
    ActorVisibility::Teams(teams)
}

/// Keeps the items whose team is visible to the user, in their original order.
pub fn filter_visible<T>(user: &UserContext, items: Vec<T>, team_of: impl Fn(&T) -> Team) -> Vec<T> {
    let visibility = visible_actors(user);
    items
        .into_iter()
        .filter(|item| visibility.can_see(team_of(item)))
        .collect()
}
