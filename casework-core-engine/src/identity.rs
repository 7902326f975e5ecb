use casework_core_api::{RoleTag, UserContext, UserId};
use std::collections::BTreeSet;
use std::str::FromStr;
use tracing::warn;

/// Role tags resolved from identity-provider group names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedRoles {
    pub roles: BTreeSet<RoleTag>,
    /// Group names that are not a known role tag
    pub unknown: Vec<String>,
}

/// Resolves raw group names into role tags once, at the identity boundary.
///
/// Names must match the canonical tag exactly (surrounding whitespace is
/// ignored). Unknown names are returned and logged, never guessed at.
pub fn resolve_role_tags<S: AsRef<str>>(group_names: &[S]) -> ResolvedRoles {
    let mut resolved = ResolvedRoles::default();
    for name in group_names {
        let name = name.as_ref().trim();
        match RoleTag::from_str(name) {
            Ok(role) => {
                resolved.roles.insert(role);
            }
            Err(()) => {
                warn!(group = name, "ignoring unknown role group");
                resolved.unknown.push(name.to_string());
            }
        }
    }
    resolved
}

/// Builds the caller context the engine works with.
pub fn user_context<S: AsRef<str>>(user_id: UserId, group_names: &[S]) -> (UserContext, Vec<String>) {
    let resolved = resolve_role_tags(group_names);
    (UserContext::new(user_id, resolved.roles), resolved.unknown)
}
