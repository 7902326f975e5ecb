use casework_core_api::{
    ActivityState, CapabilitySet, LifecycleError, LifecycleResult, RoleTag, UserContext, UserId,
};
use casework_core_db::models::activity::ActivityModel;

/// Derives what `user` may do to an activity in `state`.
///
/// Pure and recomputed on every call. Director and administrator tags only
/// ever add capabilities.
pub fn authorize(
    user: &UserContext,
    state: ActivityState,
    responsible_principal: Option<UserId>,
) -> CapabilitySet {
    let is_locked = state.is_locked();
    let is_responsible = responsible_principal == Some(user.user_id);
    let supervisory = user.is_supervisor() || user.is_director();
    let privileged = supervisory || user.is_administrator();

    CapabilitySet {
        is_locked,
        is_responsible,
        can_edit: !is_locked && (is_responsible || privileged),
        can_reopen: is_locked && privileged,
        can_transfer: !is_locked && supervisory,
        can_approve: user.has(RoleTag::LegalTeam) && state == ActivityState::PendingLegalReview,
    }
}

pub fn authorize_activity(user: &UserContext, activity: &ActivityModel) -> CapabilitySet {
    authorize(user, activity.state, activity.responsible_principal)
}

/// Supervisor approval and rejection are open to zonal supervisors and directors.
pub fn can_review_as_supervisor(user: &UserContext, state: ActivityState) -> bool {
    state == ActivityState::PendingSupervisorReview && (user.is_supervisor() || user.is_director())
}

pub(crate) fn require(allowed: bool, capability: &str) -> LifecycleResult<()> {
    if allowed {
        Ok(())
    } else {
        Err(LifecycleError::Unauthorized(format!("{capability} required")))
    }
}
