use casework_core_api::{
    ActivityId, ActivityState, AuditAction, LifecycleError, LifecycleResult, UserContext,
};
use casework_core_db::models::activity::ActivityModel;
use casework_core_db::repository::ActivityChange;
use sqlx::Database;
use tracing::{info, instrument};

use crate::authorization::{authorize_activity, require};
use crate::context::CallContext;
use crate::engine::{invalid, ActivityEngine};
use crate::gateway::ActivityGateway;
use crate::state_machine::{reopen_target, require_justification};

impl<DB: Database, G: ActivityGateway<DB>> ActivityEngine<DB, G> {
    /// Takes a locked activity back into work.
    ///
    /// The target is derived from the current state: `CANCELLED` goes back
    /// to `PENDING`, `COMPLETED` and `LEGAL_APPROVED` to `IN_PROGRESS`.
    /// Reopening a legally approved activity invalidates its review decisions.
    #[instrument(skip_all, fields(activity_id = activity_id, user_id = user.user_id))]
    pub async fn reopen(
        &self,
        ctx: &CallContext,
        user: &UserContext,
        activity_id: ActivityId,
        justification: &str,
    ) -> LifecycleResult<ActivityModel> {
        let activity = self.load(ctx, activity_id).await?;
        require(authorize_activity(user, &activity).can_reopen, "canReopen")?;
        let from = activity.state;
        let to = reopen_target(from).ok_or(LifecycleError::InvalidTransition { from, to: from })?;
        require_justification("reopen", Some(justification), self.config.justification.reopen)?;

        let audit = self
            .audit_record(activity_id, AuditAction::Reopen, user)
            .with_states(from, to)
            .with_justification(Some(justification))
            .map_err(invalid)?;
        let reopened_at = audit.recorded_at;

        let mut updated = activity;
        updated.state = to;
        let mut change = ActivityChange::new(updated, from, audit);
        if from == ActivityState::LegalApproved {
            change = change.invalidating_reviews(user.user_id, reopened_at);
        }
        let saved = self.commit_change(ctx, change).await?;

        info!(from = %from, to = %to, "activity reopened");
        Ok(saved)
    }
}
