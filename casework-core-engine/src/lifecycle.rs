use casework_core_api::{
    ActivityId, ActivityState, AuditAction, CapabilitySet, LifecycleError, LifecycleResult,
    NewActivity, TransitionRequest, UserContext,
};
use casework_core_db::models::activity::ActivityModel;
use serde_json::json;
use sqlx::Database;
use tracing::{debug, info, instrument};
use validator::Validate;

use crate::authorization::{authorize_activity, require};
use crate::context::CallContext;
use crate::engine::{invalid, ActivityEngine};
use crate::gateway::ActivityGateway;
use crate::state_machine::plan_transition;
use crate::visibility::visible_actors;

impl<DB: Database, G: ActivityGateway<DB>> ActivityEngine<DB, G> {
    /// Creates an activity in `PENDING`, the only creation state.
    ///
    /// Drafts skip payload validation until they are finalized. The caller
    /// must be able to see the owning team.
    #[instrument(skip_all, fields(user_id = user.user_id, measure_id = new.measure_id))]
    pub async fn create_activity(
        &self,
        ctx: &CallContext,
        user: &UserContext,
        new: NewActivity,
    ) -> LifecycleResult<ActivityModel> {
        if !new.is_draft {
            new.validate()?;
        }
        require(visible_actors(user).can_see(new.actor), "visibility of the owning team")?;

        let activity = ActivityModel::from_new(0, &new).map_err(invalid)?;
        let mut audit = self
            .audit_record(0, AuditAction::Created, user)
            .with_metadata(json!({
                "actor": new.actor,
                "is_draft": new.is_draft,
                "origin_kind": new.origin_kind,
            }));
        audit.to_state = Some(ActivityState::Pending);

        let created = ctx
            .run(self.gateway.create_batch(vec![(activity, audit)]))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| LifecycleError::DatabaseError("create returned no activity".to_string()))?;

        info!(activity_id = created.id, "activity created");
        Ok(created)
    }

    /// Capabilities of the caller on the activity as currently stored.
    #[instrument(skip_all, fields(activity_id = activity_id, user_id = user.user_id))]
    pub async fn capabilities(
        &self,
        ctx: &CallContext,
        user: &UserContext,
        activity_id: ActivityId,
    ) -> LifecycleResult<CapabilitySet> {
        let activity = self.load(ctx, activity_id).await?;
        Ok(authorize_activity(user, &activity))
    }

    /// Fires a requestable transition.
    ///
    /// Completing an activity that needs legal review lands directly in
    /// `PENDING_SUPERVISOR_REVIEW`, in the same write.
    #[instrument(skip_all, fields(activity_id = activity_id, user_id = user.user_id, requested = %request.target))]
    pub async fn request_transition(
        &self,
        ctx: &CallContext,
        user: &UserContext,
        activity_id: ActivityId,
        request: TransitionRequest,
    ) -> LifecycleResult<ActivityModel> {
        request.validate()?;
        let activity = self.load(ctx, activity_id).await?;
        let capabilities = authorize_activity(user, &activity);
        let plan = plan_transition(&activity, &request, &capabilities, user, &self.config)
            .inspect_err(|e| debug!(error = %e, "transition refused"))?;

        let mut audit = self
            .audit_record(activity_id, AuditAction::StateChange, user)
            .with_states(plan.from, plan.to)
            .with_justification(request.justification.as_deref())
            .map_err(invalid)?;
        if plan.escalated {
            let completed_at = audit.recorded_at;
            audit = audit.with_metadata(json!({
                "escalated": true,
                "requested": plan.requested,
                "completed_at": completed_at,
            }));
        }

        let mut updated = activity;
        updated.state = plan.to;
        let saved = self.commit(ctx, updated, plan.from, audit).await?;

        info!(from = %plan.from, to = %plan.to, escalated = plan.escalated, "transition applied");
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use crate::test_utils::*;
    use casework_core_api::{
        ActivityState, AuditAction, LifecycleError, OriginKind, RoleTag, TransitionRequest,
        UserContext,
    };
    use std::error::Error;

    type TestResult = Result<(), Box<dyn Error + Send + Sync>>;

    #[tokio::test]
    async fn test_create_starts_pending_with_audit() -> TestResult {
        let (engine, store) = test_engine();
        let created = engine
            .create_activity(&ctx(), &supervisor(), new_activity())
            .await?;
        assert_eq!(created.state, ActivityState::Pending);
        assert_ne!(created.id, 0);

        let trail = store.audit_records(created.id);
        assert_eq!(trail.len(), 1);
        assert_eq!(trail[0].action, AuditAction::Created);
        assert_eq!(trail[0].to_state, Some(ActivityState::Pending));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_requires_team_visibility() {
        let (engine, _) = test_engine();
        let legal = UserContext::new(3, [RoleTag::LegalTeam]);
        let result = engine.create_activity(&ctx(), &legal, new_activity()).await;
        assert!(matches!(result, Err(LifecycleError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_transition_writes_one_state_change() -> TestResult {
        let (engine, store) = test_engine();
        let id = seed(&store, ActivityState::Pending)?;

        let updated = engine
            .request_transition(&ctx(), &responsible(), id, TransitionRequest::to(ActivityState::InProgress))
            .await?;
        assert_eq!(updated.state, ActivityState::InProgress);

        let trail = store.audit_records(id);
        assert_eq!(trail.len(), 1);
        assert_eq!(trail[0].action, AuditAction::StateChange);
        assert_eq!(trail[0].from_state, Some(ActivityState::Pending));
        assert_eq!(trail[0].to_state, Some(ActivityState::InProgress));
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_activity_is_not_found() {
        let (engine, _) = test_engine();
        let result = engine
            .request_transition(&ctx(), &supervisor(), 404, TransitionRequest::to(ActivityState::InProgress))
            .await;
        assert_eq!(result, Err(LifecycleError::NotFound(404)));
    }

    #[tokio::test]
    async fn test_completion_with_legal_review_escalates() -> TestResult {
        let (engine, store) = test_engine();
        let id = seed_with(&store, ActivityState::InProgress, |a| a.requires_legal_review = true)?;

        let updated = engine
            .request_transition(&ctx(), &responsible(), id, TransitionRequest::to(ActivityState::Completed))
            .await?;
        assert_eq!(updated.state, ActivityState::PendingSupervisorReview);

        let trail = store.audit_records(id);
        assert_eq!(trail.len(), 1);
        assert_eq!(trail[0].to_state, Some(ActivityState::PendingSupervisorReview));
        assert_eq!(trail[0].metadata["escalated"], true);
        Ok(())
    }

    #[tokio::test]
    async fn test_completion_without_legal_review_stays_completed() -> TestResult {
        let (engine, store) = test_engine();
        let id = seed(&store, ActivityState::InProgress)?;
        let updated = engine
            .request_transition(&ctx(), &responsible(), id, TransitionRequest::to(ActivityState::Completed))
            .await?;
        assert_eq!(updated.state, ActivityState::Completed);
        Ok(())
    }

    #[tokio::test]
    async fn test_judicial_completion_needs_an_attachment() -> TestResult {
        let (engine, store) = test_engine();
        let id = seed_with(&store, ActivityState::InProgress, |a| {
            a.origin_kind = OriginKind::JudicialRequest
        })?;

        let refused = engine
            .request_transition(&ctx(), &responsible(), id, TransitionRequest::to(ActivityState::Completed))
            .await;
        assert_eq!(refused, Err(LifecycleError::MissingEvidence { required: 1, found: 0 }));

        engine
            .register_evidence(&ctx(), &responsible(), id, "court-report.pdf")
            .await?;
        let completed = engine
            .request_transition(&ctx(), &responsible(), id, TransitionRequest::to(ActivityState::Completed))
            .await?;
        assert_eq!(completed.state, ActivityState::Completed);
        Ok(())
    }

    #[tokio::test]
    async fn test_resubmitted_transition_is_stale() -> TestResult {
        let (engine, store) = test_engine();
        let id = seed(&store, ActivityState::Pending)?;
        let request = TransitionRequest::to(ActivityState::InProgress).expecting(ActivityState::Pending);

        engine
            .request_transition(&ctx(), &responsible(), id, request.clone())
            .await?;
        let again = engine.request_transition(&ctx(), &responsible(), id, request).await;
        assert!(matches!(again, Err(LifecycleError::StaleState { .. })));
        assert_eq!(store.audit_records(id).len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_transitions_admit_exactly_one() -> TestResult {
        let (engine, store) = test_engine();
        let id = seed(&store, ActivityState::Pending)?;
        let user = responsible();
        let context = ctx();

        let start = engine.request_transition(
            &context,
            &user,
            id,
            TransitionRequest::to(ActivityState::InProgress).expecting(ActivityState::Pending),
        );
        let cancel = engine.request_transition(
            &context,
            &user,
            id,
            TransitionRequest::to(ActivityState::Cancelled)
                .with_justification("family moved out of the district")
                .expecting(ActivityState::Pending),
        );
        let (a, b) = tokio::join!(start, cancel);

        let successes = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
        assert_eq!(successes, 1);
        let failure = if a.is_err() { a } else { b };
        assert!(matches!(failure, Err(LifecycleError::StaleState { .. })));
        assert_eq!(store.audit_records(id).len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_capabilities_follow_the_stored_state() -> TestResult {
        let (engine, store) = test_engine();
        let id = seed(&store, ActivityState::Pending)?;
        let caps = engine.capabilities(&ctx(), &responsible(), id).await?;
        assert!(caps.can_edit && !caps.can_transfer);

        let locked = seed(&store, ActivityState::Completed)?;
        let caps = engine.capabilities(&ctx(), &responsible(), locked).await?;
        assert!(caps.is_locked && !caps.can_edit && !caps.can_reopen);
        Ok(())
    }
}
