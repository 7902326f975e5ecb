//! Visado: the supervisor review followed by the legal review.

use casework_core_api::{
    ActivityId, ActivityState, AuditAction, LifecycleError, LifecycleResult, ReviewDecision,
    ReviewStage, UserContext,
};
use casework_core_db::models::activity::ActivityModel;
use casework_core_db::models::review::ReviewRecordModel;
use casework_core_db::repository::ActivityChange;
use serde_json::json;
use sqlx::Database;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::authorization::{authorize_activity, can_review_as_supervisor, require};
use crate::context::CallContext;
use crate::engine::{bounded_text, invalid, ActivityEngine};
use crate::gateway::ActivityGateway;
use crate::state_machine::{edge_kind, require_justification, EdgeKind};

struct Decision<'a> {
    stage: ReviewStage,
    decision: ReviewDecision,
    to: ActivityState,
    observations: Option<&'a str>,
}

impl<DB: Database, G: ActivityGateway<DB>> ActivityEngine<DB, G> {
    /// Supervisor sign-off: `PENDING_SUPERVISOR_REVIEW -> PENDING_LEGAL_REVIEW`.
    #[instrument(skip_all, fields(activity_id = activity_id, user_id = user.user_id))]
    pub async fn approve_supervisor(
        &self,
        ctx: &CallContext,
        user: &UserContext,
        activity_id: ActivityId,
    ) -> LifecycleResult<ActivityModel> {
        let activity = self.load(ctx, activity_id).await?;
        self.supervisor_gate(user, &activity, ActivityState::PendingLegalReview)?;
        self.decide(
            ctx,
            user,
            activity,
            Decision {
                stage: ReviewStage::Supervisor,
                decision: ReviewDecision::Approved,
                to: ActivityState::PendingLegalReview,
                observations: None,
            },
        )
        .await
    }

    /// Sends the activity back to `IN_PROGRESS` with the supervisor's reason.
    #[instrument(skip_all, fields(activity_id = activity_id, user_id = user.user_id))]
    pub async fn reject_supervisor(
        &self,
        ctx: &CallContext,
        user: &UserContext,
        activity_id: ActivityId,
        reason: &str,
    ) -> LifecycleResult<ActivityModel> {
        let activity = self.load(ctx, activity_id).await?;
        self.supervisor_gate(user, &activity, ActivityState::InProgress)?;
        require_justification(
            "supervisor rejection",
            Some(reason),
            self.config.justification.rejection,
        )?;
        self.decide(
            ctx,
            user,
            activity,
            Decision {
                stage: ReviewStage::Supervisor,
                decision: ReviewDecision::Rejected,
                to: ActivityState::InProgress,
                observations: Some(reason),
            },
        )
        .await
    }

    /// Legal sign-off: `PENDING_LEGAL_REVIEW -> LEGAL_APPROVED`.
    #[instrument(skip_all, fields(activity_id = activity_id, user_id = user.user_id))]
    pub async fn approve_legal(
        &self,
        ctx: &CallContext,
        user: &UserContext,
        activity_id: ActivityId,
        observations: Option<&str>,
    ) -> LifecycleResult<ActivityModel> {
        let activity = self.load(ctx, activity_id).await?;
        self.legal_gate(user, &activity, ActivityState::LegalApproved)?;
        self.decide(
            ctx,
            user,
            activity,
            Decision {
                stage: ReviewStage::Legal,
                decision: ReviewDecision::Approved,
                to: ActivityState::LegalApproved,
                observations: observations.filter(|text| !text.trim().is_empty()),
            },
        )
        .await
    }

    /// `PENDING_LEGAL_REVIEW -> LEGAL_REJECTED_WITH_NOTES`; observations are mandatory.
    #[instrument(skip_all, fields(activity_id = activity_id, user_id = user.user_id))]
    pub async fn reject_legal(
        &self,
        ctx: &CallContext,
        user: &UserContext,
        activity_id: ActivityId,
        observations: &str,
    ) -> LifecycleResult<ActivityModel> {
        let activity = self.load(ctx, activity_id).await?;
        self.legal_gate(user, &activity, ActivityState::LegalRejectedWithNotes)?;
        require_justification(
            "legal rejection",
            Some(observations),
            self.config.justification.rejection,
        )?;
        self.decide(
            ctx,
            user,
            activity,
            Decision {
                stage: ReviewStage::Legal,
                decision: ReviewDecision::Rejected,
                to: ActivityState::LegalRejectedWithNotes,
                observations: Some(observations),
            },
        )
        .await
    }

    fn supervisor_gate(
        &self,
        user: &UserContext,
        activity: &ActivityModel,
        to: ActivityState,
    ) -> LifecycleResult<()> {
        check_edge(activity.state, to, EdgeKind::SupervisorReview)?;
        require(
            can_review_as_supervisor(user, activity.state),
            "zonal supervisor or director",
        )
    }

    fn legal_gate(
        &self,
        user: &UserContext,
        activity: &ActivityModel,
        to: ActivityState,
    ) -> LifecycleResult<()> {
        check_edge(activity.state, to, EdgeKind::LegalReview)?;
        require(authorize_activity(user, activity).can_approve, "canApprove")
    }

    async fn decide(
        &self,
        ctx: &CallContext,
        user: &UserContext,
        activity: ActivityModel,
        decision: Decision<'_>,
    ) -> LifecycleResult<ActivityModel> {
        let from = activity.state;
        let activity_id = activity.id;
        let action = match decision.decision {
            ReviewDecision::Approved => AuditAction::Approval,
            ReviewDecision::Rejected => AuditAction::Rejection,
        };
        let observations = decision
            .observations
            .map(|text| bounded_text("observations", text))
            .transpose()?;

        let audit = self
            .audit_record(activity_id, action, user)
            .with_states(from, decision.to)
            .with_justification(decision.observations)
            .map_err(invalid)?
            .with_metadata(json!({ "stage": decision.stage }));
        let record = ReviewRecordModel {
            id: Uuid::new_v4(),
            activity_id,
            stage: decision.stage,
            decision: decision.decision,
            observations,
            reviewed_by: user.user_id,
            reviewed_at: audit.recorded_at,
            invalidated_at: None,
            invalidated_by: None,
        };

        let mut updated = activity;
        updated.state = decision.to;
        let change = ActivityChange::new(updated, from, audit).with_review(record);
        let saved = self.commit_change(ctx, change).await?;

        info!(stage = ?decision.stage, decision = ?decision.decision, to = %decision.to, "review recorded");
        Ok(saved)
    }
}

fn check_edge(from: ActivityState, to: ActivityState, kind: EdgeKind) -> LifecycleResult<()> {
    if edge_kind(from, to) == Some(kind) {
        Ok(())
    } else {
        Err(LifecycleError::InvalidTransition { from, to })
    }
}
