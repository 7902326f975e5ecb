//! Field-level operations that never change the lifecycle state.

use casework_core_api::{
    ActivityId, AssignmentRequest, AuditAction, LifecycleError, LifecycleResult, UserContext,
};
use casework_core_db::models::activity::ActivityModel;
use casework_core_db::models::audit::AuditRecordModel;
use serde_json::json;
use sqlx::Database;
use tracing::{info, instrument};
use validator::Validate;

use crate::authorization::{authorize_activity, require};
use crate::context::CallContext;
use crate::engine::{bounded_text, ActivityEngine};
use crate::gateway::ActivityGateway;
use crate::visibility::visible_actors;

impl<DB: Database, G: ActivityGateway<DB>> ActivityEngine<DB, G> {
    /// Changes the principal and/or secondary responsibles.
    #[instrument(skip_all, fields(activity_id = activity_id, user_id = user.user_id))]
    pub async fn assign(
        &self,
        ctx: &CallContext,
        user: &UserContext,
        activity_id: ActivityId,
        request: &AssignmentRequest,
    ) -> LifecycleResult<ActivityModel> {
        request.validate()?;
        let activity = self.load(ctx, activity_id).await?;
        require(authorize_activity(user, &activity).can_edit, "canEdit")?;

        let mut updated = activity.clone();
        if let Some(principal) = request.principal {
            updated.responsible_principal = Some(principal);
        }
        if let Some(secondaries) = &request.secondaries {
            updated.responsible_secondary = secondaries.clone();
        }

        let audit = self
            .audit_record(activity_id, AuditAction::Assignment, user)
            .with_metadata(json!({
                "before": {
                    "principal": activity.responsible_principal,
                    "secondaries": activity.responsible_secondary,
                },
                "after": {
                    "principal": updated.responsible_principal,
                    "secondaries": updated.responsible_secondary,
                },
            }));
        let saved = self.commit(ctx, updated, activity.state, audit).await?;
        info!(principal = ?saved.responsible_principal, "responsibles assigned");
        Ok(saved)
    }

    /// Records that an evidence file was attached. Storing the file is
    /// someone else's job; only the count and the reference are kept.
    #[instrument(skip_all, fields(activity_id = activity_id, user_id = user.user_id))]
    pub async fn register_evidence(
        &self,
        ctx: &CallContext,
        user: &UserContext,
        activity_id: ActivityId,
        reference: &str,
    ) -> LifecycleResult<ActivityModel> {
        let reference = bounded_text("evidence reference", reference)?;
        if reference.is_empty() {
            return Err(LifecycleError::ValidationError(
                "evidence reference must not be empty".to_string(),
            ));
        }
        let activity = self.load(ctx, activity_id).await?;
        require(authorize_activity(user, &activity).can_edit, "canEdit")?;

        let mut updated = activity;
        updated.evidence_count += 1;
        let audit = self
            .audit_record(activity_id, AuditAction::AttachmentAdded, user)
            .with_metadata(json!({
                "reference": reference.as_str(),
                "evidence_count": updated.evidence_count,
            }));
        let expected = updated.state;
        self.commit(ctx, updated, expected, audit).await
    }

    /// Appends a comment to the audit trail. The activity row is not touched.
    #[instrument(skip_all, fields(activity_id = activity_id, user_id = user.user_id))]
    pub async fn add_comment(
        &self,
        ctx: &CallContext,
        user: &UserContext,
        activity_id: ActivityId,
        text: &str,
    ) -> LifecycleResult<AuditRecordModel> {
        let text = bounded_text("comment", text)?;
        if text.is_empty() {
            return Err(LifecycleError::ValidationError(
                "comment must not be empty".to_string(),
            ));
        }
        let activity = self.load(ctx, activity_id).await?;
        require(visible_actors(user).can_see(activity.actor), "visibility of the owning team")?;

        let record = self
            .audit_record(activity_id, AuditAction::Comment, user)
            .with_metadata(json!({ "text": text.as_str(), "state": activity.state }));
        ctx.run(self.gateway.append_audit_record(record)).await
    }

    /// Turns a draft into a regular activity once its required fields are set.
    #[instrument(skip_all, fields(activity_id = activity_id, user_id = user.user_id))]
    pub async fn finalize_draft(
        &self,
        ctx: &CallContext,
        user: &UserContext,
        activity_id: ActivityId,
    ) -> LifecycleResult<ActivityModel> {
        let activity = self.load(ctx, activity_id).await?;
        require(authorize_activity(user, &activity).can_edit, "canEdit")?;
        if !activity.is_draft {
            return Err(LifecycleError::ValidationError(format!(
                "activity {activity_id} is not a draft"
            )));
        }
        // Same rules a regular activity is created under.
        let mut submitted = activity.to_new();
        submitted.is_draft = false;
        submitted.validate()?;
        if submitted.title.trim().is_empty() {
            return Err(LifecycleError::ValidationError("title is required".to_string()));
        }
        if activity.responsible_principal.is_none() {
            return Err(LifecycleError::ValidationError(
                "a principal responsible is required".to_string(),
            ));
        }

        let mut updated = activity;
        updated.is_draft = false;
        let audit = self
            .audit_record(activity_id, AuditAction::FieldEdit, user)
            .with_metadata(json!({ "field": "is_draft", "from": true, "to": false }));
        let expected = updated.state;
        let saved = self.commit(ctx, updated, expected, audit).await?;
        info!("draft finalized");
        Ok(saved)
    }
}
