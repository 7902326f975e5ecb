use casework_core_api::{
    ActivityId, CapabilitySet, DeadlineClass, LifecycleResult, UserContext,
};
use casework_core_db::models::activity::ActivityModel;
use casework_core_db::models::audit::AuditRecordModel;
use casework_core_db::models::review::ReviewRecordModel;
use casework_core_db::repository::{Page, PageRequest};
use serde::Serialize;
use sqlx::Database;
use tracing::{debug, instrument};

use crate::authorization::{authorize_activity, require};
use crate::context::CallContext;
use crate::deadline::{classify_deadline, sort_by_urgency};
use crate::engine::ActivityEngine;
use crate::gateway::ActivityGateway;
use crate::visibility::visible_actors;

/// One activity as shown on a board, with everything derived for "now".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardEntry {
    pub activity: ActivityModel,
    pub days_remaining: i64,
    pub is_overdue: bool,
    pub deadline: DeadlineClass,
    pub capabilities: CapabilitySet,
}

impl<DB: Database, G: ActivityGateway<DB>> ActivityEngine<DB, G> {
    /// History of an activity, newest first. Read-only.
    #[instrument(skip_all, fields(activity_id = activity_id, user_id = user.user_id))]
    pub async fn audit_trail(
        &self,
        ctx: &CallContext,
        user: &UserContext,
        activity_id: ActivityId,
        page: PageRequest,
    ) -> LifecycleResult<Page<AuditRecordModel>> {
        let activity = self.load(ctx, activity_id).await?;
        require(visible_actors(user).can_see(activity.actor), "visibility of the owning team")?;
        ctx.run(self.gateway.load_audit_trail(activity_id, page)).await
    }

    /// Visado decisions, oldest first, including invalidated ones.
    #[instrument(skip_all, fields(activity_id = activity_id, user_id = user.user_id))]
    pub async fn review_records(
        &self,
        ctx: &CallContext,
        user: &UserContext,
        activity_id: ActivityId,
    ) -> LifecycleResult<Vec<ReviewRecordModel>> {
        let activity = self.load(ctx, activity_id).await?;
        require(visible_actors(user).can_see(activity.actor), "visibility of the owning team")?;
        ctx.run(self.gateway.find_review_records_by_activity_id(activity_id))
            .await
    }

    /// Loads the given activities, drops the ones the user may not see or
    /// that do not exist, and returns the rest most urgent first.
    #[instrument(skip_all, fields(user_id = user.user_id, requested = ids.len()))]
    pub async fn load_board(
        &self,
        ctx: &CallContext,
        user: &UserContext,
        ids: &[ActivityId],
    ) -> LifecycleResult<Vec<BoardEntry>> {
        let visibility = visible_actors(user);
        let today = self.today();
        let loaded = ctx.run(self.gateway.load_batch(ids)).await?;

        let mut entries: Vec<BoardEntry> = loaded
            .into_iter()
            .flatten()
            .filter(|activity| visibility.can_see(activity.actor))
            .map(|activity| BoardEntry {
                days_remaining: activity.days_remaining(today),
                is_overdue: activity.is_overdue(today),
                deadline: classify_deadline(&activity, today, self.config.due_soon_days),
                capabilities: authorize_activity(user, &activity),
                activity,
            })
            .collect();
        sort_by_urgency(&mut entries, |entry| entry.deadline.sort_key);

        debug!(visible = entries.len(), "board loaded");
        Ok(entries)
    }
}
