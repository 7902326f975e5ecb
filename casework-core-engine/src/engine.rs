use casework_core_api::{
    ActivityId, ActivityState, AuditAction, CapabilitySet, DeadlineClass, LifecycleError,
    LifecycleResult, UserContext, MAX_TEXT_CHARS,
};
use casework_core_db::models::activity::ActivityModel;
use casework_core_db::models::audit::AuditRecordModel;
use casework_core_db::repository::{ActivityChange, CasOutcome};
use casework_core_db::utils::bounded;
use chrono::NaiveDate;
use heapless::String as HeaplessString;
use sqlx::Database;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

use crate::authorization::authorize_activity;
use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::context::CallContext;
use crate::deadline::classify_deadline;
use crate::gateway::ActivityGateway;

/// The activity lifecycle engine.
///
/// Stateless between calls: every operation loads what it needs through the
/// gateway, decides, and writes back through a compare-and-swap. The
/// operations themselves live in the `lifecycle`, `review`, `transfer`,
/// `reopen`, `assignment`, `history` and `bulk` modules.
pub struct ActivityEngine<DB: Database, G: ActivityGateway<DB>> {
    pub(crate) gateway: Arc<G>,
    pub(crate) config: EngineConfig,
    pub(crate) clock: Arc<dyn Clock>,
    _db: PhantomData<fn() -> DB>,
}

impl<DB: Database, G: ActivityGateway<DB>> Clone for ActivityEngine<DB, G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            config: self.config.clone(),
            clock: Arc::clone(&self.clock),
            _db: PhantomData,
        }
    }
}

impl<DB: Database, G: ActivityGateway<DB>> ActivityEngine<DB, G> {
    pub fn new(gateway: Arc<G>, config: EngineConfig) -> Self {
        Self {
            gateway,
            config,
            clock: Arc::new(SystemClock),
            _db: PhantomData,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Capability set of `user` on `activity` as it is now. Pure.
    pub fn authorize(&self, user: &UserContext, activity: &ActivityModel) -> CapabilitySet {
        authorize_activity(user, activity)
    }

    /// Deadline bucket and sort key relative to the engine clock. Pure.
    pub fn classify_deadline(&self, activity: &ActivityModel) -> DeadlineClass {
        classify_deadline(activity, self.today(), self.config.due_soon_days)
    }

    pub(crate) async fn load(
        &self,
        ctx: &CallContext,
        activity_id: ActivityId,
    ) -> LifecycleResult<ActivityModel> {
        ctx.run(self.gateway.find_by_id(activity_id))
            .await?
            .ok_or(LifecycleError::NotFound(activity_id))
    }

    pub(crate) fn audit_record(
        &self,
        activity_id: ActivityId,
        action: AuditAction,
        user: &UserContext,
    ) -> AuditRecordModel {
        AuditRecordModel::new(activity_id, action, user.user_id, self.clock.now())
    }

    /// Writes `activity` if the stored copy is still the version it was
    /// loaded from and still in `expected_state`.
    pub(crate) async fn commit(
        &self,
        ctx: &CallContext,
        activity: ActivityModel,
        expected_state: ActivityState,
        audit: AuditRecordModel,
    ) -> LifecycleResult<ActivityModel> {
        self.commit_change(ctx, ActivityChange::new(activity, expected_state, audit))
            .await
    }

    /// Applies a guarded change together with the records it carries, all or
    /// nothing.
    pub(crate) async fn commit_change(
        &self,
        ctx: &CallContext,
        change: ActivityChange,
    ) -> LifecycleResult<ActivityModel> {
        let activity_id = change.activity.id;
        let expected_state = change.expected_state;
        match ctx.run(self.gateway.cas_update_state(change)).await? {
            CasOutcome::Applied(saved) => Ok(saved),
            CasOutcome::Stale { current_state } => {
                debug!(activity_id, expected = %expected_state, found = %current_state, "stale write refused");
                Err(LifecycleError::StaleState {
                    activity_id,
                    expected: expected_state,
                    found: Some(current_state),
                })
            }
            CasOutcome::Missing => {
                debug!(activity_id, "activity vanished before write");
                Err(LifecycleError::StaleState {
                    activity_id,
                    expected: expected_state,
                    found: None,
                })
            }
        }
    }
}

/// Free text bounded to the storage column and the character limit.
pub(crate) fn bounded_text(field: &str, text: &str) -> LifecycleResult<HeaplessString<2000>> {
    let text = text.trim();
    if text.chars().count() as u64 > MAX_TEXT_CHARS {
        return Err(LifecycleError::ValidationError(format!(
            "{field} exceeds {MAX_TEXT_CHARS} characters"
        )));
    }
    bounded(field, text).map_err(LifecycleError::ValidationError)
}

pub(crate) fn invalid(message: String) -> LifecycleError {
    LifecycleError::ValidationError(message)
}
