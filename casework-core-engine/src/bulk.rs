//! Bulk assignment and transfer.
//!
//! Each id is processed on its own through the single-item operation, with
//! at most `bulk_concurrency` items in flight. There is no rollback across
//! items: the result reports every success and every failure.

use casework_core_api::{
    ActivityId, AssignmentRequest, BulkItemError, BulkResult, LifecycleError, LifecycleResult,
    TransferRequest, UserContext,
};
use casework_core_db::models::activity::ActivityModel;
use futures::future::join_all;
use sqlx::Database;
use std::collections::HashSet;
use std::future::Future;
use tokio::sync::Semaphore;
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::context::CallContext;
use crate::engine::ActivityEngine;
use crate::gateway::ActivityGateway;

/// Message recorded for items the batch never started because the call
/// was cancelled.
pub const CANCELLED_BEFORE_PROCESSING: &str = "cancelled before processing";

impl<DB: Database, G: ActivityGateway<DB>> ActivityEngine<DB, G> {
    #[instrument(skip_all, fields(user_id = user.user_id, items = activity_ids.len()))]
    pub async fn bulk_assign(
        &self,
        ctx: &CallContext,
        user: &UserContext,
        activity_ids: &[ActivityId],
        request: &AssignmentRequest,
    ) -> LifecycleResult<BulkResult<ActivityModel>> {
        request.validate()?;
        self.run_bulk(ctx, "assign", activity_ids, |id| {
            self.assign(ctx, user, id, request)
        })
        .await
    }

    #[instrument(skip_all, fields(user_id = user.user_id, items = activity_ids.len()))]
    pub async fn bulk_transfer(
        &self,
        ctx: &CallContext,
        user: &UserContext,
        activity_ids: &[ActivityId],
        request: &TransferRequest,
    ) -> LifecycleResult<BulkResult<ActivityModel>> {
        request.validate()?;
        self.run_bulk(ctx, "transfer", activity_ids, |id| async move {
            self.transfer_activity(ctx, user, id, request)
                .await
                .map(|(activity, _)| activity)
        })
        .await
    }

    async fn run_bulk<F, Fut>(
        &self,
        ctx: &CallContext,
        operation: &'static str,
        activity_ids: &[ActivityId],
        apply: F,
    ) -> LifecycleResult<BulkResult<ActivityModel>>
    where
        F: Fn(ActivityId) -> Fut,
        Fut: Future<Output = LifecycleResult<ActivityModel>>,
    {
        let ids = dedupe(activity_ids);
        let permits = Semaphore::new(self.config.bulk_concurrency);

        let outcomes = join_all(ids.iter().map(|&id| {
            let permits = &permits;
            let apply = &apply;
            async move {
                let _permit = match permits.acquire().await {
                    Ok(permit) => permit,
                    Err(_) => return (id, Err(None)),
                };
                if ctx.is_cancelled() {
                    return (id, Err(None));
                }
                (id, apply(id).await.map_err(Some))
            }
        }))
        .await;

        let mut result = BulkResult::default();
        let mut infrastructure_failures = 0;
        let mut first_infrastructure_error = None;
        for (activity_id, outcome) in outcomes {
            match outcome {
                Ok(activity) => {
                    result.succeeded_count += 1;
                    result.updated_activities.push(activity);
                }
                Err(error) => {
                    let error_message = match &error {
                        Some(e) => e.to_string(),
                        None => CANCELLED_BEFORE_PROCESSING.to_string(),
                    };
                    if let Some(e) = error.filter(LifecycleError::is_infrastructure) {
                        infrastructure_failures += 1;
                        first_infrastructure_error.get_or_insert(e);
                    }
                    result.errors.push(BulkItemError {
                        activity_id,
                        error_message,
                    });
                }
            }
        }

        if !ids.is_empty() && infrastructure_failures == ids.len() {
            if let Some(error) = first_infrastructure_error {
                warn!(operation, %error, "bulk call failed for every item");
                return Err(error);
            }
        }

        info!(
            operation,
            succeeded = result.succeeded_count,
            failed = result.errors.len(),
            "bulk call finished"
        );
        Ok(result)
    }
}

/// Drops repeated ids, keeping the first occurrence of each.
fn dedupe(ids: &[ActivityId]) -> Vec<ActivityId> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}
