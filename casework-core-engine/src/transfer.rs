use casework_core_api::{
    ActivityId, AuditAction, LifecycleError, LifecycleResult, TransferRequest, UserContext,
};
use casework_core_db::models::activity::ActivityModel;
use casework_core_db::models::transfer::TransferRecordModel;
use casework_core_db::repository::ActivityChange;
use serde_json::json;
use sqlx::Database;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::authorization::{authorize_activity, require};
use crate::context::CallContext;
use crate::engine::{bounded_text, invalid, ActivityEngine};
use crate::gateway::ActivityGateway;
use crate::state_machine::require_justification;

impl<DB: Database, G: ActivityGateway<DB>> ActivityEngine<DB, G> {
    /// Moves an activity to another team, optionally with a new principal
    /// responsible. The state is left as it is.
    #[instrument(skip_all, fields(activity_id = activity_id, user_id = user.user_id, destination = %request.destination))]
    pub async fn transfer(
        &self,
        ctx: &CallContext,
        user: &UserContext,
        activity_id: ActivityId,
        request: TransferRequest,
    ) -> LifecycleResult<TransferRecordModel> {
        let (_, record) = self.transfer_activity(ctx, user, activity_id, &request).await?;
        Ok(record)
    }

    pub(crate) async fn transfer_activity(
        &self,
        ctx: &CallContext,
        user: &UserContext,
        activity_id: ActivityId,
        request: &TransferRequest,
    ) -> LifecycleResult<(ActivityModel, TransferRecordModel)> {
        request.validate()?;
        let activity = self.load(ctx, activity_id).await?;
        require(authorize_activity(user, &activity).can_transfer, "canTransfer")?;
        require_justification(
            "transfer",
            Some(request.justification.as_str()),
            self.config.justification.transfer,
        )?;
        if request.destination == activity.actor {
            return Err(LifecycleError::ValidationError(format!(
                "activity {activity_id} already belongs to {}",
                activity.actor
            )));
        }

        let source_team = activity.actor;
        let state = activity.state;
        let previous_responsible = activity.responsible_principal;
        let audit = self
            .audit_record(activity_id, AuditAction::Transfer, user)
            .with_justification(Some(request.justification.as_str()))
            .map_err(invalid)?
            .with_metadata(json!({
                "source_team": source_team,
                "destination_team": request.destination,
                "previous_responsible": previous_responsible,
                "new_responsible": request.new_responsible,
            }));
        let record = TransferRecordModel {
            id: Uuid::new_v4(),
            activity_id,
            source_team,
            destination_team: request.destination,
            previous_responsible,
            new_responsible: request.new_responsible,
            justification: bounded_text("justification", &request.justification)?,
            state_at_transfer: state,
            transferred_by: user.user_id,
            transferred_at: audit.recorded_at,
        };

        let mut updated = activity;
        updated.actor = request.destination;
        if let Some(principal) = request.new_responsible {
            updated.responsible_principal = Some(principal);
        }
        let change = ActivityChange::new(updated, state, audit).with_transfer(record.clone());
        let saved = self.commit_change(ctx, change).await?;

        info!(from = %source_team, to = %request.destination, "activity transferred");
        Ok((saved, record))
    }
}

#[cfg(test)]
mod tests {
    use crate::test_utils::*;
    use casework_core_api::{
        ActivityState, AuditAction, LifecycleError, Team, TransferRequest,
    };
    use std::error::Error;
    use std::time::Duration;

    type TestResult = Result<(), Box<dyn Error + Send + Sync>>;

    fn to_legal(justification: &str) -> TransferRequest {
        TransferRequest {
            destination: Team::LegalTeam,
            new_responsible: Some(77),
            justification: justification.to_string(),
        }
    }

    #[tokio::test]
    async fn test_transfer_changes_team_not_state() -> TestResult {
        let (engine, store) = test_engine();
        let id = seed(&store, ActivityState::InProgress)?;

        let record = engine
            .transfer(&ctx(), &supervisor(), id, to_legal("custody hearing needs the legal team"))
            .await?;
        assert_eq!(record.source_team, Team::TechnicalTeam);
        assert_eq!(record.destination_team, Team::LegalTeam);
        assert_eq!(record.previous_responsible, Some(RESPONSIBLE_ID));
        assert_eq!(record.state_at_transfer, ActivityState::InProgress);

        let stored = store.transfer_records(id);
        assert_eq!(stored.len(), 1);
        let trail = store.audit_records(id);
        assert_eq!(trail.len(), 1);
        assert_eq!(trail[0].action, AuditAction::Transfer);

        let caps = engine.capabilities(&ctx(), &supervisor(), id).await?;
        assert!(caps.can_transfer);
        Ok(())
    }

    #[tokio::test]
    async fn test_transfer_needs_fifteen_characters() -> TestResult {
        let (engine, store) = test_engine();
        let id = seed(&store, ActivityState::Pending)?;
        let result = engine
            .transfer(&ctx(), &supervisor(), id, to_legal("too short"))
            .await;
        assert!(matches!(
            result,
            Err(LifecycleError::MissingJustification { required: 15, actual: 9, .. })
        ));
        assert!(store.transfer_records(id).is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_responsible_cannot_transfer() -> TestResult {
        let (engine, store) = test_engine();
        let id = seed(&store, ActivityState::Pending)?;
        let result = engine
            .transfer(&ctx(), &responsible(), id, to_legal("custody hearing needs the legal team"))
            .await;
        assert!(matches!(result, Err(LifecycleError::Unauthorized(_))));
        Ok(())
    }

    #[tokio::test]
    async fn test_locked_activity_cannot_be_transferred() -> TestResult {
        let (engine, store) = test_engine();
        let id = seed(&store, ActivityState::Cancelled)?;
        let result = engine
            .transfer(&ctx(), &supervisor(), id, to_legal("custody hearing needs the legal team"))
            .await;
        assert!(matches!(result, Err(LifecycleError::Unauthorized(_))));
        Ok(())
    }

    #[tokio::test]
    async fn test_transfer_to_same_team_is_rejected() -> TestResult {
        let (engine, store) = test_engine();
        let id = seed(&store, ActivityState::Pending)?;
        let request = TransferRequest {
            destination: Team::TechnicalTeam,
            new_responsible: None,
            justification: "rebalancing the team workload".to_string(),
        };
        let result = engine.transfer(&ctx(), &supervisor(), id, request).await;
        assert!(matches!(result, Err(LifecycleError::ValidationError(_))));
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_transfer_cancelled_during_write_leaves_nothing_behind() -> TestResult {
        let (engine, store) = test_engine();
        let id = seed(&store, ActivityState::InProgress)?;
        store.set_latency(Some(Duration::from_millis(10)));

        let context = ctx();
        let token = context.cancellation_token().clone();
        let user = supervisor();
        let request = to_legal("custody hearing needs the legal team");
        // load finishes at 10ms, the write would land at 20ms
        let (result, ()) = tokio::join!(
            engine.transfer(&context, &user, id, request.clone()),
            cancel_after(token, Duration::from_millis(15)),
        );
        assert!(matches!(result, Err(LifecycleError::Cancelled)));
        assert_eq!(store.get(id).map(|a| a.actor), Some(Team::TechnicalTeam));
        assert!(store.transfer_records(id).is_empty());
        assert!(store.audit_records(id).is_empty());

        let record = engine.transfer(&ctx(), &user, id, request).await?;
        assert_eq!(store.transfer_records(id), vec![record]);
        assert_eq!(store.audit_records(id).len(), 1);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_completed_transfer_always_has_its_record() -> TestResult {
        let (engine, store) = test_engine();
        let id = seed(&store, ActivityState::InProgress)?;
        store.set_latency(Some(Duration::from_millis(10)));

        let context = ctx();
        let token = context.cancellation_token().clone();
        let user = supervisor();
        let (result, ()) = tokio::join!(
            engine.transfer(&context, &user, id, to_legal("custody hearing needs the legal team")),
            cancel_after(token, Duration::from_millis(25)),
        );
        let record = result?;
        assert_eq!(store.get(id).map(|a| a.actor), Some(Team::LegalTeam));
        assert_eq!(store.transfer_records(id), vec![record]);
        Ok(())
    }
}
