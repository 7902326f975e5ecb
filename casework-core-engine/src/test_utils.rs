use casework_core_api::{
    ActivityId, ActivityState, NewActivity, OriginKind, RoleTag, Team, UserContext, UserId,
};
use casework_core_db::models::activity::ActivityModel;
use casework_core_db::repository::RepositoryError;
use chrono::{Days, NaiveDate, TimeZone, Utc};
use sqlx::Postgres;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::clock::FixedClock;
use crate::config::EngineConfig;
use crate::context::CallContext;
use crate::engine::ActivityEngine;
use crate::memory::InMemoryActivityStore;

pub const RESPONSIBLE_ID: UserId = 5;
pub const SUPERVISOR_ID: UserId = 100;
pub const LAWYER_ID: UserId = 200;

static NEXT_ID: AtomicI64 = AtomicI64::new(1_000);

pub type TestEngine = ActivityEngine<Postgres, InMemoryActivityStore>;

pub fn test_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
}

pub fn test_engine() -> (TestEngine, Arc<InMemoryActivityStore>) {
    test_engine_with(EngineConfig::default())
}

pub fn test_engine_with(config: EngineConfig) -> (TestEngine, Arc<InMemoryActivityStore>) {
    let store = Arc::new(InMemoryActivityStore::new());
    let now = Utc.from_utc_datetime(&test_today().and_hms_opt(9, 0, 0).unwrap());
    let engine = ActivityEngine::new(Arc::clone(&store), config)
        .with_clock(Arc::new(FixedClock::new(now)));
    (engine, store)
}

pub fn ctx() -> CallContext {
    CallContext::new(Duration::from_secs(5))
}

pub fn responsible() -> UserContext {
    UserContext::new(RESPONSIBLE_ID, [RoleTag::TechnicalTeam])
}

pub fn supervisor() -> UserContext {
    UserContext::new(SUPERVISOR_ID, [RoleTag::ZonalSupervisor])
}

pub fn lawyer() -> UserContext {
    UserContext::new(LAWYER_ID, [RoleTag::LegalTeam])
}

pub fn new_activity() -> NewActivity {
    NewActivity {
        measure_id: 10,
        title: "Home visit".to_string(),
        actor: Team::TechnicalTeam,
        responsible_principal: Some(RESPONSIBLE_ID),
        responsible_secondary: BTreeSet::new(),
        due_date: test_today().checked_add_days(Days::new(20)).unwrap(),
        requires_legal_review: false,
        origin_kind: OriginKind::Manual,
        is_draft: false,
    }
}

pub fn sample_activity(id: ActivityId) -> ActivityModel {
    ActivityModel::from_new(id, &new_activity()).unwrap()
}

pub fn seed(store: &InMemoryActivityStore, state: ActivityState) -> Result<ActivityId, RepositoryError> {
    seed_with(store, state, |_| {})
}

pub fn seed_with(
    store: &InMemoryActivityStore,
    state: ActivityState,
    adjust: impl FnOnce(&mut ActivityModel),
) -> Result<ActivityId, RepositoryError> {
    let mut activity = sample_activity(NEXT_ID.fetch_add(1, Ordering::SeqCst));
    activity.state = state;
    adjust(&mut activity);
    Ok(store.insert(activity)?.id)
}

/// Fires `token` once `delay` has elapsed on the tokio clock.
pub async fn cancel_after(token: CancellationToken, delay: Duration) {
    tokio::time::sleep(delay).await;
    token.cancel();
}
