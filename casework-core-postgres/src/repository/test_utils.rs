use casework_core_api::{ActivityState, AuditAction, NewActivity, OriginKind, Team};
use casework_core_db::models::activity::ActivityModel;
use casework_core_db::models::audit::AuditRecordModel;
use casework_core_db::repository::cas_update_state::ActivityChange;
use chrono::{Duration, Utc};
use std::collections::BTreeSet;

/// An unsaved activity; id 0 lets the store assign one.
pub fn create_test_activity() -> ActivityModel {
    let new = NewActivity {
        measure_id: 42,
        title: "Home visit with the family".to_string(),
        actor: Team::TechnicalTeam,
        responsible_principal: Some(5),
        responsible_secondary: BTreeSet::from([6, 7]),
        due_date: (Utc::now() + Duration::days(20)).date_naive(),
        requires_legal_review: false,
        origin_kind: OriginKind::Manual,
        is_draft: false,
    };
    ActivityModel::from_new(0, &new).expect("test activity fits its bounds")
}

pub fn create_test_audit() -> AuditRecordModel {
    AuditRecordModel::new(0, AuditAction::Created, 1, Utc::now())
}

/// A guarded state change of `activity` as it was read.
pub fn state_change(activity: ActivityModel, to: ActivityState) -> ActivityChange {
    let expected_state = activity.state;
    let audit = AuditRecordModel::new(activity.id, AuditAction::StateChange, 5, Utc::now())
        .with_states(expected_state, to);

    let mut changed = activity;
    changed.state = to;
    ActivityChange::new(changed, expected_state, audit)
}
