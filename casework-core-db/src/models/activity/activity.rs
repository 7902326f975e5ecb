use casework_core_api::{ActivityId, ActivityState, NewActivity, OriginKind, Team, UserId};
use chrono::NaiveDate;
use heapless::String as HeaplessString;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::models::auditable::Auditable;
use crate::models::identifiable::Identifiable;
use crate::utils::{bounded, hash_as_i64};

/// # Documentation
/// A unit of work in a case's work plan.
///
/// - `state` is the only field shared between concurrent editors; every
///   write to it goes through a compare-and-swap guarded by `state` and `hash`.
/// - `days_remaining` and `is_overdue` are derived from `due_date` on every read
///   and are never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityModel {
    pub id: ActivityId,

    /// The measure (case) whose work plan holds this activity
    pub measure_id: i64,

    pub title: HeaplessString<400>,

    pub state: ActivityState,

    /// Team currently owning the activity
    pub actor: Team,

    pub responsible_principal: Option<UserId>,

    /// Order irrelevant; kept sorted so the content hash is canonical
    pub responsible_secondary: BTreeSet<UserId>,

    pub due_date: NaiveDate,

    /// Fixed at creation by the activity type
    pub requires_legal_review: bool,

    pub origin_kind: OriginKind,

    /// Drafts skip required-field validation until finalized
    pub is_draft: bool,

    /// Number of evidence files attached
    pub evidence_count: i32,

    /// Hash from the previous version for chain verification (0 for initial create)
    pub antecedent_hash: i64,

    /// Audit record of the previous version (Uuid::nil() for initial create)
    pub antecedent_audit_log_id: Uuid,

    /// Hash of the entity with hash field set to 0
    /// - 0: for new entities not yet created or not yet hashed
    /// - Non-zero: computed hash, used as the optimistic-concurrency guard
    pub hash: i64,

    /// Audit record written with the latest change
    pub audit_log_id: Option<Uuid>,
}

impl ActivityModel {
    /// Builds an unsaved activity. New activities are always `PENDING`.
    pub fn from_new(id: ActivityId, new: &NewActivity) -> Result<Self, String> {
        Ok(Self {
            id,
            measure_id: new.measure_id,
            title: bounded("title", &new.title)?,
            state: ActivityState::Pending,
            actor: new.actor,
            responsible_principal: new.responsible_principal,
            responsible_secondary: new.responsible_secondary.clone(),
            due_date: new.due_date,
            requires_legal_review: new.requires_legal_review,
            origin_kind: new.origin_kind,
            is_draft: new.is_draft,
            evidence_count: 0,
            antecedent_hash: 0,
            antecedent_audit_log_id: Uuid::nil(),
            hash: 0,
            audit_log_id: None,
        })
    }

    /// The creation payload this activity would have been built from.
    pub fn to_new(&self) -> NewActivity {
        NewActivity {
            measure_id: self.measure_id,
            title: self.title.to_string(),
            actor: self.actor,
            responsible_principal: self.responsible_principal,
            responsible_secondary: self.responsible_secondary.clone(),
            due_date: self.due_date,
            requires_legal_review: self.requires_legal_review,
            origin_kind: self.origin_kind,
            is_draft: self.is_draft,
        }
    }

    /// Signed days until the due date; negative once it has passed.
    pub fn days_remaining(&self, today: NaiveDate) -> i64 {
        (self.due_date - today).num_days()
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.state == ActivityState::Overdue
            || (!self.state.is_closed() && self.days_remaining(today) < 0)
    }

    pub fn is_responsible(&self, user_id: UserId) -> bool {
        self.responsible_principal == Some(user_id)
    }

    /// Recomputes the content hash with the hash field zeroed.
    pub fn compute_hash(&self) -> Result<i64, String> {
        let mut for_hashing = self.clone();
        for_hashing.hash = 0;
        hash_as_i64(&for_hashing)
    }

    /// Links this version to the one it replaces and stamps the new hash.
    ///
    /// Returns the hash of the replaced version, which the store must still
    /// hold for the write to go through.
    pub fn seal(&mut self, audit_log_id: Uuid) -> Result<i64, String> {
        let previous_hash = self.hash;
        self.antecedent_hash = previous_hash;
        self.antecedent_audit_log_id = self.audit_log_id.unwrap_or_else(Uuid::nil);
        self.audit_log_id = Some(audit_log_id);
        self.hash = self.compute_hash()?;
        Ok(previous_hash)
    }
}

impl Identifiable for ActivityModel {
    type Id = ActivityId;

    fn get_id(&self) -> ActivityId {
        self.id
    }
}

impl Auditable for ActivityModel {
    fn get_audit_log_id(&self) -> Option<Uuid> {
        self.audit_log_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_activity(due_date: NaiveDate) -> NewActivity {
        NewActivity {
            measure_id: 10,
            title: "Home visit".to_string(),
            actor: Team::TechnicalTeam,
            responsible_principal: Some(1),
            responsible_secondary: BTreeSet::new(),
            due_date,
            requires_legal_review: false,
            origin_kind: OriginKind::Manual,
            is_draft: false,
        }
    }

    #[test]
    fn test_from_new_starts_pending() {
        let due = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let activity = ActivityModel::from_new(1, &new_activity(due)).unwrap();
        assert_eq!(activity.state, ActivityState::Pending);
        assert_eq!(activity.hash, 0);
        assert_eq!(activity.audit_log_id, None);
    }

    #[test]
    fn test_days_remaining_and_overdue() {
        let due = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let mut activity = ActivityModel::from_new(1, &new_activity(due)).unwrap();

        let before = NaiveDate::from_ymd_opt(2026, 3, 5).unwrap();
        let after = NaiveDate::from_ymd_opt(2026, 3, 13).unwrap();
        assert_eq!(activity.days_remaining(before), 5);
        assert_eq!(activity.days_remaining(after), -3);
        assert!(!activity.is_overdue(before));
        assert!(activity.is_overdue(after));

        activity.state = ActivityState::Cancelled;
        assert!(!activity.is_overdue(after));
    }

    #[test]
    fn test_seal_chains_versions() {
        let due = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let mut activity = ActivityModel::from_new(1, &new_activity(due)).unwrap();

        let first_audit = Uuid::new_v4();
        assert_eq!(activity.seal(first_audit).unwrap(), 0);
        let first_hash = activity.hash;
        assert_ne!(first_hash, 0);
        assert_eq!(activity.compute_hash().unwrap(), first_hash);

        activity.state = ActivityState::InProgress;
        let second_audit = Uuid::new_v4();
        assert_eq!(activity.seal(second_audit).unwrap(), first_hash);
        assert_eq!(activity.antecedent_hash, first_hash);
        assert_eq!(activity.antecedent_audit_log_id, first_audit);
        assert_eq!(activity.audit_log_id, Some(second_audit));
        assert_ne!(activity.hash, first_hash);
    }
}
