//! The activity transition table and the checks that guard it.
//!
//! Every edge an activity can take is listed once in [`EDGES`], tagged with
//! how it may be fired. `request_transition` only follows
//! [`EdgeKind::Requestable`] edges; the others belong to the review, reopen
//! and escalation operations, or to the external overdue sweep.

use casework_core_api::{
    ActivityState, CapabilitySet, LifecycleError, LifecycleResult, TransitionRequest, UserContext,
};
use casework_core_db::models::activity::ActivityModel;
use std::collections::{BTreeSet, VecDeque};

use crate::authorization::require;
use crate::config::EngineConfig;

use ActivityState::*;

/// Evidence files an externally originated activity needs before completion.
pub const REQUIRED_EVIDENCE: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// Fired through the generic transition call, gated by `canEdit`
    Requestable,
    /// Performed by the engine itself when completion needs legal review
    System,
    SupervisorReview,
    LegalReview,
    Reopen,
    /// Applied by the scheduled overdue sweep outside the engine
    ExternalSweep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub from: ActivityState,
    pub to: ActivityState,
    pub kind: EdgeKind,
}

const fn edge(from: ActivityState, to: ActivityState, kind: EdgeKind) -> Edge {
    Edge { from, to, kind }
}

pub const EDGES: [Edge; 18] = [
    edge(Pending, InProgress, EdgeKind::Requestable),
    edge(Pending, Cancelled, EdgeKind::Requestable),
    edge(InProgress, Completed, EdgeKind::Requestable),
    edge(InProgress, Cancelled, EdgeKind::Requestable),
    edge(InProgress, Pending, EdgeKind::Requestable),
    edge(LegalRejectedWithNotes, InProgress, EdgeKind::Requestable),
    edge(Overdue, InProgress, EdgeKind::Requestable),
    edge(Overdue, Cancelled, EdgeKind::Requestable),
    edge(Completed, PendingSupervisorReview, EdgeKind::System),
    edge(PendingSupervisorReview, PendingLegalReview, EdgeKind::SupervisorReview),
    edge(PendingSupervisorReview, InProgress, EdgeKind::SupervisorReview),
    edge(PendingLegalReview, LegalApproved, EdgeKind::LegalReview),
    edge(PendingLegalReview, LegalRejectedWithNotes, EdgeKind::LegalReview),
    edge(Cancelled, Pending, EdgeKind::Reopen),
    edge(Completed, InProgress, EdgeKind::Reopen),
    edge(LegalApproved, InProgress, EdgeKind::Reopen),
    edge(Pending, Overdue, EdgeKind::ExternalSweep),
    edge(InProgress, Overdue, EdgeKind::ExternalSweep),
];

pub fn edge_kind(from: ActivityState, to: ActivityState) -> Option<EdgeKind> {
    EDGES
        .iter()
        .find(|e| e.from == from && e.to == to)
        .map(|e| e.kind)
}

pub fn is_requestable(from: ActivityState, to: ActivityState) -> bool {
    edge_kind(from, to) == Some(EdgeKind::Requestable)
}

pub fn requestable_targets(from: ActivityState) -> impl Iterator<Item = ActivityState> {
    EDGES
        .iter()
        .filter(move |e| e.from == from && e.kind == EdgeKind::Requestable)
        .map(|e| e.to)
}

/// Where a reopen lands; `None` for states that cannot be reopened.
pub fn reopen_target(from: ActivityState) -> Option<ActivityState> {
    EDGES
        .iter()
        .find(|e| e.from == from && e.kind == EdgeKind::Reopen)
        .map(|e| e.to)
}

/// Every state reachable from `start` over any edge.
pub fn reachable_from(start: ActivityState) -> BTreeSet<ActivityState> {
    let mut seen = BTreeSet::from([start]);
    let mut queue = VecDeque::from([start]);
    while let Some(state) = queue.pop_front() {
        for e in EDGES.iter().filter(|e| e.from == state) {
            if seen.insert(e.to) {
                queue.push_back(e.to);
            }
        }
    }
    seen
}

/// Character count of the trimmed text, checked against a minimum.
pub fn require_justification(
    operation: &str,
    text: Option<&str>,
    required: usize,
) -> LifecycleResult<()> {
    let actual = text.map(|t| t.trim().chars().count()).unwrap_or(0);
    if actual < required {
        return Err(LifecycleError::MissingJustification {
            operation: operation.to_string(),
            required,
            actual,
        });
    }
    Ok(())
}

/// An accepted transition, ready to be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionPlan {
    pub from: ActivityState,
    pub requested: ActivityState,
    /// State actually written; differs from `requested` when completion escalates
    pub to: ActivityState,
    pub escalated: bool,
}

/// Validates a requested transition against the table, the caller's
/// capabilities and the guarded preconditions.
///
/// Check order: stale source, table membership, authorization, draft,
/// cancel justification, evidence.
pub fn plan_transition(
    activity: &ActivityModel,
    request: &TransitionRequest,
    capabilities: &CapabilitySet,
    user: &UserContext,
    config: &EngineConfig,
) -> LifecycleResult<TransitionPlan> {
    let from = activity.state;
    let to = request.target;

    if let Some(expected) = request.expected_source {
        if expected != from {
            return Err(LifecycleError::StaleState {
                activity_id: activity.id,
                expected,
                found: Some(from),
            });
        }
    }

    if !is_requestable(from, to) {
        return Err(LifecycleError::InvalidTransition { from, to });
    }

    require(capabilities.can_edit, "canEdit")?;
    if from == LegalRejectedWithNotes && config.rework_requires_responsible {
        require(activity.is_responsible(user.user_id), "responsible principal")?;
    }

    if activity.is_draft && to != Cancelled {
        return Err(LifecycleError::ValidationError(
            "draft activities must be finalized before they leave PENDING".to_string(),
        ));
    }

    if to == Cancelled {
        require_justification(
            "cancel",
            request.justification.as_deref(),
            config.justification.cancel,
        )?;
    }

    if from == InProgress && to == Completed && activity.origin_kind.requires_evidence() {
        let found = activity.evidence_count.max(0) as u32;
        if found < REQUIRED_EVIDENCE {
            return Err(LifecycleError::MissingEvidence {
                required: REQUIRED_EVIDENCE,
                found,
            });
        }
    }

    let escalated = to == Completed && activity.requires_legal_review;
    Ok(TransitionPlan {
        from,
        requested: to,
        to: if escalated { PendingSupervisorReview } else { to },
        escalated,
    })
}
