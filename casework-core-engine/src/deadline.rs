use casework_core_api::{ActivityId, ActivityState, DeadlineBucket, DeadlineClass, DeadlineSortKey};
use casework_core_db::models::activity::ActivityModel;
use chrono::NaiveDate;

/// Buckets an activity by urgency.
///
/// Rules, first match wins: closed state, overdue flag, within
/// `due_soon_days` (inclusive), otherwise on track.
pub fn classify(
    activity_id: ActivityId,
    days_remaining: i64,
    is_overdue: bool,
    state: ActivityState,
    due_soon_days: i64,
) -> DeadlineClass {
    let bucket = if state.is_closed() {
        DeadlineBucket::Closed
    } else if is_overdue {
        DeadlineBucket::Overdue
    } else if days_remaining <= due_soon_days {
        DeadlineBucket::DueSoon
    } else {
        DeadlineBucket::OnTrack
    };

    DeadlineClass {
        bucket,
        sort_key: DeadlineSortKey {
            bucket,
            days_remaining,
            activity_id,
        },
    }
}

/// Classifies a stored activity relative to `today`.
pub fn classify_deadline(activity: &ActivityModel, today: NaiveDate, due_soon_days: i64) -> DeadlineClass {
    classify(
        activity.id,
        activity.days_remaining(today),
        activity.is_overdue(today),
        activity.state,
        due_soon_days,
    )
}

/// Sorts most urgent first.
pub fn sort_by_urgency<T>(items: &mut [T], key: impl Fn(&T) -> DeadlineSortKey) {
    items.sort_by_key(key);
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_overdue_bucket() {
        let class = classify(1, -3, true, ActivityState::InProgress, 7);
        assert_eq!(class.bucket, DeadlineBucket::Overdue);
    }

    #[test]
    fn test_due_soon_and_on_track() {
        assert_eq!(classify(1, 5, false, ActivityState::Pending, 7).bucket, DeadlineBucket::DueSoon);
        assert_eq!(classify(1, 7, false, ActivityState::Pending, 7).bucket, DeadlineBucket::DueSoon);
        assert_eq!(classify(1, 10, false, ActivityState::Pending, 7).bucket, DeadlineBucket::OnTrack);
    }

    #[test]
    fn test_closed_states_leave_every_bucket() {
        for state in [
            ActivityState::Cancelled,
            ActivityState::Completed,
            ActivityState::LegalApproved,
        ] {
            assert_eq!(classify(1, -30, true, state, 7).bucket, DeadlineBucket::Closed);
            assert_eq!(classify(1, 2, false, state, 7).bucket, DeadlineBucket::Closed);
        }
    }

    #[test]
    fn test_ties_break_on_activity_id() {
        let mut classes = vec![
            classify(9, 3, false, ActivityState::Pending, 7),
            classify(4, 3, false, ActivityState::Pending, 7),
            classify(2, -1, true, ActivityState::Overdue, 7),
        ];
        sort_by_urgency(&mut classes, |c| c.sort_key);
        let ids: Vec<_> = classes.iter().map(|c| c.sort_key.activity_id).collect();
        assert_eq!(ids, vec![2, 4, 9]);
    }

    fn any_state() -> impl Strategy<Value = ActivityState> {
        proptest::sample::select(ActivityState::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn prop_ordering_is_bucket_then_days(
            a in (0i64..1000, -60i64..60, any::<bool>(), any_state()),
            b in (0i64..1000, -60i64..60, any::<bool>(), any_state()),
        ) {
            let ca = classify(a.0, a.1, a.2, a.3, 7);
            let cb = classify(b.0, b.1, b.2, b.3, 7);
            if ca.bucket < cb.bucket {
                prop_assert!(ca.sort_key < cb.sort_key);
            }
            if ca.bucket == cb.bucket && ca.sort_key.days_remaining < cb.sort_key.days_remaining {
                prop_assert!(ca.sort_key < cb.sort_key);
            }
        }

        #[test]
        fn prop_closed_iff_closed_state(days in -60i64..60, overdue in any::<bool>(), state in any_state()) {
            let class = classify(1, days, overdue, state, 7);
            prop_assert_eq!(class.bucket == DeadlineBucket::Closed, state.is_closed());
        }
    }
}
