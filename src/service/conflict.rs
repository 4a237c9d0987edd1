use crate::model::leave_request::LeaveRecord;

/// Whether `candidate` shares a calendar day with any of `existing`.
///
/// `existing` must already be scoped to the candidate's employee. Rejected
/// requests no longer occupy the calendar and are skipped, as is the stored
/// copy of the candidate itself when it carries an id.
pub fn has_conflict(candidate: &LeaveRecord, existing: &[LeaveRecord]) -> bool {
    existing
        .iter()
        .filter(|other| other.status.blocks_calendar())
        .filter(|other| !is_same_record(candidate, other))
        .any(|other| candidate.overlaps(other))
}

fn is_same_record(candidate: &LeaveRecord, other: &LeaveRecord) -> bool {
    candidate.id.is_some() && candidate.id == other.id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::leave_request::LeaveStatus;
    use chrono::NaiveDate;

    fn leave(start: u32, end: u32) -> LeaveRecord {
        LeaveRecord::pending(
            1,
            NaiveDate::from_ymd_opt(2024, 1, start).expect("valid date"),
            NaiveDate::from_ymd_opt(2024, 1, end).expect("valid date"),
            "test",
        )
    }

    fn with(mut record: LeaveRecord, id: u64, status: LeaveStatus) -> LeaveRecord {
        record.id = Some(id);
        record.status = status;
        record
    }

    #[test]
    fn adjacent_ranges_do_not_conflict() {
        let existing = [with(leave(1, 5), 1, LeaveStatus::Pending)];
        assert!(!has_conflict(&leave(6, 10), &existing));
    }

    #[test]
    fn shared_boundary_day_conflicts() {
        let existing = [with(leave(1, 5), 1, LeaveStatus::Approved)];
        assert!(has_conflict(&leave(5, 10), &existing));
    }

    #[test]
    fn single_day_inside_range_conflicts() {
        let existing = [with(leave(1, 5), 1, LeaveStatus::Pending)];
        assert!(has_conflict(&leave(3, 3), &existing));
        assert!(!has_conflict(&leave(9, 9), &existing));
    }

    #[test]
    fn overlap_is_symmetric() {
        let ranges = [(1, 5), (5, 10), (6, 10), (3, 3), (1, 31), (11, 12)];
        for &(a_start, a_end) in &ranges {
            for &(b_start, b_end) in &ranges {
                let a = with(leave(a_start, a_end), 1, LeaveStatus::Pending);
                let b = with(leave(b_start, b_end), 2, LeaveStatus::Pending);
                assert_eq!(
                    has_conflict(&a, std::slice::from_ref(&b)),
                    has_conflict(&b, std::slice::from_ref(&a)),
                    "[{a_start},{a_end}] vs [{b_start},{b_end}]"
                );
            }
        }
    }

    #[test]
    fn rejected_requests_free_the_calendar() {
        let existing = [with(leave(1, 5), 1, LeaveStatus::Rejected)];
        assert!(!has_conflict(&leave(1, 5), &existing));
    }

    #[test]
    fn persisted_candidate_ignores_itself() {
        let stored = with(leave(1, 5), 7, LeaveStatus::Pending);
        let mut moved = stored.clone();
        moved.end_date = NaiveDate::from_ymd_opt(2024, 1, 6).expect("valid date");

        assert!(!has_conflict(&moved, std::slice::from_ref(&stored)));

        let neighbour = with(leave(6, 8), 8, LeaveStatus::Pending);
        assert!(has_conflict(&moved, &[stored, neighbour]));
    }

    #[test]
    fn unpersisted_candidate_is_compared_with_everything() {
        let existing = [with(leave(1, 5), 1, LeaveStatus::Pending)];
        let candidate = leave(1, 5);
        assert!(candidate.id.is_none());
        assert!(has_conflict(&candidate, &existing));
    }

    #[test]
    fn empty_history_never_conflicts() {
        assert!(!has_conflict(&leave(1, 31), &[]));
    }
}
