use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

pub type LeaveId = u64;
pub type EmployeeId = u64;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Display, EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

impl LeaveStatus {
    /// Approved and rejected requests accept no further transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, LeaveStatus::Approved | LeaveStatus::Rejected)
    }

    /// Whether a request in this status still occupies the calendar.
    pub fn blocks_calendar(&self) -> bool {
        !matches!(self, LeaveStatus::Rejected)
    }
}

/// One leave request. `id` stays `None` until the repository stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "id": 1,
    "employee_id": 1000,
    "start_date": "2024-01-10",
    "end_date": "2024-01-14",
    "reason": "family trip",
    "status": "pending",
    "manager_comments": null,
    "created_at": "2024-01-01T00:00:00Z"
}))]
pub struct LeaveRecord {
    #[schema(example = 1, value_type = Option<u64>)]
    pub id: Option<LeaveId>,
    #[schema(example = 1000, value_type = u64)]
    pub employee_id: EmployeeId,
    #[schema(example = "2024-01-10", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2024-01-14", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    pub reason: String,
    pub status: LeaveStatus,
    pub manager_comments: Option<String>,
    #[schema(example = "2024-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: Option<DateTime<Utc>>,
}

impl LeaveRecord {
    /// Fresh, unpersisted pending request.
    pub fn pending(
        employee_id: EmployeeId,
        start_date: NaiveDate,
        end_date: NaiveDate,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            employee_id,
            start_date,
            end_date,
            reason: reason.into(),
            status: LeaveStatus::Pending,
            manager_comments: None,
            created_at: None,
        }
    }

    pub fn duration_in_days(&self) -> i64 {
        duration_in_days(self.start_date, self.end_date)
    }

    /// Inclusive-inclusive overlap of the two date ranges.
    pub fn overlaps(&self, other: &LeaveRecord) -> bool {
        self.start_date <= other.end_date && self.end_date >= other.start_date
    }
}

/// Inclusive day count; a one-day leave has `start == end`.
pub fn duration_in_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

/// Caller-supplied submission. Status is not part of it: new requests are
/// always pending.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct LeaveSubmission {
    #[schema(example = 1000, value_type = Option<u64>)]
    pub employee_id: Option<EmployeeId>,
    #[schema(example = "2024-01-10", format = "date", value_type = Option<String>)]
    pub start_date: Option<NaiveDate>,
    #[schema(example = "2024-01-14", format = "date", value_type = Option<String>)]
    pub end_date: Option<NaiveDate>,
    #[schema(example = "family trip")]
    #[serde(default)]
    pub reason: String,
}

/// Administrative correction of a pending request.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LeaveDetails {
    #[schema(example = "2024-01-10", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2024-01-12", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "shortened trip")]
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn duration_counts_both_ends() {
        assert_eq!(duration_in_days(date(2024, 1, 10), date(2024, 1, 14)), 5);
        assert_eq!(duration_in_days(date(2024, 1, 10), date(2024, 1, 10)), 1);
        assert_eq!(duration_in_days(date(2024, 2, 28), date(2024, 3, 1)), 3);
    }

    #[test]
    fn status_text_matches_storage_values() {
        assert_eq!(LeaveStatus::Pending.as_ref(), "pending");
        assert_eq!(LeaveStatus::Approved.to_string(), "approved");
        assert_eq!(
            LeaveStatus::from_str("rejected").expect("known status"),
            LeaveStatus::Rejected
        );
        assert!(LeaveStatus::from_str("cancelled").is_err());
    }

    #[test]
    fn terminal_and_calendar_flags() {
        assert!(!LeaveStatus::Pending.is_terminal());
        assert!(LeaveStatus::Approved.is_terminal());
        assert!(LeaveStatus::Rejected.is_terminal());
        assert!(LeaveStatus::Pending.blocks_calendar());
        assert!(LeaveStatus::Approved.blocks_calendar());
        assert!(!LeaveStatus::Rejected.blocks_calendar());
    }

    #[test]
    fn new_records_are_pending_without_id() {
        let record = LeaveRecord::pending(7, date(2024, 1, 1), date(2024, 1, 2), "rest");
        assert_eq!(record.status, LeaveStatus::Pending);
        assert!(record.id.is_none());
        assert!(record.manager_comments.is_none());
    }
}
