use std::sync::Arc;

use chrono::NaiveDate;
use futures::lock::OwnedMutexGuard;
use tracing::{error, info, warn};

use super::balance::{AllowancePolicy, BalanceCalculator, LeaveBalance};
use super::conflict::has_conflict;
use super::locks::EmployeeLocks;
use crate::error::LeaveError;
use crate::model::leave_request::{
    EmployeeId, LeaveDetails, LeaveId, LeaveRecord, LeaveStatus, LeaveSubmission,
};
use crate::repository::{LeaveFilter, LeavePage, LeaveRepository};

/// Drives leave requests through `pending -> approved | rejected`.
///
/// Every operation re-reads current state from the repository before it
/// decides. With write serialization on (the default) the read-validate-write
/// sequence of one employee runs under that employee's lock; with it off,
/// two overlapping submissions racing each other can both be accepted.
pub struct LeaveService {
    repository: Arc<dyn LeaveRepository>,
    balance: BalanceCalculator,
    locks: Option<EmployeeLocks>,
}

impl LeaveService {
    pub fn new(repository: Arc<dyn LeaveRepository>, policy: Arc<dyn AllowancePolicy>) -> Self {
        Self {
            balance: BalanceCalculator::new(repository.clone(), policy),
            repository,
            locks: Some(EmployeeLocks::new()),
        }
    }

    pub fn serialize_writes(mut self, enabled: bool) -> Self {
        self.locks = enabled.then(EmployeeLocks::new);
        self
    }

    /// Validates and stores a new pending request, returning its id.
    pub async fn submit(&self, submission: LeaveSubmission) -> Result<LeaveId, LeaveError> {
        let candidate = validate_submission(submission)?;
        let employee_id = candidate.employee_id;
        let _guard = self.serialize(employee_id).await;

        self.ensure_fits(&candidate).await?;

        let id = self.repository.insert(&candidate).await.inspect_err(|e| {
            error!(error = %e, employee_id, "Failed to create leave request");
        })?;

        info!(
            leave_id = id,
            employee_id,
            days = candidate.duration_in_days(),
            "Leave request submitted"
        );
        Ok(id)
    }

    /// Approves a pending request. Comments are optional.
    pub async fn approve(&self, id: LeaveId, comments: &str) -> Result<LeaveRecord, LeaveError> {
        let (_guard, mut record) = self.fetch_serialized(id).await?;
        ensure_pending(&record)?;

        let requested = record.duration_in_days();
        let available = self.balance.available_days(record.employee_id).await?;
        if requested > available {
            info!(
                leave_id = id,
                requested,
                available,
                "Approval refused: insufficient balance"
            );
            return Err(LeaveError::InsufficientBalance {
                requested,
                available,
            });
        }

        record.status = LeaveStatus::Approved;
        record.manager_comments = non_blank(comments);
        self.store(&record, LeaveStatus::Pending).await?;

        info!(
            target: "audit",
            leave_id = id,
            employee_id = record.employee_id,
            days = requested,
            "Leave request approved"
        );
        Ok(record)
    }

    /// Rejects a pending request. Blank comments fail before the record is
    /// even looked up.
    pub async fn reject(&self, id: LeaveId, comments: &str) -> Result<LeaveRecord, LeaveError> {
        let comments = non_blank(comments).ok_or(LeaveError::MissingRejectionReason)?;

        let (_guard, mut record) = self.fetch_serialized(id).await?;
        ensure_pending(&record)?;

        record.status = LeaveStatus::Rejected;
        record.manager_comments = Some(comments);
        self.store(&record, LeaveStatus::Pending).await?;

        info!(
            target: "audit",
            leave_id = id,
            employee_id = record.employee_id,
            "Leave request rejected"
        );
        Ok(record)
    }

    /// Administrative correction of dates or reason while still pending.
    pub async fn update_details(
        &self,
        id: LeaveId,
        details: LeaveDetails,
    ) -> Result<LeaveRecord, LeaveError> {
        let reason = require_reason(details.reason)?;
        validate_range(details.start_date, details.end_date)?;

        let (_guard, current) = self.fetch_serialized(id).await?;
        ensure_pending(&current)?;

        let candidate = LeaveRecord {
            start_date: details.start_date,
            end_date: details.end_date,
            reason,
            ..current
        };
        self.ensure_fits(&candidate).await?;
        self.store(&candidate, LeaveStatus::Pending).await?;

        info!(
            target: "audit",
            leave_id = id,
            employee_id = candidate.employee_id,
            start_date = %candidate.start_date,
            end_date = %candidate.end_date,
            "Leave request details updated"
        );
        Ok(candidate)
    }

    /// Removes a request whatever its status. Deleting a decided request is
    /// logged as an audit warning since it can release approved balance.
    pub async fn delete(&self, id: LeaveId) -> Result<LeaveRecord, LeaveError> {
        let (_guard, record) = self.fetch_serialized(id).await?;

        let deleted = self.repository.delete(id).await.inspect_err(|e| {
            error!(error = %e, leave_id = id, "Delete leave failed");
        })?;
        if !deleted {
            return Err(LeaveError::NotFound(id));
        }

        if record.status.is_terminal() {
            warn!(
                target: "audit",
                leave_id = id,
                employee_id = record.employee_id,
                status = %record.status,
                days = record.duration_in_days(),
                "Decided leave request deleted"
            );
        } else {
            info!(
                target: "audit",
                leave_id = id,
                employee_id = record.employee_id,
                "Pending leave request deleted"
            );
        }
        Ok(record)
    }

    pub async fn get(&self, id: LeaveId) -> Result<LeaveRecord, LeaveError> {
        self.fetch(id).await
    }

    pub async fn list(&self, filter: &LeaveFilter) -> Result<LeavePage, LeaveError> {
        let page = self.repository.list(filter).await.inspect_err(|e| {
            error!(error = %e, "Failed to fetch leave list");
        })?;
        Ok(page)
    }

    pub async fn balance(&self, employee_id: EmployeeId) -> Result<LeaveBalance, LeaveError> {
        let balance = self.balance.balance(employee_id).await.inspect_err(|e| {
            error!(error = %e, employee_id, "Failed to compute leave balance");
        })?;
        Ok(balance)
    }

    async fn serialize(&self, employee_id: EmployeeId) -> Option<OwnedMutexGuard<()>> {
        match &self.locks {
            Some(locks) => Some(locks.acquire(employee_id).await),
            None => None,
        }
    }

    /// Looks the record up, takes its employee's lock, then reads it again
    /// so the decision is made on state nobody else can change.
    async fn fetch_serialized(
        &self,
        id: LeaveId,
    ) -> Result<(Option<OwnedMutexGuard<()>>, LeaveRecord), LeaveError> {
        let record = self.fetch(id).await?;
        match self.serialize(record.employee_id).await {
            Some(guard) => Ok((Some(guard), self.fetch(id).await?)),
            None => Ok((None, record)),
        }
    }

    async fn fetch(&self, id: LeaveId) -> Result<LeaveRecord, LeaveError> {
        self.repository
            .get_by_id(id)
            .await
            .inspect_err(|e| error!(error = %e, leave_id = id, "Failed to fetch leave request"))?
            .ok_or(LeaveError::NotFound(id))
    }

    /// Conflict check followed by the balance check.
    async fn ensure_fits(&self, candidate: &LeaveRecord) -> Result<(), LeaveError> {
        let employee_id = candidate.employee_id;

        let history = self
            .repository
            .get_by_employee(employee_id)
            .await
            .inspect_err(|e| error!(error = %e, employee_id, "Failed to load leave history"))?;
        if has_conflict(candidate, &history) {
            info!(employee_id, "Leave request refused: overlapping dates");
            return Err(LeaveError::OverlappingDates);
        }

        let requested = candidate.duration_in_days();
        let available = self.balance.available_days(employee_id).await?;
        if available < requested {
            info!(
                employee_id,
                requested,
                available,
                "Leave request refused: insufficient balance"
            );
            return Err(LeaveError::InsufficientBalance {
                requested,
                available,
            });
        }

        Ok(())
    }

    async fn store(&self, record: &LeaveRecord, expected: LeaveStatus) -> Result<(), LeaveError> {
        let id = record.id.ok_or_else(|| {
            LeaveError::InvalidInput("leave request has not been stored yet".to_string())
        })?;

        let updated = self.repository.update(record, expected).await.inspect_err(|e| {
            error!(error = %e, leave_id = id, "Failed to update leave request");
        })?;
        if updated {
            return Ok(());
        }

        // status moved underneath us, or the row is gone
        let current = self.fetch(id).await?;
        Err(LeaveError::IllegalTransition {
            id,
            status: current.status,
        })
    }
}

fn validate_submission(submission: LeaveSubmission) -> Result<LeaveRecord, LeaveError> {
    let employee_id = submission
        .employee_id
        .filter(|id| *id != 0)
        .ok_or_else(|| LeaveError::InvalidInput("employee_id is required".to_string()))?;
    let start_date = submission
        .start_date
        .ok_or_else(|| LeaveError::InvalidInput("start_date is required".to_string()))?;
    let end_date = submission
        .end_date
        .ok_or_else(|| LeaveError::InvalidInput("end_date is required".to_string()))?;
    let reason = require_reason(submission.reason)?;

    validate_range(start_date, end_date)?;

    Ok(LeaveRecord::pending(employee_id, start_date, end_date, reason))
}

fn validate_range(start: NaiveDate, end: NaiveDate) -> Result<(), LeaveError> {
    if end < start {
        return Err(LeaveError::InvalidRange { start, end });
    }
    Ok(())
}

fn ensure_pending(record: &LeaveRecord) -> Result<(), LeaveError> {
    match (record.id, record.status) {
        (_, LeaveStatus::Pending) => Ok(()),
        (Some(id), status) => {
            info!(leave_id = id, %status, "Leave request already processed");
            Err(LeaveError::IllegalTransition { id, status })
        }
        (None, status) => Err(LeaveError::InvalidInput(format!(
            "unsaved leave request is {status}"
        ))),
    }
}

/// The reason is kept exactly as written; only its presence is checked.
fn require_reason(reason: String) -> Result<String, LeaveError> {
    if reason.trim().is_empty() {
        return Err(LeaveError::InvalidInput("reason is required".to_string()));
    }
    Ok(reason)
}

fn non_blank(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2024, m, d)
    }

    #[test]
    fn submission_checks_presence_before_range() {
        let missing_employee = LeaveSubmission {
            employee_id: None,
            start_date: date(1, 5),
            end_date: date(1, 1),
            reason: "trip".into(),
        };
        assert!(matches!(
            validate_submission(missing_employee),
            Err(LeaveError::InvalidInput(_))
        ));

        let reversed = LeaveSubmission {
            employee_id: Some(1),
            start_date: date(1, 5),
            end_date: date(1, 1),
            reason: "trip".into(),
        };
        assert!(matches!(
            validate_submission(reversed),
            Err(LeaveError::InvalidRange { .. })
        ));
    }

    #[test]
    fn blank_reason_is_invalid_input() {
        let submission = LeaveSubmission {
            employee_id: Some(1),
            start_date: date(1, 1),
            end_date: date(1, 1),
            reason: "   ".into(),
        };
        assert!(matches!(
            validate_submission(submission),
            Err(LeaveError::InvalidInput(msg)) if msg == "reason is required"
        ));
    }

    #[test]
    fn valid_submission_becomes_pending_record() {
        let record = validate_submission(LeaveSubmission {
            employee_id: Some(4),
            start_date: date(1, 10),
            end_date: date(1, 10),
            reason: "  dentist ".into(),
        })
        .expect("valid submission");

        assert_eq!(record.status, LeaveStatus::Pending);
        assert_eq!(record.reason, "  dentist ");
        assert_eq!(record.duration_in_days(), 1);
    }

    #[test]
    fn non_blank_trims() {
        assert_eq!(non_blank(""), None);
        assert_eq!(non_blank(" \t"), None);
        assert_eq!(non_blank(" ok "), Some("ok".to_string()));
    }
}
