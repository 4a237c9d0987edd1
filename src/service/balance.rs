use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

use crate::model::leave_request::EmployeeId;
use crate::repository::{LeaveRepository, RepositoryError};

pub const DEFAULT_ANNUAL_ALLOWANCE: i64 = 20;

/// Source of an employee's annual leave allowance, in days.
pub trait AllowancePolicy: Send + Sync {
    fn annual_allowance(&self, employee_id: EmployeeId) -> i64;
}

/// The same allowance for every employee.
#[derive(Debug, Clone, Copy)]
pub struct FlatAllowance(pub i64);

impl Default for FlatAllowance {
    fn default() -> Self {
        Self(DEFAULT_ANNUAL_ALLOWANCE)
    }
}

impl AllowancePolicy for FlatAllowance {
    fn annual_allowance(&self, _employee_id: EmployeeId) -> i64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct LeaveBalance {
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = 20)]
    pub allowance: i64,
    #[schema(example = 5)]
    pub used: i64,
    #[schema(example = 15)]
    pub available: i64,
}

/// Derives remaining allowance from approved requests, read fresh from the
/// repository on every call.
pub struct BalanceCalculator {
    repository: Arc<dyn LeaveRepository>,
    policy: Arc<dyn AllowancePolicy>,
}

impl BalanceCalculator {
    pub fn new(repository: Arc<dyn LeaveRepository>, policy: Arc<dyn AllowancePolicy>) -> Self {
        Self { repository, policy }
    }

    pub async fn approved_days_used(
        &self,
        employee_id: EmployeeId,
    ) -> Result<i64, RepositoryError> {
        let approved = self.repository.get_approved_by_employee(employee_id).await?;
        Ok(approved.iter().map(|r| r.duration_in_days()).sum())
    }

    /// Never negative: a deficit reads as zero.
    pub async fn available_days(&self, employee_id: EmployeeId) -> Result<i64, RepositoryError> {
        Ok(self.balance(employee_id).await?.available)
    }

    pub async fn balance(&self, employee_id: EmployeeId) -> Result<LeaveBalance, RepositoryError> {
        let allowance = self.policy.annual_allowance(employee_id);
        let used = self.approved_days_used(employee_id).await?;

        Ok(LeaveBalance {
            employee_id,
            allowance,
            used,
            available: (allowance - used).max(0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::leave_request::{LeaveRecord, LeaveStatus};
    use crate::repository::MemoryLeaveRepository;
    use chrono::NaiveDate;

    fn approved(employee_id: u64, month: u32, first: u32, last: u32) -> LeaveRecord {
        let mut record = LeaveRecord::pending(
            employee_id,
            NaiveDate::from_ymd_opt(2024, month, first).expect("valid date"),
            NaiveDate::from_ymd_opt(2024, month, last).expect("valid date"),
            "approved leave",
        );
        record.status = LeaveStatus::Approved;
        record
    }

    fn calculator(repo: Arc<MemoryLeaveRepository>, allowance: i64) -> BalanceCalculator {
        BalanceCalculator::new(repo, Arc::new(FlatAllowance(allowance)))
    }

    #[actix_web::test]
    async fn no_approved_leave_means_full_allowance() {
        let repo = Arc::new(MemoryLeaveRepository::new());
        repo.seed(LeaveRecord::pending(
            1,
            NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date"),
            NaiveDate::from_ymd_opt(2024, 1, 10).expect("valid date"),
            "still pending",
        ));
        let calc = calculator(repo, DEFAULT_ANNUAL_ALLOWANCE);

        assert_eq!(calc.approved_days_used(1).await.expect("used"), 0);
        assert_eq!(calc.available_days(1).await.expect("available"), 20);
    }

    #[actix_web::test]
    async fn only_approved_days_of_the_employee_count() {
        let repo = Arc::new(MemoryLeaveRepository::new());
        repo.seed(approved(1, 1, 10, 14));
        repo.seed(approved(2, 1, 10, 20));
        let mut rejected = approved(1, 3, 1, 3);
        rejected.status = LeaveStatus::Rejected;
        repo.seed(rejected);
        let calc = calculator(repo, 20);

        assert_eq!(calc.approved_days_used(1).await.expect("used"), 5);
        assert_eq!(calc.available_days(1).await.expect("available"), 15);
    }

    #[actix_web::test]
    async fn deficit_is_clamped_to_zero() {
        let repo = Arc::new(MemoryLeaveRepository::new());
        repo.seed(approved(1, 1, 1, 15));
        repo.seed(approved(1, 2, 1, 10));
        let calc = calculator(repo, 20);

        let balance = calc.balance(1).await.expect("balance");
        assert_eq!(balance.used, 25);
        assert_eq!(balance.available, 0);
    }

    #[actix_web::test]
    async fn repeated_reads_are_stable() {
        let repo = Arc::new(MemoryLeaveRepository::new());
        repo.seed(approved(1, 1, 10, 14));
        let calc = calculator(repo, 20);

        let first = calc.available_days(1).await.expect("available");
        let second = calc.available_days(1).await.expect("available");
        assert_eq!(first, second);
    }

    #[test]
    fn default_policy_is_twenty_days() {
        assert_eq!(FlatAllowance::default().annual_allowance(42), 20);
    }
}
