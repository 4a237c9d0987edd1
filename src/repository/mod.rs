pub mod memory;
pub mod mysql;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::model::leave_request::{EmployeeId, LeaveId, LeaveRecord, LeaveStatus};

pub use memory::MemoryLeaveRepository;
pub use mysql::MySqlLeaveRepository;

/// Durable storage for leave requests.
///
/// `update` is a compare-and-set on the stored status: the row is written
/// only while it still carries `expected`, and `Ok(false)` reports that it
/// did not (missing row or status already moved on).
#[async_trait]
pub trait LeaveRepository: Send + Sync {
    async fn insert(&self, record: &LeaveRecord) -> Result<LeaveId, RepositoryError>;

    async fn get_by_id(&self, id: LeaveId) -> Result<Option<LeaveRecord>, RepositoryError>;

    /// All requests of one employee, ordered by start date then id.
    async fn get_by_employee(
        &self,
        employee_id: EmployeeId,
    ) -> Result<Vec<LeaveRecord>, RepositoryError>;

    async fn get_approved_by_employee(
        &self,
        employee_id: EmployeeId,
    ) -> Result<Vec<LeaveRecord>, RepositoryError>;

    async fn update(
        &self,
        record: &LeaveRecord,
        expected: LeaveStatus,
    ) -> Result<bool, RepositoryError>;

    async fn delete(&self, id: LeaveId) -> Result<bool, RepositoryError>;

    /// Newest first, paginated.
    async fn list(&self, filter: &LeaveFilter) -> Result<LeavePage, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("stored leave request is unreadable: {0}")]
    Corrupt(String),
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct LeaveFilter {
    #[schema(example = 123)]
    /// Filter by employee ID
    pub employee_id: Option<u64>,
    /// Filter by leave status
    pub status: Option<LeaveStatus>,
    #[schema(example = 1)]
    /// Pagination page number (start with 1)
    pub page: Option<u64>,
    #[schema(example = 10)]
    /// Pagination per page number
    pub per_page: Option<u64>,
}

impl LeaveFilter {
    pub fn per_page(&self) -> u64 {
        self.per_page.unwrap_or(10).clamp(1, 100)
    }

    pub fn page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn offset(&self) -> u64 {
        (self.page() - 1).saturating_mul(self.per_page())
    }

    pub fn matches(&self, record: &LeaveRecord) -> bool {
        self.employee_id.is_none_or(|id| id == record.employee_id)
            && self.status.is_none_or(|status| status == record.status)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LeavePage {
    pub data: Vec<LeaveRecord>,
    #[schema(example = 1)]
    pub page: u64,
    #[schema(example = 10)]
    pub per_page: u64,
    #[schema(example = 1)]
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults_and_bounds() {
        let filter = LeaveFilter::default();
        assert_eq!(filter.page(), 1);
        assert_eq!(filter.per_page(), 10);
        assert_eq!(filter.offset(), 0);

        let filter = LeaveFilter {
            page: Some(0),
            per_page: Some(500),
            ..Default::default()
        };
        assert_eq!(filter.page(), 1);
        assert_eq!(filter.per_page(), 100);

        let filter = LeaveFilter {
            page: Some(3),
            per_page: Some(5),
            ..Default::default()
        };
        assert_eq!(filter.offset(), 10);

        let filter = LeaveFilter {
            page: Some(u64::MAX),
            ..Default::default()
        };
        assert_eq!(filter.offset(), u64::MAX);
    }
}
