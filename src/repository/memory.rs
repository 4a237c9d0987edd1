use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use super::{LeaveFilter, LeavePage, LeaveRepository, RepositoryError};
use crate::model::leave_request::{EmployeeId, LeaveId, LeaveRecord, LeaveStatus};

/// In-process store with the same semantics as the SQL adapter.
#[derive(Default)]
pub struct MemoryLeaveRepository {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    last_id: LeaveId,
    records: BTreeMap<LeaveId, LeaveRecord>,
}

impl MemoryLeaveRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `record` as-is, keeping its status. Used to seed fixtures.
    pub fn seed(&self, record: LeaveRecord) -> LeaveId {
        let mut state = self.lock();
        state.last_id += 1;
        let id = state.last_id;
        state.records.insert(
            id,
            LeaveRecord {
                id: Some(id),
                created_at: record.created_at.or_else(|| Some(Utc::now())),
                ..record
            },
        );
        id
    }

    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn by_employee(
        &self,
        employee_id: EmployeeId,
        status: Option<LeaveStatus>,
    ) -> Vec<LeaveRecord> {
        let state = self.lock();
        let mut records: Vec<LeaveRecord> = state
            .records
            .values()
            .filter(|r| r.employee_id == employee_id)
            .filter(|r| status.is_none_or(|s| s == r.status))
            .cloned()
            .collect();
        records.sort_by_key(|r| (r.start_date, r.id));
        records
    }
}

#[async_trait]
impl LeaveRepository for MemoryLeaveRepository {
    async fn insert(&self, record: &LeaveRecord) -> Result<LeaveId, RepositoryError> {
        Ok(self.seed(LeaveRecord {
            status: LeaveStatus::Pending,
            created_at: None,
            ..record.clone()
        }))
    }

    async fn get_by_id(&self, id: LeaveId) -> Result<Option<LeaveRecord>, RepositoryError> {
        Ok(self.lock().records.get(&id).cloned())
    }

    async fn get_by_employee(
        &self,
        employee_id: EmployeeId,
    ) -> Result<Vec<LeaveRecord>, RepositoryError> {
        Ok(self.by_employee(employee_id, None))
    }

    async fn get_approved_by_employee(
        &self,
        employee_id: EmployeeId,
    ) -> Result<Vec<LeaveRecord>, RepositoryError> {
        Ok(self.by_employee(employee_id, Some(LeaveStatus::Approved)))
    }

    async fn update(
        &self,
        record: &LeaveRecord,
        expected: LeaveStatus,
    ) -> Result<bool, RepositoryError> {
        let Some(id) = record.id else {
            return Ok(false);
        };

        let mut state = self.lock();
        match state.records.get_mut(&id) {
            Some(stored) if stored.status == expected => {
                *stored = LeaveRecord {
                    id: stored.id,
                    created_at: stored.created_at,
                    ..record.clone()
                };
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete(&self, id: LeaveId) -> Result<bool, RepositoryError> {
        Ok(self.lock().records.remove(&id).is_some())
    }

    async fn list(&self, filter: &LeaveFilter) -> Result<LeavePage, RepositoryError> {
        let state = self.lock();
        let mut matching: Vec<&LeaveRecord> =
            state.records.values().filter(|r| filter.matches(r)).collect();
        // newest first; ids are sequential so they break created_at ties
        matching.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));

        let total = matching.len() as i64;
        let data = matching
            .into_iter()
            .skip(filter.offset() as usize)
            .take(filter.per_page() as usize)
            .cloned()
            .collect();

        Ok(LeavePage {
            data,
            page: filter.page(),
            per_page: filter.per_page(),
            total,
        })
    }
}
