use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use futures::lock::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::model::leave_request::EmployeeId;

/// One async lock per employee, so validate-then-write sequences for the
/// same employee never interleave.
#[derive(Default)]
pub struct EmployeeLocks {
    locks: Mutex<HashMap<EmployeeId, Arc<AsyncMutex<()>>>>,
}

impl EmployeeLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for the employee's lock; it is released when the guard drops.
    pub async fn acquire(&self, employee_id: EmployeeId) -> OwnedMutexGuard<()> {
        self.handle(employee_id).lock_owned().await
    }

    fn handle(&self, employee_id: EmployeeId) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // only the map holds an idle lock; holders and waiters keep a clone
        locks.retain(|id, lock| *id == employee_id || Arc::strong_count(lock) > 1);
        locks.entry(employee_id).or_default().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_employee_shares_one_lock() {
        let locks = EmployeeLocks::new();
        assert!(Arc::ptr_eq(&locks.handle(1), &locks.handle(1)));
        assert!(!Arc::ptr_eq(&locks.handle(1), &locks.handle(2)));
    }

    #[actix_web::test]
    async fn held_lock_blocks_the_same_employee_only() {
        let locks = EmployeeLocks::new();
        let guard = locks.acquire(1).await;

        assert!(locks.handle(1).try_lock().is_none());
        assert!(locks.handle(2).try_lock().is_some());

        drop(guard);
        assert!(locks.handle(1).try_lock().is_some());
    }

    #[actix_web::test]
    async fn idle_locks_are_dropped() {
        let locks = EmployeeLocks::new();
        let held = locks.acquire(1).await;
        drop(locks.acquire(2).await);

        let _third = locks.acquire(3).await;
        let tracked: Vec<EmployeeId> = {
            let map = locks.locks.lock().unwrap_or_else(PoisonError::into_inner);
            let mut ids: Vec<_> = map.keys().copied().collect();
            ids.sort_unstable();
            ids
        };
        assert_eq!(tracked, vec![1, 3]);
        drop(held);
    }
}
