use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, MySqlPool};

use super::{LeaveFilter, LeavePage, LeaveRepository, RepositoryError};
use crate::model::leave_request::{EmployeeId, LeaveId, LeaveRecord, LeaveStatus};

const SELECT_COLUMNS: &str = r#"
    SELECT id, employee_id, start_date, end_date, reason, status, manager_comments, created_at
    FROM leave_requests
"#;

pub struct MySqlLeaveRepository {
    pool: MySqlPool,
}

impl MySqlLeaveRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct LeaveRow {
    id: u64,
    employee_id: u64,
    start_date: NaiveDate,
    end_date: NaiveDate,
    reason: String,
    status: String,
    manager_comments: Option<String>,
    created_at: Option<DateTime<Utc>>,
}

impl TryFrom<LeaveRow> for LeaveRecord {
    type Error = RepositoryError;

    fn try_from(row: LeaveRow) -> Result<Self, Self::Error> {
        let status = LeaveStatus::from_str(&row.status).map_err(|_| {
            RepositoryError::Corrupt(format!("leave {} has status '{}'", row.id, row.status))
        })?;

        Ok(LeaveRecord {
            id: Some(row.id),
            employee_id: row.employee_id,
            start_date: row.start_date,
            end_date: row.end_date,
            reason: row.reason,
            status,
            manager_comments: row.manager_comments,
            created_at: row.created_at,
        })
    }
}

fn into_records(rows: Vec<LeaveRow>) -> Result<Vec<LeaveRecord>, RepositoryError> {
    rows.into_iter().map(LeaveRecord::try_from).collect()
}

// Helper enum for typed SQLx binding
enum FilterValue<'a> {
    U64(u64),
    Str(&'a str),
}

#[async_trait]
impl LeaveRepository for MySqlLeaveRepository {
    async fn insert(&self, record: &LeaveRecord) -> Result<LeaveId, RepositoryError> {
        let result = sqlx::query(
            r#"
            INSERT INTO leave_requests
                (employee_id, start_date, end_date, reason, status)
            VALUES (?, ?, ?, ?, 'pending')
            "#,
        )
        .bind(record.employee_id)
        .bind(record.start_date)
        .bind(record.end_date)
        .bind(&record.reason)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_id())
    }

    async fn get_by_id(&self, id: LeaveId) -> Result<Option<LeaveRecord>, RepositoryError> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = ?");
        let row = sqlx::query_as::<_, LeaveRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(LeaveRecord::try_from).transpose()
    }

    async fn get_by_employee(
        &self,
        employee_id: EmployeeId,
    ) -> Result<Vec<LeaveRecord>, RepositoryError> {
        let sql = format!("{SELECT_COLUMNS} WHERE employee_id = ? ORDER BY start_date, id");
        let rows = sqlx::query_as::<_, LeaveRow>(&sql)
            .bind(employee_id)
            .fetch_all(&self.pool)
            .await?;

        into_records(rows)
    }

    async fn get_approved_by_employee(
        &self,
        employee_id: EmployeeId,
    ) -> Result<Vec<LeaveRecord>, RepositoryError> {
        let sql = format!(
            "{SELECT_COLUMNS} WHERE employee_id = ? AND status = 'approved' ORDER BY start_date, id"
        );
        let rows = sqlx::query_as::<_, LeaveRow>(&sql)
            .bind(employee_id)
            .fetch_all(&self.pool)
            .await?;

        into_records(rows)
    }

    async fn update(
        &self,
        record: &LeaveRecord,
        expected: LeaveStatus,
    ) -> Result<bool, RepositoryError> {
        let Some(id) = record.id else {
            return Ok(false);
        };

        let result = sqlx::query(
            r#"
            UPDATE leave_requests
            SET start_date = ?,
                end_date = ?,
                reason = ?,
                status = ?,
                manager_comments = ?
            WHERE id = ?
            AND status = ?
            "#,
        )
        .bind(record.start_date)
        .bind(record.end_date)
        .bind(&record.reason)
        .bind(record.status.as_ref())
        .bind(record.manager_comments.as_deref())
        .bind(id)
        .bind(expected.as_ref())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete(&self, id: LeaveId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM leave_requests WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn list(&self, filter: &LeaveFilter) -> Result<LeavePage, RepositoryError> {
        // -------------------------
        // WHERE clause
        // -------------------------
        let mut where_sql = String::from(" WHERE 1=1");
        let mut args: Vec<FilterValue> = Vec::new();

        if let Some(emp_id) = filter.employee_id {
            where_sql.push_str(" AND employee_id = ?");
            args.push(FilterValue::U64(emp_id));
        }

        if let Some(status) = filter.status.as_ref() {
            where_sql.push_str(" AND status = ?");
            args.push(FilterValue::Str(status.as_ref()));
        }

        // -------------------------
        // COUNT query
        // -------------------------
        let count_sql = format!("SELECT COUNT(*) FROM leave_requests{}", where_sql);

        let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
        for arg in &args {
            count_q = match arg {
                FilterValue::U64(v) => count_q.bind(*v),
                FilterValue::Str(s) => count_q.bind(*s),
            };
        }

        let total = count_q.fetch_one(&self.pool).await?;

        // -------------------------
        // DATA query
        // -------------------------
        let data_sql = format!(
            "{SELECT_COLUMNS}{} ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
            where_sql
        );

        let mut data_q = sqlx::query_as::<_, LeaveRow>(&data_sql);
        for arg in args {
            data_q = match arg {
                FilterValue::U64(v) => data_q.bind(v),
                FilterValue::Str(s) => data_q.bind(s),
            };
        }

        let rows = data_q
            .bind(filter.per_page())
            .bind(filter.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(LeavePage {
            data: into_records(rows)?,
            page: filter.page(),
            per_page: filter.per_page(),
            total,
        })
    }
}
