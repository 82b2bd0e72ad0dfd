use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{MySql, MySqlPool};
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};
use crate::model::leave_request::{
    LeaveRequest, LeaveRequestRow, LeaveStatus, LeaveType, NewLeaveRequest,
};
use crate::models::LeaveSortBy;
use crate::utils::db_utils::{Conditions, SqlValue, bind_rows, bind_scalar};
use crate::utils::pagination::{PageRequest, SortDir};

/// Conjunctive filters; `start_date`/`end_date` are plain bounds, not overlap.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeaveRequestQuery {
    pub page: PageRequest,
    pub employee_id: Option<u64>,
    pub status: Option<LeaveStatus>,
    pub leave_type: Option<LeaveType>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub sort_by: LeaveSortBy,
    pub sort_dir: SortDir,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LeaveRequestRepository: Send + Sync {
    /// Inserts a `pending` request and returns its id.
    async fn create(&self, leave: &NewLeaveRequest) -> AppResult<u64>;
    /// Loads a live request with its owner's profile attached.
    async fn find_by_id(&self, id: u64) -> AppResult<Option<LeaveRequest>>;
    async fn find_all(&self, query: &LeaveRequestQuery) -> AppResult<(Vec<LeaveRequest>, i64)>;
    /// Persists every mutable field. Writes that leave the request `approved`
    /// fail with `OverlapConflict` if another approved request of the same
    /// employee overlaps it. The guard runs on every such write, including a
    /// status-only edit through the generic update where the service itself
    /// skips its date checks.
    async fn update(&self, leave: &LeaveRequest) -> AppResult<()>;
    async fn soft_delete(&self, id: u64) -> AppResult<()>;
    async fn has_overlapping_approved(
        &self,
        employee_id: u64,
        start_date: NaiveDate,
        end_date: NaiveDate,
        exclude_id: Option<u64>,
    ) -> AppResult<bool>;
}

const LEAVE_SELECT: &str = r#"
    SELECT
        lr.id,
        lr.employee_id,
        lr.start_date,
        lr.end_date,
        lr.leave_type,
        lr.status,
        lr.reason,
        lr.created_at,
        lr.updated_at,
        e.name AS employee_name,
        e.email AS employee_email,
        e.role AS employee_role,
        e.created_at AS employee_created_at,
        e.updated_at AS employee_updated_at
    FROM leave_requests lr
    JOIN employees e ON e.id = lr.employee_id
"#;

// Intervals intersect, endpoints included.
const OVERLAP_COUNT_SQL: &str = r#"
    SELECT COUNT(*)
    FROM leave_requests
    WHERE employee_id = ?
      AND status = 'approved'
      AND deleted_at IS NULL
      AND start_date <= ?
      AND end_date >= ?
      AND (? IS NULL OR id <> ?)
"#;

async fn count_overlapping<'e, E>(
    executor: E,
    employee_id: u64,
    start_date: NaiveDate,
    end_date: NaiveDate,
    exclude_id: Option<u64>,
) -> Result<i64, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = MySql>,
{
    sqlx::query_scalar::<_, i64>(OVERLAP_COUNT_SQL)
        .bind(employee_id)
        .bind(end_date)
        .bind(start_date)
        .bind(exclude_id)
        .bind(exclude_id)
        .fetch_one(executor)
        .await
}

pub struct MySqlLeaveRequestRepository {
    pool: MySqlPool,
}

impl MySqlLeaveRequestRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LeaveRequestRepository for MySqlLeaveRequestRepository {
    async fn create(&self, leave: &NewLeaveRequest) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            INSERT INTO leave_requests
                (employee_id, start_date, end_date, leave_type, status, reason)
            VALUES (?, ?, ?, ?, 'pending', ?)
            "#,
        )
        .bind(leave.employee_id)
        .bind(leave.start_date)
        .bind(leave.end_date)
        .bind(leave.leave_type.to_string())
        .bind(&leave.reason)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_id())
    }

    async fn find_by_id(&self, id: u64) -> AppResult<Option<LeaveRequest>> {
        let sql = format!("{LEAVE_SELECT} WHERE lr.id = ? AND lr.deleted_at IS NULL");
        let row = sqlx::query_as::<_, LeaveRequestRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(LeaveRequest::try_from(row)?)),
            None => Ok(None),
        }
    }

    async fn find_all(&self, query: &LeaveRequestQuery) -> AppResult<(Vec<LeaveRequest>, i64)> {
        let mut conditions = Conditions::new("lr.deleted_at IS NULL");

        if let Some(employee_id) = query.employee_id {
            conditions.push("lr.employee_id = ?", SqlValue::U64(employee_id));
        }
        if let Some(status) = query.status {
            conditions.push("lr.status = ?", SqlValue::Str(status.to_string()));
        }
        if let Some(leave_type) = query.leave_type {
            conditions.push("lr.leave_type = ?", SqlValue::Str(leave_type.to_string()));
        }
        if let Some(start_date) = query.start_date {
            conditions.push("lr.start_date >= ?", SqlValue::Date(start_date));
        }
        if let Some(end_date) = query.end_date {
            conditions.push("lr.end_date <= ?", SqlValue::Date(end_date));
        }

        let where_clause = conditions.where_sql();

        // -------------------------
        // COUNT query
        // -------------------------
        let count_sql = format!("SELECT COUNT(*) FROM leave_requests lr {}", where_clause);
        debug!(sql = %count_sql, bindings = ?conditions.values(), "Counting leave requests");

        let total = bind_scalar(sqlx::query_scalar::<_, i64>(&count_sql), conditions.values())
            .fetch_one(&self.pool)
            .await?;

        // -------------------------
        // DATA query
        // -------------------------
        let data_sql = format!(
            "{LEAVE_SELECT} {} ORDER BY lr.{} {dir}, lr.id {dir} LIMIT ? OFFSET ?",
            where_clause,
            query.sort_by.column(),
            dir = query.sort_dir.as_sql(),
        );

        let rows = bind_rows(sqlx::query_as::<_, LeaveRequestRow>(&data_sql), conditions.values())
            .bind(query.page.limit())
            .bind(query.page.offset())
            .fetch_all(&self.pool)
            .await?;

        let leaves = rows
            .into_iter()
            .map(LeaveRequest::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((leaves, total))
    }

    async fn update(&self, leave: &LeaveRequest) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        // Serializes approvals per employee so the overlap check and the
        // write below cannot interleave with a concurrent approval.
        sqlx::query("SELECT id FROM employees WHERE id = ? FOR UPDATE")
            .bind(leave.employee_id)
            .fetch_optional(&mut *tx)
            .await?;

        if leave.status == LeaveStatus::Approved {
            let overlapping = count_overlapping(
                &mut *tx,
                leave.employee_id,
                leave.start_date,
                leave.end_date,
                Some(leave.id),
            )
            .await?;

            if overlapping > 0 {
                warn!(
                    leave_request_id = leave.id,
                    employee_id = leave.employee_id,
                    "Approved write rejected by overlap guard"
                );
                return Err(AppError::OverlapConflict);
            }
        }

        sqlx::query(
            r#"
            UPDATE leave_requests
            SET start_date = ?, end_date = ?, leave_type = ?, status = ?, reason = ?,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(leave.start_date)
        .bind(leave.end_date)
        .bind(leave.leave_type.to_string())
        .bind(leave.status.to_string())
        .bind(&leave.reason)
        .bind(leave.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn soft_delete(&self, id: u64) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE leave_requests
            SET deleted_at = CURRENT_TIMESTAMP
            WHERE id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn has_overlapping_approved(
        &self,
        employee_id: u64,
        start_date: NaiveDate,
        end_date: NaiveDate,
        exclude_id: Option<u64>,
    ) -> AppResult<bool> {
        let count =
            count_overlapping(&self.pool, employee_id, start_date, end_date, exclude_id).await?;
        Ok(count > 0)
    }
}
