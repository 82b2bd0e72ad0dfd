use async_trait::async_trait;
use sqlx::MySqlPool;
use tracing::{debug, error};

use crate::error::{AppError, AppResult};
use crate::model::employee::{Employee, EmployeeRow, NewEmployee};
use crate::models::EmployeeSortBy;
use crate::utils::db_utils::{Conditions, SqlValue, bind_rows, bind_scalar};
use crate::utils::pagination::{PageRequest, SortDir};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmployeeQuery {
    pub page: PageRequest,
    pub search: Option<String>,
    pub sort_by: EmployeeSortBy,
    pub sort_dir: SortDir,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    async fn find_by_id(&self, id: u64) -> AppResult<Option<Employee>>;
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Employee>>;
    /// Fails with `EmailExists` when the unique index rejects the row.
    async fn create(&self, employee: &NewEmployee) -> AppResult<Employee>;
    async fn find_all(&self, query: &EmployeeQuery) -> AppResult<(Vec<Employee>, i64)>;
}

/// Substring LIKE pattern with `!` as the escape character, so `%` and `_`
/// typed by the caller match literally.
fn contains_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.chars() {
        if matches!(c, '!' | '%' | '_') {
            pattern.push('!');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

const EMPLOYEE_COLUMNS: &str = "id, name, email, password, role, created_at, updated_at";

pub struct MySqlEmployeeRepository {
    pool: MySqlPool,
}

impl MySqlEmployeeRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmployeeRepository for MySqlEmployeeRepository {
    async fn find_by_id(&self, id: u64) -> AppResult<Option<Employee>> {
        let sql = format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = ? AND deleted_at IS NULL"
        );
        let row = sqlx::query_as::<_, EmployeeRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Employee::from))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Employee>> {
        let sql = format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE email = ? AND deleted_at IS NULL"
        );
        let row = sqlx::query_as::<_, EmployeeRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Employee::from))
    }

    async fn create(&self, employee: &NewEmployee) -> AppResult<Employee> {
        let result = sqlx::query(
            r#"
            INSERT INTO employees (name, email, password, role)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&employee.name)
        .bind(&employee.email)
        .bind(&employee.password_hash)
        .bind(employee.role.map(|r| r.to_string()))
        .execute(&self.pool)
        .await;

        let id = match result {
            Ok(done) => done.last_insert_id(),
            Err(e) => {
                // duplicate key on the email index
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.code().as_deref() == Some("23000") {
                        return Err(AppError::EmailExists);
                    }
                }
                error!(error = %e, "Failed to create employee");
                return Err(e.into());
            }
        };

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("employee {id} vanished after insert")))
    }

    async fn find_all(&self, query: &EmployeeQuery) -> AppResult<(Vec<Employee>, i64)> {
        let mut conditions = Conditions::new("deleted_at IS NULL");

        if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
            let like = contains_pattern(search);
            conditions.push_many(
                "(name LIKE ? ESCAPE '!' OR email LIKE ? ESCAPE '!')",
                [SqlValue::Str(like.clone()), SqlValue::Str(like)],
            );
        }

        let where_clause = conditions.where_sql();

        // ---------- total count ----------
        let count_sql = format!("SELECT COUNT(*) FROM employees {}", where_clause);
        debug!(sql = %count_sql, bindings = ?conditions.values(), "Counting employees");

        let total = bind_scalar(sqlx::query_scalar::<_, i64>(&count_sql), conditions.values())
            .fetch_one(&self.pool)
            .await?;

        // ---------- data query ----------
        let data_sql = format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees {} ORDER BY {} {dir}, id {dir} LIMIT ? OFFSET ?",
            where_clause,
            query.sort_by.column(),
            dir = query.sort_dir.as_sql(),
        );
        debug!(sql = %data_sql, page = query.page.page, page_size = query.page.page_size, "Fetching employees");

        let rows = bind_rows(sqlx::query_as::<_, EmployeeRow>(&data_sql), conditions.values())
            .bind(query.page.limit())
            .bind(query.page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok((rows.into_iter().map(Employee::from).collect(), total))
    }
}
