use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

use super::role::Role;

/// Raw `employees` row; `role` is stored as text.
#[derive(Debug, sqlx::FromRow)]
pub struct EmployeeRow {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Employee {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Option<Role>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<EmployeeRow> for Employee {
    fn from(row: EmployeeRow) -> Self {
        Self {
            role: parse_role(row.id, row.role.as_deref()),
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Unknown role strings are treated as "no role" rather than failing the read.
pub(crate) fn parse_role(employee_id: u64, raw: Option<&str>) -> Option<Role> {
    let raw = raw?;
    match raw.parse() {
        Ok(role) => Some(role),
        Err(_) => {
            warn!(employee_id, role = raw, "Ignoring unknown employee role");
            None
        }
    }
}

/// Employee data that is safe to hand out: everything but the credential.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[schema(example = json!({
    "id": 1,
    "name": "John Doe",
    "email": "john.doe@company.com",
    "role": "employee",
    "created_at": "2026-01-01T00:00:00Z",
    "updated_at": "2026-01-01T00:00:00Z"
}))]
pub struct EmployeeProfile {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "John Doe")]
    pub name: String,
    #[schema(example = "john.doe@company.com")]
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub updated_at: DateTime<Utc>,
}

impl From<&Employee> for EmployeeProfile {
    fn from(employee: &Employee) -> Self {
        Self {
            id: employee.id,
            name: employee.name.clone(),
            email: employee.email.clone(),
            role: employee.role,
            created_at: employee.created_at,
            updated_at: employee.updated_at,
        }
    }
}

/// Insert payload; the password is already hashed.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEmployee {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Option<Role>,
}
