use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::model::employee::EmployeeProfile;
use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveType};
use crate::model::role::Role;
use crate::utils::pagination::{PaginationMetadata, SortDir};

// ---------- auth ----------

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "john.doe@company.com")]
    #[validate(email)]
    pub email: String,
    #[schema(example = "secret123")]
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "John Doe")]
    #[validate(length(min = 3, max = 100))]
    pub name: String,
    #[schema(example = "john.doe@company.com")]
    #[validate(email, length(max = 100))]
    pub email: String,
    #[schema(example = "secret123")]
    #[validate(length(min = 6, max = 255))]
    pub password: String,
    #[schema(example = "employee", nullable = true)]
    pub role: Option<Role>,
}

/// Directory create uses the same shape and rules as registration.
pub type CreateEmployeeRequest = RegisterRequest;

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: EmployeeProfile,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    pub user_id: u64,
    pub email: String,
    pub role: Option<Role>,
    pub iat: usize,
    pub exp: usize,
    pub jti: String,
}

// ---------- employees ----------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeSortBy {
    Name,
    Email,
    #[default]
    CreatedAt,
}

impl EmployeeSortBy {
    pub fn column(self) -> &'static str {
        match self {
            EmployeeSortBy::Name => "name",
            EmployeeSortBy::Email => "email",
            EmployeeSortBy::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EmployeeFilter {
    /// Page number, starting at 1
    pub page: Option<i64>,
    /// Items per page (max 100)
    pub page_size: Option<i64>,
    /// Substring match on name or email
    pub search: Option<String>,
    #[param(inline)]
    pub sort_by: Option<EmployeeSortBy>,
    #[param(inline)]
    pub sort_dir: Option<SortDir>,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    pub success: bool,
    pub message: String,
    pub data: Vec<EmployeeProfile>,
    pub pagination: PaginationMetadata,
}

// ---------- leave requests ----------

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateLeaveRequest {
    #[schema(example = "2026-11-02", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-11-04", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[serde(rename = "type")]
    #[schema(example = "vacation")]
    pub leave_type: LeaveType,
    #[schema(example = "Family trip", nullable = true)]
    pub reason: Option<String>,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateLeaveRequest {
    #[schema(example = "2026-11-02", format = "date", value_type = Option<String>)]
    pub start_date: Option<NaiveDate>,
    #[schema(example = "2026-11-05", format = "date", value_type = Option<String>)]
    pub end_date: Option<NaiveDate>,
    #[serde(rename = "type")]
    pub leave_type: Option<LeaveType>,
    pub status: Option<LeaveStatus>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LeaveSortBy {
    StartDate,
    EndDate,
    #[default]
    CreatedAt,
}

impl LeaveSortBy {
    pub fn column(self) -> &'static str {
        match self {
            LeaveSortBy::StartDate => "start_date",
            LeaveSortBy::EndDate => "end_date",
            LeaveSortBy::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeaveRequestFilter {
    /// Page number, starting at 1
    pub page: Option<i64>,
    /// Items per page (max 100)
    pub page_size: Option<i64>,
    /// Only requests owned by this employee
    pub employee_id: Option<u64>,
    #[param(inline)]
    pub status: Option<LeaveStatus>,
    #[serde(rename = "type")]
    #[param(inline)]
    pub leave_type: Option<LeaveType>,
    /// Requests starting on or after this date
    #[param(value_type = Option<String>, format = Date)]
    pub start_date: Option<NaiveDate>,
    /// Requests ending on or before this date
    #[param(value_type = Option<String>, format = Date)]
    pub end_date: Option<NaiveDate>,
    #[param(inline)]
    pub sort_by: Option<LeaveSortBy>,
    #[param(inline)]
    pub sort_dir: Option<SortDir>,
}

#[derive(Serialize, ToSchema)]
pub struct LeaveRequestListResponse {
    pub success: bool,
    pub message: String,
    pub data: Vec<LeaveRequest>,
    pub pagination: PaginationMetadata,
}

// ---------- envelopes ----------

#[derive(Debug, Serialize)]
pub struct SuccessResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> SuccessResponse<T> {
    pub fn new(message: &str, data: T) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            data: Some(data),
        }
    }
}

impl SuccessResponse<()> {
    pub fn message_only(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            data: None,
        }
    }
}
