use crate::model::employee::EmployeeProfile;
use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveType};
use crate::model::role::Role;
use crate::models::{
    AuthResponse, CreateLeaveRequest, EmployeeListResponse, EmployeeSortBy, LeaveRequestListResponse,
    LeaveSortBy, LoginRequest, RegisterRequest, UpdateLeaveRequest,
};
use crate::utils::pagination::{PaginationMetadata, SortDir};
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HR Leave API",
        version = "1.0.0",
        description = r#"
## HR Leave Management

Employees submit leave requests; HR approves or rejects them.

### Key Features
- **Authentication**: register and log in with email and password
- **Employee Directory**: create, list, search and view employees
- **Leave Requests**: submit, edit, withdraw, approve and reject leave

### Rules
- A request never ends before it starts and never starts in the past
- An employee cannot hold two overlapping approved requests
- Only HR approves or rejects; HR and managers may edit any request

### Security
Everything except `/auth/*` and `/health` needs a **JWT Bearer** token.

### Response Format
- `{ success, message, data }` envelopes, plus `pagination` on lists
- Errors are `{ error, message }` with a stable `error` code

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::register,

        crate::api::employee::create_employee,
        crate::api::employee::list_employees,
        crate::api::employee::get_employee,

        crate::api::leave_request::create_leave,
        crate::api::leave_request::leave_list,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::update_leave,
        crate::api::leave_request::delete_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave
    ),
    components(
        schemas(
            LoginRequest,
            RegisterRequest,
            AuthResponse,
            Role,
            EmployeeProfile,
            EmployeeSortBy,
            EmployeeListResponse,
            LeaveType,
            LeaveStatus,
            LeaveRequest,
            CreateLeaveRequest,
            UpdateLeaveRequest,
            LeaveSortBy,
            LeaveRequestListResponse,
            PaginationMetadata,
            SortDir
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Login and registration"),
        (name = "Employee", description = "Employee directory APIs"),
        (name = "Leave", description = "Leave request APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_route_and_bearer_scheme() {
        let doc = ApiDoc::openapi();

        for path in [
            "/api/v1/auth/login",
            "/api/v1/auth/register",
            "/api/v1/employees",
            "/api/v1/employees/{employee_id}",
            "/api/v1/leave-requests",
            "/api/v1/leave-requests/{leave_id}",
            "/api/v1/leave-requests/{leave_id}/approve",
            "/api/v1/leave-requests/{leave_id}/reject",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
