use crate::{
    auth::auth::AuthUser,
    error::AppResult,
    models::{CreateEmployeeRequest, EmployeeFilter, EmployeeListResponse, SuccessResponse},
    service::EmployeeService,
};
use actix_web::{HttpResponse, web};
use tracing::debug;

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/v1/employees",
    request_body = CreateEmployeeRequest,
    responses(
        (status = 201, description = "Employee created successfully", body = Object, example = json!({
            "success": true,
            "message": "Employee created successfully",
            "data": {
                "id": 7,
                "name": "Jane Roe",
                "email": "jane.roe@company.com",
                "role": "manager",
                "created_at": "2026-01-01T00:00:00Z",
                "updated_at": "2026-01-01T00:00:00Z"
            }
        })),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Missing or invalid token"),
        (status = 409, description = "Email already exists"),
        (status = 500, description = "Internal server error", body = Object, example = json!({
            "error": "storage_failure",
            "message": "Something went wrong, Contact with system admin"
        }))
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_employee(
    auth: AuthUser,
    employees: web::Data<EmployeeService>,
    payload: web::Json<CreateEmployeeRequest>,
) -> AppResult<HttpResponse> {
    debug!(created_by = auth.user_id, "Creating employee");

    let profile = employees.create(payload.into_inner()).await?;

    Ok(HttpResponse::Created().json(SuccessResponse::new(
        "Employee created successfully",
        profile,
    )))
}

/// List Employees
#[utoipa::path(
    get,
    path = "/api/v1/employees",
    params(EmployeeFilter),
    responses(
        (status = 200, description = "Paginated employee list", body = EmployeeListResponse),
        (status = 400, description = "Invalid query parameters"),
        (status = 401, description = "Missing or invalid token")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_employees(
    employees: web::Data<EmployeeService>,
    query: web::Query<EmployeeFilter>,
) -> AppResult<HttpResponse> {
    let page = employees.list(query.into_inner()).await?;

    Ok(HttpResponse::Ok().json(EmployeeListResponse {
        success: true,
        message: "Employees retrieved successfully".to_string(),
        data: page.data,
        pagination: page.pagination,
    }))
}

/// Get Employee by ID
#[utoipa::path(
    get,
    path = "/api/v1/employees/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee found", body = Object, example = json!({
            "success": true,
            "message": "Employee retrieved successfully",
            "data": {
                "id": 7,
                "name": "Jane Roe",
                "email": "jane.roe@company.com",
                "role": "manager",
                "created_at": "2026-01-01T00:00:00Z",
                "updated_at": "2026-01-01T00:00:00Z"
            }
        })),
        (status = 400, description = "Invalid employee ID"),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "error": "not_found",
            "message": "employee not found"
        }))
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_employee(
    employees: web::Data<EmployeeService>,
    path: web::Path<u64>,
) -> AppResult<HttpResponse> {
    let profile = employees.get(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(SuccessResponse::new(
        "Employee retrieved successfully",
        profile,
    )))
}
