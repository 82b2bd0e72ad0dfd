use crate::{
    auth::auth::AuthUser,
    error::AppResult,
    models::{
        CreateLeaveRequest, LeaveRequestFilter, LeaveRequestListResponse, SuccessResponse,
        UpdateLeaveRequest,
    },
    service::LeaveRequestService,
};
use actix_web::{HttpResponse, web};
use tracing::debug;

/* =========================
Create leave request
========================= */
/// Submit a leave request for the authenticated employee
#[utoipa::path(
    post,
    path = "/api/v1/leave-requests",
    request_body(
        content = CreateLeaveRequest,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Leave request created", body = Object, example = json!({
            "success": true,
            "message": "Leave request created successfully",
            "data": {
                "id": 1,
                "employee_id": 1000,
                "employee": {
                    "id": 1000,
                    "name": "John Doe",
                    "email": "john.doe@company.com",
                    "role": "employee",
                    "created_at": "2026-01-01T00:00:00Z",
                    "updated_at": "2026-01-01T00:00:00Z"
                },
                "start_date": "2026-11-02",
                "end_date": "2026-11-04",
                "type": "vacation",
                "status": "pending",
                "reason": "Family trip",
                "created_at": "2026-10-19T09:00:00Z",
                "updated_at": "2026-10-19T09:00:00Z"
            }
        })),
        (status = 400, description = "Invalid body, inverted range or past start date"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "Overlaps an approved leave request")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    leaves: web::Data<LeaveRequestService>,
    payload: web::Json<CreateLeaveRequest>,
) -> AppResult<HttpResponse> {
    let leave = leaves.create(auth.user_id, payload.into_inner()).await?;

    Ok(HttpResponse::Created().json(SuccessResponse::new(
        "Leave request created successfully",
        leave,
    )))
}

/// Get a leave request
#[utoipa::path(
    get,
    path = "/api/v1/leave-requests/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = Object, example = json!({
            "success": true,
            "message": "Leave request retrieved successfully",
            "data": { "id": 1, "status": "pending" }
        })),
        (status = 400, description = "Invalid leave request ID"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Leave request not found", body = Object, example = json!({
            "error": "not_found",
            "message": "leave request not found"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    leaves: web::Data<LeaveRequestService>,
    path: web::Path<u64>,
) -> AppResult<HttpResponse> {
    let leave = leaves.get(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(SuccessResponse::new(
        "Leave request retrieved successfully",
        leave,
    )))
}

/// List leave requests
#[utoipa::path(
    get,
    path = "/api/v1/leave-requests",
    params(LeaveRequestFilter),
    responses(
        (status = 200, description = "Paginated leave list", body = LeaveRequestListResponse),
        (status = 400, description = "Invalid query parameters"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_list(
    leaves: web::Data<LeaveRequestService>,
    query: web::Query<LeaveRequestFilter>,
) -> AppResult<HttpResponse> {
    let filter = query.into_inner();
    debug!(?filter, "Listing leave requests");

    let page = leaves.list(filter).await?;

    Ok(HttpResponse::Ok().json(LeaveRequestListResponse {
        success: true,
        message: "Leave requests retrieved successfully".to_string(),
        data: page.data,
        pagination: page.pagination,
    }))
}

/* =========================
Update / delete (owner, HR, manager)
========================= */
/// Partially update a leave request
///
/// Owners may edit dates, type and reason. Changing `status` needs the HR or manager role.
#[utoipa::path(
    put,
    path = "/api/v1/leave-requests/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to update")
    ),
    request_body = UpdateLeaveRequest,
    responses(
        (status = 200, description = "Leave request updated", body = Object, example = json!({
            "success": true,
            "message": "Leave request updated successfully",
            "data": { "id": 1, "status": "pending" }
        })),
        (status = 400, description = "Invalid body, inverted range or past start date"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Not the owner, or status change without HR/manager role"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Overlaps an approved leave request")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn update_leave(
    auth: AuthUser,
    leaves: web::Data<LeaveRequestService>,
    path: web::Path<u64>,
    payload: web::Json<UpdateLeaveRequest>,
) -> AppResult<HttpResponse> {
    let leave = leaves
        .update(path.into_inner(), auth.user_id, auth.role, payload.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(SuccessResponse::new(
        "Leave request updated successfully",
        leave,
    )))
}

/// Soft-delete a leave request
#[utoipa::path(
    delete,
    path = "/api/v1/leave-requests/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to delete")
    ),
    responses(
        (status = 200, description = "Leave request deleted", body = Object, example = json!({
            "success": true,
            "message": "Leave request deleted successfully"
        })),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Not the owner and not HR/manager"),
        (status = 404, description = "Leave request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn delete_leave(
    auth: AuthUser,
    leaves: web::Data<LeaveRequestService>,
    path: web::Path<u64>,
) -> AppResult<HttpResponse> {
    leaves
        .delete(path.into_inner(), auth.user_id, auth.role)
        .await?;

    Ok(HttpResponse::Ok().json(SuccessResponse::message_only(
        "Leave request deleted successfully",
    )))
}

/* =========================
Approve / reject (HR)
========================= */
/// Approve a leave request
#[utoipa::path(
    put,
    path = "/api/v1/leave-requests/{leave_id}/approve",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to approve")
    ),
    responses(
        (status = 200, description = "Leave approved successfully", body = Object, example = json!({
            "success": true,
            "message": "Leave request approved successfully",
            "data": { "id": 1, "status": "approved" }
        })),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not HR"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Overlaps an approved leave request")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn approve_leave(
    auth: AuthUser,
    leaves: web::Data<LeaveRequestService>,
    path: web::Path<u64>,
) -> AppResult<HttpResponse> {
    let leave = leaves.approve(path.into_inner(), auth.role).await?;

    Ok(HttpResponse::Ok().json(SuccessResponse::new(
        "Leave request approved successfully",
        leave,
    )))
}

/// Reject a leave request
#[utoipa::path(
    put,
    path = "/api/v1/leave-requests/{leave_id}/reject",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to reject")
    ),
    responses(
        (status = 200, description = "Leave rejected successfully", body = Object, example = json!({
            "success": true,
            "message": "Leave request rejected successfully",
            "data": { "id": 1, "status": "rejected" }
        })),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not HR"),
        (status = 404, description = "Leave request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn reject_leave(
    auth: AuthUser,
    leaves: web::Data<LeaveRequestService>,
    path: web::Path<u64>,
) -> AppResult<HttpResponse> {
    let leave = leaves.reject(path.into_inner(), auth.role).await?;

    Ok(HttpResponse::Ok().json(SuccessResponse::new(
        "Leave request rejected successfully",
        leave,
    )))
}
