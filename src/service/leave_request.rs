//! Leave-request lifecycle: validation, scheduling conflicts, ownership and
//! role checks, status transitions.
//!
//! Status moves `pending -> approved | rejected` only through [`LeaveRequestService::update`]
//! (HR or manager) or [`LeaveRequestService::approve`] / [`LeaveRequestService::reject`] (HR only).
//! Decided requests may be decided again.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, instrument};

use crate::error::{AppError, AppResult};
use crate::model::leave_request::{LeaveRequest, LeaveStatus, NewLeaveRequest};
use crate::model::role::Role;
use crate::models::{CreateLeaveRequest, LeaveRequestFilter, UpdateLeaveRequest};
use crate::repository::{EmployeeRepository, LeaveRequestQuery, LeaveRequestRepository};
use crate::utils::pagination::{PageRequest, Paginated};

fn ensure_valid_range(start_date: NaiveDate, end_date: NaiveDate) -> AppResult<()> {
    if start_date > end_date {
        return Err(AppError::InvalidDateRange);
    }
    Ok(())
}

/// Only the start date is compared; a leave starting today is allowed.
fn ensure_not_past(start_date: NaiveDate, today: NaiveDate) -> AppResult<()> {
    if start_date < today {
        return Err(AppError::PastDate);
    }
    Ok(())
}

fn is_privileged(role: Option<Role>) -> bool {
    role.is_some_and(Role::is_privileged)
}

pub struct LeaveRequestService {
    leaves: Arc<dyn LeaveRequestRepository>,
    employees: Arc<dyn EmployeeRepository>,
}

impl LeaveRequestService {
    pub fn new(
        leaves: Arc<dyn LeaveRequestRepository>,
        employees: Arc<dyn EmployeeRepository>,
    ) -> Self {
        Self { leaves, employees }
    }

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    async fn load(&self, id: u64) -> AppResult<LeaveRequest> {
        self.leaves
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("leave request not found".into()))
    }

    async fn ensure_no_overlap(
        &self,
        employee_id: u64,
        start_date: NaiveDate,
        end_date: NaiveDate,
        exclude_id: Option<u64>,
    ) -> AppResult<()> {
        let overlapping = self
            .leaves
            .has_overlapping_approved(employee_id, start_date, end_date, exclude_id)
            .await?;

        if overlapping {
            debug!(employee_id, %start_date, %end_date, "Overlapping approved leave found");
            return Err(AppError::OverlapConflict);
        }
        Ok(())
    }

    #[instrument(name = "leave_create", skip(self, req))]
    pub async fn create(&self, employee_id: u64, req: CreateLeaveRequest) -> AppResult<LeaveRequest> {
        if self.employees.find_by_id(employee_id).await?.is_none() {
            return Err(AppError::NotFound("employee not found".into()));
        }

        ensure_valid_range(req.start_date, req.end_date)?;
        ensure_not_past(req.start_date, Self::today())?;
        self.ensure_no_overlap(employee_id, req.start_date, req.end_date, None)
            .await?;

        let id = self
            .leaves
            .create(&NewLeaveRequest {
                employee_id,
                start_date: req.start_date,
                end_date: req.end_date,
                leave_type: req.leave_type,
                reason: req.reason,
            })
            .await?;

        info!(leave_request_id = id, "Leave request created");
        self.load(id).await
    }

    pub async fn get(&self, id: u64) -> AppResult<LeaveRequest> {
        self.load(id).await
    }

    pub async fn list(&self, filter: LeaveRequestFilter) -> AppResult<Paginated<LeaveRequest>> {
        let query = LeaveRequestQuery {
            page: PageRequest::new(filter.page, filter.page_size),
            employee_id: filter.employee_id,
            status: filter.status,
            leave_type: filter.leave_type,
            start_date: filter.start_date,
            end_date: filter.end_date,
            sort_by: filter.sort_by.unwrap_or_default(),
            sort_dir: filter.sort_dir.unwrap_or_default(),
        };

        let (data, total) = self.leaves.find_all(&query).await?;

        Ok(Paginated {
            data,
            pagination: query.page.metadata(total),
        })
    }

    /// Ownership is checked before the status permission, so a stranger
    /// always gets `Unauthorized` even when the patch carries a status.
    #[instrument(name = "leave_update", skip(self, patch))]
    pub async fn update(
        &self,
        id: u64,
        requester_id: u64,
        requester_role: Option<Role>,
        patch: UpdateLeaveRequest,
    ) -> AppResult<LeaveRequest> {
        let mut leave = self.load(id).await?;
        let privileged = is_privileged(requester_role);

        if leave.employee_id != requester_id && !privileged {
            return Err(AppError::Unauthorized(
                "unauthorized to update this leave request".into(),
            ));
        }

        if patch.status.is_some() && !privileged {
            return Err(AppError::Forbidden(
                "only HR or manager can update leave request status".into(),
            ));
        }

        let dates_changed = patch.start_date.is_some() || patch.end_date.is_some();

        if let Some(start_date) = patch.start_date {
            leave.start_date = start_date;
        }
        if let Some(end_date) = patch.end_date {
            leave.end_date = end_date;
        }
        if let Some(leave_type) = patch.leave_type {
            leave.leave_type = leave_type;
        }
        if let Some(status) = patch.status {
            leave.status = status;
        }
        if patch.reason.is_some() {
            leave.reason = patch.reason;
        }

        ensure_valid_range(leave.start_date, leave.end_date)?;

        if dates_changed {
            ensure_not_past(leave.start_date, Self::today())?;
            self.ensure_no_overlap(leave.employee_id, leave.start_date, leave.end_date, Some(id))
                .await?;
        }

        self.leaves.update(&leave).await?;
        info!(leave_request_id = id, "Leave request updated");

        self.load(id).await
    }

    #[instrument(name = "leave_approve", skip(self))]
    pub async fn approve(&self, id: u64, requester_role: Option<Role>) -> AppResult<LeaveRequest> {
        let mut leave = self.load(id).await?;

        if requester_role != Some(Role::Hr) {
            return Err(AppError::Forbidden(
                "only HR can approve leave requests".into(),
            ));
        }

        self.ensure_no_overlap(leave.employee_id, leave.start_date, leave.end_date, Some(id))
            .await?;

        leave.status = LeaveStatus::Approved;
        self.leaves.update(&leave).await?;
        info!(leave_request_id = id, "Leave request approved");

        self.load(id).await
    }

    #[instrument(name = "leave_reject", skip(self))]
    pub async fn reject(&self, id: u64, requester_role: Option<Role>) -> AppResult<LeaveRequest> {
        let mut leave = self.load(id).await?;

        if requester_role != Some(Role::Hr) {
            return Err(AppError::Forbidden(
                "only HR can reject leave requests".into(),
            ));
        }

        leave.status = LeaveStatus::Rejected;
        self.leaves.update(&leave).await?;
        info!(leave_request_id = id, "Leave request rejected");

        self.load(id).await
    }

    #[instrument(name = "leave_delete", skip(self))]
    pub async fn delete(
        &self,
        id: u64,
        requester_id: u64,
        requester_role: Option<Role>,
    ) -> AppResult<()> {
        let leave = self.load(id).await?;

        if leave.employee_id != requester_id && !is_privileged(requester_role) {
            return Err(AppError::Unauthorized(
                "unauthorized to delete this leave request".into(),
            ));
        }

        self.leaves.soft_delete(id).await?;
        info!(leave_request_id = id, "Leave request deleted");
        Ok(())
    }
}
