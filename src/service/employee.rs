use std::sync::Arc;

use tracing::{info, instrument};
use validator::Validate;

use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult};
use crate::model::employee::{Employee, EmployeeProfile, NewEmployee};
use crate::models::{CreateEmployeeRequest, EmployeeFilter, RegisterRequest};
use crate::repository::{EmployeeQuery, EmployeeRepository};
use crate::utils::pagination::{PageRequest, Paginated};

/// Validates, checks email uniqueness, hashes the password and stores the
/// employee. Shared by registration and the directory's create.
pub(crate) async fn insert_employee(
    repo: &dyn EmployeeRepository,
    req: RegisterRequest,
) -> AppResult<Employee> {
    req.validate()?;

    if repo.find_by_email(&req.email).await?.is_some() {
        info!("Email already registered");
        return Err(AppError::EmailExists);
    }

    let password_hash = hash_password(&req.password)?;

    repo.create(&NewEmployee {
        name: req.name,
        email: req.email,
        password_hash,
        role: req.role,
    })
    .await
}

pub struct EmployeeService {
    employees: Arc<dyn EmployeeRepository>,
}

impl EmployeeService {
    pub fn new(employees: Arc<dyn EmployeeRepository>) -> Self {
        Self { employees }
    }

    #[instrument(name = "employee_create", skip(self, req), fields(email = %req.email))]
    pub async fn create(&self, req: CreateEmployeeRequest) -> AppResult<EmployeeProfile> {
        let employee = insert_employee(self.employees.as_ref(), req).await?;
        info!(employee_id = employee.id, "Employee created");
        Ok(EmployeeProfile::from(&employee))
    }

    pub async fn get(&self, id: u64) -> AppResult<EmployeeProfile> {
        self.employees
            .find_by_id(id)
            .await?
            .map(|e| EmployeeProfile::from(&e))
            .ok_or_else(|| AppError::NotFound("employee not found".into()))
    }

    pub async fn list(&self, filter: EmployeeFilter) -> AppResult<Paginated<EmployeeProfile>> {
        let query = EmployeeQuery {
            page: PageRequest::new(filter.page, filter.page_size),
            search: filter.search,
            sort_by: filter.sort_by.unwrap_or_default(),
            sort_dir: filter.sort_dir.unwrap_or_default(),
        };

        let (employees, total) = self.employees.find_all(&query).await?;

        Ok(Paginated {
            data: employees.iter().map(EmployeeProfile::from).collect(),
            pagination: query.page.metadata(total),
        })
    }
}
