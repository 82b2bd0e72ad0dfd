use std::sync::Arc;

use tracing::{debug, info, instrument};
use validator::Validate;

use crate::auth::jwt::generate_token;
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::model::employee::{Employee, EmployeeProfile};
use crate::models::{AuthResponse, LoginRequest, RegisterRequest};
use crate::repository::EmployeeRepository;
use crate::service::employee::insert_employee;

pub struct AuthService {
    employees: Arc<dyn EmployeeRepository>,
    jwt_secret: String,
    token_ttl: u64,
}

impl AuthService {
    pub fn new(employees: Arc<dyn EmployeeRepository>, jwt_secret: String, token_ttl: u64) -> Self {
        Self {
            employees,
            jwt_secret,
            token_ttl,
        }
    }

    /// Unknown email and wrong password fail identically.
    #[instrument(name = "auth_login", skip(self, req), fields(email = %req.email))]
    pub async fn login(&self, req: LoginRequest) -> AppResult<AuthResponse> {
        req.validate()?;

        debug!("Fetching employee by email");
        let employee = match self.employees.find_by_email(&req.email).await? {
            Some(e) => e,
            None => {
                info!("Invalid credentials: employee not found");
                return Err(AppError::InvalidCredentials);
            }
        };

        if !verify_password(&req.password, &employee.password_hash) {
            info!(employee_id = employee.id, "Invalid credentials: password mismatch");
            return Err(AppError::InvalidCredentials);
        }

        info!(employee_id = employee.id, "Login successful");
        self.issue(&employee)
    }

    #[instrument(name = "auth_register", skip(self, req), fields(email = %req.email))]
    pub async fn register(&self, req: RegisterRequest) -> AppResult<AuthResponse> {
        let employee = insert_employee(self.employees.as_ref(), req).await?;
        info!(employee_id = employee.id, "Employee registered");
        self.issue(&employee)
    }

    fn issue(&self, employee: &Employee) -> AppResult<AuthResponse> {
        let token = generate_token(employee, &self.jwt_secret, self.token_ttl)?;
        Ok(AuthResponse {
            token,
            user: EmployeeProfile::from(employee),
        })
    }
}
