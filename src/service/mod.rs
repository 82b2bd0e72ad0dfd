pub mod auth;
pub mod employee;
pub mod leave_request;

pub use auth::AuthService;
pub use employee::EmployeeService;
pub use leave_request::LeaveRequestService;
