//! Persistence gateway. Services only see the traits; the MySQL
//! implementations are wired up in `main`.

pub mod employee;
pub mod leave_request;

pub use employee::{EmployeeQuery, EmployeeRepository, MySqlEmployeeRepository};
pub use leave_request::{LeaveRequestQuery, LeaveRequestRepository, MySqlLeaveRequestRepository};
