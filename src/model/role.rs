use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Role carried by an employee record and by its session token.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Employee,
    Hr,
    Manager,
}

impl Role {
    /// HR and managers may edit or delete any leave request, including its status.
    pub fn is_privileged(self) -> bool {
        matches!(self, Role::Hr | Role::Manager)
    }
}
