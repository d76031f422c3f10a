use serde::{Deserialize, Serialize};

use crate::model::role::Role;

/// The slice of a user account the access resolver needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: u64,
    pub username: String,
    pub role: Role,
    pub employee_id: Option<u64>,
}
