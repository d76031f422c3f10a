use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::model::menu::{MenuKey, MenuKeySet};
use crate::model::role::Role;

/// Administrator-configured exception to a user's role defaults.
///
/// An empty `menu_keys` is a real override ("nothing but Dashboard"),
/// not the absence of one.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuAccessOverride {
    pub user_id: u64,
    pub menu_keys: MenuKeySet,
    pub updated_at: DateTime<Utc>,
}

/// One row of the admin overview: an override with its owner.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OverrideSummary {
    #[schema(example = 42)]
    pub user_id: u64,
    #[schema(example = "jdoe")]
    pub username: String,
    pub user_role: Role,
    pub menu_keys: Vec<MenuKey>,
}
