use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

/// One navigable screen. The set is closed and shared with the navigation
/// layer; declaration order is the canonical order of every key list.
#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MenuKey {
    Dashboard,
    Companies,
    Departments,
    Positions,
    Shifts,
    OrganizationStructure,
    Users,
    Employees,
    Attendance,
    Leaves,
    Payroll,
    Payslips,
    MenuAccessPolicy,
}

pub type MenuKeySet = BTreeSet<MenuKey>;

impl MenuKey {
    pub fn parse(raw: &str) -> AppResult<Self> {
        raw.parse()
            .map_err(|_| AppError::Validation(format!("invalid menu key: {raw}")))
    }

    /// Parses every key, failing on the first one outside the universe.
    pub fn parse_all<I, S>(raw: I) -> AppResult<MenuKeySet>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        raw.into_iter().map(|k| MenuKey::parse(k.as_ref())).collect()
    }
}
