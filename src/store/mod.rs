//! Seams to the systems that own the data: user accounts, menu overrides,
//! payroll records and the attendance/salary facts payroll is computed from.
//!
//! Uniqueness (one override per user, one payroll record per employee and
//! period) is the store's job, not the caller's.
use async_trait::async_trait;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::error::AppResult;
use crate::model::attendance::AttendanceEntry;
use crate::model::employee_salary::{MaritalStatus, SalaryStructure};
use crate::model::menu_access::{MenuAccessOverride, OverrideSummary};
use crate::model::payroll::{PayPeriod, PayrollRecord, PayrollStatus};
use crate::model::user::UserProfile;

pub mod memory;
pub mod mysql;

#[async_trait]
pub trait MenuAccessStore: Send + Sync {
    async fn find_user(&self, user_id: u64) -> AppResult<Option<UserProfile>>;
    async fn fetch_override(&self, user_id: u64) -> AppResult<Option<MenuAccessOverride>>;
    /// Replaces any existing override for the user.
    async fn save_override(&self, access: &MenuAccessOverride) -> AppResult<()>;
    /// Returns whether an override existed.
    async fn delete_override(&self, user_id: u64) -> AppResult<bool>;
    async fn list_overrides(&self) -> AppResult<Vec<OverrideSummary>>;
}

#[derive(Debug, Clone, Deserialize, IntoParams, ToSchema)]
pub struct PayrollFilter {
    #[schema(example = 1001)]
    pub employee_id: Option<u64>,
    #[schema(example = 1)]
    pub month: Option<u32>,
    #[schema(example = 2026)]
    pub year: Option<i32>,
    pub status: Option<PayrollStatus>,
    #[schema(example = 1)]
    pub page: Option<u32>,
    #[schema(example = 10)]
    pub per_page: Option<u32>,
}

impl PayrollFilter {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn per_page(&self) -> u32 {
        self.per_page.unwrap_or(10).clamp(1, 100)
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page() - 1) * u64::from(self.per_page())
    }

    pub fn matches(&self, record: &PayrollRecord) -> bool {
        self.employee_id.is_none_or(|id| record.employee_id == id)
            && self.month.is_none_or(|m| record.period_month == m)
            && self.year.is_none_or(|y| record.period_year == y)
            && self.status.is_none_or(|s| record.status == s)
    }
}

/// One page of results plus the paging it was cut with.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}

#[async_trait]
pub trait PayrollStore: Send + Sync {
    /// Inserts a new record and returns it with its id. A record for the
    /// same (employee, month, year) is a `Conflict`.
    async fn create(&self, record: PayrollRecord) -> AppResult<PayrollRecord>;
    async fn find_by_id(&self, id: u64) -> AppResult<Option<PayrollRecord>>;
    async fn find_by_key(
        &self,
        employee_id: u64,
        period: PayPeriod,
    ) -> AppResult<Option<PayrollRecord>>;
    /// Newest period first.
    async fn list(&self, filter: &PayrollFilter) -> AppResult<Page<PayrollRecord>>;
    async fn update(&self, record: &PayrollRecord) -> AppResult<()>;
    async fn delete(&self, id: u64) -> AppResult<bool>;
}

/// Raw inputs for one employee and period, before any payroll rule runs.
#[derive(Debug, Clone, PartialEq)]
pub struct PayrollFacts {
    pub salary: SalaryStructure,
    pub marital_status: MaritalStatus,
    pub attendance: Vec<AttendanceEntry>,
}

#[async_trait]
pub trait PayrollInputSource: Send + Sync {
    /// `NotFound` when the employee or their salary is missing.
    async fn payroll_facts(&self, employee_id: u64, period: PayPeriod) -> AppResult<PayrollFacts>;
}
