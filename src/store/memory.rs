//! In-memory store used by tests and local runs without MySQL.
//!
//! Not durable. Every map sits behind its own `RwLock`; uniqueness checks
//! and inserts happen under one write guard.
use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::error::{AppError, AppResult};
use crate::model::attendance::AttendanceEntry;
use crate::model::employee_salary::{MaritalStatus, SalaryStructure};
use crate::model::menu_access::{MenuAccessOverride, OverrideSummary};
use crate::model::payroll::{PayPeriod, PayrollRecord};
use crate::model::user::UserProfile;
use crate::store::{
    MenuAccessStore, Page, PayrollFacts, PayrollFilter, PayrollInputSource, PayrollStore,
};
use chrono::Datelike;

#[derive(Debug, Clone, Default)]
struct EmployeeFacts {
    marital_status: MaritalStatus,
    salary: Option<SalaryStructure>,
    attendance: Vec<AttendanceEntry>,
}

#[derive(Debug, Default)]
struct PayrollTable {
    next_id: u64,
    rows: BTreeMap<u64, PayrollRecord>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<u64, UserProfile>>,
    overrides: RwLock<HashMap<u64, MenuAccessOverride>>,
    payroll: RwLock<PayrollTable>,
    employees: RwLock<HashMap<u64, EmployeeFacts>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_user(&self, user: UserProfile) {
        self.users
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user.id, user);
    }

    /// Registers an employee; `salary` may be absent to model "salary not set yet".
    pub fn insert_employee(
        &self,
        employee_id: u64,
        marital_status: MaritalStatus,
        salary: Option<SalaryStructure>,
    ) {
        self.employees
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                employee_id,
                EmployeeFacts {
                    marital_status,
                    salary,
                    attendance: Vec::new(),
                },
            );
    }

    pub fn record_attendance(&self, employee_id: u64, entry: AttendanceEntry) {
        if let Some(facts) = self
            .employees
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(&employee_id)
        {
            facts.attendance.push(entry);
        }
    }
}

#[async_trait]
impl MenuAccessStore for MemoryStore {
    async fn find_user(&self, user_id: u64) -> AppResult<Option<UserProfile>> {
        let users = self.users.read().unwrap_or_else(PoisonError::into_inner);
        Ok(users.get(&user_id).cloned())
    }

    async fn fetch_override(&self, user_id: u64) -> AppResult<Option<MenuAccessOverride>> {
        let overrides = self.overrides.read().unwrap_or_else(PoisonError::into_inner);
        Ok(overrides.get(&user_id).cloned())
    }

    async fn save_override(&self, access: &MenuAccessOverride) -> AppResult<()> {
        self.overrides
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(access.user_id, access.clone());
        Ok(())
    }

    async fn delete_override(&self, user_id: u64) -> AppResult<bool> {
        let removed = self
            .overrides
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&user_id);
        Ok(removed.is_some())
    }

    async fn list_overrides(&self) -> AppResult<Vec<OverrideSummary>> {
        let users = self.users.read().unwrap_or_else(PoisonError::into_inner);
        let overrides = self.overrides.read().unwrap_or_else(PoisonError::into_inner);

        let mut out: Vec<OverrideSummary> = overrides
            .values()
            .filter_map(|o| {
                users.get(&o.user_id).map(|u| OverrideSummary {
                    user_id: o.user_id,
                    username: u.username.clone(),
                    user_role: u.role,
                    menu_keys: o.menu_keys.iter().copied().collect(),
                })
            })
            .collect();
        out.sort_by_key(|s| s.user_id);
        Ok(out)
    }
}

#[async_trait]
impl PayrollStore for MemoryStore {
    async fn create(&self, mut record: PayrollRecord) -> AppResult<PayrollRecord> {
        let mut table = self.payroll.write().unwrap_or_else(PoisonError::into_inner);

        let duplicate = table.rows.values().any(|r| {
            r.employee_id == record.employee_id && r.period() == record.period()
        });
        if duplicate {
            return Err(AppError::Conflict(
                "payroll already exists for this period".to_string(),
            ));
        }

        table.next_id += 1;
        record.id = table.next_id;
        table.rows.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: u64) -> AppResult<Option<PayrollRecord>> {
        let table = self.payroll.read().unwrap_or_else(PoisonError::into_inner);
        Ok(table.rows.get(&id).cloned())
    }

    async fn find_by_key(
        &self,
        employee_id: u64,
        period: PayPeriod,
    ) -> AppResult<Option<PayrollRecord>> {
        let table = self.payroll.read().unwrap_or_else(PoisonError::into_inner);
        Ok(table
            .rows
            .values()
            .find(|r| r.employee_id == employee_id && r.period() == period)
            .cloned())
    }

    async fn list(&self, filter: &PayrollFilter) -> AppResult<Page<PayrollRecord>> {
        let table = self.payroll.read().unwrap_or_else(PoisonError::into_inner);

        let mut matching: Vec<PayrollRecord> = table
            .rows
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            (b.period_year, b.period_month, b.id).cmp(&(a.period_year, a.period_month, a.id))
        });

        let total = matching.len() as i64;
        let items = matching
            .into_iter()
            .skip(usize::try_from(filter.offset()).unwrap_or(usize::MAX))
            .take(filter.per_page() as usize)
            .collect();
        Ok(Page {
            items,
            total,
            page: filter.page(),
            per_page: filter.per_page(),
        })
    }

    async fn update(&self, record: &PayrollRecord) -> AppResult<()> {
        let mut table = self.payroll.write().unwrap_or_else(PoisonError::into_inner);
        match table.rows.get_mut(&record.id) {
            Some(row) => {
                *row = record.clone();
                Ok(())
            }
            None => Err(AppError::NotFound("payroll not found".to_string())),
        }
    }

    async fn delete(&self, id: u64) -> AppResult<bool> {
        let mut table = self.payroll.write().unwrap_or_else(PoisonError::into_inner);
        Ok(table.rows.remove(&id).is_some())
    }
}

#[async_trait]
impl PayrollInputSource for MemoryStore {
    async fn payroll_facts(&self, employee_id: u64, period: PayPeriod) -> AppResult<PayrollFacts> {
        let employees = self.employees.read().unwrap_or_else(PoisonError::into_inner);

        let facts = employees
            .get(&employee_id)
            .ok_or_else(|| AppError::NotFound("employee not found".to_string()))?;
        let salary = facts.salary.clone().ok_or_else(|| {
            AppError::NotFound("employee salary not found, please set salary first".to_string())
        })?;

        let attendance = facts
            .attendance
            .iter()
            .filter(|a| a.date.month() == period.month && a.date.year() == period.year)
            .cloned()
            .collect();

        Ok(PayrollFacts {
            salary,
            marital_status: facts.marital_status,
            attendance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::payroll::PayrollStatus;
    use chrono::Utc;

    fn record(employee_id: u64, month: u32, year: i32) -> PayrollRecord {
        let now = Utc::now();
        PayrollRecord {
            id: 0,
            employee_id,
            period_month: month,
            period_year: year,
            working_days: 20,
            present_days: 20,
            basic_salary: 1.0,
            total_allowances: 0.0,
            overtime_pay: 0.0,
            thr: 0.0,
            bpjs_kes_deduction: 0.0,
            bpjs_tk_deduction: 0.0,
            pph21: 0.0,
            other_deductions: 0.0,
            gross_salary: 1.0,
            total_deductions: 0.0,
            net_salary: 1.0,
            status: PayrollStatus::Draft,
            paid_at: None,
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn filter(page: u32, per_page: u32) -> PayrollFilter {
        PayrollFilter {
            employee_id: None,
            month: None,
            year: None,
            status: None,
            page: Some(page),
            per_page: Some(per_page),
        }
    }

    #[actix_web::test]
    async fn create_enforces_one_record_per_employee_and_period() {
        let store = MemoryStore::new();

        let first = store.create(record(1, 3, 2026)).await.unwrap();
        assert_eq!(first.id, 1);

        let err = store.create(record(1, 3, 2026)).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        // other employee, other period
        assert_eq!(store.create(record(2, 3, 2026)).await.unwrap().id, 2);
        assert_eq!(store.create(record(1, 4, 2026)).await.unwrap().id, 3);
    }

    #[actix_web::test]
    async fn list_orders_newest_period_first_and_paginates() {
        let store = MemoryStore::new();
        for (month, year) in [(11, 2025), (2, 2026), (12, 2025), (1, 2026)] {
            store.create(record(1, month, year)).await.unwrap();
        }

        let page = store.list(&filter(1, 3)).await.unwrap();
        assert_eq!(page.total, 4);
        let periods: Vec<(u32, i32)> = page
            .items
            .iter()
            .map(|r| (r.period_month, r.period_year))
            .collect();
        assert_eq!(periods, [(2, 2026), (1, 2026), (12, 2025)]);

        let page = store.list(&filter(2, 3)).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].period_month, 11);
    }

    #[actix_web::test]
    async fn far_page_is_empty_instead_of_overflowing() {
        let store = MemoryStore::new();
        store.create(record(1, 1, 2026)).await.unwrap();

        let far = filter(u32::MAX, 100);
        assert_eq!(far.offset(), (u64::from(u32::MAX) - 1) * 100);

        let page = store.list(&far).await.unwrap();
        assert_eq!(page.total, 1);
        assert!(page.items.is_empty());
        assert_eq!(page.page, u32::MAX);
    }

    #[actix_web::test]
    async fn update_of_unknown_record_is_not_found() {
        let store = MemoryStore::new();
        let err = store.update(&record(1, 1, 2026)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
