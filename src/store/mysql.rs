use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, MySqlPool};

use crate::error::{AppError, AppResult};
use crate::model::attendance::{AttendanceEntry, AttendanceStatus};
use crate::model::employee_salary::{MaritalStatus, SalaryStructure};
use crate::model::menu::MenuKeySet;
use crate::model::menu_access::{MenuAccessOverride, OverrideSummary};
use crate::model::payroll::{PayPeriod, PayrollRecord, PayrollStatus};
use crate::model::role::Role;
use crate::model::user::UserProfile;
use crate::store::{
    MenuAccessStore, Page, PayrollFacts, PayrollFilter, PayrollInputSource, PayrollStore,
};

/// MySQL-backed implementation of every store seam. Tables are described
/// in `db/schema.sql`.
#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

// MySQL reports duplicate keys as SQLSTATE 23000
fn is_duplicate_key(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23000"))
}

fn role_from_column(role_id: u8) -> AppResult<Role> {
    Role::from_id(role_id).ok_or_else(|| AppError::Transport(format!("unknown role id {role_id}")))
}

#[derive(FromRow)]
struct UserRow {
    id: u64,
    username: String,
    role_id: u8,
    employee_id: Option<u64>,
}

#[derive(FromRow)]
struct OverrideRow {
    user_id: u64,
    menu_keys: String,
    updated_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct OverrideSummaryRow {
    user_id: u64,
    username: String,
    role_id: u8,
    menu_keys: String,
}

#[async_trait]
impl MenuAccessStore for MySqlStore {
    async fn find_user(&self, user_id: u64) -> AppResult<Option<UserProfile>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, role_id, employee_id
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| {
            Ok(UserProfile {
                id: r.id,
                username: r.username,
                role: role_from_column(r.role_id)?,
                employee_id: r.employee_id,
            })
        })
        .transpose()
    }

    async fn fetch_override(&self, user_id: u64) -> AppResult<Option<MenuAccessOverride>> {
        let row = sqlx::query_as::<_, OverrideRow>(
            r#"
            SELECT user_id, menu_keys, updated_at
            FROM user_menu_access
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| {
            Ok(MenuAccessOverride {
                user_id: r.user_id,
                menu_keys: serde_json::from_str::<MenuKeySet>(&r.menu_keys)?,
                updated_at: r.updated_at,
            })
        })
        .transpose()
    }

    async fn save_override(&self, access: &MenuAccessOverride) -> AppResult<()> {
        let keys = serde_json::to_string(&access.menu_keys)?;

        sqlx::query(
            r#"
            INSERT INTO user_menu_access (user_id, menu_keys, updated_at)
            VALUES (?, ?, ?)
            ON DUPLICATE KEY UPDATE
                menu_keys = VALUES(menu_keys),
                updated_at = VALUES(updated_at)
            "#,
        )
        .bind(access.user_id)
        .bind(keys)
        .bind(access.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_override(&self, user_id: u64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM user_menu_access WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_overrides(&self) -> AppResult<Vec<OverrideSummary>> {
        let rows = sqlx::query_as::<_, OverrideSummaryRow>(
            r#"
            SELECT a.user_id, u.username, u.role_id, a.menu_keys
            FROM user_menu_access a
            JOIN users u ON u.id = a.user_id
            ORDER BY a.user_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|r| {
                let keys = serde_json::from_str::<MenuKeySet>(&r.menu_keys)?;
                Ok(OverrideSummary {
                    user_id: r.user_id,
                    username: r.username,
                    user_role: role_from_column(r.role_id)?,
                    menu_keys: keys.into_iter().collect(),
                })
            })
            .collect()
    }
}

#[derive(FromRow)]
struct PayrollRow {
    id: u64,
    employee_id: u64,
    period_month: u32,
    period_year: i32,
    working_days: u32,
    present_days: u32,
    basic_salary: f64,
    total_allowances: f64,
    overtime_pay: f64,
    thr: f64,
    bpjs_kes_deduction: f64,
    bpjs_tk_deduction: f64,
    pph21: f64,
    other_deductions: f64,
    gross_salary: f64,
    total_deductions: f64,
    net_salary: f64,
    status: String,
    paid_at: Option<DateTime<Utc>>,
    notes: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PayrollRow> for PayrollRecord {
    type Error = AppError;

    fn try_from(r: PayrollRow) -> AppResult<Self> {
        let status = r
            .status
            .parse::<PayrollStatus>()
            .map_err(|_| AppError::Transport(format!("unknown payroll status {}", r.status)))?;

        Ok(PayrollRecord {
            id: r.id,
            employee_id: r.employee_id,
            period_month: r.period_month,
            period_year: r.period_year,
            working_days: r.working_days,
            present_days: r.present_days,
            basic_salary: r.basic_salary,
            total_allowances: r.total_allowances,
            overtime_pay: r.overtime_pay,
            thr: r.thr,
            bpjs_kes_deduction: r.bpjs_kes_deduction,
            bpjs_tk_deduction: r.bpjs_tk_deduction,
            pph21: r.pph21,
            other_deductions: r.other_deductions,
            gross_salary: r.gross_salary,
            total_deductions: r.total_deductions,
            net_salary: r.net_salary,
            status,
            paid_at: r.paid_at,
            notes: r.notes,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

const PAYROLL_COLUMNS: &str = r#"
    id, employee_id, period_month, period_year, working_days, present_days,
    basic_salary, total_allowances, overtime_pay, thr,
    bpjs_kes_deduction, bpjs_tk_deduction, pph21, other_deductions,
    gross_salary, total_deductions, net_salary,
    status, paid_at, notes, created_at, updated_at
"#;

// Typed binding for the dynamic WHERE clause
enum FilterValue<'a> {
    U64(u64),
    U32(u32),
    I32(i32),
    Str(&'a str),
}

#[async_trait]
impl PayrollStore for MySqlStore {
    async fn create(&self, mut record: PayrollRecord) -> AppResult<PayrollRecord> {
        let result = sqlx::query(
            r#"
            INSERT INTO payroll_records
                (employee_id, period_month, period_year, working_days, present_days,
                 basic_salary, total_allowances, overtime_pay, thr,
                 bpjs_kes_deduction, bpjs_tk_deduction, pph21, other_deductions,
                 gross_salary, total_deductions, net_salary,
                 status, paid_at, notes, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.employee_id)
        .bind(record.period_month)
        .bind(record.period_year)
        .bind(record.working_days)
        .bind(record.present_days)
        .bind(record.basic_salary)
        .bind(record.total_allowances)
        .bind(record.overtime_pay)
        .bind(record.thr)
        .bind(record.bpjs_kes_deduction)
        .bind(record.bpjs_tk_deduction)
        .bind(record.pph21)
        .bind(record.other_deductions)
        .bind(record.gross_salary)
        .bind(record.total_deductions)
        .bind(record.net_salary)
        .bind(record.status.as_ref())
        .bind(record.paid_at)
        .bind(&record.notes)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => {
                record.id = done.last_insert_id();
                Ok(record)
            }
            Err(e) if is_duplicate_key(&e) => Err(AppError::Conflict(
                "payroll already exists for this period".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_id(&self, id: u64) -> AppResult<Option<PayrollRecord>> {
        let sql = format!("SELECT {PAYROLL_COLUMNS} FROM payroll_records WHERE id = ?");
        let row = sqlx::query_as::<_, PayrollRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(PayrollRecord::try_from).transpose()
    }

    async fn find_by_key(
        &self,
        employee_id: u64,
        period: PayPeriod,
    ) -> AppResult<Option<PayrollRecord>> {
        let sql = format!(
            "SELECT {PAYROLL_COLUMNS} FROM payroll_records \
             WHERE employee_id = ? AND period_month = ? AND period_year = ?"
        );
        let row = sqlx::query_as::<_, PayrollRow>(&sql)
            .bind(employee_id)
            .bind(period.month)
            .bind(period.year)
            .fetch_optional(&self.pool)
            .await?;

        row.map(PayrollRecord::try_from).transpose()
    }

    async fn list(&self, filter: &PayrollFilter) -> AppResult<Page<PayrollRecord>> {
        let mut where_sql = String::from(" WHERE 1=1");
        let mut args: Vec<FilterValue> = Vec::new();

        if let Some(employee_id) = filter.employee_id {
            where_sql.push_str(" AND employee_id = ?");
            args.push(FilterValue::U64(employee_id));
        }
        if let Some(month) = filter.month {
            where_sql.push_str(" AND period_month = ?");
            args.push(FilterValue::U32(month));
        }
        if let Some(year) = filter.year {
            where_sql.push_str(" AND period_year = ?");
            args.push(FilterValue::I32(year));
        }
        if let Some(status) = filter.status.as_ref() {
            where_sql.push_str(" AND status = ?");
            args.push(FilterValue::Str(status.as_ref()));
        }

        let count_sql = format!("SELECT COUNT(*) FROM payroll_records{where_sql}");
        let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
        for arg in &args {
            count_q = match arg {
                FilterValue::U64(v) => count_q.bind(*v),
                FilterValue::U32(v) => count_q.bind(*v),
                FilterValue::I32(v) => count_q.bind(*v),
                FilterValue::Str(s) => count_q.bind(*s),
            };
        }
        let total = count_q.fetch_one(&self.pool).await?;

        let data_sql = format!(
            r#"
            SELECT {PAYROLL_COLUMNS}
            FROM payroll_records
            {where_sql}
            ORDER BY period_year DESC, period_month DESC, id DESC
            LIMIT ? OFFSET ?
            "#
        );
        let mut data_q = sqlx::query_as::<_, PayrollRow>(&data_sql);
        for arg in args {
            data_q = match arg {
                FilterValue::U64(v) => data_q.bind(v),
                FilterValue::U32(v) => data_q.bind(v),
                FilterValue::I32(v) => data_q.bind(v),
                FilterValue::Str(s) => data_q.bind(s),
            };
        }
        let rows = data_q
            .bind(filter.per_page())
            .bind(filter.offset())
            .fetch_all(&self.pool)
            .await?;

        let items = rows
            .into_iter()
            .map(PayrollRecord::try_from)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Page {
            items,
            total,
            page: filter.page(),
            per_page: filter.per_page(),
        })
    }

    async fn update(&self, record: &PayrollRecord) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE payroll_records
            SET overtime_pay = ?, thr = ?, other_deductions = ?,
                gross_salary = ?, total_deductions = ?, net_salary = ?,
                status = ?, paid_at = ?, notes = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(record.overtime_pay)
        .bind(record.thr)
        .bind(record.other_deductions)
        .bind(record.gross_salary)
        .bind(record.total_deductions)
        .bind(record.net_salary)
        .bind(record.status.as_ref())
        .bind(record.paid_at)
        .bind(&record.notes)
        .bind(record.updated_at)
        .bind(record.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("payroll not found".to_string()));
        }
        Ok(())
    }

    async fn delete(&self, id: u64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM payroll_records WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[derive(FromRow)]
struct AttendanceRow {
    date: NaiveDate,
    status: String,
    overtime_hours: f64,
}

#[async_trait]
impl PayrollInputSource for MySqlStore {
    async fn payroll_facts(&self, employee_id: u64, period: PayPeriod) -> AppResult<PayrollFacts> {
        let marital = sqlx::query_scalar::<_, Option<String>>(
            "SELECT marital_status FROM employees WHERE id = ?",
        )
        .bind(employee_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("employee not found".to_string()))?;

        let salary = sqlx::query_as::<_, SalaryStructure>(
            r#"
            SELECT basic_salary, transport_allowance, meal_allowance, housing_allowance,
                   position_allowance, bpjs_kes_employee, bpjs_tk_jht_employee,
                   bpjs_tk_jp_employee
            FROM employee_salaries
            WHERE employee_id = ?
            ORDER BY effective_date DESC
            LIMIT 1
            "#,
        )
        .bind(employee_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            AppError::NotFound("employee salary not found, please set salary first".to_string())
        })?;

        let rows = sqlx::query_as::<_, AttendanceRow>(
            r#"
            SELECT date, status, overtime_hours
            FROM attendance
            WHERE employee_id = ?
            AND MONTH(date) = ?
            AND YEAR(date) = ?
            ORDER BY date
            "#,
        )
        .bind(employee_id)
        .bind(period.month)
        .bind(period.year)
        .fetch_all(&self.pool)
        .await?;

        let attendance = rows
            .into_iter()
            .filter_map(|r| match r.status.parse::<AttendanceStatus>() {
                Ok(status) => Some(AttendanceEntry {
                    date: r.date,
                    status,
                    overtime_hours: r.overtime_hours,
                }),
                Err(_) => {
                    tracing::warn!(employee_id, date = %r.date, status = %r.status, "Skipping attendance row with unknown status");
                    None
                }
            })
            .collect();

        Ok(PayrollFacts {
            salary,
            marital_status: MaritalStatus::from_db(marital.as_deref()),
            attendance,
        })
    }
}

// Needs a disposable MySQL database:
// HRIS_TEST_DATABASE_URL=mysql://... cargo test --features mysql-tests
#[cfg(all(test, feature = "mysql-tests"))]
mod tests {
    use super::*;
    use crate::db::init_db;
    use crate::model::menu::MenuKey;
    use crate::payroll::aggregator::{draft, transition_status};
    use crate::payroll::inputs::PayrollInputs;

    const SCHEMA: &str = include_str!("../../db/schema.sql");

    async fn mysql_store() -> Option<MySqlStore> {
        let url = match std::env::var("HRIS_TEST_DATABASE_URL") {
            Ok(url) => url,
            Err(_) => {
                eprintln!("skipping mysql-tests: set HRIS_TEST_DATABASE_URL");
                return None;
            }
        };
        let pool = match init_db(&url).await {
            Ok(pool) => pool,
            Err(err) => {
                eprintln!("skipping mysql-tests: cannot connect to mysql: {err}");
                return None;
            }
        };
        for stmt in SCHEMA.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            sqlx::query(stmt).execute(&pool).await.unwrap();
        }
        Some(MySqlStore::new(pool))
    }

    fn inputs() -> PayrollInputs {
        PayrollInputs {
            working_days: 22,
            present_days: 20,
            basic_salary: 5_000_000.0,
            total_allowances: 500_000.0,
            overtime_pay: 0.0,
            bpjs_kes_deduction: 50_000.0,
            bpjs_tk_deduction: 150_000.0,
            pph21: 50_000.0,
        }
    }

    async fn clear_payroll(store: &MySqlStore, employee_id: u64) {
        sqlx::query("DELETE FROM payroll_records WHERE employee_id = ?")
            .bind(employee_id)
            .execute(&store.pool)
            .await
            .unwrap();
    }

    #[actix_web::test]
    async fn empty_override_survives_a_round_trip() {
        let Some(store) = mysql_store().await else {
            return;
        };
        let user_id = 9_001;
        sqlx::query(
            "INSERT INTO users (id, username, role_id) VALUES (?, 'mysql-test', 3) \
             ON DUPLICATE KEY UPDATE role_id = 3",
        )
        .bind(user_id)
        .execute(&store.pool)
        .await
        .unwrap();
        store.delete_override(user_id).await.unwrap();

        let access = MenuAccessOverride {
            user_id,
            menu_keys: MenuKeySet::new(),
            updated_at: Utc::now(),
        };
        store.save_override(&access).await.unwrap();

        let fetched = store.fetch_override(user_id).await.unwrap().unwrap();
        assert!(fetched.menu_keys.is_empty());

        // upsert replaces the set
        let access = MenuAccessOverride {
            menu_keys: [MenuKey::Payslips].into_iter().collect(),
            ..access
        };
        store.save_override(&access).await.unwrap();
        let summary = store
            .list_overrides()
            .await
            .unwrap()
            .into_iter()
            .find(|s| s.user_id == user_id)
            .unwrap();
        assert_eq!(summary.user_role, Role::Employee);
        assert_eq!(summary.menu_keys, [MenuKey::Payslips]);

        assert!(store.delete_override(user_id).await.unwrap());
        assert!(!store.delete_override(user_id).await.unwrap());
        assert!(store.fetch_override(user_id).await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn duplicate_period_insert_is_a_conflict() {
        let Some(store) = mysql_store().await else {
            return;
        };
        let employee_id = 9_101;
        clear_payroll(&store, employee_id).await;
        let period = PayPeriod::new(1, 2026).unwrap();

        let created = store
            .create(draft(employee_id, period, &inputs(), Utc::now()))
            .await
            .unwrap();
        assert!(created.id > 0);

        let err = store
            .create(draft(employee_id, period, &inputs(), Utc::now()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let found = store.find_by_key(employee_id, period).await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.net_salary, created.net_salary);
    }

    #[actix_web::test]
    async fn list_binds_every_filter() {
        let Some(store) = mysql_store().await else {
            return;
        };
        let employee_id = 9_201;
        clear_payroll(&store, employee_id).await;

        for month in 1..=3 {
            let period = PayPeriod::new(month, 2026).unwrap();
            store
                .create(draft(employee_id, period, &inputs(), Utc::now()))
                .await
                .unwrap();
        }
        let march = store
            .find_by_key(employee_id, PayPeriod::new(3, 2026).unwrap())
            .await
            .unwrap()
            .unwrap();
        let processed = transition_status(march, PayrollStatus::Processed, Utc::now()).unwrap();
        store.update(&processed).await.unwrap();

        let mut filter = PayrollFilter {
            employee_id: Some(employee_id),
            month: None,
            year: Some(2026),
            status: Some(PayrollStatus::Draft),
            page: Some(1),
            per_page: Some(1),
        };
        let page = store.list(&filter).await.unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].period_month, 2);

        filter.status = None;
        filter.month = Some(3);
        let page = store.list(&filter).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].status, PayrollStatus::Processed);

        filter.month = None;
        filter.page = Some(u32::MAX);
        let page = store.list(&filter).await.unwrap();
        assert_eq!(page.total, 3);
        assert!(page.items.is_empty());
    }
}
