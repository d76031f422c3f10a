//! Payroll operations against the stores. Rules live in `aggregator` and
//! `inputs`; this layer loads, applies and saves.
use chrono::Utc;

use crate::error::{AppError, AppResult};
use crate::model::payroll::{PayPeriod, PayrollRecord, PayrollStatus};
use crate::payroll::aggregator::{self, PayrollAdjustment};
use crate::payroll::inputs::derive_inputs;
use crate::store::{Page, PayrollFilter, PayrollInputSource, PayrollStore};

async fn load(store: &dyn PayrollStore, id: u64) -> AppResult<PayrollRecord> {
    store
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("payroll not found".to_string()))
}

pub async fn generate(
    store: &dyn PayrollStore,
    source: &dyn PayrollInputSource,
    employee_id: u64,
    month: u32,
    year: i32,
) -> AppResult<PayrollRecord> {
    let period = PayPeriod::new(month, year)?;

    if store.find_by_key(employee_id, period).await?.is_some() {
        return Err(AppError::Conflict(
            "payroll already exists for this period".to_string(),
        ));
    }

    let facts = source.payroll_facts(employee_id, period).await?;
    let inputs = derive_inputs(&facts, period)?;
    let record = aggregator::draft(employee_id, period, &inputs, Utc::now());

    // the store re-checks uniqueness; a concurrent generate loses there
    let created = store.create(record).await?;

    tracing::info!(
        payroll_id = created.id,
        employee_id,
        month,
        year,
        net_salary = created.net_salary,
        "Payroll generated"
    );
    Ok(created)
}

pub async fn get(store: &dyn PayrollStore, id: u64) -> AppResult<PayrollRecord> {
    load(store, id).await
}

pub async fn list(store: &dyn PayrollStore, filter: &PayrollFilter) -> AppResult<Page<PayrollRecord>> {
    store.list(filter).await
}

pub async fn update_status(
    store: &dyn PayrollStore,
    id: u64,
    target: PayrollStatus,
) -> AppResult<PayrollRecord> {
    let record = load(store, id).await?;
    let from = record.status;

    let updated = aggregator::transition_status(record, target, Utc::now())?;
    store.update(&updated).await?;

    tracing::info!(payroll_id = id, %from, to = %target, "Payroll status changed");
    Ok(updated)
}

pub async fn adjust(
    store: &dyn PayrollStore,
    id: u64,
    adjustment: PayrollAdjustment,
) -> AppResult<PayrollRecord> {
    let record = load(store, id).await?;

    let updated = aggregator::adjust(record, adjustment, Utc::now())?;
    store.update(&updated).await?;

    tracing::info!(payroll_id = id, net_salary = updated.net_salary, "Payroll adjusted");
    Ok(updated)
}

/// Only drafts can be removed.
pub async fn delete(store: &dyn PayrollStore, id: u64) -> AppResult<()> {
    let record = load(store, id).await?;
    if record.status != PayrollStatus::Draft {
        return Err(AppError::InvalidTransition(
            "can only delete draft payroll".to_string(),
        ));
    }

    if !store.delete(id).await? {
        return Err(AppError::NotFound("payroll not found".to_string()));
    }

    tracing::info!(payroll_id = id, "Payroll deleted");
    Ok(())
}

/// Paid records of one employee, newest period first.
pub async fn payslips(
    store: &dyn PayrollStore,
    employee_id: u64,
    page: Option<u32>,
    per_page: Option<u32>,
) -> AppResult<Page<PayrollRecord>> {
    let filter = PayrollFilter {
        employee_id: Some(employee_id),
        month: None,
        year: None,
        status: Some(PayrollStatus::Paid),
        page,
        per_page,
    };
    store.list(&filter).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::{AttendanceEntry, AttendanceStatus};
    use crate::model::employee_salary::{MaritalStatus, SalaryStructure};
    use crate::store::memory::MemoryStore;
    use chrono::NaiveDate;

    const EMPLOYEE: u64 = 1001;

    fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store.insert_employee(
            EMPLOYEE,
            MaritalStatus::Single,
            Some(SalaryStructure {
                basic_salary: 5_000_000.0,
                transport_allowance: 300_000.0,
                meal_allowance: 200_000.0,
                bpjs_kes_employee: 50_000.0,
                bpjs_tk_jht_employee: 100_000.0,
                bpjs_tk_jp_employee: 50_000.0,
                ..Default::default()
            }),
        );
        for d in [5, 6, 7] {
            store.record_attendance(
                EMPLOYEE,
                AttendanceEntry {
                    date: NaiveDate::from_ymd_opt(2026, 1, d).unwrap(),
                    status: AttendanceStatus::Present,
                    overtime_hours: 0.0,
                },
            );
        }
        store
    }

    #[actix_web::test]
    async fn generate_builds_a_draft_from_facts() {
        let store = seeded();

        let record = generate(&store, &store, EMPLOYEE, 1, 2026).await.unwrap();
        assert!(record.id > 0);
        assert_eq!(record.status, PayrollStatus::Draft);
        assert_eq!(record.working_days, 22);
        assert_eq!(record.present_days, 3);
        assert_eq!(record.gross_salary, 5_500_000.0);
        assert_eq!(record.bpjs_tk_deduction, 150_000.0);
        // 66M - 54M = 12M taxable at 5%
        assert_eq!(record.pph21, 50_000.0);
        assert_eq!(record.net_salary, 5_500_000.0 - 250_000.0);
    }

    #[actix_web::test]
    async fn generating_twice_is_a_conflict() {
        let store = seeded();

        generate(&store, &store, EMPLOYEE, 1, 2026).await.unwrap();
        let err = generate(&store, &store, EMPLOYEE, 1, 2026).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let page = list(&store, &PayrollFilter {
            employee_id: Some(EMPLOYEE),
            month: None,
            year: None,
            status: None,
            page: None,
            per_page: None,
        })
        .await
        .unwrap();
        assert_eq!(page.total, 1);
    }

    #[actix_web::test]
    async fn generate_validates_period_and_inputs() {
        let store = seeded();

        let err = generate(&store, &store, EMPLOYEE, 13, 2026).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = generate(&store, &store, 9, 1, 2026).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref m) if m == "employee not found"));

        store.insert_employee(9, MaritalStatus::Married, None);
        let err = generate(&store, &store, 9, 1, 2026).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[actix_web::test]
    async fn status_lifecycle_and_payslips() {
        let store = seeded();
        let record = generate(&store, &store, EMPLOYEE, 1, 2026).await.unwrap();
        generate(&store, &store, EMPLOYEE, 2, 2026).await.unwrap();

        let err = update_status(&store, record.id, PayrollStatus::Paid)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));
        assert!(payslips(&store, EMPLOYEE, None, None).await.unwrap().items.is_empty());

        update_status(&store, record.id, PayrollStatus::Processed).await.unwrap();
        let paid = update_status(&store, record.id, PayrollStatus::Paid).await.unwrap();
        assert!(paid.paid_at.is_some());

        let slips = payslips(&store, EMPLOYEE, None, None).await.unwrap();
        assert_eq!(slips.total, 1);
        assert_eq!(slips.items[0].id, record.id);
        assert_eq!(get(&store, record.id).await.unwrap(), paid);
    }

    #[actix_web::test]
    async fn only_drafts_can_be_deleted() {
        let store = seeded();
        let january = generate(&store, &store, EMPLOYEE, 1, 2026).await.unwrap();
        let february = generate(&store, &store, EMPLOYEE, 2, 2026).await.unwrap();

        update_status(&store, february.id, PayrollStatus::Processed).await.unwrap();
        let err = delete(&store, february.id).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));

        delete(&store, january.id).await.unwrap();
        let err = get(&store, january.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        // the period is free again
        generate(&store, &store, EMPLOYEE, 1, 2026).await.unwrap();
    }

    #[actix_web::test]
    async fn adjust_persists_recomputed_totals() {
        let store = seeded();
        let record = generate(&store, &store, EMPLOYEE, 1, 2026).await.unwrap();

        let adjusted = adjust(
            &store,
            record.id,
            PayrollAdjustment {
                other_deductions: Some(100_000.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(adjusted.total_deductions, record.total_deductions + 100_000.0);
        assert_eq!(get(&store, record.id).await.unwrap(), adjusted);
    }
}
