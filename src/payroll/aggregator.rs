use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};
use crate::model::payroll::{PayPeriod, PayrollRecord, PayrollStatus};
use crate::payroll::calculator::calculate_thr;
use crate::payroll::inputs::PayrollInputs;

/// Re-derives gross, total deductions and net from the component fields.
///
/// Exact sums, no rounding, no clamping: a net below zero is kept as is.
pub fn recompute(mut record: PayrollRecord) -> PayrollRecord {
    record.gross_salary =
        record.basic_salary + record.total_allowances + record.overtime_pay + record.thr;
    record.total_deductions = record.bpjs_kes_deduction
        + record.bpjs_tk_deduction
        + record.pph21
        + record.other_deductions;
    record.net_salary = record.gross_salary - record.total_deductions;
    record
}

/// A fresh draft for `employee_id`; the id is assigned by the store.
pub fn draft(
    employee_id: u64,
    period: PayPeriod,
    inputs: &PayrollInputs,
    now: DateTime<Utc>,
) -> PayrollRecord {
    recompute(PayrollRecord {
        id: 0,
        employee_id,
        period_month: period.month,
        period_year: period.year,
        working_days: inputs.working_days,
        present_days: inputs.present_days,
        basic_salary: inputs.basic_salary,
        total_allowances: inputs.total_allowances,
        overtime_pay: inputs.overtime_pay,
        thr: 0.0,
        bpjs_kes_deduction: inputs.bpjs_kes_deduction,
        bpjs_tk_deduction: inputs.bpjs_tk_deduction,
        pph21: inputs.pph21,
        other_deductions: 0.0,
        gross_salary: 0.0,
        total_deductions: 0.0,
        net_salary: 0.0,
        status: PayrollStatus::Draft,
        paid_at: None,
        notes: String::new(),
        created_at: now,
        updated_at: now,
    })
}

/// Moves the record one step forward. `paid_at` is stamped on `Paid`.
pub fn transition_status(
    mut record: PayrollRecord,
    target: PayrollStatus,
    now: DateTime<Utc>,
) -> AppResult<PayrollRecord> {
    if record.status.next() != Some(target) {
        let msg = match record.status {
            PayrollStatus::Draft => "draft payroll can only be moved to processed",
            PayrollStatus::Processed => "processed payroll can only be moved to paid",
            PayrollStatus::Paid => "paid payroll status cannot be changed",
        };
        return Err(AppError::InvalidTransition(msg.to_string()));
    }

    record.status = target;
    if target == PayrollStatus::Paid {
        record.paid_at = Some(now);
    }
    record.updated_at = now;
    Ok(record)
}

/// Manual corrections an administrator may make before a record is paid.
/// Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PayrollAdjustment {
    #[schema(example = 250000.0)]
    pub overtime_pay: Option<f64>,
    #[schema(example = 5000000.0)]
    pub thr: Option<f64>,
    /// Prorates THR from basic salary plus allowances when `thr` is absent.
    #[schema(example = 12)]
    pub thr_months_of_service: Option<u32>,
    #[schema(example = 0.0)]
    pub other_deductions: Option<f64>,
    #[schema(example = "THR Idul Fitri")]
    pub notes: Option<String>,
}

/// Width of the `notes` column.
pub const MAX_NOTES_LEN: usize = 500;

fn non_negative(field: &str, value: Option<f64>) -> AppResult<Option<f64>> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(AppError::Validation(format!(
            "{field} must be a non-negative amount"
        ))),
        other => Ok(other),
    }
}

pub fn adjust(
    mut record: PayrollRecord,
    adjustment: PayrollAdjustment,
    now: DateTime<Utc>,
) -> AppResult<PayrollRecord> {
    if record.status == PayrollStatus::Paid {
        return Err(AppError::InvalidTransition(
            "cannot update paid payroll".to_string(),
        ));
    }

    if let Some(v) = non_negative("overtime_pay", adjustment.overtime_pay)? {
        record.overtime_pay = v;
    }
    match (non_negative("thr", adjustment.thr)?, adjustment.thr_months_of_service) {
        (Some(v), _) => record.thr = v,
        (None, Some(months)) => {
            record.thr = calculate_thr(record.basic_salary + record.total_allowances, months)
        }
        (None, None) => {}
    }
    if let Some(v) = non_negative("other_deductions", adjustment.other_deductions)? {
        record.other_deductions = v;
    }
    if let Some(notes) = adjustment.notes {
        if notes.chars().count() > MAX_NOTES_LEN {
            return Err(AppError::Validation(format!(
                "notes must be at most {MAX_NOTES_LEN} characters"
            )));
        }
        record.notes = notes;
    }
    record.updated_at = now;

    Ok(recompute(record))
}
