//! Turns raw employee facts into the scalar inputs of a payroll record.
use chrono::{Datelike, NaiveDate, Weekday};

use crate::error::{AppError, AppResult};
use crate::model::payroll::PayPeriod;
use crate::payroll::calculator::{calculate_overtime, calculate_pph21_monthly, ptkp};
use crate::store::PayrollFacts;

/// Dependents are not tracked on the employee profile yet.
const DEFAULT_DEPENDENTS: u32 = 0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PayrollInputs {
    pub working_days: u32,
    pub present_days: u32,
    pub basic_salary: f64,
    pub total_allowances: f64,
    pub overtime_pay: f64,
    pub bpjs_kes_deduction: f64,
    pub bpjs_tk_deduction: f64,
    pub pph21: f64,
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

fn first_day(period: PayPeriod) -> AppResult<NaiveDate> {
    NaiveDate::from_ymd_opt(period.year, period.month, 1)
        .ok_or_else(|| AppError::Validation("Invalid period".to_string()))
}

/// Monday to Friday days in the month. Public holidays are not excluded.
pub fn working_days(period: PayPeriod) -> AppResult<u32> {
    let first = first_day(period)?;
    let count = first
        .iter_days()
        .take_while(|d| d.month() == period.month)
        .filter(|d| !is_weekend(*d))
        .count();
    Ok(count as u32)
}

pub fn derive_inputs(facts: &PayrollFacts, period: PayPeriod) -> AppResult<PayrollInputs> {
    let working_days = working_days(period)?;
    let salary = &facts.salary;
    let basic_salary = salary.basic_salary;

    let present = facts
        .attendance
        .iter()
        .filter(|a| a.status.counts_as_present())
        .count() as u32;
    let present_days = present.min(working_days);

    // hours are pooled over the month and priced once at weekday rates
    let overtime_hours: f64 = facts
        .attendance
        .iter()
        .map(|a| a.overtime_hours.max(0.0))
        .sum();
    let overtime_pay = calculate_overtime(basic_salary, overtime_hours, false);

    let total_allowances = salary.total_allowances();
    let annual_gross = (basic_salary + total_allowances + overtime_pay) * 12.0;
    let pph21 = calculate_pph21_monthly(
        annual_gross,
        ptkp(facts.marital_status, DEFAULT_DEPENDENTS),
    );

    Ok(PayrollInputs {
        working_days,
        present_days,
        basic_salary,
        total_allowances,
        overtime_pay,
        bpjs_kes_deduction: salary.bpjs_kes_employee,
        bpjs_tk_deduction: salary.bpjs_tk_employee(),
        pph21,
    })
}
