//! Indonesian statutory payroll rules. Every amount is in rupiah and
//! rounded to the nearest whole rupiah.

use serde::Serialize;
use utoipa::ToSchema;

use crate::model::employee_salary::MaritalStatus;

const BPJS_KES_SALARY_CAP: f64 = 12_000_000.0;
const BPJS_JP_SALARY_CAP: f64 = 10_042_300.0;

/// Monthly hours divisor for the overtime hourly rate.
const OVERTIME_HOUR_DIVISOR: f64 = 173.0;

const PTKP_SINGLE: f64 = 54_000_000.0;
const PTKP_MARRIED: f64 = 58_500_000.0;
const PTKP_PER_DEPENDENT: f64 = 4_500_000.0;
const PTKP_MAX_DEPENDENTS: u32 = 3;

/// (upper bound of annual taxable income, rate)
const PPH21_BRACKETS: &[(f64, f64)] = &[
    (60_000_000.0, 0.05),
    (250_000_000.0, 0.15),
    (500_000_000.0, 0.25),
    (5_000_000_000.0, 0.30),
    (f64::MAX, 0.35),
];

/// Full BPJS contribution split for one basic salary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct BpjsContribution {
    pub kes_employee: f64,
    pub kes_company: f64,
    pub jht_employee: f64,
    pub jht_company: f64,
    pub jkk: f64,
    pub jkm: f64,
    pub jp_employee: f64,
    pub jp_company: f64,
}

pub fn calculate_bpjs(basic_salary: f64) -> BpjsContribution {
    let kes_basis = basic_salary.min(BPJS_KES_SALARY_CAP);
    let jp_basis = basic_salary.min(BPJS_JP_SALARY_CAP);

    BpjsContribution {
        kes_employee: (kes_basis * 0.01).round(),
        kes_company: (kes_basis * 0.04).round(),
        jht_employee: (basic_salary * 0.02).round(),
        jht_company: (basic_salary * 0.037).round(),
        jkk: (basic_salary * 0.0024).round(),
        jkm: (basic_salary * 0.003).round(),
        jp_employee: (jp_basis * 0.01).round(),
        jp_company: (jp_basis * 0.02).round(),
    }
}

/// Non-taxable annual income. Dependents beyond three are ignored.
pub fn ptkp(marital_status: MaritalStatus, dependents: u32) -> f64 {
    let base = match marital_status {
        MaritalStatus::Single => PTKP_SINGLE,
        MaritalStatus::Married => PTKP_MARRIED,
    };
    base + f64::from(dependents.min(PTKP_MAX_DEPENDENTS)) * PTKP_PER_DEPENDENT
}

/// Monthly PPh 21 withholding for an annual gross income, progressive
/// brackets applied to the income above `ptkp`.
pub fn calculate_pph21_monthly(annual_gross: f64, ptkp: f64) -> f64 {
    let taxable = annual_gross - ptkp;
    if taxable <= 0.0 {
        return 0.0;
    }

    let mut annual_tax = 0.0;
    let mut remaining = taxable;
    let mut lower = 0.0;

    for &(upper, rate) in PPH21_BRACKETS {
        if remaining <= 0.0 {
            break;
        }
        let slice = remaining.min(upper - lower);
        annual_tax += slice * rate;
        remaining -= slice;
        lower = upper;
    }

    (annual_tax / 12.0).round()
}

/// Holiday bonus: a full month after a year of service, pro rata before.
pub fn calculate_thr(monthly_salary: f64, months_worked: u32) -> f64 {
    match months_worked {
        0 => 0.0,
        m if m >= 12 => monthly_salary,
        m => (f64::from(m) / 12.0 * monthly_salary).round(),
    }
}

/// Overtime pay for one day (Kepmenakertrans 102/MEN/VI/2004).
///
/// Workday: first hour 1.5x, then 2x. Rest day: hours 1-7 2x, hour 8 3x,
/// beyond 4x. Hourly rate is `monthly_salary / 173`.
pub fn calculate_overtime(monthly_salary: f64, hours: f64, is_holiday: bool) -> f64 {
    if hours <= 0.0 {
        return 0.0;
    }

    let hourly = monthly_salary / OVERTIME_HOUR_DIVISOR;
    let tiers: &[(f64, f64)] = if is_holiday {
        &[(7.0, 2.0), (1.0, 3.0), (f64::INFINITY, 4.0)]
    } else {
        &[(1.0, 1.5), (f64::INFINITY, 2.0)]
    };

    let mut pay = 0.0;
    let mut remaining = hours;
    for &(span, multiplier) in tiers {
        if remaining <= 0.0 {
            break;
        }
        let h = remaining.min(span);
        pay += h * multiplier * hourly;
        remaining -= h;
    }

    pay.round()
}
