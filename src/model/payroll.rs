use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PayrollStatus {
    Draft,
    Processed,
    Paid,
}

impl PayrollStatus {
    /// The only status this one may move to.
    pub fn next(self) -> Option<Self> {
        match self {
            PayrollStatus::Draft => Some(PayrollStatus::Processed),
            PayrollStatus::Processed => Some(PayrollStatus::Paid),
            PayrollStatus::Paid => None,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct PayPeriod {
    pub month: u32,
    pub year: i32,
}

pub const MIN_PERIOD_YEAR: i32 = 2000;

impl PayPeriod {
    pub fn new(month: u32, year: i32) -> AppResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(AppError::Validation(
                "Month must be between 1 and 12".to_string(),
            ));
        }
        if year < MIN_PERIOD_YEAR {
            return Err(AppError::Validation("Invalid year".to_string()));
        }
        Ok(Self { month, year })
    }
}

/// One employee's pay for one (month, year).
///
/// `gross_salary`, `total_deductions` and `net_salary` are derived; see
/// `payroll::aggregator::recompute`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PayrollRecord {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1001)]
    pub employee_id: u64,
    #[schema(example = 1)]
    pub period_month: u32,
    #[schema(example = 2026)]
    pub period_year: i32,
    #[schema(example = 22)]
    pub working_days: u32,
    #[schema(example = 21)]
    pub present_days: u32,

    #[schema(example = 5000000.0)]
    pub basic_salary: f64,
    #[schema(example = 500000.0)]
    pub total_allowances: f64,
    #[schema(example = 200000.0)]
    pub overtime_pay: f64,
    #[schema(example = 0.0)]
    pub thr: f64,

    #[schema(example = 62500.0)]
    pub bpjs_kes_deduction: f64,
    #[schema(example = 100000.0)]
    pub bpjs_tk_deduction: f64,
    #[schema(example = 150000.0)]
    pub pph21: f64,
    #[schema(example = 0.0)]
    pub other_deductions: f64,

    #[schema(example = 5700000.0)]
    pub gross_salary: f64,
    #[schema(example = 312500.0)]
    pub total_deductions: f64,
    #[schema(example = 5387500.0)]
    pub net_salary: f64,

    pub status: PayrollStatus,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub paid_at: Option<DateTime<Utc>>,
    pub notes: String,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String, format = "date-time")]
    pub updated_at: DateTime<Utc>,
}

impl PayrollRecord {
    pub fn period(&self) -> PayPeriod {
        PayPeriod {
            month: self.period_month,
            year: self.period_year,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_moves_forward_one_step_at_a_time() {
        assert_eq!(PayrollStatus::Draft.next(), Some(PayrollStatus::Processed));
        assert_eq!(PayrollStatus::Processed.next(), Some(PayrollStatus::Paid));
        assert_eq!(PayrollStatus::Paid.next(), None);
    }

    #[test]
    fn period_validation() {
        assert!(PayPeriod::new(1, 2026).is_ok());
        assert!(PayPeriod::new(12, 2000).is_ok());
        assert!(matches!(PayPeriod::new(0, 2026), Err(AppError::Validation(_))));
        assert!(matches!(PayPeriod::new(13, 2026), Err(AppError::Validation(_))));
        assert!(matches!(PayPeriod::new(6, 1999), Err(AppError::Validation(_))));
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&PayrollStatus::Processed).unwrap(),
            "\"processed\""
        );
        assert_eq!("paid".parse::<PayrollStatus>().ok(), Some(PayrollStatus::Paid));
    }
}
