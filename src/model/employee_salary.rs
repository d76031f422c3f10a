use serde::{Deserialize, Serialize};

/// Latest effective salary of an employee, employee-side BPJS portions
/// included. Company portions never reach the payslip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SalaryStructure {
    pub basic_salary: f64,
    pub transport_allowance: f64,
    pub meal_allowance: f64,
    pub housing_allowance: f64,
    pub position_allowance: f64,
    pub bpjs_kes_employee: f64,
    pub bpjs_tk_jht_employee: f64,
    pub bpjs_tk_jp_employee: f64,
}

impl SalaryStructure {
    pub fn total_allowances(&self) -> f64 {
        self.transport_allowance
            + self.meal_allowance
            + self.housing_allowance
            + self.position_allowance
    }

    /// JHT + JP employee portions.
    pub fn bpjs_tk_employee(&self) -> f64 {
        self.bpjs_tk_jht_employee + self.bpjs_tk_jp_employee
    }
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum MaritalStatus {
    #[default]
    Single,
    Married,
}

impl MaritalStatus {
    /// `employees.marital_status` holds free text; only "kawin" means married.
    pub fn from_db(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("kawin") => MaritalStatus::Married,
            _ => MaritalStatus::Single,
        }
    }
}
