pub mod menu_access;
pub mod payroll;
