pub mod attendance;
pub mod employee_salary;
pub mod menu;
pub mod menu_access;
pub mod payroll;
pub mod role;
pub mod user;
