pub mod analytics;
pub mod leave_balance;
pub mod org_chart;
