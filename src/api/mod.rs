pub mod analytics;
pub mod employee;
pub mod leave_request;
pub mod trainer;
pub mod training_program;
pub mod training_session;
