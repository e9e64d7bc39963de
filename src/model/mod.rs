pub mod employee;
pub mod gender;
pub mod leave;
pub mod leave_request;
pub mod training;
