use crate::api::employee::{
    CreateEmployee, EmployeeDetailResponse, EmployeeListResponse, EmployeeQuery,
};
use crate::api::leave_request::{CreateLeave, LeaveDecision, LeaveFilter, LeaveListResponse};
use crate::api::trainer::CreateTrainer;
use crate::api::training_program::CreateProgram;
use crate::api::training_session::{
    AddParticipant, CreateFeedback, CreateSession, SessionDetailResponse, UpdateParticipant,
    UpdateSessionStatus,
};
use crate::model::employee::Employee;
use crate::model::leave::{LeaveCategory, LeaveStatus};
use crate::model::leave_request::LeaveRequest;
use crate::model::training::{
    ParticipantStatus, SessionFeedback, SessionParticipant, SessionStatus, Trainer,
    TrainingProgram, TrainingSession,
};
use crate::service::analytics::{Breakdown, BreakdownEntry};
use crate::service::leave_balance::LeaveBalance;
use crate::service::org_chart::OrgChartEntry;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Junior Joy HR Pro API",
        version = "1.0.0",
        description = r#"
## Junior Joy HR Pro

HR administration backend.

### 🔹 Key Features
- **Employee Management**
  - Create, update, list, and view employee profiles
  - Leave balances computed from tenure and gender on every read
- **Leave Management**
  - Submit leave, approve/reject/cancel requests, and view leave history
- **Training**
  - Trainers, training programs, sessions with participants and feedback
- **Analytics**
  - Headcount breakdowns and an inferred organisation chart

### 📦 Response Format
- JSON-based RESTful responses
- Pagination supported for employee and leave lists
"#,
    ),
    paths(
        crate::api::employee::create_employee,
        crate::api::employee::list_employees,
        crate::api::employee::get_employee,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::leave_request::leave_list,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::create_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,
        crate::api::leave_request::cancel_leave,

        crate::api::trainer::create_trainer,
        crate::api::trainer::list_trainers,
        crate::api::trainer::get_trainer,
        crate::api::trainer::update_trainer,
        crate::api::trainer::delete_trainer,

        crate::api::training_program::create_program,
        crate::api::training_program::list_programs,
        crate::api::training_program::get_program,
        crate::api::training_program::update_program,
        crate::api::training_program::delete_program,

        crate::api::training_session::create_session,
        crate::api::training_session::list_sessions,
        crate::api::training_session::get_session,
        crate::api::training_session::update_session_status,
        crate::api::training_session::delete_session,
        crate::api::training_session::add_participant,
        crate::api::training_session::update_participant,
        crate::api::training_session::add_feedback,

        crate::api::analytics::employee_breakdown,
        crate::api::analytics::org_chart
    ),
    components(
        schemas(
            Employee,
            CreateEmployee,
            EmployeeQuery,
            EmployeeListResponse,
            EmployeeDetailResponse,
            LeaveBalance,
            LeaveCategory,
            LeaveStatus,
            LeaveRequest,
            CreateLeave,
            LeaveDecision,
            LeaveFilter,
            LeaveListResponse,
            Trainer,
            CreateTrainer,
            TrainingProgram,
            CreateProgram,
            TrainingSession,
            SessionStatus,
            SessionParticipant,
            ParticipantStatus,
            SessionFeedback,
            CreateSession,
            UpdateSessionStatus,
            AddParticipant,
            UpdateParticipant,
            CreateFeedback,
            SessionDetailResponse,
            Breakdown,
            BreakdownEntry,
            OrgChartEntry
        )
    ),
    tags(
        (name = "Employee", description = "Employee management APIs"),
        (name = "Leave", description = "Leave management APIs"),
        (name = "Training", description = "Trainers, programs and sessions"),
        (name = "Analytics", description = "Headcount breakdowns and org chart"),
    )
)]
pub struct ApiDoc;
