use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Trainer {
    pub id: u64,
    pub name: String,
    #[schema(nullable = true)]
    pub email: Option<String>,
    #[schema(nullable = true)]
    pub phone: Option<String>,
    #[schema(nullable = true)]
    pub specialization: Option<String>,
    #[schema(nullable = true)]
    pub organization: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct TrainingProgram {
    pub id: u64,
    #[schema(example = "First Aid at Work")]
    pub title: String,
    #[schema(nullable = true)]
    pub description: Option<String>,
    #[schema(example = "Safety", nullable = true)]
    pub category: Option<String>,
    #[schema(example = 16.0, nullable = true)]
    pub duration_hours: Option<f64>,
    #[schema(nullable = true)]
    pub provider: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct TrainingSession {
    pub id: u64,
    pub program_id: u64,
    pub trainer_id: u64,
    #[schema(value_type = String, format = "date")]
    pub start_date: NaiveDate,
    #[schema(value_type = String, format = "date")]
    pub end_date: NaiveDate,
    #[schema(nullable = true)]
    pub location: Option<String>,
    #[schema(example = "scheduled")]
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct SessionParticipant {
    pub employee_id: u64,
    pub employee_number: String,
    pub first_name: String,
    pub last_name: String,
    #[schema(example = "registered")]
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct SessionFeedback {
    pub id: u64,
    pub employee_id: u64,
    #[schema(example = 5)]
    pub rating: u8,
    #[schema(nullable = true)]
    pub comment: Option<String>,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SessionStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl SessionStatus {
    /// A scheduled session is closed once, either completed or cancelled.
    pub fn can_transition_to(self, next: SessionStatus) -> bool {
        self == SessionStatus::Scheduled && next != SessionStatus::Scheduled
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ParticipantStatus {
    Registered,
    Attended,
    Completed,
    Absent,
}
