use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct LeaveRequest {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1000)]
    pub employee_id: u64,

    #[schema(example = "annual")]
    pub leave_type: String,

    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub start_date: NaiveDate,

    #[schema(example = "2026-01-07", value_type = String, format = "date")]
    pub end_date: NaiveDate,

    #[schema(example = 3)]
    pub day_count: i32,

    #[schema(example = "pending")]
    pub status: String,

    #[schema(nullable = true)]
    pub approver: Option<String>,

    #[schema(nullable = true)]
    pub reason: Option<String>,

    #[schema(nullable = true)]
    pub comments: Option<String>,

    /// References to supporting documents (medical certificates etc.)
    #[schema(value_type = Vec<String>)]
    pub documents: Json<Vec<String>>,

    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}
