use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::gender::Gender;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "employee_number": "JJ-0001",
        "first_name": "Aishath",
        "last_name": "Nashwa",
        "id_number": "A123456",
        "gender": "female",
        "nationality": "Maldivian",
        "designation": "HR Manager",
        "department": "Human Resources",
        "work_site": "Head Office",
        "joined_date": "2019-03-01",
        "salary_local": 18500.0,
        "salary_usd": 1200.0,
        "email": "nashwa@juniorjoy.mv",
        "phone": "+9607771234",
        "address": "M. Flower Villa, Male'",
        "created_at": "2024-01-01T00:00:00Z"
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "JJ-0001")]
    pub employee_number: String,

    pub first_name: String,
    pub last_name: String,

    /// National ID or passport number
    #[schema(nullable = true)]
    pub id_number: Option<String>,

    #[schema(example = "female", nullable = true)]
    pub gender: Option<String>,

    #[schema(nullable = true)]
    pub nationality: Option<String>,

    #[schema(example = "HR Manager", nullable = true)]
    pub designation: Option<String>,

    #[schema(nullable = true)]
    pub department: Option<String>,

    #[schema(nullable = true)]
    pub work_site: Option<String>,

    #[schema(example = "2019-03-01", value_type = String, format = "date")]
    pub joined_date: NaiveDate,

    /// Salary in local currency
    #[schema(nullable = true)]
    pub salary_local: Option<f64>,

    #[schema(nullable = true)]
    pub salary_usd: Option<f64>,

    #[schema(nullable = true)]
    pub email: Option<String>,

    #[schema(nullable = true)]
    pub phone: Option<String>,

    #[schema(nullable = true)]
    pub address: Option<String>,

    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    pub fn gender(&self) -> Option<Gender> {
        Gender::from_record(self.gender.as_deref())
    }
}
