use crate::{
    error::{AppError, is_duplicate_key, is_missing_reference},
    model::training::{
        ParticipantStatus, SessionFeedback, SessionParticipant, SessionStatus, TrainingSession,
    },
};
use std::collections::BTreeSet;
use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::info;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSession {
    #[schema(example = 1)]
    pub program_id: u64,
    #[schema(example = 2)]
    pub trainer_id: u64,
    #[schema(example = "2026-02-10", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-02-11", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    pub location: Option<String>,
    /// Employees registered on creation
    #[serde(default)]
    pub participants: Vec<u64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSessionStatus {
    #[schema(example = "completed")]
    pub status: SessionStatus,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddParticipant {
    #[schema(example = 1000)]
    pub employee_id: u64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateParticipant {
    #[schema(example = "attended")]
    pub status: ParticipantStatus,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateFeedback {
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = 4)]
    pub rating: u8,
    pub comment: Option<String>,
}

impl CreateSession {
    /// Requested participants, each employee once.
    pub fn participant_ids(&self) -> Vec<u64> {
        self.participants
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

impl CreateFeedback {
    pub fn validate(&self) -> Result<(), AppError> {
        if !(1..=5).contains(&self.rating) {
            return Err(AppError::bad_request("rating must be between 1 and 5"));
        }
        Ok(())
    }
}

#[derive(Serialize, ToSchema)]
pub struct SessionDetailResponse {
    #[serde(flatten)]
    pub session: TrainingSession,
    #[schema(example = "First Aid at Work")]
    pub program_title: String,
    #[schema(example = "Ibrahim Waheed")]
    pub trainer_name: String,
    pub participants: Vec<SessionParticipant>,
    pub feedback: Vec<SessionFeedback>,
}

async fn session_exists(pool: &MySqlPool, session_id: u64) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM training_sessions WHERE id = ?)")
        .bind(session_id)
        .fetch_one(pool)
        .await
}

async fn is_participant(
    pool: &MySqlPool,
    session_id: u64,
    employee_id: u64,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM training_session_participants
            WHERE session_id = ? AND employee_id = ?
        )
        "#,
    )
    .bind(session_id)
    .bind(employee_id)
    .fetch_one(pool)
    .await
}

#[utoipa::path(
    post,
    path = "/api/training-sessions",
    request_body = CreateSession,
    responses(
        (status = 201, description = "Session created", body = Object, example = json!({
            "message": "Training session created successfully",
            "id": 9
        })),
        (status = 400, description = "Invalid dates or unknown program/trainer/employee")
    ),
    tag = "Training"
)]
pub async fn create_session(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateSession>,
) -> Result<HttpResponse, AppError> {
    if payload.start_date > payload.end_date {
        return Err(AppError::bad_request("start_date cannot be after end_date"));
    }

    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        r#"
        INSERT INTO training_sessions (program_id, trainer_id, start_date, end_date, location, status)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(payload.program_id)
    .bind(payload.trainer_id)
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(&payload.location)
    .bind(SessionStatus::Scheduled.as_ref())
    .execute(&mut *tx)
    .await
    .map_err(foreign_key_error)?;

    let session_id = result.last_insert_id();

    let participants = payload.participant_ids();
    for employee_id in &participants {
        sqlx::query(
            "INSERT INTO training_session_participants (session_id, employee_id, status) VALUES (?, ?, ?)",
        )
        .bind(session_id)
        .bind(employee_id)
        .bind(ParticipantStatus::Registered.as_ref())
        .execute(&mut *tx)
        .await
        .map_err(foreign_key_error)?;
    }

    tx.commit().await?;

    info!(session_id, participants = participants.len(), "Training session created");

    Ok(HttpResponse::Created().json(json!({
        "message": "Training session created successfully",
        "id": session_id
    })))
}

fn foreign_key_error(e: sqlx::Error) -> AppError {
    if is_missing_reference(&e) {
        AppError::bad_request("Referenced program, trainer or employee does not exist")
    } else {
        AppError::from(e)
    }
}

#[utoipa::path(
    get,
    path = "/api/training-sessions",
    responses(
        (status = 200, description = "All training sessions, newest first", body = Vec<TrainingSession>)
    ),
    tag = "Training"
)]
pub async fn list_sessions(pool: web::Data<MySqlPool>) -> Result<HttpResponse, AppError> {
    let sessions = sqlx::query_as::<_, TrainingSession>(
        "SELECT * FROM training_sessions ORDER BY start_date DESC, id DESC",
    )
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(sessions))
}

#[utoipa::path(
    get,
    path = "/api/training-sessions/{session_id}",
    params(("session_id" = u64, Path, description = "Training session ID")),
    responses(
        (status = 200, description = "Session with participants and feedback", body = SessionDetailResponse),
        (status = 404, description = "Session not found")
    ),
    tag = "Training"
)]
pub async fn get_session(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let session_id = path.into_inner();

    let session =
        sqlx::query_as::<_, TrainingSession>("SELECT * FROM training_sessions WHERE id = ?")
            .bind(session_id)
            .fetch_optional(pool.get_ref())
            .await?
            .ok_or_else(|| AppError::not_found("Training session not found"))?;

    let (program_title, trainer_name) = sqlx::query_as::<_, (String, String)>(
        r#"
        SELECT p.title, t.name
        FROM training_programs p, trainers t
        WHERE p.id = ? AND t.id = ?
        "#,
    )
    .bind(session.program_id)
    .bind(session.trainer_id)
    .fetch_one(pool.get_ref())
    .await?;

    let participants = sqlx::query_as::<_, SessionParticipant>(
        r#"
        SELECT e.id AS employee_id, e.employee_number, e.first_name, e.last_name, sp.status
        FROM training_session_participants sp
        JOIN employees e ON e.id = sp.employee_id
        WHERE sp.session_id = ?
        ORDER BY e.first_name, e.last_name
        "#,
    )
    .bind(session_id)
    .fetch_all(pool.get_ref())
    .await?;

    let feedback = sqlx::query_as::<_, SessionFeedback>(
        r#"
        SELECT id, employee_id, rating, comment, created_at
        FROM training_session_feedback
        WHERE session_id = ?
        ORDER BY created_at DESC
        "#,
    )
    .bind(session_id)
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(SessionDetailResponse {
        session,
        program_title,
        trainer_name,
        participants,
        feedback,
    }))
}

#[utoipa::path(
    put,
    path = "/api/training-sessions/{session_id}",
    params(("session_id" = u64, Path, description = "Training session ID")),
    request_body = UpdateSessionStatus,
    responses(
        (status = 200, description = "Session status updated", body = Object, example = json!({
            "message": "Training session completed",
            "status": "completed"
        })),
        (status = 400, description = "Session is already completed or cancelled"),
        (status = 404, description = "Session not found")
    ),
    tag = "Training"
)]
pub async fn update_session_status(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<UpdateSessionStatus>,
) -> Result<HttpResponse, AppError> {
    let session_id = path.into_inner();
    let next = payload.status;

    if !SessionStatus::Scheduled.can_transition_to(next) {
        return Err(AppError::bad_request("status must be completed or cancelled"));
    }

    let result = sqlx::query("UPDATE training_sessions SET status = ? WHERE id = ? AND status = ?")
        .bind(next.as_ref())
        .bind(session_id)
        .bind(SessionStatus::Scheduled.as_ref())
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        if !session_exists(pool.get_ref(), session_id).await? {
            return Err(AppError::not_found("Training session not found"));
        }
        return Err(AppError::bad_request(
            "Training session is already completed or cancelled",
        ));
    }

    info!(session_id, status = %next, "Training session closed");

    Ok(HttpResponse::Ok().json(json!({
        "message": format!("Training session {}", next),
        "status": next
    })))
}

#[utoipa::path(
    delete,
    path = "/api/training-sessions/{session_id}",
    params(("session_id" = u64, Path, description = "Training session ID")),
    responses(
        (status = 200, description = "Successfully deleted"),
        (status = 404, description = "Session not found")
    ),
    tag = "Training"
)]
pub async fn delete_session(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let result = sqlx::query("DELETE FROM training_sessions WHERE id = ?")
        .bind(path.into_inner())
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Training session not found"));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Successfully deleted"
    })))
}

#[utoipa::path(
    post,
    path = "/api/training-sessions/{session_id}/participants",
    params(("session_id" = u64, Path, description = "Training session ID")),
    request_body = AddParticipant,
    responses(
        (status = 201, description = "Participant registered"),
        (status = 400, description = "Employee does not exist"),
        (status = 404, description = "Session not found"),
        (status = 409, description = "Employee already registered")
    ),
    tag = "Training"
)]
pub async fn add_participant(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<AddParticipant>,
) -> Result<HttpResponse, AppError> {
    let session_id = path.into_inner();

    if !session_exists(pool.get_ref(), session_id).await? {
        return Err(AppError::not_found("Training session not found"));
    }

    sqlx::query(
        "INSERT INTO training_session_participants (session_id, employee_id, status) VALUES (?, ?, ?)",
    )
    .bind(session_id)
    .bind(payload.employee_id)
    .bind(ParticipantStatus::Registered.as_ref())
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        if is_duplicate_key(&e) {
            AppError::conflict("Employee is already registered")
        } else if is_missing_reference(&e) {
            AppError::bad_request("Employee does not exist")
        } else {
            AppError::from(e)
        }
    })?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Participant registered",
        "status": ParticipantStatus::Registered
    })))
}

#[utoipa::path(
    put,
    path = "/api/training-sessions/{session_id}/participants/{employee_id}",
    params(
        ("session_id" = u64, Path, description = "Training session ID"),
        ("employee_id" = u64, Path, description = "Participant employee ID")
    ),
    request_body = UpdateParticipant,
    responses(
        (status = 200, description = "Participant status updated"),
        (status = 404, description = "Participant not found")
    ),
    tag = "Training"
)]
pub async fn update_participant(
    pool: web::Data<MySqlPool>,
    path: web::Path<(u64, u64)>,
    payload: web::Json<UpdateParticipant>,
) -> Result<HttpResponse, AppError> {
    let (session_id, employee_id) = path.into_inner();

    if !is_participant(pool.get_ref(), session_id, employee_id).await? {
        return Err(AppError::not_found("Participant not found"));
    }

    sqlx::query(
        "UPDATE training_session_participants SET status = ? WHERE session_id = ? AND employee_id = ?",
    )
    .bind(payload.status.as_ref())
    .bind(session_id)
    .bind(employee_id)
    .execute(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Participant status updated",
        "status": payload.status
    })))
}

#[utoipa::path(
    post,
    path = "/api/training-sessions/{session_id}/feedback",
    params(("session_id" = u64, Path, description = "Training session ID")),
    request_body = CreateFeedback,
    responses(
        (status = 201, description = "Feedback recorded"),
        (status = 400, description = "Rating out of range or employee not a participant"),
        (status = 404, description = "Session not found")
    ),
    tag = "Training"
)]
pub async fn add_feedback(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<CreateFeedback>,
) -> Result<HttpResponse, AppError> {
    let session_id = path.into_inner();
    payload.validate()?;

    if !session_exists(pool.get_ref(), session_id).await? {
        return Err(AppError::not_found("Training session not found"));
    }
    if !is_participant(pool.get_ref(), session_id, payload.employee_id).await? {
        return Err(AppError::bad_request(
            "Only session participants can leave feedback",
        ));
    }

    let result = sqlx::query(
        r#"
        INSERT INTO training_session_feedback (session_id, employee_id, rating, comment)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(session_id)
    .bind(payload.employee_id)
    .bind(payload.rating)
    .bind(&payload.comment)
    .execute(pool.get_ref())
    .await?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Feedback recorded",
        "id": result.last_insert_id()
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_must_be_one_to_five() {
        for (rating, ok) in [(0, false), (1, true), (5, true), (6, false)] {
            let feedback = CreateFeedback {
                employee_id: 1,
                rating,
                comment: None,
            };
            assert_eq!(feedback.validate().is_ok(), ok, "rating {}", rating);
        }
    }

    #[test]
    fn test_participants_default_to_empty() {
        let session: CreateSession = serde_json::from_value(json!({
            "program_id": 1,
            "trainer_id": 1,
            "start_date": "2026-02-10",
            "end_date": "2026-02-10"
        }))
        .unwrap();
        assert!(session.participants.is_empty());
    }

    #[test]
    fn test_repeated_participants_are_registered_once() {
        let session: CreateSession = serde_json::from_value(json!({
            "program_id": 1,
            "trainer_id": 1,
            "start_date": "2026-02-10",
            "end_date": "2026-02-11",
            "participants": [12, 3, 12, 7, 3]
        }))
        .unwrap();

        assert_eq!(session.participant_ids(), vec![3, 7, 12]);
    }
}
