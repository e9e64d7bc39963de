use crate::{
    error::AppError,
    model::training::TrainingProgram,
    utils::db_utils::{build_update_sql, execute_update},
};
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::MySqlPool;
use tracing::info;
use utoipa::ToSchema;

pub const UPDATABLE_COLUMNS: &[&str] =
    &["title", "description", "category", "duration_hours", "provider"];

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateProgram {
    #[schema(example = "First Aid at Work")]
    pub title: String,
    pub description: Option<String>,
    #[schema(example = "Safety")]
    pub category: Option<String>,
    #[schema(example = 16.0)]
    pub duration_hours: Option<f64>,
    pub provider: Option<String>,
}

pub async fn insert_program(pool: &MySqlPool, payload: &CreateProgram) -> Result<u64, AppError> {
    if payload.title.trim().is_empty() {
        return Err(AppError::bad_request("title must not be empty"));
    }
    if payload.duration_hours.is_some_and(|h| h <= 0.0) {
        return Err(AppError::bad_request("duration_hours must be positive"));
    }

    let result = sqlx::query(
        r#"
        INSERT INTO training_programs (title, description, category, duration_hours, provider)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(payload.title.trim())
    .bind(&payload.description)
    .bind(&payload.category)
    .bind(payload.duration_hours)
    .bind(&payload.provider)
    .execute(pool)
    .await?;

    Ok(result.last_insert_id())
}

#[utoipa::path(
    post,
    path = "/api/training-programs",
    request_body = CreateProgram,
    responses(
        (status = 201, description = "Program created", body = Object, example = json!({
            "message": "Training program created successfully",
            "id": 5
        })),
        (status = 400, description = "Validation failed")
    ),
    tag = "Training"
)]
pub async fn create_program(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateProgram>,
) -> Result<HttpResponse, AppError> {
    let program_id = insert_program(pool.get_ref(), &payload).await?;
    info!(program_id, "Training program created");

    Ok(HttpResponse::Created().json(json!({
        "message": "Training program created successfully",
        "id": program_id
    })))
}

#[utoipa::path(
    get,
    path = "/api/training-programs",
    responses(
        (status = 200, description = "All training programs", body = Vec<TrainingProgram>)
    ),
    tag = "Training"
)]
pub async fn list_programs(pool: web::Data<MySqlPool>) -> Result<HttpResponse, AppError> {
    let programs =
        sqlx::query_as::<_, TrainingProgram>("SELECT * FROM training_programs ORDER BY title")
            .fetch_all(pool.get_ref())
            .await?;

    Ok(HttpResponse::Ok().json(programs))
}

#[utoipa::path(
    get,
    path = "/api/training-programs/{program_id}",
    params(("program_id" = u64, Path, description = "Training program ID")),
    responses(
        (status = 200, description = "Program found", body = TrainingProgram),
        (status = 404, description = "Program not found")
    ),
    tag = "Training"
)]
pub async fn get_program(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let program =
        sqlx::query_as::<_, TrainingProgram>("SELECT * FROM training_programs WHERE id = ?")
            .bind(path.into_inner())
            .fetch_optional(pool.get_ref())
            .await?
            .ok_or_else(|| AppError::not_found("Training program not found"))?;

    Ok(HttpResponse::Ok().json(program))
}

#[utoipa::path(
    put,
    path = "/api/training-programs/{program_id}",
    params(("program_id" = u64, Path, description = "Training program ID")),
    request_body = Object,
    responses(
        (status = 200, description = "Program updated"),
        (status = 400, description = "Unknown or invalid field"),
        (status = 404, description = "Program not found")
    ),
    tag = "Training"
)]
pub async fn update_program(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> Result<HttpResponse, AppError> {
    let program_id = path.into_inner();
    let update = build_update_sql(
        "training_programs",
        &body,
        UPDATABLE_COLUMNS,
        "id",
        program_id,
    )?;

    if execute_update(pool.get_ref(), update).await? == 0 {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM training_programs WHERE id = ?)",
        )
        .bind(program_id)
        .fetch_one(pool.get_ref())
        .await?;
        if !exists {
            return Err(AppError::not_found("Training program not found"));
        }
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Training program updated successfully"
    })))
}

#[utoipa::path(
    delete,
    path = "/api/training-programs/{program_id}",
    params(("program_id" = u64, Path, description = "Training program ID")),
    responses(
        (status = 200, description = "Successfully deleted"),
        (status = 404, description = "Program not found"),
        (status = 409, description = "Program still has sessions")
    ),
    tag = "Training"
)]
pub async fn delete_program(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let program_id = path.into_inner();

    let in_use = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM training_sessions WHERE program_id = ?)",
    )
    .bind(program_id)
    .fetch_one(pool.get_ref())
    .await?;

    if in_use {
        return Err(AppError::conflict("Training program has scheduled sessions"));
    }

    let result = sqlx::query("DELETE FROM training_programs WHERE id = ?")
        .bind(program_id)
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Training program not found"));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Successfully deleted"
    })))
}
