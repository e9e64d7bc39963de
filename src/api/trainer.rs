use crate::{
    error::AppError,
    model::training::Trainer,
    utils::db_utils::{build_update_sql, execute_update},
};
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::MySqlPool;
use tracing::info;
use utoipa::ToSchema;

pub const UPDATABLE_COLUMNS: &[&str] = &["name", "email", "phone", "specialization", "organization"];

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateTrainer {
    #[schema(example = "Ibrahim Waheed")]
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[schema(example = "Occupational safety")]
    pub specialization: Option<String>,
    pub organization: Option<String>,
}

pub async fn insert_trainer(pool: &MySqlPool, payload: &CreateTrainer) -> Result<u64, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::bad_request("name must not be empty"));
    }

    let result = sqlx::query(
        r#"
        INSERT INTO trainers (name, email, phone, specialization, organization)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(payload.name.trim())
    .bind(&payload.email)
    .bind(&payload.phone)
    .bind(&payload.specialization)
    .bind(&payload.organization)
    .execute(pool)
    .await?;

    Ok(result.last_insert_id())
}

#[utoipa::path(
    post,
    path = "/api/trainers",
    request_body = CreateTrainer,
    responses(
        (status = 201, description = "Trainer created", body = Object, example = json!({
            "message": "Trainer created successfully",
            "id": 3
        })),
        (status = 400, description = "Validation failed")
    ),
    tag = "Training"
)]
pub async fn create_trainer(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateTrainer>,
) -> Result<HttpResponse, AppError> {
    let trainer_id = insert_trainer(pool.get_ref(), &payload).await?;
    info!(trainer_id, "Trainer created");

    Ok(HttpResponse::Created().json(json!({
        "message": "Trainer created successfully",
        "id": trainer_id
    })))
}

#[utoipa::path(
    get,
    path = "/api/trainers",
    responses(
        (status = 200, description = "All trainers", body = Vec<Trainer>)
    ),
    tag = "Training"
)]
pub async fn list_trainers(pool: web::Data<MySqlPool>) -> Result<HttpResponse, AppError> {
    let trainers = sqlx::query_as::<_, Trainer>("SELECT * FROM trainers ORDER BY name")
        .fetch_all(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(trainers))
}

#[utoipa::path(
    get,
    path = "/api/trainers/{trainer_id}",
    params(("trainer_id" = u64, Path, description = "Trainer ID")),
    responses(
        (status = 200, description = "Trainer found", body = Trainer),
        (status = 404, description = "Trainer not found")
    ),
    tag = "Training"
)]
pub async fn get_trainer(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let trainer = sqlx::query_as::<_, Trainer>("SELECT * FROM trainers WHERE id = ?")
        .bind(path.into_inner())
        .fetch_optional(pool.get_ref())
        .await?
        .ok_or_else(|| AppError::not_found("Trainer not found"))?;

    Ok(HttpResponse::Ok().json(trainer))
}

#[utoipa::path(
    put,
    path = "/api/trainers/{trainer_id}",
    params(("trainer_id" = u64, Path, description = "Trainer ID")),
    request_body = Object,
    responses(
        (status = 200, description = "Trainer updated"),
        (status = 400, description = "Unknown or invalid field"),
        (status = 404, description = "Trainer not found")
    ),
    tag = "Training"
)]
pub async fn update_trainer(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> Result<HttpResponse, AppError> {
    let trainer_id = path.into_inner();
    let update = build_update_sql("trainers", &body, UPDATABLE_COLUMNS, "id", trainer_id)?;

    if execute_update(pool.get_ref(), update).await? == 0 {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM trainers WHERE id = ?)")
            .bind(trainer_id)
            .fetch_one(pool.get_ref())
            .await?;
        if !exists {
            return Err(AppError::not_found("Trainer not found"));
        }
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Trainer updated successfully"
    })))
}

#[utoipa::path(
    delete,
    path = "/api/trainers/{trainer_id}",
    params(("trainer_id" = u64, Path, description = "Trainer ID")),
    responses(
        (status = 200, description = "Successfully deleted"),
        (status = 404, description = "Trainer not found"),
        (status = 409, description = "Trainer still has sessions")
    ),
    tag = "Training"
)]
pub async fn delete_trainer(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let trainer_id = path.into_inner();

    let in_use = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM training_sessions WHERE trainer_id = ?)",
    )
    .bind(trainer_id)
    .fetch_one(pool.get_ref())
    .await?;

    if in_use {
        return Err(AppError::conflict("Trainer is assigned to training sessions"));
    }

    let result = sqlx::query("DELETE FROM trainers WHERE id = ?")
        .bind(trainer_id)
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Trainer not found"));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Successfully deleted"
    })))
}
