use crate::{
    api::employee::{add_used_days, fetch_employee},
    error::AppError,
    model::{
        leave::{LeaveCategory, LeaveStatus},
        leave_request::LeaveRequest,
    },
    utils::db_utils::Page,
};
use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::{MySqlPool, types::Json};
use tracing::{info, warn};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLeave {
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = "annual")]
    pub leave_type: LeaveCategory,
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-07", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    /// Defaults to the number of calendar days in the range
    #[schema(example = 3)]
    pub day_count: Option<i32>,
    pub reason: Option<String>,
    #[serde(default)]
    pub documents: Vec<String>,
}

impl CreateLeave {
    /// Validated day count for the request.
    pub fn resolve_day_count(&self) -> Result<i32, AppError> {
        if self.start_date > self.end_date {
            return Err(AppError::bad_request("start_date cannot be after end_date"));
        }

        let span = (self.end_date - self.start_date).num_days() as i32 + 1;

        match self.day_count {
            None => Ok(span),
            Some(days) if (1..=span).contains(&days) => Ok(days),
            Some(_) => Err(AppError::bad_request(format!(
                "day_count must be between 1 and {}",
                span
            ))),
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct LeaveDecision {
    #[schema(example = "Fathimath Rasheed")]
    pub approver: Option<String>,
    pub comments: Option<String>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LeaveFilter {
    /// Filter by employee ID
    #[schema(example = 123)]
    pub employee_id: Option<u64>,
    /// Filter by leave status
    #[schema(example = "pending")]
    pub status: Option<LeaveStatus>,
    /// Pagination page number (start with 1)
    #[schema(example = 1)]
    pub page: Option<u64>,
    /// Pagination per page number
    #[schema(example = 10)]
    pub per_page: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct LeaveListResponse {
    pub data: Vec<LeaveRequest>,
    #[schema(example = 1)]
    pub page: u64,
    #[schema(example = 10)]
    pub per_page: u64,
    #[schema(example = 1)]
    pub total: i64,
}

// Helper enum for typed SQLx binding
enum FilterValue<'a> {
    U64(u64),
    Str(&'a str),
}

/* =========================
Create leave request
========================= */
#[utoipa::path(
    post,
    path = "/api/leave",
    request_body(
        content = CreateLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Leave request submitted successfully",
         body = Object,
         example = json!({
            "message": "Leave request submitted",
            "id": 1,
            "status": "pending"
         })
        ),
        (status = 400, description = "Bad request"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Leave"
)]
pub async fn create_leave(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateLeave>,
) -> Result<HttpResponse, AppError> {
    // 1️⃣ validate dates and day count
    let day_count = payload.resolve_day_count()?;

    // 2️⃣ employee must exist
    fetch_employee(pool.get_ref(), payload.employee_id).await?;

    // 3️⃣ insert request
    let result = sqlx::query(
        r#"
        INSERT INTO leave_requests
            (employee_id, leave_type, start_date, end_date, day_count, status, reason, documents)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(payload.employee_id)
    .bind(payload.leave_type.as_ref())
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(day_count)
    .bind(LeaveStatus::Pending.as_ref())
    .bind(&payload.reason)
    .bind(Json(&payload.documents))
    .execute(pool.get_ref())
    .await?;

    let leave_id = result.last_insert_id();
    info!(leave_id, employee_id = payload.employee_id, day_count, "Leave request created");

    Ok(HttpResponse::Created().json(json!({
        "message": "Leave request submitted",
        "id": leave_id,
        "status": LeaveStatus::Pending
    })))
}

/// Moves a pending request to `next`. Returns false when the request does not
/// exist or has already left `pending`.
async fn transition_leave(
    pool: &MySqlPool,
    leave_id: u64,
    next: LeaveStatus,
    decision: &LeaveDecision,
) -> Result<bool, sqlx::Error> {
    debug_assert!(LeaveStatus::Pending.can_transition_to(next));

    let mut tx = pool.begin().await?;

    let updated = sqlx::query(
        r#"
        UPDATE leave_requests
        SET status = ?, approver = ?, comments = COALESCE(?, comments)
        WHERE id = ?
        AND status = ?
        "#,
    )
    .bind(next.as_ref())
    .bind(&decision.approver)
    .bind(&decision.comments)
    .bind(leave_id)
    .bind(LeaveStatus::Pending.as_ref())
    .execute(&mut *tx)
    .await?;

    if updated.rows_affected() == 0 {
        tx.rollback().await?;
        return Ok(false);
    }

    let (employee_id, leave_type, day_count) = sqlx::query_as::<_, (u64, String, i32)>(
        "SELECT employee_id, leave_type, day_count FROM leave_requests WHERE id = ?",
    )
    .bind(leave_id)
    .fetch_one(&mut *tx)
    .await?;

    let delta = next.used_days_delta(day_count);
    if delta != 0 {
        let category = leave_type.parse::<LeaveCategory>().map_err(|_| {
            sqlx::Error::Decode(format!("unknown leave category '{}'", leave_type).into())
        })?;
        add_used_days(&mut *tx, employee_id, category, delta).await?;

        info!(leave_id, employee_id, leave_type = %category, day_count = delta, "Leave usage recorded");
    }

    tx.commit().await?;
    Ok(true)
}

async fn decide(
    pool: &MySqlPool,
    leave_id: u64,
    next: LeaveStatus,
    decision: &LeaveDecision,
) -> Result<HttpResponse, AppError> {
    if !transition_leave(pool, leave_id, next, decision).await? {
        warn!(leave_id, next = %next, "Leave transition refused");
        return Err(AppError::bad_request(
            "Leave request not found or already processed",
        ));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": format!("Leave {}", next),
        "status": next
    })))
}

/* =========================
Approve leave
========================= */
#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/approve",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to approve")
    ),
    request_body(content = LeaveDecision, content_type = "application/json"),
    responses(
        (status = 200, description = "Leave approved successfully", body = Object, example = json!({
            "message": "Leave approved",
            "status": "approved"
        })),
        (status = 400, description = "Leave request not found or already processed", body = Object, example = json!({
            "message": "Leave request not found or already processed"
        }))
    ),
    tag = "Leave"
)]
pub async fn approve_leave(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: Option<web::Json<LeaveDecision>>,
) -> Result<HttpResponse, AppError> {
    let decision = body.map(web::Json::into_inner).unwrap_or_default();
    decide(pool.get_ref(), path.into_inner(), LeaveStatus::Approved, &decision).await
}

/* =========================
Reject leave
========================= */
#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/reject",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to reject")
    ),
    request_body(content = LeaveDecision, content_type = "application/json"),
    responses(
        (status = 200, description = "Leave rejected successfully", body = Object, example = json!({
            "message": "Leave rejected",
            "status": "rejected"
        })),
        (status = 400, description = "Leave request not found or already processed")
    ),
    tag = "Leave"
)]
pub async fn reject_leave(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: Option<web::Json<LeaveDecision>>,
) -> Result<HttpResponse, AppError> {
    let decision = body.map(web::Json::into_inner).unwrap_or_default();
    decide(pool.get_ref(), path.into_inner(), LeaveStatus::Rejected, &decision).await
}

/* =========================
Cancel leave
========================= */
#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/cancel",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to cancel")
    ),
    responses(
        (status = 200, description = "Leave cancelled", body = Object, example = json!({
            "message": "Leave cancelled",
            "status": "cancelled"
        })),
        (status = 400, description = "Leave request not found or already processed")
    ),
    tag = "Leave"
)]
pub async fn cancel_leave(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    decide(
        pool.get_ref(),
        path.into_inner(),
        LeaveStatus::Cancelled,
        &LeaveDecision::default(),
    )
    .await
}

#[utoipa::path(
    get,
    path = "/api/leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveRequest),
        (status = 404, description = "Leave request not found", body = Object, example = json!({
            "message": "Leave request not found"
        }))
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let leave_id = path.into_inner();

    let leave = sqlx::query_as::<_, LeaveRequest>("SELECT * FROM leave_requests WHERE id = ?")
        .bind(leave_id)
        .fetch_optional(pool.get_ref())
        .await?
        .ok_or_else(|| AppError::not_found("Leave request not found"))?;

    Ok(HttpResponse::Ok().json(leave))
}

#[utoipa::path(
    get,
    path = "/api/leave",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Paginated leave list", body = LeaveListResponse)
    ),
    tag = "Leave"
)]
pub async fn leave_list(
    pool: web::Data<MySqlPool>,
    query: web::Query<LeaveFilter>,
) -> Result<HttpResponse, AppError> {
    // -------------------------
    // Pagination
    // -------------------------
    let Page {
        page,
        per_page,
        offset,
    } = Page::new(query.page, query.per_page, 10);

    // -------------------------
    // WHERE clause
    // -------------------------
    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(emp_id) = query.employee_id {
        where_sql.push_str(" AND employee_id = ?");
        args.push(FilterValue::U64(emp_id));
    }

    if let Some(status) = query.status {
        where_sql.push_str(" AND status = ?");
        args.push(FilterValue::Str(status.into()));
    }

    // -------------------------
    // COUNT query
    // -------------------------
    let count_sql = format!("SELECT COUNT(*) FROM leave_requests{}", where_sql);

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Str(s) => count_q.bind(*s),
        };
    }
    let total = count_q.fetch_one(pool.get_ref()).await?;

    // -------------------------
    // DATA query
    // -------------------------
    let data_sql = format!(
        r#"
        SELECT * FROM leave_requests
        {}
        ORDER BY created_at DESC, id DESC
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, LeaveRequest>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::Str(s) => data_q.bind(s),
        };
    }

    let leaves = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(LeaveListResponse {
        data: leaves,
        page,
        per_page,
        total,
    }))
}
