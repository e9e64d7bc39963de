use crate::{
    error::AppError,
    model::employee::Employee,
    service::{
        analytics::{BreakdownField, breakdown},
        org_chart::build_org_chart,
    },
};
use actix_web::{HttpResponse, web};
use sqlx::MySqlPool;
use tracing::debug;

async fn all_employees(pool: &MySqlPool) -> Result<Vec<Employee>, sqlx::Error> {
    sqlx::query_as::<_, Employee>("SELECT * FROM employees ORDER BY id")
        .fetch_all(pool)
        .await
}

#[utoipa::path(
    get,
    path = "/api/analytics/employees/{field}",
    params(
        ("field" = String, Path, description = "One of department, designation, nationality, gender, work_site")
    ),
    responses(
        (status = 200, description = "Headcount breakdown", body = Breakdown),
        (status = 400, description = "Unknown field")
    ),
    tag = "Analytics"
)]
pub async fn employee_breakdown(
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let field = path
        .parse::<BreakdownField>()
        .map_err(|_| AppError::bad_request(format!("Cannot group employees by '{}'", path)))?;

    let employees = all_employees(pool.get_ref()).await?;
    debug!(field = %field, employees = employees.len(), "Computing breakdown");

    Ok(HttpResponse::Ok().json(breakdown(&employees, field)))
}

#[utoipa::path(
    get,
    path = "/api/org-chart",
    responses(
        (status = 200, description = "Inferred reporting lines", body = Vec<OrgChartEntry>)
    ),
    tag = "Analytics"
)]
pub async fn org_chart(pool: web::Data<MySqlPool>) -> Result<HttpResponse, AppError> {
    let employees = all_employees(pool.get_ref()).await?;
    Ok(HttpResponse::Ok().json(build_org_chart(&employees)))
}
