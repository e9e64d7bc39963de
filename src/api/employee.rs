use crate::{
    error::{AppError, is_duplicate_key},
    model::{
        employee::Employee,
        gender::Gender,
        leave::{LeaveCategory, LeaveStatus},
        leave_request::LeaveRequest,
    },
    service::leave_balance::{LeaveBalances, LeaveUsage, calculate_leave_balances},
    utils::{
        db_utils::{Page, build_update_sql, execute_update},
        employee_number_index::{EMPLOYEE_NUMBERS, Lookup, normalize},
    },
};
use actix_web::{HttpResponse, web};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::{MySqlConnection, MySqlPool};
use strum::IntoEnumIterator;
use tracing::{debug, info, warn};
use utoipa::{IntoParams, ToSchema};

/// Columns a PUT may touch. `id` and `created_at` are never writable.
pub const UPDATABLE_COLUMNS: &[&str] = &[
    "employee_number",
    "first_name",
    "last_name",
    "id_number",
    "gender",
    "nationality",
    "designation",
    "department",
    "work_site",
    "joined_date",
    "salary_local",
    "salary_usd",
    "email",
    "phone",
    "address",
];

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = "JJ-0042")]
    pub employee_number: String,
    #[schema(example = "Ahmed")]
    pub first_name: String,
    #[serde(default)]
    #[schema(example = "Shifau")]
    pub last_name: String,
    pub id_number: Option<String>,
    #[schema(example = "male")]
    pub gender: Option<String>,
    pub nationality: Option<String>,
    #[schema(example = "Accountant")]
    pub designation: Option<String>,
    #[schema(example = "Finance")]
    pub department: Option<String>,
    pub work_site: Option<String>,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub joined_date: NaiveDate,
    pub salary_local: Option<f64>,
    pub salary_usd: Option<f64>,
    #[schema(example = "ahmed@juniorjoy.mv", format = "email")]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl CreateEmployee {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.employee_number.trim().is_empty() {
            return Err(AppError::bad_request("employee_number must not be empty"));
        }
        if self.first_name.trim().is_empty() {
            return Err(AppError::bad_request("first_name must not be empty"));
        }
        if let Some(gender) = self.gender.as_deref() {
            if Gender::from_record(Some(gender)).is_none() {
                return Err(AppError::bad_request(
                    "Invalid gender. Allowed: male, female",
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct EmployeeQuery {
    /// Page number (starts at 1)
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub department: Option<String>,
    pub designation: Option<String>,
    pub work_site: Option<String>,
    /// Matches name, employee number or email
    pub search: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    pub data: Vec<Employee>,
    #[schema(example = 1)]
    pub page: u64,
    #[schema(example = 20)]
    pub per_page: u64,
    #[schema(example = 57)]
    pub total: i64,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDetailResponse {
    pub employee: Employee,
    /// Balance per leave category, keyed by category name
    #[schema(value_type = Object)]
    pub leave_balances: LeaveBalances,
    /// Approved leave, most recent first
    pub past_leaves: Vec<LeaveRequest>,
}

/// true  => employee number AVAILABLE
/// false => employee number TAKEN
pub async fn is_employee_number_available(
    employee_number: &str,
    pool: &MySqlPool,
) -> Result<bool, sqlx::Error> {
    match EMPLOYEE_NUMBERS.lookup(employee_number) {
        Lookup::Free => return Ok(true),
        Lookup::Taken => return Ok(false),
        Lookup::Unknown => {}
    }

    let exists = employee_number_exists(pool, employee_number).await?;

    if exists {
        EMPLOYEE_NUMBERS.confirm(employee_number).await;
    }

    Ok(!exists)
}

/// Authoritative check against the unique index, bypassing filter and cache.
pub async fn employee_number_exists(
    pool: &MySqlPool,
    employee_number: &str,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM employees WHERE employee_number = ? LIMIT 1)",
    )
    .bind(normalize(employee_number))
    .fetch_one(pool)
    .await
}

/// Inserts the employee and a zeroed usage row per leave category.
pub async fn insert_employee(pool: &MySqlPool, payload: &CreateEmployee) -> Result<u64, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        r#"
        INSERT INTO employees
        (employee_number, first_name, last_name, id_number, gender, nationality,
         designation, department, work_site, joined_date, salary_local, salary_usd,
         email, phone, address)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(normalize(&payload.employee_number))
    .bind(payload.first_name.trim())
    .bind(payload.last_name.trim())
    .bind(&payload.id_number)
    .bind(payload.gender.as_deref().map(|g| g.trim().to_lowercase()))
    .bind(&payload.nationality)
    .bind(&payload.designation)
    .bind(&payload.department)
    .bind(&payload.work_site)
    .bind(payload.joined_date)
    .bind(payload.salary_local)
    .bind(payload.salary_usd)
    .bind(&payload.email)
    .bind(&payload.phone)
    .bind(&payload.address)
    .execute(&mut *tx)
    .await?;

    let employee_id = result.last_insert_id();

    for category in LeaveCategory::iter() {
        sqlx::query(
            "INSERT INTO employee_leave_usage (employee_id, category, used_days) VALUES (?, ?, 0)",
        )
        .bind(employee_id)
        .bind(category.as_ref())
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    EMPLOYEE_NUMBERS.record(&payload.employee_number).await;

    Ok(employee_id)
}

pub async fn fetch_employee(pool: &MySqlPool, employee_id: u64) -> Result<Employee, AppError> {
    sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = ?")
        .bind(employee_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::not_found("Employee not found"))
}

/// Used days per category; rows with an unknown category are skipped.
pub async fn load_leave_usage(pool: &MySqlPool, employee_id: u64) -> Result<LeaveUsage, sqlx::Error> {
    let rows = sqlx::query_as::<_, (String, i32)>(
        "SELECT category, used_days FROM employee_leave_usage WHERE employee_id = ?",
    )
    .bind(employee_id)
    .fetch_all(pool)
    .await?;

    let mut usage = LeaveUsage::new();
    for (category, used_days) in rows {
        match category.parse::<LeaveCategory>() {
            Ok(category) => {
                usage.insert(category, used_days);
            }
            Err(_) => warn!(employee_id, category = %category, "Unknown leave category in usage"),
        }
    }
    Ok(usage)
}

/// Adds `days` to the employee's usage for `category`, creating the row when
/// it is missing.
pub async fn add_used_days(
    conn: &mut MySqlConnection,
    employee_id: u64,
    category: LeaveCategory,
    days: i32,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO employee_leave_usage (employee_id, category, used_days)
        VALUES (?, ?, ?)
        ON DUPLICATE KEY UPDATE used_days = used_days + VALUES(used_days)
        "#,
    )
    .bind(employee_id)
    .bind(category.as_ref())
    .bind(days)
    .execute(conn)
    .await?;

    Ok(())
}

/// Brings a partial update into the form `insert_employee` stores: trimmed
/// text, upper-case employee number, lower-case gender. Required columns may
/// not be set to null or blank.
pub fn normalize_update(mut body: Value) -> Result<Value, AppError> {
    let Some(fields) = body.as_object_mut() else {
        return Ok(body);
    };

    for (column, value) in fields.iter_mut() {
        match (column.as_str(), &*value) {
            ("employee_number" | "first_name" | "joined_date", Value::Null) => {
                return Err(AppError::bad_request(format!("{} must not be empty", column)));
            }
            ("last_name", Value::Null) => *value = Value::String(String::new()),
            ("employee_number", Value::String(number)) => {
                let number = normalize(number);
                if number.is_empty() {
                    return Err(AppError::bad_request("employee_number must not be empty"));
                }
                *value = Value::String(number);
            }
            ("gender", Value::String(gender)) => {
                let gender = Gender::from_record(Some(gender)).ok_or_else(|| {
                    AppError::bad_request("Invalid gender. Allowed: male, female")
                })?;
                *value = Value::String(gender.as_ref().to_string());
            }
            ("first_name", Value::String(name)) if name.trim().is_empty() => {
                return Err(AppError::bad_request("first_name must not be empty"));
            }
            (_, Value::String(text)) => *value = Value::String(text.trim().to_string()),
            _ => {}
        }
    }

    Ok(body)
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created successfully", body = Object, example = json!({
            "message": "Employee created successfully",
            "id": 42
        })),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Employee number already exists", body = Object, example = json!({
            "message": "Employee number already exists"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn create_employee(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateEmployee>,
) -> Result<HttpResponse, AppError> {
    payload.validate()?;

    if !is_employee_number_available(&payload.employee_number, pool.get_ref()).await? {
        return Err(AppError::conflict("Employee number already exists"));
    }

    let employee_id = insert_employee(pool.get_ref(), &payload)
        .await
        .map_err(|e| {
            if is_duplicate_key(&e) {
                AppError::conflict("Employee number already exists")
            } else {
                AppError::from(e)
            }
        })?;

    info!(employee_id, employee_number = %payload.employee_number, "Employee created");

    Ok(HttpResponse::Created().json(json!({
        "message": "Employee created successfully",
        "id": employee_id
    })))
}

#[utoipa::path(
    get,
    path = "/api/employees",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Paginated employee list", body = EmployeeListResponse)
    ),
    tag = "Employee"
)]
pub async fn list_employees(
    pool: web::Data<MySqlPool>,
    query: web::Query<EmployeeQuery>,
) -> Result<HttpResponse, AppError> {
    let Page {
        page,
        per_page,
        offset,
    } = Page::new(query.page, query.per_page, 20);

    // ---------- build WHERE clause dynamically ----------
    let mut conditions = Vec::new();
    let mut bindings: Vec<String> = Vec::new();

    if let Some(department) = &query.department {
        conditions.push("department = ?");
        bindings.push(department.clone());
    }

    if let Some(designation) = &query.designation {
        conditions.push("designation = ?");
        bindings.push(designation.clone());
    }

    if let Some(work_site) = &query.work_site {
        conditions.push("work_site = ?");
        bindings.push(work_site.clone());
    }

    if let Some(search) = &query.search {
        conditions.push(
            "(first_name LIKE ? OR last_name LIKE ? OR employee_number LIKE ? OR email LIKE ?)",
        );
        let like = format!("%{}%", search);
        bindings.extend(std::iter::repeat(like).take(4));
    }

    let where_clause = if conditions.is_empty() {
        "".to_string()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    // ---------- total count ----------
    let count_sql = format!("SELECT COUNT(*) AS total FROM employees {}", where_clause);
    debug!(sql = %count_sql, bindings = ?bindings, "Counting employees");

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for b in &bindings {
        count_query = count_query.bind(b);
    }
    let total = count_query.fetch_one(pool.get_ref()).await?;

    // ---------- data query ----------
    let data_sql = format!(
        "SELECT * FROM employees {} ORDER BY id DESC LIMIT ? OFFSET ?",
        where_clause
    );
    debug!(sql = %data_sql, page, per_page, offset, "Fetching employees");

    let mut data_query = sqlx::query_as::<_, Employee>(&data_sql);
    for b in &bindings {
        data_query = data_query.bind(b);
    }
    let employees = data_query
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(EmployeeListResponse {
        data: employees,
        page,
        per_page,
        total,
    }))
}

/// Get Employee by ID, with leave balances and approved leave history
#[utoipa::path(
    get,
    path = "/api/employees/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee found", body = EmployeeDetailResponse),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "Employee not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn get_employee(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let employee_id = path.into_inner();

    let employee = fetch_employee(pool.get_ref(), employee_id).await?;
    let usage = load_leave_usage(pool.get_ref(), employee_id).await?;

    let today = Utc::now().date_naive();
    let leave_balances =
        calculate_leave_balances(employee.joined_date, employee.gender(), &usage, today);

    let past_leaves = sqlx::query_as::<_, LeaveRequest>(
        r#"
        SELECT * FROM leave_requests
        WHERE employee_id = ? AND status = ?
        ORDER BY start_date DESC
        "#,
    )
    .bind(employee_id)
    .bind(LeaveStatus::Approved.as_ref())
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(EmployeeDetailResponse {
        employee,
        leave_balances,
        past_leaves,
    }))
}

/// Update Employee
#[utoipa::path(
    put,
    path = "/api/employees/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    request_body = Object,
    responses(
        (status = 200, description = "Employee updated successfully", body = Object, example = json!({
            "message": "Employee updated successfully"
        })),
        (status = 400, description = "Unknown or invalid field"),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "Employee number already exists"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn update_employee(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> Result<HttpResponse, AppError> {
    let employee_id = path.into_inner();
    let body = normalize_update(body.into_inner())?;

    let update = build_update_sql("employees", &body, UPDATABLE_COLUMNS, "id", employee_id)?;

    let new_number = body.get("employee_number").and_then(Value::as_str);
    let previous_number = match new_number {
        Some(_) => Some(fetch_employee(pool.get_ref(), employee_id).await?.employee_number),
        None => None,
    };

    let affected = execute_update(pool.get_ref(), update)
        .await
        .map_err(|e| {
            if is_duplicate_key(&e) {
                AppError::conflict("Employee number already exists")
            } else {
                AppError::from(e)
            }
        })?;

    if affected == 0 {
        // MySQL reports 0 for unchanged rows too
        fetch_employee(pool.get_ref(), employee_id).await?;
    }

    if let (Some(previous), Some(current)) = (previous_number, new_number) {
        EMPLOYEE_NUMBERS.rename(&previous, current).await;
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Employee updated successfully"
    })))
}

/// Delete Employee
#[utoipa::path(
    delete,
    path = "/api/employees/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted", body = Object, example = json!({
            "message": "Successfully deleted"
        })),
        (status = 404, description = "Employee not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn delete_employee(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let employee_id = path.into_inner();

    let employee = fetch_employee(pool.get_ref(), employee_id).await?;

    let result = sqlx::query("DELETE FROM employees WHERE id = ?")
        .bind(employee_id)
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Employee not found"));
    }

    EMPLOYEE_NUMBERS.release(&employee.employee_number).await;

    info!(employee_id, "Employee deleted");

    Ok(HttpResponse::Ok().json(json!({
        "message": "Successfully deleted"
    })))
}
