use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;
use sqlx::MySqlPool;

use crate::error::AppError;

/// ===============================
/// SQL bindable value enum
/// ===============================
#[derive(Debug, PartialEq)]
pub enum SqlValue {
    String(String),
    I64(i64),
    U64(u64),
    F64(f64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Null,
}

/// ===============================
/// SQL update container
/// ===============================
#[derive(Debug)]
pub struct SqlUpdate {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

/// ===============================
/// Pagination window
/// ===============================
pub const MAX_PER_PAGE: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u64,
    pub per_page: u64,
    pub offset: u64,
}

impl Page {
    /// Pages start at 1. Oversized page numbers saturate the offset, which
    /// simply yields an empty page.
    pub fn new(page: Option<u64>, per_page: Option<u64>, default_per_page: u64) -> Self {
        let page = page.unwrap_or(1).max(1);
        let per_page = per_page.unwrap_or(default_per_page).clamp(1, MAX_PER_PAGE);

        Page {
            page,
            per_page,
            offset: (page - 1).saturating_mul(per_page),
        }
    }
}

/// ===============================
/// Build dynamic UPDATE SQL
/// ===============================
///
/// Only keys listed in `allowed_columns` may appear in the payload; column
/// names are spliced into the statement, values are always bound.
pub fn build_update_sql(
    table: &str,
    payload: &Value,
    allowed_columns: &[&str],
    id_column: &str,
    id_value: u64,
) -> Result<SqlUpdate, AppError> {
    let obj = payload
        .as_object()
        .ok_or_else(|| AppError::bad_request("Payload must be a JSON object"))?;

    if obj.is_empty() {
        return Err(AppError::bad_request("No fields provided for update"));
    }

    if let Some(unknown) = obj.keys().find(|k| !allowed_columns.contains(&k.as_str())) {
        return Err(AppError::bad_request(format!(
            "Field '{}' cannot be updated",
            unknown
        )));
    }

    // Build SET clause
    let set_clause = obj
        .keys()
        .map(|k| format!("{} = ?", k))
        .collect::<Vec<_>>()
        .join(", ");

    let sql = format!("UPDATE {} SET {} WHERE {} = ?", table, set_clause, id_column);

    let mut values = Vec::with_capacity(obj.len() + 1);

    // Convert JSON values → SqlValue
    for value in obj.values() {
        match value {
            Value::String(s) => {
                if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                    values.push(SqlValue::Date(d));
                } else if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
                    values.push(SqlValue::DateTime(dt));
                } else {
                    values.push(SqlValue::String(s.clone()));
                }
            }
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    values.push(SqlValue::I64(i));
                } else if let Some(f) = n.as_f64() {
                    values.push(SqlValue::F64(f));
                }
            }
            Value::Bool(b) => values.push(SqlValue::Bool(*b)),
            Value::Null => values.push(SqlValue::Null),
            _ => return Err(AppError::bad_request("Unsupported JSON value type")),
        }
    }

    // WHERE id = ?
    values.push(SqlValue::U64(id_value));

    Ok(SqlUpdate { sql, values })
}

/// ===============================
/// Execute the update
/// ===============================
pub async fn execute_update(pool: &MySqlPool, update: SqlUpdate) -> Result<u64, sqlx::Error> {
    let mut query = sqlx::query(&update.sql);

    for value in update.values {
        query = match value {
            SqlValue::String(v) => query.bind(v),
            SqlValue::I64(v) => query.bind(v),
            SqlValue::U64(v) => query.bind(v),
            SqlValue::F64(v) => query.bind(v),
            SqlValue::Bool(v) => query.bind(v),
            SqlValue::Date(v) => query.bind(v),
            SqlValue::DateTime(v) => query.bind(v),
            SqlValue::Null => query.bind(None::<String>),
        };
    }

    let result = query.execute(pool).await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const COLUMNS: &[&str] = &["first_name", "joined_date", "salary_usd", "phone"];

    #[test]
    fn test_page_defaults_and_offset() {
        assert_eq!(
            Page::new(None, None, 20),
            Page { page: 1, per_page: 20, offset: 0 }
        );
        assert_eq!(
            Page::new(Some(3), Some(10), 20),
            Page { page: 3, per_page: 10, offset: 20 }
        );
    }

    #[test]
    fn test_page_zero_and_oversized_per_page_are_clamped() {
        assert_eq!(
            Page::new(Some(0), Some(5_000), 20),
            Page { page: 1, per_page: 100, offset: 0 }
        );
        assert_eq!(Page::new(Some(2), Some(0), 20).per_page, 1);
    }

    #[test]
    fn test_huge_page_saturates_instead_of_overflowing() {
        let page = Page::new(Some(u64::MAX), Some(100), 20);
        assert_eq!(page.page, u64::MAX);
        assert_eq!(page.offset, u64::MAX);

        let page = Page::new(Some(u32::MAX as u64), Some(100), 20);
        assert_eq!(page.offset, (u32::MAX as u64 - 1) * 100);
    }

    #[test]
    fn test_builds_set_clause_and_binds_id_last() {
        let update = build_update_sql(
            "employees",
            &json!({ "first_name": "Mariyam", "salary_usd": 1500.5 }),
            COLUMNS,
            "id",
            7,
        )
        .unwrap();

        assert_eq!(
            update.sql,
            "UPDATE employees SET first_name = ?, salary_usd = ? WHERE id = ?"
        );
        assert_eq!(
            update.values,
            vec![
                SqlValue::String("Mariyam".to_string()),
                SqlValue::F64(1500.5),
                SqlValue::U64(7),
            ]
        );
    }

    #[test]
    fn test_date_strings_bind_as_dates() {
        let update = build_update_sql(
            "employees",
            &json!({ "joined_date": "2021-09-01", "phone": null }),
            COLUMNS,
            "id",
            1,
        )
        .unwrap();

        assert_eq!(
            update.values[0],
            SqlValue::Date(NaiveDate::from_ymd_opt(2021, 9, 1).unwrap())
        );
        assert_eq!(update.values[1], SqlValue::Null);
    }

    #[test]
    fn test_unknown_column_is_rejected() {
        let err = build_update_sql(
            "employees",
            &json!({ "id = 1; DROP TABLE employees; --": "x" }),
            COLUMNS,
            "id",
            1,
        )
        .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_empty_or_non_object_payload_is_rejected() {
        assert!(build_update_sql("employees", &json!({}), COLUMNS, "id", 1).is_err());
        assert!(build_update_sql("employees", &json!([1, 2]), COLUMNS, "id", 1).is_err());
    }

    #[test]
    fn test_nested_values_are_rejected() {
        let err = build_update_sql(
            "employees",
            &json!({ "phone": { "home": "123" } }),
            COLUMNS,
            "id",
            1,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Unsupported JSON value type");
    }
}
