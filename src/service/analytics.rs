//! Group-by breakdowns over the employee list for the dashboard charts.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::model::employee::Employee;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BreakdownField {
    Department,
    Designation,
    Nationality,
    Gender,
    WorkSite,
}

impl BreakdownField {
    pub fn value_of(self, employee: &Employee) -> Option<&str> {
        let value = match self {
            BreakdownField::Department => employee.department.as_deref(),
            BreakdownField::Designation => employee.designation.as_deref(),
            BreakdownField::Nationality => employee.nationality.as_deref(),
            BreakdownField::Gender => employee.gender.as_deref(),
            BreakdownField::WorkSite => employee.work_site.as_deref(),
        };
        value.map(str::trim).filter(|v| !v.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct BreakdownEntry {
    pub key: String,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Breakdown {
    #[schema(example = "department")]
    pub field: String,
    /// Employees with a value for `field`
    pub total: usize,
    /// Employees with no value, left out of the percentages
    pub missing: usize,
    pub entries: Vec<BreakdownEntry>,
}

pub fn breakdown(employees: &[Employee], field: BreakdownField) -> Breakdown {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut missing = 0;

    for employee in employees {
        match field.value_of(employee) {
            Some(value) => *counts.entry(value).or_default() += 1,
            None => missing += 1,
        }
    }

    let total: usize = counts.values().sum();

    let mut entries: Vec<BreakdownEntry> = counts
        .into_iter()
        .map(|(key, count)| BreakdownEntry {
            key: key.to_string(),
            count,
            percentage: count as f64 * 100.0 / total as f64,
        })
        .collect();

    entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));

    Breakdown {
        field: field.to_string(),
        total,
        missing,
        entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::test_support::employee;

    fn with_department(id: u64, department: Option<&str>) -> Employee {
        let mut e = employee(id, "Officer", department);
        e.work_site = Some("Head Office".to_string());
        e
    }

    #[test]
    fn test_percentages_sum_to_100_over_non_null_entries() {
        let employees = vec![
            with_department(1, Some("Finance")),
            with_department(2, Some("Finance")),
            with_department(3, Some("HR")),
            with_department(4, None),
            with_department(5, Some("  ")),
            with_department(6, Some("Operations")),
        ];

        let result = breakdown(&employees, BreakdownField::Department);

        assert_eq!(result.total, 4);
        assert_eq!(result.missing, 2);
        let sum: f64 = result.entries.iter().map(|e| e.percentage).sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_entries_sorted_by_count_then_key() {
        let employees = vec![
            with_department(1, Some("HR")),
            with_department(2, Some("Finance")),
            with_department(3, Some("Operations")),
            with_department(4, Some("Operations")),
        ];

        let result = breakdown(&employees, BreakdownField::Department);
        let keys: Vec<&str> = result.entries.iter().map(|e| e.key.as_str()).collect();

        assert_eq!(keys, vec!["Operations", "Finance", "HR"]);
        assert_eq!(result.entries[0].count, 2);
        assert_eq!(result.entries[0].percentage, 50.0);
    }

    #[test]
    fn test_empty_list_has_no_entries() {
        let result = breakdown(&[], BreakdownField::Gender);
        assert_eq!(result.total, 0);
        assert_eq!(result.missing, 0);
        assert!(result.entries.is_empty());
    }

    #[test]
    fn test_all_missing_produces_no_nan() {
        let employees = vec![with_department(1, None), with_department(2, None)];
        let result = breakdown(&employees, BreakdownField::Department);

        assert_eq!(result.missing, 2);
        assert!(result.entries.is_empty());
    }

    #[test]
    fn test_field_names_parse_from_path() {
        assert_eq!(
            "work_site".parse::<BreakdownField>().unwrap(),
            BreakdownField::WorkSite
        );
        assert!("salary".parse::<BreakdownField>().is_err());
        assert_eq!(BreakdownField::WorkSite.to_string(), "work_site");
    }
}
