//! Reporting lines inferred from job titles.
//!
//! Employee records carry no manager reference, so the chart guesses one: an
//! employee reports to the closest more senior colleague, preferring their
//! own department.

use std::cmp::Reverse;

use serde::Serialize;
use utoipa::ToSchema;

use crate::model::employee::Employee;

pub const EXECUTIVE: u8 = 0;
pub const DIRECTOR: u8 = 1;
pub const MANAGER: u8 = 2;
pub const SUPERVISOR: u8 = 3;
pub const STAFF: u8 = 4;

// Checked in order, so "managing director" wins over "director"
// and "general manager" over "manager".
const TITLE_LEVELS: &[(u8, &[&str])] = &[
    (EXECUTIVE, &["chief", "ceo", "managing director"]),
    (DIRECTOR, &["director", "head", "general manager"]),
    (MANAGER, &["manager"]),
    (SUPERVISOR, &["supervisor", "lead", "coordinator", "in charge"]),
];

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OrgChartEntry {
    pub employee_id: u64,
    pub name: String,
    #[schema(nullable = true)]
    pub designation: Option<String>,
    #[schema(nullable = true)]
    pub department: Option<String>,
    /// 0 = executive .. 4 = staff
    pub level: u8,
    #[schema(nullable = true)]
    pub reports_to: Option<u64>,
}

/// Seniority derived from whole words of the title, case-insensitively.
pub fn seniority_level(designation: Option<&str>) -> u8 {
    let Some(title) = designation else {
        return STAFF;
    };

    let words: Vec<String> = title
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect();
    let padded = format!(" {} ", words.join(" "));

    TITLE_LEVELS
        .iter()
        .find(|(_, keywords)| {
            keywords
                .iter()
                .any(|kw| padded.contains(&format!(" {} ", kw)))
        })
        .map(|(level, _)| *level)
        .unwrap_or(STAFF)
}

fn same_department(a: &Employee, b: &Employee) -> bool {
    match (a.department.as_deref(), b.department.as_deref()) {
        (Some(x), Some(y)) => x.trim().eq_ignore_ascii_case(y.trim()),
        _ => false,
    }
}

pub fn build_org_chart(employees: &[Employee]) -> Vec<OrgChartEntry> {
    let levels: Vec<u8> = employees
        .iter()
        .map(|e| seniority_level(e.designation.as_deref()))
        .collect();

    employees
        .iter()
        .zip(&levels)
        .map(|(employee, &level)| {
            let reports_to = employees
                .iter()
                .zip(&levels)
                .filter(|(other, other_level)| other.id != employee.id && **other_level < level)
                .min_by_key(|(other, other_level)| {
                    (
                        !same_department(employee, other),
                        Reverse(**other_level),
                        other.id,
                    )
                })
                .map(|(other, _)| other.id);

            OrgChartEntry {
                employee_id: employee.id,
                name: employee.full_name(),
                designation: employee.designation.clone(),
                department: employee.department.clone(),
                level,
                reports_to,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::test_support::employee;

    fn manager_of(chart: &[OrgChartEntry], id: u64) -> Option<u64> {
        chart
            .iter()
            .find(|e| e.employee_id == id)
            .and_then(|e| e.reports_to)
    }

    #[test]
    fn test_title_keywords_map_to_levels() {
        assert_eq!(seniority_level(Some("Chief Executive Officer")), EXECUTIVE);
        assert_eq!(seniority_level(Some("CEO")), EXECUTIVE);
        assert_eq!(seniority_level(Some("Managing Director")), EXECUTIVE);
        assert_eq!(seniority_level(Some("Director of Finance")), DIRECTOR);
        assert_eq!(seniority_level(Some("Head of HR")), DIRECTOR);
        assert_eq!(seniority_level(Some("General Manager")), DIRECTOR);
        assert_eq!(seniority_level(Some("HR Manager")), MANAGER);
        assert_eq!(seniority_level(Some("Team Lead")), SUPERVISOR);
        assert_eq!(seniority_level(Some("Site In-Charge")), SUPERVISOR);
        assert_eq!(seniority_level(Some("Accountant")), STAFF);
        assert_eq!(seniority_level(None), STAFF);
    }

    #[test]
    fn test_keywords_match_whole_words_only() {
        // "leader" and "headcount" are not "lead" / "head"
        assert_eq!(seniority_level(Some("Cheerleader")), STAFF);
        assert_eq!(seniority_level(Some("Headcount Analyst")), STAFF);
    }

    #[test]
    fn test_reports_to_prefers_same_department() {
        let employees = vec![
            employee(1, "CEO", Some("Management")),
            employee(2, "HR Director", Some("HR")),
            employee(3, "HR Manager", Some("HR")),
            employee(4, "HR Officer", Some("HR")),
            employee(5, "Finance Manager", Some("Finance")),
            employee(6, "Accountant", Some("Finance")),
        ];

        let chart = build_org_chart(&employees);

        assert_eq!(manager_of(&chart, 1), None);
        assert_eq!(manager_of(&chart, 2), Some(1));
        assert_eq!(manager_of(&chart, 3), Some(2));
        assert_eq!(manager_of(&chart, 4), Some(3));
        assert_eq!(manager_of(&chart, 6), Some(5));
        // no senior in Finance: nearest senior anywhere
        assert_eq!(manager_of(&chart, 5), Some(2));
    }

    #[test]
    fn test_ties_go_to_lowest_id() {
        let employees = vec![
            employee(9, "Operations Manager", Some("Ops")),
            employee(4, "Duty Manager", Some("Ops")),
            employee(12, "Waiter", Some("Ops")),
        ];

        let chart = build_org_chart(&employees);
        assert_eq!(manager_of(&chart, 12), Some(4));
    }

    #[test]
    fn test_peers_do_not_report_to_each_other() {
        let employees = vec![
            employee(1, "Cashier", Some("Retail")),
            employee(2, "Cashier", Some("Retail")),
        ];

        let chart = build_org_chart(&employees);
        assert!(chart.iter().all(|e| e.reports_to.is_none()));
    }
}
