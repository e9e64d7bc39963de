//! Remaining leave per category.
//!
//! Entitlements are derived from the hire date and gender; usage comes from the
//! `employee_leave_usage` table. Nothing here touches the clock, the caller
//! supplies the evaluation date.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use strum::IntoEnumIterator;
use utoipa::ToSchema;

use crate::model::gender::Gender;
use crate::model::leave::LeaveCategory;

pub const ANNUAL_DAYS_PER_YEAR: i32 = 30;
pub const EMERGENCY_DAYS: i32 = 10;
pub const SICK_DAYS: i32 = 30;
pub const PATERNITY_DAYS: i32 = 3;
pub const FAMILY_CARE_DAYS: i32 = 10;
pub const MATERNITY_DAYS_FEMALE: i32 = 60;
pub const MATERNITY_DAYS_OTHER: i32 = 30;

/// Days used per category. Missing categories count as zero.
pub type LeaveUsage = BTreeMap<LeaveCategory, i32>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct LeaveBalance {
    pub entitlement: i32,
    pub used: i32,
    /// `entitlement - used`, negative when overdrawn
    pub balance: i32,
}

pub type LeaveBalances = BTreeMap<LeaveCategory, LeaveBalance>;

/// Calendar-year difference: an employee hired on 31 December has one year
/// of service on 1 January.
pub fn years_employed(hire_date: NaiveDate, as_of: NaiveDate) -> i32 {
    as_of.year() - hire_date.year()
}

pub fn entitlement(
    category: LeaveCategory,
    hire_date: NaiveDate,
    gender: Option<Gender>,
    as_of: NaiveDate,
) -> i32 {
    match category {
        LeaveCategory::Annual => ANNUAL_DAYS_PER_YEAR * (years_employed(hire_date, as_of) + 1),
        LeaveCategory::Emergency => EMERGENCY_DAYS,
        LeaveCategory::Sick => SICK_DAYS,
        LeaveCategory::Paternity => PATERNITY_DAYS,
        LeaveCategory::Maternity => match gender {
            Some(Gender::Female) => MATERNITY_DAYS_FEMALE,
            _ => MATERNITY_DAYS_OTHER,
        },
        LeaveCategory::FamilyCare => FAMILY_CARE_DAYS,
    }
}

/// Balance for every category, evaluated on `as_of`.
pub fn calculate_leave_balances(
    hire_date: NaiveDate,
    gender: Option<Gender>,
    used: &LeaveUsage,
    as_of: NaiveDate,
) -> LeaveBalances {
    LeaveCategory::iter()
        .map(|category| {
            let entitlement = entitlement(category, hire_date, gender, as_of);
            let used = used.get(&category).copied().unwrap_or(0);
            (
                category,
                LeaveBalance {
                    entitlement,
                    used,
                    balance: entitlement - used,
                },
            )
        })
        .collect()
}
