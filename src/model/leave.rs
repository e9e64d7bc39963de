use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};
use utoipa::ToSchema;

/// Leave categories an employee accrues entitlement for.
///
/// Stored as text; `as_ref()` gives the stored form and `parse()` reads it back.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveCategory {
    Annual,
    Emergency,
    Sick,
    Paternity,
    Maternity,
    #[serde(rename = "familyCare")]
    #[strum(serialize = "familyCare")]
    FamilyCare,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    IntoStaticStr,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl LeaveStatus {
    /// A request leaves `Pending` exactly once; every other state is final.
    pub fn can_transition_to(self, next: LeaveStatus) -> bool {
        self == LeaveStatus::Pending && next != LeaveStatus::Pending
    }

    pub fn is_final(self) -> bool {
        self != LeaveStatus::Pending
    }

    /// Days a request moves into the employee's usage when it enters this
    /// state. Only approval consumes entitlement.
    pub fn used_days_delta(self, day_count: i32) -> i32 {
        match self {
            LeaveStatus::Approved => day_count,
            LeaveStatus::Pending | LeaveStatus::Rejected | LeaveStatus::Cancelled => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_category_round_trips_through_stored_text() {
        for category in LeaveCategory::iter() {
            let stored = category.as_ref().to_string();
            assert_eq!(stored.parse::<LeaveCategory>().unwrap(), category);
        }
    }

    #[test]
    fn test_family_care_uses_camel_case_key() {
        assert_eq!(LeaveCategory::FamilyCare.as_ref(), "familyCare");
        assert_eq!(
            serde_json::to_string(&LeaveCategory::FamilyCare).unwrap(),
            "\"familyCare\""
        );
        assert_eq!(
            serde_json::from_str::<LeaveCategory>("\"familyCare\"").unwrap(),
            LeaveCategory::FamilyCare
        );
    }

    #[test]
    fn test_unknown_category_does_not_parse() {
        assert!("unpaid".parse::<LeaveCategory>().is_err());
    }

    #[test]
    fn test_only_approval_consumes_days() {
        assert_eq!(LeaveStatus::Approved.used_days_delta(4), 4);
        assert_eq!(LeaveStatus::Rejected.used_days_delta(4), 0);
        assert_eq!(LeaveStatus::Cancelled.used_days_delta(4), 0);
        assert_eq!(LeaveStatus::Pending.used_days_delta(4), 0);
    }

    #[test]
    fn test_pending_moves_once() {
        assert!(LeaveStatus::Pending.can_transition_to(LeaveStatus::Approved));
        assert!(LeaveStatus::Pending.can_transition_to(LeaveStatus::Rejected));
        assert!(LeaveStatus::Pending.can_transition_to(LeaveStatus::Cancelled));
        assert!(!LeaveStatus::Pending.can_transition_to(LeaveStatus::Pending));
    }

    #[test]
    fn test_final_states_never_move() {
        for from in [
            LeaveStatus::Approved,
            LeaveStatus::Rejected,
            LeaveStatus::Cancelled,
        ] {
            assert!(from.is_final());
            for to in [
                LeaveStatus::Pending,
                LeaveStatus::Approved,
                LeaveStatus::Rejected,
                LeaveStatus::Cancelled,
            ] {
                assert!(!from.can_transition_to(to));
            }
        }
    }
}
