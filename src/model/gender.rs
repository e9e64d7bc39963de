use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Reads a stored value; anything unrecognised is treated as unknown.
    pub fn from_record(value: Option<&str>) -> Option<Gender> {
        value.and_then(|v| v.trim().parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_gender_is_case_insensitive() {
        assert_eq!(Gender::from_record(Some("Female")), Some(Gender::Female));
        assert_eq!(Gender::from_record(Some(" MALE ")), Some(Gender::Male));
    }

    #[test]
    fn test_missing_or_unknown_gender_is_none() {
        assert_eq!(Gender::from_record(None), None);
        assert_eq!(Gender::from_record(Some("")), None);
        assert_eq!(Gender::from_record(Some("n/a")), None);
    }
}
