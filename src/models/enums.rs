use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// The serde encoding is pinned to the same canonical string as the
/// storage encoding, so wire and database never disagree.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(Gender {
    Male => "male",
    Female => "female",
    Other => "other",
});

str_enum!(MaritalStatus {
    Married => "married",
    Unmarried => "unmarried",
    Divorced => "divorced",
    Widow => "widow",
});

str_enum!(PeriodType {
    Regular => "regular",
    Irregular => "irregular",
});

str_enum!(PeriodDifficulty {
    None => "no",
    Moderate => "moderate",
    Severe => "severe",
});

str_enum!(TriState {
    Yes => "yes",
    No => "no",
    Unknown => "na",
});

impl TriState {
    /// Lenient wire decode: the single ingress point for the historical
    /// encodings (boolean, "yes"/"no" in any case, "na", null).
    /// Anything unrecognized lands on `Unknown`, never an error.
    pub fn decode_str(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "yes" => TriState::Yes,
            "no" => TriState::No,
            _ => TriState::Unknown,
        }
    }

    pub fn decode_bool(b: bool) -> Self {
        if b {
            TriState::Yes
        } else {
            TriState::No
        }
    }

    /// Display form for reports: Yes / No / N/A.
    pub fn display(&self) -> &'static str {
        match self {
            TriState::Yes => "Yes",
            TriState::No => "No",
            TriState::Unknown => "N/A",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn gender_round_trip() {
        for (variant, s) in [
            (Gender::Male, "male"),
            (Gender::Female, "female"),
            (Gender::Other, "other"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(Gender::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn marital_status_round_trip() {
        for (variant, s) in [
            (MaritalStatus::Married, "married"),
            (MaritalStatus::Unmarried, "unmarried"),
            (MaritalStatus::Divorced, "divorced"),
            (MaritalStatus::Widow, "widow"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(MaritalStatus::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn period_difficulty_round_trip() {
        for (variant, s) in [
            (PeriodDifficulty::None, "no"),
            (PeriodDifficulty::Moderate, "moderate"),
            (PeriodDifficulty::Severe, "severe"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(PeriodDifficulty::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn tri_state_round_trip() {
        for (variant, s) in [
            (TriState::Yes, "yes"),
            (TriState::No, "no"),
            (TriState::Unknown, "na"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(TriState::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn tri_state_lenient_decode() {
        assert_eq!(TriState::decode_str("yes"), TriState::Yes);
        assert_eq!(TriState::decode_str("YES"), TriState::Yes);
        assert_eq!(TriState::decode_str("No"), TriState::No);
        assert_eq!(TriState::decode_str("na"), TriState::Unknown);
        assert_eq!(TriState::decode_str(""), TriState::Unknown);
        assert_eq!(TriState::decode_str("maybe"), TriState::Unknown);
        assert_eq!(TriState::decode_bool(true), TriState::Yes);
        assert_eq!(TriState::decode_bool(false), TriState::No);
    }

    #[test]
    fn serde_uses_canonical_strings() {
        assert_eq!(serde_json::to_string(&Gender::Female).unwrap(), "\"female\"");
        assert_eq!(
            serde_json::to_string(&PeriodDifficulty::None).unwrap(),
            "\"no\""
        );
        assert_eq!(serde_json::to_string(&TriState::Unknown).unwrap(), "\"na\"");
        let g: Gender = serde_json::from_str("\"male\"").unwrap();
        assert_eq!(g, Gender::Male);
    }

    #[test]
    fn invalid_enum_returns_error() {
        assert!(Gender::from_str("unknown").is_err());
        assert!(MaritalStatus::from_str("single").is_err());
        assert!(TriState::from_str("").is_err());
    }
}
