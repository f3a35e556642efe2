//! The patient record: persisted shape, female-only sub-record, and the
//! lenient wire draft submitted by the intake and edit forms.
//!
//! The draft never trusts the client: counters arrive as numbers or
//! strings, the history list as an array or a comma-joined string,
//! tri-states as booleans or strings. `validation::validate` and
//! `normalize::normalize_draft` are the only paths from draft to record.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{Gender, MaritalStatus, PeriodDifficulty, PeriodType, TriState};

/// Canonical persisted patient record.
///
/// `female` is `Some` exactly when `gender == Female`; the type makes the
/// "female-only fields absent otherwise" invariant structural. On the wire
/// the sub-record is flattened so documents keep the original flat shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRecord {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub city: String,
    pub occupation: String,
    pub marital_status: MaritalStatus,
    pub spouse_name: String,
    pub age: u32,
    pub gender: Gender,
    pub birth_date: NaiveDate,
    pub photo: Option<String>,
    pub allergic: bool,
    pub allergies: String,
    pub medical_history: Vec<String>,
    #[serde(flatten)]
    pub female: Option<FemaleHistory>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Gender-conditional portion of the record.
///
/// Each symptom description is non-empty only when its paired flag is
/// `Yes`; normalization clears the rest before persisting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FemaleHistory {
    pub period_type: PeriodType,
    pub still_having_periods: TriState,
    pub difficulty_with_periods: PeriodDifficulty,
    pub pregnancies: u32,
    pub births: u32,
    pub miscarriages: u32,
    pub abortions: u32,
    pub leakage_of_urine: TriState,
    pub leakage_description: String,
    pub pelvic_pain: TriState,
    pub pelvic_description: String,
    pub abnormal_discharge: TriState,
    pub abnormal_discharge_description: String,
    pub abnormal_pap_smear: TriState,
    pub abnormal_pap_smear_description: String,
}

// ─── Wire ingress helpers ─────────────────────────────────────────────────────

/// A count submitted as a JSON number or a string ("3", "").
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CountField {
    Int(i64),
    Float(f64),
    Text(String),
}

impl CountField {
    /// True when the submitted value is blank (empty or whitespace string).
    pub fn is_blank(&self) -> bool {
        matches!(self, CountField::Text(s) if s.trim().is_empty())
    }

    /// Strict parse for validation: an integer >= 0, or None.
    pub fn as_count(&self) -> Option<i64> {
        let n = match self {
            CountField::Int(n) => *n,
            CountField::Float(f) if f.fract() == 0.0 => *f as i64,
            CountField::Float(_) => return None,
            CountField::Text(s) => s.trim().parse().ok()?,
        };
        (n >= 0).then_some(n)
    }
}

/// A tri-state flag submitted as a boolean or a string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TriStateField {
    Bool(bool),
    Text(String),
}

impl TriStateField {
    pub fn is_blank(&self) -> bool {
        matches!(self, TriStateField::Text(s) if s.trim().is_empty())
    }

    /// Lenient decode via the canonical `TriState` ingress.
    pub fn decode(&self) -> TriState {
        match self {
            TriStateField::Bool(b) => TriState::decode_bool(*b),
            TriStateField::Text(s) => TriState::decode_str(s.trim()),
        }
    }
}

/// A string list submitted either as a JSON array or comma-joined.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum StringListField {
    List(Vec<String>),
    Joined(String),
}

/// The in-memory draft of a record being composed or edited.
///
/// Every field is optional; `validation::validate` decides what a missing
/// field means. Field names match the original wire format.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientDraft {
    /// Rejected on create; updates carry the identifier in the path.
    pub id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub occupation: Option<String>,
    pub marital_status: Option<String>,
    pub spouse_name: Option<String>,
    pub age: Option<CountField>,
    pub gender: Option<String>,
    pub birth_date: Option<String>,
    pub photo: Option<String>,
    pub allergic: Option<bool>,
    pub allergies: Option<String>,
    pub medical_history: Option<StringListField>,
    pub period_type: Option<String>,
    pub still_having_periods: Option<TriStateField>,
    pub difficulty_with_periods: Option<String>,
    pub pregnancies: Option<CountField>,
    pub births: Option<CountField>,
    pub miscarriages: Option<CountField>,
    pub abortions: Option<CountField>,
    pub leakage_of_urine: Option<TriStateField>,
    pub leakage_description: Option<String>,
    pub pelvic_pain: Option<TriStateField>,
    pub pelvic_description: Option<String>,
    pub abnormal_discharge: Option<TriStateField>,
    pub abnormal_discharge_description: Option<String>,
    pub abnormal_pap_smear: Option<TriStateField>,
    pub abnormal_pap_smear_description: Option<String>,
}
