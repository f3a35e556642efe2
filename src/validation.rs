//! Validation policy for patient drafts.
//!
//! Fail-fast: checks run in field-declaration order and stop at the first
//! violation, surfacing one message at a time. The same policy runs on
//! every create and update; the server never trusts client-side checks.

use std::str::FromStr;

use base64::Engine;
use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{
    CountField, Gender, MaritalStatus, PatientDraft, PeriodDifficulty, PeriodType, TriState,
    TriStateField,
};
use crate::normalize;

/// Maximum accepted decoded photo size (the intake form caps uploads at 2 MB).
pub const MAX_PHOTO_BYTES: usize = 2 * 1024 * 1024;

/// A single field violation. Blocks the write entirely; nothing reaches
/// the storage layer on failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Wire name of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a draft for creation or update.
///
/// Returns the first violation found, in this order: required demographics,
/// phone shape, field formats, allergy description, then the female-only
/// chain (each symptom description checked right after its own flag).
pub fn validate(draft: &PatientDraft) -> Result<(), ValidationError> {
    // Required demographics. Numeric 0 is valid; blank is not.
    let required: [(&'static str, &str, bool); 10] = [
        ("firstName", "First Name", text(&draft.first_name).is_some()),
        ("lastName", "Last Name", text(&draft.last_name).is_some()),
        ("phone", "Phone", text(&draft.phone).is_some()),
        ("occupation", "Occupation", text(&draft.occupation).is_some()),
        (
            "maritalStatus",
            "Marital Status",
            text(&draft.marital_status).is_some(),
        ),
        ("spouseName", "Spouse Name", text(&draft.spouse_name).is_some()),
        ("city", "City", text(&draft.city).is_some()),
        ("age", "Age", count_present(&draft.age)),
        ("gender", "Gender", text(&draft.gender).is_some()),
        ("birthDate", "Birth Date", text(&draft.birth_date).is_some()),
    ];
    for (field, name, present) in required {
        if !present {
            return Err(ValidationError::new(
                field,
                format!("Please fill the {name} field."),
            ));
        }
    }

    // Phone: exactly 10 digits after stripping everything else.
    let digits = normalize::digits_only(draft.phone.as_deref().unwrap_or_default());
    if digits.len() != 10 {
        return Err(ValidationError::new(
            "phone",
            "Phone number must be exactly 10 digits.",
        ));
    }

    // Format checks the original left to the database schema.
    let gender = parse_gender(draft)?;
    parse_marital_status(draft)?;
    parse_birth_date(draft)?;
    check_photo(draft)?;

    // Allergy description is meaningful only when the flag is set.
    if draft.allergic.unwrap_or(false) && text(&draft.allergies).is_none() {
        return Err(ValidationError::new(
            "allergies",
            "Please describe the allergies.",
        ));
    }

    if gender == Gender::Female {
        validate_female(draft)?;
    }

    Ok(())
}

/// The gender-conditional chain, in form order. Each symptom pair is
/// checked as a unit: flag presence first, then its description when the
/// flag is "yes", before moving to the next pair.
fn validate_female(draft: &PatientDraft) -> Result<(), ValidationError> {
    if draft.period_type.as_deref().map_or(true, |s| s.trim().is_empty()) {
        return Err(ValidationError::new(
            "periodType",
            "Please select an option for Period Type.",
        ));
    }
    parse_period_type(draft)?;

    if tri_state(&draft.still_having_periods).is_none() {
        return Err(ValidationError::new(
            "stillHavingPeriods",
            "Please fill the Still having periods field.",
        ));
    }

    if draft
        .difficulty_with_periods
        .as_deref()
        .map_or(true, |s| s.trim().is_empty())
    {
        return Err(ValidationError::new(
            "difficultyWithPeriods",
            "Please select an option for Difficulty with periods.",
        ));
    }
    parse_difficulty(draft)?;

    let counters: [(&'static str, &str, &Option<CountField>); 4] = [
        ("pregnancies", "Pregnancies", &draft.pregnancies),
        ("births", "Births", &draft.births),
        ("miscarriages", "Miscarriages", &draft.miscarriages),
        ("abortions", "Abortions", &draft.abortions),
    ];
    for (field, name, value) in counters {
        let valid = value
            .as_ref()
            .filter(|v| !v.is_blank())
            .and_then(CountField::as_count)
            .is_some();
        if !valid {
            return Err(ValidationError::new(
                field,
                format!("Please enter a valid number (0 or more) for {name}."),
            ));
        }
    }

    let pairs: [(
        &'static str,
        &str,
        &Option<TriStateField>,
        &'static str,
        &Option<String>,
        &str,
    ); 4] = [
        (
            "leakageOfUrine",
            "Leakage of urine",
            &draft.leakage_of_urine,
            "leakageDescription",
            &draft.leakage_description,
            "Please describe the leakage of urine.",
        ),
        (
            "pelvicPain",
            "Pelvic pain",
            &draft.pelvic_pain,
            "pelvicDescription",
            &draft.pelvic_description,
            "Please describe the pelvic pain.",
        ),
        (
            "abnormalDischarge",
            "Abnormal discharge",
            &draft.abnormal_discharge,
            "abnormalDischargeDescription",
            &draft.abnormal_discharge_description,
            "Please describe the abnormal discharge.",
        ),
        (
            "abnormalPapSmear",
            "Abnormal Pap Smear",
            &draft.abnormal_pap_smear,
            "abnormalPapSmearDescription",
            &draft.abnormal_pap_smear_description,
            "Please describe the abnormal Pap Smear history.",
        ),
    ];
    for (flag_field, flag_name, flag, desc_field, desc, desc_message) in pairs {
        let Some(state) = tri_state(flag) else {
            return Err(ValidationError::new(
                flag_field,
                format!("Please fill the {flag_name} field."),
            ));
        };
        if state == TriState::Yes && text(desc).is_none() {
            return Err(ValidationError::new(desc_field, desc_message));
        }
    }

    Ok(())
}

// ─── Field parsers (shared with normalization) ────────────────────────────────

pub(crate) fn parse_gender(draft: &PatientDraft) -> Result<Gender, ValidationError> {
    let raw = draft.gender.as_deref().unwrap_or_default().trim();
    Gender::from_str(raw).map_err(|_| {
        ValidationError::new("gender", "Gender must be one of male, female or other.")
    })
}

pub(crate) fn parse_marital_status(draft: &PatientDraft) -> Result<MaritalStatus, ValidationError> {
    let raw = draft.marital_status.as_deref().unwrap_or_default().trim();
    MaritalStatus::from_str(raw).map_err(|_| {
        ValidationError::new(
            "maritalStatus",
            "Marital Status must be one of married, unmarried, divorced or widow.",
        )
    })
}

pub(crate) fn parse_birth_date(draft: &PatientDraft) -> Result<NaiveDate, ValidationError> {
    let raw = draft.birth_date.as_deref().unwrap_or_default().trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        ValidationError::new("birthDate", "Birth Date must be a valid YYYY-MM-DD date.")
    })
}

pub(crate) fn parse_period_type(draft: &PatientDraft) -> Result<PeriodType, ValidationError> {
    let raw = draft.period_type.as_deref().unwrap_or_default().trim();
    PeriodType::from_str(raw).map_err(|_| {
        ValidationError::new("periodType", "Period Type must be regular or irregular.")
    })
}

pub(crate) fn parse_difficulty(draft: &PatientDraft) -> Result<PeriodDifficulty, ValidationError> {
    let raw = draft
        .difficulty_with_periods
        .as_deref()
        .unwrap_or_default()
        .trim();
    PeriodDifficulty::from_str(raw).map_err(|_| {
        ValidationError::new(
            "difficultyWithPeriods",
            "Difficulty with periods must be no, moderate or severe.",
        )
    })
}

fn check_photo(draft: &PatientDraft) -> Result<(), ValidationError> {
    let Some(photo) = text(&draft.photo) else {
        return Ok(());
    };
    // Accept a bare payload or a data URL; the payload after "base64,"
    // must decode and stay under the size cap.
    let payload = photo.rsplit_once("base64,").map_or(photo, |(_, p)| p);
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|_| {
            ValidationError::new("photo", "Photo must be a base64-encoded image.")
        })?;
    if decoded.len() > MAX_PHOTO_BYTES {
        return Err(ValidationError::new(
            "photo",
            "Photo is too large. Please select an image under 2MB.",
        ));
    }
    Ok(())
}

// ─── Presence helpers ─────────────────────────────────────────────────────────

/// Trimmed non-empty text, or None for missing/blank.
fn text(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn count_present(value: &Option<CountField>) -> bool {
    value.as_ref().is_some_and(|v| !v.is_blank())
}

fn tri_state(value: &Option<TriStateField>) -> Option<TriState> {
    value
        .as_ref()
        .filter(|v| !v.is_blank())
        .map(|v| v.decode())
}
