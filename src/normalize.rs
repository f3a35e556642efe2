//! Normalization between storage, wire and display representations.
//!
//! `list_to_display` / `display_to_list` form a round-trip pair for lists
//! of non-empty trimmed strings. `coerce_count` is deliberately lossy:
//! unparseable or negative input becomes 0 by policy (silent correction,
//! not failure); it runs only after validation has accepted the draft.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use regex::Regex;
use uuid::Uuid;

use crate::models::{
    CountField, FemaleHistory, Gender, PatientDraft, PatientRecord, StringListField, TriState,
    TriStateField,
};
use crate::validation::{
    self, parse_birth_date, parse_difficulty, parse_gender, parse_marital_status,
    parse_period_type, ValidationError,
};

/// Sentinel shown wherever a value is missing or not applicable.
pub const NOT_AVAILABLE: &str = "N/A";

static NON_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\D").unwrap());

/// Display form of an optional value: missing/blank becomes the
/// "not available" marker, anything else passes through.
pub fn display_or_na(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Join a list for display / comma-joined storage.
pub fn list_to_display(items: &[String]) -> String {
    items.join(", ")
}

/// Split a comma-joined string back into a list: trim each element and
/// drop empties. Inverse of `list_to_display` for well-formed lists.
pub fn display_to_list(joined: &str) -> Vec<String> {
    joined
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Strip everything but ASCII digits (phone canonical form).
pub fn digits_only(raw: &str) -> String {
    NON_DIGITS.replace_all(raw, "").into_owned()
}

/// Lossy count coercion: parse to a non-negative integer, substituting 0
/// on any failure or negative result.
pub fn coerce_count(value: Option<&CountField>) -> u32 {
    value
        .and_then(CountField::as_count)
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(0)
}

/// Calendar age at `today` for someone born on `birth`. Clamps to 0 for
/// future birth dates.
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> u32 {
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age.max(0) as u32
}

/// Shape a validated draft into the canonical record.
///
/// Applies every shaping rule in one place: trimming, phone digit
/// stripping, allergy clearing, history list normalization, the
/// gender-conditional clearing of female-only fields, symptom-description
/// clearing for non-"yes" flags, and authoritative age derivation from
/// the birth date (`now` supplies "today").
///
/// Callers pass the existing `id`/`created_at` on update, fresh values on
/// create; identity never changes here.
pub fn normalize_draft(
    draft: &PatientDraft,
    id: Uuid,
    created_at: NaiveDateTime,
    now: NaiveDateTime,
) -> Result<PatientRecord, ValidationError> {
    let gender = parse_gender(draft)?;
    let birth_date = parse_birth_date(draft)?;
    let allergic = draft.allergic.unwrap_or(false);

    let female = if gender == Gender::Female {
        Some(FemaleHistory {
            period_type: parse_period_type(draft)?,
            still_having_periods: decode_tri(&draft.still_having_periods),
            difficulty_with_periods: parse_difficulty(draft)?,
            pregnancies: coerce_count(draft.pregnancies.as_ref()),
            births: coerce_count(draft.births.as_ref()),
            miscarriages: coerce_count(draft.miscarriages.as_ref()),
            abortions: coerce_count(draft.abortions.as_ref()),
            leakage_of_urine: decode_tri(&draft.leakage_of_urine),
            leakage_description: description_for(
                decode_tri(&draft.leakage_of_urine),
                &draft.leakage_description,
            ),
            pelvic_pain: decode_tri(&draft.pelvic_pain),
            pelvic_description: description_for(
                decode_tri(&draft.pelvic_pain),
                &draft.pelvic_description,
            ),
            abnormal_discharge: decode_tri(&draft.abnormal_discharge),
            abnormal_discharge_description: description_for(
                decode_tri(&draft.abnormal_discharge),
                &draft.abnormal_discharge_description,
            ),
            abnormal_pap_smear: decode_tri(&draft.abnormal_pap_smear),
            abnormal_pap_smear_description: description_for(
                decode_tri(&draft.abnormal_pap_smear),
                &draft.abnormal_pap_smear_description,
            ),
        })
    } else {
        None
    };

    Ok(PatientRecord {
        id,
        first_name: trimmed(&draft.first_name),
        last_name: trimmed(&draft.last_name),
        phone: digits_only(draft.phone.as_deref().unwrap_or_default()),
        city: trimmed(&draft.city),
        occupation: trimmed(&draft.occupation),
        marital_status: parse_marital_status(draft)?,
        spouse_name: trimmed(&draft.spouse_name),
        age: age_on(birth_date, now.date()),
        gender,
        birth_date,
        photo: draft
            .photo
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        allergic,
        allergies: if allergic {
            trimmed(&draft.allergies)
        } else {
            String::new()
        },
        medical_history: history_list(draft.medical_history.as_ref()),
        female,
        created_at,
        updated_at: now,
    })
}

/// Validate then normalize, the only path a write handler should take.
pub fn validated_record(
    draft: &PatientDraft,
    id: Uuid,
    created_at: NaiveDateTime,
    now: NaiveDateTime,
) -> Result<PatientRecord, ValidationError> {
    validation::validate(draft)?;
    normalize_draft(draft, id, created_at, now)
}

/// History list from either wire shape: array, or comma-joined string.
pub fn history_list(value: Option<&StringListField>) -> Vec<String> {
    match value {
        None => Vec::new(),
        Some(StringListField::List(items)) => items
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Some(StringListField::Joined(joined)) => display_to_list(joined),
    }
}

fn decode_tri(value: &Option<TriStateField>) -> TriState {
    value
        .as_ref()
        .map(TriStateField::decode)
        .unwrap_or(TriState::Unknown)
}

/// A symptom description is kept only when its paired flag is "yes".
fn description_for(flag: TriState, description: &Option<String>) -> String {
    if flag == TriState::Yes {
        trimmed(description)
    } else {
        String::new()
    }
}

fn trimmed(value: &Option<String>) -> String {
    value.as_deref().unwrap_or_default().trim().to_string()
}
