use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use rusqlite::{params, Connection};
use uuid::Uuid;

use super::DatabaseError;
use crate::models::enums::*;
use crate::models::{FemaleHistory, PatientRecord};

/// Storage format for the created_at / updated_at columns.
const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current UTC time at storage precision (whole seconds), so a record
/// read back compares equal to the one written.
pub fn storage_now() -> NaiveDateTime {
    let now = chrono::Utc::now().naive_utc();
    now.with_nanosecond(0).unwrap_or(now)
}

const PATIENT_COLUMNS: &str = "id, first_name, last_name, phone, city, occupation, \
     marital_status, spouse_name, age, gender, birth_date, photo, allergic, allergies, \
     medical_history, period_type, still_having_periods, difficulty_with_periods, \
     pregnancies, births, miscarriages, abortions, leakage_of_urine, leakage_description, \
     pelvic_pain, pelvic_description, abnormal_discharge, abnormal_discharge_description, \
     abnormal_pap_smear, abnormal_pap_smear_description, created_at, updated_at";

// ═══════════════════════════════════════════
// Patient Repository
// ═══════════════════════════════════════════

pub fn insert_patient(conn: &Connection, record: &PatientRecord) -> Result<(), DatabaseError> {
    let f = record.female.as_ref();
    conn.execute(
        &format!(
            "INSERT INTO patients ({PATIENT_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16,
             ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28, ?29, ?30, ?31, ?32)"
        ),
        params![
            record.id.to_string(),
            record.first_name,
            record.last_name,
            record.phone,
            record.city,
            record.occupation,
            record.marital_status.as_str(),
            record.spouse_name,
            record.age,
            record.gender.as_str(),
            record.birth_date.to_string(),
            record.photo,
            record.allergic as i32,
            record.allergies,
            history_json(&record.medical_history)?,
            f.map(|f| f.period_type.as_str()),
            f.map(|f| f.still_having_periods.as_str()),
            f.map(|f| f.difficulty_with_periods.as_str()),
            f.map(|f| f.pregnancies),
            f.map(|f| f.births),
            f.map(|f| f.miscarriages),
            f.map(|f| f.abortions),
            f.map(|f| f.leakage_of_urine.as_str()),
            f.map_or("", |f| f.leakage_description.as_str()),
            f.map(|f| f.pelvic_pain.as_str()),
            f.map_or("", |f| f.pelvic_description.as_str()),
            f.map(|f| f.abnormal_discharge.as_str()),
            f.map_or("", |f| f.abnormal_discharge_description.as_str()),
            f.map(|f| f.abnormal_pap_smear.as_str()),
            f.map_or("", |f| f.abnormal_pap_smear_description.as_str()),
            record.created_at.format(TS_FORMAT).to_string(),
            record.updated_at.format(TS_FORMAT).to_string(),
        ],
    )?;
    Ok(())
}

/// Full replacement of a record's fields; identity and created_at never
/// change. Errors with `NotFound` when the id does not resolve.
pub fn update_patient(conn: &Connection, record: &PatientRecord) -> Result<(), DatabaseError> {
    let f = record.female.as_ref();
    let changed = conn.execute(
        "UPDATE patients SET first_name = ?2, last_name = ?3, phone = ?4, city = ?5,
         occupation = ?6, marital_status = ?7, spouse_name = ?8, age = ?9, gender = ?10,
         birth_date = ?11, photo = ?12, allergic = ?13, allergies = ?14, medical_history = ?15,
         period_type = ?16, still_having_periods = ?17, difficulty_with_periods = ?18,
         pregnancies = ?19, births = ?20, miscarriages = ?21, abortions = ?22,
         leakage_of_urine = ?23, leakage_description = ?24, pelvic_pain = ?25,
         pelvic_description = ?26, abnormal_discharge = ?27,
         abnormal_discharge_description = ?28, abnormal_pap_smear = ?29,
         abnormal_pap_smear_description = ?30, updated_at = ?31
         WHERE id = ?1",
        params![
            record.id.to_string(),
            record.first_name,
            record.last_name,
            record.phone,
            record.city,
            record.occupation,
            record.marital_status.as_str(),
            record.spouse_name,
            record.age,
            record.gender.as_str(),
            record.birth_date.to_string(),
            record.photo,
            record.allergic as i32,
            record.allergies,
            history_json(&record.medical_history)?,
            f.map(|f| f.period_type.as_str()),
            f.map(|f| f.still_having_periods.as_str()),
            f.map(|f| f.difficulty_with_periods.as_str()),
            f.map(|f| f.pregnancies),
            f.map(|f| f.births),
            f.map(|f| f.miscarriages),
            f.map(|f| f.abortions),
            f.map(|f| f.leakage_of_urine.as_str()),
            f.map_or("", |f| f.leakage_description.as_str()),
            f.map(|f| f.pelvic_pain.as_str()),
            f.map_or("", |f| f.pelvic_description.as_str()),
            f.map(|f| f.abnormal_discharge.as_str()),
            f.map_or("", |f| f.abnormal_discharge_description.as_str()),
            f.map(|f| f.abnormal_pap_smear.as_str()),
            f.map_or("", |f| f.abnormal_pap_smear_description.as_str()),
            record.updated_at.format(TS_FORMAT).to_string(),
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "patient".into(),
            id: record.id.to_string(),
        });
    }
    Ok(())
}

pub fn get_patient(conn: &Connection, id: &Uuid) -> Result<Option<PatientRecord>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PATIENT_COLUMNS} FROM patients WHERE id = ?1"
    ))?;

    let result = stmt.query_row(params![id.to_string()], read_row);

    match result {
        Ok(row) => Ok(Some(patient_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Every record, unfiltered. Acceptable only at front-desk volumes;
/// substring filtering happens over this list in the handler.
pub fn list_patients(conn: &Connection) -> Result<Vec<PatientRecord>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PATIENT_COLUMNS} FROM patients ORDER BY created_at, id"
    ))?;

    let rows = stmt.query_map([], read_row)?;

    let mut patients = Vec::new();
    for row in rows {
        patients.push(patient_from_row(row?)?);
    }
    Ok(patients)
}

pub fn count_patients(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM patients", [], |row| row.get(0))?;
    Ok(count)
}

// Internal row type for Patient mapping
struct PatientRow {
    id: String,
    first_name: String,
    last_name: String,
    phone: String,
    city: String,
    occupation: String,
    marital_status: String,
    spouse_name: String,
    age: i64,
    gender: String,
    birth_date: String,
    photo: Option<String>,
    allergic: i32,
    allergies: String,
    medical_history: String,
    period_type: Option<String>,
    still_having_periods: Option<String>,
    difficulty_with_periods: Option<String>,
    pregnancies: Option<i64>,
    births: Option<i64>,
    miscarriages: Option<i64>,
    abortions: Option<i64>,
    leakage_of_urine: Option<String>,
    leakage_description: String,
    pelvic_pain: Option<String>,
    pelvic_description: String,
    abnormal_discharge: Option<String>,
    abnormal_discharge_description: String,
    abnormal_pap_smear: Option<String>,
    abnormal_pap_smear_description: String,
    created_at: String,
    updated_at: String,
}

fn read_row(row: &rusqlite::Row<'_>) -> Result<PatientRow, rusqlite::Error> {
    Ok(PatientRow {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        phone: row.get(3)?,
        city: row.get(4)?,
        occupation: row.get(5)?,
        marital_status: row.get(6)?,
        spouse_name: row.get(7)?,
        age: row.get(8)?,
        gender: row.get(9)?,
        birth_date: row.get(10)?,
        photo: row.get(11)?,
        allergic: row.get(12)?,
        allergies: row.get(13)?,
        medical_history: row.get(14)?,
        period_type: row.get(15)?,
        still_having_periods: row.get(16)?,
        difficulty_with_periods: row.get(17)?,
        pregnancies: row.get(18)?,
        births: row.get(19)?,
        miscarriages: row.get(20)?,
        abortions: row.get(21)?,
        leakage_of_urine: row.get(22)?,
        leakage_description: row.get(23)?,
        pelvic_pain: row.get(24)?,
        pelvic_description: row.get(25)?,
        abnormal_discharge: row.get(26)?,
        abnormal_discharge_description: row.get(27)?,
        abnormal_pap_smear: row.get(28)?,
        abnormal_pap_smear_description: row.get(29)?,
        created_at: row.get(30)?,
        updated_at: row.get(31)?,
    })
}

fn patient_from_row(row: PatientRow) -> Result<PatientRecord, DatabaseError> {
    let gender = Gender::from_str(&row.gender)?;

    let female = if gender == Gender::Female {
        Some(FemaleHistory {
            period_type: PeriodType::from_str(&required(row.period_type, "period_type")?)?,
            still_having_periods: TriState::from_str(&required(
                row.still_having_periods,
                "still_having_periods",
            )?)?,
            difficulty_with_periods: PeriodDifficulty::from_str(&required(
                row.difficulty_with_periods,
                "difficulty_with_periods",
            )?)?,
            pregnancies: count_column(row.pregnancies),
            births: count_column(row.births),
            miscarriages: count_column(row.miscarriages),
            abortions: count_column(row.abortions),
            leakage_of_urine: TriState::from_str(&required(
                row.leakage_of_urine,
                "leakage_of_urine",
            )?)?,
            leakage_description: row.leakage_description,
            pelvic_pain: TriState::from_str(&required(row.pelvic_pain, "pelvic_pain")?)?,
            pelvic_description: row.pelvic_description,
            abnormal_discharge: TriState::from_str(&required(
                row.abnormal_discharge,
                "abnormal_discharge",
            )?)?,
            abnormal_discharge_description: row.abnormal_discharge_description,
            abnormal_pap_smear: TriState::from_str(&required(
                row.abnormal_pap_smear,
                "abnormal_pap_smear",
            )?)?,
            abnormal_pap_smear_description: row.abnormal_pap_smear_description,
        })
    } else {
        None
    };

    Ok(PatientRecord {
        id: Uuid::parse_str(&row.id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        first_name: row.first_name,
        last_name: row.last_name,
        phone: row.phone,
        city: row.city,
        occupation: row.occupation,
        marital_status: MaritalStatus::from_str(&row.marital_status)?,
        spouse_name: row.spouse_name,
        age: row.age.max(0) as u32,
        gender,
        birth_date: NaiveDate::parse_from_str(&row.birth_date, "%Y-%m-%d")
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        photo: row.photo,
        allergic: row.allergic != 0,
        allergies: row.allergies,
        medical_history: serde_json::from_str(&row.medical_history)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        female,
        created_at: parse_ts(&row.created_at),
        updated_at: parse_ts(&row.updated_at),
    })
}

fn history_json(history: &[String]) -> Result<String, DatabaseError> {
    serde_json::to_string(history).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}

fn required(value: Option<String>, column: &str) -> Result<String, DatabaseError> {
    value.ok_or_else(|| {
        DatabaseError::ConstraintViolation(format!("female record missing {column}"))
    })
}

fn count_column(value: Option<i64>) -> u32 {
    value.and_then(|n| u32::try_from(n).ok()).unwrap_or(0)
}

fn parse_ts(raw: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(raw, TS_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .unwrap_or_default()
}
