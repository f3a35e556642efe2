//! Patient record endpoints: create, list, detail, update.
//!
//! Create and update are separated by path and verb; the historical
//! "create upserts when the draft carries an id" behavior is gone. Every
//! write re-validates and re-normalizes server-side regardless of what
//! the client claims to have checked.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::AppState;
use crate::db;
use crate::models::{PatientDraft, PatientRecord};
use crate::normalize;

pub(crate) fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|e| ApiError::InvalidId(format!("Invalid patient ID: {e}")))
}

/// `POST /api/patient-history` — create a record from an intake draft.
pub async fn create(
    State(state): State<AppState>,
    Json(draft): Json<PatientDraft>,
) -> Result<(StatusCode, Json<PatientRecord>), ApiError> {
    if draft.id.is_some() {
        return Err(ApiError::UseUpdate);
    }

    let now = db::storage_now();
    let record = normalize::validated_record(&draft, Uuid::new_v4(), now, now)?;

    let conn = state.open_db()?;
    db::insert_patient(&conn, &record)?;
    tracing::info!(id = %record.id, "patient record created");

    Ok((StatusCode::CREATED, Json(record)))
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
}

/// `GET /api/patients` — every record, optionally narrowed by a
/// case-insensitive substring over name, city and gender. The filter
/// runs over the fetched list; volumes here are front-desk sized.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<PatientRecord>>, ApiError> {
    let conn = state.open_db()?;
    let mut patients = db::list_patients(&conn)?;

    if let Some(needle) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let needle = needle.to_lowercase();
        patients.retain(|p| {
            let full_name = format!("{} {}", p.first_name, p.last_name).to_lowercase();
            full_name.contains(&needle)
                || p.city.to_lowercase().contains(&needle)
                || p.gender.as_str().contains(&needle)
        });
    }

    Ok(Json(patients))
}

/// `GET /api/patient/:id` — one record or 404.
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PatientRecord>, ApiError> {
    let id = parse_id(&id)?;
    let conn = state.open_db()?;
    let record = db::get_patient(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Patient not found.".into()))?;
    Ok(Json(record))
}

/// `PUT /api/patient/:id` — full replacement of a record's fields.
/// Identity and creation time survive; everything else comes from the
/// draft after validation and normalization.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(draft): Json<PatientDraft>,
) -> Result<Json<PatientRecord>, ApiError> {
    let id = parse_id(&id)?;
    let conn = state.open_db()?;
    let existing = db::get_patient(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Patient not found.".into()))?;

    let record =
        normalize::validated_record(&draft, existing.id, existing.created_at, db::storage_now())?;
    db::update_patient(&conn, &record)?;
    tracing::info!(id = %record.id, "patient record updated");

    Ok(Json(record))
}
