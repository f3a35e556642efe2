//! Printable report endpoint.

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;

use crate::api::endpoints::patients::parse_id;
use crate::api::error::ApiError;
use crate::api::types::AppState;
use crate::db;
use crate::report;

/// `GET /api/patient/:id/report` — the record rendered as a printable PDF.
pub async fn patient_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    let conn = state.open_db()?;
    let record = db::get_patient(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Patient not found.".into()))?;

    let pdf = report::render_patient_pdf(&record)?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"patient-{}.pdf\"", record.id),
            ),
        ],
        pdf,
    ))
}
