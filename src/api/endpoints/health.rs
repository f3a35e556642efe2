//! Liveness endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::AppState;
use crate::config;
use crate::db;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub patients: i64,
}

/// `GET /api/health`
pub async fn check(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let conn = state.open_db()?;
    let patients = db::count_patients(&conn)?;
    Ok(Json(HealthResponse {
        status: "ok",
        version: config::APP_VERSION,
        patients,
    }))
}
