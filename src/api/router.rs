//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`. CORS is open: the intake and report
//! views are served from a separate origin, as in the original deployment.

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::types::AppState;

/// Build the records API router.
///
/// NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
pub fn records_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/patient-history", post(endpoints::patients::create))
        .route("/patients", get(endpoints::patients::list))
        .route("/patient/:id", get(endpoints::patients::detail))
        .route("/patient/:id", put(endpoints::patients::update))
        .route(
            "/patient/:id/report",
            get(endpoints::reports::patient_report),
        )
        .with_state(state);

    Router::new().nest("/api", api).layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    /// Router backed by a fresh on-disk database in a temp dir.
    /// The tempdir guard must be kept alive for the duration of the test.
    fn test_app() -> (Router, tempfile::TempDir) {
        let tmp = tempfile::tempdir().unwrap();
        let state = AppState::new(tmp.path().join("records.db"));
        (records_router(state), tmp)
    }

    fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder().method(method).uri(uri);
        match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn male_draft() -> Value {
        json!({
            "firstName": "Ravi",
            "lastName": "Kumar",
            "phone": "9876543210",
            "city": "Delhi",
            "occupation": "Driver",
            "maritalStatus": "married",
            "spouseName": "Sita",
            "age": 40,
            "gender": "male",
            "birthDate": "1985-01-15",
            "medicalHistory": ["Asthma", "Diabetes"]
        })
    }

    fn female_draft() -> Value {
        let mut draft = male_draft();
        for (key, value) in [
            ("firstName", json!("Asha")),
            ("gender", json!("female")),
            ("birthDate", json!("1994-05-12")),
            ("periodType", json!("regular")),
            ("stillHavingPeriods", json!("yes")),
            ("difficultyWithPeriods", json!("no")),
            ("pregnancies", json!(2)),
            ("births", json!("2")),
            ("miscarriages", json!(0)),
            ("abortions", json!(0)),
            ("leakageOfUrine", json!("no")),
            ("pelvicPain", json!("no")),
            ("abnormalDischarge", json!("no")),
            ("abnormalPapSmear", json!("no")),
        ] {
            draft[key] = value;
        }
        draft
    }

    async fn create(app: &Router, draft: Value) -> Value {
        let response = app
            .clone()
            .oneshot(request("POST", "/api/patient-history", Some(draft)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await
    }

    #[tokio::test]
    async fn create_returns_201_with_record() {
        let (app, _tmp) = test_app();
        let record = create(&app, male_draft()).await;
        assert!(record["id"].is_string());
        assert_eq!(record["firstName"], "Ravi");
        // Age is recomputed from the birth date, not taken from the draft.
        assert!(record["age"].as_u64().unwrap() >= 40);
        assert_eq!(record["medicalHistory"], json!(["Asthma", "Diabetes"]));
    }

    #[tokio::test]
    async fn create_with_id_is_rejected() {
        let (app, _tmp) = test_app();
        let mut draft = male_draft();
        draft["id"] = json!("0b6e6937-4a28-4d12-9a30-6a79b2a80a10");
        let response = app
            .clone()
            .oneshot(request("POST", "/api/patient-history", Some(draft)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "USE_UPDATE");
    }

    #[tokio::test]
    async fn create_rejects_short_phone() {
        let (app, _tmp) = test_app();
        let mut draft = male_draft();
        draft["phone"] = json!("12345");
        let response = app
            .clone()
            .oneshot(request("POST", "/api/patient-history", Some(draft)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION");
        assert_eq!(body["error"]["field"], "phone");
    }

    #[tokio::test]
    async fn create_rejects_missing_leakage_description() {
        let (app, _tmp) = test_app();
        let mut draft = female_draft();
        draft["leakageOfUrine"] = json!("yes");
        draft["leakageDescription"] = json!("");
        let response = app
            .clone()
            .oneshot(request("POST", "/api/patient-history", Some(draft)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["field"], "leakageDescription");
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("leakage"));
    }

    #[tokio::test]
    async fn male_draft_with_period_type_persists_without_it() {
        let (app, _tmp) = test_app();
        let mut draft = male_draft();
        draft["periodType"] = json!("regular");
        let record = create(&app, draft).await;
        assert!(record.get("periodType").is_none());

        // And it stays cleared on read-back.
        let id = record["id"].as_str().unwrap();
        let response = app
            .clone()
            .oneshot(request("GET", &format!("/api/patient/{id}"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let fetched = body_json(response).await;
        assert!(fetched.get("periodType").is_none());
    }

    #[tokio::test]
    async fn history_string_is_normalized_to_array() {
        let (app, _tmp) = test_app();
        let mut draft = male_draft();
        draft["medicalHistory"] = json!("Asthma, Diabetes, ");
        let record = create(&app, draft).await;
        assert_eq!(record["medicalHistory"], json!(["Asthma", "Diabetes"]));
    }

    #[tokio::test]
    async fn list_returns_all_records() {
        let (app, _tmp) = test_app();
        create(&app, male_draft()).await;
        create(&app, female_draft()).await;

        let response = app
            .clone()
            .oneshot(request("GET", "/api/patients", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn list_search_filters_by_substring() {
        let (app, _tmp) = test_app();
        create(&app, male_draft()).await;
        create(&app, female_draft()).await;

        let response = app
            .clone()
            .oneshot(request("GET", "/api/patients?search=asha", None))
            .await
            .unwrap();
        let body = body_json(response).await;
        let matches = body.as_array().unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0]["firstName"], "Asha");

        // City substring matches too.
        let response = app
            .clone()
            .oneshot(request("GET", "/api/patients?search=delhi", None))
            .await
            .unwrap();
        assert_eq!(body_json(response).await.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn detail_unknown_id_is_404() {
        let (app, _tmp) = test_app();
        let response = app
            .clone()
            .oneshot(request(
                "GET",
                "/api/patient/0b6e6937-4a28-4d12-9a30-6a79b2a80a10",
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn detail_malformed_id_is_400() {
        let (app, _tmp) = test_app();
        let response = app
            .clone()
            .oneshot(request("GET", "/api/patient/not-a-uuid", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "INVALID_ID");
    }

    #[tokio::test]
    async fn update_replaces_record() {
        let (app, _tmp) = test_app();
        let record = create(&app, female_draft()).await;
        let id = record["id"].as_str().unwrap().to_string();

        let mut draft = female_draft();
        draft["city"] = json!("Mumbai");
        let response = app
            .clone()
            .oneshot(request("PUT", &format!("/api/patient/{id}"), Some(draft)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let updated = body_json(response).await;
        assert_eq!(updated["id"], record["id"]);
        assert_eq!(updated["city"], "Mumbai");
        assert_eq!(updated["createdAt"], record["createdAt"]);
    }

    #[tokio::test]
    async fn update_revalidates_server_side() {
        let (app, _tmp) = test_app();
        let record = create(&app, male_draft()).await;
        let id = record["id"].as_str().unwrap().to_string();

        let mut draft = male_draft();
        draft["firstName"] = json!("");
        let response = app
            .clone()
            .oneshot(request("PUT", &format!("/api/patient/{id}"), Some(draft)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION");
        assert_eq!(body["error"]["field"], "firstName");
    }

    #[tokio::test]
    async fn update_unknown_id_is_404() {
        let (app, _tmp) = test_app();
        let response = app
            .clone()
            .oneshot(request(
                "PUT",
                "/api/patient/0b6e6937-4a28-4d12-9a30-6a79b2a80a10",
                Some(male_draft()),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn gender_change_on_update_clears_female_fields() {
        let (app, _tmp) = test_app();
        let record = create(&app, female_draft()).await;
        assert_eq!(record["periodType"], "regular");
        let id = record["id"].as_str().unwrap().to_string();

        let mut draft = female_draft();
        draft["gender"] = json!("male");
        let response = app
            .clone()
            .oneshot(request("PUT", &format!("/api/patient/{id}"), Some(draft)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let updated = body_json(response).await;
        assert!(updated.get("periodType").is_none());
    }

    #[tokio::test]
    async fn report_returns_pdf() {
        let (app, _tmp) = test_app();
        let record = create(&app, female_draft()).await;
        let id = record["id"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(request("GET", &format!("/api/patient/{id}/report"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/pdf"
        );
        let bytes = to_bytes(response.into_body(), 10 * 1024 * 1024)
            .await
            .unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn health_reports_record_count() {
        let (app, _tmp) = test_app();
        create(&app, male_draft()).await;

        let response = app
            .clone()
            .oneshot(request("GET", "/api/health", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["patients"], 1);
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let (app, _tmp) = test_app();
        let response = app
            .clone()
            .oneshot(request("GET", "/nonexistent", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
