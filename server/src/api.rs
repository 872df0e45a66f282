use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use shared::{
    leaderboard,
    protocol::{ErrorBody, ResultRecord, ResultSubmission, SaveResponse},
};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::store::{ResultStore, StoreError};

const MAX_FIELD_LEN: usize = 100;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid result")]
    Validation(String),
    #[error("Error saving result")]
    Save(#[source] StoreError),
    #[error("Error fetching results")]
    Fetch(#[source] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            ApiError::Validation(reason) => (StatusCode::BAD_REQUEST, reason.clone()),
            ApiError::Save(e) | ApiError::Fetch(e) => {
                error!("{}: {:?}", self, e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };
        let body = ErrorBody {
            message: self.to_string(),
            error: detail,
        };
        (status, Json(body)).into_response()
    }
}

pub fn router(store: ResultStore) -> Router {
    Router::new()
        .route("/api/results", get(list_results).post(save_result))
        .route("/api/leaderboard", get(top_results))
        .with_state(store)
}

async fn save_result(
    State(store): State<ResultStore>,
    payload: Result<Json<ResultSubmission>, JsonRejection>,
) -> Result<(StatusCode, Json<SaveResponse>), ApiError> {
    let Json(submission) = payload.map_err(|e| ApiError::Validation(e.body_text()))?;
    let submission = validate(submission).inspect_err(|e| {
        if let ApiError::Validation(reason) = e {
            warn!("rejected_result reason = {}", reason);
        }
    })?;

    let result = store.insert(submission).await.map_err(ApiError::Save)?;
    info!(
        "result_saved id = {} name = {} wpm = {}",
        result.id, result.name, result.results.wpm
    );
    Ok((
        StatusCode::CREATED,
        Json(SaveResponse {
            message: "Result saved successfully".to_string(),
            result,
        }),
    ))
}

async fn list_results(State(store): State<ResultStore>) -> Result<Json<Vec<ResultRecord>>, ApiError> {
    let results = store.recent().await.map_err(ApiError::Fetch)?;
    Ok(Json(results))
}

#[derive(Debug, Deserialize)]
struct LeaderboardParams {
    limit: Option<usize>,
}

async fn top_results(
    State(store): State<ResultStore>,
    Query(params): Query<LeaderboardParams>,
) -> Result<Json<Vec<ResultRecord>>, ApiError> {
    let limit = leaderboard::clamp_limit(params.limit);
    let results = store.leaderboard(limit).await.map_err(ApiError::Fetch)?;
    Ok(Json(results))
}

fn validate(mut submission: ResultSubmission) -> Result<ResultSubmission, ApiError> {
    submission.name = required_field("name", &submission.name)?;
    submission.usn = required_field("usn", &submission.usn)?;

    let r = &submission.results;
    for (field, value) in [("wpm", r.wpm), ("cpm", r.cpm), ("accuracy", r.accuracy), ("error", r.error)] {
        if !value.is_finite() || value < 0.0 {
            return Err(ApiError::Validation(format!(
                "{field} must be a non-negative number"
            )));
        }
    }
    for (field, value) in [("accuracy", r.accuracy), ("error", r.error)] {
        if value > 100.0 {
            return Err(ApiError::Validation(format!("{field} must be at most 100")));
        }
    }
    Ok(submission)
}

fn required_field(field: &str, value: &str) -> Result<String, ApiError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ApiError::Validation(format!("{field} is required")));
    }
    if value.chars().count() > MAX_FIELD_LEN {
        return Err(ApiError::Validation(format!(
            "{field} must be at most {MAX_FIELD_LEN} characters"
        )));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn submission(name: &str, wpm: f64, accuracy: f64) -> Value {
        json!({
            "name": name,
            "usn": format!("1AB{name}"),
            "results": {
                "wpm": wpm,
                "cpm": wpm * 5.0,
                "accuracy": accuracy,
                "error": 100.0 - accuracy,
                "totalTime": 30000,
                "totalCharacters": 120
            }
        })
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post(body: &Value) -> Request<Body> {
        Request::post("/api/results")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_save_then_list_newest_first() {
        let app = router(ResultStore::memory());

        let (status, body) = send(&app, post(&submission("ada", 40.0, 95.0))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Result saved successfully");
        assert_eq!(body["result"]["name"], "ada");
        assert!(body["result"]["createdAt"].is_string());

        send(&app, post(&submission("bob", 55.0, 90.0))).await;

        let (status, body) = send(&app, get("/api/results")).await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<_> = body.as_array().unwrap().iter().map(|r| r["name"].clone()).collect();
        assert_eq!(names, [json!("bob"), json!("ada")]);
    }

    #[tokio::test]
    async fn test_leaderboard_ranking_and_limit() {
        let app = router(ResultStore::memory());
        for (name, wpm, acc) in [("a", 30.0, 99.0), ("b", 70.0, 88.0), ("c", 70.0, 97.0), ("d", 10.0, 50.0)] {
            let (status, _) = send(&app, post(&submission(name, wpm, acc))).await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, body) = send(&app, get("/api/leaderboard?limit=3")).await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<_> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, ["c", "b", "a"]);
    }

    #[tokio::test]
    async fn test_rejects_missing_name() {
        let app = router(ResultStore::memory());
        let (status, body) = send(&app, post(&submission("   ", 40.0, 95.0))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "name is required");

        let (_, list) = send(&app, get("/api/results")).await;
        assert!(list.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejects_out_of_range_accuracy() {
        let app = router(ResultStore::memory());
        let (status, body) = send(&app, post(&submission("ada", 40.0, 140.0))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid result");
    }

    #[tokio::test]
    async fn test_rejects_malformed_json() {
        let app = router(ResultStore::memory());
        let request = Request::post("/api/results")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"name": "ada"}"#))
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("usn"));
    }

    #[test]
    fn test_validate_trims() {
        let value = submission("  ada  ", 40.0, 95.0);
        let parsed: ResultSubmission = serde_json::from_value(value).unwrap();
        let cleaned = validate(parsed).unwrap();
        assert_eq!(cleaned.name, "ada");
    }
}
