use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::profile::{AttemptRecord, AuxiliaryContext, ResultSnapshot};
use crate::scoring::AnswerSet;
use crate::service::{QuizScoringService, ScoringServiceError};

/// Router builder exposing quiz listing, scoring, and profile aggregation.
pub fn scoring_router(service: Arc<QuizScoringService>) -> Router {
    Router::new()
        .route("/api/v1/quizzes", get(list_handler))
        .route("/api/v1/quizzes/:slug", get(definition_handler))
        .route("/api/v1/quizzes/:slug/score", post(score_handler))
        .route("/api/v1/profile", post(profile_handler))
        .route("/api/v1/profile/attempts", post(attempts_profile_handler))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProfileRequest {
    #[serde(default)]
    results: BTreeMap<String, ResultSnapshot>,
    #[serde(default)]
    context: AuxiliaryContext,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AttemptsProfileRequest {
    #[serde(default)]
    attempts: Vec<AttemptRecord>,
    #[serde(default)]
    context: AuxiliaryContext,
}

pub(crate) async fn list_handler(State(service): State<Arc<QuizScoringService>>) -> Response {
    (StatusCode::OK, axum::Json(service.quizzes())).into_response()
}

pub(crate) async fn definition_handler(
    State(service): State<Arc<QuizScoringService>>,
    Path(slug): Path<String>,
) -> Response {
    match service.quiz(&slug) {
        Ok(quiz) => (StatusCode::OK, axum::Json(quiz.as_ref())).into_response(),
        Err(error) => service_error(error),
    }
}

pub(crate) async fn score_handler(
    State(service): State<Arc<QuizScoringService>>,
    Path(slug): Path<String>,
    axum::Json(answers): axum::Json<AnswerSet>,
) -> Response {
    match service.score(&slug, &answers) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(error) => service_error(error),
    }
}

pub(crate) async fn profile_handler(
    State(service): State<Arc<QuizScoringService>>,
    axum::Json(request): axum::Json<ProfileRequest>,
) -> Response {
    let profile = service.profile(&request.results, &request.context);
    (StatusCode::OK, axum::Json(profile)).into_response()
}

pub(crate) async fn attempts_profile_handler(
    State(service): State<Arc<QuizScoringService>>,
    axum::Json(request): axum::Json<AttemptsProfileRequest>,
) -> Response {
    let profile = service.profile_from_attempts(&request.attempts, &request.context);
    (StatusCode::OK, axum::Json(profile)).into_response()
}

fn service_error(error: ScoringServiceError) -> Response {
    let status = match error {
        ScoringServiceError::UnknownQuiz(_) => StatusCode::NOT_FOUND,
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScoringConfig;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    fn router() -> Router {
        let service =
            QuizScoringService::from_config(&ScoringConfig::default()).expect("seeded catalog");
        scoring_router(Arc::new(service))
    }

    async fn read_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        serde_json::from_slice(&bytes).expect("json body")
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    #[tokio::test]
    async fn lists_seeded_quizzes() {
        let response = router()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/quizzes")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        let slugs: Vec<&str> = body
            .as_array()
            .expect("array")
            .iter()
            .filter_map(|entry| entry["slug"].as_str())
            .collect();
        assert!(slugs.contains(&"love-language-receiving"));
        assert!(slugs.contains(&"soul-connection"));
    }

    #[tokio::test]
    async fn unknown_quiz_is_not_found() {
        let response = router()
            .oneshot(post_json("/api/v1/quizzes/enneagram/score", json!({})))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = read_json(response).await;
        assert_eq!(body["error"], "unknown quiz `enneagram`");
    }

    #[tokio::test]
    async fn insufficient_answers_return_ok_false() {
        let response = router()
            .oneshot(post_json(
                "/api/v1/quizzes/love-language-receiving/score",
                json!({"q1": "a"}),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["ok"], false);
        assert_eq!(body["reason"], "Please answer at least 4 questions.");
        assert_eq!(body["remaining"], 3);
    }

    #[tokio::test]
    async fn profile_endpoint_returns_null_facets_for_missing_quizzes() {
        let response = router()
            .oneshot(post_json(
                "/api/v1/profile",
                json!({
                    "results": {"attachment-style": {"result_key": "secure"}},
                    "context": {"element": "fire"}
                }),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["mystic"]["label"], "Lantern Keeper");
        assert_eq!(body["element"], "fire");
        assert!(body["role"].is_null());
        assert!(body["notes"]["apology"].is_null());
    }
}
