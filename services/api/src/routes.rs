use crate::infra::{AppState, InMemorySurveyStore};
use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Extension;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::info;
use youth_policy::error::AppError;
use youth_policy::recommendation::{
    recommendation_router, RecommendationRepository, RecommendationService,
    RecommendationServiceError, RunKey, SurveyAnswer, SurveyAnswerSource,
};

#[derive(Debug, Deserialize)]
pub(crate) struct SurveySubmission {
    pub(crate) answers: Vec<SurveyAnswer>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SurveyReceipt {
    pub(crate) key: RunKey,
    pub(crate) answers: usize,
}

pub(crate) fn with_recommendation_routes<S, R>(
    service: Arc<RecommendationService<S, R>>,
) -> axum::Router
where
    S: SurveyAnswerSource + 'static,
    R: RecommendationRepository + 'static,
{
    recommendation_router(service)
        .route(
            "/api/v1/surveys/:user_id/:response_id",
            axum::routing::put(submit_survey),
        )
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Records the answers of one survey response so it can be recommended on. A response
/// is accepted once; later submissions for the same key are rejected with 409.
pub(crate) async fn submit_survey(
    Extension(surveys): Extension<InMemorySurveyStore>,
    Path((user_id, response_id)): Path<(String, String)>,
    Json(submission): Json<SurveySubmission>,
) -> Response {
    if submission.answers.is_empty() {
        let payload = json!({ "error": "a survey submission needs at least one answer" });
        return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
    }

    let key = RunKey::new(user_id, response_id);
    let answers = submission.answers.len();
    match surveys.record(key.clone(), submission.answers) {
        Ok(()) => {
            info!(%key, answers, "survey response recorded");
            (StatusCode::OK, Json(SurveyReceipt { key, answers })).into_response()
        }
        Err(err) => AppError::from(RecommendationServiceError::from(err)).into_response(),
    }
}
