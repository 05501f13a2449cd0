use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

use super::domain::{RecommendedRegion, RunKey};
use super::repository::{RecommendationRepository, SurveyAnswerSource};
use super::service::{RecommendationService, RecommendationServiceError};

/// Router builder exposing recommendation runs and their read-side views.
pub fn recommendation_router<S, R>(service: Arc<RecommendationService<S, R>>) -> Router
where
    S: SurveyAnswerSource + 'static,
    R: RecommendationRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/recommendations/:user_id/:response_id",
            post(recompute_handler::<S, R>).get(groups_handler::<S, R>),
        )
        .route(
            "/api/v1/recommendations/:user_id/:response_id/reasons",
            get(reasons_handler::<S, R>),
        )
        .with_state(service)
}

/// Summary returned after a run so callers can confirm what was stored.
#[derive(Debug, Serialize)]
pub struct RecomputeResponse {
    pub key: RunKey,
    pub run: u64,
    pub regions: Vec<RecommendedRegion>,
    pub stored_rows: usize,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ReasonQuery {
    #[serde(default)]
    username: Option<String>,
}

pub(crate) async fn recompute_handler<S, R>(
    State(service): State<Arc<RecommendationService<S, R>>>,
    Path((user_id, response_id)): Path<(String, String)>,
) -> Response
where
    S: SurveyAnswerSource + 'static,
    R: RecommendationRepository + 'static,
{
    let key = RunKey::new(user_id, response_id);
    match service.recompute(&key) {
        Ok(run) => {
            let body = RecomputeResponse {
                key: run.key,
                run: run.run,
                regions: run.regions,
                stored_rows: run.recommendations.len(),
            };
            (StatusCode::CREATED, axum::Json(body)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn groups_handler<S, R>(
    State(service): State<Arc<RecommendationService<S, R>>>,
    Path((user_id, response_id)): Path<(String, String)>,
) -> Response
where
    S: SurveyAnswerSource + 'static,
    R: RecommendationRepository + 'static,
{
    let key = RunKey::new(user_id, response_id);
    match service.groups(&key) {
        Ok(groups) => (StatusCode::OK, axum::Json(groups)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn reasons_handler<S, R>(
    State(service): State<Arc<RecommendationService<S, R>>>,
    Path((user_id, response_id)): Path<(String, String)>,
    Query(query): Query<ReasonQuery>,
) -> Response
where
    S: SurveyAnswerSource + 'static,
    R: RecommendationRepository + 'static,
{
    let username = query.username.unwrap_or_else(|| user_id.clone());
    let key = RunKey::new(user_id, response_id);
    match service.region_reasons(&key, &username) {
        Ok(reasons) => (StatusCode::OK, axum::Json(reasons)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: RecommendationServiceError) -> Response {
    AppError::from(error).into_response()
}
