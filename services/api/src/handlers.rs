//! Axum Handlers for the REST API
//!
//! Each request runs one pipeline to completion. Dropping the request future
//! (client gone, server shutting down) cancels the run through a drop guard.

use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{Html, IntoResponse, Json, Response},
};
use learnpath_core::render::{export_file_name, render_text};
use learnpath_core::{LearningPlan, RunOutcome, Topic};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::{
    models::{CreatePlanPayload, ErrorResponse, FailureResponse, PlanResponse},
    state::AppState,
};

const INDEX_HTML: &str = include_str!("../static/index.html");

pub enum ApiError {
    BadRequest(String),
    PipelineFailed(FailureResponse),
    Cancelled,
    InternalServerError(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse { message })).into_response()
            }
            ApiError::PipelineFailed(failure) => {
                (StatusCode::UNPROCESSABLE_ENTITY, Json(failure)).into_response()
            }
            ApiError::Cancelled => {
                let message = "The run was cancelled before it finished.".to_string();
                (StatusCode::SERVICE_UNAVAILABLE, Json(ErrorResponse { message })).into_response()
            }
            ApiError::InternalServerError(err) => {
                error!("Internal Server Error: {:?}", err);
                let message = "An internal server error occurred.".to_string();
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse { message }),
                )
                    .into_response()
            }
        }
    }
}

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::InternalServerError(err.into())
    }
}

/// Serves the single-page web form.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Generate a learning plan for a topic.
#[utoipa::path(
    post,
    path = "/plans",
    request_body = CreatePlanPayload,
    responses(
        (status = 200, description = "Plan generated; sections may be flagged as fallback", body = PlanResponse),
        (status = 400, description = "Topic is empty", body = ErrorResponse),
        (status = 422, description = "The pipeline failed at a stage", body = FailureResponse),
        (status = 503, description = "The run was cancelled", body = ErrorResponse),
    )
)]
pub async fn create_plan(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreatePlanPayload>,
) -> Result<Json<PlanResponse>, ApiError> {
    let topic = Topic::new(&payload.topic).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    match state.orchestrator().run(topic, None, cancel).await {
        RunOutcome::Complete(plan) => {
            info!(topic = %plan.topic, degraded = plan.is_degraded(), "Plan generated");
            Ok(Json(PlanResponse::from(&plan)))
        }
        RunOutcome::Failed(failure) => {
            warn!(error = %failure, "Plan generation failed");
            Err(ApiError::PipelineFailed(FailureResponse::from(&failure)))
        }
        RunOutcome::Cancelled => Err(ApiError::Cancelled),
    }
}

/// Render a plan as a downloadable text file.
#[utoipa::path(
    post,
    path = "/plans/export",
    request_body = PlanResponse,
    responses(
        (status = 200, description = "Plain-text rendering of the plan", content_type = "text/plain", body = String),
        (status = 400, description = "Plan has an empty topic", body = ErrorResponse),
    )
)]
pub async fn export_plan(Json(body): Json<PlanResponse>) -> Result<Response, ApiError> {
    let plan =
        LearningPlan::try_from(body).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        export_file_name(&plan.topic)
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        render_text(&plan),
    )
        .into_response())
}
