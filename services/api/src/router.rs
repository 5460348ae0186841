//! Axum Router Configuration
//!
//! This module defines the complete HTTP routing for the application,
//! including the REST API, WebSocket endpoint, and OpenAPI documentation.

use crate::{
    handlers,
    models::{
        CreatePlanPayload, ErrorResponse, FailureResponse, ModuleResponse, PlanResponse,
        ProjectResponse, ResourceResponse,
    },
    state::AppState,
    ws::ws_handler,
};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(handlers::create_plan, handlers::export_plan),
    components(
        schemas(CreatePlanPayload, PlanResponse, ModuleResponse, ResourceResponse, ProjectResponse, FailureResponse, ErrorResponse)
    ),
    tags(
        (name = "Learning Path API", description = "Generate personalized learning plans")
    )
)]
pub struct ApiDoc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .route("/plans", post(handlers::create_plan))
        .route("/ws", get(ws_handler))
        .with_state(app_state);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/", get(handlers::index))
        .route("/plans/export", post(handlers::export_plan))
        .merge(api_router)
}
