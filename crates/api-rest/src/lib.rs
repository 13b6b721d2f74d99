//! # API REST
//!
//! REST API for Liaison MDX measurement intake.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - Mapping batch errors to status codes and JSON bodies in one place
//!
//! Uses `api-shared` for wire types and `mdx-core` for validation and persistence.

#![warn(rust_2018_idioms)]

use std::any::Any;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use mdx_core::{BatchService, Environment};

pub mod error;
pub mod handlers;

pub use error::ApiError;

/// Application state shared across REST API handlers
#[derive(Clone)]
pub struct AppState {
    pub service: BatchService,
    pub environment: Environment,
}

impl AppState {
    pub fn new(service: BatchService, environment: Environment) -> Self {
        Self {
            service,
            environment,
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(handlers::liveness, handlers::health, handlers::submit_batch),
    components(schemas(
        api_shared::SubmitBatchReq,
        api_shared::MeasurementRes,
        api_shared::ErrorRes,
        api_shared::ServerErrorRes,
        api_shared::HealthRes,
    ))
)]
pub struct ApiDoc;

/// Builds the REST router with every route and layer.
pub fn router(state: AppState) -> Router {
    let environment = state.environment;

    Router::new()
        .route("/", get(handlers::liveness))
        .route("/health", get(handlers::health))
        .route("/liaison_mdx", post(handlers::submit_batch))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(CatchPanicLayer::custom(move |_panic: Box<dyn Any + Send + 'static>| {
            tracing::error!("request handler panicked");
            error::server_error_response(environment, "handler panicked")
        }))
        .with_state(state)
}
