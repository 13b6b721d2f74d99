//! Error responses.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use api_shared::{ErrorRes, ServerErrorRes};
use mdx_core::{BatchError, Environment};

pub const SERVER_ERROR_MESSAGE: &str = "Internal server error";

/// A failed request, rendered according to the error's kind.
///
/// Client errors become 400 with `{error}`. Store and internal failures become 500 with
/// `{message, error}`, where `error` carries detail only in development.
#[derive(Debug)]
pub struct ApiError {
    pub error: BatchError,
    pub environment: Environment,
}

impl ApiError {
    pub fn new(error: BatchError, environment: Environment) -> Self {
        Self { error, environment }
    }

    pub fn from_rejection(rejection: JsonRejection, environment: Environment) -> Self {
        let message = format!("Invalid request body: {}", rejection.body_text());
        Self::new(BatchError::ClientValidation(message), environment)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.error.kind().is_client_error() {
            let body = ErrorRes {
                error: self.error.to_string(),
            };
            return (StatusCode::BAD_REQUEST, Json(body)).into_response();
        }
        server_error_response(self.environment, &self.error.to_string())
    }
}

/// The generic 500 body.
pub fn server_error_response(environment: Environment, detail: &str) -> Response {
    let error = if environment.exposes_error_detail() {
        json!(detail)
    } else {
        json!({})
    };
    let body = ServerErrorRes {
        message: SERVER_ERROR_MESSAGE.into(),
        error,
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}
