//! Route handlers.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
};

use api_shared::{
    ErrorRes, HealthRes, HealthService, MeasurementRes, ServerErrorRes, SubmitBatchReq,
};

use crate::{ApiError, AppState};

#[utoipa::path(
    get,
    path = "/",
    responses(
        (
            status = 200,
            description = "Liveness confirmation",
            body = String,
            content_type = "text/plain"
        )
    )
)]
/// Plain-text liveness confirmation. Never touches the store.
#[axum::debug_handler]
pub async fn liveness() -> &'static str {
    tracing::info!("GET / endpoint hit");
    HealthService::liveness()
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used by monitoring and load balancer health checks.
#[axum::debug_handler]
pub async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    post,
    path = "/liaison_mdx",
    request_body = SubmitBatchReq,
    responses(
        (status = 201, description = "Every record stored", body = [MeasurementRes]),
        (status = 400, description = "Batch rejected, nothing stored", body = ErrorRes),
        (
            status = 500,
            description = "Store or internal failure, nothing stored",
            body = ServerErrorRes
        )
    )
)]
/// Validate a batch of measurements and store it atomically
///
/// Every record in `CtValues` and `ResultValues` is checked against the batch's `AssayName`
/// before anything is written. On success the stored rows are returned in submission order,
/// CtValues first, each with its store-assigned `id`.
///
/// # Errors
/// Returns `400 Bad Request` if:
/// - the body is not valid JSON of the expected shape,
/// - both arrays are absent, or either is not an array,
/// - any record is missing a required field, or
/// - the arrays yield nothing to insert.
///
/// Returns `500 Internal Server Error` if the store rejects the insert or anything else fails.
#[axum::debug_handler]
pub async fn submit_batch(
    State(state): State<AppState>,
    payload: Result<Json<SubmitBatchReq>, JsonRejection>,
) -> Result<(StatusCode, Json<Vec<MeasurementRes>>), ApiError> {
    let Json(req) = payload.map_err(|rejection| {
        tracing::warn!("POST /liaison_mdx rejected body: {}", rejection.body_text());
        ApiError::from_rejection(rejection, state.environment)
    })?;

    tracing::info!(
        assay_name = req.assay_name.as_deref().unwrap_or(""),
        ct_values = req.ct_values.is_some(),
        result_values = req.result_values.is_some(),
        "POST /liaison_mdx endpoint hit"
    );

    match state.service.submit(&req).await {
        Ok(rows) => {
            tracing::info!("Saved {} items to database", rows.len());
            Ok((StatusCode::CREATED, Json(rows)))
        }
        Err(e) if e.kind().is_client_error() => {
            tracing::warn!("Batch rejected: {}", e);
            Err(ApiError::new(e, state.environment))
        }
        Err(e) => {
            tracing::error!("Batch persistence error: {:?}", e);
            Err(ApiError::new(e, state.environment))
        }
    }
}
