//! HTTP request handlers for the extraction service.
//!
//! Implements extraction, staged listing and health check endpoints using axum.

use crate::staging::{InMemoryStager, StagingError};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router as AxumRouter,
};
use covenant_domain::traits::{AgreementStager, LlmProvider};
use covenant_domain::{ExtractionResult, StagedSummary, StagingProvenance};
use covenant_extractor::{Extractor, ExtractorError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Shared application state
pub struct AppState<L>
where
    L: LlmProvider,
{
    /// Extraction pipeline
    pub extractor: Arc<Extractor<L>>,
    /// Staging store for finished extractions
    pub stager: Arc<InMemoryStager>,
}

impl<L> AppState<L>
where
    L: LlmProvider,
{
    /// Create state around an extractor with an empty staging store
    pub fn new(extractor: Extractor<L>) -> Self {
        Self {
            extractor: Arc::new(extractor),
            stager: Arc::new(InMemoryStager::new()),
        }
    }
}

// Derived Clone would require `L: Clone`
impl<L> Clone for AppState<L>
where
    L: LlmProvider,
{
    fn clone(&self) -> Self {
        Self {
            extractor: Arc::clone(&self.extractor),
            stager: Arc::clone(&self.stager),
        }
    }
}

/// Extraction request
#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    /// Full agreement text
    pub text: String,
    /// Use map-reduce regardless of document length
    #[serde(default)]
    pub force_map_reduce: bool,
    /// Original filename, recorded in staging provenance
    #[serde(default)]
    pub filename: Option<String>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall health status
    pub status: String,
    /// Service name
    pub service: String,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Extraction failed
    Extraction(ExtractorError),
    /// Staging store unavailable
    Staging(StagingError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Extraction(e) if e.is_validation() => {
                (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
            }
            AppError::Extraction(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            AppError::Staging(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

impl From<ExtractorError> for AppError {
    fn from(e: ExtractorError) -> Self {
        AppError::Extraction(e)
    }
}

impl From<StagingError> for AppError {
    fn from(e: StagingError) -> Self {
        AppError::Staging(e)
    }
}

/// POST /api/extract - Extract a credit agreement from text
///
/// Successful and partial extractions are staged; a staging failure is
/// logged and does not affect the response.
async fn extract_agreement<L>(
    State(state): State<AppState<L>>,
    Json(request): Json<ExtractRequest>,
) -> Result<Json<ExtractionResult>, AppError>
where
    L: LlmProvider + 'static,
{
    let max_attempts = state.extractor.config().max_attempts;
    let agreement = state
        .extractor
        .extract_smart(&request.text, request.force_map_reduce, max_attempts)
        .await?;

    if agreement.extraction_status.carries_agreement() {
        let provenance = StagingProvenance::new(request.text, request.filename);
        match state.stager.stage(&agreement, provenance) {
            Ok(id) => info!("Staged extraction {} ({})", id, agreement.extraction_status),
            Err(e) => warn!("Failed to stage extraction: {}", e),
        }
    }

    Ok(Json(ExtractionResult::from_agreement(agreement)))
}

/// GET /api/staged - Staged extractions, newest last
async fn list_staged<L>(
    State(state): State<AppState<L>>,
) -> Result<Json<Vec<StagedSummary>>, AppError>
where
    L: LlmProvider + 'static,
{
    Ok(Json(state.stager.list()?))
}

/// GET /api/health - Liveness check
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "covenant".to_string(),
    })
}

/// Create the axum router with all routes
pub fn create_router<L>(state: AppState<L>) -> AxumRouter
where
    L: LlmProvider + 'static,
{
    AxumRouter::new()
        .route("/api/extract", post(extract_agreement::<L>))
        .route("/api/staged", get(list_staged::<L>))
        .route("/api/health", get(health_check))
        .with_state(state)
}
