//! Route handlers and router construction

use crate::middleware::request_id_middleware;
use crate::types::{
    HistoryResponse, IngressError, IngressResult, SummaryResponse, UploadResponse,
};
use crate::upload::{NO_FILE_SELECTED, StagedUpload, UploadConfig};
use askama::Template;
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Query, State, multipart::MultipartRejection},
    response::Html,
    routing::{get, post},
};
use runmax_core::{IngestionService, StoreHandle, SummaryService};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub ingestion: IngestionService,
    pub summary: SummaryService,
    pub store: StoreHandle,
    pub uploads: Arc<UploadConfig>,
}

impl AppState {
    /// Wire the services around one shared store handle
    pub fn new(
        store: StoreHandle,
        summarizer: Arc<dyn runmax_core::Summarizer>,
        uploads: UploadConfig,
    ) -> Self {
        Self {
            ingestion: IngestionService::new(store.clone()),
            summary: SummaryService::new(store.clone(), summarizer),
            store,
            uploads: Arc::new(uploads),
        }
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    let body_limit = state.uploads.max_upload_bytes;

    Router::new()
        .route("/", get(index))
        .route("/upload", post(upload))
        .route("/llm", post(summarize))
        .route("/history", get(history))
        .route("/healthz", get(healthz))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    message: Option<String>,
    allowed_extensions: String,
}

/// Query parameters for the index page
#[derive(Debug, Deserialize)]
pub struct IndexQuery {
    message: Option<String>,
}

/// Upload/status page
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<IndexQuery>,
) -> IngressResult<Html<String>> {
    let template = IndexTemplate {
        message: params.message.filter(|m| !m.is_empty()),
        allowed_extensions: state
            .uploads
            .allowed_extensions
            .iter()
            .map(|ext| format!(".{}", ext))
            .collect::<Vec<_>>()
            .join(","),
    };

    template
        .render()
        .map(Html)
        .map_err(|e| IngressError::Processing(format!("Failed to render page: {}", e)))
}

/// Accept a `.txt` upload in multipart field `file` and ingest it
pub async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> IngressResult<Json<UploadResponse>> {
    let mut multipart =
        multipart.map_err(|_| IngressError::Validation(NO_FILE_SELECTED.to_string()))?;

    let mut file = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| IngressError::Processing(format!("Failed to read upload: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().map(str::to_string);
        state.uploads.validate(filename.as_deref())?;

        let data = field
            .bytes()
            .await
            .map_err(|e| IngressError::Processing(format!("Failed to read upload: {}", e)))?;
        file = filename.map(|name| (name, data));
        break;
    }

    let Some((filename, data)) = file else {
        return Err(IngressError::Validation(NO_FILE_SELECTED.to_string()));
    };

    info!("Received upload '{}' ({} bytes)", filename, data.len());

    // Dropping `staged` deletes the file on every path out of this function
    let staged = StagedUpload::write(&state.uploads.directory, &filename, &data).await?;
    let text = staged.read_text().await?;
    let results = state.ingestion.ingest(&text).await?;

    Ok(Json(UploadResponse::new(results)))
}

/// Summarize the most recent record
pub async fn summarize(State(state): State<AppState>) -> IngressResult<Json<SummaryResponse>> {
    let outcome = state.summary.summarize_latest().await?;

    Ok(Json(SummaryResponse {
        success: true,
        llm_response: outcome.summary,
        original_data: outcome.original_data,
    }))
}

/// All stored records
pub async fn history(State(state): State<AppState>) -> IngressResult<Json<HistoryResponse>> {
    let results = state.store.load().await?;

    Ok(Json(HistoryResponse {
        success: true,
        results,
    }))
}

/// Liveness response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Liveness probe
pub async fn healthz() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}
