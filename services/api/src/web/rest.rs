//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the JSON API endpoints and the master
//! definition for the OpenAPI specification.

use crate::error::to_http;
use crate::web::pages::export_response;
use crate::web::state::AppState;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use explainer_core::{
    domain::Explanation,
    export::{export_filename, ExportFormat},
    shell::EMPTY_INPUT_MESSAGE,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        create_explanation_handler,
        upload_explanation_handler,
        export_explanation_handler,
        health_handler,
    ),
    components(
        schemas(ExplainRequest, ExplanationResponse, ExportRequest, HealthResponse)
    ),
    tags(
        (name = "Universal Explainer API", description = "Multi-level explanations of free-form text, with document export.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// The text to explain.
#[derive(Deserialize, ToSchema)]
pub struct ExplainRequest {
    pub text: String,
}

/// A generated explanation and the filename its PDF export would get.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExplanationResponse {
    #[schema(value_type = Object)]
    pub explanation: Explanation,
    pub pdf_filename: String,
}

/// An explanation to export, with the raw input it was generated from.
#[derive(Deserialize, ToSchema)]
pub struct ExportRequest {
    #[schema(value_type = Object)]
    pub explanation: Explanation,
    #[serde(default)]
    pub transcript: String,
    #[serde(default)]
    #[schema(value_type = String, example = "pdf")]
    pub format: ExportFormat,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub pdf_ready: bool,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

async fn explain_text(
    app_state: &AppState,
    text: &str,
) -> Result<(StatusCode, Json<ExplanationResponse>), (StatusCode, String)> {
    if text.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, EMPTY_INPUT_MESSAGE.to_string()));
    }

    let explanation = app_state.explainer.explain(text).await.map_err(|e| {
        error!("Failed to create explanation: {:?}", e);
        to_http(e)
    })?;

    info!("Created explanation {} via API", explanation.id);
    let pdf_filename = export_filename(&explanation.subject, ExportFormat::Pdf);
    Ok((
        StatusCode::CREATED,
        Json(ExplanationResponse {
            explanation,
            pdf_filename,
        }),
    ))
}

/// Generate an explanation of free-form text.
///
/// Stateless: nothing is stored server-side. Blank text is rejected without
/// contacting the generation service.
#[utoipa::path(
    post,
    path = "/api/explanations",
    request_body = ExplainRequest,
    responses(
        (status = 201, description = "Explanation generated", body = ExplanationResponse),
        (status = 400, description = "The text is blank"),
        (status = 502, description = "The generation service failed or returned a malformed response")
    )
)]
pub async fn create_explanation_handler(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<ExplainRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    explain_text(&app_state, &req.text).await
}

/// Generate an explanation of an uploaded text file.
///
/// Accepts a multipart/form-data request with a single file part.
#[utoipa::path(
    post,
    path = "/api/explanations/upload",
    request_body(content_type = "multipart/form-data", description = "The text file to explain."),
    responses(
        (status = 201, description = "Explanation generated", body = ExplanationResponse),
        (status = 400, description = "Bad request (e.g., missing file, not UTF-8, or blank)"),
        (status = 502, description = "The generation service failed or returned a malformed response")
    )
)]
pub async fn upload_explanation_handler(
    State(app_state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let file_text = if let Some(field) = multipart.next_field().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            format!("Failed to read multipart data: {}", e),
        )
    })? {
        let data = field.bytes().await.map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                format!("Failed to read file bytes: {}", e),
            )
        })?;
        String::from_utf8(data.to_vec()).map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                format!("Uploaded file is not valid UTF-8 text: {}", e),
            )
        })?
    } else {
        return Err((
            StatusCode::BAD_REQUEST,
            "Multipart form must include a file".to_string(),
        ));
    };

    explain_text(&app_state, &file_text).await
}

/// Export an explanation as a PDF or HTML document.
#[utoipa::path(
    post,
    path = "/api/export",
    request_body = ExportRequest,
    responses(
        (status = 200, description = "The document, as an attachment"),
        (status = 503, description = "PDF rendering is not available")
    )
)]
pub async fn export_explanation_handler(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<ExportRequest>,
) -> Result<Response, (StatusCode, String)> {
    export_response(&app_state, &req.explanation, &req.transcript, req.format).await
}

/// Liveness, plus whether PDF export is currently possible.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health_handler(State(app_state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        pdf_ready: app_state.renderer.is_ready(),
    })
}
