//! services/api/src/web/pages.rs
//!
//! Handlers for the browser flow. The session's `Shell` decides which view is shown;
//! form posts mutate it and redirect back to `/`.

use crate::error::to_http;
use crate::web::state::{AppState, SessionHandle};
use axum::{
    extract::{Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Form,
};
use explainer_core::{
    domain::{DifficultyLevel, Explanation},
    export::{export_filename, render_document, ExportFormat},
    ports::{ExplanationService, PortError, PortResult},
    shell::{Outcome, Phase, Ticket},
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use super::views::{render_explanation_view, render_input_view};

#[derive(Deserialize, Debug, Default)]
pub struct ViewQuery {
    pub level: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct GenerateForm {
    #[serde(default)]
    pub text: String,
}

#[derive(Deserialize, Debug, Default)]
pub struct ExportQuery {
    #[serde(default)]
    pub format: ExportFormat,
}

/// GET / - the input view while collecting, the explanation view while reviewing.
pub async fn index_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(session): Extension<SessionHandle>,
    Query(query): Query<ViewQuery>,
) -> Html<String> {
    let shell = session.shell.lock().await;
    match (shell.phase(), shell.explanation()) {
        (Phase::Reviewing, Some(explanation)) => {
            // An unknown level falls back to the default rather than failing the page.
            let level = query
                .level
                .as_deref()
                .and_then(|l| l.parse::<DifficultyLevel>().ok())
                .unwrap_or_default();
            Html(render_explanation_view(
                explanation,
                level,
                app_state.renderer.is_ready(),
            ))
        }
        _ => Html(render_input_view(shell.transcript(), shell.error(), shell.is_busy())),
    }
}

/// POST /generate - submits the text for explanation and waits for the result.
///
/// The generation itself runs on its own task, which completes the session even if
/// this request is dropped. The result is applied only if the session has not been
/// reset in the meantime.
pub async fn generate_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(session): Extension<SessionHandle>,
    Form(form): Form<GenerateForm>,
) -> Redirect {
    let ticket = {
        let mut shell = session.shell.lock().await;
        shell.set_transcript(form.text);
        match shell.begin_submit() {
            Ok(ticket) => ticket,
            Err(e) => {
                info!("Submission for session {} not started: {}", session.id, e);
                return Redirect::to("/");
            }
        }
    };

    info!(
        "Generating explanation for session {} (generation {})",
        session.id, ticket.generation
    );
    let session_id = session.id;
    let task = tokio::spawn(run_generation(
        app_state.explainer.clone(),
        session,
        ticket,
        app_state.config.generation_timeout,
    ));
    if let Err(e) = task.await {
        error!("Generation task for session {} did not finish: {}", session_id, e);
    }
    Redirect::to("/")
}

/// Awaits the generation service for one ticket and applies the result to the session.
///
/// Stops early when the ticket is cancelled by a reset. A service that does not answer
/// within `timeout` counts as a failed generation.
pub async fn run_generation(
    explainer: Arc<dyn ExplanationService>,
    session: SessionHandle,
    ticket: Ticket,
    timeout: Duration,
) -> Outcome {
    let result: PortResult<Explanation> = tokio::select! {
        _ = ticket.cancel.cancelled() => {
            warn!("Generation {} for session {} cancelled by reset", ticket.generation, session.id);
            return Outcome::Discarded;
        }
        result = tokio::time::timeout(timeout, explainer.explain(&ticket.transcript)) => {
            result.unwrap_or_else(|_| {
                Err(PortError::GenerationFailed(format!("no response within {:?}", timeout)))
            })
        }
    };

    if let Err(e) = &result {
        error!("Generation failed for session {}: {}", session.id, e);
    }

    let outcome = session.shell.lock().await.complete(&ticket, result);
    if outcome == Outcome::Discarded {
        warn!(
            "Discarded stale result of generation {} for session {}",
            ticket.generation, session.id
        );
    }
    outcome
}

/// POST /reset - "New Topic": back to an empty input view.
pub async fn reset_handler(Extension(session): Extension<SessionHandle>) -> Redirect {
    session.shell.lock().await.reset();
    info!("Session {} reset", session.id);
    Redirect::to("/")
}

/// GET /export - downloads the session's explanation as PDF or HTML.
pub async fn export_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(session): Extension<SessionHandle>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, (StatusCode, String)> {
    let (explanation, transcript) = {
        let shell = session.shell.lock().await;
        let explanation = shell.explanation().cloned().ok_or((
            StatusCode::CONFLICT,
            "There is no explanation to export.".to_string(),
        ))?;
        (explanation, shell.transcript().to_string())
    };
    export_response(&app_state, &explanation, &transcript, query.format).await
}

/// Renders an explanation in `format` and wraps it as a file download.
///
/// PDF export waits for the shared renderer load; when no renderer is available the
/// export is reported as unavailable and nothing is attempted.
pub async fn export_response(
    app_state: &AppState,
    explanation: &Explanation,
    transcript: &str,
    format: ExportFormat,
) -> Result<Response, (StatusCode, String)> {
    let html = render_document(explanation, transcript).map_err(|e| {
        error!("Failed to build the report for {}: {}", explanation.id, e);
        to_http(e)
    })?;
    let bytes = match format {
        ExportFormat::Html => html.into_bytes(),
        ExportFormat::Pdf => {
            let renderer = app_state.renderer.ensure_ready().await.ok_or_else(|| {
                warn!("PDF export requested but no renderer is available");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "PDF export is not available yet.".to_string(),
                )
            })?;
            renderer.render_pdf(&html).await.map_err(|e: PortError| {
                error!("Failed to render PDF for {}: {}", explanation.id, e);
                to_http(e)
            })?
        }
    };

    let filename = export_filename(&explanation.subject, format).replace(['"', '\\'], "");
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename))
        .map_err(|e| {
            error!("Invalid export filename {:?}: {}", filename, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to export".to_string())
        })?;

    info!("Exported {} as {}", explanation.id, filename);
    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(format.content_type())),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}
