pub mod middleware;
pub mod pages;
pub mod rest;
pub mod state;
pub mod views;

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::warn;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use middleware::ensure_session;
pub use state::AppState;

/// Builds the complete application: browser pages, JSON API and Swagger UI.
pub fn build_router(app_state: Arc<AppState>) -> Router {
    let config = app_state.config.clone();

    let cors = match config.allowed_origin.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_credentials(true)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([CONTENT_TYPE, ACCEPT]),
        Err(_) => {
            warn!("ALLOWED_ORIGIN '{}' is not a valid origin; CORS disabled", config.allowed_origin);
            CorsLayer::new()
        }
    };

    // Browser pages (session cookie required, created on demand)
    let page_routes = Router::new()
        .route("/", get(pages::index_handler))
        .route("/generate", post(pages::generate_handler))
        .route("/reset", post(pages::reset_handler))
        .route("/export", get(pages::export_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            ensure_session,
        ));

    // Stateless JSON API
    let api_routes = Router::new()
        .route("/api/explanations", post(rest::create_explanation_handler))
        .route("/api/explanations/upload", post(rest::upload_explanation_handler))
        .route("/api/export", post(rest::export_explanation_handler))
        .route("/health", get(rest::health_handler));

    let app_router = Router::new()
        .merge(page_routes)
        .merge(api_routes)
        .layer(DefaultBodyLimit::max(config.max_input_bytes))
        .layer(cors)
        .with_state(app_state);

    Router::new()
        .merge(app_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", rest::ApiDoc::openapi()))
}
