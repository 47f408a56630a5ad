//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{OpenAiExplainAdapter, RendererLoader},
    config::Config,
    error::ApiError,
    web::{build_router, state::AppState},
};
use async_openai::{config::OpenAIConfig, Client};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Initialize the Generation Client (once per process) ---
    let mut openai_config = OpenAIConfig::new().with_api_key(config.openai_api_key.as_str());
    if let Some(base_url) = &config.openai_base_url {
        openai_config = openai_config.with_api_base(base_url.as_str());
    }
    let openai_client = Client::with_config(openai_config);

    let explainer = Arc::new(OpenAiExplainAdapter::new(
        openai_client,
        config.explain_model.clone(),
        config.max_output_tokens,
    ));

    // --- 3. Start Loading the PDF Renderer in the Background ---
    let renderer = Arc::new(RendererLoader::for_program(config.pdf_converter.clone()));
    {
        let renderer = renderer.clone();
        tokio::spawn(async move {
            let ready = renderer.ensure_ready().await.is_some();
            info!("PDF renderer load finished (ready: {})", ready);
        });
    }

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState::new(config.clone(), explainer, renderer));

    // --- 5. Expire Idle Sessions ---
    {
        let sessions = app_state.sessions.clone();
        let ttl = config.session_ttl;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(60));
            loop {
                interval.tick().await;
                let removed = sessions.prune_idle(ttl).await;
                if removed > 0 {
                    info!("Expired {} idle sessions", removed);
                }
            }
        });
    }

    // --- 6. Create the Web Router ---
    let app = build_router(app_state);

    // --- 7. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
