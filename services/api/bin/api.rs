//! Main Entrypoint for the Leetmigo API Service
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment.
//! 2. Assembling the decision map from the topic library.
//! 3. Initializing the content service, prompts and sampler.
//! 4. Constructing the Axum router and applying middleware.
//! 5. Starting the web server and handling graceful shutdown.

use anyhow::Context;
use async_openai::config::OpenAIConfig;
use leetmigo_api::{
    config::{Config, Provider},
    router::create_router,
    sessions::SessionStore,
    state::AppState,
};
use leetmigo_core::{
    Sampler, assemble,
    coach::Coach,
    content::{ContentService, LLMContentService, PromptEndpointClient, StaticContentService},
    prompts::PromptTemplates,
};
use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

/// Listens for the `Ctrl+C` signal to gracefully shut down the server.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal. Shutting down gracefully...");
}

fn content_service(config: &Config) -> anyhow::Result<Arc<dyn ContentService>> {
    let service: Arc<dyn ContentService> = match &config.provider {
        Provider::Endpoint => {
            let url = config
                .prompt_endpoint_url
                .as_ref()
                .context("PROMPT_ENDPOINT_URL is not set")?;
            info!(%url, "Using prompt endpoint provider.");
            Arc::new(PromptEndpointClient::new(url, config.request_timeout)?)
        }
        Provider::OpenAI => {
            info!("Using OpenAI provider.");
            let api_key = config
                .openai_api_key
                .as_ref()
                .context("OPENAI_API_KEY is not set")?;
            let openai_config = OpenAIConfig::new()
                .with_api_key(api_key)
                .with_api_base("https://api.openai.com/v1/");
            Arc::new(LLMContentService::new(
                openai_config,
                config.chat_model.clone(),
                config.request_timeout,
            )?)
        }
        Provider::Gemini => {
            info!("Using Gemini provider.");
            let api_key = config
                .gemini_api_key
                .as_ref()
                .context("GEMINI_API_KEY is not set")?;
            let openai_config = OpenAIConfig::new()
                .with_api_key(api_key)
                .with_api_base("https://generativelanguage.googleapis.com/v1beta/openai");
            Arc::new(LLMContentService::new(
                openai_config,
                config.chat_model.clone(),
                config.request_timeout,
            )?)
        }
        Provider::Static => {
            info!("Using static content provider.");
            Arc::new(StaticContentService::default())
        }
    };
    Ok(service)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();
    info!("Configuration loaded. Initializing application state...");

    // --- 3. Assemble the Decision Map ---
    let map = Arc::new(assemble().context("Failed to assemble the decision map")?);

    // --- 4. Initialize Shared Services ---
    let prompts = match &config.prompts_path {
        Some(dir) => PromptTemplates::load_dir(dir)
            .with_context(|| format!("Failed to load prompts from {}", dir.display()))?,
        None => PromptTemplates::default(),
    };
    let coach = Coach::new(content_service(&config)?, Arc::new(prompts));

    let sampler = match config.sampler_seed {
        Some(seed) => {
            info!(seed, "Using seeded sampler.");
            Sampler::seeded(seed)
        }
        None => Sampler::from_os_rng(),
    };

    let app_state = Arc::new(AppState {
        map,
        sessions: Arc::new(SessionStore::new()),
        coach,
        sampler: Arc::new(Mutex::new(sampler)),
    });

    // --- 5. Create Router and Apply Middleware ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(app_state).layer(cors);

    // --- 6. Start Server ---
    info!(
        provider = ?config.provider,
        model = %config.chat_model,
        bind_address = %config.bind_address,
        "Service configured. Starting server..."
    );
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server has shut down.");
    Ok(())
}
