mod analysis;
mod config;
mod document;
mod errors;
mod llm_client;
mod models;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::validation::InputLimits;
use crate::analysis::workflow::Workflow;
use crate::config::Config;
use crate::document::PdfTextExtractor;
use crate::llm_client::{CompletionClient, GeminiClient, RetryOn, RetryPolicy};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on a missing GOOGLE_API_KEY)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Aurora API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the oracle once; every workflow shares it
    let gemini = GeminiClient::new(
        config.google_api_key.clone(),
        config.gemini_model.clone(),
        Duration::from_secs(config.llm_timeout_secs),
    )?;
    info!("LLM client initialized (model: {})", gemini.model());

    let retry_policy = RetryPolicy {
        deadline: Some(Duration::from_secs(config.llm_retry_deadline_secs)),
        retry_on: if config.llm_retry_transient_only {
            RetryOn::TransientOnly
        } else {
            RetryOn::AnyError
        },
        ..RetryPolicy::default()
    };
    info!("LLM retry policy: {:?}", retry_policy);

    let workflow = Workflow::new(
        CompletionClient::new(Arc::new(gemini), retry_policy),
        Arc::new(PdfTextExtractor),
        InputLimits {
            max_length: config.max_input_length,
        },
    );

    let state = AppState {
        workflow,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
