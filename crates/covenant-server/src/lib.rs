//! Covenant Server
//!
//! HTTP surface for credit agreement extraction: accepts agreement text,
//! runs the extraction pipeline and stages usable results for review.

#![warn(missing_docs)]

pub mod config;
pub mod handlers;
pub mod staging;

use config::{ProviderKind, ServerConfig};
use covenant_domain::traits::LlmProvider;
use covenant_extractor::Extractor;
use covenant_gatekeeper::Gatekeeper;
use covenant_llm::{MockProvider, OpenAiProvider};
use handlers::{create_router, AppState};
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Reply of the offline provider: every document is classified irrelevant
const MOCK_REPLY: &str = r#"{"extraction_status": "irrelevant_document"}"#;

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Extraction capability could not be constructed
    #[error("Failed to initialize provider: {0}")]
    Provider(String),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Install the global tracing subscriber
///
/// Filtering follows `RUST_LOG`, defaulting to `info`. Calling this more
/// than once is harmless.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Start the HTTP server
///
/// Validates configuration, builds the extraction capability and pipeline,
/// and starts the axum server.
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    init_tracing();
    config.validate()?;

    info!("Starting Covenant extraction server");
    info!("Bind address: {}", config.bind_addr());
    info!(
        "Map-reduce threshold: {} chars, {} attempts, {}s timeout",
        config.extractor.map_reduce_threshold,
        config.extractor.max_attempts,
        config.extractor.extraction_timeout_secs
    );

    let gatekeeper = Gatekeeper::new(config.validation.clone());

    match config.provider.kind {
        ProviderKind::OpenAi => {
            let provider = &config.provider;
            let llm = OpenAiProvider::with_timeout(
                provider.endpoint.clone(),
                provider.model.clone(),
                provider.api_key()?,
                Duration::from_secs(provider.request_timeout_secs),
            )
            .map_err(|e| ServerError::Provider(e.to_string()))?
            .with_max_retries(provider.max_retries);

            info!("Using OpenAI provider, model {}", llm.model());
            let extractor = Extractor::new(llm, gatekeeper, config.extractor.clone());
            serve(&config, extractor).await
        }
        ProviderKind::Mock => {
            info!("Using offline mock provider");
            let extractor =
                Extractor::new(MockProvider::new(MOCK_REPLY), gatekeeper, config.extractor.clone());
            serve(&config, extractor).await
        }
    }
}

async fn serve<L>(config: &ServerConfig, extractor: Extractor<L>) -> Result<(), ServerError>
where
    L: LlmProvider + 'static,
{
    let app = create_router(AppState::new(extractor));

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Server listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    Ok(())
}
