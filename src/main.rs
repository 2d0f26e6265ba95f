//! Boleta Chat server
//!
//! Provides REST endpoints for:
//! - Receipt extraction from uploaded images
//! - Typed and spoken questions about the last receipt
//! - The last extraction result and the static upload page

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::{HeaderValue, Method};
use axum::Router;
use secrecy::ExposeSecret;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use boleta_chat::adapters::ai::{FailoverTranscriber, OpenAIConfig, OpenAIProvider, OpenAITranscriber};
use boleta_chat::adapters::http::{receipt_router, ReceiptAppState};
use boleta_chat::adapters::storage::{LocalUploadStore, SnapshotDocumentCache};
use boleta_chat::adapters::validation::JsonSchemaValidator;
use boleta_chat::application::{
    AskQuestionHandler, ExtractReceiptConfig, ExtractReceiptHandler, GetLastResultHandler,
    TranscribeQuestionHandler,
};
use boleta_chat::config::{AppConfig, ServerConfig};
use boleta_chat::ports::Transcriber;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    init_tracing(&config.server)?;
    config.validate().context("invalid configuration")?;

    info!(environment = ?config.server.environment, "Initializing Boleta Chat...");
    let app = build_app(&config)?;

    let addr = config.server.socket_addr()?;
    info!("Starting Boleta Chat on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// JSON logs in production, human-readable otherwise. `RUST_LOG` wins over the configured level.
fn init_tracing(server: &ServerConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&server.log_level))
        .context("invalid log filter")?;

    if server.is_production() {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    Ok(())
}

/// Wires adapters into handlers and handlers into the router.
fn build_app(config: &AppConfig) -> Result<Router> {
    let api_key = config
        .ai
        .openai_api_key
        .as_ref()
        .context("OPENAI_API_KEY is not set")?;

    let openai = OpenAIConfig::new(api_key.expose_secret().clone())
        .with_model(&config.ai.extraction_model)
        .with_base_url(&config.ai.base_url)
        .with_timeout(config.ai.timeout())
        .with_max_retries(config.ai.max_retries);

    let provider = Arc::new(OpenAIProvider::new(openai.clone())?);

    let chain = config
        .ai
        .transcription_models_list()
        .into_iter()
        .map(|model| {
            OpenAITranscriber::new(openai.clone(), model)
                .map(|t| Arc::new(t) as Arc<dyn Transcriber>)
        })
        .collect::<Result<Vec<_>, _>>()?;
    let transcriber = FailoverTranscriber::from_chain(chain);
    info!(chain = %transcriber.describe(), "Transcription models configured");

    let cache = Arc::new(SnapshotDocumentCache::new(&config.storage.snapshot_path));
    let uploads = Arc::new(LocalUploadStore::new(config.storage.uploads_dir.clone()));
    let schema = Arc::new(JsonSchemaValidator::receipt()?);

    let extract = Arc::new(ExtractReceiptHandler::new(
        provider.clone(),
        cache.clone(),
        uploads,
        schema,
        ExtractReceiptConfig {
            model: config.ai.extraction_model.clone(),
            max_output_tokens: config.extraction.max_output_tokens,
            image_detail: config.extraction.image_detail,
            enforce_schema: config.extraction.enforce_schema,
        },
    ));
    let ask = Arc::new(AskQuestionHandler::new(
        provider,
        cache.clone(),
        config.ai.chat_model.clone(),
    ));
    let transcribe = Arc::new(TranscribeQuestionHandler::new(Arc::new(transcriber), ask.clone()));
    let last_result = Arc::new(GetLastResultHandler::new(cache));

    let state = ReceiptAppState::new(extract, ask, transcribe, last_result);

    let app = receipt_router(
        state,
        &config.storage.static_dir,
        config.server.max_upload_bytes,
    )
    .layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(config.server.request_timeout()))
            .layer(cors_layer(&config.server)?),
    );

    Ok(app)
}

/// Any origin unless origins are configured.
fn cors_layer(server: &ServerConfig) -> Result<CorsLayer> {
    let origins = server.cors_origins_list();
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    if origins.is_empty() {
        return Ok(layer.allow_origin(Any));
    }

    let origins = origins
        .iter()
        .map(|o| {
            o.parse::<HeaderValue>()
                .with_context(|| format!("invalid CORS origin {}", o))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(layer.allow_origin(AllowOrigin::list(origins)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutting down");
}
