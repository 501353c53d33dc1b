mod auth;
mod blob;
mod config;
mod errors;
mod extraction;
mod history;
mod llm_client;
mod models;
mod routes;
mod state;
mod store;
mod suggestions;

#[cfg(test)]
mod test_support;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::HttpAuthProvider;
use crate::blob::S3BlobStore;
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::PgStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (panics on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Coach API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the key-value store (PostgreSQL-backed)
    let store = PgStore::connect(&config.database_url).await?;

    // Initialize S3 / MinIO
    let blob = S3BlobStore::new(build_s3_client(&config).await, config.s3_bucket.clone());
    if let Err(e) = blob.ensure_bucket().await {
        // Uploads will fail until the bucket exists, but extraction still
        // yields usable text, so startup proceeds.
        warn!("Blob bucket bootstrap failed: {e}");
    }
    info!("S3 client initialized");

    // Initialize the auth collaborator
    let auth = HttpAuthProvider::new(config.auth_url.clone(), config.auth_service_key.clone());
    info!("Auth provider client initialized");

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone());
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Build app state
    let state = AppState {
        store: Arc::new(store),
        blob: Arc::new(blob),
        auth: Arc::new(auth),
        llm: Arc::new(llm),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "resume-coach-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}
