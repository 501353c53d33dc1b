use std::sync::Arc;

use crate::auth::AuthProvider;
use crate::blob::BlobStore;
use crate::llm_client::CompletionClient;
use crate::store::KvStore;

/// Shared application state injected into all route handlers via Axum
/// extractors. Every external collaborator sits behind a trait object so
/// tests can substitute doubles without touching the handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn KvStore>,
    pub blob: Arc<dyn BlobStore>,
    pub auth: Arc<dyn AuthProvider>,
    pub llm: Arc<dyn CompletionClient>,
}
