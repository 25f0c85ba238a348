use std::sync::Arc;

use twilight_http::Client;

use quill_database::TagStore;

/// Shared application context passed into command handlers.
///
/// Cheap to clone because it only stores reference-counted shared state. The
/// tag store is injected as a trait object so handlers never depend on a
/// concrete backend.
#[derive(Clone)]
pub struct Context {
    pub http: Arc<Client>,
    pub store: Arc<dyn TagStore>,
}

impl Context {
    /// Create a new application context.
    pub fn new(http: Arc<Client>, store: Arc<dyn TagStore>) -> Self {
        Self { http, store }
    }
}
