//! API request handlers
//!
//! One handler per routed operation. Every handler follows the same shape:
//! extract path parameters (and, for create/update, a decoded body), make
//! exactly one provider call, then encode the result or map the error.

use axum::{http::Uri, response::IntoResponse};
use hub_core::Registry;
use std::sync::Arc;
use tracing::debug;

use crate::{error::ApiError, extract::ErrorFormat};

pub mod archives;
pub mod channels;
pub mod namespaces;
pub mod resources;
pub mod versions;

pub use archives::{download_archive, download_channel_archive, upload_archive};
pub use channels::{create_channel, delete_channel, list_channels, read_channel, update_channel};
pub use namespaces::{
    create_namespace, delete_namespace, list_namespaces, read_namespace, update_namespace,
};
pub use resources::{
    create_resource, delete_resource, list_resources, read_resource, update_resource,
};
pub use versions::{create_version, delete_version, list_versions, read_version, update_version};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Domain provider
    pub registry: Arc<dyn Registry>,
}

impl AppState {
    /// Create new application state
    pub fn new(registry: Arc<dyn Registry>) -> Self {
        Self { registry }
    }
}

/// Fallback for paths outside the routing table
pub async fn not_found(ErrorFormat(format): ErrorFormat, uri: Uri) -> impl IntoResponse {
    debug!("No route for {}", uri.path());
    ApiError::not_found(format!("no route for {}", uri.path()), format)
}
