//! Crucible hub API layer
//!
//! HTTP front end for the artifact registry. It routes requests to a
//! [`Registry`] provider, decodes and encodes bodies in the negotiated wire
//! format, and maps domain errors onto HTTP status codes.
//!
//! # Architecture
//!
//! - **Routes**: the fixed routing table
//! - **Handlers**: one per routed operation, each making one provider call
//! - **Codec**: `{media kind}+{format}` parsing, decoding, encoding and
//!   `Accept` negotiation
//! - **Error Handling**: error-code to status mapping and error bodies
//! - **Middleware**: request tracing and request IDs
//!
//! # Example
//!
//! ```rust,no_run
//! use hub_api::build_api_server;
//! use hub_core::Registry;
//! use std::sync::Arc;
//!
//! # async fn example(registry: Arc<dyn Registry>) {
//! let app = build_api_server(registry);
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await.unwrap();
//! axum::serve(listener, app).await.unwrap();
//! # }
//! ```

pub mod codec;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod responses;
pub mod routes;

// Re-export main types for convenience
pub use codec::{CodecError, ContentType, Format};
pub use error::{status_for, ApiError, ApiResult};
pub use extract::{Decoded, ErrorFormat, Negotiated, ARCHIVE_DIGEST};
pub use handlers::AppState;
pub use middleware::{MiddlewareConfig, UuidRequestIdGenerator};
pub use responses::{created, no_content, ok, Encoded};
pub use routes::build_router;

use axum::Router;
use hub_core::Registry;
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};

/// Build a complete API server with default middleware
pub fn build_api_server(registry: Arc<dyn Registry>) -> Router {
    build_api_server_with_config(registry, MiddlewareConfig::default())
}

/// Build API server with custom middleware configuration
///
/// # Example
///
/// ```rust,no_run
/// use hub_api::{build_api_server_with_config, MiddlewareConfig};
/// use hub_core::Registry;
/// use std::sync::Arc;
///
/// # fn example(registry: Arc<dyn Registry>) {
/// let config = MiddlewareConfig::new().with_tracing(false);
/// let app = build_api_server_with_config(registry, config);
/// # }
/// ```
pub fn build_api_server_with_config(
    registry: Arc<dyn Registry>,
    middleware_config: MiddlewareConfig,
) -> Router {
    let mut router = build_router(AppState::new(registry));

    if middleware_config.enable_tracing {
        router = router.layer(middleware::trace_layer());
    }

    if middleware_config.enable_request_id {
        router = router
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(
                UuidRequestIdGenerator::default(),
            ));
    }

    router
}
