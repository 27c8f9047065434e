//! API route definitions
//!
//! The routing table is fixed at construction. Each row maps one method and
//! path pattern to exactly one handler.

use axum::{
    routing::{get, put},
    Router,
};

use crate::handlers::{
    create_channel, create_namespace, create_resource, create_version, delete_channel,
    delete_namespace, delete_resource, delete_version, download_archive, download_channel_archive,
    list_channels, list_namespaces, list_resources, list_versions, not_found, read_channel,
    read_namespace, read_resource, read_version, update_channel, update_namespace,
    update_resource, update_version, upload_archive, AppState,
};

const NAMESPACE: &str = "/namespaces/{namespace}";
const RESOURCE: &str = "/namespaces/{namespace}/resources/{resource}";

/// Build the API router with all routes
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(namespace_routes())
        .merge(resource_routes())
        .merge(version_routes())
        .merge(channel_routes())
        .fallback(not_found)
        .with_state(state)
}

fn namespace_routes() -> Router<AppState> {
    Router::new()
        .route("/namespaces", get(list_namespaces).post(create_namespace))
        .route(
            NAMESPACE,
            get(read_namespace)
                .put(update_namespace)
                .delete(delete_namespace),
        )
}

fn resource_routes() -> Router<AppState> {
    Router::new()
        .route(
            &format!("{NAMESPACE}/resources"),
            get(list_resources).post(create_resource),
        )
        .route(
            RESOURCE,
            get(read_resource)
                .put(update_resource)
                .delete(delete_resource),
        )
}

fn version_routes() -> Router<AppState> {
    Router::new()
        .route(
            &format!("{RESOURCE}/versions"),
            get(list_versions).post(create_version),
        )
        .route(
            &format!("{RESOURCE}/versions/{{version}}"),
            get(read_version).put(update_version).delete(delete_version),
        )
        .route(
            &format!("{RESOURCE}/versions/{{version}}/archive"),
            put(upload_archive).get(download_archive),
        )
}

fn channel_routes() -> Router<AppState> {
    Router::new()
        .route(
            &format!("{RESOURCE}/channels"),
            get(list_channels).post(create_channel),
        )
        .route(
            &format!("{RESOURCE}/channels/{{channel}}"),
            get(read_channel).put(update_channel).delete(delete_channel),
        )
        .route(
            &format!("{RESOURCE}/channels/{{channel}}/archive"),
            get(download_channel_archive),
        )
}
