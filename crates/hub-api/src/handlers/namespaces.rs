//! Namespace handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use hub_core::{Namespace, NamespaceInfo, NamespaceList};
use tracing::{debug, info, instrument};

use super::AppState;
use crate::{
    error::{ApiError, ApiResult},
    extract::{Decoded, ErrorFormat, Negotiated},
    responses::{created, location, no_content, ok, Encoded},
};

/// List all namespaces
///
/// The list order is provider-dependent and may be empty.
#[instrument(skip(state))]
pub async fn list_namespaces(
    State(state): State<AppState>,
    Negotiated(format): Negotiated,
) -> ApiResult<Encoded<NamespaceList>> {
    debug!("Listing namespaces");

    let list = state
        .registry
        .list_namespaces()
        .await
        .map_err(|e| ApiError::registry(e, format))?;

    Ok(ok(format, list))
}

/// Create a namespace
#[instrument(skip(state))]
pub async fn create_namespace(
    State(state): State<AppState>,
    Negotiated(format): Negotiated,
    Decoded(info): Decoded<NamespaceInfo>,
) -> ApiResult<Encoded<Namespace>> {
    info!("Creating namespace: {}", info.name);

    let namespace = state
        .registry
        .create_namespace(info)
        .await
        .map_err(|e| ApiError::registry(e, format))?;

    let path = location(["namespaces", namespace.name.as_str()]);
    Ok(created(format, path, namespace))
}

/// Read a namespace with summaries of its resources
#[instrument(skip(state))]
pub async fn read_namespace(
    State(state): State<AppState>,
    Negotiated(format): Negotiated,
    Path(namespace): Path<String>,
) -> ApiResult<Encoded<Namespace>> {
    debug!("Reading namespace: {}", namespace);

    let namespace = state
        .registry
        .read_namespace(&namespace)
        .await
        .map_err(|e| ApiError::registry(e, format))?;

    Ok(ok(format, namespace))
}

/// Update mutable namespace metadata
///
/// Contained resources and their timestamps are not touched.
#[instrument(skip(state))]
pub async fn update_namespace(
    State(state): State<AppState>,
    Negotiated(format): Negotiated,
    Path(namespace): Path<String>,
    Decoded(info): Decoded<NamespaceInfo>,
) -> ApiResult<Encoded<Namespace>> {
    info!("Updating namespace: {}", namespace);

    let namespace = state
        .registry
        .update_namespace(&namespace, info)
        .await
        .map_err(|e| ApiError::registry(e, format))?;

    Ok(ok(format, namespace))
}

/// Delete a namespace
///
/// Idempotent: succeeds when the namespace does not exist.
#[instrument(skip(state))]
pub async fn delete_namespace(
    State(state): State<AppState>,
    ErrorFormat(format): ErrorFormat,
    Path(namespace): Path<String>,
) -> ApiResult<StatusCode> {
    info!("Deleting namespace: {}", namespace);

    state
        .registry
        .delete_namespace(&namespace)
        .await
        .map_err(|e| ApiError::registry(e, format))?;

    Ok(no_content())
}
