//! Resource handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use hub_core::{Resource, ResourceInfo, ResourceList};
use tracing::{debug, info, instrument};

use super::AppState;
use crate::{
    error::{ApiError, ApiResult},
    extract::{Decoded, ErrorFormat, Negotiated},
    responses::{created, location, no_content, ok, Encoded},
};

/// List the resources of a namespace
#[instrument(skip(state))]
pub async fn list_resources(
    State(state): State<AppState>,
    Negotiated(format): Negotiated,
    Path(namespace): Path<String>,
) -> ApiResult<Encoded<ResourceList>> {
    debug!("Listing resources in {}", namespace);

    let list = state
        .registry
        .list_resources(&namespace)
        .await
        .map_err(|e| ApiError::registry(e, format))?;

    Ok(ok(format, list))
}

/// Create a resource in a namespace
#[instrument(skip(state))]
pub async fn create_resource(
    State(state): State<AppState>,
    Negotiated(format): Negotiated,
    Path(namespace): Path<String>,
    Decoded(info): Decoded<ResourceInfo>,
) -> ApiResult<Encoded<Resource>> {
    info!("Creating resource: {}/{}", namespace, info.name);

    let resource = state
        .registry
        .create_resource(&namespace, info)
        .await
        .map_err(|e| ApiError::registry(e, format))?;

    let path = location([
        "namespaces",
        namespace.as_str(),
        "resources",
        resource.name.as_str(),
    ]);
    Ok(created(format, path, resource))
}

/// Read a resource
#[instrument(skip(state))]
pub async fn read_resource(
    State(state): State<AppState>,
    Negotiated(format): Negotiated,
    Path((namespace, resource)): Path<(String, String)>,
) -> ApiResult<Encoded<Resource>> {
    debug!("Reading resource: {}/{}", namespace, resource);

    let resource = state
        .registry
        .read_resource(&namespace, &resource)
        .await
        .map_err(|e| ApiError::registry(e, format))?;

    Ok(ok(format, resource))
}

/// Update mutable resource metadata
#[instrument(skip(state))]
pub async fn update_resource(
    State(state): State<AppState>,
    Negotiated(format): Negotiated,
    Path((namespace, resource)): Path<(String, String)>,
    Decoded(info): Decoded<ResourceInfo>,
) -> ApiResult<Encoded<Resource>> {
    info!("Updating resource: {}/{}", namespace, resource);

    let resource = state
        .registry
        .update_resource(&namespace, &resource, info)
        .await
        .map_err(|e| ApiError::registry(e, format))?;

    Ok(ok(format, resource))
}

/// Delete a resource
///
/// Idempotent: succeeds when the resource does not exist.
#[instrument(skip(state))]
pub async fn delete_resource(
    State(state): State<AppState>,
    ErrorFormat(format): ErrorFormat,
    Path((namespace, resource)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    info!("Deleting resource: {}/{}", namespace, resource);

    state
        .registry
        .delete_resource(&namespace, &resource)
        .await
        .map_err(|e| ApiError::registry(e, format))?;

    Ok(no_content())
}
