//! Version handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use hub_core::{Version, VersionInfo, VersionList};
use tracing::{debug, info, instrument};

use super::AppState;
use crate::{
    error::{ApiError, ApiResult},
    extract::{Decoded, ErrorFormat, Negotiated},
    responses::{created, location, no_content, ok, Encoded},
};

/// List the versions of a resource
#[instrument(skip(state))]
pub async fn list_versions(
    State(state): State<AppState>,
    Negotiated(format): Negotiated,
    Path((namespace, resource)): Path<(String, String)>,
) -> ApiResult<Encoded<VersionList>> {
    debug!("Listing versions of {}/{}", namespace, resource);

    let list = state
        .registry
        .list_versions(&namespace, &resource)
        .await
        .map_err(|e| ApiError::registry(e, format))?;

    Ok(ok(format, list))
}

/// Create a version
///
/// New versions are unpublished and have no archive.
#[instrument(skip(state))]
pub async fn create_version(
    State(state): State<AppState>,
    Negotiated(format): Negotiated,
    Path((namespace, resource)): Path<(String, String)>,
    Decoded(info): Decoded<VersionInfo>,
) -> ApiResult<Encoded<Version>> {
    info!("Creating version: {}/{}@{}", namespace, resource, info.string);

    let version = state
        .registry
        .create_version(&namespace, &resource, info)
        .await
        .map_err(|e| ApiError::registry(e, format))?;

    let path = location([
        "namespaces",
        namespace.as_str(),
        "resources",
        resource.as_str(),
        "versions",
        version.string.as_str(),
    ]);
    Ok(created(format, path, version))
}

/// Read a version, including archive details if uploaded
#[instrument(skip(state))]
pub async fn read_version(
    State(state): State<AppState>,
    Negotiated(format): Negotiated,
    Path((namespace, resource, version)): Path<(String, String, String)>,
) -> ApiResult<Encoded<Version>> {
    debug!("Reading version: {}/{}@{}", namespace, resource, version);

    let version = state
        .registry
        .read_version(&namespace, &resource, &version)
        .await
        .map_err(|e| ApiError::registry(e, format))?;

    Ok(ok(format, version))
}

/// Update an unpublished version
#[instrument(skip(state))]
pub async fn update_version(
    State(state): State<AppState>,
    Negotiated(format): Negotiated,
    Path((namespace, resource, version)): Path<(String, String, String)>,
    Decoded(info): Decoded<VersionInfo>,
) -> ApiResult<Encoded<Version>> {
    info!("Updating version: {}/{}@{}", namespace, resource, version);

    let version = state
        .registry
        .update_version(&namespace, &resource, &version, info)
        .await
        .map_err(|e| ApiError::registry(e, format))?;

    Ok(ok(format, version))
}

/// Delete an unpublished version
///
/// Idempotent: succeeds when the version does not exist.
#[instrument(skip(state))]
pub async fn delete_version(
    State(state): State<AppState>,
    ErrorFormat(format): ErrorFormat,
    Path((namespace, resource, version)): Path<(String, String, String)>,
) -> ApiResult<StatusCode> {
    info!("Deleting version: {}/{}@{}", namespace, resource, version);

    state
        .registry
        .delete_version(&namespace, &resource, &version)
        .await
        .map_err(|e| ApiError::registry(e, format))?;

    Ok(no_content())
}
