//! Channel handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use hub_core::{Channel, ChannelInfo, ChannelList};
use tracing::{debug, info, instrument};

use super::AppState;
use crate::{
    error::{ApiError, ApiResult},
    extract::{Decoded, ErrorFormat, Negotiated},
    responses::{created, location, no_content, ok, Encoded},
};

/// List the channels of a resource with their version references
#[instrument(skip(state))]
pub async fn list_channels(
    State(state): State<AppState>,
    Negotiated(format): Negotiated,
    Path((namespace, resource)): Path<(String, String)>,
) -> ApiResult<Encoded<ChannelList>> {
    debug!("Listing channels of {}/{}", namespace, resource);

    let list = state
        .registry
        .list_channels(&namespace, &resource)
        .await
        .map_err(|e| ApiError::registry(e, format))?;

    Ok(ok(format, list))
}

/// Create a channel pointing at a version
#[instrument(skip(state))]
pub async fn create_channel(
    State(state): State<AppState>,
    Negotiated(format): Negotiated,
    Path((namespace, resource)): Path<(String, String)>,
    Decoded(info): Decoded<ChannelInfo>,
) -> ApiResult<Encoded<Channel>> {
    info!(
        "Creating channel: {}/{}#{} -> {}",
        namespace, resource, info.name, info.version
    );

    let channel = state
        .registry
        .create_channel(&namespace, &resource, info)
        .await
        .map_err(|e| ApiError::registry(e, format))?;

    let path = location([
        "namespaces",
        namespace.as_str(),
        "resources",
        resource.as_str(),
        "channels",
        channel.name.as_str(),
    ]);
    Ok(created(format, path, channel))
}

/// Read a channel and its referenced version
#[instrument(skip(state))]
pub async fn read_channel(
    State(state): State<AppState>,
    Negotiated(format): Negotiated,
    Path((namespace, resource, channel)): Path<(String, String, String)>,
) -> ApiResult<Encoded<Channel>> {
    debug!("Reading channel: {}/{}#{}", namespace, resource, channel);

    let channel = state
        .registry
        .read_channel(&namespace, &resource, &channel)
        .await
        .map_err(|e| ApiError::registry(e, format))?;

    Ok(ok(format, channel))
}

/// Repoint a channel or update its description
#[instrument(skip(state))]
pub async fn update_channel(
    State(state): State<AppState>,
    Negotiated(format): Negotiated,
    Path((namespace, resource, channel)): Path<(String, String, String)>,
    Decoded(info): Decoded<ChannelInfo>,
) -> ApiResult<Encoded<Channel>> {
    info!(
        "Updating channel: {}/{}#{} -> {}",
        namespace, resource, channel, info.version
    );

    let channel = state
        .registry
        .update_channel(&namespace, &resource, &channel, info)
        .await
        .map_err(|e| ApiError::registry(e, format))?;

    Ok(ok(format, channel))
}

/// Delete a channel
///
/// Idempotent. The referenced version and its archive are unaffected.
#[instrument(skip(state))]
pub async fn delete_channel(
    State(state): State<AppState>,
    ErrorFormat(format): ErrorFormat,
    Path((namespace, resource, channel)): Path<(String, String, String)>,
) -> ApiResult<StatusCode> {
    info!("Deleting channel: {}/{}#{}", namespace, resource, channel);

    state
        .registry
        .delete_channel(&namespace, &resource, &channel)
        .await
        .map_err(|e| ApiError::registry(e, format))?;

    Ok(no_content())
}
