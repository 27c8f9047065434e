//! Archive transfer handlers
//!
//! Archives are passed through as byte streams in both directions.

use axum::{
    body::Body,
    extract::{Path, State},
    http::HeaderMap,
    response::Response,
};
use futures::{StreamExt, TryStreamExt};
use hub_core::Version;
use tracing::{debug, info, instrument};

use super::AppState;
use crate::{
    error::{ApiError, ApiResult},
    extract::{archive_digest, ErrorFormat, Negotiated},
    responses::{self, ok, Encoded},
};

/// Upload the archive of an unpublished version
///
/// The request body is forwarded to the provider as it arrives, along with
/// the optional `Archive-Digest` header.
#[instrument(skip(state, body))]
pub async fn upload_archive(
    State(state): State<AppState>,
    Negotiated(format): Negotiated,
    Path((namespace, resource, version)): Path<(String, String, String)>,
    headers: HeaderMap,
    body: Body,
) -> ApiResult<Encoded<Version>> {
    let digest = archive_digest(&headers);
    info!(
        "Uploading archive: {}/{}@{} (digest: {:?})",
        namespace, resource, version, digest
    );

    let stream = body
        .into_data_stream()
        .map_err(std::io::Error::other)
        .boxed();

    let version = state
        .registry
        .upload_archive(&namespace, &resource, &version, digest, stream)
        .await
        .map_err(|e| ApiError::registry(e, format))?;

    Ok(ok(format, version))
}

/// Download the archive of a version
#[instrument(skip(state))]
pub async fn download_archive(
    State(state): State<AppState>,
    ErrorFormat(format): ErrorFormat,
    Path((namespace, resource, version)): Path<(String, String, String)>,
) -> ApiResult<Response> {
    debug!("Downloading archive: {}/{}@{}", namespace, resource, version);

    let stream = state
        .registry
        .download_archive(&namespace, &resource, &version)
        .await
        .map_err(|e| ApiError::registry(e, format))?;

    Ok(responses::archive(&resource, &version, stream))
}

/// Download the archive of the version a channel points at
///
/// A channel that cannot be resolved fails before any archive lookup.
#[instrument(skip(state))]
pub async fn download_channel_archive(
    State(state): State<AppState>,
    ErrorFormat(format): ErrorFormat,
    Path((namespace, resource, channel)): Path<(String, String, String)>,
) -> ApiResult<Response> {
    let channel = state
        .registry
        .read_channel(&namespace, &resource, &channel)
        .await
        .map_err(|e| ApiError::registry(e, format))?;

    let version = channel.version.string;
    debug!(
        "Downloading archive: {}/{}#{} -> {}",
        namespace, resource, channel.name, version
    );

    let stream = state
        .registry
        .download_archive(&namespace, &resource, &version)
        .await
        .map_err(|e| ApiError::registry(e, format))?;

    Ok(responses::archive(&resource, &version, stream))
}
