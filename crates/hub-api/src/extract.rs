//! Request extractors
//!
//! [`Negotiated`] resolves the response format from `Accept` and
//! [`Decoded`] decodes a request body of the operation's media kind. Both
//! reject with an [`ApiError`] before the provider is ever called.
//! [`ErrorFormat`] is the lenient variant for deletes and archive
//! downloads, where `Accept` only shapes error bodies.

use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Request},
    http::{header, request::Parts, HeaderMap},
};
use hub_core::{ErrorCode, MediaKind};
use serde::de::DeserializeOwned;
use std::convert::Infallible;

use crate::codec::{self, Format};
use crate::error::ApiError;

/// Header carrying the uploader's archive digest
pub const ARCHIVE_DIGEST: &str = "archive-digest";

fn header_str<'a>(headers: &'a HeaderMap, name: impl header::AsHeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Format for rendering errors when negotiation itself may have failed
pub fn error_format(headers: &HeaderMap) -> Format {
    codec::negotiate(header_str(headers, header::ACCEPT)).unwrap_or(Format::BASELINE)
}

/// The `Archive-Digest` header, if present
pub fn archive_digest(headers: &HeaderMap) -> Option<String> {
    header_str(headers, ARCHIVE_DIGEST).map(|value| value.trim().to_string())
}

/// Response format negotiated from the `Accept` header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Negotiated(pub Format);

impl<S> FromRequestParts<S> for Negotiated
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        codec::negotiate(header_str(&parts.headers, header::ACCEPT))
            .map(Negotiated)
            .map_err(|err| ApiError::codec(err, Format::BASELINE))
    }
}

/// Format for error bodies on operations whose success carries no encoded body
///
/// Never rejects: an unusable `Accept` falls back to the baseline format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorFormat(pub Format);

impl<S> FromRequestParts<S> for ErrorFormat
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ErrorFormat(error_format(&parts.headers)))
    }
}

/// A request body decoded as `T`, checked against `T`'s media kind
#[derive(Debug, Clone)]
pub struct Decoded<T>(pub T);

impl<S, T> FromRequest<S> for Decoded<T>
where
    S: Send + Sync,
    T: DeserializeOwned + MediaKind,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let format = error_format(req.headers());
        let content_type = header_str(req.headers(), header::CONTENT_TYPE).map(str::to_owned);

        let body = Bytes::from_request(req, state).await.map_err(|rejection| {
            ApiError::with_code(ErrorCode::BadRequest, rejection.body_text(), format)
        })?;

        codec::decode(&body, content_type.as_deref(), T::MEDIA_TYPE)
            .map(Decoded)
            .map_err(|err| ApiError::codec(err, format))
    }
}
