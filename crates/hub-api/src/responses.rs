//! API response types
//!
//! Successful responses carry a value of a fixed media kind encoded in the
//! negotiated format. The helpers here build the three success shapes used
//! by the handlers: `200 OK`, `201 Created` with a `Location`, and
//! `204 No Content`.

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use hub_core::{archive_filename, ArchiveStream, MediaKind, MediaType};
use serde::Serialize;

use crate::codec::{self, Format};
use crate::error::ApiError;

/// An encoded response body of a known media kind
#[derive(Debug)]
pub struct Encoded<T> {
    status: StatusCode,
    format: Format,
    location: Option<String>,
    value: T,
}

impl<T> Encoded<T> {
    /// Create a response with the given status
    pub fn new(status: StatusCode, format: Format, value: T) -> Self {
        Self {
            status,
            format,
            location: None,
            value,
        }
    }

    /// Set the `Location` header
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

impl<T> IntoResponse for Encoded<T>
where
    T: Serialize + MediaKind,
{
    fn into_response(self) -> Response {
        let (body, content_type) = match codec::encode(&self.value, T::MEDIA_TYPE, self.format) {
            Ok(encoded) => encoded,
            Err(err) => return ApiError::codec(err, Format::BASELINE).into_response(),
        };

        let mut response = (self.status, body).into_response();
        let headers = response.headers_mut();
        if let Ok(value) = HeaderValue::from_str(&content_type) {
            headers.insert(header::CONTENT_TYPE, value);
        }
        if let Some(location) = self.location {
            if let Ok(value) = HeaderValue::from_str(&location) {
                headers.insert(header::LOCATION, value);
            }
        }
        response
    }
}

/// Helper function to create a success response (200)
pub fn ok<T>(format: Format, value: T) -> Encoded<T> {
    Encoded::new(StatusCode::OK, format, value)
}

/// Helper function to create a created response (201)
pub fn created<T>(format: Format, location: impl Into<String>, value: T) -> Encoded<T> {
    Encoded::new(StatusCode::CREATED, format, value).with_location(location)
}

/// Helper function to create a no content response (204)
pub fn no_content() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Stream an archive to the client
///
/// The archive is forwarded chunk by chunk; nothing is buffered here.
pub fn archive(resource: &str, version: &str, stream: ArchiveStream) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", archive_filename(resource, version));

    let mut response = (StatusCode::OK, Body::from_stream(stream)).into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(MediaType::Archive.as_str()),
    );
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    response
}

/// Build an absolute path from raw segments, percent-encoding each one
pub fn location<'a>(segments: impl IntoIterator<Item = &'a str>) -> String {
    let mut url = match url::Url::parse("http://localhost/") {
        Ok(url) => url,
        Err(_) => return String::from("/"),
    };
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url.path().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hub_core::NamespaceInfo;

    #[test]
    fn test_location() {
        assert_eq!(location(["namespaces", "acme"]), "/namespaces/acme");
        assert_eq!(
            location(["namespaces", "acme", "resources", "widget", "versions", "1.0.0+build"]),
            "/namespaces/acme/resources/widget/versions/1.0.0+build"
        );
        assert_eq!(location(["namespaces", "a b/c"]), "/namespaces/a%20b%2Fc");
    }

    #[test]
    fn test_created_response() {
        let info = NamespaceInfo {
            name: "acme".to_string(),
            description: String::new(),
        };
        let response = created(Format::Json, "/namespaces/acme", info).into_response();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[header::LOCATION], "/namespaces/acme");
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/vnd.crucible.namespace-info.v0+json"
        );
    }

    #[test]
    fn test_archive_response_headers() {
        let response = archive("widget", "1.0.0", hub_core::archive_from_bytes("abc"));

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            MediaType::Archive.as_str()
        );
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"widget-1.0.0.tar.zst\""
        );
    }
}
