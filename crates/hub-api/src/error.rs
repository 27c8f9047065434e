//! API error handling
//!
//! This module maps domain error codes onto HTTP status codes and renders
//! error responses. Errors are ordinary encodable values of the `error`
//! media kind, serialized in the request's negotiated format.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use hub_core::{DomainError, ErrorCode, MediaType, RegistryError};
use std::fmt;
use tracing::{debug, error};

use crate::codec::{self, CodecError, Format};

/// HTTP status for a domain error code
///
/// Total over [`ErrorCode`]; anything outside the table is a server error.
pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::BadRequest => StatusCode::BAD_REQUEST,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::NamespaceExists
        | ErrorCode::ResourceExists
        | ErrorCode::VersionExists
        | ErrorCode::ChannelExists
        | ErrorCode::NamespaceNotEmpty
        | ErrorCode::ResourceHasPublished
        | ErrorCode::VersionPublished => StatusCode::CONFLICT,
        ErrorCode::PreconditionFailed => StatusCode::PRECONDITION_FAILED,
        ErrorCode::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        ErrorCode::NotAcceptable => StatusCode::NOT_ACCEPTABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// API error type that can be converted to HTTP responses
#[derive(Debug)]
pub struct ApiError {
    status_code: StatusCode,
    error: DomainError,
    format: Format,
}

impl ApiError {
    /// Create an error whose status follows from its code
    pub fn new(error: DomainError, format: Format) -> Self {
        Self {
            status_code: status_for(error.code),
            error,
            format,
        }
    }

    /// Create an error from a code and message
    pub fn with_code(code: ErrorCode, message: impl Into<String>, format: Format) -> Self {
        Self::new(DomainError::new(code, message), format)
    }

    /// Map a provider error
    ///
    /// Domain errors keep their code and message. Opaque errors become
    /// `InternalError` with the provider's message surfaced verbatim.
    pub fn registry(err: RegistryError, format: Format) -> Self {
        match err {
            RegistryError::Domain(error) => Self::new(error, format),
            RegistryError::Opaque(err) => {
                Self::with_code(ErrorCode::InternalError, err.to_string(), format)
            }
        }
    }

    /// Map a local codec failure
    pub fn codec(err: CodecError, format: Format) -> Self {
        Self::with_code(err.code(), err.to_string(), format)
    }

    /// Create a not found error (404)
    pub fn not_found(message: impl Into<String>, format: Format) -> Self {
        Self::with_code(ErrorCode::NotFound, message, format)
    }

    /// HTTP status of this error
    pub fn status_code(&self) -> StatusCode {
        self.status_code
    }

    /// Error code carried in the body
    pub fn code(&self) -> ErrorCode {
        self.error.code
    }

    /// Error message carried in the body
    pub fn message(&self) -> &str {
        &self.error.message
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status_code.is_server_error() {
            error!(code = %self.error.code, message = %self.error.message, "request failed");
        } else {
            debug!(code = %self.error.code, message = %self.error.message, "request rejected");
        }

        let encoded = codec::encode(&self.error, MediaType::Error, self.format)
            .or_else(|_| codec::encode(&self.error, MediaType::Error, Format::BASELINE));

        match encoded {
            Ok((body, content_type)) => {
                let mut response = (self.status_code, body).into_response();
                if let Ok(value) = HeaderValue::from_str(&content_type) {
                    response.headers_mut().insert(header::CONTENT_TYPE, value);
                }
                response
            }
            Err(_) => (self.status_code, self.error.message).into_response(),
        }
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
