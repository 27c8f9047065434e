//! Error types for the hub
//!
//! Provider failures are either a [`DomainError`] carrying a code from the
//! closed [`ErrorCode`] enumeration, or an opaque error the front end knows
//! nothing about. The distinction is made by the [`RegistryError`] variant,
//! never by inspecting the runtime type of an error value.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::media::{MediaKind, MediaType};

/// Result type alias for registry operations
pub type RegistryResult<T> = std::result::Result<T, RegistryError>;

/// Closed set of error codes exchanged on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    /// Malformed request (bad name, undecodable body, bad content type)
    BadRequest,
    /// Entity does not exist
    NotFound,
    /// Namespace name already taken
    NamespaceExists,
    /// Resource name already taken within its namespace
    ResourceExists,
    /// Version string already taken within its resource
    VersionExists,
    /// Channel name already taken within its resource
    ChannelExists,
    /// Namespace still contains resources
    NamespaceNotEmpty,
    /// Resource still has published versions
    ResourceHasPublished,
    /// Version is published and therefore immutable
    VersionPublished,
    /// A precondition of the operation does not hold
    PreconditionFailed,
    /// Request body format is not supported
    UnsupportedMediaType,
    /// No acceptable response format
    NotAcceptable,
    /// Anything else
    InternalError,
}

impl ErrorCode {
    /// All codes, in declaration order
    pub const ALL: [ErrorCode; 13] = [
        ErrorCode::BadRequest,
        ErrorCode::NotFound,
        ErrorCode::NamespaceExists,
        ErrorCode::ResourceExists,
        ErrorCode::VersionExists,
        ErrorCode::ChannelExists,
        ErrorCode::NamespaceNotEmpty,
        ErrorCode::ResourceHasPublished,
        ErrorCode::VersionPublished,
        ErrorCode::PreconditionFailed,
        ErrorCode::UnsupportedMediaType,
        ErrorCode::NotAcceptable,
        ErrorCode::InternalError,
    ];

    /// Wire name of the code
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::BadRequest => "BadRequest",
            ErrorCode::NotFound => "NotFound",
            ErrorCode::NamespaceExists => "NamespaceExists",
            ErrorCode::ResourceExists => "ResourceExists",
            ErrorCode::VersionExists => "VersionExists",
            ErrorCode::ChannelExists => "ChannelExists",
            ErrorCode::NamespaceNotEmpty => "NamespaceNotEmpty",
            ErrorCode::ResourceHasPublished => "ResourceHasPublished",
            ErrorCode::VersionPublished => "VersionPublished",
            ErrorCode::PreconditionFailed => "PreconditionFailed",
            ErrorCode::UnsupportedMediaType => "UnsupportedMediaType",
            ErrorCode::NotAcceptable => "NotAcceptable",
            ErrorCode::InternalError => "InternalError",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A domain error: a code plus a human-readable message
///
/// This is also the payload of the `error` media kind, so it is encoded with
/// the same codec as every other response body.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct DomainError {
    /// Error code
    pub code: ErrorCode,

    /// Error message
    pub message: String,
}

impl DomainError {
    /// Create a new domain error
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn precondition_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PreconditionFailed, message)
    }
}

impl MediaKind for DomainError {
    const MEDIA_TYPE: MediaType = MediaType::Error;
}

/// Error returned by a [`Registry`](crate::Registry) operation
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A recognized domain error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Anything the provider could not classify
    #[error(transparent)]
    Opaque(#[from] anyhow::Error),
}

impl RegistryError {
    /// Shorthand for a domain error
    pub fn domain(code: ErrorCode, message: impl Into<String>) -> Self {
        RegistryError::Domain(DomainError::new(code, message))
    }

    /// The domain code, if this is a domain error
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            RegistryError::Domain(err) => Some(err.code),
            RegistryError::Opaque(_) => None,
        }
    }
}

impl From<std::io::Error> for RegistryError {
    fn from(err: std::io::Error) -> Self {
        RegistryError::Opaque(err.into())
    }
}
