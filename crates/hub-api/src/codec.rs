//! Wire codec
//!
//! Translates between request/response bytes and typed values. A content
//! type is `{media kind}+{format}`: the media kind names the resource shape
//! and the format names the serialization. The two axes are independent, so
//! format negotiation is the same for every resource kind.

use bytes::Bytes;
use hub_core::{ErrorCode, MediaType};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt;
use thiserror::Error;

/// Serialization formats understood by the codec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Format {
    /// JSON, the baseline format
    #[default]
    Json,
    /// YAML
    Yaml,
}

impl Format {
    /// Format used when the client expresses no usable preference
    pub const BASELINE: Format = Format::Json;

    /// Content-type suffix, including the leading `+`
    pub fn suffix(&self) -> &'static str {
        match self {
            Format::Json => "+json",
            Format::Yaml => "+yaml",
        }
    }

    /// Resolve a content-type suffix (without `+`)
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix.trim().to_ascii_lowercase().as_str() {
            "json" => Some(Format::Json),
            "yaml" | "x-yaml" => Some(Format::Yaml),
            _ => None,
        }
    }

    /// Resolve a media-range subtype such as `json`, `x-yaml` or
    /// `vnd.crucible.version.v0+yaml`
    fn from_subtype(subtype: &str) -> Option<Self> {
        let subtype = subtype.to_ascii_lowercase();
        let tail = subtype.rsplit('+').next().unwrap_or(&subtype);
        Format::from_suffix(tail)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Json => f.write_str("json"),
            Format::Yaml => f.write_str("yaml"),
        }
    }
}

/// Codec failures
#[derive(Error, Debug)]
pub enum CodecError {
    /// Content-Type header missing or malformed
    #[error("invalid Content-Type: {0}")]
    InvalidContentType(String),

    /// Content-Type is well formed but names an unknown format
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Content-Type names a different media kind than the operation expects
    #[error("expected Content-Type {expected}+{{format}}, got {actual}")]
    MediaKindMismatch { expected: MediaType, actual: String },

    /// Body could not be deserialized
    #[error("malformed {format} body: {message}")]
    Decode { format: Format, message: String },

    /// Value could not be serialized
    #[error("failed to encode {format} body: {message}")]
    Encode { format: Format, message: String },

    /// Accept header excludes every supported format
    #[error("none of the supported formats (json, yaml) is acceptable: {0}")]
    NotAcceptable(String),
}

impl CodecError {
    /// Error code reported to the client
    pub fn code(&self) -> ErrorCode {
        match self {
            CodecError::InvalidContentType(_)
            | CodecError::MediaKindMismatch { .. }
            | CodecError::Decode { .. } => ErrorCode::BadRequest,
            CodecError::UnsupportedFormat(_) => ErrorCode::UnsupportedMediaType,
            CodecError::NotAcceptable(_) => ErrorCode::NotAcceptable,
            CodecError::Encode { .. } => ErrorCode::InternalError,
        }
    }
}

/// A parsed `{media kind}+{format}` content type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    /// Base media kind, as sent by the client
    pub media_type: String,

    /// Serialization format
    pub format: Format,
}

impl ContentType {
    /// Parse a Content-Type header value
    ///
    /// Parameters after `;` are ignored and the value is split at its last
    /// `+`. A value without a suffix is malformed; a value whose suffix is
    /// not a known format is unsupported.
    pub fn parse(header: &str) -> Result<Self, CodecError> {
        let value = header.split(';').next().unwrap_or_default().trim();
        if value.is_empty() {
            return Err(CodecError::InvalidContentType(
                "empty Content-Type".to_string(),
            ));
        }

        let (media_type, suffix) = value.rsplit_once('+').ok_or_else(|| {
            CodecError::InvalidContentType(format!("missing format suffix in {}", value))
        })?;

        match media_type.split_once('/') {
            Some((kind, subtype)) if !kind.is_empty() && !subtype.is_empty() => {}
            _ => {
                return Err(CodecError::InvalidContentType(format!(
                    "malformed media type {}",
                    value
                )))
            }
        }
        if suffix.is_empty() {
            return Err(CodecError::InvalidContentType(format!(
                "empty format suffix in {}",
                value
            )));
        }

        let format = Format::from_suffix(suffix)
            .ok_or_else(|| CodecError::UnsupportedFormat(suffix.to_string()))?;

        Ok(Self {
            media_type: media_type.to_string(),
            format,
        })
    }
}

/// Decode a request body declared as `content_type` into a `T` of the
/// `expected` media kind
///
/// The media kind is checked before the body is looked at.
pub fn decode<T: DeserializeOwned>(
    body: &[u8],
    content_type: Option<&str>,
    expected: MediaType,
) -> Result<T, CodecError> {
    let header = content_type
        .ok_or_else(|| CodecError::InvalidContentType("missing Content-Type".to_string()))?;
    let parsed = ContentType::parse(header)?;

    if !expected.matches(&parsed.media_type) {
        return Err(CodecError::MediaKindMismatch {
            expected,
            actual: header.to_string(),
        });
    }

    match parsed.format {
        Format::Json => serde_json::from_slice(body).map_err(|e| CodecError::Decode {
            format: Format::Json,
            message: e.to_string(),
        }),
        Format::Yaml => serde_yaml::from_slice(body).map_err(|e| CodecError::Decode {
            format: Format::Yaml,
            message: e.to_string(),
        }),
    }
}

/// Encode `value` in `format`, returning the body and its Content-Type
pub fn encode<T: Serialize + ?Sized>(
    value: &T,
    media_type: MediaType,
    format: Format,
) -> Result<(Bytes, String), CodecError> {
    let body = match format {
        Format::Json => serde_json::to_vec(value).map_err(|e| CodecError::Encode {
            format,
            message: e.to_string(),
        })?,
        Format::Yaml => serde_yaml::to_string(value)
            .map(String::into_bytes)
            .map_err(|e| CodecError::Encode {
                format,
                message: e.to_string(),
            })?,
    };

    Ok((Bytes::from(body), content_type(media_type, format)))
}

/// Content-Type header value for `media_type` serialized as `format`
pub fn content_type(media_type: MediaType, format: Format) -> String {
    format!("{}{}", media_type.as_str(), format.suffix())
}

/// A single Accept candidate
struct Candidate {
    format: Format,
    quality: f32,
}

/// Parse one media range into a candidate, if it names a usable format
///
/// Wildcard ranges stand for the baseline format.
fn parse_range(range: &str) -> Option<Candidate> {
    let mut parts = range.split(';');
    let media = parts.next()?.trim();
    let (_, subtype) = media.split_once('/')?;

    let mut quality = 1.0_f32;
    for param in parts {
        if let Some((key, value)) = param.split_once('=') {
            if key.trim().eq_ignore_ascii_case("q") {
                quality = value.trim().parse().ok()?;
                if !(0.0..=1.0).contains(&quality) {
                    return None;
                }
            }
        }
    }
    if quality <= 0.0 {
        return None;
    }

    let format = if subtype.trim() == "*" {
        Format::BASELINE
    } else {
        Format::from_subtype(subtype.trim())?
    };

    Some(Candidate { format, quality })
}

/// Select the response format from an Accept header
///
/// An absent or blank header yields the baseline format. Otherwise the
/// highest-quality candidate wins, ties going to the earlier entry;
/// wildcards count as the baseline. A header with no usable candidate is
/// [`CodecError::NotAcceptable`].
pub fn negotiate(accept: Option<&str>) -> Result<Format, CodecError> {
    let header = match accept.map(str::trim) {
        None | Some("") => return Ok(Format::BASELINE),
        Some(header) => header,
    };

    let mut best: Option<Candidate> = None;
    for candidate in header.split(',').filter_map(parse_range) {
        match &best {
            Some(current) if current.quality >= candidate.quality => {}
            _ => best = Some(candidate),
        }
    }

    best.map(|candidate| candidate.format)
        .ok_or_else(|| CodecError::NotAcceptable(header.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hub_core::{NamespaceInfo, Version, VersionInfo};

    #[test]
    fn test_parse_content_type() {
        let parsed = ContentType::parse("application/vnd.crucible.version-info.v0+json").unwrap();
        assert_eq!(parsed.media_type, "application/vnd.crucible.version-info.v0");
        assert_eq!(parsed.format, Format::Json);

        let parsed =
            ContentType::parse("application/vnd.crucible.version-info.v0+YAML; charset=utf-8")
                .unwrap();
        assert_eq!(parsed.format, Format::Yaml);
    }

    #[test]
    fn test_parse_content_type_malformed() {
        for header in ["", "application/json", "nonsense+json", "/x+json", "application/x+"] {
            let err = ContentType::parse(header).unwrap_err();
            assert!(
                matches!(err, CodecError::InvalidContentType(_)),
                "{} should be malformed",
                header
            );
            assert_eq!(err.code(), ErrorCode::BadRequest);
        }
    }

    #[test]
    fn test_parse_content_type_unknown_format() {
        let err = ContentType::parse("application/vnd.crucible.namespace-info.v0+xml").unwrap_err();
        assert!(matches!(err, CodecError::UnsupportedFormat(_)));
        assert_eq!(err.code(), ErrorCode::UnsupportedMediaType);
    }

    #[test]
    fn test_decode_json_and_yaml() {
        let info: NamespaceInfo = decode(
            br#"{"name":"acme","description":"d"}"#,
            Some("application/vnd.crucible.namespace-info.v0+json"),
            MediaType::NamespaceInfo,
        )
        .unwrap();
        assert_eq!(info.name, "acme");

        let info: NamespaceInfo = decode(
            b"name: acme\ndescription: d\n",
            Some("application/vnd.crucible.namespace-info.v0+yaml"),
            MediaType::NamespaceInfo,
        )
        .unwrap();
        assert_eq!(info.description, "d");
    }

    #[test]
    fn test_decode_kind_mismatch_precedes_parsing() {
        // The body is garbage; the kind check must fail first.
        let err = decode::<VersionInfo>(
            b"{not json",
            Some("application/vnd.crucible.channel-info.v0+json"),
            MediaType::VersionInfo,
        )
        .unwrap_err();
        assert!(matches!(err, CodecError::MediaKindMismatch { .. }));
    }

    #[test]
    fn test_decode_kind_case_insensitive() {
        let info: VersionInfo = decode(
            br#"{"string":"1.0.0"}"#,
            Some("Application/Vnd.Crucible.Version-Info.V0+json"),
            MediaType::VersionInfo,
        )
        .unwrap();
        assert_eq!(info.string, "1.0.0");
    }

    #[test]
    fn test_decode_malformed_body() {
        let err = decode::<NamespaceInfo>(
            b"{invalid json}",
            Some("application/vnd.crucible.namespace-info.v0+json"),
            MediaType::NamespaceInfo,
        )
        .unwrap_err();
        assert!(matches!(err, CodecError::Decode { .. }));
        assert_eq!(err.code(), ErrorCode::BadRequest);
    }

    #[test]
    fn test_decode_missing_content_type() {
        let err = decode::<NamespaceInfo>(b"{}", None, MediaType::NamespaceInfo).unwrap_err();
        assert!(matches!(err, CodecError::InvalidContentType(_)));
    }

    #[test]
    fn test_encode_content_type() {
        let info = VersionInfo {
            string: "1.0.0".to_string(),
        };
        let (body, header) = encode(&info, MediaType::VersionInfo, Format::Yaml).unwrap();
        assert_eq!(header, "application/vnd.crucible.version-info.v0+yaml");
        assert!(std::str::from_utf8(&body).unwrap().contains("string: 1.0.0"));
    }

    #[test]
    fn test_encode_then_decode_preserves_value() {
        let version = Version {
            namespace: "acme".to_string(),
            resource: "widget".to_string(),
            string: "1.2.3".to_string(),
            archive: Some(hub_core::ArchiveRef {
                digest: "sha256:00".to_string(),
                size: 42,
            }),
            published_at: Some(1_700_000_100),
            created_at: 1_700_000_000,
            updated_at: 1_700_000_050,
        };

        for format in [Format::Json, Format::Yaml] {
            let (body, header) = encode(&version, MediaType::Version, format).unwrap();
            let decoded: Version = decode(&body, Some(&header), MediaType::Version).unwrap();
            assert_eq!(decoded, version);
        }
    }

    #[test]
    fn test_negotiate_baseline() {
        assert_eq!(negotiate(None).unwrap(), Format::Json);
        assert_eq!(negotiate(Some("")).unwrap(), Format::Json);
        assert_eq!(negotiate(Some("  ")).unwrap(), Format::Json);
        assert_eq!(negotiate(Some("*/*")).unwrap(), Format::Json);
        assert_eq!(negotiate(Some("application/*")).unwrap(), Format::Json);
    }

    #[test]
    fn test_negotiate_explicit() {
        assert_eq!(negotiate(Some("application/json")).unwrap(), Format::Json);
        assert_eq!(negotiate(Some("application/yaml")).unwrap(), Format::Yaml);
        assert_eq!(negotiate(Some("text/x-yaml")).unwrap(), Format::Yaml);
        assert_eq!(
            negotiate(Some("application/vnd.crucible.version.v0+yaml")).unwrap(),
            Format::Yaml
        );
    }

    #[test]
    fn test_negotiate_quality() {
        assert_eq!(
            negotiate(Some("application/json;q=0.5, application/yaml")).unwrap(),
            Format::Yaml
        );
        assert_eq!(
            negotiate(Some("application/yaml;q=0.4, */*;q=0.8")).unwrap(),
            Format::Json
        );
        assert_eq!(
            negotiate(Some("text/html, application/yaml;q=0.1")).unwrap(),
            Format::Yaml
        );
        // Ties go to the earlier entry.
        assert_eq!(
            negotiate(Some("application/yaml, application/json")).unwrap(),
            Format::Yaml
        );
    }

    #[test]
    fn test_negotiate_not_acceptable() {
        for header in ["text/html", "application/xml, image/png", "application/yaml;q=0", "garbage"] {
            let err = negotiate(Some(header)).unwrap_err();
            assert!(matches!(err, CodecError::NotAcceptable(_)), "{}", header);
            assert_eq!(err.code(), ErrorCode::NotAcceptable);
        }
    }
}
