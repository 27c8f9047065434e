//! Test fixtures
//!
//! Sample request bodies and request builders for the wire format.

use axum::{
    body::Body,
    http::{header, Method, Request},
};
use hub_core::{ChannelInfo, MediaType, NamespaceInfo, ResourceInfo, VersionInfo};
use serde::Serialize;
use sha2::{Digest, Sha256};

pub const JSON: &str = "json";
pub const YAML: &str = "yaml";

/// Sample archive contents
pub const ARCHIVE: &[u8] = b"crucible test archive";

pub fn namespace_info(name: &str) -> NamespaceInfo {
    NamespaceInfo {
        name: name.to_string(),
        description: format!("Test namespace: {}", name),
    }
}

pub fn resource_info(name: &str) -> ResourceInfo {
    ResourceInfo {
        name: name.to_string(),
        kind: "widget".to_string(),
        description: format!("Test resource: {}", name),
    }
}

pub fn version_info(string: &str) -> VersionInfo {
    VersionInfo {
        string: string.to_string(),
    }
}

pub fn channel_info(name: &str, version: &str) -> ChannelInfo {
    ChannelInfo {
        name: name.to_string(),
        version: version.to_string(),
        description: format!("Test channel: {}", name),
    }
}

/// Content-Type for `media_type` in `format`
pub fn content_type(media_type: MediaType, format: &str) -> String {
    format!("{}+{}", media_type.as_str(), format)
}

/// Serialize `value` in `format`
pub fn encode<T: Serialize>(value: &T, format: &str) -> Vec<u8> {
    match format {
        YAML => serde_yaml::to_string(value)
            .expect("Failed to encode YAML")
            .into_bytes(),
        _ => serde_json::to_vec(value).expect("Failed to encode JSON"),
    }
}

/// `sha256:{hex}` digest of `data`
pub fn digest(data: &[u8]) -> String {
    let hex: String = Sha256::digest(data)
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect();
    format!("sha256:{}", hex)
}

/// Request without a body
pub fn request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("Failed to build request")
}

/// Request with `value` encoded as JSON under its media kind
pub fn json_request<T: Serialize>(
    method: Method,
    uri: &str,
    media_type: MediaType,
    value: &T,
) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, content_type(media_type, JSON))
        .body(Body::from(encode(value, JSON)))
        .expect("Failed to build request")
}

/// Request with a raw body and Content-Type
pub fn raw_request(method: Method, uri: &str, content_type: &str, body: &[u8]) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body.to_vec()))
        .expect("Failed to build request")
}
