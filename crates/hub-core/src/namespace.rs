//! Namespace types

use serde::{Deserialize, Serialize};

use crate::media::{MediaKind, MediaType};
use crate::resource::ResourceSummary;

/// Client-supplied namespace fields for create and update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceInfo {
    /// Namespace name
    pub name: String,

    /// Free-text description
    #[serde(default)]
    pub description: String,
}

/// A namespace with summaries of the resources it contains
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub resources: Vec<ResourceSummary>,

    /// Creation time (Unix seconds)
    #[serde(default)]
    pub created_at: i64,

    /// Last update time (Unix seconds)
    #[serde(default)]
    pub updated_at: i64,
}

/// Lightweight namespace entry used in listings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceSummary {
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub resource_count: usize,

    #[serde(default)]
    pub created_at: i64,

    #[serde(default)]
    pub updated_at: i64,
}

/// All namespaces in the registry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceList {
    #[serde(default)]
    pub namespaces: Vec<NamespaceSummary>,
}

impl MediaKind for NamespaceInfo {
    const MEDIA_TYPE: MediaType = MediaType::NamespaceInfo;
}

impl MediaKind for Namespace {
    const MEDIA_TYPE: MediaType = MediaType::Namespace;
}

impl MediaKind for NamespaceList {
    const MEDIA_TYPE: MediaType = MediaType::NamespaceList;
}
