//! Resource types

use serde::{Deserialize, Serialize};

use crate::channel::ChannelSummary;
use crate::media::{MediaKind, MediaType};
use crate::version::VersionSummary;

/// Client-supplied resource fields for create and update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceInfo {
    /// Resource name, unique within its namespace
    pub name: String,

    /// Resource type tag
    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default)]
    pub description: String,
}

/// A resource with summaries of its versions and channels
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Owning namespace
    pub namespace: String,

    pub name: String,

    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub versions: Vec<VersionSummary>,

    #[serde(default)]
    pub channels: Vec<ChannelSummary>,

    #[serde(default)]
    pub created_at: i64,

    #[serde(default)]
    pub updated_at: i64,
}

/// Lightweight resource entry used in listings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSummary {
    pub name: String,

    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub created_at: i64,

    #[serde(default)]
    pub updated_at: i64,
}

/// All resources of a namespace
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceList {
    #[serde(default)]
    pub resources: Vec<ResourceSummary>,
}

impl MediaKind for ResourceInfo {
    const MEDIA_TYPE: MediaType = MediaType::ResourceInfo;
}

impl MediaKind for Resource {
    const MEDIA_TYPE: MediaType = MediaType::Resource;
}

impl MediaKind for ResourceList {
    const MEDIA_TYPE: MediaType = MediaType::ResourceList;
}
