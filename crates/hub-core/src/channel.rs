//! Channel types
//!
//! A channel is a named, repointable reference from a resource to one of
//! its versions. The reference is by version string only; deleting a
//! channel never touches the version it points at.

use serde::{Deserialize, Serialize};

use crate::media::{MediaKind, MediaType};
use crate::version::Version;

/// Client-supplied channel fields for create and update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelInfo {
    /// Channel name, unique within its resource
    pub name: String,

    /// Version string the channel points at
    pub version: String,

    #[serde(default)]
    pub description: String,
}

/// A channel together with the version it currently references
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    #[serde(default)]
    pub namespace: String,

    #[serde(default)]
    pub resource: String,

    pub name: String,

    /// Referenced version
    pub version: Version,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub created_at: i64,

    #[serde(default)]
    pub updated_at: i64,
}

/// Lightweight channel entry used in listings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSummary {
    pub name: String,

    /// Referenced version string
    pub version: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub created_at: i64,

    #[serde(default)]
    pub updated_at: i64,
}

/// All channels of a resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelList {
    #[serde(default)]
    pub channels: Vec<ChannelSummary>,
}

impl MediaKind for ChannelInfo {
    const MEDIA_TYPE: MediaType = MediaType::ChannelInfo;
}

impl MediaKind for Channel {
    const MEDIA_TYPE: MediaType = MediaType::Channel;
}

impl MediaKind for ChannelList {
    const MEDIA_TYPE: MediaType = MediaType::ChannelList;
}
