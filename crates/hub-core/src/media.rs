//! Media kinds
//!
//! Every resource shape advertises one base media kind regardless of the
//! serialization format. The format travels as a `+suffix` appended by the
//! codec.

use std::fmt;
use std::str::FromStr;

/// Base media kind of a request or response body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaType {
    Namespace,
    NamespaceInfo,
    NamespaceList,
    Resource,
    ResourceInfo,
    ResourceList,
    Version,
    VersionInfo,
    VersionList,
    Channel,
    ChannelInfo,
    ChannelList,
    Error,
    /// Raw archive bytes; never carries a format suffix
    Archive,
}

impl MediaType {
    /// All media kinds
    pub const ALL: [MediaType; 14] = [
        MediaType::Namespace,
        MediaType::NamespaceInfo,
        MediaType::NamespaceList,
        MediaType::Resource,
        MediaType::ResourceInfo,
        MediaType::ResourceList,
        MediaType::Version,
        MediaType::VersionInfo,
        MediaType::VersionList,
        MediaType::Channel,
        MediaType::ChannelInfo,
        MediaType::ChannelList,
        MediaType::Error,
        MediaType::Archive,
    ];

    /// Full media type string, without format suffix
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Namespace => "application/vnd.crucible.namespace.v0",
            MediaType::NamespaceInfo => "application/vnd.crucible.namespace-info.v0",
            MediaType::NamespaceList => "application/vnd.crucible.namespace-list.v0",
            MediaType::Resource => "application/vnd.crucible.resource.v0",
            MediaType::ResourceInfo => "application/vnd.crucible.resource-info.v0",
            MediaType::ResourceList => "application/vnd.crucible.resource-list.v0",
            MediaType::Version => "application/vnd.crucible.version.v0",
            MediaType::VersionInfo => "application/vnd.crucible.version-info.v0",
            MediaType::VersionList => "application/vnd.crucible.version-list.v0",
            MediaType::Channel => "application/vnd.crucible.channel.v0",
            MediaType::ChannelInfo => "application/vnd.crucible.channel-info.v0",
            MediaType::ChannelList => "application/vnd.crucible.channel-list.v0",
            MediaType::Error => "application/vnd.crucible.error.v0",
            MediaType::Archive => "application/vnd.crucible.archive.v0",
        }
    }

    /// Case-insensitive comparison against a base media type string
    pub fn matches(&self, base: &str) -> bool {
        self.as_str().eq_ignore_ascii_case(base.trim())
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MediaType::ALL
            .into_iter()
            .find(|media| media.matches(s))
            .ok_or_else(|| format!("Unknown media type: {}", s))
    }
}

/// A value exchanged under a fixed media kind
pub trait MediaKind {
    /// Media kind the value is advertised as
    const MEDIA_TYPE: MediaType;
}
