//! Version types
//!
//! A version is identified by its semantic-version string, which is
//! immutable once created. It becomes published through a provider-side
//! action; published versions can no longer be updated or deleted.

use serde::{Deserialize, Serialize};

use crate::media::{MediaKind, MediaType};

/// Client-supplied version fields for create and update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    /// Semantic version string
    pub string: String,
}

/// Archive attached to a version
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveRef {
    /// Digest supplied by the uploader, e.g. `sha256:<hex>`
    pub digest: String,

    /// Archive size in bytes
    pub size: u64,
}

/// A version of a resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    #[serde(default)]
    pub namespace: String,

    #[serde(default)]
    pub resource: String,

    /// Semantic version string
    pub string: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive: Option<ArchiveRef>,

    /// Publish time (Unix seconds), absent while unpublished
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<i64>,

    #[serde(default)]
    pub created_at: i64,

    #[serde(default)]
    pub updated_at: i64,
}

impl Version {
    /// Whether the version has been published
    pub fn is_published(&self) -> bool {
        self.published_at.is_some()
    }

    /// Listing entry for this version
    pub fn summary(&self) -> VersionSummary {
        VersionSummary {
            string: self.string.clone(),
            published: self.is_published(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Lightweight version entry used in listings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionSummary {
    pub string: String,

    #[serde(default)]
    pub published: bool,

    #[serde(default)]
    pub created_at: i64,

    #[serde(default)]
    pub updated_at: i64,
}

/// All versions of a resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionList {
    #[serde(default)]
    pub versions: Vec<VersionSummary>,
}

impl MediaKind for VersionInfo {
    const MEDIA_TYPE: MediaType = MediaType::VersionInfo;
}

impl MediaKind for Version {
    const MEDIA_TYPE: MediaType = MediaType::Version;
}

impl MediaKind for VersionList {
    const MEDIA_TYPE: MediaType = MediaType::VersionList;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unpublished_version_omits_optional_fields() {
        let version = Version {
            namespace: "acme".to_string(),
            resource: "widget".to_string(),
            string: "1.0.0".to_string(),
            ..Default::default()
        };

        let json = serde_json::to_value(&version).unwrap();
        assert!(json.get("archive").is_none());
        assert!(json.get("published_at").is_none());
        assert!(!version.summary().published);
    }
}
