//! Registry metadata and its on-disk index
//!
//! The whole catalog is one [`Index`] value, persisted as JSON next to the
//! archives and rewritten atomically after every mutation.

use anyhow::Context;
use hub_core::{
    ArchiveRef, Channel, ChannelSummary, ErrorCode, Namespace, NamespaceSummary, RegistryError,
    RegistryResult, Resource, ResourceSummary, Version, VersionSummary,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Current Unix time in seconds
pub(crate) fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

fn not_found(message: String) -> RegistryError {
    RegistryError::domain(ErrorCode::NotFound, message)
}

/// The complete catalog
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct Index {
    #[serde(default)]
    pub namespaces: BTreeMap<String, NamespaceEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct NamespaceEntry {
    #[serde(default)]
    pub description: String,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(default)]
    pub resources: BTreeMap<String, ResourceEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ResourceEntry {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub description: String,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(default)]
    pub versions: BTreeMap<String, VersionEntry>,
    #[serde(default)]
    pub channels: BTreeMap<String, ChannelEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct VersionEntry {
    #[serde(default)]
    pub archive: Option<ArchiveRef>,
    #[serde(default)]
    pub published_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ChannelEntry {
    pub version: String,
    #[serde(default)]
    pub description: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Index {
    /// Load the index, or start empty if it does not exist yet
    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        match tokio::fs::read(path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .with_context(|| format!("failed to parse index {}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => {
                Err(e).with_context(|| format!("failed to read index {}", path.display()))
            }
        }
    }

    /// Write the index through a temporary file and rename it into place
    pub async fn save(&self, path: &Path) -> anyhow::Result<()> {
        let bytes = serde_json::to_vec_pretty(self).context("failed to serialize index")?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes)
            .await
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, path)
            .await
            .with_context(|| format!("failed to replace index {}", path.display()))?;
        Ok(())
    }

    pub fn namespace(&self, namespace: &str) -> RegistryResult<&NamespaceEntry> {
        self.namespaces
            .get(namespace)
            .ok_or_else(|| not_found(format!("namespace {} not found", namespace)))
    }

    pub fn namespace_mut(&mut self, namespace: &str) -> RegistryResult<&mut NamespaceEntry> {
        self.namespaces
            .get_mut(namespace)
            .ok_or_else(|| not_found(format!("namespace {} not found", namespace)))
    }

    pub fn resource(&self, namespace: &str, resource: &str) -> RegistryResult<&ResourceEntry> {
        self.namespace(namespace)?
            .resources
            .get(resource)
            .ok_or_else(|| not_found(format!("resource {}/{} not found", namespace, resource)))
    }

    pub fn resource_mut(
        &mut self,
        namespace: &str,
        resource: &str,
    ) -> RegistryResult<&mut ResourceEntry> {
        self.namespace_mut(namespace)?
            .resources
            .get_mut(resource)
            .ok_or_else(|| not_found(format!("resource {}/{} not found", namespace, resource)))
    }

    pub fn version(
        &self,
        namespace: &str,
        resource: &str,
        version: &str,
    ) -> RegistryResult<&VersionEntry> {
        self.resource(namespace, resource)?
            .versions
            .get(version)
            .ok_or_else(|| version_not_found(namespace, resource, version))
    }

    pub fn version_mut(
        &mut self,
        namespace: &str,
        resource: &str,
        version: &str,
    ) -> RegistryResult<&mut VersionEntry> {
        self.resource_mut(namespace, resource)?
            .versions
            .get_mut(version)
            .ok_or_else(|| version_not_found(namespace, resource, version))
    }
}

fn version_not_found(namespace: &str, resource: &str, version: &str) -> RegistryError {
    not_found(format!(
        "version {}/{}@{} not found",
        namespace, resource, version
    ))
}

impl NamespaceEntry {
    pub fn new(description: String) -> Self {
        let now = now();
        Self {
            description,
            created_at: now,
            updated_at: now,
            resources: BTreeMap::new(),
        }
    }

    pub fn to_namespace(&self, name: &str) -> Namespace {
        Namespace {
            name: name.to_string(),
            description: self.description.clone(),
            resources: self
                .resources
                .iter()
                .map(|(name, entry)| entry.summary(name))
                .collect(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn summary(&self, name: &str) -> NamespaceSummary {
        NamespaceSummary {
            name: name.to_string(),
            description: self.description.clone(),
            resource_count: self.resources.len(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl ResourceEntry {
    pub fn new(kind: String, description: String) -> Self {
        let now = now();
        Self {
            kind,
            description,
            created_at: now,
            updated_at: now,
            versions: BTreeMap::new(),
            channels: BTreeMap::new(),
        }
    }

    pub fn to_resource(&self, namespace: &str, name: &str) -> Resource {
        Resource {
            namespace: namespace.to_string(),
            name: name.to_string(),
            kind: self.kind.clone(),
            description: self.description.clone(),
            versions: self.version_summaries(),
            channels: self.channel_summaries(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn summary(&self, name: &str) -> ResourceSummary {
        ResourceSummary {
            name: name.to_string(),
            kind: self.kind.clone(),
            description: self.description.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Versions in semantic-version order
    pub fn version_summaries(&self) -> Vec<VersionSummary> {
        let mut versions: Vec<_> = self.versions.iter().collect();
        versions.sort_by(|(a, _), (b, _)| {
            match (semver::Version::parse(a), semver::Version::parse(b)) {
                (Ok(a), Ok(b)) => a.cmp(&b),
                _ => a.cmp(b),
            }
        });
        versions
            .into_iter()
            .map(|(string, entry)| entry.summary(string))
            .collect()
    }

    pub fn channel_summaries(&self) -> Vec<ChannelSummary> {
        self.channels
            .iter()
            .map(|(name, entry)| entry.summary(name))
            .collect()
    }

    pub fn has_published(&self) -> bool {
        self.versions.values().any(VersionEntry::is_published)
    }

    /// Channels pointing at `version`
    pub fn channels_referencing<'a>(&'a self, version: &'a str) -> impl Iterator<Item = &'a str> {
        self.channels
            .iter()
            .filter(move |(_, entry)| entry.version == version)
            .map(|(name, _)| name.as_str())
    }

    pub fn to_channel(
        &self,
        namespace: &str,
        resource: &str,
        name: &str,
        entry: &ChannelEntry,
    ) -> RegistryResult<Channel> {
        let version = self
            .versions
            .get(&entry.version)
            .ok_or_else(|| version_not_found(namespace, resource, &entry.version))?;

        Ok(Channel {
            namespace: namespace.to_string(),
            resource: resource.to_string(),
            name: name.to_string(),
            version: version.to_version(namespace, resource, &entry.version),
            description: entry.description.clone(),
            created_at: entry.created_at,
            updated_at: entry.updated_at,
        })
    }
}

impl VersionEntry {
    pub fn new() -> Self {
        let now = now();
        Self {
            archive: None,
            published_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_published(&self) -> bool {
        self.published_at.is_some()
    }

    pub fn to_version(&self, namespace: &str, resource: &str, string: &str) -> Version {
        Version {
            namespace: namespace.to_string(),
            resource: resource.to_string(),
            string: string.to_string(),
            archive: self.archive.clone(),
            published_at: self.published_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn summary(&self, string: &str) -> VersionSummary {
        VersionSummary {
            string: string.to_string(),
            published: self.is_published(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl ChannelEntry {
    pub fn new(version: String, description: String) -> Self {
        let now = now();
        Self {
            version,
            description,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn summary(&self, name: &str) -> ChannelSummary {
        ChannelSummary {
            name: name.to_string(),
            version: self.version.clone(),
            description: self.description.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource_with_versions(versions: &[&str]) -> ResourceEntry {
        let mut resource = ResourceEntry::new("widget".to_string(), String::new());
        for v in versions {
            resource.versions.insert(v.to_string(), VersionEntry::new());
        }
        resource
    }

    #[test]
    fn test_versions_in_semver_order() {
        let resource = resource_with_versions(&["1.10.0", "1.2.0", "1.2.0-rc.1", "0.9.1"]);
        let order: Vec<_> = resource
            .version_summaries()
            .into_iter()
            .map(|v| v.string)
            .collect();
        assert_eq!(order, ["0.9.1", "1.2.0-rc.1", "1.2.0", "1.10.0"]);
    }

    #[test]
    fn test_channels_referencing() {
        let mut resource = resource_with_versions(&["1.0.0", "2.0.0"]);
        resource.channels.insert(
            "stable".to_string(),
            ChannelEntry::new("1.0.0".to_string(), String::new()),
        );
        resource.channels.insert(
            "beta".to_string(),
            ChannelEntry::new("2.0.0".to_string(), String::new()),
        );

        let names: Vec<_> = resource.channels_referencing("1.0.0").collect();
        assert_eq!(names, ["stable"]);
        assert_eq!(resource.channels_referencing("3.0.0").count(), 0);
    }

    #[test]
    fn test_lookup_errors_are_not_found() {
        let index = Index::default();
        let err = index.version("acme", "widget", "1.0.0").unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::NotFound));
        assert!(err.to_string().contains("namespace acme"));
    }

    #[tokio::test]
    async fn test_index_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.json");

        assert!(Index::load(&path).await.unwrap().namespaces.is_empty());

        let mut index = Index::default();
        let mut namespace = NamespaceEntry::new("Acme".to_string());
        namespace
            .resources
            .insert("widget".to_string(), resource_with_versions(&["1.0.0"]));
        index.namespaces.insert("acme".to_string(), namespace);
        index.save(&path).await.unwrap();

        let loaded = Index::load(&path).await.unwrap();
        let resource = loaded.resource("acme", "widget").unwrap();
        assert!(resource.versions.contains_key("1.0.0"));
        assert!(!path.with_extension("json.tmp").exists());
    }
}
