//! Local registry provider
//!
//! Keeps the catalog in memory behind a [`RwLock`], saves every mutation to
//! `{root}/index.json` before it becomes visible, and stores archives as files
//! under the same root. Archive bytes are never read or written while the
//! lock is held.

use async_trait::async_trait;
use hub_core::{
    ArchiveRef, ArchiveStream, Channel, ChannelInfo, ChannelList, ErrorCode, Namespace,
    NamespaceInfo, NamespaceList, Registry, RegistryError, RegistryResult, Resource, ResourceInfo,
    ResourceList, Version, VersionInfo, VersionList,
};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::archives::ArchiveStore;
use crate::store::{now, ChannelEntry, Index, NamespaceEntry, ResourceEntry, VersionEntry};
use crate::validation::{digest_hex, format_digest, parse_digest, validate_name, validate_version};

/// File name of the persisted catalog
pub const INDEX_FILE: &str = "index.json";

fn error(code: ErrorCode, message: String) -> RegistryError {
    RegistryError::domain(code, message)
}

fn version_published(namespace: &str, resource: &str, version: &str) -> RegistryError {
    error(
        ErrorCode::VersionPublished,
        format!("version {}/{}@{} is published", namespace, resource, version),
    )
}

/// Reject an update that would rename the entity
fn check_identifier(kind: &str, path: &str, body: &str) -> RegistryResult<()> {
    if body.is_empty() || body == path {
        Ok(())
    } else {
        Err(error(
            ErrorCode::BadRequest,
            format!("{} identifier mismatch: path {:?}, body {:?}", kind, path, body),
        ))
    }
}

fn validate_resource_path(namespace: &str, resource: &str) -> RegistryResult<()> {
    validate_name("namespace", namespace)?;
    validate_name("resource", resource)
}

fn validate_version_path(namespace: &str, resource: &str, version: &str) -> RegistryResult<()> {
    validate_resource_path(namespace, resource)?;
    validate_version(version).map(|_| ())
}

fn validate_channel_path(namespace: &str, resource: &str, channel: &str) -> RegistryResult<()> {
    validate_resource_path(namespace, resource)?;
    validate_name("channel", channel)
}

/// Filesystem-backed [`Registry`] implementation
#[derive(Debug)]
pub struct LocalRegistry {
    state: RwLock<Index>,
    archives: ArchiveStore,
    index_path: PathBuf,
}

impl LocalRegistry {
    /// Open (or initialize) a registry rooted at `root`
    pub async fn open(root: impl Into<PathBuf>) -> anyhow::Result<Self> {
        use anyhow::Context;

        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .with_context(|| format!("failed to create archive root {}", root.display()))?;

        let index_path = root.join(INDEX_FILE);
        let index = Index::load(&index_path).await?;
        info!(
            "Opened registry at {} ({} namespaces)",
            root.display(),
            index.namespaces.len()
        );

        Ok(Self {
            state: RwLock::new(index),
            archives: ArchiveStore::new(root),
            index_path,
        })
    }

    /// Location of the persisted catalog
    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    /// Apply `mutate` to a copy of the catalog and swap it in once saved
    ///
    /// A failed save leaves `state` untouched.
    async fn apply<T>(
        &self,
        state: &mut Index,
        mutate: impl FnOnce(&mut Index) -> RegistryResult<T>,
    ) -> RegistryResult<T> {
        let mut next = state.clone();
        let value = mutate(&mut next)?;
        next.save(&self.index_path).await?;
        *state = next;
        Ok(value)
    }

    /// Mark a version as published
    ///
    /// Requires an uploaded archive. Published versions are immutable.
    #[instrument(skip(self))]
    pub async fn publish_version(
        &self,
        namespace: &str,
        resource: &str,
        version: &str,
    ) -> RegistryResult<Version> {
        validate_version_path(namespace, resource, version)?;

        let mut state = self.state.write().await;
        let published = self
            .apply(&mut state, |index| {
                let entry = index.version_mut(namespace, resource, version)?;
                if entry.is_published() {
                    return Err(version_published(namespace, resource, version));
                }
                if entry.archive.is_none() {
                    return Err(error(
                        ErrorCode::PreconditionFailed,
                        format!(
                            "version {}/{}@{} has no archive to publish",
                            namespace, resource, version
                        ),
                    ));
                }

                let now = now();
                entry.published_at = Some(now);
                entry.updated_at = now;
                Ok(entry.to_version(namespace, resource, version))
            })
            .await?;

        info!("Published {}/{}@{}", namespace, resource, version);
        Ok(published)
    }
}

#[async_trait]
impl Registry for LocalRegistry {
    async fn list_namespaces(&self) -> RegistryResult<NamespaceList> {
        let state = self.state.read().await;
        Ok(NamespaceList {
            namespaces: state
                .namespaces
                .iter()
                .map(|(name, entry)| entry.summary(name))
                .collect(),
        })
    }

    #[instrument(skip(self))]
    async fn create_namespace(&self, info: NamespaceInfo) -> RegistryResult<Namespace> {
        validate_name("namespace", &info.name)?;

        let mut state = self.state.write().await;
        self.apply(&mut state, |index| {
            if index.namespaces.contains_key(&info.name) {
                return Err(error(
                    ErrorCode::NamespaceExists,
                    format!("namespace {} already exists", info.name),
                ));
            }

            let entry = NamespaceEntry::new(info.description);
            let namespace = entry.to_namespace(&info.name);
            index.namespaces.insert(info.name, entry);
            Ok(namespace)
        })
        .await
    }

    async fn read_namespace(&self, namespace: &str) -> RegistryResult<Namespace> {
        validate_name("namespace", namespace)?;

        let state = self.state.read().await;
        Ok(state.namespace(namespace)?.to_namespace(namespace))
    }

    #[instrument(skip(self))]
    async fn update_namespace(
        &self,
        namespace: &str,
        info: NamespaceInfo,
    ) -> RegistryResult<Namespace> {
        validate_name("namespace", namespace)?;
        check_identifier("namespace", namespace, &info.name)?;

        let mut state = self.state.write().await;
        self.apply(&mut state, |index| {
            let entry = index.namespace_mut(namespace)?;
            entry.description = info.description;
            entry.updated_at = now();
            Ok(entry.to_namespace(namespace))
        })
        .await
    }

    #[instrument(skip(self))]
    async fn delete_namespace(&self, namespace: &str) -> RegistryResult<()> {
        validate_name("namespace", namespace)?;

        {
            let mut state = self.state.write().await;
            let Some(entry) = state.namespaces.get(namespace) else {
                debug!("Namespace {} already absent", namespace);
                return Ok(());
            };
            if !entry.resources.is_empty() {
                return Err(error(
                    ErrorCode::NamespaceNotEmpty,
                    format!(
                        "namespace {} still contains {} resources",
                        namespace,
                        entry.resources.len()
                    ),
                ));
            }
            self.apply(&mut state, |index| {
                index.namespaces.remove(namespace);
                Ok(())
            })
            .await?;
        }

        self.archives
            .remove_dir(&self.archives.namespace_dir(namespace))
            .await;
        Ok(())
    }

    async fn list_resources(&self, namespace: &str) -> RegistryResult<ResourceList> {
        validate_name("namespace", namespace)?;

        let state = self.state.read().await;
        Ok(ResourceList {
            resources: state
                .namespace(namespace)?
                .resources
                .iter()
                .map(|(name, entry)| entry.summary(name))
                .collect(),
        })
    }

    #[instrument(skip(self))]
    async fn create_resource(
        &self,
        namespace: &str,
        info: ResourceInfo,
    ) -> RegistryResult<Resource> {
        validate_resource_path(namespace, &info.name)?;

        let mut state = self.state.write().await;
        self.apply(&mut state, |index| {
            let parent = index.namespace_mut(namespace)?;
            if parent.resources.contains_key(&info.name) {
                return Err(error(
                    ErrorCode::ResourceExists,
                    format!("resource {}/{} already exists", namespace, info.name),
                ));
            }

            let entry = ResourceEntry::new(info.kind, info.description);
            let resource = entry.to_resource(namespace, &info.name);
            parent.resources.insert(info.name, entry);
            Ok(resource)
        })
        .await
    }

    async fn read_resource(&self, namespace: &str, resource: &str) -> RegistryResult<Resource> {
        validate_resource_path(namespace, resource)?;

        let state = self.state.read().await;
        Ok(state
            .resource(namespace, resource)?
            .to_resource(namespace, resource))
    }

    #[instrument(skip(self))]
    async fn update_resource(
        &self,
        namespace: &str,
        resource: &str,
        info: ResourceInfo,
    ) -> RegistryResult<Resource> {
        validate_resource_path(namespace, resource)?;
        check_identifier("resource", resource, &info.name)?;

        let mut state = self.state.write().await;
        self.apply(&mut state, |index| {
            let entry = index.resource_mut(namespace, resource)?;
            if !info.kind.is_empty() {
                entry.kind = info.kind;
            }
            entry.description = info.description;
            entry.updated_at = now();
            Ok(entry.to_resource(namespace, resource))
        })
        .await
    }

    #[instrument(skip(self))]
    async fn delete_resource(&self, namespace: &str, resource: &str) -> RegistryResult<()> {
        validate_resource_path(namespace, resource)?;

        {
            let mut state = self.state.write().await;
            let Ok(entry) = state.resource(namespace, resource) else {
                debug!("Resource {}/{} already absent", namespace, resource);
                return Ok(());
            };
            if entry.has_published() {
                return Err(error(
                    ErrorCode::ResourceHasPublished,
                    format!("resource {}/{} has published versions", namespace, resource),
                ));
            }
            self.apply(&mut state, |index| {
                let parent = index.namespace_mut(namespace)?;
                parent.resources.remove(resource);
                parent.updated_at = now();
                Ok(())
            })
            .await?;
        }

        self.archives
            .remove_dir(&self.archives.resource_dir(namespace, resource))
            .await;
        Ok(())
    }

    async fn list_versions(&self, namespace: &str, resource: &str) -> RegistryResult<VersionList> {
        validate_resource_path(namespace, resource)?;

        let state = self.state.read().await;
        Ok(VersionList {
            versions: state.resource(namespace, resource)?.version_summaries(),
        })
    }

    #[instrument(skip(self))]
    async fn create_version(
        &self,
        namespace: &str,
        resource: &str,
        info: VersionInfo,
    ) -> RegistryResult<Version> {
        validate_version_path(namespace, resource, &info.string)?;

        let mut state = self.state.write().await;
        self.apply(&mut state, |index| {
            let parent = index.resource_mut(namespace, resource)?;
            if parent.versions.contains_key(&info.string) {
                return Err(error(
                    ErrorCode::VersionExists,
                    format!(
                        "version {}/{}@{} already exists",
                        namespace, resource, info.string
                    ),
                ));
            }

            let entry = VersionEntry::new();
            let version = entry.to_version(namespace, resource, &info.string);
            parent.versions.insert(info.string, entry);
            Ok(version)
        })
        .await
    }

    async fn read_version(
        &self,
        namespace: &str,
        resource: &str,
        version: &str,
    ) -> RegistryResult<Version> {
        validate_version_path(namespace, resource, version)?;

        let state = self.state.read().await;
        Ok(state
            .version(namespace, resource, version)?
            .to_version(namespace, resource, version))
    }

    #[instrument(skip(self))]
    async fn update_version(
        &self,
        namespace: &str,
        resource: &str,
        version: &str,
        info: VersionInfo,
    ) -> RegistryResult<Version> {
        validate_version_path(namespace, resource, version)?;
        check_identifier("version", version, &info.string)?;

        let mut state = self.state.write().await;
        self.apply(&mut state, |index| {
            let entry = index.version_mut(namespace, resource, version)?;
            if entry.is_published() {
                return Err(version_published(namespace, resource, version));
            }
            entry.updated_at = now();
            Ok(entry.to_version(namespace, resource, version))
        })
        .await
    }

    #[instrument(skip(self))]
    async fn delete_version(
        &self,
        namespace: &str,
        resource: &str,
        version: &str,
    ) -> RegistryResult<()> {
        validate_version_path(namespace, resource, version)?;

        {
            let mut state = self.state.write().await;
            let Ok(parent) = state.resource(namespace, resource) else {
                return Ok(());
            };
            let Some(entry) = parent.versions.get(version) else {
                debug!("Version {}/{}@{} already absent", namespace, resource, version);
                return Ok(());
            };
            if entry.is_published() {
                return Err(version_published(namespace, resource, version));
            }
            let channels: Vec<_> = parent.channels_referencing(version).collect();
            if !channels.is_empty() {
                return Err(error(
                    ErrorCode::PreconditionFailed,
                    format!(
                        "version {}/{}@{} is referenced by channels: {}",
                        namespace,
                        resource,
                        version,
                        channels.join(", ")
                    ),
                ));
            }
            self.apply(&mut state, |index| {
                let parent = index.resource_mut(namespace, resource)?;
                parent.versions.remove(version);
                parent.updated_at = now();
                Ok(())
            })
            .await?;
        }

        self.archives
            .remove_dir(&self.archives.version_dir(namespace, resource, version))
            .await;
        Ok(())
    }

    #[instrument(skip(self, archive))]
    async fn upload_archive(
        &self,
        namespace: &str,
        resource: &str,
        version: &str,
        digest: Option<String>,
        archive: ArchiveStream,
    ) -> RegistryResult<Version> {
        validate_version_path(namespace, resource, version)?;
        let expected = parse_digest(digest.as_deref())?;

        {
            let state = self.state.read().await;
            if state.version(namespace, resource, version)?.is_published() {
                return Err(version_published(namespace, resource, version));
            }
        }

        let received = self.archives.receive(archive).await?;
        if received.hex != expected {
            self.archives.discard(&received.path).await;
            return Err(error(
                ErrorCode::BadRequest,
                format!(
                    "archive digest mismatch: declared {}, computed {}",
                    format_digest(&expected),
                    format_digest(&received.hex)
                ),
            ));
        }

        let path = match self
            .archives
            .commit(&received, namespace, resource, version)
            .await
        {
            Ok(path) => path,
            Err(err) => {
                self.archives.discard(&received.path).await;
                return Err(err);
            }
        };

        let archive = ArchiveRef {
            digest: format_digest(&received.hex),
            size: received.size,
        };

        let mut state = self.state.write().await;
        let recorded = self
            .apply(&mut state, |index| {
                let entry = index.version_mut(namespace, resource, version)?;
                if entry.is_published() {
                    return Err(version_published(namespace, resource, version));
                }
                let previous = entry.archive.replace(archive.clone());
                entry.updated_at = now();
                Ok((previous, entry.to_version(namespace, resource, version)))
            })
            .await;

        let (previous, uploaded) = match recorded {
            Ok(recorded) => recorded,
            Err(err) => {
                // Keep the file only if the catalog already points at it.
                let in_use = state
                    .version(namespace, resource, version)
                    .ok()
                    .and_then(|entry| entry.archive.as_ref())
                    .is_some_and(|current| current.digest == archive.digest);
                drop(state);
                if !in_use {
                    self.archives.discard(&path).await;
                }
                return Err(err);
            }
        };

        drop(state);

        if let Some(previous) = previous.filter(|p| p.digest != archive.digest) {
            let stale = self
                .archives
                .path(namespace, resource, version, digest_hex(&previous.digest));
            self.archives.discard(&stale).await;
        }

        info!(
            "Stored archive for {}/{}@{}: {} ({} bytes)",
            namespace, resource, version, archive.digest, archive.size
        );
        Ok(uploaded)
    }

    async fn download_archive(
        &self,
        namespace: &str,
        resource: &str,
        version: &str,
    ) -> RegistryResult<ArchiveStream> {
        validate_version_path(namespace, resource, version)?;

        let path = {
            let state = self.state.read().await;
            let entry = state.version(namespace, resource, version)?;
            let archive = entry.archive.as_ref().ok_or_else(|| {
                error(
                    ErrorCode::NotFound,
                    format!(
                        "version {}/{}@{} has no archive",
                        namespace, resource, version
                    ),
                )
            })?;
            self.archives
                .path(namespace, resource, version, digest_hex(&archive.digest))
        };

        match self.archives.open(&path).await {
            Ok(stream) => Ok(stream),
            Err(err) => {
                warn!("Recorded archive {} is unreadable: {}", path.display(), err);
                Err(err)
            }
        }
    }

    async fn list_channels(&self, namespace: &str, resource: &str) -> RegistryResult<ChannelList> {
        validate_resource_path(namespace, resource)?;

        let state = self.state.read().await;
        Ok(ChannelList {
            channels: state.resource(namespace, resource)?.channel_summaries(),
        })
    }

    #[instrument(skip(self))]
    async fn create_channel(
        &self,
        namespace: &str,
        resource: &str,
        info: ChannelInfo,
    ) -> RegistryResult<Channel> {
        validate_channel_path(namespace, resource, &info.name)?;
        validate_version(&info.version)?;

        let mut state = self.state.write().await;
        self.apply(&mut state, |index| {
            let parent = index.resource_mut(namespace, resource)?;
            if parent.channels.contains_key(&info.name) {
                return Err(error(
                    ErrorCode::ChannelExists,
                    format!(
                        "channel {}/{}#{} already exists",
                        namespace, resource, info.name
                    ),
                ));
            }
            if !parent.versions.contains_key(&info.version) {
                return Err(error(
                    ErrorCode::NotFound,
                    format!(
                        "version {}/{}@{} not found",
                        namespace, resource, info.version
                    ),
                ));
            }

            let entry = ChannelEntry::new(info.version, info.description);
            let channel = parent.to_channel(namespace, resource, &info.name, &entry)?;
            parent.channels.insert(info.name, entry);
            Ok(channel)
        })
        .await
    }

    async fn read_channel(
        &self,
        namespace: &str,
        resource: &str,
        channel: &str,
    ) -> RegistryResult<Channel> {
        validate_channel_path(namespace, resource, channel)?;

        let state = self.state.read().await;
        let parent = state.resource(namespace, resource)?;
        let entry = parent.channels.get(channel).ok_or_else(|| {
            error(
                ErrorCode::NotFound,
                format!("channel {}/{}#{} not found", namespace, resource, channel),
            )
        })?;
        parent.to_channel(namespace, resource, channel, entry)
    }

    #[instrument(skip(self))]
    async fn update_channel(
        &self,
        namespace: &str,
        resource: &str,
        channel: &str,
        info: ChannelInfo,
    ) -> RegistryResult<Channel> {
        validate_channel_path(namespace, resource, channel)?;
        check_identifier("channel", channel, &info.name)?;
        validate_version(&info.version)?;

        let mut state = self.state.write().await;
        self.apply(&mut state, |index| {
            let parent = index.resource_mut(namespace, resource)?;
            if !parent.versions.contains_key(&info.version) {
                return Err(error(
                    ErrorCode::NotFound,
                    format!(
                        "version {}/{}@{} not found",
                        namespace, resource, info.version
                    ),
                ));
            }
            let entry = parent.channels.get_mut(channel).ok_or_else(|| {
                error(
                    ErrorCode::NotFound,
                    format!("channel {}/{}#{} not found", namespace, resource, channel),
                )
            })?;
            entry.version = info.version;
            entry.description = info.description;
            entry.updated_at = now();
            let entry = entry.clone();
            parent.to_channel(namespace, resource, channel, &entry)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn delete_channel(
        &self,
        namespace: &str,
        resource: &str,
        channel: &str,
    ) -> RegistryResult<()> {
        validate_channel_path(namespace, resource, channel)?;

        let mut state = self.state.write().await;
        let present = state
            .resource(namespace, resource)
            .is_ok_and(|parent| parent.channels.contains_key(channel));
        if !present {
            debug!("Channel {}/{}#{} already absent", namespace, resource, channel);
            return Ok(());
        }

        self.apply(&mut state, |index| {
            let parent = index.resource_mut(namespace, resource)?;
            parent.channels.remove(channel);
            parent.updated_at = now();
            Ok(())
        })
        .await
    }
}
