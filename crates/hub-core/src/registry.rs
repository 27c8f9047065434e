//! Registry capability interface
//!
//! The front end talks to the domain provider exclusively through this
//! trait: one method per routed operation. Path parameters are passed
//! through as opaque strings; validating them is the provider's job.

use async_trait::async_trait;

use crate::archive::ArchiveStream;
use crate::channel::{Channel, ChannelInfo, ChannelList};
use crate::error::RegistryResult;
use crate::namespace::{Namespace, NamespaceInfo, NamespaceList};
use crate::resource::{Resource, ResourceInfo, ResourceList};
use crate::version::{Version, VersionInfo, VersionList};

/// Domain operations on namespaces, resources, versions and channels
///
/// Implementations must be thread-safe (Send + Sync); one instance is
/// shared by all concurrent requests. Delete operations are idempotent:
/// deleting an absent entity returns `Ok(())`.
#[async_trait]
pub trait Registry: Send + Sync {
    /// List all namespaces
    async fn list_namespaces(&self) -> RegistryResult<NamespaceList>;

    /// Create a namespace
    async fn create_namespace(&self, info: NamespaceInfo) -> RegistryResult<Namespace>;

    /// Read a namespace with summaries of its resources
    async fn read_namespace(&self, namespace: &str) -> RegistryResult<Namespace>;

    /// Update mutable namespace metadata
    async fn update_namespace(
        &self,
        namespace: &str,
        info: NamespaceInfo,
    ) -> RegistryResult<Namespace>;

    /// Delete an empty namespace
    async fn delete_namespace(&self, namespace: &str) -> RegistryResult<()>;

    /// List the resources of a namespace
    async fn list_resources(&self, namespace: &str) -> RegistryResult<ResourceList>;

    /// Create a resource
    async fn create_resource(
        &self,
        namespace: &str,
        info: ResourceInfo,
    ) -> RegistryResult<Resource>;

    /// Read a resource
    async fn read_resource(&self, namespace: &str, resource: &str) -> RegistryResult<Resource>;

    /// Update mutable resource metadata
    async fn update_resource(
        &self,
        namespace: &str,
        resource: &str,
        info: ResourceInfo,
    ) -> RegistryResult<Resource>;

    /// Delete a resource without published versions
    async fn delete_resource(&self, namespace: &str, resource: &str) -> RegistryResult<()>;

    /// List the versions of a resource
    async fn list_versions(&self, namespace: &str, resource: &str)
        -> RegistryResult<VersionList>;

    /// Create an unpublished version
    async fn create_version(
        &self,
        namespace: &str,
        resource: &str,
        info: VersionInfo,
    ) -> RegistryResult<Version>;

    /// Read a version
    async fn read_version(
        &self,
        namespace: &str,
        resource: &str,
        version: &str,
    ) -> RegistryResult<Version>;

    /// Update an unpublished version
    async fn update_version(
        &self,
        namespace: &str,
        resource: &str,
        version: &str,
        info: VersionInfo,
    ) -> RegistryResult<Version>;

    /// Delete an unpublished version
    async fn delete_version(
        &self,
        namespace: &str,
        resource: &str,
        version: &str,
    ) -> RegistryResult<()>;

    /// Attach an archive to a version
    ///
    /// `digest` is the caller-supplied integrity digest, forwarded verbatim.
    /// The archive is consumed as it arrives.
    async fn upload_archive(
        &self,
        namespace: &str,
        resource: &str,
        version: &str,
        digest: Option<String>,
        archive: ArchiveStream,
    ) -> RegistryResult<Version>;

    /// Stream the archive of a version
    async fn download_archive(
        &self,
        namespace: &str,
        resource: &str,
        version: &str,
    ) -> RegistryResult<ArchiveStream>;

    /// List the channels of a resource
    async fn list_channels(&self, namespace: &str, resource: &str)
        -> RegistryResult<ChannelList>;

    /// Create a channel
    async fn create_channel(
        &self,
        namespace: &str,
        resource: &str,
        info: ChannelInfo,
    ) -> RegistryResult<Channel>;

    /// Read a channel and its referenced version
    async fn read_channel(
        &self,
        namespace: &str,
        resource: &str,
        channel: &str,
    ) -> RegistryResult<Channel>;

    /// Repoint a channel or update its description
    async fn update_channel(
        &self,
        namespace: &str,
        resource: &str,
        channel: &str,
        info: ChannelInfo,
    ) -> RegistryResult<Channel>;

    /// Delete a channel; the referenced version is unaffected
    async fn delete_channel(
        &self,
        namespace: &str,
        resource: &str,
        channel: &str,
    ) -> RegistryResult<()>;
}
