//! Core domain types for the Crucible hub
//!
//! This crate contains the wire-level data model (namespaces, resources,
//! versions, channels), the media kinds they are exchanged under, the error
//! taxonomy, and the [`Registry`] capability trait that domain providers
//! implement.

pub mod archive;
pub mod channel;
pub mod error;
pub mod media;
pub mod namespace;
pub mod registry;
pub mod resource;
pub mod version;

// Re-exports for convenience
pub use archive::{archive_filename, archive_from_bytes, ArchiveStream};
pub use channel::{Channel, ChannelInfo, ChannelList, ChannelSummary};
pub use error::{DomainError, ErrorCode, RegistryError, RegistryResult};
pub use media::{MediaKind, MediaType};
pub use namespace::{Namespace, NamespaceInfo, NamespaceList, NamespaceSummary};
pub use registry::Registry;
pub use resource::{Resource, ResourceInfo, ResourceList, ResourceSummary};
pub use version::{ArchiveRef, Version, VersionInfo, VersionList, VersionSummary};
