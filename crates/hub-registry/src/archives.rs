//! Archive file storage
//!
//! Archives live at `{root}/{namespace}/{resource}/{version}/{hex}.tar.zst`.
//! Uploads are first written to `{root}/.incoming` while being hashed, then
//! renamed into place once the digest checks out.

use futures::StreamExt;
use hub_core::{archive::ARCHIVE_EXTENSION, ArchiveStream, RegistryResult};
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::{fs, io::AsyncWriteExt};
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};
use uuid::Uuid;

const INCOMING_DIR: &str = ".incoming";

/// An upload written to a temporary file
#[derive(Debug)]
pub(crate) struct Received {
    pub path: PathBuf,
    pub hex: String,
    pub size: u64,
}

/// Archive files under a root directory
#[derive(Debug, Clone)]
pub(crate) struct ArchiveStore {
    root: PathBuf,
}

impl ArchiveStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn namespace_dir(&self, namespace: &str) -> PathBuf {
        self.root.join(namespace)
    }

    pub fn resource_dir(&self, namespace: &str, resource: &str) -> PathBuf {
        self.namespace_dir(namespace).join(resource)
    }

    pub fn version_dir(&self, namespace: &str, resource: &str, version: &str) -> PathBuf {
        self.resource_dir(namespace, resource).join(version)
    }

    pub fn path(&self, namespace: &str, resource: &str, version: &str, hex: &str) -> PathBuf {
        self.version_dir(namespace, resource, version)
            .join(format!("{}.{}", hex, ARCHIVE_EXTENSION))
    }

    /// Drain `stream` into a temporary file, hashing as it goes
    ///
    /// On failure the temporary file is removed.
    pub async fn receive(&self, mut stream: ArchiveStream) -> RegistryResult<Received> {
        let incoming = self.root.join(INCOMING_DIR);
        fs::create_dir_all(&incoming).await?;

        let path = incoming.join(format!("{}.part", Uuid::new_v4()));
        let mut file = fs::File::create(&path).await?;
        let mut hasher = Sha256::new();
        let mut size = 0u64;

        let written: std::io::Result<()> = async {
            while let Some(chunk) = stream.next().await {
                let chunk = chunk?;
                hasher.update(&chunk);
                size += chunk.len() as u64;
                file.write_all(&chunk).await?;
            }
            file.sync_all().await
        }
        .await;
        drop(file);

        if let Err(e) = written {
            self.discard(&path).await;
            return Err(e.into());
        }

        let hex = format!("{:x}", hasher.finalize());
        debug!("Received archive {} ({} bytes)", hex, size);
        Ok(Received { path, hex, size })
    }

    /// Move a received upload to its final location
    pub async fn commit(
        &self,
        received: &Received,
        namespace: &str,
        resource: &str,
        version: &str,
    ) -> RegistryResult<PathBuf> {
        let target = self.path(namespace, resource, version, &received.hex);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::rename(&received.path, &target).await?;
        Ok(target)
    }

    /// Open a stored archive as a byte stream
    pub async fn open(&self, path: &Path) -> RegistryResult<ArchiveStream> {
        let file = fs::File::open(path).await?;
        Ok(ReaderStream::new(file).boxed())
    }

    /// Best-effort removal of a single file
    pub async fn discard(&self, path: &Path) {
        if let Err(e) = fs::remove_file(path).await {
            if e.kind() != ErrorKind::NotFound {
                warn!("Failed to remove {}: {}", path.display(), e);
            }
        }
    }

    /// Best-effort removal of a directory tree
    pub async fn remove_dir(&self, dir: &Path) {
        if let Err(e) = fs::remove_dir_all(dir).await {
            if e.kind() != ErrorKind::NotFound {
                warn!("Failed to remove {}: {}", dir.display(), e);
            }
        }
    }
}
