//! Archive byte streams
//!
//! Archives are opaque to the front end. They travel as streams of byte
//! chunks so that neither upload nor download needs the whole archive in
//! memory.

use bytes::Bytes;
use futures::stream::{BoxStream, StreamExt};

/// A stream of archive chunks
pub type ArchiveStream = BoxStream<'static, std::io::Result<Bytes>>;

/// File extension of a downloaded archive
pub const ARCHIVE_EXTENSION: &str = "tar.zst";

/// File name advertised for the archive of `resource` at `version`
pub fn archive_filename(resource: &str, version: &str) -> String {
    format!("{}-{}.{}", resource, version, ARCHIVE_EXTENSION)
}

/// Wrap an in-memory buffer as an archive stream
pub fn archive_from_bytes(data: impl Into<Bytes>) -> ArchiveStream {
    futures::stream::once(futures::future::ready(Ok(data.into()))).boxed()
}
