//! Flat on-disk cache of raw torrent descriptors, keyed by topic id.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{ports::DescriptorSource, Result};

/// Write-once cache: the forum's descriptor for a topic is immutable, so an
/// entry is never updated or deleted once written. Concurrent fetches of the
/// same topic may race on the file; both write the same bytes to the same
/// path, and per-topic locking upstream keeps that from happening within one
/// process.
pub struct TorrentCache {
    dir: PathBuf,
    source: Arc<dyn DescriptorSource>,
}

impl TorrentCache {
    pub fn new(dir: impl Into<PathBuf>, source: Arc<dyn DescriptorSource>) -> Self {
        Self {
            dir: dir.into(),
            source,
        }
    }

    pub fn path_for(&self, topic_id: &str) -> PathBuf {
        self.dir.join(format!("{topic_id}.torrent"))
    }

    /// Local path and raw bytes for a topic's descriptor.
    ///
    /// A miss triggers exactly one remote download and, for non-empty
    /// bodies, one write-through. An empty body means the forum has no
    /// descriptor yet; it is returned as-is and not cached, so a later call
    /// retries the download.
    pub async fn fetch(&self, topic_id: &str) -> Result<(PathBuf, Vec<u8>)> {
        let path = self.path_for(topic_id);

        match tokio::fs::read(&path).await {
            Ok(bytes) => return Ok((path, bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        tracing::info!(topic_id, "descriptor not cached, downloading from the forum");
        let bytes = self.source.download(topic_id).await?;
        if !bytes.is_empty() {
            tokio::fs::write(&path, &bytes).await?;
        }
        Ok((path, bytes))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
