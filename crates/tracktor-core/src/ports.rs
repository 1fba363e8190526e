use std::path::Path;

use async_trait::async_trait;

use crate::{domain::RemoteTorrentState, Result};

/// Result of registering a descriptor with the daemon.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddedTorrent {
    pub id: i64,
    pub info_hash: String,
    pub name: String,
}

/// Port for the remote torrent daemon.
///
/// Commands fail with `Error::Rpc` on transport or daemon-side failure and
/// are never retried here; the user re-triggers the action instead.
#[async_trait]
pub trait DaemonPort: Send + Sync {
    /// Snapshot for an info-hash. Returns the zero-value state when the
    /// daemon has no matching torrent: callers must treat that as
    /// "unknown / not yet registered", not as an error.
    async fn describe(&self, info_hash: &str) -> Result<RemoteTorrentState>;

    /// Register a local descriptor file. Re-adding an already known
    /// descriptor is not an error and returns the existing torrent.
    async fn add(&self, descriptor_path: &Path) -> Result<AddedTorrent>;

    async fn start(&self, id: i64) -> Result<()>;

    async fn stop(&self, info_hash: &str) -> Result<()>;

    /// Remove by daemon id, optionally purging downloaded data.
    async fn remove(&self, id: i64, purge_local_data: bool) -> Result<()>;

    /// Daemon id for an info-hash, if registered.
    async fn find_id(&self, info_hash: &str) -> Result<Option<i64>>;
}

/// Port for fetching raw descriptor bytes by topic id.
///
/// Implemented by the forum client; the descriptor cache sits in front of it.
#[async_trait]
pub trait DescriptorSource: Send + Sync {
    async fn download(&self, topic_id: &str) -> Result<Vec<u8>>;
}
