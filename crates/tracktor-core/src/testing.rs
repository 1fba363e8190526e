//! Hand-written test doubles for the daemon and descriptor ports.
//!
//! Kept as a normal module (not `cfg(test)`) so integration tests in
//! `tests/` can drive the lifecycle router end to end.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::atomic::{AtomicI64, AtomicUsize, Ordering},
};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    domain::{RemoteTorrentState, TorrentStatus},
    ports::{AddedTorrent, DaemonPort, DescriptorSource},
    torrent,
    Result,
};

/// Minimal well-formed single-file descriptor with the given content name.
pub fn single_file_descriptor(name: &str) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"d8:announce23:http://example.com/anno4:infod6:lengthi5e4:name");
    out.extend_from_slice(format!("{}:{}", name.len(), name).as_bytes());
    out.extend_from_slice(b"12:piece lengthi16384e6:pieces20:");
    out.extend_from_slice(&[b'a'; 20]);
    out.extend_from_slice(b"ee");
    out
}

/// Descriptor source serving fixed bytes and counting downloads.
pub struct StaticDescriptorSource {
    bytes: Vec<u8>,
    downloads: AtomicUsize,
}

impl StaticDescriptorSource {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            downloads: AtomicUsize::new(0),
        }
    }

    pub fn download_count(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DescriptorSource for StaticDescriptorSource {
    async fn download(&self, _topic_id: &str) -> Result<Vec<u8>> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        Ok(self.bytes.clone())
    }
}

/// A daemon command observed by the mock, for test assertions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DaemonCommand {
    Add(PathBuf),
    Start(i64),
    Stop(String),
    Remove { id: i64, purge: bool },
}

#[derive(Clone, Debug)]
struct MockTorrent {
    id: i64,
    name: String,
    status: TorrentStatus,
    percent_done: f64,
}

/// In-memory daemon double.
///
/// `add` decodes the descriptor file for real, so the mock's hashes and
/// names match what the router computed from the cache.
#[derive(Default)]
pub struct MockDaemon {
    torrents: RwLock<HashMap<String, MockTorrent>>,
    commands: RwLock<Vec<DaemonCommand>>,
    next_id: AtomicI64,
}

impl MockDaemon {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn commands(&self) -> Vec<DaemonCommand> {
        self.commands.read().await.clone()
    }

    pub async fn set_percent(&self, info_hash: &str, percent_done: f64) {
        if let Some(t) = self.torrents.write().await.get_mut(info_hash) {
            t.percent_done = percent_done;
        }
    }

    pub async fn set_status(&self, info_hash: &str, status: TorrentStatus) {
        if let Some(t) = self.torrents.write().await.get_mut(info_hash) {
            t.status = status;
        }
    }

    async fn record(&self, command: DaemonCommand) {
        self.commands.write().await.push(command);
    }
}

#[async_trait]
impl DaemonPort for MockDaemon {
    async fn describe(&self, info_hash: &str) -> Result<RemoteTorrentState> {
        Ok(self
            .torrents
            .read()
            .await
            .get(info_hash)
            .map(|t| RemoteTorrentState {
                name: t.name.clone(),
                status: t.status,
                percent_done: t.percent_done,
            })
            .unwrap_or_default())
    }

    async fn add(&self, descriptor_path: &Path) -> Result<AddedTorrent> {
        self.record(DaemonCommand::Add(descriptor_path.to_path_buf()))
            .await;

        let bytes = tokio::fs::read(descriptor_path).await?;
        let desc = torrent::decode(&bytes)?;

        let mut torrents = self.torrents.write().await;
        let entry = torrents
            .entry(desc.info_hash.clone())
            .or_insert_with(|| MockTorrent {
                id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
                name: desc.content_name.clone(),
                status: TorrentStatus::Stopped,
                percent_done: 0.0,
            });

        Ok(AddedTorrent {
            id: entry.id,
            info_hash: desc.info_hash,
            name: entry.name.clone(),
        })
    }

    async fn start(&self, id: i64) -> Result<()> {
        self.record(DaemonCommand::Start(id)).await;
        for t in self.torrents.write().await.values_mut() {
            if t.id == id {
                t.status = TorrentStatus::Downloading;
            }
        }
        Ok(())
    }

    async fn stop(&self, info_hash: &str) -> Result<()> {
        self.record(DaemonCommand::Stop(info_hash.to_string())).await;
        if let Some(t) = self.torrents.write().await.get_mut(info_hash) {
            t.status = TorrentStatus::Stopped;
        }
        Ok(())
    }

    async fn remove(&self, id: i64, purge_local_data: bool) -> Result<()> {
        self.record(DaemonCommand::Remove {
            id,
            purge: purge_local_data,
        })
        .await;
        self.torrents.write().await.retain(|_, t| t.id != id);
        Ok(())
    }

    async fn find_id(&self, info_hash: &str) -> Result<Option<i64>> {
        Ok(self.torrents.read().await.get(info_hash).map(|t| t.id))
    }
}
