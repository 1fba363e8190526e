use std::sync::Arc;

use tracktor_core::{
    config::Config,
    lifecycle::LifecycleRouter,
    ports::{DaemonPort, DescriptorSource},
    torrent::TorrentCache,
    tracker::TrackerClient,
};
use tracktor_transmission::TransmissionClient;

fn main() -> anyhow::Result<()> {
    // Update handlers are mostly I/O-bound; a couple of extra workers keeps
    // the pool responsive while slow tracker downloads are in flight.
    let workers = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        + 2;

    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(workers)
        .enable_all()
        .build()?
        .block_on(run())
}

async fn run() -> anyhow::Result<()> {
    tracktor_core::logging::init("tracktor")?;

    let cfg = Arc::new(Config::load()?);
    tokio::fs::create_dir_all(&cfg.torrents_dir).await?;

    let tracker = Arc::new(TrackerClient::new(&cfg)?);
    let cache = Arc::new(TorrentCache::new(
        &cfg.torrents_dir,
        tracker.clone() as Arc<dyn DescriptorSource>,
    ));
    let daemon: Arc<dyn DaemonPort> = Arc::new(TransmissionClient::new(&cfg)?);
    let lifecycle = Arc::new(LifecycleRouter::new(cache, daemon));

    tracktor_telegram::router::run(cfg, tracker, lifecycle).await
}
