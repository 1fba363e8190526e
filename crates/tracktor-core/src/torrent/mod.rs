pub mod cache;
pub mod descriptor;

pub use cache::TorrentCache;
pub use descriptor::{decode, TorrentDescriptor};
