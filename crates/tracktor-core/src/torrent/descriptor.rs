//! Torrent descriptor decoding.
//!
//! Uses librqbit-core to parse bencoded descriptor bytes into the content
//! name and the info-hash that correlates the local descriptor with the
//! daemon's record. Pure function of the bytes; no network or disk access.

use librqbit_core::torrent_metainfo::{torrent_from_bytes, TorrentMetaV1Owned};

use crate::{errors::Error, Result};

/// Decoded binary torrent file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TorrentDescriptor {
    pub content_name: String,
    /// Lowercase hex info-hash, derived deterministically from the
    /// descriptor's info dictionary.
    pub info_hash: String,
}

pub fn decode(bytes: &[u8]) -> Result<TorrentDescriptor> {
    let torrent: TorrentMetaV1Owned =
        torrent_from_bytes(bytes).map_err(|e| Error::Decode(e.to_string()))?;

    let content_name = torrent
        .info
        .name
        .as_ref()
        .map(|b| String::from_utf8_lossy(b.as_ref()).into_owned())
        .unwrap_or_default();

    Ok(TorrentDescriptor {
        content_name,
        info_hash: torrent.info_hash.as_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::single_file_descriptor;

    #[test]
    fn decodes_name_and_info_hash() {
        let desc = decode(&single_file_descriptor("ubuntu.iso")).unwrap();
        assert_eq!(desc.content_name, "ubuntu.iso");
        assert_eq!(desc.info_hash.len(), 40);
        assert!(desc.info_hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn decode_is_deterministic() {
        let bytes = single_file_descriptor("ubuntu.iso");
        let a = decode(&bytes).unwrap();
        let b = decode(&bytes).unwrap();
        assert_eq!(a.info_hash, b.info_hash);
    }

    #[test]
    fn different_descriptors_hash_differently() {
        let a = decode(&single_file_descriptor("a")).unwrap();
        let b = decode(&single_file_descriptor("b")).unwrap();
        assert_ne!(a.info_hash, b.info_hash);
    }

    #[test]
    fn rejects_malformed_bytes() {
        assert!(decode(b"not a descriptor").is_err());
        assert!(decode(b"").is_err());
        // Truncated mid-dictionary.
        let mut bytes = single_file_descriptor("ubuntu.iso");
        bytes.truncate(bytes.len() / 2);
        assert!(decode(&bytes).is_err());
    }
}
