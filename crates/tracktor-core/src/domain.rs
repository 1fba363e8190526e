use std::fmt;

/// One search hit from the tracker's results table.
///
/// `id` is the forum-assigned topic id and is the only required field; the
/// extractor never emits a record without it. Everything else is
/// presentational text taken verbatim from the results page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TopicRecord {
    pub id: String,
    pub verified: String,
    pub forum: String,
    pub title: String,
    pub title_sections: Vec<String>,
    pub author: String,
    pub size: String,
    pub seeders: String,
    pub leechers: String,
    pub downloads: String,
    pub created_at: String,
}

/// Point-in-time torrent snapshot from the daemon.
///
/// The zero value (empty name, `Stopped`, 0.0) means "unknown / not yet
/// registered with the daemon", not an error. Never cached; re-queried on
/// every lifecycle transition that needs it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RemoteTorrentState {
    pub name: String,
    pub status: TorrentStatus,
    /// Completion fraction in [0, 1].
    pub percent_done: f64,
}

/// Transmission torrent status (RPC status codes 0-6).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TorrentStatus {
    #[default]
    Stopped,
    QueuedToCheck,
    Checking,
    QueuedToDownload,
    Downloading,
    QueuedToSeed,
    Seeding,
}

impl TorrentStatus {
    /// Unknown codes collapse to `Stopped`, the zero state.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::QueuedToCheck,
            2 => Self::Checking,
            3 => Self::QueuedToDownload,
            4 => Self::Downloading,
            5 => Self::QueuedToSeed,
            6 => Self::Seeding,
            _ => Self::Stopped,
        }
    }
}

impl fmt::Display for TorrentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Stopped => "Stopped",
            Self::QueuedToCheck => "Queued to check",
            Self::Checking => "Checking",
            Self::QueuedToDownload => "Queued to download",
            Self::Downloading => "Downloading",
            Self::QueuedToSeed => "Queued to seed",
            Self::Seeding => "Seeding",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map_to_transmission_names() {
        assert_eq!(TorrentStatus::from_code(0), TorrentStatus::Stopped);
        assert_eq!(TorrentStatus::from_code(4), TorrentStatus::Downloading);
        assert_eq!(TorrentStatus::from_code(6), TorrentStatus::Seeding);
        assert_eq!(TorrentStatus::from_code(99), TorrentStatus::Stopped);
        assert_eq!(TorrentStatus::Downloading.to_string(), "Downloading");
    }

    #[test]
    fn zero_state_is_stopped_with_no_name() {
        let state = RemoteTorrentState::default();
        assert_eq!(state.name, "");
        assert_eq!(state.status, TorrentStatus::Stopped);
        assert_eq!(state.percent_done, 0.0);
    }
}
