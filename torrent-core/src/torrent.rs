use reqwest::Url;
use torrent_parser::model::TorrentMetadata;
use tracing::debug;

use crate::tracker::Tracker;

/// A torrent together with the trackers it announces to.
pub struct ManagedTorrent {
    pub metadata: TorrentMetadata,
    pub trackers: Vec<Tracker>,
    pub downloaded: u64,
    pub uploaded: u64,
}

impl ManagedTorrent {
    pub fn from_torrent_metadata(metadata: TorrentMetadata) -> Self {
        let mut trackers: Vec<Tracker> = Vec::new();
        for announce in &metadata.announce_list {
            if let Err(e) = Url::parse(announce) {
                debug!(%announce, error = %e, "skipping announce entry that is not a URL");
                continue;
            }
            let tracker = Tracker::from(announce.clone());
            if !trackers.contains(&tracker) {
                trackers.push(tracker);
            }
        }

        ManagedTorrent {
            metadata,
            trackers,
            downloaded: 0,
            uploaded: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Bytes still missing, as reported to trackers.
    pub fn left(&self) -> u64 {
        self.metadata.total_length().saturating_sub(self.downloaded)
    }
}
