use std::{fmt, net::SocketAddr};

use sha1::{Digest, Sha1};

use crate::{error::TorrentParserError, tracker::decode_compact_peers};

/// SHA-1 digest of the literal encoding of a torrent's info dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InfoHash(pub [u8; 20]);

impl InfoHash {
    pub fn from_info_bytes(info_bytes: &[u8]) -> Self {
        InfoHash(Sha1::digest(info_bytes).into())
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for InfoHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoFile {
    pub path: Vec<String>,
    pub length: u64,
}

/// The two legal shapes of a torrent's content description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileMode {
    SingleFile { length: u64 },
    MultiFile { files: Vec<InfoFile> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TorrentMetadata {
    pub name: String,
    /// Primary announce URL followed by the flattened announce-list tiers.
    pub announce_list: Vec<String>,
    pub creation_date: Option<u64>,
    pub comment: Option<String>,
    pub created_by: Option<String>,
    pub encoding: Option<String>,
    pub piece_length: u64,
    pub piece_hashes: Vec<[u8; 20]>,
    pub private: bool,
    pub mode: FileMode,
    pub info_hash: InfoHash,
}

impl TorrentMetadata {
    pub fn announce(&self) -> &str {
        // the mapper always puts the primary announce first
        self.announce_list.first().map_or("", String::as_str)
    }

    pub fn is_single_file(&self) -> bool {
        matches!(self.mode, FileMode::SingleFile { .. })
    }

    /// Number of content bytes described by the torrent.
    pub fn total_length(&self) -> u64 {
        match &self.mode {
            FileMode::SingleFile { length } => *length,
            FileMode::MultiFile { files } => files.iter().map(|file| file.length).sum(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerResponsePeer {
    pub peer_id: Option<Vec<u8>>,
    pub addr: SocketAddr,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackerResponse {
    pub failure_reason: Option<String>,
    pub warning_message: Option<String>,
    pub interval: i64,
    pub min_interval: Option<i64>,
    pub tracker_id: Option<String>,
    pub complete: i64,
    pub incomplete: i64,
    /// Compact peer blob, six bytes per peer.
    pub raw_peers: Vec<u8>,
    /// Peers sent in the dictionary model instead of the compact blob.
    pub peer_entries: Vec<TrackerResponsePeer>,
}

impl TrackerResponse {
    pub fn is_failure(&self) -> bool {
        self.failure_reason.is_some()
    }

    /// Decodes the compact blob and appends any dictionary-model peers.
    pub fn peers(&self) -> Result<Vec<TrackerResponsePeer>, TorrentParserError> {
        let mut peers = decode_compact_peers(&self.raw_peers)?;
        peers.extend(self.peer_entries.iter().cloned());
        Ok(peers)
    }
}
