use percent_encoding::{percent_encode, NON_ALPHANUMERIC};
use reqwest::Url;
use torrent_parser::model::InfoHash;

use crate::error::{TorrentClientError, TorrentClientResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TrackerEvent {
    #[default]
    None,
    Started,
    Stopped,
    Completed,
}

impl TrackerEvent {
    pub fn as_str(&self) -> Option<&'static str> {
        match self {
            TrackerEvent::None => None,
            TrackerEvent::Started => Some("started"),
            TrackerEvent::Stopped => Some("stopped"),
            TrackerEvent::Completed => Some("completed"),
        }
    }

    /// Event id used by the UDP tracker protocol.
    pub fn udp_id(&self) -> u32 {
        match self {
            TrackerEvent::None => 0,
            TrackerEvent::Completed => 1,
            TrackerEvent::Started => 2,
            TrackerEvent::Stopped => 3,
        }
    }
}

/// Parameters of a single announce, shared by the HTTP and UDP transports.
#[derive(Debug, Clone)]
pub struct AnnounceRequest {
    pub info_hash: InfoHash,
    pub peer_id: [u8; 20],
    pub port: u16,
    pub uploaded: u64,
    pub downloaded: u64,
    pub left: u64,
    pub compact: bool,
    pub event: TrackerEvent,
    pub numwant: Option<u32>,
    pub tracker_id: Option<String>,
}

impl AnnounceRequest {
    /// Appends the announce query to `announce`, keeping any query it already has.
    pub fn to_url(&self, announce: &str) -> TorrentClientResult<Url> {
        let mut url = Url::parse(announce)
            .map_err(|e| TorrentClientError::InvalidUrl(format!("{}: {}", announce, e)))?;

        let mut params = vec![
            format!(
                "info_hash={}",
                percent_encode(self.info_hash.as_bytes(), NON_ALPHANUMERIC)
            ),
            format!("peer_id={}", percent_encode(&self.peer_id, NON_ALPHANUMERIC)),
            format!("port={}", self.port),
            format!("uploaded={}", self.uploaded),
            format!("downloaded={}", self.downloaded),
            format!("left={}", self.left),
            format!("compact={}", u8::from(self.compact)),
        ];
        if let Some(event) = self.event.as_str() {
            params.push(format!("event={}", event));
        }
        if let Some(numwant) = self.numwant {
            params.push(format!("numwant={}", numwant));
        }
        if let Some(id) = &self.tracker_id {
            params.push(format!(
                "trackerid={}",
                percent_encode(id.as_bytes(), NON_ALPHANUMERIC)
            ));
        }

        let query = match url.query() {
            Some(existing) if !existing.is_empty() => format!("{}&{}", existing, params.join("&")),
            _ => params.join("&"),
        };
        url.set_query(Some(&query));
        Ok(url)
    }
}
