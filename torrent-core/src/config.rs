use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::error::{TorrentClientError, TorrentClientResult};

const PEER_ID_LEN: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Port reported to trackers.
    pub port: u16,
    /// Azureus-style client tag at the start of the peer id, at most 20 bytes.
    pub peer_id_prefix: String,
    pub http_timeout_secs: u64,
    pub udp_timeout_secs: u64,
    /// Extra UDP sends after the first one times out.
    pub udp_retries: u32,
    pub numwant: Option<u32>,
    pub compact: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            port: 6881,
            peer_id_prefix: "-RT0001-".to_string(),
            http_timeout_secs: 5,
            udp_timeout_secs: 5,
            udp_retries: 2,
            numwant: None,
            compact: true,
        }
    }
}

impl ClientConfig {
    pub fn from_json_str(json: &str) -> TorrentClientResult<Self> {
        let config: ClientConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> TorrentClientResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> TorrentClientResult<()> {
        if self.peer_id_prefix.len() > PEER_ID_LEN {
            return Err(TorrentClientError::InvalidConfig(format!(
                "peer_id_prefix is {} bytes, at most {} fit in a peer id",
                self.peer_id_prefix.len(),
                PEER_ID_LEN
            )));
        }
        Ok(())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn udp_timeout(&self) -> Duration {
        Duration::from_secs(self.udp_timeout_secs)
    }
}
