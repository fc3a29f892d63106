use std::path::Path;

use rand::{distributions::Alphanumeric, Rng};
use reqwest::{Client, Url};
use torrent_parser::{
    model::{TrackerResponse, TrackerResponsePeer},
    parse_torrent_file,
};
use tracing::{info, warn};

use crate::{
    announce::{AnnounceRequest, TrackerEvent},
    config::ClientConfig,
    error::{TorrentClientError, TorrentClientResult},
    http::announce_http,
    torrent::ManagedTorrent,
    tracker::Tracker,
    udp::UdpTracker,
};

/// The first tracker that answered an announce.
#[derive(Debug)]
pub struct AnnounceOutcome {
    pub announce: String,
    pub response: TrackerResponse,
    pub peers: Vec<TrackerResponsePeer>,
}

pub struct TorrentClient {
    config: ClientConfig,
    peer_id: [u8; 20],
    http_client: Client,
}

impl TorrentClient {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_http_client(config, Client::new())
    }

    pub fn with_http_client(config: ClientConfig, http_client: Client) -> Self {
        let peer_id = generate_peer_id(&config.peer_id_prefix);
        TorrentClient {
            config,
            peer_id,
            http_client,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn peer_id(&self) -> &[u8; 20] {
        &self.peer_id
    }

    pub fn add_torrent<P: AsRef<Path>>(&self, torrent_path: P) -> TorrentClientResult<ManagedTorrent> {
        let metadata = parse_torrent_file(torrent_path)?;
        info!(name = %metadata.name, info_hash = %metadata.info_hash, "torrent loaded");
        Ok(ManagedTorrent::from_torrent_metadata(metadata))
    }

    pub fn announce_request(
        &self,
        torrent: &ManagedTorrent,
        tracker: &Tracker,
        event: TrackerEvent,
    ) -> AnnounceRequest {
        // first contact with a tracker is always a start
        let event = match event {
            TrackerEvent::None if !tracker.is_contacted() => TrackerEvent::Started,
            event => event,
        };
        AnnounceRequest {
            info_hash: torrent.metadata.info_hash,
            peer_id: self.peer_id,
            port: self.config.port,
            uploaded: torrent.uploaded,
            downloaded: torrent.downloaded,
            left: torrent.left(),
            compact: self.config.compact,
            event,
            numwant: self.config.numwant,
            tracker_id: tracker.tracker_id.clone(),
        }
    }

    /// Tries every tracker in announce-list order and returns the first answer.
    pub async fn announce(
        &self,
        torrent: &mut ManagedTorrent,
        event: TrackerEvent,
    ) -> TorrentClientResult<AnnounceOutcome> {
        for idx in 0..torrent.trackers.len() {
            let request = self.announce_request(torrent, &torrent.trackers[idx], event);
            let announce = torrent.trackers[idx].announce.clone();
            info!(%announce, event = ?request.event, "announcing");

            let result = self.announce_to(&announce, &request).await;
            let tracker = &mut torrent.trackers[idx];
            let response = match result {
                Ok(response) => response,
                Err(TorrentClientError::TrackerFailure(reason)) => {
                    warn!(%announce, %reason, "tracker refused announce, trying next");
                    tracker.fail(reason);
                    continue;
                }
                Err(e) => {
                    warn!(%announce, error = %e, "tracker unreachable, trying next");
                    tracker.fail(e.to_string());
                    continue;
                }
            };

            match response.peers() {
                Ok(peers) => {
                    tracker.update(&response, peers.len());
                    info!(%announce, peers = peers.len(), interval = response.interval, "announce succeeded");
                    return Ok(AnnounceOutcome {
                        announce,
                        response,
                        peers,
                    });
                }
                Err(e) => {
                    warn!(%announce, error = %e, "tracker sent unusable peers, trying next");
                    tracker.fail(e.to_string());
                }
            }
        }

        Err(TorrentClientError::NoTrackerReachable(torrent.trackers.len()))
    }

    async fn announce_to(
        &self,
        announce: &str,
        request: &AnnounceRequest,
    ) -> TorrentClientResult<TrackerResponse> {
        let url = Url::parse(announce)
            .map_err(|e| TorrentClientError::InvalidUrl(format!("{}: {}", announce, e)))?;

        match url.scheme() {
            "http" | "https" => {
                announce_http(
                    &self.http_client,
                    request.to_url(announce)?,
                    self.config.http_timeout(),
                )
                .await
            }
            "udp" => {
                UdpTracker::bind(&url, self.config.udp_timeout(), self.config.udp_retries)
                    .await?
                    .announce(request)
                    .await
            }
            other => Err(TorrentClientError::UnsupportedScheme(other.to_string())),
        }
    }
}

/// Builds a 20-byte peer id: the client prefix followed by random alphanumerics.
///
/// A prefix longer than 20 bytes is cut off at 20.
pub fn generate_peer_id(prefix: &str) -> [u8; 20] {
    let mut peer_id = [0u8; 20];
    let prefix = &prefix.as_bytes()[..prefix.len().min(peer_id.len())];
    peer_id[..prefix.len()].copy_from_slice(prefix);

    let mut rng = rand::thread_rng();
    for slot in &mut peer_id[prefix.len()..] {
        *slot = rng.sample(Alphanumeric);
    }
    peer_id
}
