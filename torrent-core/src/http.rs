use std::time::Duration;

use reqwest::{Client, Url};
use torrent_parser::{model::TrackerResponse, parse_tracker_response};
use tracing::debug;

use crate::error::{TorrentClientError, TorrentClientResult};

/// Sends an HTTP announce and decodes the bencoded reply.
///
/// A reply carrying `failure reason` is returned as [`TorrentClientError::TrackerFailure`].
pub async fn announce_http(
    client: &Client,
    url: Url,
    timeout: Duration,
) -> TorrentClientResult<TrackerResponse> {
    let resp = client
        .get(url)
        .timeout(timeout)
        .send()
        .await?
        .error_for_status()?;
    let body = resp.bytes().await?;
    debug!(len = body.len(), "tracker replied");
    let response = parse_tracker_response(&body)?;
    match response.failure_reason {
        Some(reason) => Err(TorrentClientError::TrackerFailure(reason)),
        None => Ok(response),
    }
}
