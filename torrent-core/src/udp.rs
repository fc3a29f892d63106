//! UDP tracker protocol (BEP 15): connect, then announce with the issued
//! connection id.

use std::{io::Cursor, net::SocketAddr, time::Duration};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use reqwest::Url;
use tokio::{
    net::{lookup_host, UdpSocket},
    time::timeout,
};
use torrent_parser::model::TrackerResponse;
use tracing::debug;

use crate::{
    announce::AnnounceRequest,
    error::{TorrentClientError, TorrentClientResult},
};

pub const PROTOCOL_ID: u64 = 0x41727101980;

const ACTION_CONNECT: u32 = 0;
const ACTION_ANNOUNCE: u32 = 1;
const ACTION_ERROR: u32 = 3;

const CONNECT_LEN: usize = 16;
const ANNOUNCE_HEADER_LEN: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectRequest {
    pub transaction_id: u32,
}

impl ConnectRequest {
    pub fn encode(&self) -> TorrentClientResult<Vec<u8>> {
        let mut packet = Vec::with_capacity(CONNECT_LEN);
        packet.write_u64::<BigEndian>(PROTOCOL_ID)?;
        packet.write_u32::<BigEndian>(ACTION_CONNECT)?;
        packet.write_u32::<BigEndian>(self.transaction_id)?;
        Ok(packet)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectResponse {
    pub action: u32,
    pub transaction_id: u32,
    pub connection_id: u64,
}

impl ConnectResponse {
    pub fn decode(packet: &[u8]) -> TorrentClientResult<Self> {
        if packet.len() < CONNECT_LEN {
            return Err(TorrentClientError::UdpProtocol(format!(
                "connect response is {} bytes, expected {}",
                packet.len(),
                CONNECT_LEN
            )));
        }
        let mut rdr = Cursor::new(packet);
        Ok(ConnectResponse {
            action: rdr.read_u32::<BigEndian>()?,
            transaction_id: rdr.read_u32::<BigEndian>()?,
            connection_id: rdr.read_u64::<BigEndian>()?,
        })
    }

    /// Checks the response answers `request`.
    pub fn verify(&self, request: &ConnectRequest) -> TorrentClientResult<u64> {
        if self.transaction_id != request.transaction_id {
            return Err(TorrentClientError::TransactionMismatch {
                expected: request.transaction_id,
                found: self.transaction_id,
            });
        }
        if self.action != ACTION_CONNECT {
            return Err(TorrentClientError::UdpProtocol(format!(
                "connect response has action {}",
                self.action
            )));
        }
        Ok(self.connection_id)
    }
}

pub fn encode_announce(
    connection_id: u64,
    transaction_id: u32,
    key: u32,
    request: &AnnounceRequest,
) -> TorrentClientResult<Vec<u8>> {
    let mut packet = Vec::with_capacity(98);
    packet.write_u64::<BigEndian>(connection_id)?;
    packet.write_u32::<BigEndian>(ACTION_ANNOUNCE)?;
    packet.write_u32::<BigEndian>(transaction_id)?;
    packet.extend_from_slice(request.info_hash.as_bytes());
    packet.extend_from_slice(&request.peer_id);
    packet.write_u64::<BigEndian>(request.downloaded)?;
    packet.write_u64::<BigEndian>(request.left)?;
    packet.write_u64::<BigEndian>(request.uploaded)?;
    packet.write_u32::<BigEndian>(request.event.udp_id())?;
    packet.write_u32::<BigEndian>(0)?; // ip: use the sender's address
    packet.write_u32::<BigEndian>(key)?;
    packet.write_i32::<BigEndian>(request.numwant.map_or(-1, |n| n.min(i32::MAX as u32) as i32))?;
    packet.write_u16::<BigEndian>(request.port)?;
    Ok(packet)
}

/// Decodes an announce (or error) response for `transaction_id`.
pub fn decode_announce(packet: &[u8], transaction_id: u32) -> TorrentClientResult<TrackerResponse> {
    if packet.len() < 8 {
        return Err(TorrentClientError::UdpProtocol(format!(
            "announce response is {} bytes",
            packet.len()
        )));
    }
    let mut rdr = Cursor::new(packet);
    let action = rdr.read_u32::<BigEndian>()?;
    let found = rdr.read_u32::<BigEndian>()?;
    if found != transaction_id {
        return Err(TorrentClientError::TransactionMismatch {
            expected: transaction_id,
            found,
        });
    }

    match action {
        ACTION_ANNOUNCE if packet.len() >= ANNOUNCE_HEADER_LEN => {
            let interval = rdr.read_u32::<BigEndian>()?;
            let leechers = rdr.read_u32::<BigEndian>()?;
            let seeders = rdr.read_u32::<BigEndian>()?;
            Ok(TrackerResponse {
                interval: i64::from(interval),
                complete: i64::from(seeders),
                incomplete: i64::from(leechers),
                raw_peers: packet[ANNOUNCE_HEADER_LEN..].to_vec(),
                ..TrackerResponse::default()
            })
        }
        ACTION_ERROR => Err(TorrentClientError::TrackerFailure(
            String::from_utf8_lossy(&packet[8..]).into_owned(),
        )),
        other => Err(TorrentClientError::UdpProtocol(format!(
            "unexpected announce response: action {}, {} bytes",
            other,
            packet.len()
        ))),
    }
}

pub struct UdpTracker {
    socket: UdpSocket,
    addr: SocketAddr,
    timeout: Duration,
    retries: u32,
}

impl UdpTracker {
    /// Resolves `udp://host:port/...` and binds a socket towards it.
    pub async fn bind(url: &Url, timeout: Duration, retries: u32) -> TorrentClientResult<Self> {
        let host = url
            .host_str()
            .ok_or_else(|| TorrentClientError::InvalidUrl(url.to_string()))?;
        let port = url
            .port()
            .ok_or_else(|| TorrentClientError::InvalidUrl(format!("{}: missing port", url)))?;
        let host = host.trim_start_matches('[').trim_end_matches(']');
        let addr = lookup_host((host, port))
            .await?
            .next()
            .ok_or_else(|| TorrentClientError::InvalidUrl(format!("{}: no address", url)))?;

        let local = if addr.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(local).await?;
        socket.connect(addr).await?;

        Ok(UdpTracker {
            socket,
            addr,
            timeout,
            retries,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub async fn connect(&self) -> TorrentClientResult<u64> {
        let request = ConnectRequest {
            transaction_id: rand::random(),
        };
        let reply = self.exchange(&request.encode()?).await?;
        let connection_id = ConnectResponse::decode(&reply)?.verify(&request)?;
        debug!(tracker = %self.addr, connection_id, "udp tracker connected");
        Ok(connection_id)
    }

    pub async fn announce(&self, request: &AnnounceRequest) -> TorrentClientResult<TrackerResponse> {
        let connection_id = self.connect().await?;
        let transaction_id: u32 = rand::random();
        let packet = encode_announce(connection_id, transaction_id, rand::random(), request)?;
        let reply = self.exchange(&packet).await?;
        let response = decode_announce(&reply, transaction_id)?;
        debug!(
            tracker = %self.addr,
            interval = response.interval,
            peers = response.raw_peers.len() / 6,
            "udp announce answered"
        );
        Ok(response)
    }

    async fn exchange(&self, packet: &[u8]) -> TorrentClientResult<Vec<u8>> {
        let mut buf = vec![0u8; 2048];
        for attempt in 0..=self.retries {
            self.socket.send(packet).await?;
            match timeout(self.timeout, self.socket.recv(&mut buf)).await {
                Ok(received) => {
                    let n = received?;
                    return Ok(buf[..n].to_vec());
                }
                Err(_) => debug!(tracker = %self.addr, attempt, "udp tracker timed out"),
            }
        }
        Err(TorrentClientError::Timeout)
    }
}
