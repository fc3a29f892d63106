use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use byteorder::{BigEndian, ByteOrder};

use crate::{
    decoder::BencodeDecoder,
    error::TorrentParserError,
    model::{TrackerResponse, TrackerResponsePeer},
    validator::{
        bytes_to_string, expect_dict, optional_bytes, optional_integer, optional_string,
        required_integer, type_error,
    },
    value::{BencodeValue, Dictionary},
};

const COMPACT_PEER_LEN: usize = 6;

/// Decodes a tracker's bencoded announce reply.
pub fn parse_tracker_response(bencoded: &[u8]) -> Result<TrackerResponse, TorrentParserError> {
    let root = BencodeDecoder::new(bencoded).decode()?;
    build_tracker_response(&root)
}

pub(crate) fn build_tracker_response(
    root: &BencodeValue,
) -> Result<TrackerResponse, TorrentParserError> {
    let dict = expect_dict(root)?;

    let failure_reason = optional_string(dict, "failure reason")?;
    // a failed announce may carry nothing but the reason
    let interval = match failure_reason {
        Some(_) => optional_integer(dict, "interval")?.unwrap_or_default(),
        None => required_integer(dict, "interval")?,
    };

    let (raw_peers, peer_entries) = match dict.get(b"peers".as_slice()) {
        Some(BencodeValue::ByteString(blob)) => (blob.clone(), Vec::new()),
        Some(BencodeValue::List(peers)) => (
            Vec::new(),
            peers
                .iter()
                .map(dictionary_peer)
                .collect::<Result<Vec<_>, TorrentParserError>>()?,
        ),
        None => (Vec::new(), Vec::new()),
        Some(other) => return Err(type_error("List or String", other)),
    };

    Ok(TrackerResponse {
        failure_reason,
        warning_message: optional_string(dict, "warning message")?,
        interval,
        min_interval: optional_integer(dict, "min interval")?,
        tracker_id: optional_string(dict, "tracker id")?,
        complete: optional_integer(dict, "complete")?.unwrap_or_default(),
        incomplete: optional_integer(dict, "incomplete")?.unwrap_or_default(),
        raw_peers,
        peer_entries,
    })
}

fn dictionary_peer(peer: &BencodeValue) -> Result<TrackerResponsePeer, TorrentParserError> {
    let peer: &Dictionary = expect_dict(peer)?;

    let peer_id = optional_bytes(peer, "peer id")?.map(<[u8]>::to_vec);

    let ip = optional_bytes(peer, "ip")?
        .ok_or_else(|| TorrentParserError::MissingRequiredField("ip".to_string()))?;
    let ip = bytes_to_string(ip)?;
    let ip = ip
        .parse::<IpAddr>()
        .map_err(|_| TorrentParserError::InvalidField(format!("peer ip {:?}", ip)))?;

    let port = required_integer(peer, "port")?;
    let port = u16::try_from(port)
        .map_err(|_| TorrentParserError::InvalidField(format!("peer port {}", port)))?;

    Ok(TrackerResponsePeer {
        peer_id,
        addr: SocketAddr::new(ip, port),
    })
}

/// Unpacks a compact peer blob: 4 bytes IPv4 + 2 bytes port per peer, big-endian.
pub fn decode_compact_peers(blob: &[u8]) -> Result<Vec<TrackerResponsePeer>, TorrentParserError> {
    if blob.len() % COMPACT_PEER_LEN != 0 {
        return Err(TorrentParserError::InvalidPeerBlob(blob.len()));
    }

    Ok(blob
        .chunks_exact(COMPACT_PEER_LEN)
        .map(|chunk| {
            let ip = Ipv4Addr::from(BigEndian::read_u32(&chunk[..4]));
            let port = BigEndian::read_u16(&chunk[4..]);
            TrackerResponsePeer {
                peer_id: None,
                addr: SocketAddr::new(IpAddr::V4(ip), port),
            }
        })
        .collect())
}
