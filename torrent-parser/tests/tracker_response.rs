mod common;

use std::net::SocketAddr;

use common::{bytes, dict, int, list, text};
use torrent_parser::{
    decode_compact_peers, error::TorrentParserError, model::TrackerResponse,
    parse_tracker_response,
};

fn addr(s: &str) -> SocketAddr {
    s.parse().unwrap()
}

#[test]
fn test_compact_peer() {
    let peers = decode_compact_peers(&[0x7f, 0x00, 0x00, 0x01, 0x1a, 0xe1]).unwrap();
    assert_eq!(peers.len(), 1);
    assert_eq!(peers[0].addr, addr("127.0.0.1:6881"));
    assert_eq!(peers[0].peer_id, None);
}

#[test]
fn test_compact_peers_keep_order() {
    let blob = [
        192, 168, 1, 1, 0x1a, 0xe1, // 192.168.1.1:6881
        10, 0, 0, 1, 0x00, 0x50, // 10.0.0.1:80
    ];
    let peers = decode_compact_peers(&blob).unwrap();
    let addrs: Vec<SocketAddr> = peers.into_iter().map(|peer| peer.addr).collect();
    assert_eq!(addrs, vec![addr("192.168.1.1:6881"), addr("10.0.0.1:80")]);
    assert!(decode_compact_peers(&[]).unwrap().is_empty());
}

#[test]
fn test_invalid_peer_blob() {
    assert!(matches!(
        decode_compact_peers(&[1, 2, 3, 4, 5]),
        Err(TorrentParserError::InvalidPeerBlob(5))
    ));
}

#[test]
fn test_parse_success_response() {
    let body = dict(vec![
        ("complete", int(12)),
        ("incomplete", int(3)),
        ("interval", int(1800)),
        ("min interval", int(900)),
        ("peers", bytes(&[127, 0, 0, 1, 0x1a, 0xe1, 10, 0, 0, 2, 0x1a, 0xe2])),
        ("tracker id", text("abc")),
    ]);
    let response = parse_tracker_response(&body).unwrap();

    assert!(!response.is_failure());
    assert_eq!(response.interval, 1800);
    assert_eq!(response.min_interval, Some(900));
    assert_eq!(response.complete, 12);
    assert_eq!(response.incomplete, 3);
    assert_eq!(response.tracker_id.as_deref(), Some("abc"));
    assert_eq!(response.raw_peers.len(), 12);

    let peers = response.peers().unwrap();
    assert_eq!(peers[0].addr, addr("127.0.0.1:6881"));
    assert_eq!(peers[1].addr, addr("10.0.0.2:6882"));
}

#[test]
fn test_peer_blob_is_decoded_lazily() {
    let body = dict(vec![("interval", int(60)), ("peers", bytes(&[1, 2, 3, 4, 5]))]);
    let response = parse_tracker_response(&body).unwrap();
    assert!(matches!(
        response.peers(),
        Err(TorrentParserError::InvalidPeerBlob(5))
    ));
}

#[test]
fn test_parse_failure_response() {
    let body = dict(vec![("failure reason", text("no info_hash parameter supplied"))]);
    let response = parse_tracker_response(&body).unwrap();

    assert!(response.is_failure());
    assert_eq!(
        response,
        TrackerResponse {
            failure_reason: Some("no info_hash parameter supplied".to_string()),
            ..TrackerResponse::default()
        }
    );
}

#[test]
fn test_interval_required_without_failure() {
    let body = dict(vec![("complete", int(1)), ("peers", bytes(&[]))]);
    match parse_tracker_response(&body) {
        Err(TorrentParserError::MissingRequiredField(field)) => assert_eq!(field, "interval"),
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn test_dictionary_model_peers() {
    let body = dict(vec![
        ("interval", int(30)),
        (
            "peers",
            list(vec![
                dict(vec![
                    ("ip", text("10.1.2.3")),
                    ("peer id", text("-XX0001-abcdefghijkl")),
                    ("port", int(51413)),
                ]),
                dict(vec![("ip", text("::1")), ("port", int(6881))]),
            ]),
        ),
        ("warning message", text("slow down")),
    ]);
    let response = parse_tracker_response(&body).unwrap();

    assert_eq!(response.warning_message.as_deref(), Some("slow down"));
    assert!(response.raw_peers.is_empty());
    let peers = response.peers().unwrap();
    assert_eq!(peers.len(), 2);
    assert_eq!(peers[0].addr, addr("10.1.2.3:51413"));
    assert_eq!(peers[0].peer_id.as_deref(), Some(&b"-XX0001-abcdefghijkl"[..]));
    assert_eq!(peers[1].addr, addr("[::1]:6881"));
}

#[test]
fn test_dictionary_model_peer_validation() {
    let bad_ip = dict(vec![
        ("interval", int(30)),
        ("peers", list(vec![dict(vec![("ip", text("tracker.example")), ("port", int(1))])])),
    ]);
    assert!(matches!(
        parse_tracker_response(&bad_ip),
        Err(TorrentParserError::InvalidField(_))
    ));

    let bad_port = dict(vec![
        ("interval", int(30)),
        ("peers", list(vec![dict(vec![("ip", text("1.2.3.4")), ("port", int(70000))])])),
    ]);
    assert!(matches!(
        parse_tracker_response(&bad_port),
        Err(TorrentParserError::InvalidField(_))
    ));
}

#[test]
fn test_malformed_body() {
    assert!(matches!(
        parse_tracker_response(b"<html>"),
        Err(TorrentParserError::UnknownSpecifier(b'<'))
    ));
    assert!(matches!(
        parse_tracker_response(&dict(vec![("interval", int(1)), ("peers", int(4))])),
        Err(TorrentParserError::FieldTypeError { .. })
    ));
}
