use percent_encoding::{percent_encode, NON_ALPHANUMERIC};
use torrent_core::{
    announce::{AnnounceRequest, TrackerEvent},
    client::generate_peer_id,
    ClientConfig, TorrentClientError,
};
use torrent_parser::model::InfoHash;

fn request(event: TrackerEvent) -> AnnounceRequest {
    AnnounceRequest {
        info_hash: InfoHash([0xab; 20]),
        peer_id: *b"-RT0001-123456789012",
        port: 6881,
        uploaded: 10,
        downloaded: 20,
        left: 30,
        compact: true,
        event,
        numwant: None,
        tracker_id: None,
    }
}

#[test]
fn test_announce_url() {
    let url = request(TrackerEvent::Started)
        .to_url("http://tracker.example:6969/announce")
        .unwrap();
    let query = url.query().unwrap();

    assert_eq!(url.path(), "/announce");
    assert!(query.starts_with(&format!("info_hash={}", "%AB".repeat(20))));
    assert!(query.contains("peer_id=%2DRT0001%2D123456789012"));
    assert!(query.contains("port=6881"));
    assert!(query.contains("uploaded=10&downloaded=20&left=30"));
    assert!(query.contains("compact=1"));
    assert!(query.ends_with("event=started"));
}

#[test]
fn test_announce_url_keeps_existing_query() {
    let mut req = request(TrackerEvent::None);
    req.numwant = Some(50);
    req.tracker_id = Some("id 1".to_string());
    let url = req
        .to_url("https://tracker.example/announce?passkey=secret")
        .unwrap();
    let query = url.query().unwrap();

    assert!(query.starts_with("passkey=secret&info_hash="));
    assert!(!query.contains("event="));
    assert!(query.contains("numwant=50"));
    assert!(query.ends_with(&format!(
        "trackerid={}",
        percent_encode(b"id 1", NON_ALPHANUMERIC)
    )));
}

#[test]
fn test_announce_url_rejects_garbage() {
    assert!(matches!(
        request(TrackerEvent::None).to_url("not a url"),
        Err(TorrentClientError::InvalidUrl(_))
    ));
}

#[test]
fn test_tracker_event() {
    assert_eq!(TrackerEvent::Started.as_str(), Some("started"));
    assert_eq!(TrackerEvent::Stopped.as_str(), Some("stopped"));
    assert_eq!(TrackerEvent::Completed.as_str(), Some("completed"));
    assert_eq!(TrackerEvent::None.as_str(), None);

    assert_eq!(TrackerEvent::None.udp_id(), 0);
    assert_eq!(TrackerEvent::Completed.udp_id(), 1);
    assert_eq!(TrackerEvent::Started.udp_id(), 2);
    assert_eq!(TrackerEvent::Stopped.udp_id(), 3);
}

#[test]
fn test_peer_id() {
    let peer_id = generate_peer_id("-RT0001-");
    assert_eq!(&peer_id[..8], b"-RT0001-");
    assert!(peer_id[8..].iter().all(u8::is_ascii_alphanumeric));
    // 12 random alphanumerics colliding is practically impossible
    assert_ne!(peer_id, generate_peer_id("-RT0001-"));

    let long = generate_peer_id("-ABCDEFGHIJKLMNOPQRSTUVWXYZ-");
    assert_eq!(&long, b"-ABCDEFGHIJKLMNOPQRS");
}

#[test]
fn test_config_rejects_long_peer_id_prefix() {
    assert!(matches!(
        ClientConfig::from_json_str(r#"{ "peer_id_prefix": "-ABCDEFGHIJKLMNOPQRSTUVWXYZ-" }"#),
        Err(TorrentClientError::InvalidConfig(_))
    ));
    let config = ClientConfig::from_json_str(r#"{ "peer_id_prefix": "-XX0100-" }"#).unwrap();
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_defaults_and_overrides() {
    let config = ClientConfig::from_json_str(r#"{ "port": 51413, "numwant": 80 }"#).unwrap();
    assert_eq!(config.port, 51413);
    assert_eq!(config.numwant, Some(80));
    assert_eq!(config.peer_id_prefix, ClientConfig::default().peer_id_prefix);
    assert_eq!(config.http_timeout_secs, 5);
    assert!(config.compact);

    assert!(matches!(
        ClientConfig::from_json_str("{ \"port\": \"not a port\" }"),
        Err(TorrentClientError::ConfigError(_))
    ));
}

#[test]
fn test_config_from_file() {
    let path = std::env::temp_dir().join(format!("torrent-core-{}.json", std::process::id()));
    std::fs::write(&path, r#"{ "udp_retries": 0, "compact": false }"#).unwrap();
    let config = ClientConfig::from_json_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(config.udp_retries, 0);
    assert!(!config.compact);
    assert_eq!(config.port, 6881);
}
